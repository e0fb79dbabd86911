//! Purpose: Parse bracketed list literals such as `['Ajax', 'PSV']` back into values.
//! Exports: `parse_list_literal`.
//! Role: Literal-only grammar for list-typed query values; nothing is evaluated.
//! Invariants: Accepts everything `FieldValue::render` emits for lists.
//! Invariants: Any other token is a `Corrupt` error carrying the byte position.
//! Notes: Double quotes, trailing commas, and extra whitespace are also tolerated.

use crate::core::error::{Error, ErrorKind};
use crate::core::value::FieldValue;

pub fn parse_list_literal(input: &str) -> Result<FieldValue, Error> {
    let mut parser = LiteralParser {
        input: input.as_bytes(),
        text: input,
        pos: 0,
    };
    parser.skip_ws();
    if parser.peek() != Some(b'[') {
        return Err(parser.error("expected `[`"));
    }
    let value = parser.parse_list()?;
    parser.skip_ws();
    if parser.pos != parser.input.len() {
        return Err(parser.error("unexpected trailing input after list"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    input: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl LiteralParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::new(ErrorKind::Corrupt)
            .with_message(format!("invalid list literal: {message}"))
            .with_position(self.pos)
    }

    fn parse_list(&mut self) -> Result<FieldValue, Error> {
        // Caller has checked the opening bracket.
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(FieldValue::List(items));
                }
                None => return Err(self.error("unterminated list")),
                _ => {}
            }
            items.push(self.parse_item()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                None => return Err(self.error("unterminated list")),
                Some(_) => return Err(self.error("expected `,` or `]`")),
            }
        }
    }

    fn parse_item(&mut self) -> Result<FieldValue, Error> {
        match self.peek() {
            Some(b'[') => self.parse_list(),
            Some(quote @ (b'\'' | b'"')) => self.parse_string(quote),
            Some(b'-' | b'+' | b'.' | b'0'..=b'9') => self.parse_number(),
            Some(ch) if ch.is_ascii_alphabetic() => self.parse_word(),
            _ => Err(self.error("expected a literal")),
        }
    }

    fn parse_string(&mut self, quote: u8) -> Result<FieldValue, Error> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(ch) = self.text[self.pos..].chars().next() else {
                self.pos = start;
                return Err(self.error("unterminated string"));
            };
            self.pos += ch.len_utf8();
            match ch {
                '\\' => {
                    let Some(escaped) = self.text[self.pos..].chars().next() else {
                        self.pos = start;
                        return Err(self.error("unterminated string"));
                    };
                    self.pos += escaped.len_utf8();
                    match escaped {
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        '"' => out.push('"'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        other => {
                            // Unknown escapes keep their backslash.
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                ch if ch as u32 == quote as u32 => return Ok(FieldValue::Str(out)),
                other => out.push(other),
            }
        }
    }

    fn parse_number(&mut self) -> Result<FieldValue, Error> {
        let start = self.pos;
        if matches!(self.peek(), Some(b'-' | b'+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(ch) = self.peek() {
            match ch {
                b'0'..=b'9' => {}
                b'.' | b'e' | b'E' => is_float = true,
                b'-' | b'+' if matches!(self.input[self.pos - 1], b'e' | b'E') => {}
                _ => break,
            }
            self.pos += 1;
        }
        let token = &self.text[start..self.pos];
        let parsed = if is_float {
            token
                .parse::<f64>()
                .ok()
                .filter(|float| float.is_finite())
                .map(FieldValue::Float)
        } else {
            token.parse::<i64>().ok().map(FieldValue::Int)
        };
        parsed.ok_or_else(|| {
            self.error(&format!("invalid number `{token}`"))
                .with_position(start)
        })
    }

    fn parse_word(&mut self) -> Result<FieldValue, Error> {
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || ch == b'_') {
            self.pos += 1;
        }
        match &self.text[start..self.pos] {
            "True" => Ok(FieldValue::Bool(true)),
            "False" => Ok(FieldValue::Bool(false)),
            word => {
                let message = format!("`{word}` is not a literal");
                self.pos = start;
                Err(self.error(&message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_list_literal;
    use crate::core::error::ErrorKind;
    use crate::core::value::FieldValue;

    #[test]
    fn parses_rendered_string_list() {
        let value = parse_list_literal("['Heerenveen', 'PSV']").expect("list");
        assert_eq!(value, FieldValue::list(["Heerenveen", "PSV"]));
    }

    #[test]
    fn parses_mixed_scalars_and_nesting() {
        let value = parse_list_literal(r#"[1, -2.5, "x", True, False, [], [3,],]"#).expect("list");
        assert_eq!(
            value,
            FieldValue::List(vec![
                FieldValue::Int(1),
                FieldValue::Float(-2.5),
                FieldValue::str("x"),
                FieldValue::Bool(true),
                FieldValue::Bool(false),
                FieldValue::List(vec![]),
                FieldValue::List(vec![FieldValue::Int(3)]),
            ])
        );
    }

    #[test]
    fn escapes_are_decoded() {
        let value = parse_list_literal(r"['it\'s', 'a\\b', 'tab\there', 'ünï']").expect("list");
        assert_eq!(
            value,
            FieldValue::list(["it's", "a\\b", "tab\there", "ünï"])
        );
    }

    #[test]
    fn exponent_numbers_are_floats() {
        let value = parse_list_literal("[1e3, 2E-2]").expect("list");
        assert_eq!(
            value,
            FieldValue::List(vec![FieldValue::Float(1000.0), FieldValue::Float(0.02)])
        );
    }

    #[test]
    fn overflowing_float_is_rejected() {
        let err = parse_list_literal("[1e999]").expect_err("inf");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.position(), Some(1));

        let err = parse_list_literal("[0, -1e400]").expect_err("-inf");
        assert_eq!(err.position(), Some(4));
    }

    #[test]
    fn identifiers_are_rejected() {
        let err = parse_list_literal("[None]").expect_err("none");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.position(), Some(1));

        let err = parse_list_literal("[__import__('os')]").expect_err("call");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn malformed_lists_are_rejected() {
        let cases = ["[", "['a'", "['a' 'b']", "['a'] tail", "[1,,2]", "['open]", "[--1]"];
        for case in cases {
            let err = parse_list_literal(case).expect_err(case);
            assert_eq!(err.kind(), ErrorKind::Corrupt, "{case}");
        }
    }

    #[test]
    fn unterminated_string_points_at_opening_quote() {
        let err = parse_list_literal("[1, 'abc").expect_err("unterminated");
        assert_eq!(err.position(), Some(4));
    }
}
