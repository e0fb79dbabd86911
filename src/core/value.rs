//! Purpose: Typed model for the values a UI control exposes through the query string.
//! Exports: `FieldRef`, `FieldValue`.
//! Role: Shared vocabulary for encode, parse, and apply.
//! Invariants: Rendered text infers back to the same variant (scalar booleans excepted).
//! Invariants: Non-finite floats are never rendered.
use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

/// One observable attribute of one named control, e.g. `datepicker.start_date`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FieldRef {
    pub component_id: String,
    pub param: String,
}

impl FieldRef {
    pub fn new(component_id: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            component_id: component_id.into(),
            param: param.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.component_id, self.param)
    }
}

impl FromStr for FieldRef {
    type Err = Error;

    // Component ids may contain dots; param names never do.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.rsplit_once('.') {
            Some((id, param)) if !id.is_empty() && !param.is_empty() => Ok(Self::new(id, param)),
            _ => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid field reference `{raw}`"))
                .with_hint("Use `<component-id>.<param>`, e.g. `country_radiobutton.value`.")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Text placed after `componentId=` on the wire (before percent-encoding).
    pub fn render(&self) -> Result<String, Error> {
        match self {
            FieldValue::Str(text) => Ok(text.clone()),
            FieldValue::List(_) => {
                let mut out = String::new();
                write_literal(self, &mut out)?;
                Ok(out)
            }
            _ => {
                let mut out = String::new();
                write_scalar(self, &mut out)?;
                Ok(out)
            }
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(flag) => Value::Bool(*flag),
            FieldValue::Int(num) => Value::from(*num),
            FieldValue::Float(num) => serde_json::Number::from_f64(*num)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Str(text) => Value::String(text.clone()),
            FieldValue::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
        }
    }

    /// Reads a JSON value; `null` means "unset".
    pub fn from_json(value: &Value) -> Result<Option<Self>, Error> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(flag) => Ok(Some(FieldValue::Bool(*flag))),
            Value::String(text) => Ok(Some(FieldValue::Str(text.clone()))),
            Value::Number(number) => Self::from_json_number(number).map(Some),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    Self::from_json(item)?.ok_or_else(|| {
                        Error::new(ErrorKind::Usage)
                            .with_message("null cannot be stored inside a list")
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|items| Some(FieldValue::List(items))),
            Value::Object(_) => Err(Error::new(ErrorKind::Usage)
                .with_message("objects cannot be stored in the query string")
                .with_hint("Use a string, number, boolean, or list of those.")),
        }
    }

    fn from_json_number(number: &serde_json::Number) -> Result<Self, Error> {
        if let Some(int) = number.as_i64() {
            return Ok(FieldValue::Int(int));
        }
        if number.is_u64() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("integer {number} is out of range"))
                .with_hint("Integers must fit in a signed 64-bit value."));
        }
        number.as_f64().map(FieldValue::Float).ok_or_else(|| {
            Error::new(ErrorKind::Usage).with_message(format!("unsupported number {number}"))
        })
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

fn write_scalar(value: &FieldValue, out: &mut String) -> Result<(), Error> {
    match value {
        FieldValue::Bool(true) => out.push_str("True"),
        FieldValue::Bool(false) => out.push_str("False"),
        FieldValue::Int(num) => {
            let _ = write!(out, "{num}");
        }
        FieldValue::Float(num) => {
            if !num.is_finite() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("cannot encode non-finite float {num}")));
            }
            // Display never uses exponent notation; the `.` keeps it a float on the way back.
            let text = num.to_string();
            out.push_str(&text);
            if !text.contains('.') {
                out.push_str(".0");
            }
        }
        FieldValue::Str(text) => out.push_str(text),
        FieldValue::List(_) => write_literal(value, out)?,
    }
    Ok(())
}

fn write_literal(value: &FieldValue, out: &mut String) -> Result<(), Error> {
    match value {
        FieldValue::Str(text) => {
            out.push('\'');
            for ch in text.chars() {
                match ch {
                    '\\' => out.push_str("\\\\"),
                    '\'' => out.push_str("\\'"),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    other => out.push(other),
                }
            }
            out.push('\'');
        }
        FieldValue::List(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_literal(item, out)?;
            }
            out.push(']');
        }
        scalar => write_scalar(scalar, out)?,
    }
    Ok(())
}
