//! Purpose: Flatten control state into a `?key=value&...` query string.
//! Exports: `encode`, `encode_snapshot`.
//! Role: Write side of the codec; output is handed to the browser location.
//! Invariants: Each kept field becomes `id=param` immediately followed by `id=value`.
//! Invariants: Unset values contribute nothing; output always starts with `?`.
use url::form_urlencoded;

use crate::core::error::{Error, ErrorKind};
use crate::core::snapshot::StateSnapshot;
use crate::core::value::{FieldRef, FieldValue};

pub fn encode(fields: &[FieldRef], values: &[Option<FieldValue>]) -> Result<String, Error> {
    if fields.len() != values.len() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!(
                "field/value count mismatch: {} fields, {} values",
                fields.len(),
                values.len()
            ))
            .with_hint("Pass exactly one value (or null) per field reference."));
    }

    let mut query = QueryWriter::new();
    let mut skipped = 0usize;
    for (field, value) in fields.iter().zip(values) {
        match value {
            Some(value) => query.append(&field.component_id, &field.param, value)?,
            None => skipped += 1,
        }
    }
    tracing::debug!(fields = fields.len(), skipped, "encoded state");
    Ok(query.finish())
}

pub fn encode_snapshot(snapshot: &StateSnapshot) -> Result<String, Error> {
    let mut query = QueryWriter::new();
    for component in snapshot {
        for (param, value) in &component.params {
            query.append(&component.id, param, value)?;
        }
    }
    Ok(query.finish())
}

struct QueryWriter {
    serializer: form_urlencoded::Serializer<'static, String>,
}

impl QueryWriter {
    fn new() -> Self {
        Self {
            serializer: form_urlencoded::Serializer::new(String::new()),
        }
    }

    fn append(&mut self, id: &str, param: &str, value: &FieldValue) -> Result<(), Error> {
        let rendered = value
            .render()
            .map_err(|err| err.with_component(id.to_string()))?;
        self.serializer.append_pair(id, param);
        self.serializer.append_pair(id, &rendered);
        Ok(())
    }

    fn finish(mut self) -> String {
        format!("?{}", self.serializer.finish())
    }
}
