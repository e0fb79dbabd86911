//! Purpose: Override a control's default construction params with values restored from the URL.
//! Exports: `ComponentParams`, `apply_stored_values`, `construct_with_stored_values`.
//! Role: Explicit, typed replacement for wrapping a control constructor.
//! Invariants: Only params named in the snapshot entry for the control's id change.
//! Invariants: Overrides apply in stored order, so a repeated param name keeps the last value.
//! Invariants: The control id itself is never overridden.
use serde_json::{Map, Value};

use crate::core::error::{Error, ErrorKind};
use crate::core::snapshot::StateSnapshot;

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentParams {
    id: String,
    params: Map<String, Value>,
}

impl ComponentParams {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Builds params from a JSON object that carries a string `id` next to the other params.
    pub fn from_json(value: Value) -> Result<Self, Error> {
        let Value::Object(mut params) = value else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("component params must be a JSON object"));
        };
        let id = match params.remove("id") {
            Some(Value::String(id)) => id,
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("component params need a string `id`")
                    .with_hint(r#"Example: {"id": "country_radiobutton", "value": "Canada"}"#));
            }
        };
        Ok(Self { id, params })
    }

    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("id".to_string(), Value::String(self.id.clone()));
        for (name, value) in &self.params {
            out.insert(name.clone(), value.clone());
        }
        Value::Object(out)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

pub fn apply_stored_values(snapshot: &StateSnapshot, mut params: ComponentParams) -> ComponentParams {
    let Some(stored) = snapshot.get(&params.id) else {
        return params;
    };
    for (name, value) in stored {
        if name == "id" {
            tracing::warn!(component = %params.id, "ignoring stored override of `id`");
            continue;
        }
        params.params.insert(name.clone(), value.to_json());
    }
    tracing::debug!(component = %params.id, overrides = stored.len(), "applied stored values");
    params
}

/// Merges stored values into `params`, then hands them to `build` exactly once.
pub fn construct_with_stored_values<T, F>(
    snapshot: &StateSnapshot,
    params: ComponentParams,
    build: F,
) -> T
where
    F: FnOnce(ComponentParams) -> T,
{
    build(apply_stored_values(snapshot, params))
}
