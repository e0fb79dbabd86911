//! Purpose: Ordered in-memory view of control state decoded from (or destined for) a URL.
//! Exports: `StateSnapshot`, `ComponentState`.
//! Role: Output of `parse`, input of `apply` and `encode_snapshot`.
//! Invariants: Component ids keep first-occurrence order.
//! Invariants: Pairs under one id keep insertion order, duplicates included.
use serde::ser::{Serialize, SerializeMap, SerializeTuple, Serializer};

use crate::core::value::FieldValue;

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentState {
    pub id: String,
    pub params: Vec<(String, FieldValue)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StateSnapshot {
    components: Vec<ComponentState>,
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of distinct component ids.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn get(&self, id: &str) -> Option<&[(String, FieldValue)]> {
        self.components
            .iter()
            .find(|component| component.id == id)
            .map(|component| component.params.as_slice())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ComponentState> {
        self.components.iter()
    }

    pub fn push(&mut self, id: &str, param: impl Into<String>, value: FieldValue) {
        let entry = (param.into(), value);
        match self.components.iter_mut().find(|component| component.id == id) {
            Some(component) => component.params.push(entry),
            None => self.components.push(ComponentState {
                id: id.to_string(),
                params: vec![entry],
            }),
        }
    }

    pub fn with(mut self, id: &str, param: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(id, param, value.into());
        self
    }
}

impl<'a> IntoIterator for &'a StateSnapshot {
    type Item = &'a ComponentState;
    type IntoIter = std::slice::Iter<'a, ComponentState>;

    fn into_iter(self) -> Self::IntoIter {
        self.components.iter()
    }
}

struct ParamPair<'a>(&'a str, &'a FieldValue);

impl Serialize for ParamPair<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(self.0)?;
        tuple.serialize_element(self.1)?;
        tuple.end()
    }
}

struct ParamList<'a>(&'a [(String, FieldValue)]);

impl Serialize for ParamList<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|(param, value)| ParamPair(param, value)))
    }
}

// Serialized as `{"id": [["param", value], ...]}` in snapshot order.
impl Serialize for StateSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.components.len()))?;
        for component in &self.components {
            map.serialize_entry(&component.id, &ParamList(&component.params))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::StateSnapshot;
    use crate::core::value::FieldValue;

    #[test]
    fn push_groups_by_id_and_keeps_order() {
        let snapshot = StateSnapshot::new()
            .with("c1", "value", 5)
            .with("c2", "value", "x")
            .with("c1", "n_clicks", 2);

        assert_eq!(snapshot.len(), 2);
        let ids: Vec<&str> = snapshot.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2"]);
        assert_eq!(
            snapshot.get("c1").expect("c1"),
            [
                ("value".to_string(), FieldValue::Int(5)),
                ("n_clicks".to_string(), FieldValue::Int(2)),
            ]
        );
        assert!(!snapshot.contains("c3"));
    }

    #[test]
    fn serializes_in_snapshot_order() {
        let snapshot = StateSnapshot::new()
            .with("zeta", "value", 1)
            .with("alpha", "value", FieldValue::list(["A", "B"]));
        let json = serde_json::to_string(&snapshot).expect("json");
        assert_eq!(json, r#"{"zeta":[["value",1]],"alpha":[["value",["A","B"]]]}"#);
    }

    #[test]
    fn empty_snapshot_serializes_to_empty_object() {
        let json = serde_json::to_string(&StateSnapshot::new()).expect("json");
        assert_eq!(json, "{}");
    }
}
