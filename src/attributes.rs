//! Host-facing attribute bag and per-call resource state.
//!
//! The host hands every CRUD call an untyped map of attributes. [`AttributeBag`] keeps the
//! values tagged (`string | bool | number | list`) and exposes typed accessors that turn shape
//! mismatches into [`ProviderError::InvalidAttribute`] instead of panics. Absent keys read as
//! the empty value of the requested type.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{ProviderError, ProviderResult};

/// One tagged attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<AttrValue>),
}

impl AttrValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl<V: Into<AttrValue>> From<Vec<V>> for AttrValue {
    fn from(values: Vec<V>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// String-keyed attribute map delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<String, AttrValue>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<AttrValue> {
        self.0.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Read a scalar as a string. Absent → `""`; numbers are rendered without a trailing `.0`.
    pub fn string(&self, key: &str) -> ProviderResult<String> {
        match self.0.get(key) {
            None => Ok(String::new()),
            Some(AttrValue::String(s)) => Ok(s.clone()),
            Some(AttrValue::Number(n)) => Ok(format_number(*n)),
            Some(other) => Err(ProviderError::invalid_attribute(
                key,
                format!("expected a string, got a {}", other.type_name()),
            )),
        }
    }

    /// Read a string that must be present and non-empty.
    pub fn required_string(&self, key: &str) -> ProviderResult<String> {
        let value = self.string(key)?;
        if value.is_empty() {
            return Err(ProviderError::invalid_attribute(key, "must not be empty"));
        }
        Ok(value)
    }

    /// Read a string, falling back to `default` only when the key is absent.
    pub fn string_or(&self, key: &str, default: &str) -> ProviderResult<String> {
        if self.contains(key) {
            self.string(key)
        } else {
            Ok(default.to_owned())
        }
    }

    /// Read a boolean. Absent → `false`; `"true"`/`"false"` strings are accepted.
    pub fn bool(&self, key: &str) -> ProviderResult<bool> {
        match self.0.get(key) {
            None => Ok(false),
            Some(AttrValue::Bool(b)) => Ok(*b),
            Some(AttrValue::String(s)) => s.parse::<bool>().map_err(|_| {
                ProviderError::invalid_attribute(key, format!("{:?} is not a boolean", s))
            }),
            Some(other) => Err(ProviderError::invalid_attribute(
                key,
                format!("expected a bool, got a {}", other.type_name()),
            )),
        }
    }

    /// Read a list of strings. Absent → empty; every element must be a string.
    pub fn string_list(&self, key: &str) -> ProviderResult<Vec<String>> {
        match self.0.get(key) {
            None => Ok(Vec::new()),
            Some(AttrValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(index, item)| match item {
                    AttrValue::String(s) => Ok(s.clone()),
                    other => Err(ProviderError::invalid_attribute(
                        key,
                        format!("element {} is a {}, expected a string", index, other.type_name()),
                    )),
                })
                .collect(),
            Some(other) => Err(ProviderError::invalid_attribute(
                key,
                format!("expected a list of strings, got a {}", other.type_name()),
            )),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeBag
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// What the host passes into one CRUD call: the object id (absent before create), the
/// attribute bag and the names of attributes its diff reports as changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceData {
    id: Option<String>,
    attributes: AttributeBag,
    changed: BTreeSet<String>,
}

impl ResourceData {
    pub fn new(attributes: AttributeBag) -> Self {
        Self { id: None, attributes, changed: BTreeSet::new() }
    }

    pub fn with_id(id: impl Into<String>, attributes: AttributeBag) -> Self {
        Self { id: Some(id.into()), attributes, changed: BTreeSet::new() }
    }

    /// Mark attributes as changed by the host's diff.
    pub fn with_changes<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The id, or an error naming the operation that needed it.
    pub fn require_id(&self) -> ProviderResult<&str> {
        self.id().filter(|id| !id.is_empty()).ok_or_else(|| {
            ProviderError::invalid_attribute("id", "object has no id; was it created?")
        })
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeBag {
        &mut self.attributes
    }

    pub fn has_change(&self, key: &str) -> bool {
        self.changed.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> AttributeBag {
        AttributeBag::new()
            .with("name", "db1")
            .with("port", 26257_i64)
            .with("cpu", 0.125)
            .with("enabled", true)
            .with("users", vec!["a@x", "b@x"])
            .with("mixed", AttrValue::List(vec!["a".into(), AttrValue::Bool(true)]))
    }

    #[test]
    fn absent_keys_read_as_empty() {
        let bag = AttributeBag::new();
        assert_eq!(bag.string("missing").unwrap(), "");
        assert!(!bag.bool("missing").unwrap());
        assert!(bag.string_list("missing").unwrap().is_empty());
    }

    #[test]
    fn numbers_render_as_plain_strings() {
        let bag = bag();
        assert_eq!(bag.string("port").unwrap(), "26257");
        assert_eq!(bag.string("cpu").unwrap(), "0.125");
    }

    #[test]
    fn shape_mismatches_are_invalid_attributes() {
        let bag = bag();
        assert!(matches!(
            bag.string("enabled"),
            Err(ProviderError::InvalidAttribute { ref attribute, .. }) if attribute == "enabled"
        ));
        assert!(bag.string_list("name").is_err());
        assert!(bag.string_list("mixed").is_err());
        assert!(bag.bool("name").is_err());
    }

    #[test]
    fn string_or_only_defaults_when_absent() {
        let bag = AttributeBag::new().with("memory", "");
        assert_eq!(bag.string_or("memory", "256Mi").unwrap(), "");
        assert_eq!(bag.string_or("cpu", "0.5").unwrap(), "0.5");
    }

    #[test]
    fn bag_deserialises_from_host_json() {
        let bag: AttributeBag = serde_json::from_value(serde_json::json!({
            "name": "s1",
            "is_jit_enabled": true,
            "users": ["a@x"],
            "port": 22
        }))
        .unwrap();
        assert_eq!(bag.string_list("users").unwrap(), vec!["a@x".to_string()]);
        assert!(bag.bool("is_jit_enabled").unwrap());
        assert_eq!(bag.string("port").unwrap(), "22");
    }

    #[test]
    fn resource_data_tracks_id_and_changes() {
        let mut data = ResourceData::new(bag()).with_changes(["endpoint"]);
        assert!(data.require_id().is_err());
        data.set_id("r1");
        assert_eq!(data.require_id().unwrap(), "r1");
        assert!(data.has_change("endpoint"));
        assert!(!data.has_change("name"));
        data.clear_id();
        assert_eq!(data.id(), None);
    }
}
