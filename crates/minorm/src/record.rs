//! Ordered name → value mapping.

use crate::error::{OrmError, OrmResult};
use crate::value::{FieldValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// An insertion-ordered mapping from field name to [`Value`].
///
/// This is the keyword-argument form used to build instances, supply bulk updates, and
/// carry decoded JSON objects. Inserting an existing key overwrites it in place.
///
/// ```ignore
/// let kwargs = Record::new().set("name", "Beer").set("list_id", 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or overwrite `name`, keeping the original position on overwrite.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Decode `name` into a field type. A missing key decodes like NULL.
    pub fn decode<T: FieldValue>(&self, name: &str) -> OrmResult<T> {
        let value = self.get(name).cloned().unwrap_or(Value::Null);
        T::from_value(value).map_err(|message| OrmError::decode(name, message))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Parse a JSON object string.
    pub fn from_json(raw: &str) -> OrmResult<Self> {
        match serde_json::from_str::<serde_json::Value>(raw)? {
            serde_json::Value::Object(map) => Self::from_json_object(&map),
            other => Err(OrmError::Serialization(format!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Build from a decoded JSON object. Nested arrays/objects are rejected.
    pub fn from_json_object(map: &serde_json::Map<String, serde_json::Value>) -> OrmResult<Self> {
        map.iter()
            .map(|(k, v)| Ok((k.clone(), Value::from_json(k, v)?)))
            .collect()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites_in_place() {
        let record = Record::new().set("a", 1).set("b", 2).set("a", 3);
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(record.get("a"), Some(&Value::Int(3)));
    }

    #[test]
    fn serializes_in_insertion_order() {
        let record = Record::new().set("id", 1).set("list_id", 1).set("name", "Read a book");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"id":1,"list_id":1,"name":"Read a book"}"#);
    }

    #[test]
    fn missing_key_decodes_as_null() {
        let record = Record::new();
        let v: Option<String> = record.decode("name").unwrap();
        assert_eq!(v, None);
        let err = record.decode::<String>("name").unwrap_err();
        assert!(matches!(err, OrmError::Decode { ref column, .. } if column == "name"));
    }

    #[test]
    fn from_json_requires_object() {
        assert!(Record::from_json("[1, 2]").is_err());
        assert!(Record::from_json("not json").is_err());

        let record = Record::from_json(r#"{"id": 2, "name": "Beer"}"#).unwrap();
        assert_eq!(record.get("id"), Some(&Value::Int(2)));
        assert_eq!(record.get("name"), Some(&Value::from("Beer")));
    }
}
