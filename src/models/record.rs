use mongodb::bson::{Bson, Document};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single cell value after type inference.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Maps a stored BSON value back to a scalar. Nested values have no
    /// scalar counterpart.
    pub fn from_bson(value: &Bson) -> Option<Scalar> {
        match value {
            Bson::Null => Some(Scalar::Null),
            Bson::Boolean(b) => Some(Scalar::Bool(*b)),
            Bson::Int32(i) => Some(Scalar::Int(i64::from(*i))),
            Bson::Int64(i) => Some(Scalar::Int(*i)),
            Bson::Double(f) => Some(Scalar::Float(*f)),
            Bson::String(s) => Some(Scalar::Text(s.clone())),
            _ => None,
        }
    }
}

impl From<Scalar> for Bson {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Null => Bson::Null,
            Scalar::Bool(b) => Bson::Boolean(b),
            Scalar::Int(i) => Bson::Int64(i),
            Scalar::Float(f) => Bson::Double(f),
            Scalar::Text(s) => Bson::String(s),
        }
    }
}

/// One converted row: column names mapped to values, in header order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Scalar)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Sets `key`, replacing the value in place if the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: Scalar) {
        let key = key.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Scalar> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rebuilds a record from a stored document, dropping the `_id` the store
    /// generated. Returns `None` if any other field is not a scalar.
    pub fn from_document(document: Document) -> Option<Record> {
        let mut record = Record::with_capacity(document.len());
        for (key, value) in document {
            if key == "_id" {
                continue;
            }
            record.fields.push((key, Scalar::from_bson(&value)?));
        }
        Some(record)
    }
}

impl<K: Into<String>> FromIterator<(K, Scalar)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, Scalar)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl From<Record> for Document {
    fn from(record: Record) -> Self {
        record
            .fields
            .into_iter()
            .map(|(key, value)| (key, Bson::from(value)))
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
