//! Training metrics.
//!
//! A [`Record`] is a bag of named values produced by one step of the
//! runner or the agent; a [`Recorder`] is the sink the host installs to
//! receive them. [`LogRecorder`] writes through the `log` facade,
//! [`NullRecorder`] drops everything.
use chrono::{DateTime, Local};
use log::info;
use std::collections::{
    hash_map::{Iter, Keys},
    HashMap,
};

/// A value in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValue {
    /// Scalar.
    Scalar(f32),

    /// Date and time.
    DateTime(DateTime<Local>),

    /// Text.
    String(String),
}

/// A container of key-value pairs emitted during training/evaluation.
#[derive(Debug, Default)]
pub struct Record(HashMap<String, RecordValue>);

impl Record {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// Creates a record containing a single scalar value.
    pub fn from_scalar(name: impl Into<String>, value: f32) -> Self {
        Self(HashMap::from([(name.into(), RecordValue::Scalar(value))]))
    }

    /// Creates a record from a slice of key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, RecordValue)]) -> Self {
        Self(
            s.iter()
                .map(|(k, v)| (k.clone().into(), v.clone()))
                .collect(),
        )
    }

    /// Returns an iterator over the keys in the record.
    pub fn keys(&self) -> Keys<String, RecordValue> {
        self.0.keys()
    }

    /// Inserts a key-value pair into the record.
    pub fn insert(&mut self, k: impl Into<String>, v: RecordValue) {
        self.0.insert(k.into(), v);
    }

    /// Returns an iterator over the key-value pairs in the record.
    pub fn iter(&self) -> Iter<'_, String, RecordValue> {
        self.0.iter()
    }

    /// Gets a reference to the value associated with the given key.
    pub fn get(&self, k: &str) -> Option<&RecordValue> {
        self.0.get(k)
    }

    /// Gets a scalar value, `None` if the key is absent or not a scalar.
    pub fn get_scalar(&self, k: &str) -> Option<f32> {
        match self.0.get(k) {
            Some(RecordValue::Scalar(v)) => Some(*v),
            _ => None,
        }
    }

    /// Whether the record holds no values.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges two records, consuming both. On key collision the value of
    /// `record` wins.
    pub fn merge(self, record: Record) -> Self {
        Record(self.0.into_iter().chain(record.0).collect())
    }

    /// Merges another record into this one in place.
    pub fn merge_inplace(&mut self, record: Record) {
        for (k, v) in record.0 {
            self.0.insert(k, v);
        }
    }
}

/// Writes records to an output destination.
pub trait Recorder {
    /// Writes a record to the sink.
    fn write(&mut self, record: Record);
}

/// A recorder that ignores any record.
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    fn write(&mut self, _record: Record) {}
}

/// A recorder that writes each record as one line through [`log`].
pub struct LogRecorder {}

impl Recorder for LogRecorder {
    fn write(&mut self, record: Record) {
        let mut pairs: Vec<String> = record
            .iter()
            .map(|(k, v)| match v {
                RecordValue::Scalar(x) => format!("{}={}", k, x),
                RecordValue::DateTime(t) => format!("{}={}", k, t.to_rfc3339()),
                RecordValue::String(s) => format!("{}={}", k, s),
            })
            .collect();
        pairs.sort();
        info!("{}", pairs.join(" "));
    }
}
