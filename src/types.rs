//! Event schemas, decoded records and the transactions API wire shapes

use num_bigint::BigUint;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::address::Address;

/// Wire type of a single event field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Address,
    U64,
    BigUint,
    String,
    U8,
    Boolean,
    /// Rendered as a hex string
    #[serde(other)]
    Raw,
}

/// How to decode one value out of an event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventFieldDefinition {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub indexed: bool,
}

impl EventFieldDefinition {
    /// Field carried in a topic
    pub const fn indexed(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type, indexed: true }
    }

    /// Field carried in the data blob
    pub const fn data(name: &'static str, field_type: FieldType) -> Self {
        Self { name, field_type, indexed: false }
    }
}

/// Schema of one contract event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventDefinition {
    pub identifier: &'static str,
    pub fields: &'static [EventFieldDefinition],
}

impl EventDefinition {
    pub fn indexed_fields(&self) -> impl Iterator<Item = &'static EventFieldDefinition> {
        self.fields.iter().filter(|f| f.indexed)
    }

    pub fn data_fields(&self) -> impl Iterator<Item = &'static EventFieldDefinition> {
        self.fields.iter().filter(|f| !f.indexed)
    }
}

/// A single decoded field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    Address(Address),
    U64(u64),
    BigUint(BigUint),
    String(String),
    U8(u8),
    Boolean(bool),
    Hex(String),
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::Address(a) => a.serialize(serializer),
            DecodedValue::U64(v) => serializer.serialize_u64(*v),
            // Decimal string, JSON numbers cannot hold arbitrary precision
            DecodedValue::BigUint(v) => serializer.serialize_str(&v.to_str_radix(10)),
            DecodedValue::String(s) | DecodedValue::Hex(s) => serializer.serialize_str(s),
            DecodedValue::U8(v) => serializer.serialize_u8(*v),
            DecodedValue::Boolean(b) => serializer.serialize_bool(*b),
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Address(a) => write!(f, "{}", a),
            DecodedValue::U64(v) => write!(f, "{}", v),
            DecodedValue::BigUint(v) => write!(f, "{}", v),
            DecodedValue::String(s) | DecodedValue::Hex(s) => f.write_str(s),
            DecodedValue::U8(v) => write!(f, "{}", v),
            DecodedValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Flat record produced by matching one definition against one log entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    pub identifier: String,
    fields: Vec<(String, DecodedValue)>,
}

impl DecodedEvent {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            fields: Vec::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: DecodedValue) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn u64(&self, name: &str) -> Option<u64> {
        match self.get(name)? {
            DecodedValue::U64(v) => Some(*v),
            DecodedValue::U8(v) => Some(u64::from(*v)),
            _ => None,
        }
    }

    pub fn biguint(&self, name: &str) -> Option<&BigUint> {
        match self.get(name)? {
            DecodedValue::BigUint(v) => Some(v),
            _ => None,
        }
    }

    pub fn address(&self, name: &str) -> Option<&Address> {
        match self.get(name)? {
            DecodedValue::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            DecodedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Field names and values in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for DecodedEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("identifier", &self.identifier)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Find the first event with the given identifier and read a u64 field from it
pub fn find_u64(events: &[DecodedEvent], identifier: &str, field: &str) -> Option<u64> {
    events
        .iter()
        .filter(|e| e.identifier == identifier)
        .find_map(|e| e.u64(field))
}

/// Raw event log entry as returned by the transactions API
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    pub identifier: String,
    #[serde(default, deserialize_with = "null_topics_as_empty")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

fn null_topics_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let topics: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    Ok(topics
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionLogs {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// Chain status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Fail,
    Invalid,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, TransactionStatus::Fail | TransactionStatus::Invalid)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Fail => "fail",
            TransactionStatus::Invalid => "invalid",
            TransactionStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Subset of `GET /transactions/{hash}` consumed by the poller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(default, rename = "txHash", skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<TransactionLogs>,
}

impl TransactionResponse {
    pub fn with_status(status: TransactionStatus) -> Self {
        Self {
            tx_hash: None,
            status,
            logs: None,
        }
    }

    pub fn events(&self) -> &[RawEvent] {
        self.logs.as_ref().map(|l| l.events.as_slice()).unwrap_or(&[])
    }
}
