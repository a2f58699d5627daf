use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// Dynamically typed field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent message, timestamp or optional scalar; distinct from a zero value
    Unset,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    String(String),
    Bytes(Vec<u8>),
    Enum(i32),
    Timestamp(DateTime<Utc>),
    Message(Message),
    List(Vec<Value>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Unset => "unset",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::Uint32(_) => "uint32",
            Value::Uint64(_) => "uint64",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Enum(_) => "enum",
            Value::Timestamp(_) => "timestamp",
            Value::Message(_) => "message",
            Value::List(_) => "list",
        }
    }

    /// Zero value under proto3 implicit presence
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Unset => true,
            Value::Bool(b) => !b,
            Value::Int32(v) | Value::Enum(v) => *v == 0,
            Value::Int64(v) => *v == 0,
            Value::Uint32(v) => *v == 0,
            Value::Uint64(v) => *v == 0,
            Value::String(s) => s.is_empty(),
            Value::Bytes(b) => b.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Timestamp(_) | Value::Message(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Value::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Any non-negative integer variant widened to u64
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::Uint32(v) => Some(v as u64),
            Value::Uint64(v) => Some(v),
            Value::Int32(v) | Value::Enum(v) => u64::try_from(v).ok(),
            Value::Int64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int32(v) | Value::Enum(v) => Some(v as i64),
            Value::Int64(v) => Some(v),
            Value::Uint32(v) => Some(v as i64),
            Value::Uint64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Integer variants widened losslessly, used for range-checked coercion
    pub fn as_i128(&self) -> Option<i128> {
        match *self {
            Value::Int32(v) | Value::Enum(v) => Some(v as i128),
            Value::Int64(v) => Some(v as i128),
            Value::Uint32(v) => Some(v as i128),
            Value::Uint64(v) => Some(v as i128),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Message> for Value {
    fn from(v: Message) -> Self {
        Value::Message(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Unset)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<Vec<Message>> for Value {
    fn from(v: Vec<Message>) -> Self {
        Value::List(v.into_iter().map(Value::Message).collect())
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Value::List(v.into_iter().map(Value::String).collect())
    }
}

/// Message instance: field name -> value.
///
/// After `decode` or `from_partial` every schema field is present. A sparse
/// instance (only some fields set) is the input to `from_partial`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    fields: BTreeMap<String, Value>,
}

impl Message {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, used to write partial literals
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(Value::as_bytes)
    }

    pub fn get_message(&self, name: &str) -> Option<&Message> {
        self.get(name).and_then(Value::as_message)
    }

    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Message {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert!(Value::String(String::new()).is_zero());
        assert!(Value::Uint64(0).is_zero());
        assert!(!Value::Bool(true).is_zero());
        // Present messages are never zero, even when empty
        assert!(!Value::Message(Message::new()).is_zero());
    }

    #[test]
    fn test_option_conversion() {
        let none: Option<&str> = None;
        assert_eq!(Value::from(none), Value::Unset);
        assert_eq!(Value::from(Some("a")), Value::String("a".to_string()));
    }

    #[test]
    fn test_typed_accessors() {
        let msg = Message::new()
            .with("moniker", "Val1")
            .with("height", 42i64)
            .with("key", vec![1u8, 2]);
        assert_eq!(msg.get_str("moniker"), Some("Val1"));
        assert_eq!(msg.get_u64("height"), Some(42));
        assert_eq!(msg.get_bytes("key"), Some(&[1u8, 2][..]));
        assert_eq!(msg.get_str("height"), None);
    }
}
