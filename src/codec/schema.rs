/// Schema model for the wire codec engine
///
/// A `Codec` is an immutable, ordered list of `FieldSpec`s. All encode/decode
/// and JSON projection logic is driven from this metadata instead of being
/// written out per message type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::{CodecError, Result};
use super::value::{Message, Value};

/// Largest field number protobuf allows (2^29 - 1)
pub const MAX_TAG: u32 = 536_870_911;

/// Field numbers reserved by the protobuf implementation
const RESERVED_TAGS: std::ops::RangeInclusive<u32> = 19_000..=19_999;

/// Protobuf wire types supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Map the low three bits of a field key to a wire type.
    /// Group wire types (3, 4) are deprecated and not supported.
    pub fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Fixed64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Fixed32),
            _ => None,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Varint => "VARINT",
            WireType::Fixed64 => "FIXED64",
            WireType::LengthDelimited => "LENGTH_DELIMITED",
            WireType::Fixed32 => "FIXED32",
        };
        f.write_str(name)
    }
}

/// Symbolic names for an enum field
#[derive(Debug)]
pub struct EnumSpec {
    pub name: &'static str,
    pub values: &'static [(&'static str, i32)],
}

impl EnumSpec {
    pub fn name_of(&self, number: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| *name)
    }

    pub fn number_of(&self, name: &str) -> Option<i32> {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, number)| *number)
    }
}

/// Declared type of a field
#[derive(Debug, Clone)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Fixed32,
    Fixed64,
    String,
    Bytes,
    Enum(&'static EnumSpec),
    Message(Arc<Codec>),
    /// google.protobuf.Timestamp, held in memory as a UTC date-time
    Timestamp,
    Repeated(Box<FieldKind>),
}

impl FieldKind {
    pub fn repeated(inner: FieldKind) -> Self {
        FieldKind::Repeated(Box::new(inner))
    }

    pub fn message(codec: Arc<Codec>) -> Self {
        FieldKind::Message(codec)
    }

    /// Wire type of one element of this kind
    pub fn wire_type(&self) -> WireType {
        match self {
            FieldKind::Bool
            | FieldKind::Int32
            | FieldKind::Int64
            | FieldKind::Uint32
            | FieldKind::Uint64
            | FieldKind::Enum(_) => WireType::Varint,
            FieldKind::Fixed64 => WireType::Fixed64,
            FieldKind::Fixed32 => WireType::Fixed32,
            FieldKind::String
            | FieldKind::Bytes
            | FieldKind::Message(_)
            | FieldKind::Timestamp => WireType::LengthDelimited,
            FieldKind::Repeated(inner) => inner.wire_type(),
        }
    }

    /// Scalars whose repeated form is written as a single packed record
    pub fn is_packable(&self) -> bool {
        matches!(
            self.wire_type(),
            WireType::Varint | WireType::Fixed32 | WireType::Fixed64
        ) && !matches!(self, FieldKind::Repeated(_))
    }

    /// Fields whose absence is tracked explicitly rather than by zero value
    pub fn has_presence(&self) -> bool {
        matches!(self, FieldKind::Message(_) | FieldKind::Timestamp)
    }

    /// Zero value used when a field is not on the wire
    pub fn default_value(&self) -> Value {
        match self {
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Int32 => Value::Int32(0),
            FieldKind::Int64 => Value::Int64(0),
            FieldKind::Uint32 | FieldKind::Fixed32 => Value::Uint32(0),
            FieldKind::Uint64 | FieldKind::Fixed64 => Value::Uint64(0),
            FieldKind::String => Value::String(String::new()),
            FieldKind::Bytes => Value::Bytes(Vec::new()),
            FieldKind::Enum(_) => Value::Enum(0),
            FieldKind::Message(_) | FieldKind::Timestamp => Value::Unset,
            FieldKind::Repeated(_) => Value::List(Vec::new()),
        }
    }

    /// Human readable kind name, e.g. `repeated cosmos.base.v1beta1.Coin`
    pub fn type_name(&self) -> String {
        match self {
            FieldKind::Bool => "bool".to_string(),
            FieldKind::Int32 => "int32".to_string(),
            FieldKind::Int64 => "int64".to_string(),
            FieldKind::Uint32 => "uint32".to_string(),
            FieldKind::Uint64 => "uint64".to_string(),
            FieldKind::Fixed32 => "fixed32".to_string(),
            FieldKind::Fixed64 => "fixed64".to_string(),
            FieldKind::String => "string".to_string(),
            FieldKind::Bytes => "bytes".to_string(),
            FieldKind::Enum(spec) => spec.name.to_string(),
            FieldKind::Message(codec) => codec.name().to_string(),
            FieldKind::Timestamp => "google.protobuf.Timestamp".to_string(),
            FieldKind::Repeated(inner) => format!("repeated {}", inner.type_name()),
        }
    }
}

/// One field of a message schema
#[derive(Debug, Clone)]
pub struct FieldSpec {
    tag: u32,
    name: String,
    json_name: String,
    kind: FieldKind,
    wire_type: WireType,
    optional: bool,
}

impl FieldSpec {
    pub fn tag(&self) -> u32 {
        self.tag
    }

    /// Proto (snake_case) field name; the key used in `Message`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// lowerCamelCase name used by the JSON projection
    pub fn json_name(&self) -> &str {
        &self.json_name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// True for proto3 `optional` scalars, which are encoded whenever set
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.kind, FieldKind::Repeated(_))
    }

    pub fn default_value(&self) -> Value {
        if self.optional {
            Value::Unset
        } else {
            self.kind.default_value()
        }
    }
}

/// Static description of a field, as reported by `Codec::describe`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub json_name: String,
    pub tag: u32,
    pub wire_type: String,
    pub kind: String,
}

/// Immutable schema for one message type
#[derive(Debug)]
pub struct Codec {
    name: String,
    fields: Vec<FieldSpec>,
    by_tag: HashMap<u32, usize>,
    by_name: HashMap<String, usize>,
}

impl Codec {
    pub fn builder(name: impl Into<String>) -> CodecBuilder {
        CodecBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Fully-qualified message name, e.g. `cosmos.staking.v1beta1.Description`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type URL used when the message is packed into a `google.protobuf.Any`
    pub fn type_url(&self) -> String {
        format!("/{}", self.name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&FieldSpec> {
        self.by_tag.get(&tag).map(|&i| &self.fields[i])
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Fully populated instance holding every field's default
    pub fn defaults(&self) -> Message {
        let mut message = Message::new();
        for field in &self.fields {
            message.set(field.name.clone(), field.default_value());
        }
        message
    }

    pub fn describe(&self) -> Vec<FieldInfo> {
        self.fields
            .iter()
            .map(|f| FieldInfo {
                name: f.name.clone(),
                json_name: f.json_name.clone(),
                tag: f.tag,
                wire_type: f.wire_type.to_string(),
                kind: f.kind.type_name(),
            })
            .collect()
    }
}

/// Builder that validates a schema before it becomes an immutable `Codec`
pub struct CodecBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl CodecBuilder {
    pub fn field(self, tag: u32, name: &str, kind: FieldKind) -> Self {
        self.push(tag, name, kind, false)
    }

    /// proto3 `optional` scalar with explicit presence
    pub fn optional(self, tag: u32, name: &str, kind: FieldKind) -> Self {
        self.push(tag, name, kind, true)
    }

    fn push(mut self, tag: u32, name: &str, kind: FieldKind, optional: bool) -> Self {
        let wire_type = match &kind {
            FieldKind::Repeated(inner) if inner.is_packable() => WireType::LengthDelimited,
            other => other.wire_type(),
        };
        self.fields.push(FieldSpec {
            tag,
            name: name.to_string(),
            json_name: lower_camel_case(name),
            kind,
            wire_type,
            optional,
        });
        self
    }

    pub fn build(self) -> Result<Codec> {
        let invalid = |reason: String| CodecError::InvalidSchema {
            schema: self.name.clone(),
            reason,
        };

        let mut by_tag = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, field) in self.fields.iter().enumerate() {
            if field.tag == 0 || field.tag > MAX_TAG {
                return Err(invalid(format!("field {} has tag {} outside 1..={}", field.name, field.tag, MAX_TAG)));
            }
            if RESERVED_TAGS.contains(&field.tag) {
                return Err(invalid(format!("field {} uses reserved tag {}", field.name, field.tag)));
            }
            if field.name.is_empty() {
                return Err(invalid(format!("field with tag {} has no name", field.tag)));
            }
            if let FieldKind::Repeated(inner) = &field.kind {
                if matches!(**inner, FieldKind::Repeated(_)) {
                    return Err(invalid(format!("field {} nests repeated inside repeated", field.name)));
                }
            }
            if field.optional && (field.is_repeated() || field.kind.has_presence()) {
                return Err(invalid(format!("field {} cannot be marked optional", field.name)));
            }
            if by_tag.insert(field.tag, index).is_some() {
                return Err(invalid(format!("duplicate tag {}", field.tag)));
            }
            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(invalid(format!("duplicate field name {}", field.name)));
            }
        }

        Ok(Codec {
            name: self.name,
            fields: self.fields,
            by_tag,
            by_name,
        })
    }
}

/// `security_contact` -> `securityContact`
pub fn lower_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
