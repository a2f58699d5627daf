/// JSON projection of messages (`to_plain` / `from_plain`)

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

use super::error::{CodecError, Result};
use super::partial::integer_value;
use super::schema::{Codec, FieldKind, FieldSpec};
use super::value::{Message, Value};
use super::wire::reject_unknown_keys;

/// Largest integer a JSON consumer can hold in a double without losing precision
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Key naming used when rendering JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonCasing {
    /// lowerCamelCase, as served by Cosmos REST gateways
    #[default]
    Camel,
    /// proto field names
    Snake,
}

/// Rendering of 64-bit integer kinds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Int64Encoding {
    /// JSON numbers; values beyond the safe-integer range are an error
    #[default]
    Number,
    /// Decimal strings, lossless for the full 64-bit range
    String,
}

/// Explicit codec configuration, passed at construction time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub casing: JsonCasing,
    pub int64: Int64Encoding,
}

/// Converts between `Message` and `serde_json::Value` under a `CodecConfig`.
///
/// Absent messages, timestamps and optional scalars are omitted from the
/// output. `from_plain` accepts either casing and treats missing or `null`
/// keys as the field default.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonProjection {
    config: CodecConfig,
}

impl JsonProjection {
    pub const fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    pub fn to_plain(&self, codec: &Codec, message: &Message) -> Result<Json> {
        reject_unknown_keys(codec, message)?;
        let mut out = Map::new();
        for field in codec.fields() {
            let value = match message.get(field.name()) {
                Some(Value::Unset) => continue,
                Some(value) => value,
                None => {
                    if field.kind().has_presence() || field.is_optional() {
                        continue;
                    }
                    let default = field.default_value();
                    out.insert(self.key(field), self.render(codec, field, field.kind(), &default)?);
                    continue;
                }
            };
            out.insert(self.key(field), self.render(codec, field, field.kind(), value)?);
        }
        Ok(Json::Object(out))
    }

    pub fn from_plain(&self, codec: &Codec, json: &Json) -> Result<Message> {
        let object = json
            .as_object()
            .ok_or_else(|| CodecError::mismatch(codec.name(), "", "object", json_kind(json)))?;

        let mut message = codec.defaults();
        for field in codec.fields() {
            let raw = object
                .get(field.json_name())
                .or_else(|| object.get(field.name()));
            match raw {
                None | Some(Json::Null) => {}
                Some(raw) => {
                    let value = self.parse(codec, field, field.kind(), raw)?;
                    message.set(field.name(), value);
                }
            }
        }
        Ok(message)
    }

    fn key(&self, field: &FieldSpec) -> String {
        match self.config.casing {
            JsonCasing::Camel => field.json_name().to_string(),
            JsonCasing::Snake => field.name().to_string(),
        }
    }

    fn render(&self, codec: &Codec, field: &FieldSpec, kind: &FieldKind, value: &Value) -> Result<Json> {
        let mismatch = || CodecError::mismatch(codec.name(), field.name(), kind.type_name(), value.kind_name());

        let json = match (kind, value) {
            (FieldKind::Repeated(inner), Value::List(items)) => Json::Array(
                items
                    .iter()
                    .map(|item| self.render(codec, field, inner, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            (FieldKind::Bool, Value::Bool(b)) => Json::Bool(*b),
            (FieldKind::Int32, Value::Int32(v)) => Json::from(*v),
            (FieldKind::Uint32 | FieldKind::Fixed32, Value::Uint32(v)) => Json::from(*v),
            (FieldKind::Int64, Value::Int64(v)) => self.render_int64(field, *v as i128)?,
            (FieldKind::Uint64 | FieldKind::Fixed64, Value::Uint64(v)) => {
                self.render_int64(field, *v as i128)?
            }
            (FieldKind::String, Value::String(s)) => Json::String(s.clone()),
            (FieldKind::Bytes, Value::Bytes(b)) => Json::String(STANDARD.encode(b)),
            (FieldKind::Enum(spec), Value::Enum(n)) => match spec.name_of(*n) {
                Some(name) => Json::String(name.to_string()),
                None => Json::from(*n),
            },
            (FieldKind::Timestamp, Value::Timestamp(t)) => {
                Json::String(t.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            (FieldKind::Message(nested), Value::Message(m)) => self.to_plain(nested, m)?,
            _ => return Err(mismatch()),
        };
        Ok(json)
    }

    fn render_int64(&self, field: &FieldSpec, n: i128) -> Result<Json> {
        match self.config.int64 {
            Int64Encoding::String => Ok(Json::String(n.to_string())),
            Int64Encoding::Number => {
                if n.unsigned_abs() > MAX_SAFE_INTEGER as u128 {
                    return Err(CodecError::overflow(field.name(), n));
                }
                // Within the safe range both conversions are exact
                Ok(if n < 0 {
                    Json::from(n as i64)
                } else {
                    Json::from(n as u64)
                })
            }
        }
    }

    fn parse(&self, codec: &Codec, field: &FieldSpec, kind: &FieldKind, raw: &Json) -> Result<Value> {
        let mismatch = || CodecError::mismatch(codec.name(), field.name(), kind.type_name(), json_kind(raw));

        let value = match (kind, raw) {
            (FieldKind::Repeated(inner), Json::Array(items)) => Value::List(
                items
                    .iter()
                    .map(|item| self.parse(codec, field, inner, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            (FieldKind::Bool, Json::Bool(b)) => Value::Bool(*b),
            (FieldKind::String, Json::String(s)) => Value::String(s.clone()),
            (FieldKind::Bytes, Json::String(s)) => {
                Value::Bytes(STANDARD.decode(s).map_err(|_| mismatch())?)
            }
            (FieldKind::Enum(spec), Json::String(name)) => match spec.number_of(name) {
                Some(n) => Value::Enum(n),
                None => Value::Enum(name.parse().map_err(|_| mismatch())?),
            },
            (FieldKind::Timestamp, Json::String(s)) => {
                let parsed = DateTime::parse_from_rfc3339(s).map_err(|_| mismatch())?;
                Value::Timestamp(parsed.with_timezone(&Utc))
            }
            (FieldKind::Message(nested), Json::Object(_)) => Value::Message(self.from_plain(nested, raw)?),
            (kind, Json::Number(n)) => {
                let n = integer_of_number(n).ok_or_else(mismatch)?;
                integer_value(kind, field.name(), n)?.ok_or_else(mismatch)?
            }
            (kind, Json::String(s)) => {
                let n: i128 = s.trim().parse().map_err(|_| mismatch())?;
                integer_value(kind, field.name(), n)?.ok_or_else(mismatch)?
            }
            _ => return Err(mismatch()),
        };
        Ok(value)
    }
}

/// Exact integer held by a JSON number; `None` for fractional values
fn integer_of_number(n: &Number) -> Option<i128> {
    if let Some(v) = n.as_i64() {
        return Some(v as i128);
    }
    if let Some(v) = n.as_u64() {
        return Some(v as i128);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f.abs() < 1e38 {
        Some(f as i128)
    } else {
        None
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl Codec {
    /// JSON projection with the default configuration (camelCase, numeric int64)
    pub fn to_plain(&self, message: &Message) -> Result<Json> {
        JsonProjection::default().to_plain(self, message)
    }

    pub fn from_plain(&self, json: &Json) -> Result<Message> {
        JsonProjection::default().from_plain(self, json)
    }
}
