/// Packing and unpacking of `google.protobuf.Any`
///
/// Known type URLs decode through the schema registry. Anything else is kept
/// as raw bytes so newer chain types never break a query.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use crate::codec::{Codec, CodecError, JsonProjection, Message};

use super::error::{ClientError, Result};
use super::proto::SchemaRegistry;

/// Contents of an `Any` after type-URL dispatch
#[derive(Debug, Clone, PartialEq)]
pub enum AnyValue {
    Known {
        type_url: String,
        message: Message,
    },
    // Forward compatibility for types this crate does not declare
    Unsupported {
        type_url: String,
        raw: Vec<u8>,
    },
}

impl AnyValue {
    pub fn type_url(&self) -> &str {
        match self {
            AnyValue::Known { type_url, .. } | AnyValue::Unsupported { type_url, .. } => type_url,
        }
    }

    /// JSON with an `@type` discriminator, as Cosmos REST gateways render `Any`
    pub fn to_plain(&self, registry: &SchemaRegistry, projection: &JsonProjection) -> Result<serde_json::Value> {
        match self {
            AnyValue::Known { type_url, message } => {
                let codec = registry
                    .get(type_url)
                    .ok_or_else(|| ClientError::UnknownType(type_url.clone()))?;
                let mut plain = projection.to_plain(&codec, message)?;
                if let Some(object) = plain.as_object_mut() {
                    object.insert("@type".to_string(), json!(type_url));
                }
                Ok(plain)
            }
            AnyValue::Unsupported { type_url, raw } => Ok(json!({
                "@type": type_url,
                "value": STANDARD.encode(raw),
            })),
        }
    }
}

/// Encode `message` with `codec` and wrap it in an `Any`
pub fn pack_any(codec: &Codec, message: &Message) -> std::result::Result<Message, CodecError> {
    Ok(Message::new()
        .with("type_url", codec.type_url())
        .with("value", codec.encode(message)?))
}

impl SchemaRegistry {
    /// Pack a message whose schema is looked up by type URL
    pub fn pack_any(&self, type_url: &str, message: &Message) -> Result<Message> {
        let codec = self
            .get(type_url)
            .ok_or_else(|| ClientError::UnknownType(type_url.to_string()))?;
        let complete = codec.from_partial(message)?;
        Ok(pack_any(&codec, &complete)?)
    }

    /// Decode an `Any` message (`type_url`, `value`) by its type URL
    pub fn unpack_any(&self, any: &Message) -> Result<AnyValue> {
        let type_url = any.get_str("type_url").unwrap_or_default();
        let raw = any.get_bytes("value").unwrap_or_default();

        match self.get(type_url) {
            Some(codec) => {
                let message = codec.decode(raw)?;
                Ok(AnyValue::Known {
                    type_url: type_url.to_string(),
                    message,
                })
            }
            None => {
                log::warn!("Encountered unsupported Any type: {}", type_url);
                Ok(AnyValue::Unsupported {
                    type_url: type_url.to_string(),
                    raw: raw.to_vec(),
                })
            }
        }
    }
}
