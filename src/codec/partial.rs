/// Building fully populated messages from sparse literals

use super::error::{CodecError, Result};
use super::schema::{Codec, FieldKind, FieldSpec};
use super::value::{Message, Value};

impl Codec {
    /// Deep-merge `partial` over this schema's defaults.
    ///
    /// Keys may be proto or lowerCamelCase names. Integers are coerced
    /// between kinds with a range check, enums accept their symbolic name,
    /// and nested messages (including repeated elements) are completed
    /// recursively. Keys that are not declared fields are rejected.
    pub fn from_partial(&self, partial: &Message) -> Result<Message> {
        let mut message = self.defaults();
        for (key, value) in partial.iter() {
            let field = self
                .field(key)
                .or_else(|| self.fields().iter().find(|f| f.json_name() == key))
                .ok_or_else(|| CodecError::mismatch(self.name(), key, "declared field", "unknown key"))?;

            let value = match value {
                Value::Unset => field.default_value(),
                value => coerce(self, field, field.kind(), value)?,
            };
            message.set(field.name(), value);
        }
        Ok(message)
    }
}

fn coerce(codec: &Codec, field: &FieldSpec, kind: &FieldKind, value: &Value) -> Result<Value> {
    let mismatch = || CodecError::mismatch(codec.name(), field.name(), kind.type_name(), value.kind_name());

    match (kind, value) {
        (FieldKind::Repeated(inner), Value::List(items)) => items
            .iter()
            .map(|item| coerce(codec, field, inner, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),
        (FieldKind::Message(nested), Value::Message(m)) => nested.from_partial(m).map(Value::Message),
        (FieldKind::Enum(spec), Value::String(name)) => {
            spec.number_of(name).map(Value::Enum).ok_or_else(mismatch)
        }
        (FieldKind::Bool, Value::Bool(_))
        | (FieldKind::String, Value::String(_))
        | (FieldKind::Bytes, Value::Bytes(_))
        | (FieldKind::Timestamp, Value::Timestamp(_)) => Ok(value.clone()),
        _ => match value.as_i128() {
            Some(n) => integer_value(kind, field.name(), n)?.ok_or_else(mismatch),
            None => Err(mismatch()),
        },
    }
}

/// Range-checked conversion of `n` into the representation of `kind`.
/// Returns `None` when `kind` is not an integer kind.
pub(crate) fn integer_value(kind: &FieldKind, field: &str, n: i128) -> Result<Option<Value>> {
    let overflow = || CodecError::overflow(field, n);
    let value = match kind {
        FieldKind::Int32 => Value::Int32(i32::try_from(n).map_err(|_| overflow())?),
        FieldKind::Enum(_) => Value::Enum(i32::try_from(n).map_err(|_| overflow())?),
        FieldKind::Int64 => Value::Int64(i64::try_from(n).map_err(|_| overflow())?),
        FieldKind::Uint32 | FieldKind::Fixed32 => {
            Value::Uint32(u32::try_from(n).map_err(|_| overflow())?)
        }
        FieldKind::Uint64 | FieldKind::Fixed64 => {
            Value::Uint64(u64::try_from(n).map_err(|_| overflow())?)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::schema::EnumSpec;
    use std::sync::Arc;

    static STATUS: EnumSpec = EnumSpec {
        name: "test.Status",
        values: &[("STATUS_UNSPECIFIED", 0), ("STATUS_ACTIVE", 1)],
    };

    fn coin() -> Arc<Codec> {
        Arc::new(
            Codec::builder("cosmos.base.v1beta1.Coin")
                .field(1, "denom", FieldKind::String)
                .field(2, "amount", FieldKind::String)
                .build()
                .unwrap(),
        )
    }

    fn transfer() -> Codec {
        Codec::builder("test.Transfer")
            .field(1, "from_address", FieldKind::String)
            .field(2, "amount", FieldKind::message(coin()))
            .field(3, "fees", FieldKind::repeated(FieldKind::message(coin())))
            .field(4, "height", FieldKind::Uint64)
            .field(5, "status", FieldKind::Enum(&STATUS))
            .optional(6, "nonce", FieldKind::Uint32)
            .build()
            .unwrap()
    }

    #[test]
    fn test_nested_defaults_are_filled() {
        let codec = transfer();
        let partial = Message::new()
            .with("amount", Message::new().with("denom", "usei"))
            .with("fees", vec![Message::new().with("amount", "5")]);

        let msg = codec.from_partial(&partial).unwrap();
        assert_eq!(msg.get_str("from_address"), Some(""));
        let amount = msg.get_message("amount").unwrap();
        assert_eq!(amount.get_str("denom"), Some("usei"));
        assert_eq!(amount.get_str("amount"), Some(""));

        let fees = msg.get_list("fees").unwrap();
        assert_eq!(fees[0].as_message().unwrap().get_str("denom"), Some(""));
        assert_eq!(msg.get("nonce"), Some(&Value::Unset));
    }

    #[test]
    fn test_integer_coercion_and_enum_names() {
        let codec = transfer();
        let partial = Message::new()
            .with("height", 7i32)
            .with("status", "STATUS_ACTIVE")
            .with("nonce", 3u64);

        let msg = codec.from_partial(&partial).unwrap();
        assert_eq!(msg.get("height"), Some(&Value::Uint64(7)));
        assert_eq!(msg.get("status"), Some(&Value::Enum(1)));
        assert_eq!(msg.get("nonce"), Some(&Value::Uint32(3)));
    }

    #[test]
    fn test_negative_into_unsigned_overflows() {
        let codec = transfer();
        let err = codec
            .from_partial(&Message::new().with("height", -1i64))
            .unwrap_err();
        assert!(matches!(err, CodecError::IntegerOverflow { ref field, .. } if field == "height"));
    }

    #[test]
    fn test_camel_case_keys_accepted() {
        let codec = transfer();
        let msg = codec
            .from_partial(&Message::new().with("fromAddress", "sei1abc"))
            .unwrap();
        assert_eq!(msg.get_str("from_address"), Some("sei1abc"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let codec = transfer();
        let err = codec
            .from_partial(&Message::new().with("memo", "hi"))
            .unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { ref field, .. } if field == "memo"));
    }

    #[test]
    fn test_from_partial_round_trips_through_wire() {
        let codec = transfer();
        let msg = codec
            .from_partial(
                &Message::new()
                    .with("from_address", "sei1abc")
                    .with("amount", Message::new().with("denom", "usei").with("amount", "10"))
                    .with("height", 12u64),
            )
            .unwrap();
        let decoded = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }
}
