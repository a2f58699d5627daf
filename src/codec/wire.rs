/// Protobuf binary encoding driven by a `Codec` schema

use bytes::Buf;
use chrono::{DateTime, Utc};
use prost::encoding::{decode_varint, encode_varint};

use super::error::{CodecError, Result};
use super::schema::{Codec, FieldKind, FieldSpec, WireType, MAX_TAG};
use super::value::{Message, Value};
use super::wkt;

/// Maximum nesting depth accepted by `decode`
pub const RECURSION_LIMIT: u32 = 100;

impl Codec {
    /// Serialize a message in schema declaration order.
    ///
    /// Scalars equal to their zero value are skipped (implicit presence);
    /// messages, timestamps and optional scalars are written iff set.
    pub fn encode(&self, message: &Message) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        encode_message(self, message, &mut buf)?;
        Ok(buf)
    }

    /// Decode a whole buffer, starting from the all-defaults instance.
    /// Unknown tags are skipped.
    pub fn decode(&self, bytes: &[u8]) -> Result<Message> {
        self.decode_length(bytes, bytes.len())
    }

    /// Decode only the first `length` bytes of `bytes`
    pub fn decode_length(&self, bytes: &[u8], length: usize) -> Result<Message> {
        if length > bytes.len() {
            return Err(CodecError::malformed(
                bytes.len(),
                format!("declared length {} exceeds buffer of {} bytes", length, bytes.len()),
            ));
        }
        let mut reader = Reader::new(&bytes[..length], 0);
        decode_message(self, &mut reader, 0)
    }
}

// ---- Encoding ----

fn put_key(tag: u32, wire_type: WireType, buf: &mut Vec<u8>) {
    encode_varint(((tag as u64) << 3) | wire_type.bits() as u64, buf);
}

fn put_len_delimited(tag: u32, payload: &[u8], buf: &mut Vec<u8>) {
    put_key(tag, WireType::LengthDelimited, buf);
    encode_varint(payload.len() as u64, buf);
    buf.extend_from_slice(payload);
}

fn mismatch(codec: &Codec, field: &FieldSpec, expected: &FieldKind, found: &Value) -> CodecError {
    CodecError::mismatch(codec.name(), field.name(), expected.type_name(), found.kind_name())
}

/// Whether a runtime value is acceptable for a declared (non-repeated) kind
fn fits(kind: &FieldKind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (FieldKind::Bool, Value::Bool(_))
            | (FieldKind::Int32, Value::Int32(_))
            | (FieldKind::Int64, Value::Int64(_))
            | (FieldKind::Uint32 | FieldKind::Fixed32, Value::Uint32(_))
            | (FieldKind::Uint64 | FieldKind::Fixed64, Value::Uint64(_))
            | (FieldKind::String, Value::String(_))
            | (FieldKind::Bytes, Value::Bytes(_))
            | (FieldKind::Enum(_), Value::Enum(_))
            | (FieldKind::Message(_), Value::Message(_))
            | (FieldKind::Timestamp, Value::Timestamp(_))
    )
}

/// Every key of `message` must name a declared field
pub(crate) fn reject_unknown_keys(codec: &Codec, message: &Message) -> Result<()> {
    match message.iter().find(|(key, _)| codec.field(key).is_none()) {
        Some((key, _)) => Err(CodecError::mismatch(codec.name(), key, "declared field", "unknown key")),
        None => Ok(()),
    }
}

fn encode_message(codec: &Codec, message: &Message, buf: &mut Vec<u8>) -> Result<()> {
    reject_unknown_keys(codec, message)?;
    for field in codec.fields() {
        let value = match message.get(field.name()) {
            Some(value) => value,
            None => continue,
        };

        match (field.kind(), value) {
            (_, Value::Unset) => {}
            (FieldKind::Repeated(inner), Value::List(items)) => {
                encode_repeated(codec, field, inner, items, buf)?;
            }
            (kind, value) => {
                if !fits(kind, value) {
                    return Err(mismatch(codec, field, kind, value));
                }
                if value.is_zero() && !field.is_optional() && !kind.has_presence() {
                    continue;
                }
                encode_single(codec, field, kind, value, buf)?;
            }
        }
    }
    Ok(())
}

fn encode_repeated(
    codec: &Codec,
    field: &FieldSpec,
    inner: &FieldKind,
    items: &[Value],
    buf: &mut Vec<u8>,
) -> Result<()> {
    if let Some(bad) = items.iter().find(|item| !fits(inner, item)) {
        return Err(mismatch(codec, field, inner, bad));
    }

    if inner.is_packable() {
        if items.is_empty() {
            return Ok(());
        }
        let mut payload = Vec::new();
        for item in items {
            encode_scalar(codec, field, inner, item, &mut payload)?;
        }
        put_len_delimited(field.tag(), &payload, buf);
        return Ok(());
    }

    // Elements of a repeated field are always written, zero or not
    for item in items {
        encode_single(codec, field, inner, item, buf)?;
    }
    Ok(())
}

fn encode_single(
    codec: &Codec,
    field: &FieldSpec,
    kind: &FieldKind,
    value: &Value,
    buf: &mut Vec<u8>,
) -> Result<()> {
    match (kind, value) {
        (FieldKind::Message(nested), Value::Message(m)) => {
            let mut payload = Vec::new();
            encode_message(nested, m, &mut payload)?;
            put_len_delimited(field.tag(), &payload, buf);
        }
        (FieldKind::Timestamp, Value::Timestamp(t)) => {
            let mut payload = Vec::new();
            encode_message(&wkt::timestamp(), &timestamp_to_message(t), &mut payload)?;
            put_len_delimited(field.tag(), &payload, buf);
        }
        (FieldKind::String, Value::String(s)) => put_len_delimited(field.tag(), s.as_bytes(), buf),
        (FieldKind::Bytes, Value::Bytes(b)) => put_len_delimited(field.tag(), b, buf),
        (kind, value) => {
            put_key(field.tag(), kind.wire_type(), buf);
            encode_scalar(codec, field, kind, value, buf)?;
        }
    }
    Ok(())
}

/// Payload of a varint/fixed scalar, without its key
fn encode_scalar(
    codec: &Codec,
    field: &FieldSpec,
    kind: &FieldKind,
    value: &Value,
    buf: &mut Vec<u8>,
) -> Result<()> {
    match (kind, value) {
        (FieldKind::Bool, Value::Bool(b)) => encode_varint(*b as u64, buf),
        // Negative int32/enum values are sign-extended to ten bytes
        (FieldKind::Int32, Value::Int32(v)) | (FieldKind::Enum(_), Value::Enum(v)) => {
            encode_varint(*v as i64 as u64, buf)
        }
        (FieldKind::Int64, Value::Int64(v)) => encode_varint(*v as u64, buf),
        (FieldKind::Uint32, Value::Uint32(v)) => encode_varint(*v as u64, buf),
        (FieldKind::Uint64, Value::Uint64(v)) => encode_varint(*v, buf),
        (FieldKind::Fixed32, Value::Uint32(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (FieldKind::Fixed64, Value::Uint64(v)) => buf.extend_from_slice(&v.to_le_bytes()),
        (kind, value) => return Err(mismatch(codec, field, kind, value)),
    }
    Ok(())
}

pub(crate) fn timestamp_to_message(t: &DateTime<Utc>) -> Message {
    Message::new()
        .with("seconds", t.timestamp())
        .with("nanos", t.timestamp_subsec_nanos() as i32)
}

pub(crate) fn timestamp_from_message(m: &Message, offset: usize) -> Result<DateTime<Utc>> {
    let seconds = m.get_i64("seconds").unwrap_or(0);
    let nanos = m.get_i64("nanos").unwrap_or(0);
    let nanos = u32::try_from(nanos)
        .ok()
        .filter(|n| *n < 1_000_000_000)
        .ok_or_else(|| CodecError::malformed(offset, format!("timestamp nanos {} out of range", nanos)))?;
    DateTime::from_timestamp(seconds, nanos)
        .ok_or_else(|| CodecError::malformed(offset, format!("timestamp seconds {} out of range", seconds)))
}

// ---- Decoding ----

/// Bounded cursor over a byte slice; offsets are reported relative to the
/// outermost buffer.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn varint(&mut self) -> Result<u64> {
        let at = self.offset();
        let mut slice = &self.buf[self.pos..];
        let before = slice.len();
        let value = decode_varint(&mut slice)
            .map_err(|e| CodecError::malformed(at, format!("bad varint: {}", e)))?;
        self.pos += before - slice.len();
        Ok(value)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(CodecError::malformed(
                self.offset(),
                format!("{} bytes needed but only {} remain", len, self.remaining()),
            ));
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    /// Read a length prefix and return the payload with its absolute offset
    fn length_delimited(&mut self) -> Result<(&'a [u8], usize)> {
        let at = self.offset();
        let len = self.varint()?;
        let len = usize::try_from(len)
            .ok()
            .filter(|len| *len <= self.remaining())
            .ok_or_else(|| {
                CodecError::malformed(
                    at,
                    format!("length prefix {} overruns buffer ({} bytes remain)", len, self.remaining()),
                )
            })?;
        let payload_at = self.offset();
        Ok((self.take(len)?, payload_at))
    }

    fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => {
                self.varint()?;
            }
            WireType::Fixed64 => {
                self.take(8)?;
            }
            WireType::Fixed32 => {
                self.take(4)?;
            }
            WireType::LengthDelimited => {
                self.length_delimited()?;
            }
        }
        Ok(())
    }
}

fn decode_message(codec: &Codec, reader: &mut Reader<'_>, depth: u32) -> Result<Message> {
    if depth > RECURSION_LIMIT {
        return Err(CodecError::malformed(reader.offset(), "recursion limit reached"));
    }

    let mut message = codec.defaults();
    while !reader.is_empty() {
        let key_at = reader.offset();
        let key = reader.varint()?;
        let tag = key >> 3;
        let wire_type = WireType::from_bits(key & 7).ok_or_else(|| {
            CodecError::malformed(key_at, format!("unsupported wire type {}", key & 7))
        })?;
        if tag == 0 || tag > MAX_TAG as u64 {
            return Err(CodecError::malformed(key_at, format!("invalid field tag {}", tag)));
        }

        match codec.field_by_tag(tag as u32) {
            Some(field) => decode_field(field, wire_type, key_at, reader, &mut message, depth)?,
            None => reader.skip(wire_type)?,
        }
    }
    Ok(message)
}

fn decode_field(
    field: &FieldSpec,
    wire_type: WireType,
    key_at: usize,
    reader: &mut Reader<'_>,
    message: &mut Message,
    depth: u32,
) -> Result<()> {
    let wrong_wire = |expected: WireType| {
        CodecError::malformed(
            key_at,
            format!("field {} expects {} but found {}", field.name(), expected, wire_type),
        )
    };

    match field.kind() {
        FieldKind::Repeated(inner) => {
            let mut decoded = Vec::new();
            if inner.is_packable() && wire_type == WireType::LengthDelimited {
                let (payload, at) = reader.length_delimited()?;
                let mut packed = Reader::new(payload, at);
                while !packed.is_empty() {
                    decoded.push(read_scalar(inner, &mut packed)?);
                }
            } else if wire_type == inner.wire_type() {
                decoded.push(read_value(inner, reader, depth)?);
            } else {
                return Err(wrong_wire(inner.wire_type()));
            }

            // Each wire occurrence appends to what was already decoded
            match message.get_mut(field.name()) {
                Some(Value::List(items)) => items.extend(decoded),
                _ => message.set(field.name(), Value::List(decoded)),
            }
        }
        kind => {
            if wire_type != kind.wire_type() {
                return Err(wrong_wire(kind.wire_type()));
            }
            let value = read_value(kind, reader, depth)?;
            message.set(field.name(), value);
        }
    }
    Ok(())
}

fn read_value(kind: &FieldKind, reader: &mut Reader<'_>, depth: u32) -> Result<Value> {
    match kind {
        FieldKind::Message(nested) => {
            let (payload, at) = reader.length_delimited()?;
            let mut inner = Reader::new(payload, at);
            Ok(Value::Message(decode_message(nested, &mut inner, depth + 1)?))
        }
        FieldKind::Timestamp => {
            let (payload, at) = reader.length_delimited()?;
            let mut inner = Reader::new(payload, at);
            let raw = decode_message(&wkt::timestamp(), &mut inner, depth + 1)?;
            Ok(Value::Timestamp(timestamp_from_message(&raw, at)?))
        }
        FieldKind::String => {
            let (payload, at) = reader.length_delimited()?;
            let text = std::str::from_utf8(payload)
                .map_err(|e| CodecError::malformed(at, format!("invalid UTF-8 in string: {}", e)))?;
            Ok(Value::String(text.to_string()))
        }
        FieldKind::Bytes => {
            let (payload, _) = reader.length_delimited()?;
            Ok(Value::Bytes(payload.to_vec()))
        }
        scalar => read_scalar(scalar, reader),
    }
}

fn read_scalar(kind: &FieldKind, reader: &mut Reader<'_>) -> Result<Value> {
    let value = match kind {
        FieldKind::Bool => Value::Bool(reader.varint()? != 0),
        // int32 keeps the low 32 bits of the sign-extended varint
        FieldKind::Int32 => Value::Int32(reader.varint()? as i64 as i32),
        FieldKind::Int64 => Value::Int64(reader.varint()? as i64),
        FieldKind::Uint32 => Value::Uint32(reader.varint()? as u32),
        FieldKind::Uint64 => Value::Uint64(reader.varint()?),
        FieldKind::Enum(_) => Value::Enum(reader.varint()? as i64 as i32),
        FieldKind::Fixed32 => Value::Uint32(reader.take(4)?.get_u32_le()),
        FieldKind::Fixed64 => Value::Uint64(reader.take(8)?.get_u64_le()),
        other => {
            return Err(CodecError::malformed(
                reader.offset(),
                format!("{} cannot appear in a packed field", other.type_name()),
            ))
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn description() -> Codec {
        Codec::builder("cosmos.staking.v1beta1.Description")
            .field(1, "moniker", FieldKind::String)
            .field(2, "identity", FieldKind::String)
            .field(3, "website", FieldKind::String)
            .field(4, "security_contact", FieldKind::String)
            .field(5, "details", FieldKind::String)
            .build()
            .unwrap()
    }

    fn sample() -> Codec {
        let inner = Arc::new(
            Codec::builder("test.Inner")
                .field(1, "label", FieldKind::String)
                .field(2, "weight", FieldKind::Int32)
                .build()
                .unwrap(),
        );
        Codec::builder("test.Sample")
            .field(1, "name", FieldKind::String)
            .field(2, "height", FieldKind::Int64)
            .field(3, "inner", FieldKind::message(inner.clone()))
            .field(4, "heights", FieldKind::repeated(FieldKind::Uint64))
            .field(5, "items", FieldKind::repeated(FieldKind::message(inner)))
            .field(6, "when", FieldKind::Timestamp)
            .field(7, "checksum", FieldKind::Fixed32)
            .field(8, "nonce", FieldKind::Fixed64)
            .field(9, "flag", FieldKind::Bool)
            .field(10, "blob", FieldKind::Bytes)
            .build()
            .unwrap()
    }

    fn populated(codec: &Codec) -> Message {
        let mut msg = codec.defaults();
        msg.set("name", "node-1");
        msg.set("height", 300i64);
        msg.set("inner", Message::new().with("label", "a").with("weight", -2));
        msg.set("heights", vec![Value::Uint64(1), Value::Uint64(0), Value::Uint64(70_000)]);
        msg.set("items", vec![Message::new().with("label", "x").with("weight", 0)]);
        msg.set("when", Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
        msg.set("checksum", 0xDEAD_BEEFu32);
        msg.set("nonce", u64::MAX);
        msg.set("flag", true);
        msg.set("blob", vec![0u8, 1, 2]);
        msg
    }

    #[test]
    fn test_description_known_bytes() {
        let codec = description();
        let msg = codec
            .defaults()
            .with("moniker", "Val1");
        let bytes = codec.encode(&msg).unwrap();
        assert_eq!(bytes, vec![0x0A, 0x04, 0x56, 0x61, 0x6C, 0x31]);
    }

    #[test]
    fn test_round_trip() {
        let codec = sample();
        let msg = populated(&codec);
        let decoded = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_absent_message_stays_unset() {
        let codec = sample();
        let decoded = codec.decode(&[]).unwrap();
        assert_eq!(decoded.get("inner"), Some(&Value::Unset));
        assert_eq!(decoded.get("when"), Some(&Value::Unset));

        // An empty but present nested message is written as a zero-length record
        let msg = codec.defaults().with("inner", Message::new());
        let bytes = codec.encode(&msg).unwrap();
        assert_eq!(bytes, vec![0x1A, 0x00]);
        let decoded = codec.decode(&bytes).unwrap();
        assert!(matches!(decoded.get("inner"), Some(Value::Message(_))));
    }

    #[test]
    fn test_reencode_is_stable() {
        let codec = sample();
        let first = codec.decode(&codec.encode(&populated(&codec)).unwrap()).unwrap();
        let second = codec.decode(&codec.encode(&first).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let codec = description();
        let mut bytes = vec![0x0A, 0x04, b'V', b'a', b'l', b'1'];
        // tag 15 varint, tag 16 length-delimited, tag 17 fixed32, tag 18 fixed64
        bytes.extend_from_slice(&[0x78, 0x96, 0x01]);
        bytes.extend_from_slice(&[0x82, 0x01, 0x02, 0xFF, 0xFF]);
        bytes.extend_from_slice(&[0x8D, 0x01, 1, 2, 3, 4]);
        bytes.extend_from_slice(&[0x91, 0x01, 1, 2, 3, 4, 5, 6, 7, 8]);
        bytes.extend_from_slice(&[0x12, 0x02, b'i', b'd']);

        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded.get_str("moniker"), Some("Val1"));
        assert_eq!(decoded.get_str("identity"), Some("id"));
    }

    #[test]
    fn test_truncation_is_detected() {
        let codec = sample();
        let full = populated(&codec);
        let bytes = codec.encode(&full).unwrap();

        // Offsets where one top-level field ends and the next begins
        let mut boundaries = vec![0];
        let mut partial = Message::new();
        for field in codec.fields() {
            partial.set(field.name(), full.get(field.name()).unwrap().clone());
            boundaries.push(codec.encode(&partial).unwrap().len());
        }

        for cut in 0..bytes.len() {
            let result = codec.decode(&bytes[..cut]);
            if boundaries.contains(&cut) {
                assert!(result.is_ok(), "cut at field boundary {} should decode", cut);
            } else {
                assert!(
                    matches!(result, Err(CodecError::MalformedInput { .. })),
                    "cut at {} should be malformed",
                    cut
                );
            }
        }
    }

    #[test]
    fn test_length_prefix_overrun_reports_offset() {
        let codec = description();
        let err = codec.decode(&[0x0A, 0x05, b'V', b'a']).unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedInput {
                offset: 1,
                reason: "length prefix 5 overruns buffer (2 bytes remain)".to_string(),
            }
        );
    }

    #[test]
    fn test_unterminated_varint() {
        let codec = sample();
        let err = codec.decode(&[0x10, 0xFF, 0xFF]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedInput { offset: 1, .. }));
    }

    #[test]
    fn test_repeated_accumulates_packed_and_unpacked() {
        let codec = sample();
        // packed [1, 2], then an unpacked 3, then packed [4]
        let bytes = [0x22, 0x02, 0x01, 0x02, 0x20, 0x03, 0x22, 0x01, 0x04];
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(
            decoded.get_list("heights").unwrap(),
            &[Value::Uint64(1), Value::Uint64(2), Value::Uint64(3), Value::Uint64(4)]
        );
    }

    #[test]
    fn test_negative_int32_is_sign_extended() {
        let codec = Codec::builder("test.Neg")
            .field(1, "v", FieldKind::Int32)
            .build()
            .unwrap();
        let bytes = codec.encode(&Message::new().with("v", -1)).unwrap();
        assert_eq!(bytes.len(), 11);
        assert_eq!(codec.decode(&bytes).unwrap().get("v"), Some(&Value::Int32(-1)));
    }

    #[test]
    fn test_wire_type_mismatch_is_malformed() {
        let codec = description();
        // tag 1 as varint while the schema says string
        let err = codec.decode(&[0x08, 0x01]).unwrap_err();
        assert!(matches!(err, CodecError::MalformedInput { offset: 0, .. }));
    }

    #[test]
    fn test_group_wire_type_rejected() {
        let codec = description();
        assert!(codec.decode(&[0x0B]).is_err());
    }

    #[test]
    fn test_decode_with_explicit_length() {
        let codec = description();
        let bytes = [0x0A, 0x01, b'A', 0x12, 0x01, b'B'];
        let decoded = codec.decode_length(&bytes, 3).unwrap();
        assert_eq!(decoded.get_str("moniker"), Some("A"));
        assert_eq!(decoded.get_str("identity"), Some(""));
        assert!(codec.decode_length(&bytes, 7).is_err());
    }

    #[test]
    fn test_encode_rejects_mistyped_value() {
        let codec = description();
        let err = codec.encode(&Message::new().with("moniker", 5u64)).unwrap_err();
        assert!(matches!(err, CodecError::SchemaMismatch { ref field, .. } if field == "moniker"));
    }

    #[test]
    fn test_encode_rejects_undeclared_key() {
        let codec = description();
        let msg = Message::new()
            .with("moniker", "Val1")
            .with("securityContact", "ops@example.com");
        let err = codec.encode(&msg).unwrap_err();
        assert_eq!(
            err,
            CodecError::SchemaMismatch {
                schema: "cosmos.staking.v1beta1.Description".to_string(),
                field: "securityContact".to_string(),
                expected: "declared field".to_string(),
                found: "unknown key".to_string(),
            }
        );

        // Nested messages are checked too
        let codec = sample();
        let msg = codec
            .defaults()
            .with("inner", Message::new().with("lable", "typo"));
        assert!(matches!(
            codec.encode(&msg),
            Err(CodecError::SchemaMismatch { ref field, .. }) if field == "lable"
        ));
    }

    #[test]
    fn test_recursion_limit() {
        let mut current = Arc::new(Codec::builder("test.Leaf").build().unwrap());
        for depth in 0..=RECURSION_LIMIT + 1 {
            current = Arc::new(
                Codec::builder(format!("test.Level{}", depth))
                    .field(1, "child", FieldKind::message(current))
                    .build()
                    .unwrap(),
            );
        }

        let mut payload: Vec<u8> = Vec::new();
        for _ in 0..=RECURSION_LIMIT + 1 {
            let mut wrapped = Vec::new();
            put_len_delimited(1, &payload, &mut wrapped);
            payload = wrapped;
        }
        assert!(matches!(
            current.decode(&payload),
            Err(CodecError::MalformedInput { .. })
        ));
    }
}
