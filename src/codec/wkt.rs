/// google.protobuf well-known types used by the chain schemas

use super::schema::FieldKind;
use super::declare_codec;

declare_codec! {
    /// Wire layout behind `FieldKind::Timestamp`
    pub fn timestamp = "google.protobuf.Timestamp" {
        1 => seconds: FieldKind::Int64,
        2 => nanos: FieldKind::Int32,
    }
}

declare_codec! {
    pub fn duration = "google.protobuf.Duration" {
        1 => seconds: FieldKind::Int64,
        2 => nanos: FieldKind::Int32,
    }
}

declare_codec! {
    pub fn any = "google.protobuf.Any" {
        1 => type_url: FieldKind::String,
        2 => value: FieldKind::Bytes,
    }
}
