/// Schema-driven protobuf codec
///
/// One generic engine replaces per-message encode/decode code: a `Codec`
/// describes a message type and drives the binary wire format, the JSON
/// projection and partial-literal construction.

pub mod error;
pub mod json;
pub mod partial;
pub mod schema;
pub mod value;
pub mod wire;
pub mod wkt;

pub use error::{CodecError, Result};
pub use json::{CodecConfig, Int64Encoding, JsonCasing, JsonProjection};
pub use schema::{Codec, CodecBuilder, EnumSpec, FieldInfo, FieldKind, FieldSpec, WireType};
pub use value::{Message, Value};

/// Declare a lazily built, shared schema.
///
/// ```ignore
/// declare_codec! {
///     pub fn coin = "cosmos.base.v1beta1.Coin" {
///         1 => denom: FieldKind::String,
///         2 => amount: FieldKind::String,
///     }
/// }
/// ```
///
/// Declarations are static data, so an invalid one is a programming error
/// and panics on first use (every declaration is exercised by tests).
macro_rules! declare_codec {
    (
        $(#[$meta:meta])*
        $vis:vis fn $fn_name:ident = $full_name:literal {
            $( $tag:literal => $field:ident : $kind:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis fn $fn_name() -> ::std::sync::Arc<$crate::codec::Codec> {
            static CODEC: ::std::sync::OnceLock<::std::sync::Arc<$crate::codec::Codec>> =
                ::std::sync::OnceLock::new();
            CODEC
                .get_or_init(|| {
                    let codec = $crate::codec::Codec::builder($full_name)
                        $( .field($tag, stringify!($field), $kind) )*
                        .build()
                        .unwrap_or_else(|e| panic!("{}", e));
                    ::std::sync::Arc::new(codec)
                })
                .clone()
        }
    };
}

pub(crate) use declare_codec;
