// Library exports for cosmos_codec

pub mod chain;
pub mod codec;
pub mod config;

// Re-export main types for convenience
pub use chain::{ClientConfig, GrpcTransport, QueryClient, QueryStore, SchemaRegistry, TxClient};
pub use codec::{Codec, CodecConfig, CodecError, JsonProjection, Message, Value};
