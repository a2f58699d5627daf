pub mod any;
pub mod error;
pub mod messages;
pub mod pagination;
pub mod proto;
pub mod queries;
pub mod rest;
pub mod store;
pub mod transport;
pub mod tx_builder;

pub use any::{pack_any, AnyValue};
pub use error::{ClientError, TransportError};
pub use messages::{Coin, MessageBuilder};
pub use pagination::{fetch_all, fetch_all_with, merge_page};
pub use proto::{MethodDescriptor, SchemaRegistry, ServiceDescriptor};
pub use queries::QueryClient;
pub use rest::{RestClient, TokenFactoryRest};
pub use store::{QueryOptions, QueryStore, RefreshReport};
pub use transport::{ClientConfig, GrpcTransport, Transport};
pub use tx_builder::{TxClient, TxResponse, TxSigner};
