use thiserror::Error;

use crate::codec::CodecError;

/// Failure reported by an injected transport (gRPC channel, REST gateway, signer)
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected: {0}")]
    NotConnected(String),

    #[error("invalid endpoint or path: {0}")]
    InvalidEndpoint(String),

    #[error("gRPC status {code}: {message}")]
    Status { code: String, message: String },

    #[error("HTTP {status} from {url}: {body}")]
    Http { status: u16, url: String, body: String },

    #[error("request failed: {0}")]
    Request(String),
}

impl From<tonic::Status> for TransportError {
    fn from(status: tonic::Status) -> Self {
        TransportError::Status {
            code: format!("{:?}", status.code()),
            message: status.message().to_string(),
        }
    }
}

impl From<tonic::transport::Error> for TransportError {
    fn from(err: tonic::transport::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Request(err.to_string())
    }
}

/// Errors surfaced by the query/tx façade
#[derive(Debug, Error)]
pub enum ClientError {
    /// The RPC failed at the transport layer; never retried here
    #[error("{service}/{method} failed: {source}")]
    Transport {
        service: String,
        method: String,
        #[source]
        source: TransportError,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("unknown method {method} on {service}")]
    UnknownMethod { service: String, method: String },

    #[error("unknown type {0}")]
    UnknownType(String),

    /// A cached query failed; carries the method for the store's callers
    #[error("query {method} failed: {source}")]
    Query {
        method: String,
        #[source]
        source: Box<ClientError>,
    },

    /// The signer rejected or failed to broadcast a transaction
    #[error("signing {type_url} failed: {source}")]
    Signer {
        type_url: String,
        #[source]
        source: TransportError,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    InvalidInput { field: String, reason: String },
}

impl ClientError {
    pub(crate) fn transport(service: &str, method: &str, source: TransportError) -> Self {
        ClientError::Transport {
            service: service.to_string(),
            method: method.to_string(),
            source,
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ClientError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
