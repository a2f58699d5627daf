/// Transports that carry encoded request bytes to a chain node
///
/// The façade only ever hands a transport `(service, method, bytes)` and
/// expects response bytes back. Timeouts live here, retries nowhere.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};
use tonic::codec::{DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

use super::error::TransportError;

/// Connection settings for a Cosmos node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// gRPC endpoint URL (e.g., "https://grpc.atlantic-2.seinetwork.io:443")
    pub grpc_endpoint: String,
    /// REST gateway URL, used by the token factory REST surface
    pub rest_endpoint: String,
    /// Path prefix of the token factory REST routes
    pub rest_prefix: String,
    /// Chain ID (e.g., "atlantic-2" for Sei testnet)
    pub chain_id: String,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
    /// Request timeout in seconds
    pub request_timeout: u64,
    /// Gas limit placed in transaction fees
    pub gas_limit: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            grpc_endpoint: "https://grpc.atlantic-2.seinetwork.io:443".to_string(),
            rest_endpoint: "https://rest.atlantic-2.seinetwork.io".to_string(),
            rest_prefix: "/sei/tokenfactory/v1".to_string(),
            chain_id: "atlantic-2".to_string(),
            connection_timeout: 10,
            request_timeout: 30,
            gas_limit: 200_000,
        }
    }
}

/// Carries one unary RPC
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        service: &str,
        method: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(
        &self,
        service: &str,
        method: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        (**self).request(service, method, body).await
    }
}

/// Pass-through tonic codec: messages are already encoded by `Codec`
#[derive(Debug, Clone, Copy, Default)]
struct RawCodec;

impl tonic::codec::Codec for RawCodec {
    type Encode = Vec<u8>;
    type Decode = Vec<u8>;
    type Encoder = RawCodec;
    type Decoder = RawCodec;

    fn encoder(&mut self) -> Self::Encoder {
        RawCodec
    }

    fn decoder(&mut self) -> Self::Decoder {
        RawCodec
    }
}

impl Encoder for RawCodec {
    type Item = Vec<u8>;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> Result<(), Self::Error> {
        dst.put_slice(&item);
        Ok(())
    }
}

impl Decoder for RawCodec {
    type Item = Vec<u8>;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Self::Item>, Self::Error> {
        let mut out = vec![0u8; src.remaining()];
        src.copy_to_slice(&mut out);
        Ok(Some(out))
    }
}

/// gRPC transport over a tonic channel
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    config: ClientConfig,
    channel: Option<Channel>,
}

impl GrpcTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self { config, channel: None }
    }

    /// Connect to the gRPC endpoint
    pub async fn connect(&mut self) -> Result<(), TransportError> {
        log::info!("Connecting to {} at {}", self.config.chain_id, self.config.grpc_endpoint);

        let endpoint = Endpoint::from_shared(self.config.grpc_endpoint.clone())
            .map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?
            .timeout(Duration::from_secs(self.config.request_timeout))
            .connect_timeout(Duration::from_secs(self.config.connection_timeout));

        let channel = endpoint.connect().await?;
        self.channel = Some(channel);

        log::info!("Connected to {}", self.config.grpc_endpoint);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn channel(&self) -> Result<Channel, TransportError> {
        self.channel
            .clone()
            .ok_or_else(|| TransportError::NotConnected("call connect() first".to_string()))
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn request(
        &self,
        service: &str,
        method: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, TransportError> {
        let path: PathAndQuery = format!("/{}/{}", service, method)
            .parse()
            .map_err(|e: tonic::codegen::http::uri::InvalidUri| TransportError::InvalidEndpoint(e.to_string()))?;

        let mut grpc = tonic::client::Grpc::new(self.channel()?);
        grpc.ready()
            .await
            .map_err(|e| TransportError::NotConnected(e.to_string()))?;

        log::debug!("gRPC {} ({} bytes)", path, body.len());
        let response = grpc
            .unary(tonic::Request::new(body), path, RawCodec)
            .await?;
        Ok(response.into_inner())
    }
}
