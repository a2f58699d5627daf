/// REST gateway client for the Sei token factory
use std::time::Duration;

use reqwest::{Client, Url};

use crate::codec::{Codec, JsonProjection, Message};

use super::error::{ClientError, Result, TransportError};
use super::proto::tokenfactory;
use super::transport::ClientConfig;

/// Thin JSON-over-HTTP wrapper
#[derive(Debug, Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> std::result::Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> std::result::Result<Self, TransportError> {
        Self::new(&config.rest_endpoint, Duration::from_secs(config.request_timeout))
    }

    /// Base URL extended by `segments`; each segment is percent-encoded,
    /// so denoms like `factory/sei1.../ufoo` stay one path segment
    pub fn url(&self, segments: &[&str]) -> std::result::Result<Url, TransportError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidEndpoint(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get_json(&self, url: Url) -> std::result::Result<serde_json::Value, TransportError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Http {
                status,
                url: url.to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

/// Token factory queries served by the REST gateway.
///
/// Bodies are the JSON projections of the gRPC response messages, so they
/// are parsed with the same schemas.
#[derive(Debug, Clone)]
pub struct TokenFactoryRest {
    client: RestClient,
    prefix: Vec<String>,
    projection: JsonProjection,
}

impl TokenFactoryRest {
    pub fn new(client: RestClient, prefix: &str, projection: JsonProjection) -> Self {
        let prefix = prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { client, prefix, projection }
    }

    pub fn from_config(config: &ClientConfig, projection: JsonProjection) -> std::result::Result<Self, TransportError> {
        Ok(Self::new(RestClient::from_config(config)?, &config.rest_prefix, projection))
    }

    /// GET {prefix}/params
    pub async fn params(&self) -> Result<Message> {
        let url = self.route("Params", &["params"])?;
        self.fetch("Params", url, &tokenfactory::query_params_response()).await
    }

    /// GET {prefix}/denoms/{denom}/authority_metadata
    pub async fn denom_authority_metadata(&self, denom: &str) -> Result<Message> {
        let url = self.route("DenomAuthorityMetadata", &["denoms", denom, "authority_metadata"])?;
        self.fetch(
            "DenomAuthorityMetadata",
            url,
            &tokenfactory::query_denom_authority_metadata_response(),
        )
        .await
    }

    /// GET {prefix}/denoms/metadata?denom={denom}
    pub async fn denom_metadata(&self, denom: &str) -> Result<Message> {
        let mut url = self.route("DenomMetadata", &["denoms", "metadata"])?;
        url.query_pairs_mut().append_pair("denom", denom);
        self.fetch("DenomMetadata", url, &tokenfactory::query_denom_metadata_response())
            .await
    }

    /// GET {prefix}/denoms_from_creator/{creator}
    pub async fn denoms_from_creator(&self, creator: &str) -> Result<Message> {
        let url = self.route("DenomsFromCreator", &["denoms_from_creator", creator])?;
        self.fetch(
            "DenomsFromCreator",
            url,
            &tokenfactory::query_denoms_from_creator_response(),
        )
        .await
    }

    fn route(&self, method: &str, tail: &[&str]) -> Result<Url> {
        let segments: Vec<&str> = self
            .prefix
            .iter()
            .map(String::as_str)
            .chain(tail.iter().copied())
            .collect();
        self.client
            .url(&segments)
            .map_err(|e| ClientError::transport(tokenfactory::QUERY.name, method, e))
    }

    async fn fetch(&self, method: &str, url: Url, codec: &Codec) -> Result<Message> {
        let body = self
            .client
            .get_json(url)
            .await
            .map_err(|e| ClientError::transport(tokenfactory::QUERY.name, method, e))?;
        parse_body(&self.projection, codec, &body)
    }
}

/// Gateway bodies use snake_case keys and render 64-bit integers as strings;
/// both casings are accepted and extra keys are ignored
pub(crate) fn parse_body(projection: &JsonProjection, codec: &Codec, body: &serde_json::Value) -> Result<Message> {
    Ok(projection.from_plain(codec, body)?)
}
