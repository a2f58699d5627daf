/// Query façade - encodes requests with the declared schemas, sends them over
/// an injected transport and decodes the responses

use crate::codec::Message;

use super::any::AnyValue;
use super::error::{ClientError, Result};
use super::pagination::fetch_all;
use super::proto::{ibc_client, staking, tokenfactory, MethodDescriptor, SchemaRegistry, ServiceDescriptor};
use super::transport::Transport;

/// Query client for one gRPC service. The transport can be shared between
/// clients (`Arc<GrpcTransport>` implements `Transport`).
#[derive(Debug, Clone)]
pub struct QueryClient<T> {
    transport: T,
    service: &'static ServiceDescriptor,
}

impl<T: Transport> QueryClient<T> {
    pub fn new(transport: T, service: &'static ServiceDescriptor) -> Self {
        Self { transport, service }
    }

    /// `cosmos.staking.v1beta1.Query`
    pub fn staking(transport: T) -> Self {
        Self::new(transport, &staking::QUERY)
    }

    /// `ibc.core.client.v1.Query`
    pub fn ibc_client(transport: T) -> Self {
        Self::new(transport, &ibc_client::QUERY)
    }

    /// `sei.tokenfactory.v1.Query`
    pub fn tokenfactory(transport: T) -> Self {
        Self::new(transport, &tokenfactory::QUERY)
    }

    pub fn service(&self) -> &'static ServiceDescriptor {
        self.service
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn method(&self, name: &str) -> Result<&'static MethodDescriptor> {
        self.service
            .method(name)
            .ok_or_else(|| ClientError::UnknownMethod {
                service: self.service.name.to_string(),
                method: name.to_string(),
            })
    }

    /// from_partial -> encode -> transport -> decode.
    ///
    /// Transport failures come back as `ClientError::Transport` naming the
    /// RPC; nothing is retried.
    pub async fn call(&self, method: &str, request: &Message) -> Result<Message> {
        let descriptor = self.method(method)?;
        let request_codec = (descriptor.request)();
        let body = request_codec.encode(&request_codec.from_partial(request)?)?;

        log::debug!("Query {}/{} ({} bytes)", self.service.name, method, body.len());
        let response = self
            .transport
            .request(self.service.name, method, body)
            .await
            .map_err(|e| ClientError::transport(self.service.name, method, e))?;

        Ok((descriptor.response)().decode(&response)?)
    }

    /// Like `call`, but follows `pagination.next_key` until the last page
    /// and concatenates the repeated fields of every page.
    /// Methods without a `pagination` request field make a single call.
    pub async fn call_all(&self, method: &str, request: &Message) -> Result<Message> {
        let descriptor = self.method(method)?;
        if (descriptor.request)().field("pagination").is_none() {
            return self.call(method, request).await;
        }

        fetch_all(|cursor| {
            let page_request = with_cursor(request, cursor);
            async move { self.call(method, &page_request).await }
        })
        .await
    }
}

/// Copy of `request` whose `pagination.key` is set to `cursor`
fn with_cursor(request: &Message, cursor: Option<Vec<u8>>) -> Message {
    let mut request = request.clone();
    if let Some(key) = cursor {
        let pagination = request
            .get_message("pagination")
            .cloned()
            .unwrap_or_default()
            .with("key", key);
        request.set("pagination", pagination);
    }
    request
}

fn message_list(response: &Message, field: &str) -> Vec<Message> {
    response
        .get_list(field)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_message().cloned())
        .collect()
}

fn string_list(response: &Message, field: &str) -> Vec<String> {
    response
        .get_list(field)
        .unwrap_or_default()
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

// ---- Staking ----

/// List validators, optionally filtered by bond status (e.g. "BOND_STATUS_BONDED")
pub async fn query_validators<T: Transport>(
    client: &QueryClient<T>,
    status: Option<&str>,
) -> Result<Vec<Message>> {
    let mut request = Message::new();
    if let Some(status) = status {
        request.set("status", status);
    }
    let response = client.call_all("Validators", &request).await?;
    let validators = message_list(&response, "validators");
    log::debug!("Fetched {} validators", validators.len());
    Ok(validators)
}

pub async fn query_validator<T: Transport>(
    client: &QueryClient<T>,
    validator_addr: &str,
) -> Result<Option<Message>> {
    let request = Message::new().with("validator_addr", validator_addr);
    let response = client.call("Validator", &request).await?;
    Ok(response.get_message("validator").cloned())
}

pub async fn query_delegation<T: Transport>(
    client: &QueryClient<T>,
    delegator_addr: &str,
    validator_addr: &str,
) -> Result<Option<Message>> {
    let request = Message::new()
        .with("delegator_addr", delegator_addr)
        .with("validator_addr", validator_addr);
    let response = client.call("Delegation", &request).await?;
    Ok(response.get_message("delegation_response").cloned())
}

pub async fn query_pool<T: Transport>(client: &QueryClient<T>) -> Result<Option<Message>> {
    let response = client.call("Pool", &Message::new()).await?;
    Ok(response.get_message("pool").cloned())
}

pub async fn query_params<T: Transport>(client: &QueryClient<T>) -> Result<Option<Message>> {
    let response = client.call("Params", &Message::new()).await?;
    Ok(response.get_message("params").cloned())
}

// ---- IBC client ----

/// Client state of `client_id`, unpacked from its `Any` when the type is known
pub async fn query_client_state<T: Transport>(
    client: &QueryClient<T>,
    client_id: &str,
) -> Result<Option<AnyValue>> {
    let response = client
        .call("ClientState", &Message::new().with("client_id", client_id))
        .await?;
    match response.get_message("client_state") {
        Some(any) => Ok(Some(SchemaRegistry::global().unpack_any(any)?)),
        None => Ok(None),
    }
}

pub async fn query_client_states<T: Transport>(client: &QueryClient<T>) -> Result<Vec<Message>> {
    let response = client.call_all("ClientStates", &Message::new()).await?;
    Ok(message_list(&response, "client_states"))
}

pub async fn query_consensus_states<T: Transport>(
    client: &QueryClient<T>,
    client_id: &str,
) -> Result<Vec<Message>> {
    let response = client
        .call_all("ConsensusStates", &Message::new().with("client_id", client_id))
        .await?;
    Ok(message_list(&response, "consensus_states"))
}

/// "Active", "Frozen", "Expired" or "Unknown"
pub async fn query_client_status<T: Transport>(client: &QueryClient<T>, client_id: &str) -> Result<String> {
    let response = client
        .call("ClientStatus", &Message::new().with("client_id", client_id))
        .await?;
    Ok(response.get_str("status").unwrap_or_default().to_string())
}

// ---- Token factory ----

pub async fn query_denoms_from_creator<T: Transport>(
    client: &QueryClient<T>,
    creator: &str,
) -> Result<Vec<String>> {
    let response = client
        .call("DenomsFromCreator", &Message::new().with("creator", creator))
        .await?;
    Ok(string_list(&response, "denoms"))
}

/// Admin address of a token factory denom
pub async fn query_denom_authority_metadata<T: Transport>(
    client: &QueryClient<T>,
    denom: &str,
) -> Result<Option<String>> {
    let response = client
        .call("DenomAuthorityMetadata", &Message::new().with("denom", denom))
        .await?;
    Ok(response
        .get_message("authority_metadata")
        .and_then(|m| m.get_str("admin"))
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::error::TransportError;
    use crate::chain::transport::mock::MockTransport;
    use std::sync::Arc;

    fn encode(codec: std::sync::Arc<crate::codec::Codec>, partial: Message) -> Vec<u8> {
        codec.encode(&codec.from_partial(&partial).unwrap()).unwrap()
    }

    fn validators_page(addresses: &[&str], next_key: &[u8]) -> Vec<u8> {
        let validators: Vec<Message> = addresses
            .iter()
            .map(|a| Message::new().with("operator_address", *a))
            .collect();
        encode(
            staking::query_validators_response(),
            Message::new()
                .with("validators", validators)
                .with("pagination", Message::new().with("next_key", next_key.to_vec())),
        )
    }

    #[tokio::test]
    async fn test_call_round_trip() {
        let mock = Arc::new(MockTransport::new());
        mock.push(
            "Pool",
            encode(
                staking::query_pool_response(),
                Message::new().with(
                    "pool",
                    Message::new().with("bonded_tokens", "100").with("not_bonded_tokens", "5"),
                ),
            ),
        );
        let client = QueryClient::staking(mock.clone());

        let pool = query_pool(&client).await.unwrap().unwrap();
        assert_eq!(pool.get_str("bonded_tokens"), Some("100"));

        let calls = mock.calls();
        assert_eq!(calls[0].0, "cosmos.staking.v1beta1.Query");
        assert_eq!(calls[0].1, "Pool");
        assert!(calls[0].2.is_empty());
    }

    #[tokio::test]
    async fn test_call_all_feeds_cursor_back() {
        let mock = Arc::new(MockTransport::new());
        mock.push("Validators", validators_page(&["v1", "v2"], b"p2"));
        mock.push("Validators", validators_page(&["v3"], b"p3"));
        mock.push("Validators", validators_page(&["v4"], b""));
        let client = QueryClient::staking(mock.clone());

        let validators = query_validators(&client, Some("BOND_STATUS_BONDED")).await.unwrap();
        let addresses: Vec<_> = validators
            .iter()
            .map(|v| v.get_str("operator_address").unwrap())
            .collect();
        assert_eq!(addresses, vec!["v1", "v2", "v3", "v4"]);

        // Second request carries the first page's cursor in pagination.key
        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        let request = staking::query_validators_request().decode(&calls[1].2).unwrap();
        assert_eq!(request.get_str("status"), Some("BOND_STATUS_BONDED"));
        assert_eq!(
            request.get_message("pagination").unwrap().get_bytes("key"),
            Some(&b"p2"[..])
        );
    }

    #[tokio::test]
    async fn test_transport_error_names_rpc() {
        let mock = Arc::new(MockTransport::new());
        mock.push_error("ClientStatus", "connection reset");
        let client = QueryClient::ibc_client(mock);

        let err = query_client_status(&client, "07-tendermint-0").await.unwrap_err();
        match err {
            ClientError::Transport { service, method, source } => {
                assert_eq!(service, "ibc.core.client.v1.Query");
                assert_eq!(method, "ClientStatus");
                assert!(matches!(source, TransportError::Status { .. }));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let client = QueryClient::tokenfactory(MockTransport::new());
        let err = client.call("Validators", &Message::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::UnknownMethod { .. }));
    }

    #[tokio::test]
    async fn test_malformed_response_is_codec_error() {
        let mock = MockTransport::new();
        mock.push("DenomsFromCreator", vec![0x0a, 0x05, b'a']);
        let client = QueryClient::tokenfactory(mock);
        let err = query_denoms_from_creator(&client, "sei1abc").await.unwrap_err();
        assert!(matches!(err, ClientError::Codec(_)));
    }

    #[tokio::test]
    async fn test_client_state_unpacks_any() {
        let mock = MockTransport::new();
        let header = crate::chain::proto::common::header();
        let inner = encode(header.clone(), Message::new().with("chain_id", "pacific-1"));
        mock.push(
            "ClientState",
            encode(
                ibc_client::query_client_state_response(),
                Message::new().with(
                    "client_state",
                    Message::new().with("type_url", header.type_url()).with("value", inner),
                ),
            ),
        );
        let client = QueryClient::ibc_client(mock);

        match query_client_state(&client, "07-tendermint-0").await.unwrap() {
            Some(AnyValue::Known { message, .. }) => {
                assert_eq!(message.get_str("chain_id"), Some("pacific-1"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
