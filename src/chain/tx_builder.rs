/// Transaction façade: builds `TxBody` / `Fee` from typed messages and hands
/// them to an external signer for signing and broadcast

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::chain::error::{ClientError, Result, TransportError};
use crate::chain::messages::{Coin, MessageBuilder};
use crate::chain::proto::common;
use crate::codec::{Message, Value};

/// Default gas limit for transactions
pub const DEFAULT_GAS_LIMIT: u64 = 200_000;

/// Broadcast result as reported by the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResponse {
    pub tx_hash: String,
    pub code: u32,
    pub raw_log: String,
}

impl TxResponse {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// Wallet side of a transaction: account lookup, signing and broadcast live
/// outside this crate
#[async_trait]
pub trait TxSigner: Send + Sync {
    /// `body` is an encoded `cosmos.tx.v1beta1.TxBody`, `fee` a complete `Fee`
    async fn sign_and_broadcast(&self, body: Vec<u8>, fee: Message) -> std::result::Result<TxResponse, TransportError>;
}

/// Complete transaction builder for Cosmos SDK transactions
pub struct TxClient<S> {
    signer: S,
    gas_limit: u64,
}

impl<S: TxSigner> TxClient<S> {
    pub fn new(signer: S) -> Self {
        Self {
            signer,
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }

    /// Builder pattern method to set gas limit
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Encode a `TxBody` carrying every message packed as `Any`
    pub fn build_body(&self, msgs: &[&dyn MessageBuilder], memo: &str) -> Result<Vec<u8>> {
        if msgs.is_empty() {
            return Err(ClientError::invalid("messages", "a transaction needs at least one message"));
        }
        let anys = msgs
            .iter()
            .map(|msg| msg.to_any())
            .collect::<Result<Vec<Message>>>()?;

        let codec = common::tx_body();
        let body = codec.from_partial(&Message::new().with("messages", anys).with("memo", memo))?;
        Ok(codec.encode(&body)?)
    }

    /// `Fee` paying `amount` with the configured gas limit
    pub fn fee(&self, amount: &[Coin]) -> Result<Message> {
        for coin in amount {
            coin.validate("fee.amount")?;
        }
        let coins: Vec<Value> = amount.iter().map(|c| Value::from(c.to_message())).collect();
        let partial = Message::new()
            .with("amount", coins)
            .with("gas_limit", self.gas_limit);
        Ok(common::fee().from_partial(&partial)?)
    }

    /// Build the body and let the signer sign and broadcast it
    pub async fn send(&self, msgs: &[&dyn MessageBuilder], fee: Message, memo: &str) -> Result<TxResponse> {
        let body = self.build_body(msgs, memo)?;
        let fee = common::fee().from_partial(&fee)?;
        let type_urls = msgs
            .iter()
            .map(|msg| msg.type_url())
            .collect::<Vec<_>>()
            .join(",");

        log::debug!("Broadcasting {} ({} bytes)", type_urls, body.len());
        let response = self
            .signer
            .sign_and_broadcast(body, fee)
            .await
            .map_err(|source| ClientError::Signer {
                type_url: type_urls.clone(),
                source,
            })?;

        if response.is_success() {
            log::info!("Transaction {} included", response.tx_hash);
        } else {
            log::warn!(
                "Transaction {} failed with code {}: {}",
                response.tx_hash,
                response.code,
                response.raw_log
            );
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::messages::{CreateDenomMsg, DelegateMsg, MintMsg};
    use std::sync::Mutex;

    /// Records what it was asked to sign; fails when `fail` is set
    #[derive(Default)]
    struct MockSigner {
        fail: bool,
        seen: Mutex<Vec<(Vec<u8>, Message)>>,
    }

    #[async_trait]
    impl TxSigner for MockSigner {
        async fn sign_and_broadcast(
            &self,
            body: Vec<u8>,
            fee: Message,
        ) -> std::result::Result<TxResponse, TransportError> {
            if self.fail {
                return Err(TransportError::Request("account sequence mismatch".to_string()));
            }
            self.seen.lock().unwrap().push((body, fee));
            Ok(TxResponse {
                tx_hash: "ABCD".to_string(),
                code: 0,
                raw_log: String::new(),
            })
        }
    }

    fn delegate() -> DelegateMsg {
        DelegateMsg::new("sei1delegator000", "seivaloper1val000", Coin::new("usei", 10)).unwrap()
    }

    #[test]
    fn test_build_body() {
        let client = TxClient::new(MockSigner::default());
        let create = CreateDenomMsg::new("sei1creator000", "ufoo").unwrap();
        let body = client.build_body(&[&delegate(), &create], "hello").unwrap();

        let decoded = common::tx_body().decode(&body).unwrap();
        assert_eq!(decoded.get_str("memo"), Some("hello"));
        let urls: Vec<_> = decoded
            .get_list("messages")
            .unwrap()
            .iter()
            .map(|m| m.as_message().unwrap().get_str("type_url").unwrap().to_string())
            .collect();
        assert_eq!(
            urls,
            vec!["/cosmos.staking.v1beta1.MsgDelegate", "/sei.tokenfactory.v1.MsgCreateDenom"]
        );
    }

    #[test]
    fn test_empty_body_rejected() {
        let client = TxClient::new(MockSigner::default());
        assert!(matches!(
            client.build_body(&[], ""),
            Err(ClientError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_fee_uses_gas_limit() {
        let fee = TxClient::new(MockSigner::default())
            .fee(&[Coin::new("usei", 20_000)])
            .unwrap();
        assert_eq!(fee.get_u64("gas_limit"), Some(DEFAULT_GAS_LIMIT));

        let fee = TxClient::new(MockSigner::default())
            .with_gas_limit(350_000)
            .fee(&[])
            .unwrap();
        assert_eq!(fee.get_u64("gas_limit"), Some(350_000));
        assert_eq!(fee.get_list("amount").unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_send_hands_body_to_signer() {
        let client = TxClient::new(MockSigner::default());
        let fee = client.fee(&[Coin::new("usei", 20_000)]).unwrap();
        let response = client.send(&[&delegate()], fee, "").await.unwrap();
        assert!(response.is_success());

        let seen = client.signer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let body = common::tx_body().decode(&seen[0].0).unwrap();
        assert_eq!(body.get_list("messages").unwrap().len(), 1);
        assert_eq!(seen[0].1.get_u64("gas_limit"), Some(DEFAULT_GAS_LIMIT));
    }

    #[tokio::test]
    async fn test_signer_error_names_message_type() {
        let client = TxClient::new(MockSigner {
            fail: true,
            ..Default::default()
        });
        let mint = MintMsg::new("sei1creator000", Coin::new("factory/sei1creator000/ufoo", 5)).unwrap();
        let err = client.send(&[&mint], Message::new(), "").await.unwrap_err();
        match err {
            ClientError::Signer { type_url, .. } => assert_eq!(type_url, "/sei.tokenfactory.v1.MsgMint"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
