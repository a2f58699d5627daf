use std::sync::Arc;

use super::{require, require_address, require_any, MessageBuilder};
use crate::chain::error::{ClientError, Result};
use crate::chain::proto::ibc_client;
use crate::codec::{Codec, Message};

/// Client and consensus states are light-client specific, so callers pass
/// them already packed as `Any`
#[derive(Debug, Clone)]
pub struct CreateClientMsg {
    pub client_state: Message,
    pub consensus_state: Message,
    pub signer: String,
}

impl CreateClientMsg {
    pub fn new(client_state: Message, consensus_state: Message, signer: &str) -> Result<Self> {
        require_any("client_state", &client_state)?;
        require_any("consensus_state", &consensus_state)?;
        require_address("signer", signer)?;
        Ok(Self {
            client_state,
            consensus_state,
            signer: signer.to_string(),
        })
    }
}

impl MessageBuilder for CreateClientMsg {
    fn codec(&self) -> Arc<Codec> {
        ibc_client::msg_create_client()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("client_state", self.client_state.clone())
            .with("consensus_state", self.consensus_state.clone())
            .with("signer", self.signer.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct UpdateClientMsg {
    pub client_id: String,
    pub header: Message,
    pub signer: String,
}

impl UpdateClientMsg {
    pub fn new(client_id: &str, header: Message, signer: &str) -> Result<Self> {
        require("client_id", client_id)?;
        require_any("header", &header)?;
        require_address("signer", signer)?;
        Ok(Self {
            client_id: client_id.to_string(),
            header,
            signer: signer.to_string(),
        })
    }
}

impl MessageBuilder for UpdateClientMsg {
    fn codec(&self) -> Arc<Codec> {
        ibc_client::msg_update_client()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("client_id", self.client_id.as_str())
            .with("header", self.header.clone())
            .with("signer", self.signer.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct UpgradeClientMsg {
    pub client_id: String,
    pub client_state: Message,
    pub consensus_state: Message,
    pub proof_upgrade_client: Vec<u8>,
    pub proof_upgrade_consensus_state: Vec<u8>,
    pub signer: String,
}

impl UpgradeClientMsg {
    pub fn new(
        client_id: &str,
        client_state: Message,
        consensus_state: Message,
        proof_upgrade_client: Vec<u8>,
        proof_upgrade_consensus_state: Vec<u8>,
        signer: &str,
    ) -> Result<Self> {
        require("client_id", client_id)?;
        require_any("client_state", &client_state)?;
        require_any("consensus_state", &consensus_state)?;
        if proof_upgrade_client.is_empty() {
            return Err(ClientError::invalid(
                "proof_upgrade_client",
                "must not be empty",
            ));
        }
        if proof_upgrade_consensus_state.is_empty() {
            return Err(ClientError::invalid(
                "proof_upgrade_consensus_state",
                "must not be empty",
            ));
        }
        require_address("signer", signer)?;
        Ok(Self {
            client_id: client_id.to_string(),
            client_state,
            consensus_state,
            proof_upgrade_client,
            proof_upgrade_consensus_state,
            signer: signer.to_string(),
        })
    }
}

impl MessageBuilder for UpgradeClientMsg {
    fn codec(&self) -> Arc<Codec> {
        ibc_client::msg_upgrade_client()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("client_id", self.client_id.as_str())
            .with("client_state", self.client_state.clone())
            .with("consensus_state", self.consensus_state.clone())
            .with("proof_upgrade_client", self.proof_upgrade_client.clone())
            .with("proof_upgrade_consensus_state", self.proof_upgrade_consensus_state.clone())
            .with("signer", self.signer.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SubmitMisbehaviourMsg {
    pub client_id: String,
    pub misbehaviour: Message,
    pub signer: String,
}

impl SubmitMisbehaviourMsg {
    pub fn new(client_id: &str, misbehaviour: Message, signer: &str) -> Result<Self> {
        require("client_id", client_id)?;
        require_any("misbehaviour", &misbehaviour)?;
        require_address("signer", signer)?;
        Ok(Self {
            client_id: client_id.to_string(),
            misbehaviour,
            signer: signer.to_string(),
        })
    }
}

impl MessageBuilder for SubmitMisbehaviourMsg {
    fn codec(&self) -> Arc<Codec> {
        ibc_client::msg_submit_misbehaviour()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("client_id", self.client_id.as_str())
            .with("misbehaviour", self.misbehaviour.clone())
            .with("signer", self.signer.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNER: &str = "sei1relayer000";

    fn opaque_any(type_url: &str) -> Message {
        Message::new()
            .with("type_url", type_url)
            .with("value", vec![0x0a, 0x01, b'x'])
    }

    #[test]
    fn test_update_client_keeps_opaque_header() {
        let header = opaque_any("/ibc.lightclients.tendermint.v1.Header");
        let msg = UpdateClientMsg::new("07-tendermint-0", header, SIGNER).unwrap();

        let any = msg.to_any().unwrap();
        assert_eq!(any.get_str("type_url"), Some("/ibc.core.client.v1.MsgUpdateClient"));
        let decoded = ibc_client::msg_update_client()
            .decode(any.get_bytes("value").unwrap())
            .unwrap();
        let inner = decoded.get_message("header").unwrap();
        assert_eq!(inner.get_bytes("value"), Some(&[0x0a, 0x01, b'x'][..]));
    }

    #[test]
    fn test_create_client_requires_type_urls() {
        let err = CreateClientMsg::new(
            Message::new(),
            opaque_any("/ibc.lightclients.tendermint.v1.ConsensusState"),
            SIGNER,
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput { ref field, .. } if field == "client_state"));
    }

    #[test]
    fn test_upgrade_client_requires_proofs() {
        let state = opaque_any("/ibc.lightclients.tendermint.v1.ClientState");
        let consensus = opaque_any("/ibc.lightclients.tendermint.v1.ConsensusState");
        assert!(UpgradeClientMsg::new("07-tendermint-0", state.clone(), consensus.clone(), vec![], vec![1], SIGNER).is_err());
        assert!(UpgradeClientMsg::new("07-tendermint-0", state, consensus, vec![1], vec![1], SIGNER).is_ok());
    }

    #[test]
    fn test_misbehaviour_requires_client_id() {
        let evidence = opaque_any("/ibc.lightclients.tendermint.v1.Misbehaviour");
        assert!(SubmitMisbehaviourMsg::new(" ", evidence.clone(), SIGNER).is_err());
        let msg = SubmitMisbehaviourMsg::new("07-tendermint-3", evidence, SIGNER).unwrap();
        assert_eq!(msg.type_url(), "/ibc.core.client.v1.MsgSubmitMisbehaviour");
    }
}
