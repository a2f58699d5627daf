use std::sync::Arc;

use super::{require, require_address, Coin, MessageBuilder};
use crate::chain::error::{ClientError, Result};
use crate::chain::proto::tokenfactory;
use crate::codec::{Codec, Message};

/// Longest subdenom the token factory module accepts
const MAX_SUBDENOM_LENGTH: usize = 44;

/// Token factory denoms look like `factory/{creator}/{subdenom}`
fn require_factory_denom(field: &str, denom: &str) -> Result<()> {
    let mut parts = denom.splitn(3, '/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("factory"), Some(creator), Some(subdenom)) if !creator.is_empty() && !subdenom.is_empty() => Ok(()),
        _ => Err(ClientError::invalid(
            field,
            format!("{:?} is not a factory/{{creator}}/{{subdenom}} denom", denom),
        )),
    }
}

/// Message for creating `factory/{sender}/{subdenom}`
#[derive(Debug, Clone)]
pub struct CreateDenomMsg {
    pub sender: String,
    pub subdenom: String,
}

impl CreateDenomMsg {
    pub fn new(sender: &str, subdenom: &str) -> Result<Self> {
        require_address("sender", sender)?;
        require("subdenom", subdenom)?;
        if subdenom.len() > MAX_SUBDENOM_LENGTH {
            return Err(ClientError::invalid(
                "subdenom",
                format!("longer than {} characters", MAX_SUBDENOM_LENGTH),
            ));
        }
        if subdenom.contains('/') {
            return Err(ClientError::invalid("subdenom", "must not contain '/'"));
        }
        Ok(Self {
            sender: sender.to_string(),
            subdenom: subdenom.to_string(),
        })
    }

    /// Full denom the chain will assign
    pub fn denom(&self) -> String {
        format!("factory/{}/{}", self.sender, self.subdenom)
    }
}

impl MessageBuilder for CreateDenomMsg {
    fn codec(&self) -> Arc<Codec> {
        tokenfactory::msg_create_denom()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("sender", self.sender.as_str())
            .with("subdenom", self.subdenom.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MintMsg {
    pub sender: String,
    pub amount: Coin,
}

impl MintMsg {
    pub fn new(sender: &str, amount: Coin) -> Result<Self> {
        require_address("sender", sender)?;
        amount.validate("amount")?;
        require_factory_denom("amount.denom", &amount.denom)?;
        Ok(Self {
            sender: sender.to_string(),
            amount,
        })
    }
}

impl MessageBuilder for MintMsg {
    fn codec(&self) -> Arc<Codec> {
        tokenfactory::msg_mint()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("sender", self.sender.as_str())
            .with("amount", self.amount.to_message())
    }
}

#[derive(Debug, Clone)]
pub struct BurnMsg {
    pub sender: String,
    pub amount: Coin,
}

impl BurnMsg {
    pub fn new(sender: &str, amount: Coin) -> Result<Self> {
        require_address("sender", sender)?;
        amount.validate("amount")?;
        require_factory_denom("amount.denom", &amount.denom)?;
        Ok(Self {
            sender: sender.to_string(),
            amount,
        })
    }
}

impl MessageBuilder for BurnMsg {
    fn codec(&self) -> Arc<Codec> {
        tokenfactory::msg_burn()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("sender", self.sender.as_str())
            .with("amount", self.amount.to_message())
    }
}

#[derive(Debug, Clone)]
pub struct ChangeAdminMsg {
    pub sender: String,
    pub denom: String,
    pub new_admin: String,
}

impl ChangeAdminMsg {
    pub fn new(sender: &str, denom: &str, new_admin: &str) -> Result<Self> {
        require_address("sender", sender)?;
        require_factory_denom("denom", denom)?;
        require_address("new_admin", new_admin)?;
        Ok(Self {
            sender: sender.to_string(),
            denom: denom.to_string(),
            new_admin: new_admin.to_string(),
        })
    }
}

impl MessageBuilder for ChangeAdminMsg {
    fn codec(&self) -> Arc<Codec> {
        tokenfactory::msg_change_admin()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("sender", self.sender.as_str())
            .with("denom", self.denom.as_str())
            .with("new_admin", self.new_admin.as_str())
    }
}

/// `metadata` is a `cosmos.bank.v1beta1.Metadata` in sparse form
#[derive(Debug, Clone)]
pub struct SetDenomMetadataMsg {
    pub sender: String,
    pub metadata: Message,
}

impl SetDenomMetadataMsg {
    pub fn new(sender: &str, metadata: Message) -> Result<Self> {
        require_address("sender", sender)?;
        let base = metadata.get_str("base").unwrap_or_default();
        require_factory_denom("metadata.base", base)?;
        Ok(Self {
            sender: sender.to_string(),
            metadata,
        })
    }
}

impl MessageBuilder for SetDenomMetadataMsg {
    fn codec(&self) -> Arc<Codec> {
        tokenfactory::msg_set_denom_metadata()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("sender", self.sender.as_str())
            .with("metadata", self.metadata.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATOR: &str = "sei1creator000";

    #[test]
    fn test_create_denom() {
        let msg = CreateDenomMsg::new(CREATOR, "ufoo").unwrap();
        assert_eq!(msg.denom(), "factory/sei1creator000/ufoo");
        assert_eq!(msg.type_url(), "/sei.tokenfactory.v1.MsgCreateDenom");

        assert!(CreateDenomMsg::new(CREATOR, "").is_err());
        assert!(CreateDenomMsg::new(CREATOR, "a/b").is_err());
        assert!(CreateDenomMsg::new(CREATOR, &"x".repeat(45)).is_err());
    }

    #[test]
    fn test_mint_requires_factory_denom() {
        let err = MintMsg::new(CREATOR, Coin::new("usei", 10)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput { ref field, .. } if field == "amount.denom"));

        let msg = MintMsg::new(CREATOR, Coin::new("factory/sei1creator000/ufoo", 10)).unwrap();
        let any = msg.to_any().unwrap();
        let decoded = tokenfactory::msg_mint().decode(any.get_bytes("value").unwrap()).unwrap();
        assert_eq!(
            decoded.get_message("amount").unwrap().get_str("denom"),
            Some("factory/sei1creator000/ufoo")
        );
    }

    #[test]
    fn test_burn_rejects_zero() {
        assert!(BurnMsg::new(CREATOR, Coin::new("factory/sei1creator000/ufoo", 0)).is_err());
    }

    #[test]
    fn test_change_admin() {
        assert!(ChangeAdminMsg::new(CREATOR, "factory//ufoo", "sei1admin000").is_err());
        let msg = ChangeAdminMsg::new(CREATOR, "factory/sei1creator000/ufoo", "sei1admin000").unwrap();
        assert_eq!(msg.to_partial().get_str("new_admin"), Some("sei1admin000"));
    }

    #[test]
    fn test_set_denom_metadata() {
        let metadata = Message::new()
            .with("base", "factory/sei1creator000/ufoo")
            .with("display", "foo")
            .with(
                "denom_units",
                vec![Message::new().with("denom", "factory/sei1creator000/ufoo").with("exponent", 0u32)],
            );
        let msg = SetDenomMetadataMsg::new(CREATOR, metadata).unwrap();
        let any = msg.to_any().unwrap();
        let decoded = tokenfactory::msg_set_denom_metadata()
            .decode(any.get_bytes("value").unwrap())
            .unwrap();
        assert_eq!(
            decoded.get_message("metadata").unwrap().get_str("display"),
            Some("foo")
        );

        assert!(SetDenomMetadataMsg::new(CREATOR, Message::new()).is_err());
    }
}
