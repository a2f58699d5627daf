use std::sync::Arc;

use super::{require, require_address, require_any, Coin, MessageBuilder};
use crate::chain::error::{ClientError, Result};
use crate::chain::proto::staking;
use crate::codec::{Codec, Message};

/// Validator description; every field is optional on chain except the moniker
/// when creating a validator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub security_contact: String,
    pub details: String,
}

impl Description {
    pub fn new(moniker: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            ..Default::default()
        }
    }

    fn to_message(&self) -> Message {
        Message::new()
            .with("moniker", self.moniker.as_str())
            .with("identity", self.identity.as_str())
            .with("website", self.website.as_str())
            .with("security_contact", self.security_contact.as_str())
            .with("details", self.details.as_str())
    }
}

/// Decimal strings such as "0.100000000000000000"; must parse and lie in [0, 1]
fn require_rate(field: &str, rate: &str) -> Result<()> {
    match rate.parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(()),
        _ => Err(ClientError::invalid(field, format!("{:?} is not a rate in [0, 1]", rate))),
    }
}

/// Message for delegating tokens to a validator
#[derive(Debug, Clone)]
pub struct DelegateMsg {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

impl DelegateMsg {
    /// Create a new delegate message with validation
    pub fn new(delegator_address: &str, validator_address: &str, amount: Coin) -> Result<Self> {
        require_address("delegator_address", delegator_address)?;
        require_address("validator_address", validator_address)?;
        amount.validate("amount")?;
        Ok(Self {
            delegator_address: delegator_address.to_string(),
            validator_address: validator_address.to_string(),
            amount,
        })
    }
}

impl MessageBuilder for DelegateMsg {
    fn codec(&self) -> Arc<Codec> {
        staking::msg_delegate()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("delegator_address", self.delegator_address.as_str())
            .with("validator_address", self.validator_address.as_str())
            .with("amount", self.amount.to_message())
    }
}

#[derive(Debug, Clone)]
pub struct UndelegateMsg {
    pub delegator_address: String,
    pub validator_address: String,
    pub amount: Coin,
}

impl UndelegateMsg {
    pub fn new(delegator_address: &str, validator_address: &str, amount: Coin) -> Result<Self> {
        require_address("delegator_address", delegator_address)?;
        require_address("validator_address", validator_address)?;
        amount.validate("amount")?;
        Ok(Self {
            delegator_address: delegator_address.to_string(),
            validator_address: validator_address.to_string(),
            amount,
        })
    }
}

impl MessageBuilder for UndelegateMsg {
    fn codec(&self) -> Arc<Codec> {
        staking::msg_undelegate()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("delegator_address", self.delegator_address.as_str())
            .with("validator_address", self.validator_address.as_str())
            .with("amount", self.amount.to_message())
    }
}

/// Move a delegation between validators without unbonding
#[derive(Debug, Clone)]
pub struct BeginRedelegateMsg {
    pub delegator_address: String,
    pub validator_src_address: String,
    pub validator_dst_address: String,
    pub amount: Coin,
}

impl BeginRedelegateMsg {
    pub fn new(
        delegator_address: &str,
        validator_src_address: &str,
        validator_dst_address: &str,
        amount: Coin,
    ) -> Result<Self> {
        require_address("delegator_address", delegator_address)?;
        require_address("validator_src_address", validator_src_address)?;
        require_address("validator_dst_address", validator_dst_address)?;
        if validator_src_address == validator_dst_address {
            return Err(ClientError::invalid(
                "validator_dst_address",
                "source and destination validators are the same",
            ));
        }
        amount.validate("amount")?;
        Ok(Self {
            delegator_address: delegator_address.to_string(),
            validator_src_address: validator_src_address.to_string(),
            validator_dst_address: validator_dst_address.to_string(),
            amount,
        })
    }
}

impl MessageBuilder for BeginRedelegateMsg {
    fn codec(&self) -> Arc<Codec> {
        staking::msg_begin_redelegate()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("delegator_address", self.delegator_address.as_str())
            .with("validator_src_address", self.validator_src_address.as_str())
            .with("validator_dst_address", self.validator_dst_address.as_str())
            .with("amount", self.amount.to_message())
    }
}

/// Commission rates given as decimal strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommissionRates {
    pub rate: String,
    pub max_rate: String,
    pub max_change_rate: String,
}

#[derive(Debug, Clone)]
pub struct CreateValidatorMsg {
    pub description: Description,
    pub commission: CommissionRates,
    pub min_self_delegation: String,
    pub delegator_address: String,
    pub validator_address: String,
    /// Consensus public key packed as `Any`
    pub pubkey: Message,
    pub value: Coin,
}

impl CreateValidatorMsg {
    pub fn new(
        description: Description,
        commission: CommissionRates,
        min_self_delegation: &str,
        delegator_address: &str,
        validator_address: &str,
        pubkey: Message,
        value: Coin,
    ) -> Result<Self> {
        require("description.moniker", &description.moniker)?;
        require_rate("commission.rate", &commission.rate)?;
        require_rate("commission.max_rate", &commission.max_rate)?;
        require_rate("commission.max_change_rate", &commission.max_change_rate)?;
        require_address("delegator_address", delegator_address)?;
        require_address("validator_address", validator_address)?;
        require_any("pubkey", &pubkey)?;
        value.validate("value")?;

        let min: u128 = min_self_delegation
            .parse()
            .map_err(|_| ClientError::invalid("min_self_delegation", "must be a positive integer"))?;
        if min == 0 {
            return Err(ClientError::invalid("min_self_delegation", "must be a positive integer"));
        }
        if value.amount < min {
            return Err(ClientError::invalid(
                "value",
                format!("self delegation {} is below the minimum {}", value.amount, min),
            ));
        }

        Ok(Self {
            description,
            commission,
            min_self_delegation: min_self_delegation.to_string(),
            delegator_address: delegator_address.to_string(),
            validator_address: validator_address.to_string(),
            pubkey,
            value,
        })
    }
}

impl MessageBuilder for CreateValidatorMsg {
    fn codec(&self) -> Arc<Codec> {
        staking::msg_create_validator()
    }

    fn to_partial(&self) -> Message {
        Message::new()
            .with("description", self.description.to_message())
            .with(
                "commission",
                Message::new()
                    .with("rate", self.commission.rate.as_str())
                    .with("max_rate", self.commission.max_rate.as_str())
                    .with("max_change_rate", self.commission.max_change_rate.as_str()),
            )
            .with("min_self_delegation", self.min_self_delegation.as_str())
            .with("delegator_address", self.delegator_address.as_str())
            .with("validator_address", self.validator_address.as_str())
            .with("pubkey", self.pubkey.clone())
            .with("value", self.value.to_message())
    }
}

/// Empty strings leave the on-chain value unchanged
#[derive(Debug, Clone)]
pub struct EditValidatorMsg {
    pub description: Description,
    pub validator_address: String,
    pub commission_rate: Option<String>,
    pub min_self_delegation: Option<String>,
}

impl EditValidatorMsg {
    pub fn new(
        description: Description,
        validator_address: &str,
        commission_rate: Option<String>,
        min_self_delegation: Option<String>,
    ) -> Result<Self> {
        require_address("validator_address", validator_address)?;
        if let Some(rate) = &commission_rate {
            require_rate("commission_rate", rate)?;
        }
        Ok(Self {
            description,
            validator_address: validator_address.to_string(),
            commission_rate,
            min_self_delegation,
        })
    }
}

impl MessageBuilder for EditValidatorMsg {
    fn codec(&self) -> Arc<Codec> {
        staking::msg_edit_validator()
    }

    fn to_partial(&self) -> Message {
        let mut msg = Message::new()
            .with("description", self.description.to_message())
            .with("validator_address", self.validator_address.as_str());
        if let Some(rate) = &self.commission_rate {
            msg.set("commission_rate", rate.as_str());
        }
        if let Some(min) = &self.min_self_delegation {
            msg.set("min_self_delegation", min.as_str());
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::proto::SchemaRegistry;

    const DELEGATOR: &str = "sei1delegator0000";
    const VALIDATOR: &str = "seivaloper1validator000";
    const OTHER_VALIDATOR: &str = "seivaloper1other000";

    #[test]
    fn test_delegate_to_any() {
        let msg = DelegateMsg::new(DELEGATOR, VALIDATOR, Coin::new("usei", 1_000_000)).unwrap();
        assert_eq!(msg.type_url(), "/cosmos.staking.v1beta1.MsgDelegate");

        let any = msg.to_any().unwrap();
        let decoded = staking::msg_delegate().decode(any.get_bytes("value").unwrap()).unwrap();
        assert_eq!(decoded.get_str("delegator_address"), Some(DELEGATOR));
        assert_eq!(
            decoded.get_message("amount").unwrap().get_str("amount"),
            Some("1000000")
        );
    }

    #[test]
    fn test_delegate_rejects_zero_amount() {
        let err = DelegateMsg::new(DELEGATOR, VALIDATOR, Coin::new("usei", 0)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput { ref field, .. } if field == "amount"));
    }

    #[test]
    fn test_undelegate_rejects_empty_validator() {
        let err = UndelegateMsg::new(DELEGATOR, "", Coin::new("usei", 5)).unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput { ref field, .. } if field == "validator_address"));
    }

    #[test]
    fn test_redelegate_to_same_validator() {
        assert!(BeginRedelegateMsg::new(DELEGATOR, VALIDATOR, VALIDATOR, Coin::new("usei", 5)).is_err());
        let msg = BeginRedelegateMsg::new(DELEGATOR, VALIDATOR, OTHER_VALIDATOR, Coin::new("usei", 5)).unwrap();
        assert!(msg.to_any().is_ok());
    }

    #[test]
    fn test_create_validator() {
        let pubkey = SchemaRegistry::global()
            .pack_any("/cosmos.crypto.ed25519.PubKey", &Message::new().with("key", vec![7u8; 32]))
            .unwrap();
        let commission = CommissionRates {
            rate: "0.10".to_string(),
            max_rate: "0.20".to_string(),
            max_change_rate: "0.01".to_string(),
        };

        let err = CreateValidatorMsg::new(
            Description::new("node"),
            commission.clone(),
            "10",
            DELEGATOR,
            VALIDATOR,
            pubkey.clone(),
            Coin::new("usei", 5),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput { ref field, .. } if field == "value"));

        let msg = CreateValidatorMsg::new(
            Description::new("node"),
            commission,
            "1",
            DELEGATOR,
            VALIDATOR,
            pubkey,
            Coin::new("usei", 5),
        )
        .unwrap();
        let any = msg.to_any().unwrap();
        let decoded = staking::msg_create_validator()
            .decode(any.get_bytes("value").unwrap())
            .unwrap();
        assert_eq!(
            decoded.get_message("description").unwrap().get_str("moniker"),
            Some("node")
        );
        assert_eq!(
            decoded.get_message("pubkey").unwrap().get_str("type_url"),
            Some("/cosmos.crypto.ed25519.PubKey")
        );
    }

    #[test]
    fn test_edit_validator_rate_range() {
        assert!(EditValidatorMsg::new(Description::default(), VALIDATOR, Some("1.5".into()), None).is_err());
        let msg = EditValidatorMsg::new(Description::default(), VALIDATOR, None, None).unwrap();
        assert!(!msg.to_partial().contains("commission_rate"));
    }
}
