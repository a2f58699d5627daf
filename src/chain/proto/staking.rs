/// cosmos.staking.v1beta1 schemas and service descriptors

use crate::codec::{declare_codec, EnumSpec, FieldKind};

use super::common::{any, coin, duration, header, page_request, page_response};
use super::{message, repeated, MethodDescriptor, ServiceDescriptor};

pub static BOND_STATUS: EnumSpec = EnumSpec {
    name: "cosmos.staking.v1beta1.BondStatus",
    values: &[
        ("BOND_STATUS_UNSPECIFIED", 0),
        ("BOND_STATUS_UNBONDED", 1),
        ("BOND_STATUS_UNBONDING", 2),
        ("BOND_STATUS_BONDED", 3),
    ],
};

// ---- State ----

declare_codec! {
    pub fn commission_rates = "cosmos.staking.v1beta1.CommissionRates" {
        1 => rate: FieldKind::String,
        2 => max_rate: FieldKind::String,
        3 => max_change_rate: FieldKind::String,
    }
}

declare_codec! {
    pub fn commission = "cosmos.staking.v1beta1.Commission" {
        1 => commission_rates: message(commission_rates()),
        2 => update_time: FieldKind::Timestamp,
    }
}

declare_codec! {
    pub fn description = "cosmos.staking.v1beta1.Description" {
        1 => moniker: FieldKind::String,
        2 => identity: FieldKind::String,
        3 => website: FieldKind::String,
        4 => security_contact: FieldKind::String,
        5 => details: FieldKind::String,
    }
}

declare_codec! {
    pub fn validator = "cosmos.staking.v1beta1.Validator" {
        1 => operator_address: FieldKind::String,
        2 => consensus_pubkey: message(any()),
        3 => jailed: FieldKind::Bool,
        4 => status: FieldKind::Enum(&BOND_STATUS),
        5 => tokens: FieldKind::String,
        6 => delegator_shares: FieldKind::String,
        7 => description: message(description()),
        8 => unbonding_height: FieldKind::Int64,
        9 => unbonding_time: FieldKind::Timestamp,
        10 => commission: message(commission()),
        11 => min_self_delegation: FieldKind::String,
    }
}

declare_codec! {
    pub fn val_addresses = "cosmos.staking.v1beta1.ValAddresses" {
        1 => addresses: repeated(FieldKind::String),
    }
}

declare_codec! {
    pub fn dv_pair = "cosmos.staking.v1beta1.DVPair" {
        1 => delegator_address: FieldKind::String,
        2 => validator_address: FieldKind::String,
    }
}

declare_codec! {
    pub fn dv_pairs = "cosmos.staking.v1beta1.DVPairs" {
        1 => pairs: repeated(message(dv_pair())),
    }
}

declare_codec! {
    pub fn dvv_triplet = "cosmos.staking.v1beta1.DVVTriplet" {
        1 => delegator_address: FieldKind::String,
        2 => validator_src_address: FieldKind::String,
        3 => validator_dst_address: FieldKind::String,
    }
}

declare_codec! {
    pub fn dvv_triplets = "cosmos.staking.v1beta1.DVVTriplets" {
        1 => triplets: repeated(message(dvv_triplet())),
    }
}

declare_codec! {
    pub fn delegation = "cosmos.staking.v1beta1.Delegation" {
        1 => delegator_address: FieldKind::String,
        2 => validator_address: FieldKind::String,
        3 => shares: FieldKind::String,
    }
}

declare_codec! {
    pub fn unbonding_delegation_entry = "cosmos.staking.v1beta1.UnbondingDelegationEntry" {
        1 => creation_height: FieldKind::Int64,
        2 => completion_time: FieldKind::Timestamp,
        3 => initial_balance: FieldKind::String,
        4 => balance: FieldKind::String,
    }
}

declare_codec! {
    pub fn unbonding_delegation = "cosmos.staking.v1beta1.UnbondingDelegation" {
        1 => delegator_address: FieldKind::String,
        2 => validator_address: FieldKind::String,
        3 => entries: repeated(message(unbonding_delegation_entry())),
    }
}

declare_codec! {
    pub fn redelegation_entry = "cosmos.staking.v1beta1.RedelegationEntry" {
        1 => creation_height: FieldKind::Int64,
        2 => completion_time: FieldKind::Timestamp,
        3 => initial_balance: FieldKind::String,
        4 => shares_dst: FieldKind::String,
    }
}

declare_codec! {
    pub fn redelegation = "cosmos.staking.v1beta1.Redelegation" {
        1 => delegator_address: FieldKind::String,
        2 => validator_src_address: FieldKind::String,
        3 => validator_dst_address: FieldKind::String,
        4 => entries: repeated(message(redelegation_entry())),
    }
}

declare_codec! {
    pub fn params = "cosmos.staking.v1beta1.Params" {
        1 => unbonding_time: message(duration()),
        2 => max_validators: FieldKind::Uint32,
        3 => max_entries: FieldKind::Uint32,
        4 => historical_entries: FieldKind::Uint32,
        5 => bond_denom: FieldKind::String,
    }
}

declare_codec! {
    pub fn delegation_response = "cosmos.staking.v1beta1.DelegationResponse" {
        1 => delegation: message(delegation()),
        2 => balance: message(coin()),
    }
}

declare_codec! {
    pub fn redelegation_entry_response = "cosmos.staking.v1beta1.RedelegationEntryResponse" {
        1 => redelegation_entry: message(redelegation_entry()),
        4 => balance: FieldKind::String,
    }
}

declare_codec! {
    pub fn redelegation_response = "cosmos.staking.v1beta1.RedelegationResponse" {
        1 => redelegation: message(redelegation()),
        2 => entries: repeated(message(redelegation_entry_response())),
    }
}

declare_codec! {
    pub fn pool = "cosmos.staking.v1beta1.Pool" {
        1 => not_bonded_tokens: FieldKind::String,
        2 => bonded_tokens: FieldKind::String,
    }
}

declare_codec! {
    pub fn historical_info = "cosmos.staking.v1beta1.HistoricalInfo" {
        1 => header: message(header()),
        2 => valset: repeated(message(validator())),
    }
}

// ---- Query service ----

declare_codec! {
    pub fn query_validators_request = "cosmos.staking.v1beta1.QueryValidatorsRequest" {
        1 => status: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_validators_response = "cosmos.staking.v1beta1.QueryValidatorsResponse" {
        1 => validators: repeated(message(validator())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_validator_request = "cosmos.staking.v1beta1.QueryValidatorRequest" {
        1 => validator_addr: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_validator_response = "cosmos.staking.v1beta1.QueryValidatorResponse" {
        1 => validator: message(validator()),
    }
}

declare_codec! {
    pub fn query_validator_delegations_request = "cosmos.staking.v1beta1.QueryValidatorDelegationsRequest" {
        1 => validator_addr: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_validator_delegations_response = "cosmos.staking.v1beta1.QueryValidatorDelegationsResponse" {
        1 => delegation_responses: repeated(message(delegation_response())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_validator_unbonding_delegations_request = "cosmos.staking.v1beta1.QueryValidatorUnbondingDelegationsRequest" {
        1 => validator_addr: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_validator_unbonding_delegations_response = "cosmos.staking.v1beta1.QueryValidatorUnbondingDelegationsResponse" {
        1 => unbonding_responses: repeated(message(unbonding_delegation())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_delegation_request = "cosmos.staking.v1beta1.QueryDelegationRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => validator_addr: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_delegation_response = "cosmos.staking.v1beta1.QueryDelegationResponse" {
        1 => delegation_response: message(delegation_response()),
    }
}

declare_codec! {
    pub fn query_unbonding_delegation_request = "cosmos.staking.v1beta1.QueryUnbondingDelegationRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => validator_addr: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_unbonding_delegation_response = "cosmos.staking.v1beta1.QueryUnbondingDelegationResponse" {
        1 => unbond: message(unbonding_delegation()),
    }
}

declare_codec! {
    pub fn query_delegator_delegations_request = "cosmos.staking.v1beta1.QueryDelegatorDelegationsRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_delegator_delegations_response = "cosmos.staking.v1beta1.QueryDelegatorDelegationsResponse" {
        1 => delegation_responses: repeated(message(delegation_response())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_delegator_unbonding_delegations_request = "cosmos.staking.v1beta1.QueryDelegatorUnbondingDelegationsRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_delegator_unbonding_delegations_response = "cosmos.staking.v1beta1.QueryDelegatorUnbondingDelegationsResponse" {
        1 => unbonding_responses: repeated(message(unbonding_delegation())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_redelegations_request = "cosmos.staking.v1beta1.QueryRedelegationsRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => src_validator_addr: FieldKind::String,
        3 => dst_validator_addr: FieldKind::String,
        4 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_redelegations_response = "cosmos.staking.v1beta1.QueryRedelegationsResponse" {
        1 => redelegation_responses: repeated(message(redelegation_response())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_delegator_validators_request = "cosmos.staking.v1beta1.QueryDelegatorValidatorsRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_delegator_validators_response = "cosmos.staking.v1beta1.QueryDelegatorValidatorsResponse" {
        1 => validators: repeated(message(validator())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_delegator_validator_request = "cosmos.staking.v1beta1.QueryDelegatorValidatorRequest" {
        1 => delegator_addr: FieldKind::String,
        2 => validator_addr: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_delegator_validator_response = "cosmos.staking.v1beta1.QueryDelegatorValidatorResponse" {
        1 => validator: message(validator()),
    }
}

declare_codec! {
    pub fn query_historical_info_request = "cosmos.staking.v1beta1.QueryHistoricalInfoRequest" {
        1 => height: FieldKind::Int64,
    }
}

declare_codec! {
    pub fn query_historical_info_response = "cosmos.staking.v1beta1.QueryHistoricalInfoResponse" {
        1 => hist: message(historical_info()),
    }
}

declare_codec! {
    pub fn query_pool_request = "cosmos.staking.v1beta1.QueryPoolRequest" {}
}

declare_codec! {
    pub fn query_pool_response = "cosmos.staking.v1beta1.QueryPoolResponse" {
        1 => pool: message(pool()),
    }
}

declare_codec! {
    pub fn query_params_request = "cosmos.staking.v1beta1.QueryParamsRequest" {}
}

declare_codec! {
    pub fn query_params_response = "cosmos.staking.v1beta1.QueryParamsResponse" {
        1 => params: message(params()),
    }
}

pub static QUERY: ServiceDescriptor = ServiceDescriptor {
    name: "cosmos.staking.v1beta1.Query",
    methods: &[
        MethodDescriptor::new("Validators", query_validators_request, query_validators_response),
        MethodDescriptor::new("Validator", query_validator_request, query_validator_response),
        MethodDescriptor::new(
            "ValidatorDelegations",
            query_validator_delegations_request,
            query_validator_delegations_response,
        ),
        MethodDescriptor::new(
            "ValidatorUnbondingDelegations",
            query_validator_unbonding_delegations_request,
            query_validator_unbonding_delegations_response,
        ),
        MethodDescriptor::new("Delegation", query_delegation_request, query_delegation_response),
        MethodDescriptor::new(
            "UnbondingDelegation",
            query_unbonding_delegation_request,
            query_unbonding_delegation_response,
        ),
        MethodDescriptor::new(
            "DelegatorDelegations",
            query_delegator_delegations_request,
            query_delegator_delegations_response,
        ),
        MethodDescriptor::new(
            "DelegatorUnbondingDelegations",
            query_delegator_unbonding_delegations_request,
            query_delegator_unbonding_delegations_response,
        ),
        MethodDescriptor::new("Redelegations", query_redelegations_request, query_redelegations_response),
        MethodDescriptor::new(
            "DelegatorValidators",
            query_delegator_validators_request,
            query_delegator_validators_response,
        ),
        MethodDescriptor::new(
            "DelegatorValidator",
            query_delegator_validator_request,
            query_delegator_validator_response,
        ),
        MethodDescriptor::new("HistoricalInfo", query_historical_info_request, query_historical_info_response),
        MethodDescriptor::new("Pool", query_pool_request, query_pool_response),
        MethodDescriptor::new("Params", query_params_request, query_params_response),
    ],
};

// ---- Msg service ----

declare_codec! {
    pub fn msg_create_validator = "cosmos.staking.v1beta1.MsgCreateValidator" {
        1 => description: message(description()),
        2 => commission: message(commission_rates()),
        3 => min_self_delegation: FieldKind::String,
        4 => delegator_address: FieldKind::String,
        5 => validator_address: FieldKind::String,
        6 => pubkey: message(any()),
        7 => value: message(coin()),
    }
}

declare_codec! {
    pub fn msg_create_validator_response = "cosmos.staking.v1beta1.MsgCreateValidatorResponse" {}
}

declare_codec! {
    pub fn msg_edit_validator = "cosmos.staking.v1beta1.MsgEditValidator" {
        1 => description: message(description()),
        2 => validator_address: FieldKind::String,
        3 => commission_rate: FieldKind::String,
        4 => min_self_delegation: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_edit_validator_response = "cosmos.staking.v1beta1.MsgEditValidatorResponse" {}
}

declare_codec! {
    pub fn msg_delegate = "cosmos.staking.v1beta1.MsgDelegate" {
        1 => delegator_address: FieldKind::String,
        2 => validator_address: FieldKind::String,
        3 => amount: message(coin()),
    }
}

declare_codec! {
    pub fn msg_delegate_response = "cosmos.staking.v1beta1.MsgDelegateResponse" {}
}

declare_codec! {
    pub fn msg_begin_redelegate = "cosmos.staking.v1beta1.MsgBeginRedelegate" {
        1 => delegator_address: FieldKind::String,
        2 => validator_src_address: FieldKind::String,
        3 => validator_dst_address: FieldKind::String,
        4 => amount: message(coin()),
    }
}

declare_codec! {
    pub fn msg_begin_redelegate_response = "cosmos.staking.v1beta1.MsgBeginRedelegateResponse" {
        1 => completion_time: FieldKind::Timestamp,
    }
}

declare_codec! {
    pub fn msg_undelegate = "cosmos.staking.v1beta1.MsgUndelegate" {
        1 => delegator_address: FieldKind::String,
        2 => validator_address: FieldKind::String,
        3 => amount: message(coin()),
    }
}

declare_codec! {
    pub fn msg_undelegate_response = "cosmos.staking.v1beta1.MsgUndelegateResponse" {
        1 => completion_time: FieldKind::Timestamp,
    }
}

pub static MSG: ServiceDescriptor = ServiceDescriptor {
    name: "cosmos.staking.v1beta1.Msg",
    methods: &[
        MethodDescriptor::new("CreateValidator", msg_create_validator, msg_create_validator_response),
        MethodDescriptor::new("EditValidator", msg_edit_validator, msg_edit_validator_response),
        MethodDescriptor::new("Delegate", msg_delegate, msg_delegate_response),
        MethodDescriptor::new("BeginRedelegate", msg_begin_redelegate, msg_begin_redelegate_response),
        MethodDescriptor::new("Undelegate", msg_undelegate, msg_undelegate_response),
    ],
};
