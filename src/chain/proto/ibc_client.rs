/// ibc.core.client.v1 schemas and service descriptors
///
/// Client and consensus states are light-client specific, so they travel as
/// `google.protobuf.Any` and are unpacked through the schema registry.

use crate::codec::{declare_codec, FieldKind};

use super::common::{any, page_request, page_response};
use super::{message, repeated, MethodDescriptor, ServiceDescriptor};

declare_codec! {
    pub fn height = "ibc.core.client.v1.Height" {
        1 => revision_number: FieldKind::Uint64,
        2 => revision_height: FieldKind::Uint64,
    }
}

declare_codec! {
    pub fn identified_client_state = "ibc.core.client.v1.IdentifiedClientState" {
        1 => client_id: FieldKind::String,
        2 => client_state: message(any()),
    }
}

declare_codec! {
    pub fn consensus_state_with_height = "ibc.core.client.v1.ConsensusStateWithHeight" {
        1 => height: message(height()),
        2 => consensus_state: message(any()),
    }
}

declare_codec! {
    pub fn client_consensus_states = "ibc.core.client.v1.ClientConsensusStates" {
        1 => client_id: FieldKind::String,
        2 => consensus_states: repeated(message(consensus_state_with_height())),
    }
}

declare_codec! {
    pub fn params = "ibc.core.client.v1.Params" {
        1 => allowed_clients: repeated(FieldKind::String),
    }
}

// ---- Query service ----

declare_codec! {
    pub fn query_client_state_request = "ibc.core.client.v1.QueryClientStateRequest" {
        1 => client_id: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_client_state_response = "ibc.core.client.v1.QueryClientStateResponse" {
        1 => client_state: message(any()),
        2 => proof: FieldKind::Bytes,
        3 => proof_height: message(height()),
    }
}

declare_codec! {
    pub fn query_client_states_request = "ibc.core.client.v1.QueryClientStatesRequest" {
        1 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_client_states_response = "ibc.core.client.v1.QueryClientStatesResponse" {
        1 => client_states: repeated(message(identified_client_state())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_consensus_state_request = "ibc.core.client.v1.QueryConsensusStateRequest" {
        1 => client_id: FieldKind::String,
        2 => revision_number: FieldKind::Uint64,
        3 => revision_height: FieldKind::Uint64,
        4 => latest_height: FieldKind::Bool,
    }
}

declare_codec! {
    pub fn query_consensus_state_response = "ibc.core.client.v1.QueryConsensusStateResponse" {
        1 => consensus_state: message(any()),
        2 => proof: FieldKind::Bytes,
        3 => proof_height: message(height()),
    }
}

declare_codec! {
    pub fn query_consensus_states_request = "ibc.core.client.v1.QueryConsensusStatesRequest" {
        1 => client_id: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_consensus_states_response = "ibc.core.client.v1.QueryConsensusStatesResponse" {
        1 => consensus_states: repeated(message(consensus_state_with_height())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_consensus_state_heights_request = "ibc.core.client.v1.QueryConsensusStateHeightsRequest" {
        1 => client_id: FieldKind::String,
        2 => pagination: message(page_request()),
    }
}

declare_codec! {
    pub fn query_consensus_state_heights_response = "ibc.core.client.v1.QueryConsensusStateHeightsResponse" {
        1 => consensus_state_heights: repeated(message(height())),
        2 => pagination: message(page_response()),
    }
}

declare_codec! {
    pub fn query_client_status_request = "ibc.core.client.v1.QueryClientStatusRequest" {
        1 => client_id: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_client_status_response = "ibc.core.client.v1.QueryClientStatusResponse" {
        1 => status: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_client_params_request = "ibc.core.client.v1.QueryClientParamsRequest" {}
}

declare_codec! {
    pub fn query_client_params_response = "ibc.core.client.v1.QueryClientParamsResponse" {
        1 => params: message(params()),
    }
}

declare_codec! {
    pub fn query_upgraded_client_state_request = "ibc.core.client.v1.QueryUpgradedClientStateRequest" {}
}

declare_codec! {
    pub fn query_upgraded_client_state_response = "ibc.core.client.v1.QueryUpgradedClientStateResponse" {
        1 => upgraded_client_state: message(any()),
    }
}

declare_codec! {
    pub fn query_upgraded_consensus_state_request = "ibc.core.client.v1.QueryUpgradedConsensusStateRequest" {}
}

declare_codec! {
    pub fn query_upgraded_consensus_state_response = "ibc.core.client.v1.QueryUpgradedConsensusStateResponse" {
        1 => upgraded_consensus_state: message(any()),
    }
}

pub static QUERY: ServiceDescriptor = ServiceDescriptor {
    name: "ibc.core.client.v1.Query",
    methods: &[
        MethodDescriptor::new("ClientState", query_client_state_request, query_client_state_response),
        MethodDescriptor::new("ClientStates", query_client_states_request, query_client_states_response),
        MethodDescriptor::new(
            "ConsensusState",
            query_consensus_state_request,
            query_consensus_state_response,
        ),
        MethodDescriptor::new(
            "ConsensusStates",
            query_consensus_states_request,
            query_consensus_states_response,
        ),
        MethodDescriptor::new(
            "ConsensusStateHeights",
            query_consensus_state_heights_request,
            query_consensus_state_heights_response,
        ),
        MethodDescriptor::new("ClientStatus", query_client_status_request, query_client_status_response),
        MethodDescriptor::new("ClientParams", query_client_params_request, query_client_params_response),
        MethodDescriptor::new(
            "UpgradedClientState",
            query_upgraded_client_state_request,
            query_upgraded_client_state_response,
        ),
        MethodDescriptor::new(
            "UpgradedConsensusState",
            query_upgraded_consensus_state_request,
            query_upgraded_consensus_state_response,
        ),
    ],
};

// ---- Msg service ----

declare_codec! {
    pub fn msg_create_client = "ibc.core.client.v1.MsgCreateClient" {
        1 => client_state: message(any()),
        2 => consensus_state: message(any()),
        3 => signer: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_create_client_response = "ibc.core.client.v1.MsgCreateClientResponse" {}
}

declare_codec! {
    pub fn msg_update_client = "ibc.core.client.v1.MsgUpdateClient" {
        1 => client_id: FieldKind::String,
        2 => header: message(any()),
        3 => signer: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_update_client_response = "ibc.core.client.v1.MsgUpdateClientResponse" {}
}

declare_codec! {
    pub fn msg_upgrade_client = "ibc.core.client.v1.MsgUpgradeClient" {
        1 => client_id: FieldKind::String,
        2 => client_state: message(any()),
        3 => consensus_state: message(any()),
        4 => proof_upgrade_client: FieldKind::Bytes,
        5 => proof_upgrade_consensus_state: FieldKind::Bytes,
        6 => signer: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_upgrade_client_response = "ibc.core.client.v1.MsgUpgradeClientResponse" {}
}

declare_codec! {
    pub fn msg_submit_misbehaviour = "ibc.core.client.v1.MsgSubmitMisbehaviour" {
        1 => client_id: FieldKind::String,
        2 => misbehaviour: message(any()),
        3 => signer: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_submit_misbehaviour_response = "ibc.core.client.v1.MsgSubmitMisbehaviourResponse" {}
}

pub static MSG: ServiceDescriptor = ServiceDescriptor {
    name: "ibc.core.client.v1.Msg",
    methods: &[
        MethodDescriptor::new("CreateClient", msg_create_client, msg_create_client_response),
        MethodDescriptor::new("UpdateClient", msg_update_client, msg_update_client_response),
        MethodDescriptor::new("UpgradeClient", msg_upgrade_client, msg_upgrade_client_response),
        MethodDescriptor::new(
            "SubmitMisbehaviour",
            msg_submit_misbehaviour,
            msg_submit_misbehaviour_response,
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Message, Value};

    #[test]
    fn test_consensus_states_accumulate() {
        let codec = query_consensus_states_response();
        let entry = |h: u64| {
            consensus_state_with_height()
                .from_partial(&Message::new().with(
                    "height",
                    Message::new().with("revision_number", 1u64).with("revision_height", h),
                ))
                .unwrap()
        };
        let first = codec
            .encode(&codec.from_partial(&Message::new().with("consensus_states", vec![entry(10)])).unwrap())
            .unwrap();
        let second = codec
            .encode(&codec.from_partial(&Message::new().with("consensus_states", vec![entry(11)])).unwrap())
            .unwrap();

        // Concatenated buffers merge repeated fields
        let mut joined = first;
        joined.extend_from_slice(&second);
        let decoded = codec.decode(&joined).unwrap();
        let states = decoded.get_list("consensus_states").unwrap();
        assert_eq!(states.len(), 2);
        let height = states[1].as_message().unwrap().get_message("height").unwrap();
        assert_eq!(height.get("revision_height"), Some(&Value::Uint64(11)));
    }

    #[test]
    fn test_client_state_json() {
        let codec = query_client_state_response();
        let msg = codec
            .from_plain(&serde_json::json!({
                "clientState": {"typeUrl": "/ibc.lightclients.tendermint.v1.ClientState", "value": ""},
                "proof": "AQI=",
                "proofHeight": {"revisionNumber": "1", "revisionHeight": "2048"},
            }))
            .unwrap();
        assert_eq!(msg.get_bytes("proof"), Some(&[1u8, 2][..]));
        let decoded = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_services_cover_all_rpcs() {
        assert_eq!(QUERY.methods.len(), 9);
        assert_eq!(MSG.methods.len(), 4);
        assert!(QUERY.method("ConsensusStateHeights").is_some());
        assert!(MSG.method("Transfer").is_none());
    }
}
