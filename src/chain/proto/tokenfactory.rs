/// sei.tokenfactory.v1 schemas and service descriptors

use crate::codec::{declare_codec, FieldKind};

use super::common::{coin, metadata};
use super::{message, repeated, MethodDescriptor, ServiceDescriptor};

declare_codec! {
    pub fn denom_authority_metadata = "sei.tokenfactory.v1.DenomAuthorityMetadata" {
        1 => admin: FieldKind::String,
    }
}

declare_codec! {
    pub fn params = "sei.tokenfactory.v1.Params" {
        1 => denom_allowlist_max_size: FieldKind::Uint32,
    }
}

// ---- Query service ----

declare_codec! {
    pub fn query_params_request = "sei.tokenfactory.v1.QueryParamsRequest" {}
}

declare_codec! {
    pub fn query_params_response = "sei.tokenfactory.v1.QueryParamsResponse" {
        1 => params: message(params()),
    }
}

declare_codec! {
    pub fn query_denom_authority_metadata_request = "sei.tokenfactory.v1.QueryDenomAuthorityMetadataRequest" {
        1 => denom: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_denom_authority_metadata_response = "sei.tokenfactory.v1.QueryDenomAuthorityMetadataResponse" {
        1 => authority_metadata: message(denom_authority_metadata()),
    }
}

declare_codec! {
    pub fn query_denom_metadata_request = "sei.tokenfactory.v1.QueryDenomMetadataRequest" {
        1 => denom: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_denom_metadata_response = "sei.tokenfactory.v1.QueryDenomMetadataResponse" {
        1 => metadata: message(metadata()),
    }
}

declare_codec! {
    pub fn query_denoms_from_creator_request = "sei.tokenfactory.v1.QueryDenomsFromCreatorRequest" {
        1 => creator: FieldKind::String,
    }
}

declare_codec! {
    pub fn query_denoms_from_creator_response = "sei.tokenfactory.v1.QueryDenomsFromCreatorResponse" {
        1 => denoms: repeated(FieldKind::String),
    }
}

pub static QUERY: ServiceDescriptor = ServiceDescriptor {
    name: "sei.tokenfactory.v1.Query",
    methods: &[
        MethodDescriptor::new("Params", query_params_request, query_params_response),
        MethodDescriptor::new(
            "DenomAuthorityMetadata",
            query_denom_authority_metadata_request,
            query_denom_authority_metadata_response,
        ),
        MethodDescriptor::new("DenomMetadata", query_denom_metadata_request, query_denom_metadata_response),
        MethodDescriptor::new(
            "DenomsFromCreator",
            query_denoms_from_creator_request,
            query_denoms_from_creator_response,
        ),
    ],
};

// ---- Msg service ----

declare_codec! {
    pub fn msg_create_denom = "sei.tokenfactory.v1.MsgCreateDenom" {
        1 => sender: FieldKind::String,
        2 => subdenom: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_create_denom_response = "sei.tokenfactory.v1.MsgCreateDenomResponse" {
        1 => new_token_denom: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_mint = "sei.tokenfactory.v1.MsgMint" {
        1 => sender: FieldKind::String,
        2 => amount: message(coin()),
    }
}

declare_codec! {
    pub fn msg_mint_response = "sei.tokenfactory.v1.MsgMintResponse" {}
}

declare_codec! {
    pub fn msg_burn = "sei.tokenfactory.v1.MsgBurn" {
        1 => sender: FieldKind::String,
        2 => amount: message(coin()),
    }
}

declare_codec! {
    pub fn msg_burn_response = "sei.tokenfactory.v1.MsgBurnResponse" {}
}

declare_codec! {
    pub fn msg_change_admin = "sei.tokenfactory.v1.MsgChangeAdmin" {
        1 => sender: FieldKind::String,
        2 => denom: FieldKind::String,
        3 => new_admin: FieldKind::String,
    }
}

declare_codec! {
    pub fn msg_change_admin_response = "sei.tokenfactory.v1.MsgChangeAdminResponse" {}
}

declare_codec! {
    pub fn msg_set_denom_metadata = "sei.tokenfactory.v1.MsgSetDenomMetadata" {
        1 => sender: FieldKind::String,
        2 => metadata: message(metadata()),
    }
}

declare_codec! {
    pub fn msg_set_denom_metadata_response = "sei.tokenfactory.v1.MsgSetDenomMetadataResponse" {}
}

pub static MSG: ServiceDescriptor = ServiceDescriptor {
    name: "sei.tokenfactory.v1.Msg",
    methods: &[
        MethodDescriptor::new("CreateDenom", msg_create_denom, msg_create_denom_response),
        MethodDescriptor::new("Mint", msg_mint, msg_mint_response),
        MethodDescriptor::new("Burn", msg_burn, msg_burn_response),
        MethodDescriptor::new("ChangeAdmin", msg_change_admin, msg_change_admin_response),
        MethodDescriptor::new(
            "SetDenomMetadata",
            msg_set_denom_metadata,
            msg_set_denom_metadata_response,
        ),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Message;

    #[test]
    fn test_denom_metadata_from_rest_body() {
        // Shape served by GET /sei/tokenfactory/v1/denoms/metadata
        let body = serde_json::json!({
            "metadata": {
                "description": "factory token",
                "denom_units": [
                    {"denom": "factory/sei1abc/ufoo", "exponent": 0, "aliases": ["microfoo"]},
                    {"denom": "foo", "exponent": 6, "aliases": []},
                ],
                "base": "factory/sei1abc/ufoo",
                "display": "foo",
                "name": "Foo",
                "symbol": "FOO",
            }
        });
        let codec = query_denom_metadata_response();
        let msg = codec.from_plain(&body).unwrap();
        let metadata = msg.get_message("metadata").unwrap();
        let units = metadata.get_list("denom_units").unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].as_message().unwrap().get_u64("exponent"), Some(6));

        let decoded = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_empty_denom_entries_survive() {
        let codec = query_denoms_from_creator_response();
        let msg = codec
            .from_partial(&Message::new().with("denoms", vec!["factory/sei1abc/a".to_string(), String::new()]))
            .unwrap();
        // Repeated elements are written even when empty
        let decoded = codec.decode(&codec.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded.get_list("denoms").unwrap().len(), 2);
    }
}
