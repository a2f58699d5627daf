/// Shared Cosmos SDK and Tendermint types referenced by the module schemas

use crate::codec::declare_codec;
use crate::codec::FieldKind;

use super::{message, repeated};

pub use crate::codec::wkt::{any, duration};

declare_codec! {
    pub fn coin = "cosmos.base.v1beta1.Coin" {
        1 => denom: FieldKind::String,
        2 => amount: FieldKind::String,
    }
}

declare_codec! {
    pub fn page_request = "cosmos.base.query.v1beta1.PageRequest" {
        1 => key: FieldKind::Bytes,
        2 => offset: FieldKind::Uint64,
        3 => limit: FieldKind::Uint64,
        4 => count_total: FieldKind::Bool,
        5 => reverse: FieldKind::Bool,
    }
}

declare_codec! {
    pub fn page_response = "cosmos.base.query.v1beta1.PageResponse" {
        1 => next_key: FieldKind::Bytes,
        2 => total: FieldKind::Uint64,
    }
}

declare_codec! {
    pub fn denom_unit = "cosmos.bank.v1beta1.DenomUnit" {
        1 => denom: FieldKind::String,
        2 => exponent: FieldKind::Uint32,
        3 => aliases: repeated(FieldKind::String),
    }
}

declare_codec! {
    pub fn metadata = "cosmos.bank.v1beta1.Metadata" {
        1 => description: FieldKind::String,
        2 => denom_units: repeated(message(denom_unit())),
        3 => base: FieldKind::String,
        4 => display: FieldKind::String,
        5 => name: FieldKind::String,
        6 => symbol: FieldKind::String,
    }
}

declare_codec! {
    pub fn consensus = "tendermint.version.Consensus" {
        1 => block: FieldKind::Uint64,
        2 => app: FieldKind::Uint64,
    }
}

declare_codec! {
    pub fn part_set_header = "tendermint.types.PartSetHeader" {
        1 => total: FieldKind::Uint32,
        2 => hash: FieldKind::Bytes,
    }
}

declare_codec! {
    pub fn block_id = "tendermint.types.BlockID" {
        1 => hash: FieldKind::Bytes,
        2 => part_set_header: message(part_set_header()),
    }
}

declare_codec! {
    /// Block header, carried by staking `HistoricalInfo`
    pub fn header = "tendermint.types.Header" {
        1 => version: message(consensus()),
        2 => chain_id: FieldKind::String,
        3 => height: FieldKind::Int64,
        4 => time: FieldKind::Timestamp,
        5 => last_block_id: message(block_id()),
        6 => last_commit_hash: FieldKind::Bytes,
        7 => data_hash: FieldKind::Bytes,
        8 => validators_hash: FieldKind::Bytes,
        9 => next_validators_hash: FieldKind::Bytes,
        10 => consensus_hash: FieldKind::Bytes,
        11 => app_hash: FieldKind::Bytes,
        12 => last_results_hash: FieldKind::Bytes,
        13 => evidence_hash: FieldKind::Bytes,
        14 => proposer_address: FieldKind::Bytes,
    }
}

declare_codec! {
    /// Validator consensus key, usually packed into `Validator.consensus_pubkey`
    pub fn ed25519_pub_key = "cosmos.crypto.ed25519.PubKey" {
        1 => key: FieldKind::Bytes,
    }
}

declare_codec! {
    pub fn tx_body = "cosmos.tx.v1beta1.TxBody" {
        1 => messages: repeated(message(any())),
        2 => memo: FieldKind::String,
        3 => timeout_height: FieldKind::Uint64,
    }
}

declare_codec! {
    pub fn fee = "cosmos.tx.v1beta1.Fee" {
        1 => amount: repeated(message(coin())),
        2 => gas_limit: FieldKind::Uint64,
        3 => payer: FieldKind::String,
        4 => granter: FieldKind::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Message;

    #[test]
    fn test_coin_bytes() {
        let coin = coin();
        let msg = coin
            .from_partial(&Message::new().with("denom", "usei").with("amount", "1"))
            .unwrap();
        assert_eq!(
            coin.encode(&msg).unwrap(),
            vec![0x0a, 0x04, b'u', b's', b'e', b'i', 0x12, 0x01, b'1']
        );
    }

    #[test]
    fn test_header_time_round_trip() {
        let header = header();
        let msg = header
            .from_plain(&serde_json::json!({
                "chainId": "atlantic-2",
                "height": "1024",
                "time": "2024-05-01T10:00:00.5Z",
                "proposerAddress": "AAEC",
            }))
            .unwrap();
        let decoded = header.decode(&header.encode(&msg).unwrap()).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(
            header.to_plain(&decoded).unwrap()["time"],
            "2024-05-01T10:00:00.500Z"
        );
    }
}
