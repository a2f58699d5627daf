/// Declared Cosmos schemas and their gRPC service descriptors
///
/// Every message type is a lazily built `Codec` that matches the field
/// numbers of the published `.proto` files for staking, IBC client and the
/// Sei token factory.

pub mod common;
pub mod ibc_client;
pub mod staking;
pub mod tokenfactory;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::codec::{Codec, FieldKind};

pub(crate) fn message(codec: Arc<Codec>) -> FieldKind {
    FieldKind::message(codec)
}

pub(crate) fn repeated(kind: FieldKind) -> FieldKind {
    FieldKind::repeated(kind)
}

/// One RPC: method name plus request/response schemas
#[derive(Debug, Clone, Copy)]
pub struct MethodDescriptor {
    pub name: &'static str,
    pub request: fn() -> Arc<Codec>,
    pub response: fn() -> Arc<Codec>,
}

impl MethodDescriptor {
    pub const fn new(
        name: &'static str,
        request: fn() -> Arc<Codec>,
        response: fn() -> Arc<Codec>,
    ) -> Self {
        Self { name, request, response }
    }
}

/// A gRPC service (`cosmos.staking.v1beta1.Query`, ...) and its methods
#[derive(Debug)]
pub struct ServiceDescriptor {
    pub name: &'static str,
    pub methods: &'static [MethodDescriptor],
}

impl ServiceDescriptor {
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// gRPC path, e.g. `/cosmos.staking.v1beta1.Query/Validators`
    pub fn path(&self, method: &str) -> String {
        format!("/{}/{}", self.name, method)
    }
}

/// All services known to the crate
pub fn services() -> [&'static ServiceDescriptor; 6] {
    [
        &staking::QUERY,
        &staking::MSG,
        &ibc_client::QUERY,
        &ibc_client::MSG,
        &tokenfactory::QUERY,
        &tokenfactory::MSG,
    ]
}

/// Lookup of schemas by fully-qualified name or type URL (`/pkg.Type`)
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    by_name: BTreeMap<String, Arc<Codec>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every declared type, including nested ones
    pub fn global() -> &'static SchemaRegistry {
        static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let mut registry = SchemaRegistry::new();
            for service in services() {
                for method in service.methods {
                    registry.register((method.request)());
                    registry.register((method.response)());
                }
            }
            for extra in [
                common::ed25519_pub_key(),
                common::tx_body(),
                common::fee(),
                staking::val_addresses(),
                staking::dv_pairs(),
                staking::dvv_triplets(),
                ibc_client::client_consensus_states(),
            ] {
                registry.register(extra);
            }
            registry
        })
    }

    /// Register a schema and, recursively, every message type it references
    pub fn register(&mut self, codec: Arc<Codec>) {
        if self.by_name.contains_key(codec.name()) {
            return;
        }
        self.by_name.insert(codec.name().to_string(), codec.clone());
        for field in codec.fields() {
            let kind = match field.kind() {
                FieldKind::Repeated(inner) => inner.as_ref(),
                kind => kind,
            };
            if let FieldKind::Message(nested) = kind {
                self.register(nested.clone());
            }
        }
    }

    /// Accepts `cosmos.staking.v1beta1.Validator` or `/cosmos.staking.v1beta1.Validator`
    pub fn get(&self, name_or_url: &str) -> Option<Arc<Codec>> {
        self.by_name.get(name_or_url.trim_start_matches('/')).cloned()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_declaration_builds() {
        // Building the registry forces every declared schema
        let registry = SchemaRegistry::global();
        assert!(registry.len() > 100);
        assert!(registry.get("/cosmos.staking.v1beta1.Validator").is_some());
        assert!(registry.get("tendermint.types.PartSetHeader").is_some());
        assert!(registry.get("google.protobuf.Timestamp").is_none());
    }

    #[test]
    fn test_service_paths() {
        assert_eq!(
            staking::QUERY.path("Validators"),
            "/cosmos.staking.v1beta1.Query/Validators"
        );
        let names: Vec<_> = services().iter().map(|s| s.name).collect();
        assert!(names.contains(&"sei.tokenfactory.v1.Msg"));
    }
}
