use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::chain::ClientConfig;
use crate::codec::CodecConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ClientConfig,
    // JSON casing and 64-bit integer rendering
    #[serde(default)]
    pub codec: CodecConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Int64Encoding, JsonCasing};

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("cosmos_codec_config_{}.toml", std::process::id()));
        let mut config = Config::default();
        config.chain.chain_id = "pacific-1".to_string();
        config.codec.int64 = Int64Encoding::String;

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [chain]
            grpc_endpoint = "http://localhost:9090"

            [codec]
            casing = "snake"
            "#,
        )
        .unwrap();

        assert_eq!(config.chain.grpc_endpoint, "http://localhost:9090");
        assert_eq!(config.chain.gas_limit, 200_000);
        assert_eq!(config.codec.casing, JsonCasing::Snake);
        assert_eq!(config.codec.int64, Int64Encoding::Number);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = Config::load_or_default("/nonexistent/cosmos_codec.toml").unwrap();
        assert_eq!(config, Config::default());
    }
}
