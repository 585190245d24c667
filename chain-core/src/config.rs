//! Configuration for a chain node

use crate::types::{AccountId, Allocation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Genesis configuration
    pub genesis: GenesisConfig,

    /// Block assembly configuration
    pub assembly: AssemblyConfig,

    /// Demo transaction generator configuration
    pub generator: GeneratorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "chain-node".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            genesis: GenesisConfig::default(),
            assembly: AssemblyConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

/// Genesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Initial balance per account
    pub balances: BTreeMap<String, i64>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            balances: BTreeMap::from([("Alice".to_string(), 50), ("Bob".to_string(), 50)]),
        }
    }
}

/// Block assembly configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Maximum transactions per block
    pub max_txns_per_block: usize,

    /// Seal interval for pending transactions (milliseconds)
    pub seal_interval_ms: u64,

    /// Seal automatically on the interval or when a block fills
    pub auto_seal: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            max_txns_per_block: 5,
            seal_interval_ms: 1000,
            auto_seal: true,
        }
    }
}

/// Demo transaction generator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// RNG seed
    pub seed: u64,

    /// Largest amount moved by one transaction
    pub max_value: i64,

    /// Accounts transfers are drawn between
    pub accounts: Vec<String>,

    /// Transactions generated per run
    pub count: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            max_value: 3,
            accounts: vec!["Alice".to_string(), "Bob".to_string()],
            count: 30,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Some(value) = env_parse("CHAIN_MAX_TXNS_PER_BLOCK")? {
            config.assembly.max_txns_per_block = value;
        }

        if let Some(value) = env_parse("CHAIN_SEAL_INTERVAL_MS")? {
            config.assembly.seal_interval_ms = value;
        }

        if let Some(value) = env_parse("CHAIN_GENERATOR_SEED")? {
            config.generator.seed = value;
        }

        if let Some(value) = env_parse("CHAIN_GENERATOR_COUNT")? {
            config.generator.count = value;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the node cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.assembly.max_txns_per_block == 0 {
            return Err(crate::Error::Config(
                "assembly.max_txns_per_block must be at least 1".to_string(),
            ));
        }

        if self.generator.max_value < 1 {
            return Err(crate::Error::Config(
                "generator.max_value must be at least 1".to_string(),
            ));
        }

        let mut accounts = self.generator.accounts.clone();
        accounts.sort();
        accounts.dedup();
        if accounts.len() < 2 {
            return Err(crate::Error::Config(
                "generator.accounts needs two distinct accounts".to_string(),
            ));
        }

        Ok(())
    }

    /// Genesis balances as an allocation
    pub fn genesis_allocation(&self) -> Allocation {
        self.genesis
            .balances
            .iter()
            .map(|(account, balance)| (account.as_str(), *balance))
            .collect()
    }

    /// Generator accounts as account IDs
    pub fn generator_accounts(&self) -> Vec<AccountId> {
        self.generator
            .accounts
            .iter()
            .map(|account| AccountId::new(account.as_str()))
            .collect()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> crate::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| crate::Error::Config(format!("Invalid {}={:?}: {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "chain-node");
        assert_eq!(config.assembly.max_txns_per_block, 5);
        assert!(config.assembly.auto_seal);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.genesis_allocation(),
            Allocation::from([("Alice", 50), ("Bob", 50)])
        );
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[genesis.balances]
Carol = 10
Dave = 20

[assembly]
max_txns_per_block = 3
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.assembly.max_txns_per_block, 3);
        assert_eq!(config.assembly.seal_interval_ms, 1000);
        assert_eq!(
            config.genesis_allocation(),
            Allocation::from([("Carol", 10), ("Dave", 20)])
        );
        assert_eq!(config.generator.count, 30);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[assembly]\nmax_txns_per_block = 0").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not = [valid").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(crate::Error::Config(_))
        ));
    }
}
