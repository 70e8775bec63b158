//! Deployment configuration.
//!
//! Scales, the minimum order cell size, the fee rate and the script
//! dependency set are fixed per deployment. They are read from a TOML file:
//!
//! ```toml
//! price_scale = 10000000000
//! shannons_scale = 100000000
//! min_order_cell_capacity = 18100000000
//! fee_rate_per_byte = 1
//!
//! [[cell_deps]]
//! tx_hash = "0x...64 hex chars..."
//! index = 0
//! dep_type = "dep_group"
//! ```
//!
//! TOML integers are signed 64-bit, so values are stored as `u64` and
//! widened to `u128` when handed to the kernel.

use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::assembler::{TransactionAssembler, DEFAULT_FEE_RATE_PER_BYTE};
use crate::engine::MatchParams;
use crate::error::ConfigError;
use crate::types::{CellDep, DepType, OutPoint};
use crate::validator::{OrderValidator, DEFAULT_MIN_ORDER_CELL_CAPACITY};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DepTypeConfig {
    #[default]
    Code,
    DepGroup,
}

impl From<DepTypeConfig> for DepType {
    fn from(value: DepTypeConfig) -> Self {
        match value {
            DepTypeConfig::Code => DepType::Code,
            DepTypeConfig::DepGroup => DepType::DepGroup,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CellDepConfig {
    pub tx_hash: String,
    pub index: u32,
    #[serde(default)]
    pub dep_type: DepTypeConfig,
}

impl CellDepConfig {
    pub fn to_cell_dep(&self) -> Result<CellDep, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidHash {
            hash: self.tx_hash.clone(),
            reason,
        };

        let body = self
            .tx_hash
            .strip_prefix("0x")
            .ok_or_else(|| invalid("missing 0x prefix".to_string()))?;
        let bytes = hex::decode(body).map_err(|e| invalid(e.to_string()))?;
        let tx_hash: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| invalid(format!("expected 32 bytes, got {}", b.len())))?;

        Ok(CellDep::new(OutPoint::new(tx_hash, self.index), self.dep_type.into()))
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub price_scale: u64,
    pub shannons_scale: u64,
    pub min_order_cell_capacity: u64,
    pub fee_rate_per_byte: u64,
    pub cell_deps: Vec<CellDepConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let params = MatchParams::default();
        EngineConfig {
            price_scale: params.price_scale as u64,
            shannons_scale: params.shannons_scale as u64,
            min_order_cell_capacity: DEFAULT_MIN_ORDER_CELL_CAPACITY as u64,
            fee_rate_per_byte: DEFAULT_FEE_RATE_PER_BYTE as u64,
            cell_deps: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and check a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    /// Load from a TOML file, falling back to defaults if it cannot be read
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) => {
                warn!(
                    "could not read config file {}, using defaults: {:?}",
                    path.display(),
                    e
                );
                Ok(Self::default())
            }
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.price_scale == 0 {
            return Err(ConfigError::InvalidScale("price_scale must be non-zero".into()));
        }
        if self.shannons_scale == 0 {
            return Err(ConfigError::InvalidScale("shannons_scale must be non-zero".into()));
        }
        Ok(())
    }

    pub fn match_params(&self) -> MatchParams {
        MatchParams::new(self.price_scale as u128, self.shannons_scale as u128)
    }

    pub fn validator(&self) -> OrderValidator {
        OrderValidator::new(self.match_params(), self.min_order_cell_capacity as u128)
    }

    pub fn cell_deps(&self) -> Result<Vec<CellDep>, ConfigError> {
        self.cell_deps.iter().map(CellDepConfig::to_cell_dep).collect()
    }

    pub fn assembler(&self) -> Result<TransactionAssembler, ConfigError> {
        Ok(TransactionAssembler::new(
            self.cell_deps()?,
            self.fee_rate_per_byte as u128,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.price_scale, 10_000_000_000);
        assert_eq!(config.shannons_scale, 100_000_000);
        assert_eq!(config.match_params(), MatchParams::default());
        assert!(config.cell_deps().unwrap().is_empty());
    }

    #[test]
    fn test_from_toml_str() {
        let contents = format!(
            r#"
            price_scale = 1000
            fee_rate_per_byte = 2

            [[cell_deps]]
            tx_hash = "{}"
            index = 3
            dep_type = "dep_group"
            "#,
            HASH
        );

        let config = EngineConfig::from_toml_str(&contents).unwrap();
        assert_eq!(config.price_scale, 1000);
        assert_eq!(config.shannons_scale, 100_000_000);
        assert_eq!(config.fee_rate_per_byte, 2);

        let deps = config.cell_deps().unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].out_point, OutPoint::new([0x11; 32], 3));
        assert_eq!(deps[0].dep_type_raw, DepType::DepGroup.to_u8());

        assert_eq!(config.assembler().unwrap().fee_rate_per_byte(), 2);
    }

    #[test]
    fn test_zero_scale_rejected() {
        let err = EngineConfig::from_toml_str("price_scale = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidScale(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = EngineConfig::from_toml_str("price_scale = \"ten\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_invalid_cell_dep_hash() {
        let dep = CellDepConfig {
            tx_hash: "0x1234".to_string(),
            index: 0,
            dep_type: DepTypeConfig::Code,
        };
        assert!(matches!(dep.to_cell_dep(), Err(ConfigError::InvalidHash { .. })));

        let dep = CellDepConfig {
            tx_hash: HASH.trim_start_matches("0x").to_string(),
            index: 0,
            dep_type: DepTypeConfig::Code,
        };
        assert!(matches!(dep.to_cell_dep(), Err(ConfigError::InvalidHash { .. })));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = EngineConfig::from_toml("/nonexistent/cell-dex.toml").unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
