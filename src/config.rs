use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aggregate::KeyMode;
use crate::error::ConfigError;
use crate::filter::CombinationMode;
use crate::metrics::TotalFundingScope;

/// Engine switches. Defaults: filters widen (`any`) and the funding total
/// ignores them (`unfiltered`).
///
/// ```toml
/// combination_mode = "all"
/// total_funding_scope = "filtered"
/// key_mode = "with-id"
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub combination_mode: CombinationMode,
    pub total_funding_scope: TotalFundingScope,
    pub key_mode: KeyMode,
}

impl EngineConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}
