use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a case registry.
///
/// Stored as TOML in `.cases/config.toml` at the root of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Whether to allow the registry directory to contain YAML files that
    /// cannot be read as cases.
    pub allow_unrecognised: bool,

    /// Whether linking cases may introduce a cycle of case ids.
    ///
    /// Cycles are refused by default. Data that already contains cycles is
    /// still loaded.
    pub reject_cycles: bool,

    /// Whether to print taxpayer ids and filing numbers with their usual
    /// punctuation.
    pub mask_documents: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_unrecognised: false,
            reject_cycles: true,
            mask_documents: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        allow_unrecognised: bool,

        #[serde(default = "default_true")]
        reject_cycles: bool,

        #[serde(default = "default_true")]
        mask_documents: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                allow_unrecognised,
                reject_cycles,
                mask_documents,
            } => Self {
                allow_unrecognised,
                reject_cycles,
                mask_documents,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            allow_unrecognised: config.allow_unrecognised,
            reject_cycles: config.reject_cycles,
            mask_documents: config.mask_documents,
        }
    }
}
