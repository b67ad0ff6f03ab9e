//! Mapper configuration.
//!
//! Supports loading configuration from:
//! 1. YAML or JSON documents
//! 2. Environment variables (with ARVAK_QMAP_ prefix)
//!
//! Environment variables take precedence over file values, which take
//! precedence over defaults.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::mapper::{BravyiKitaevMapper, DirectMapper, JordanWignerMapper, ParityMapper, QubitMapper};
use crate::symmetry::{QubitConverter, Z2Reduction};

/// Environment variable selecting the mapper.
pub const ENV_MAPPER: &str = "ARVAK_QMAP_MAPPER";
/// Environment variable enabling two-qubit reduction (`true`/`false`).
pub const ENV_TWO_QUBIT_REDUCTION: &str = "ARVAK_QMAP_TWO_QUBIT_REDUCTION";
/// Environment variable selecting Z2 reduction (`none`, `auto`, or `1,-1,…`).
pub const ENV_Z2_REDUCTION: &str = "ARVAK_QMAP_Z2_REDUCTION";

/// Available encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapperKind {
    /// Jordan-Wigner (fermionic).
    #[default]
    JordanWigner,
    /// Parity (fermionic).
    Parity,
    /// Bravyi-Kitaev (fermionic).
    BravyiKitaev,
    /// Direct (vibrational).
    Direct,
}

impl MapperKind {
    /// Instantiate the mapper.
    pub fn build(self) -> Arc<dyn QubitMapper> {
        match self {
            MapperKind::JordanWigner => Arc::new(JordanWignerMapper::new()),
            MapperKind::Parity => Arc::new(ParityMapper::new()),
            MapperKind::BravyiKitaev => Arc::new(BravyiKitaevMapper::new()),
            MapperKind::Direct => Arc::new(DirectMapper::new()),
        }
    }

    /// Whether the encoding supports two-qubit reduction.
    pub fn allows_two_qubit_reduction(self) -> bool {
        matches!(self, MapperKind::Parity)
    }
}

impl fmt::Display for MapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MapperKind::JordanWigner => "jordan_wigner",
            MapperKind::Parity => "parity",
            MapperKind::BravyiKitaev => "bravyi_kitaev",
            MapperKind::Direct => "direct",
        };
        f.write_str(name)
    }
}

impl FromStr for MapperKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "jordan_wigner" | "jw" => Ok(MapperKind::JordanWigner),
            "parity" => Ok(MapperKind::Parity),
            "bravyi_kitaev" | "bk" => Ok(MapperKind::BravyiKitaev),
            "direct" => Ok(MapperKind::Direct),
            other => Err(ConfigError::ParseError(format!("Unknown mapper: {other}"))),
        }
    }
}

/// How operators are converted to qubit space.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Base encoding.
    #[serde(default)]
    pub mapper: MapperKind,

    /// Drop the two parity qubits when particle numbers are known.
    #[serde(default)]
    pub two_qubit_reduction: bool,

    /// Z2 symmetry tapering mode.
    #[serde(default)]
    pub z2symmetry_reduction: Z2Reduction,
}

impl ConverterConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ConverterConfig = serde_yaml_ng::from_str(contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document.
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ConverterConfig =
            serde_json::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are parsed as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    /// Load from an optional file, then apply environment overrides.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => ConverterConfig::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    /// Apply `ARVAK_QMAP_*` environment variables.
    pub fn merge_env(self) -> Self {
        self.merge_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and leave the field unchanged.
    pub fn merge_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup(ENV_MAPPER) {
            match v.parse() {
                Ok(mapper) => self.mapper = mapper,
                Err(e) => warn!(key = ENV_MAPPER, value = %v, error = %e, "ignoring override"),
            }
        }
        if let Some(v) = lookup(ENV_TWO_QUBIT_REDUCTION) {
            match v.trim().parse() {
                Ok(enabled) => self.two_qubit_reduction = enabled,
                Err(e) => {
                    warn!(key = ENV_TWO_QUBIT_REDUCTION, value = %v, error = %e, "ignoring override");
                }
            }
        }
        if let Some(v) = lookup(ENV_Z2_REDUCTION) {
            match parse_z2_reduction(&v) {
                Ok(reduction) => self.z2symmetry_reduction = reduction,
                Err(e) => warn!(key = ENV_Z2_REDUCTION, value = %v, error = %e, "ignoring override"),
            }
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.two_qubit_reduction && !self.mapper.allows_two_qubit_reduction() {
            return Err(ConfigError::ValidationError(format!(
                "two-qubit reduction is not supported by the {} mapper",
                self.mapper
            )));
        }
        if let Z2Reduction::Sector(values) = &self.z2symmetry_reduction {
            if let Some(bad) = values.iter().find(|v| !matches!(v, 1 | -1)) {
                return Err(ConfigError::ValidationError(format!(
                    "sector values must be +1 or -1, got {bad}"
                )));
            }
        }
        Ok(())
    }

    /// True if either reduction is requested.
    pub fn reduces(&self) -> bool {
        self.two_qubit_reduction || self.z2symmetry_reduction != Z2Reduction::None
    }

    /// Build the configured mapper, wrapped in a [`QubitConverter`] when a
    /// reduction is requested.
    pub fn build(&self) -> Result<Arc<dyn QubitMapper>, ConfigError> {
        self.validate()?;
        let mapper = self.mapper.build();
        if !self.reduces() {
            return Ok(mapper);
        }
        Ok(Arc::new(
            QubitConverter::new(mapper)
                .with_two_qubit_reduction(self.two_qubit_reduction)
                .with_z2symmetry_reduction(self.z2symmetry_reduction.clone()),
        ))
    }
}

fn parse_z2_reduction(value: &str) -> Result<Z2Reduction, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "none" | "" => Ok(Z2Reduction::None),
        "auto" => Ok(Z2Reduction::Auto),
        list => list
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<i8>()
                    .map_err(|e| ConfigError::ParseError(format!("sector value '{v}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Z2Reduction::Sector),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert_eq!(config.mapper, MapperKind::JordanWigner);
        assert!(!config.two_qubit_reduction);
        assert_eq!(config.z2symmetry_reduction, Z2Reduction::None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_two_qubit_reduction_mapper() {
        let config = ConverterConfig {
            mapper: MapperKind::BravyiKitaev,
            two_qubit_reduction: true,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_validate_sector_values() {
        let config = ConverterConfig {
            z2symmetry_reduction: Z2Reduction::Sector(vec![1, 0]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_z2_reduction() {
        assert_eq!(parse_z2_reduction("Auto").unwrap(), Z2Reduction::Auto);
        assert_eq!(parse_z2_reduction("none").unwrap(), Z2Reduction::None);
        assert_eq!(
            parse_z2_reduction("1, -1").unwrap(),
            Z2Reduction::Sector(vec![1, -1])
        );
        assert!(parse_z2_reduction("up").is_err());
    }

    #[test]
    fn test_mapper_kind_from_str() {
        assert_eq!("bk".parse::<MapperKind>().unwrap(), MapperKind::BravyiKitaev);
        assert_eq!(
            "Jordan-Wigner".parse::<MapperKind>().unwrap(),
            MapperKind::JordanWigner
        );
        assert!("qubit".parse::<MapperKind>().is_err());
    }

    #[test]
    fn test_build_plain_and_reducing() {
        let plain = ConverterConfig::default().build().unwrap();
        assert!(!plain.allows_two_qubit_reduction());

        let reducing = ConverterConfig {
            mapper: MapperKind::Parity,
            two_qubit_reduction: true,
            ..Default::default()
        }
        .build()
        .unwrap();
        assert!(reducing.allows_two_qubit_reduction());
    }
}
