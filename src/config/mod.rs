//! Configuration du désassembleur

use serde::{Deserialize, Serialize};
use anyhow::Result;
use std::fs;

use crate::disasm::BoundaryMode;
use crate::opcode::SchemaVersion;

/// Configuration principale du désassembleur
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisConfig {
    #[serde(default)]
    pub decode: DecodeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Jeu d'instructions de la VM qui a produit le code
    #[serde(default)]
    pub schema_version: SchemaVersion,
    /// "length" ou "terminator"
    #[serde(default)]
    pub boundary: BoundaryMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filtre par défaut d'env_logger, remplacé par RUST_LOG s'il est défini
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl DisConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DisConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn load_or_default(path: &str) -> Self {
        Self::load_from_file(path).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("dis.toml");
        let path = path.to_string_lossy().to_string();

        let mut config = DisConfig::default();
        config.decode.schema_version = SchemaVersion::Legacy;
        config.decode.boundary = BoundaryMode::Terminator;
        config.save_to_file(&path)?;

        let loaded = DisConfig::load_from_file(&path)?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let config: DisConfig = toml::from_str("[decode]\nschema_version = \"legacy\"\n")?;
        assert_eq!(config.decode.schema_version, SchemaVersion::Legacy);
        assert_eq!(config.decode.boundary, BoundaryMode::Length);
        assert_eq!(config.logging.level, "warn");
        Ok(())
    }

    #[test]
    fn test_load_or_default_reads_existing_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("dis-rust.toml");
        fs::write(&path, "[decode]\nboundary = \"terminator\"\n")?;

        let config = DisConfig::load_or_default(&path.to_string_lossy());
        assert_eq!(config.decode.boundary, BoundaryMode::Terminator);
        assert_eq!(config.decode.schema_version, SchemaVersion::Current);
        Ok(())
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = DisConfig::load_or_default("/nonexistent/dis.toml");
        assert_eq!(config, DisConfig::default());
    }
}
