//! Configuration file support.
//!
//! Every field is optional; an empty file reproduces the default run over
//! `Unilever_AS.csv`, `Unilever_LSE.csv` and `EURGBP.csv` in the working
//! directory.

use crate::data::DataConfig;
use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default primary listing file (converted through FX when FX is used).
pub const DEFAULT_PRIMARY: &str = "Unilever_AS.csv";
/// Default secondary listing file.
pub const DEFAULT_SECONDARY: &str = "Unilever_LSE.csv";
/// Default FX rate file.
pub const DEFAULT_FX: &str = "EURGBP.csv";
/// Default chart output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "charts";

/// Complete configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareFileConfig {
    #[serde(default)]
    pub inputs: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Input files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSettings {
    /// Primary listing CSV.
    #[serde(default = "default_primary")]
    pub primary: PathBuf,
    /// Secondary listing CSV.
    #[serde(default = "default_secondary")]
    pub secondary: PathBuf,
    /// FX rate CSV.
    #[serde(default = "default_fx")]
    pub fx: PathBuf,
    /// Convert the primary listing through `fx`. When false both listings are
    /// compared in their own currencies and `fx` is not read.
    #[serde(default = "default_true")]
    pub convert: bool,
    /// Date format tried before the built-in ones.
    #[serde(default)]
    pub date_format: Option<String>,
}

fn default_primary() -> PathBuf { PathBuf::from(DEFAULT_PRIMARY) }
fn default_secondary() -> PathBuf { PathBuf::from(DEFAULT_SECONDARY) }
fn default_fx() -> PathBuf { PathBuf::from(DEFAULT_FX) }
fn default_true() -> bool { true }

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
            fx: default_fx(),
            convert: true,
            date_format: None,
        }
    }
}

/// Chart output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory SVG charts are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

fn default_output_dir() -> PathBuf { PathBuf::from(DEFAULT_OUTPUT_DIR) }

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

impl CompareFileConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check for settings that cannot produce a comparison.
    pub fn validate(&self) -> Result<()> {
        let inputs = &self.inputs;
        if inputs.primary.as_os_str().is_empty() || inputs.secondary.as_os_str().is_empty() {
            return Err(CompareError::ConfigError(
                "primary and secondary input paths must not be empty".to_string(),
            ));
        }
        if inputs.primary == inputs.secondary {
            return Err(CompareError::ConfigError(format!(
                "primary and secondary are the same file: {}",
                inputs.primary.display()
            )));
        }
        if inputs.convert && inputs.fx.as_os_str().is_empty() {
            return Err(CompareError::ConfigError(
                "fx path must not be empty; set convert = false to disable conversion"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// FX file to read, if conversion is enabled.
    pub fn fx_path(&self) -> Option<&Path> {
        self.inputs.convert.then_some(self.inputs.fx.as_path())
    }

    /// Loader settings derived from this configuration.
    pub fn data_config(&self) -> DataConfig {
        DataConfig {
            date_format: self.inputs.date_format.clone(),
            ..Default::default()
        }
    }

    /// Example configuration file content.
    pub fn example() -> String {
        format!(
            r#"# crosslist configuration
# All fields are optional. Paths are relative to the working directory.

[inputs]
# Primary listing; converted through the FX series when `convert` is true.
primary = "{DEFAULT_PRIMARY}"
# Secondary listing, already quoted in the target currency.
secondary = "{DEFAULT_SECONDARY}"
# FX rate (target currency per unit of the primary's currency).
fx = "{DEFAULT_FX}"
# Set to false to compare both listings in their own currencies.
convert = true
# Date format tried before the built-in ones (chrono syntax).
# date_format = "%d/%m/%Y"

[output]
# Directory the SVG charts are written to.
dir = "{DEFAULT_OUTPUT_DIR}"
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = CompareFileConfig::parse("").unwrap();
        assert_eq!(config.inputs.primary, PathBuf::from(DEFAULT_PRIMARY));
        assert_eq!(config.inputs.secondary, PathBuf::from(DEFAULT_SECONDARY));
        assert_eq!(config.fx_path(), Some(Path::new(DEFAULT_FX)));
        assert_eq!(config.output.dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_parses() {
        let config = CompareFileConfig::parse(&CompareFileConfig::example()).unwrap();
        assert!(config.inputs.convert);
        assert!(config.inputs.date_format.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
[inputs]
primary = "a.csv"
secondary = "b.csv"
date_format = "%d.%m.%Y"
"#;
        let config = CompareFileConfig::parse(toml).unwrap();
        assert_eq!(config.inputs.primary, PathBuf::from("a.csv"));
        assert_eq!(config.fx_path(), Some(Path::new(DEFAULT_FX)));
        assert_eq!(
            config.data_config().date_format.as_deref(),
            Some("%d.%m.%Y")
        );
    }

    #[test]
    fn test_conversion_disabled() {
        let config = CompareFileConfig::parse("[inputs]\nconvert = false\n").unwrap();
        assert!(config.fx_path().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_file_rejected() {
        let toml = r#"
[inputs]
primary = "a.csv"
secondary = "a.csv"
"#;
        let config = CompareFileConfig::parse(toml).unwrap();
        assert!(matches!(config.validate(), Err(CompareError::ConfigError(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let result = CompareFileConfig::parse("[inputs\nprimary = 1");
        assert!(matches!(result, Err(CompareError::TomlError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "[output]\ndir = \"out\"").unwrap();
        let config = CompareFileConfig::load(file.path()).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("out"));
    }
}
