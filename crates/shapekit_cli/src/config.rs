//! CLI configuration file (`shapekit.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shapekit_schema::Dialect;
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "shapekit.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Extra schema definition directories or files.
    #[serde(default)]
    pub schema_dirs: Vec<PathBuf>,

    /// Dialect used when neither the command line nor the document picks one.
    #[serde(default)]
    pub default_dialect: Option<Dialect>,
}

impl CliConfig {
    /// Load the configuration.
    ///
    /// An explicit path must exist. Without one, `shapekit.toml` in the
    /// current directory is used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Config file not found: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!("Loaded config from {:?}", path);

        Ok(config.relative_to(path.parent().unwrap_or(Path::new("."))))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve relative schema directories against `base`.
    fn relative_to(mut self, base: &Path) -> Self {
        self.schema_dirs = self
            .schema_dirs
            .into_iter()
            .map(|dir| if dir.is_relative() { base.join(dir) } else { dir })
            .collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_config() {
        let config = CliConfig::from_toml(
            r#"
schema_dirs = ["schemas", "/opt/shapekit/schemas"]
default_dialect = "terraform"
"#,
        )
        .unwrap();

        assert_eq!(config.schema_dirs.len(), 2);
        assert_eq!(config.default_dialect, Some(Dialect::Terraform));
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(CliConfig::from_toml("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_load_resolves_relative_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shapekit.toml");
        fs::write(&path, "schema_dirs = [\"schemas\"]\n").unwrap();

        let config = CliConfig::load(Some(&path)).unwrap();
        assert_eq!(config.schema_dirs, vec![dir.path().join("schemas")]);
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempdir().unwrap();
        let err = CliConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
