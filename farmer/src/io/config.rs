//! Setup configuration read from `farmer.toml` in the working directory.

use std::fs;
use std::path::{Component, Path};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::debug;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "farmer.toml";

/// Constants the fixed step list is parameterized by.
///
/// Missing fields default to the stock Chia setup, so an absent or empty file
/// reproduces the standard behavior.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SetupConfig {
    pub repository: RepositoryConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Git URL of the project to clone.
    pub url: String,
    /// Subdirectory of the working directory to clone into.
    pub dir: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: "https://github.com/Chia-Network/chia-blockchain.git".to_string(),
            dir: "chia-blockchain".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SystemConfig {
    /// Prefix package manager calls with `sudo`.
    pub sudo: bool,
    /// OS packages installed with `apt-get install -y`.
    pub packages: Vec<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            sudo: true,
            packages: vec![
                "git".to_string(),
                "python3-venv".to_string(),
                "python3-pip".to_string(),
            ],
        }
    }
}

impl SetupConfig {
    pub fn validate(&self) -> Result<()> {
        if self.repository.url.trim().is_empty() {
            return Err(anyhow!("repository.url must not be empty"));
        }
        let mut components = Path::new(&self.repository.dir).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => {
                return Err(anyhow!(
                    "repository.dir must be a single directory name, got '{}'",
                    self.repository.dir
                ));
            }
        }
        if self.system.packages.is_empty() {
            return Err(anyhow!("system.packages must be a non-empty array"));
        }
        if self.system.packages.iter().any(|p| p.trim().is_empty()) {
            return Err(anyhow!("system.packages must not contain blank entries"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SetupConfig::default()`.
pub fn load_config(path: &Path) -> Result<SetupConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = SetupConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SetupConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join(CONFIG_FILE)).expect("load");
        assert_eq!(cfg, SetupConfig::default());
        assert_eq!(cfg.repository.dir, "chia-blockchain");
        assert!(cfg.system.sudo);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[system]\nsudo = false\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert!(!cfg.system.sudo);
        assert_eq!(cfg.system.packages, SystemConfig::default().packages);
        assert_eq!(cfg.repository, RepositoryConfig::default());
    }

    #[test]
    fn rejects_nested_clone_dir() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[repository]\ndir = \"../elsewhere\"\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(format!("{err:#}").contains("single directory name"));
    }

    #[test]
    fn rejects_empty_package_list() {
        let mut cfg = SetupConfig::default();
        cfg.system.packages.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join(CONFIG_FILE);
        fs::write(&path, "[repository\n").expect("write");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
