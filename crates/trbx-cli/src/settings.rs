use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File picked up from the working directory when `--config` is absent.
pub const SETTINGS_FILE: &str = "trbx.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),
}

/// Defaults shared by all commands; command-line flags take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub run_dir: PathBuf,
    pub seed: u64,
    pub n_samples: usize,
    pub smoothing: f64,
    pub divergence_threshold: f64,
    pub max_examples: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            run_dir: PathBuf::from("runs"),
            seed: 42,
            n_samples: 100,
            smoothing: 1.0,
            divergence_threshold: 0.2,
            max_examples: 20,
        }
    }
}

/// Load settings from `explicit`, else from `trbx.toml` if present, else defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    match explicit {
        Some(path) if !path.exists() => Err(SettingsError::NotFound(path.to_path_buf())),
        Some(path) => read_settings(path),
        None => {
            let path = Path::new(SETTINGS_FILE);
            if path.exists() {
                read_settings(path)
            } else {
                Ok(Settings::default())
            }
        }
    }
}

fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str("seed = 7\nrun_dir = \"out\"\n").expect("parse");
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.run_dir, PathBuf::from("out"));
        assert_eq!(settings.n_samples, 100);
        assert_eq!(settings.divergence_threshold, 0.2);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Settings>("samples = 5\n").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join(format!("trbx_{}.toml", uuid::Uuid::new_v4()));
        assert!(matches!(
            load_settings(Some(&path)),
            Err(SettingsError::NotFound(_))
        ));
    }
}
