//! Configuration file for generation defaults
//!
//! An optional `deidgen.toml` in the working directory (or a path passed
//! with `--config`) can preset the generation knobs. Precedence is always
//! command-line flag, then config file, then built-in default. The API key
//! is deliberately not a config key; keys live in the environment or on the
//! command line only.

use crate::error::{DeidgenError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "deidgen.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationDefaults,
}

/// The `[generation]` table. Every key is optional; unset keys fall back
/// to the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationDefaults {
    pub model: Option<String>,
    pub locale: Option<String>,
    pub base_url: Option<String>,
    pub vocabularies: Option<PathBuf>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl Config {
    /// Load the configuration. An explicitly given path must exist; without
    /// one, `deidgen.toml` in the working directory is used when present
    /// and the defaults apply when it is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(DeidgenError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_from_file(path)
            }
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load_from_file(default_path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            DeidgenError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
