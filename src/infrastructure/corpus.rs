//! Results-file and review-export (de)serialization
//!
//! Two JSON artifacts pass between the subcommands: the results file that
//! `generate` writes and `convert` reads, and the review export that an
//! annotation-review tool produces and `check` scores.

use crate::domain::scenario::{Locale, Scenario};
use crate::error::{DeidgenError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The effective generation parameters, recorded for reproducibility.
/// The API key is deliberately not a field here and never reaches disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub model: String,
    pub locale: Locale,
    pub n: usize,
    pub seed: u64,
    pub dry_run: bool,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub output: PathBuf,
    pub created: DateTime<Utc>,
}

/// The results file tying parameters, scenarios, prompts and completions
/// together. `scenarios`, `prompts` and `results` are index-aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsFile {
    pub parameters: GenerationParameters,
    pub scenarios: Vec<Scenario>,
    pub prompts: Vec<String>,
    pub results: Vec<String>,
    /// Added by a human pass that fixes malformed annotations; absent until
    /// such a pass happens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_results: Option<Vec<String>>,
}

impl ResultsFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|source| DeidgenError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string(self).map_err(|source| DeidgenError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, contents)?;
        Ok(())
    }

    /// The records of one section. The cleaned section is absent until a
    /// review pass adds it, which is an error worth a suggestion rather
    /// than an empty export.
    pub fn section(&self, section: Section) -> Result<&[String]> {
        match section {
            Section::Results => Ok(&self.results),
            Section::Cleaned => self
                .cleaned_results
                .as_deref()
                .ok_or_else(|| DeidgenError::MissingSection("cleaned_results".to_string())),
        }
    }
}

/// Which array of a results file an export reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    /// The human-corrected texts under `cleaned_results`.
    #[default]
    Cleaned,
    /// The raw completions under `results`.
    Results,
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cleaned" => Ok(Section::Cleaned),
            "results" => Ok(Section::Results),
            _ => Err(format!("Invalid section: '{}'", s)),
        }
    }
}

/// One task of a review export: the flattened JSON an annotation-review
/// tool produces after humans corrected the spans of one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTask {
    pub id: u64,
    /// The plain text shown to reviewers.
    pub text: String,
    /// Human reference regions; absent when the task has none.
    #[serde(default)]
    pub label: Vec<ReviewRegion>,
    /// The machine-tagged document the review started from.
    pub original_text: String,
}

/// A reference region with character offsets into [`ReviewTask::text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRegion {
    pub start: usize,
    pub end: usize,
    pub labels: Vec<String>,
}

pub fn load_review_tasks(path: &Path) -> Result<Vec<ReviewTask>> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|source| DeidgenError::Json {
        path: path.to_path_buf(),
        source,
    })
}
