//! Error types for deidgen

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the deidgen application
#[derive(Debug, Error)]
pub enum DeidgenError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Results file has no '{0}' section")]
    MissingSection(String),

    #[error("Cannot read vocabulary file {}: {}", path.display(), source)]
    VocabularyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Vocabulary file {} only has {} entries but {} unique samples were requested", path.display(), available, requested)]
    VocabularyExhausted {
        path: PathBuf,
        available: usize,
        requested: usize,
    },

    #[error("Invalid JSON in {}: {}", path.display(), source)]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Completion error: {0}")]
    Completion(#[from] crate::infrastructure::completion::CompletionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DeidgenError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            DeidgenError::InvalidArgument(_) => 2,
            DeidgenError::Completion(_) => 3,
            DeidgenError::MissingSection(_)
            | DeidgenError::VocabularyRead { .. }
            | DeidgenError::VocabularyExhausted { .. }
            | DeidgenError::Json { .. } => 4,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            DeidgenError::MissingSection(section) => {
                format!(
                    "Results file has no '{}' section\n\n\
                    Suggestions:\n\
                    • Pass --section results to use the raw completions\n\
                    • Add a 'cleaned_results' array to the file after reviewing the annotations",
                    section
                )
            }
            DeidgenError::VocabularyExhausted {
                path,
                available,
                requested,
            } => {
                format!(
                    "Vocabulary file {} only has {} entries but {} unique samples were requested\n\n\
                    Suggestions:\n\
                    • Lower --n to at most {}\n\
                    • Extend the vocabulary file with more entries",
                    path.display(),
                    available,
                    requested,
                    available
                )
            }
            DeidgenError::VocabularyRead { path, source } => {
                format!(
                    "Cannot read vocabulary file {}: {}\n\n\
                    Suggestions:\n\
                    • Point --vocabularies at the directory holding the vocabulary files\n\
                    • Run 'deidgen filter-codes' to build the diagnosis vocabulary",
                    path.display(),
                    source
                )
            }
            DeidgenError::Completion(completion) => {
                if completion.is_auth_error() {
                    format!(
                        "Completion error: {}\n\n\
                        Suggestions:\n\
                        • Pass the key with --api-key\n\
                        • Set the OPENAI_API_KEY environment variable\n\
                        • Use --dry-run to generate prompts without completions",
                        completion
                    )
                } else {
                    self.to_string()
                }
            }
            DeidgenError::InvalidArgument(msg) => {
                if msg.contains("format") {
                    format!(
                        "Invalid argument: {}\n\n\
                        Valid formats: csv, xml, labelstudio, spans, text\n\
                        Example: deidgen convert --format labelstudio",
                        msg
                    )
                } else if msg.contains("section") {
                    format!(
                        "Invalid argument: {}\n\n\
                        Valid sections: cleaned, results\n\
                        Example: deidgen convert --section results",
                        msg
                    )
                } else if msg.contains("locale") {
                    format!(
                        "Invalid argument: {}\n\n\
                        Valid locales: nb, en\n\
                        Example: deidgen generate --locale nb",
                        msg
                    )
                } else {
                    format!("Invalid argument: {}", msg)
                }
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using DeidgenError
pub type Result<T> = std::result::Result<T, DeidgenError>;
