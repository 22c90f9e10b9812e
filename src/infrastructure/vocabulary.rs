//! Vocabulary files for scenario sampling
//!
//! A vocabulary is a UTF-8 text file with one entry per line. Entries are
//! loaded with surrounding whitespace trimmed; blank lines are dropped so a
//! trailing newline never turns into an empty name.

use crate::error::{DeidgenError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory searched for the vocabulary files when none is configured.
pub const DEFAULT_VOCABULARY_DIR: &str = "vocabularies";

pub const GIVEN_NAMES_FILE: &str = "nb_given_names.csv";
pub const FAMILY_NAMES_FILE: &str = "nb_family_names.csv";
pub const DIAGNOSES_FILE: &str = "en_diagnoses.csv";
pub const HEALTHCARE_UNITS_FILE: &str = "nb_healthcare_units.csv";

/// A loaded vocabulary file.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    path: PathBuf,
    entries: Vec<String>,
}

impl Vocabulary {
    /// Load a vocabulary from a file, one entry per line.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| DeidgenError::VocabularyRead {
            path: path.to_path_buf(),
            source,
        })?;

        let entries = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        Ok(Vocabulary {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sample `n` distinct entries (distinct line positions; duplicate lines
    /// in the file can still repeat). Errors when the file has fewer than
    /// `n` entries.
    pub fn sample_unique(&self, rng: &mut impl Rng, n: usize) -> Result<Vec<String>> {
        if n > self.entries.len() {
            return Err(DeidgenError::VocabularyExhausted {
                path: self.path.clone(),
                available: self.entries.len(),
                requested: n,
            });
        }

        Ok(rand::seq::index::sample(rng, self.entries.len(), n)
            .iter()
            .map(|i| self.entries[i].clone())
            .collect())
    }

    /// Sample `n` entries with replacement. Errors only when the file has no
    /// entries at all.
    pub fn sample_with_replacement(&self, rng: &mut impl Rng, n: usize) -> Result<Vec<String>> {
        if self.entries.is_empty() && n > 0 {
            return Err(DeidgenError::VocabularyExhausted {
                path: self.path.clone(),
                available: 0,
                requested: n,
            });
        }

        Ok((0..n)
            .filter_map(|_| self.entries.choose(rng).cloned())
            .collect())
    }
}

/// The fixed set of vocabulary files scenario generation samples from.
#[derive(Debug, Clone)]
pub struct ScenarioVocabularies {
    pub given_names: Vocabulary,
    pub family_names: Vocabulary,
    pub diagnoses: Vocabulary,
    pub healthcare_units: Vocabulary,
}

impl ScenarioVocabularies {
    /// Load the four scenario vocabularies from a directory. The filenames
    /// are fixed; pointing at a different directory is the supported way to
    /// swap vocabularies out.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Ok(ScenarioVocabularies {
            given_names: Vocabulary::load(&dir.join(GIVEN_NAMES_FILE))?,
            family_names: Vocabulary::load(&dir.join(FAMILY_NAMES_FILE))?,
            diagnoses: Vocabulary::load(&dir.join(DIAGNOSES_FILE))?,
            healthcare_units: Vocabulary::load(&dir.join(HEALTHCARE_UNITS_FILE))?,
        })
    }
}
