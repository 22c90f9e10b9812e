//! Diagnosis vocabulary builder
//!
//! Filters a flat ICD-10-CM code file down to diagnoses that read
//! naturally in a discharge summary, and writes them as a vocabulary
//! file for generation.

use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Options for the code filter
#[derive(Debug, Clone)]
pub struct FilterCodesOptions {
    /// ICD-10-CM code file, one `CODE description` per line.
    pub input: PathBuf,
    /// Vocabulary file to write.
    pub output: PathBuf,
    pub verbose: bool,
}

/// Execute the filter. Reports how many codes were kept.
pub fn execute(options: &FilterCodesOptions) -> Result<()> {
    let contents = fs::read_to_string(&options.input)?;

    let mut entries = BTreeSet::new();
    let mut total = 0usize;
    let mut skipped = 0usize;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        total += 1;
        let (code, name) = match line.split_once(char::is_whitespace) {
            Some(parts) => parts,
            None => {
                skipped += 1;
                continue;
            }
        };
        let name = name.trim();
        if !include_code(code, name) {
            continue;
        }
        entries.insert(format!("{} {}", code, clean_name(name)));
    }

    if options.verbose && skipped > 0 {
        println!("Skipped {} lines without a code and a description", skipped);
    }

    let mut rendered = String::new();
    for entry in &entries {
        rendered.push_str(entry);
        rendered.push('\n');
    }
    if let Some(parent) = options.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&options.output, rendered)?;

    println!(
        "Kept {} of {} codes; wrote {}",
        entries.len(),
        total,
        options.output.display()
    );
    Ok(())
}

/// Whether a code belongs in the vocabulary. Mental-health (F) and
/// non-diagnosis chapters (Z, Y, U) are dropped, as are descriptions that
/// are catch-alls rather than conditions.
fn include_code(code: &str, name: &str) -> bool {
    const EXCLUDED_PHRASES: [&str; 4] = ["personal history of", "status", "unspecified", "other"];

    if matches!(code.chars().next(), Some('F' | 'Z' | 'Y' | 'U')) {
        return false;
    }
    let lowered = name.to_lowercase();
    !EXCLUDED_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// Descriptions often trail off into subtypes after a comma; keep the
/// readable head.
fn clean_name(name: &str) -> &str {
    match name.split_once(',') {
        Some((head, _)) => head,
        None => name,
    }
}
