//! Train/holdout corpus split use case
//!
//! Splits a line-oriented corpus file into a training file and a holdout
//! file. Lines keep their relative order and their exact bytes; only the
//! assignment is random.

use crate::error::{DeidgenError, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

/// Options for the split
#[derive(Debug, Clone)]
pub struct SplitOptions {
    /// Corpus file to split, one record per line.
    pub input: PathBuf,
    /// Training output file.
    pub training: PathBuf,
    /// Holdout output file.
    pub holdout: PathBuf,
    /// RNG seed; a random split when unset.
    pub seed: Option<u64>,
    /// Fraction of lines routed to the holdout file, in `[0, 1]`.
    pub holdout_size: f64,
    pub verbose: bool,
}

/// Execute the split. Reports the line counts and output paths.
pub fn execute(options: &SplitOptions) -> Result<()> {
    // 1. Validate the fraction before touching any file.
    if !(0.0..=1.0).contains(&options.holdout_size) {
        return Err(DeidgenError::InvalidArgument(format!(
            "holdout-size must be between 0 and 1, got {}",
            options.holdout_size
        )));
    }

    // 2. Read the corpus. split_inclusive keeps each line's newline, so
    //    the outputs concatenate back to the input bytes.
    let contents = fs::read_to_string(&options.input)?;
    let lines: Vec<&str> = contents.split_inclusive('\n').collect();
    let total = lines.len();
    let holdout_count = (total as f64 * options.holdout_size) as usize;

    if options.verbose {
        println!(
            "Splitting {} lines: {} to training, {} to holdout",
            total,
            total - holdout_count,
            holdout_count
        );
    }

    // 3. Draw the holdout indices.
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut in_holdout = vec![false; total];
    for index in rand::seq::index::sample(&mut rng, total, holdout_count) {
        in_holdout[index] = true;
    }

    // 4. Route every line, in order.
    let mut training = String::new();
    let mut holdout = String::new();
    for (i, line) in lines.iter().enumerate() {
        if in_holdout[i] {
            holdout.push_str(line);
        } else {
            training.push_str(line);
        }
    }

    fs::write(&options.training, &training)?;
    fs::write(&options.holdout, &holdout)?;

    println!(
        "Wrote {} training lines to {}",
        total - holdout_count,
        options.training.display()
    );
    println!(
        "Wrote {} holdout lines to {}",
        holdout_count,
        options.holdout.display()
    );
    Ok(())
}
