//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "deidgen")]
#[command(about = "Synthetic de-identification corpus toolkit", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Print progress detail
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate synthetic tagged discharge summaries
    Generate {
        /// Number of records to generate
        #[arg(short, long, default_value_t = 10)]
        n: usize,

        /// Chat model to prompt (default: gpt-3.5-turbo)
        #[arg(long)]
        model: Option<String>,

        /// Language of the summaries: nb or en (default: nb)
        #[arg(long)]
        locale: Option<String>,

        /// RNG seed for scenario sampling
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Build scenarios and prompts without calling the API
        #[arg(long)]
        dry_run: bool,

        /// API key (default: the OPENAI_API_KEY environment variable)
        #[arg(long)]
        api_key: Option<String>,

        /// Results file to write
        #[arg(short, long, default_value = "results.json")]
        output: PathBuf,

        /// Directory with the vocabulary files (default: vocabularies)
        #[arg(long)]
        vocabularies: Option<PathBuf>,

        /// Sampling temperature (default: 1.0)
        #[arg(long)]
        temperature: Option<f64>,

        /// Nucleus sampling parameter (default: 1.0)
        #[arg(long)]
        top_p: Option<f64>,

        /// Completion length limit (default: 1024)
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Chat-completion endpoint (default: https://api.openai.com/v1)
        #[arg(long)]
        base_url: Option<String>,

        /// Config file (default: deidgen.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Export a results file for training or review
    Convert {
        /// Results file to read
        #[arg(short, long, default_value = "results.json")]
        input: PathBuf,

        /// Output file, or folder for the text format
        #[arg(short, long, default_value = "results.csv")]
        output: PathBuf,

        /// Export format (csv, xml, labelstudio, spans, text)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Results-file section to export (cleaned, results)
        #[arg(short, long, default_value = "cleaned")]
        section: String,
    },

    /// Score reviewed annotations against the generated tags
    Check {
        /// Review export (JSON) to score
        #[arg(short, long)]
        annotations: PathBuf,

        /// Collapse all labels into one before scoring
        #[arg(long)]
        phi_only: bool,

        /// Trim trailing 'år'/'år gammel' from spans before comparing
        #[arg(long)]
        clean_ages: bool,
    },

    /// Split a corpus file into training and holdout files
    Split {
        /// Corpus file to split, one record per line
        #[arg(short, long)]
        input: PathBuf,

        /// Training output file
        #[arg(long)]
        training: PathBuf,

        /// Holdout output file
        #[arg(long)]
        holdout: PathBuf,

        /// RNG seed; the split is random when omitted
        #[arg(long)]
        seed: Option<u64>,

        /// Fraction of lines routed to the holdout file
        #[arg(long, default_value_t = 0.1)]
        holdout_size: f64,
    },

    /// Build the diagnosis vocabulary from an ICD-10 code file
    FilterCodes {
        /// ICD-10-CM code file
        #[arg(
            short,
            long,
            default_value = "vocabularies/icd10cm-codes-April-1-2023.txt"
        )]
        input: PathBuf,

        /// Vocabulary file to write
        #[arg(short, long, default_value = "vocabularies/en_diagnoses.csv")]
        output: PathBuf,
    },
}
