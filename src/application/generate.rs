//! Corpus generation use case
//!
//! Orchestrates the full workflow: resolve settings, sample vocabularies,
//! build scenarios and prompts, complete them against the API (or not, on a
//! dry run), and write the results file.

use crate::domain::prompt::format_scenario;
use crate::domain::scenario::{Locale, Scenario};
use crate::error::{DeidgenError, Result};
use crate::infrastructure::completion::{
    CompletionClient, OpenAiClient, API_KEY_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TOP_P,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::corpus::{GenerationParameters, ResultsFile};
use crate::infrastructure::vocabulary::{ScenarioVocabularies, DEFAULT_VOCABULARY_DIR};
use chrono::{Local, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use std::str::FromStr;

/// Options for generation. Config-backed knobs are `None` when the flag was
/// not given, so the config file and built-in defaults can fill them in.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Number of records to generate.
    pub n: usize,
    pub model: Option<String>,
    /// Language of the summaries (`nb` or `en`).
    pub locale: Option<String>,
    /// Seed for the deterministic RNG.
    pub seed: u64,
    /// Do not issue any completion requests.
    pub dry_run: bool,
    /// API key; the `OPENAI_API_KEY` environment variable is the fallback.
    pub api_key: Option<String>,
    /// Results file to write.
    pub output: PathBuf,
    /// Directory holding the vocabulary files.
    pub vocabularies: Option<PathBuf>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub base_url: Option<String>,
    /// Explicit config file path (`deidgen.toml` in the working directory
    /// otherwise).
    pub config: Option<PathBuf>,
    pub verbose: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            n: 10,
            model: None,
            locale: None,
            seed: 42,
            dry_run: false,
            api_key: None,
            output: PathBuf::from("results.json"),
            vocabularies: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
            base_url: None,
            config: None,
            verbose: false,
        }
    }
}

/// The generation settings after flag > config file > default resolution.
#[derive(Debug, Clone, PartialEq)]
struct EffectiveSettings {
    model: String,
    locale: Locale,
    base_url: String,
    vocabularies: PathBuf,
    temperature: f64,
    top_p: f64,
    max_tokens: u32,
}

fn resolve_settings(options: &GenerateOptions, config: &Config) -> Result<EffectiveSettings> {
    let defaults = &config.generation;

    let locale = match options.locale.as_deref().or(defaults.locale.as_deref()) {
        Some(name) => Locale::from_str(name).map_err(DeidgenError::InvalidArgument)?,
        None => Locale::default(),
    };

    Ok(EffectiveSettings {
        model: options
            .model
            .clone()
            .or_else(|| defaults.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        locale,
        base_url: options
            .base_url
            .clone()
            .or_else(|| defaults.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        vocabularies: options
            .vocabularies
            .clone()
            .or_else(|| defaults.vocabularies.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_VOCABULARY_DIR)),
        temperature: options
            .temperature
            .or(defaults.temperature)
            .unwrap_or(DEFAULT_TEMPERATURE),
        top_p: options.top_p.or(defaults.top_p).unwrap_or(DEFAULT_TOP_P),
        max_tokens: options
            .max_tokens
            .or(defaults.max_tokens)
            .unwrap_or(DEFAULT_MAX_TOKENS),
    })
}

/// Execute the generation. Writes the results file and reports its path.
pub fn execute(options: &GenerateOptions) -> Result<()> {
    // 1. Effective settings: flags over the config file over built-in
    //    defaults.
    let config = Config::load(options.config.as_deref())?;
    let settings = resolve_settings(options, &config)?;

    // 2. Resolve the API key. A missing key downgrades to a dry run instead
    //    of failing; the scenarios and prompts are still worth writing.
    let has_key = options.api_key.is_some() || std::env::var(API_KEY_ENV_VAR).is_ok();
    let mut dry_run = options.dry_run;
    if !dry_run && !has_key {
        eprintln!("Warning: no API key found, running in dry-run mode.");
        dry_run = true;
    }
    if dry_run && options.verbose {
        println!("Dry run: no completion requests will be issued.");
    }

    // 3. Seed the RNG and load the vocabularies.
    let mut rng = StdRng::seed_from_u64(options.seed);
    let vocabularies = ScenarioVocabularies::load_from_dir(&settings.vocabularies)?;

    // 4. Build scenarios and format them as prompts.
    if options.verbose {
        println!("Creating {} scenarios.", options.n);
    }
    let scenarios = build_scenarios(&mut rng, &vocabularies, options.n)?;
    let prompts: Vec<String> = scenarios.iter().map(format_scenario).collect();

    // 5. Complete every prompt in order, or leave the results empty.
    let results = if dry_run {
        vec![String::new(); options.n]
    } else {
        let mut builder = OpenAiClient::builder()
            .base_url(settings.base_url.clone())
            .model(settings.model.clone())
            .temperature(settings.temperature)
            .top_p(settings.top_p)
            .max_tokens(settings.max_tokens);
        if let Some(key) = &options.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build()?;
        complete_all(&client, &prompts, options.verbose)?
    };

    // 6. Write the results file.
    let results_file = ResultsFile {
        parameters: GenerationParameters {
            model: settings.model,
            locale: settings.locale,
            n: options.n,
            seed: options.seed,
            dry_run,
            temperature: settings.temperature,
            top_p: settings.top_p,
            max_tokens: settings.max_tokens,
            output: options.output.clone(),
            created: Utc::now(),
        },
        scenarios,
        prompts,
        results,
        cleaned_results: None,
    };
    results_file.save(&options.output)?;

    println!(
        "Wrote {} results to {}",
        options.n,
        options.output.display()
    );
    Ok(())
}

/// Sample the vocabularies and fill in the remaining scenario fields from
/// the RNG. Names and diagnoses are sampled without replacement so the
/// corpus never repeats a patient; healthcare units may repeat.
fn build_scenarios(
    rng: &mut impl Rng,
    vocabularies: &ScenarioVocabularies,
    n: usize,
) -> Result<Vec<Scenario>> {
    let given_names = vocabularies.given_names.sample_unique(rng, n)?;
    let family_names = vocabularies.family_names.sample_unique(rng, n)?;
    let diagnoses = vocabularies.diagnoses.sample_unique(rng, n)?;
    let healthcare_units = vocabularies.healthcare_units.sample_with_replacement(rng, n)?;

    let today = Local::now().date_naive();
    let mut scenarios = Vec::with_capacity(n);
    for (((given_name, family_name), diagnosis), health_care_unit) in given_names
        .into_iter()
        .zip(family_names)
        .zip(diagnoses)
        .zip(healthcare_units)
    {
        scenarios.push(Scenario::generate(
            rng,
            today,
            given_name,
            family_name,
            diagnosis,
            health_care_unit,
        ));
    }
    Ok(scenarios)
}

/// Complete every prompt sequentially. The results must stay index-aligned
/// with the prompts, so there is no parallel fan-out.
fn complete_all(
    client: &dyn CompletionClient,
    prompts: &[String],
    verbose: bool,
) -> Result<Vec<String>> {
    let mut results = Vec::with_capacity(prompts.len());
    for (i, prompt) in prompts.iter().enumerate() {
        if verbose {
            println!("Completing prompt {} of {}", i + 1, prompts.len());
        }
        results.push(client.complete(prompt)?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::completion::CompletionError;
    use crate::infrastructure::config::GenerationDefaults;
    use crate::infrastructure::vocabulary::{
        DIAGNOSES_FILE, FAMILY_NAMES_FILE, GIVEN_NAMES_FILE, HEALTHCARE_UNITS_FILE,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_vocabularies(dir: &Path) {
        fs::write(
            dir.join(GIVEN_NAMES_FILE),
            "Kari\nOla\nÅse\nPer\nIda\nNora\n",
        )
        .unwrap();
        fs::write(
            dir.join(FAMILY_NAMES_FILE),
            "Nordmann\nHansen\nVik\nBerg\nDahl\nLund\n",
        )
        .unwrap();
        fs::write(
            dir.join(DIAGNOSES_FILE),
            "A150 Tuberculosis of lung\nJ18 Pneumonia\nI21 Myocardial infarction\n\
             E10 Type 1 diabetes\nK35 Acute appendicitis\nG40 Epilepsy\n",
        )
        .unwrap();
        fs::write(
            dir.join(HEALTHCARE_UNITS_FILE),
            "Oslo universitetssykehus\nHaukeland universitetssjukehus\n",
        )
        .unwrap();
    }

    #[test]
    fn test_resolve_settings_built_in_defaults() {
        let options = GenerateOptions::default();
        let settings = resolve_settings(&options, &Config::default()).unwrap();

        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.locale, Locale::Nb);
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.vocabularies, PathBuf::from(DEFAULT_VOCABULARY_DIR));
        assert_eq!(settings.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn test_resolve_settings_config_beats_defaults() {
        let config = Config {
            generation: GenerationDefaults {
                model: Some("gpt-4".to_string()),
                locale: Some("en".to_string()),
                temperature: Some(0.2),
                ..GenerationDefaults::default()
            },
        };

        let settings = resolve_settings(&GenerateOptions::default(), &config).unwrap();
        assert_eq!(settings.model, "gpt-4");
        assert_eq!(settings.locale, Locale::En);
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.top_p, DEFAULT_TOP_P);
    }

    #[test]
    fn test_resolve_settings_flags_beat_config() {
        let config = Config {
            generation: GenerationDefaults {
                model: Some("config-model".to_string()),
                vocabularies: Some(PathBuf::from("config-vocabularies")),
                ..GenerationDefaults::default()
            },
        };
        let options = GenerateOptions {
            model: Some("flag-model".to_string()),
            vocabularies: Some(PathBuf::from("flag-vocabularies")),
            ..GenerateOptions::default()
        };

        let settings = resolve_settings(&options, &config).unwrap();
        assert_eq!(settings.model, "flag-model");
        assert_eq!(settings.vocabularies, PathBuf::from("flag-vocabularies"));
    }

    #[test]
    fn test_resolve_settings_rejects_unknown_locale() {
        let options = GenerateOptions {
            locale: Some("sv".to_string()),
            ..GenerateOptions::default()
        };

        match resolve_settings(&options, &Config::default()) {
            Err(DeidgenError::InvalidArgument(msg)) => assert!(msg.contains("locale")),
            other => panic!("Expected InvalidArgument error, got {:?}", other),
        }
    }

    #[test]
    fn test_build_scenarios_count_and_determinism() {
        let temp = TempDir::new().unwrap();
        write_vocabularies(temp.path());
        let vocabularies = ScenarioVocabularies::load_from_dir(temp.path()).unwrap();

        let build = || {
            let mut rng = StdRng::seed_from_u64(9);
            build_scenarios(&mut rng, &vocabularies, 5).unwrap()
        };

        let scenarios = build();
        assert_eq!(scenarios.len(), 5);
        assert_eq!(scenarios, build());

        // Without-replacement sampling: no repeated patient names.
        let mut names: Vec<&str> = scenarios.iter().map(|s| s.given_name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 5);
    }

    #[test]
    fn test_build_scenarios_vocabulary_too_small() {
        let temp = TempDir::new().unwrap();
        write_vocabularies(temp.path());
        let vocabularies = ScenarioVocabularies::load_from_dir(temp.path()).unwrap();

        let mut rng = StdRng::seed_from_u64(9);
        let result = build_scenarios(&mut rng, &vocabularies, 100);
        assert!(matches!(
            result,
            Err(DeidgenError::VocabularyExhausted { .. })
        ));
    }

    struct EchoClient;

    impl CompletionClient for EchoClient {
        fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionError> {
            Ok(format!("note for {}", prompt))
        }
    }

    struct FailingClient;

    impl CompletionClient for FailingClient {
        fn complete(&self, _prompt: &str) -> std::result::Result<String, CompletionError> {
            Err(CompletionError::Api {
                message: "quota exceeded".to_string(),
            })
        }
    }

    #[test]
    fn test_complete_all_preserves_prompt_order() {
        let prompts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = complete_all(&EchoClient, &prompts, false).unwrap();
        assert_eq!(results, vec!["note for a", "note for b", "note for c"]);
    }

    #[test]
    fn test_complete_all_propagates_errors() {
        let prompts = vec!["a".to_string()];
        let result = complete_all(&FailingClient, &prompts, false);
        assert!(matches!(result, Err(DeidgenError::Completion(_))));
    }

    #[test]
    fn test_execute_dry_run_writes_results_file() {
        let temp = TempDir::new().unwrap();
        write_vocabularies(temp.path());
        let output = temp.path().join("results.json");

        let options = GenerateOptions {
            n: 3,
            seed: 7,
            dry_run: true,
            output: output.clone(),
            vocabularies: Some(temp.path().to_path_buf()),
            ..GenerateOptions::default()
        };
        execute(&options).unwrap();

        let results = ResultsFile::load(&output).unwrap();
        assert_eq!(results.scenarios.len(), 3);
        assert_eq!(results.prompts.len(), 3);
        assert_eq!(results.results, vec!["", "", ""]);
        assert!(results.parameters.dry_run);
        assert_eq!(results.parameters.seed, 7);
        assert!(results.cleaned_results.is_none());
    }

    #[test]
    fn test_execute_same_seed_same_scenarios() {
        let temp = TempDir::new().unwrap();
        write_vocabularies(temp.path());

        let build = |name: &str| {
            let output = temp.path().join(name);
            let options = GenerateOptions {
                n: 4,
                seed: 11,
                dry_run: true,
                output: output.clone(),
                vocabularies: Some(temp.path().to_path_buf()),
                ..GenerateOptions::default()
            };
            execute(&options).unwrap();
            ResultsFile::load(&output).unwrap()
        };

        let first = build("a.json");
        let second = build("b.json");
        assert_eq!(first.scenarios, second.scenarios);
        assert_eq!(first.prompts, second.prompts);
    }
}
