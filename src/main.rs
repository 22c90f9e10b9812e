use clap::Parser;
use deidgen::application::{check, convert, filter_codes, generate, split};
use deidgen::application::{
    CheckOptions, ConvertOptions, ExportFormat, FilterCodesOptions, GenerateOptions, SplitOptions,
};
use deidgen::cli::{format_score_report, Cli, Commands};
use deidgen::error::DeidgenError;
use deidgen::infrastructure::Section;
use std::str::FromStr;

fn main() {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<(), DeidgenError> {
    let verbose = cli.verbose;

    match cli.command {
        Commands::Generate {
            n,
            model,
            locale,
            seed,
            dry_run,
            api_key,
            output,
            vocabularies,
            temperature,
            top_p,
            max_tokens,
            base_url,
            config,
        } => generate::execute(&GenerateOptions {
            n,
            model,
            locale,
            seed,
            dry_run,
            api_key,
            output,
            vocabularies,
            temperature,
            top_p,
            max_tokens,
            base_url,
            config,
            verbose,
        }),
        Commands::Convert {
            input,
            output,
            format,
            section,
        } => {
            // Parse format and section strings to enums
            let format =
                ExportFormat::from_str(&format).map_err(DeidgenError::InvalidArgument)?;
            let section = Section::from_str(&section).map_err(DeidgenError::InvalidArgument)?;

            convert::execute(&ConvertOptions {
                input,
                output,
                format,
                section,
            })
        }
        Commands::Check {
            annotations,
            phi_only,
            clean_ages,
        } => {
            let report = check::execute(&CheckOptions {
                annotations,
                phi_only,
                clean_ages,
                verbose,
            })?;
            print!("{}", format_score_report(&report));
            Ok(())
        }
        Commands::Split {
            input,
            training,
            holdout,
            seed,
            holdout_size,
        } => split::execute(&SplitOptions {
            input,
            training,
            holdout,
            seed,
            holdout_size,
            verbose,
        }),
        Commands::FilterCodes { input, output } => filter_codes::execute(&FilterCodesOptions {
            input,
            output,
            verbose,
        }),
    }
}
