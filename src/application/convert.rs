//! Results-file export use case
//!
//! Reads one section of a results file and renders it for a downstream
//! consumer: seq2seq training (csv), legacy review tooling (xml), an
//! annotation-review tool (labelstudio), NER training (spans) or plain
//! text files.

use crate::domain::tags::{list_annotations, redact_tags, strip_tags, KNOWN_LABELS};
use crate::error::{DeidgenError, Result};
use crate::infrastructure::corpus::{ResultsFile, Section};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The export formats `convert` can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// `source_text,target_text` pairs: plain text and redacted text.
    #[default]
    Csv,
    /// One `<record>` element per document, tags kept raw.
    Xml,
    /// Import tasks for the review tool, one per document.
    LabelStudio,
    /// Plain text plus labeled character spans, for NER training.
    Spans,
    /// A folder of numbered `.txt` files.
    Text,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xml" => Ok(ExportFormat::Xml),
            "labelstudio" => Ok(ExportFormat::LabelStudio),
            "spans" => Ok(ExportFormat::Spans),
            "text" => Ok(ExportFormat::Text),
            _ => Err(format!("Invalid format: '{}'", s)),
        }
    }
}

/// Options for the conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Results file to read.
    pub input: PathBuf,
    /// Export file to write; a folder for the text format.
    pub output: PathBuf,
    pub format: ExportFormat,
    pub section: Section,
}

/// Execute the conversion. Reports the record count and output path.
pub fn execute(options: &ConvertOptions) -> Result<()> {
    // 1. Load the results file and pick the section to export.
    let results_file = ResultsFile::load(&options.input)?;
    let records = results_file.section(options.section)?;

    // 2. Render the chosen format and write it out.
    match options.format {
        ExportFormat::Csv => write_output(&options.output, render_csv(records))?,
        ExportFormat::Xml => write_output(&options.output, render_xml(records))?,
        ExportFormat::LabelStudio => {
            let rendered = render_labelstudio(records).map_err(|source| DeidgenError::Json {
                path: options.output.clone(),
                source,
            })?;
            write_output(&options.output, rendered)?;
        }
        ExportFormat::Spans => {
            let rendered = render_spans(records).map_err(|source| DeidgenError::Json {
                path: options.output.clone(),
                source,
            })?;
            write_output(&options.output, rendered)?;
        }
        ExportFormat::Text => write_text_files(records, &options.output)?,
    }

    println!(
        "Converted {} records to {}",
        records.len(),
        options.output.display()
    );
    Ok(())
}

fn write_output(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    Ok(())
}

fn render_csv(records: &[String]) -> String {
    let mut csv = String::from("source_text,target_text\n");
    for record in records {
        let source = strip_tags(record);
        let target = redact_tags(record);
        csv.push_str(&format!("{},{}\n", csv_field(&source), csv_field(&target)));
    }
    csv
}

/// Quote a CSV field: newlines become spaces, quotes are doubled.
fn csv_field(text: &str) -> String {
    format!("\"{}\"", text.replace('\n', " ").replace('"', "\"\""))
}

fn render_xml(records: &[String]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    for (i, record) in records.iter().enumerate() {
        xml.push_str(&format!("<record id='{}'>{}</record>", i, record));
    }
    xml
}

/// Review-tool import tasks. `text` is what reviewers annotate;
/// `original_text` keeps the tagged document so `check` can compare the
/// reviewed spans against it later.
fn render_labelstudio(records: &[String]) -> serde_json::Result<String> {
    let tasks: Vec<serde_json::Value> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::json!({
                "id": i,
                "data": {
                    "text": strip_tags(record),
                    "original_text": record,
                }
            })
        })
        .collect();
    serde_json::to_string(&tasks)
}

/// Plain text with labeled character spans. Replacing newlines with spaces
/// is character for character, so the span offsets stay valid.
fn render_spans(records: &[String]) -> serde_json::Result<String> {
    let documents: Vec<serde_json::Value> = records
        .iter()
        .map(|record| {
            let entities = list_annotations(record, Some(KNOWN_LABELS.as_slice()));
            serde_json::json!({
                "text": strip_tags(record).replace('\n', " "),
                "entities": entities,
            })
        })
        .collect();
    serde_json::to_string(&documents)
}

fn write_text_files(records: &[String], output: &Path) -> Result<()> {
    fs::create_dir_all(output)?;
    for (i, record) in records.iter().enumerate() {
        let text = strip_tags(record).replace('\n', " ");
        fs::write(output.join(format!("{}.txt", i)), text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::Locale;
    use crate::infrastructure::corpus::GenerationParameters;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_results_file(results: Vec<String>) -> ResultsFile {
        ResultsFile {
            parameters: GenerationParameters {
                model: "gpt-3.5-turbo".to_string(),
                locale: Locale::Nb,
                n: results.len(),
                seed: 42,
                dry_run: false,
                temperature: 1.0,
                top_p: 1.0,
                max_tokens: 1024,
                output: PathBuf::from("results.json"),
                created: Utc::now(),
            },
            scenarios: Vec::new(),
            prompts: vec![String::new(); results.len()],
            results,
            cleaned_results: None,
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("XML".parse::<ExportFormat>().unwrap(), ExportFormat::Xml);
        assert_eq!(
            "labelstudio".parse::<ExportFormat>().unwrap(),
            ExportFormat::LabelStudio
        );
        assert_eq!(
            "spans".parse::<ExportFormat>().unwrap(),
            ExportFormat::Spans
        );
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert_eq!(
            "yaml".parse::<ExportFormat>().unwrap_err(),
            "Invalid format: 'yaml'"
        );
    }

    #[test]
    fn test_render_csv_strips_and_redacts() {
        let records = vec![
            "Pasient <First_Name>Ola</First_Name> innlagt.".to_string(),
        ];
        let csv = render_csv(&records);
        assert_eq!(
            csv,
            "source_text,target_text\n\
             \"Pasient Ola innlagt.\",\"Pasient [First_Name] innlagt.\"\n"
        );
    }

    #[test]
    fn test_render_csv_escapes_quotes_and_newlines() {
        let records = vec!["Sa \"hei\"\ntil <First_Name>Åse</First_Name>".to_string()];
        let csv = render_csv(&records);
        assert!(csv.contains("\"Sa \"\"hei\"\" til Åse\""));
        assert!(!csv.contains("hei\"\ntil"));
    }

    #[test]
    fn test_render_xml_keeps_tags_raw() {
        let records = vec![
            "<First_Name>Ola</First_Name> kom.".to_string(),
            "Andre notat.".to_string(),
        ];
        let xml = render_xml(&records);
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <record id='0'><First_Name>Ola</First_Name> kom.</record>\
             <record id='1'>Andre notat.</record>"
        );
    }

    #[test]
    fn test_render_labelstudio_pairs_plain_and_tagged() {
        let records = vec!["Linje en\n<Age>54</Age> år".to_string()];
        let json = render_labelstudio(&records).unwrap();
        let tasks: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(tasks[0]["id"], 0);
        // Newlines survive into the review text.
        assert_eq!(tasks[0]["data"]["text"], "Linje en\n54 år");
        assert_eq!(tasks[0]["data"]["original_text"], records[0]);
    }

    #[test]
    fn test_render_spans_has_character_offsets() {
        let records = vec!["Hei <First_Name>Åse</First_Name>\nfra Oslo".to_string()];
        let json = render_spans(&records).unwrap();
        let documents: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(documents[0]["text"], "Hei Åse fra Oslo");
        let entity = &documents[0]["entities"][0];
        assert_eq!(entity["start"], 4);
        assert_eq!(entity["end"], 7);
        assert_eq!(entity["label"], "First_Name");
    }

    #[test]
    fn test_render_spans_drops_unknown_labels() {
        let records = vec!["<Nickname>Blåmann</Nickname> og <Age>54</Age>".to_string()];
        let json = render_spans(&records).unwrap();
        let documents: serde_json::Value = serde_json::from_str(&json).unwrap();

        let entities = documents[0]["entities"].as_array().unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0]["label"], "Age");
    }

    #[test]
    fn test_execute_reads_results_section() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("results.json");
        let output = temp.path().join("out.csv");
        sample_results_file(vec!["<Age>54</Age> år gammel".to_string()])
            .save(&input)
            .unwrap();

        let options = ConvertOptions {
            input,
            output: output.clone(),
            format: ExportFormat::Csv,
            section: Section::Results,
        };
        execute(&options).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.starts_with("source_text,target_text\n"));
        assert!(written.contains("\"54 år gammel\",\"[Age] år gammel\""));
    }

    #[test]
    fn test_execute_default_section_requires_cleaned_results() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("results.json");
        sample_results_file(vec!["notat".to_string()])
            .save(&input)
            .unwrap();

        let options = ConvertOptions {
            input,
            output: temp.path().join("out.csv"),
            format: ExportFormat::Csv,
            section: Section::Cleaned,
        };
        let result = execute(&options);
        assert!(matches!(result, Err(DeidgenError::MissingSection(_))));
    }

    #[test]
    fn test_execute_cleaned_section_when_present() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("results.json");
        let output = temp.path().join("out.csv");
        let mut file = sample_results_file(vec!["raw".to_string()]);
        file.cleaned_results = Some(vec!["<Age>54</Age>".to_string()]);
        file.save(&input).unwrap();

        let options = ConvertOptions {
            input,
            output: output.clone(),
            format: ExportFormat::Csv,
            section: Section::Cleaned,
        };
        execute(&options).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        assert!(written.contains("\"54\",\"[Age]\""));
        assert!(!written.contains("raw"));
    }

    #[test]
    fn test_execute_text_format_writes_numbered_files() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("results.json");
        let output = temp.path().join("texts");
        sample_results_file(vec![
            "Første\nnotat".to_string(),
            "Andre <Age>54</Age>".to_string(),
        ])
        .save(&input)
        .unwrap();

        let options = ConvertOptions {
            input,
            output: output.clone(),
            format: ExportFormat::Text,
            section: Section::Results,
        };
        execute(&options).unwrap();

        assert_eq!(
            std::fs::read_to_string(output.join("0.txt")).unwrap(),
            "Første notat"
        );
        assert_eq!(
            std::fs::read_to_string(output.join("1.txt")).unwrap(),
            "Andre 54"
        );
    }
}
