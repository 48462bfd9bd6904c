//! Integration tests for dry-run mode
//!
//! These tests verify that `--dry-run` writes no anonymized documents or
//! mapping files while detection and reporting still run normally.

use czanon::adapters::DocxDocument;
use czanon::anonymization::{AnonymizationConfig, AnonymizationEngine, PiiCategory};
use czanon::cli::commands::anonymize::AnonymizeArgs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const CONTRACT: &str = "Pronajímatel Jan Novák, rodné číslo: 850315/1234, tel. 777 123 456.";

fn args(inputs: Vec<PathBuf>, dry_run: bool) -> AnonymizeArgs {
    AnonymizeArgs {
        inputs,
        level: None,
        dry_run,
        output_dir: None,
        formats: Vec::new(),
        report: None,
    }
}

fn write_docx(path: &Path) {
    let body = concat!(
        r#"<w:p><w:r><w:t xml:space="preserve">Pronajímatel Jan </w:t></w:r>"#,
        r#"<w:r><w:rPr><w:i/></w:rPr><w:t>Novák</w:t></w:r></w:p>"#,
        r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>rodné číslo: 850315/1234</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    );
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let mut zip = ZipWriter::new(fs::File::create(path).unwrap());
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn missing_config(dir: &Path) -> String {
    dir.join("czanon.toml").to_string_lossy().to_string()
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_engine_dry_run_returns_original_text() {
    let config = AnonymizationConfig {
        dry_run: true,
        ..Default::default()
    };
    let engine = AnonymizationEngine::new(config).unwrap();
    assert!(engine.is_dry_run());

    let result = engine.anonymize_document("smlouva", CONTRACT).await.unwrap();

    assert!(result.dry_run);
    assert_eq!(result.anonymized_text, CONTRACT);
    assert_eq!(result.stats_by_category.get(&PiiCategory::BirthId), Some(&1));
    assert_eq!(
        result.mapping.originals_for("[[BIRTH_ID_1]]"),
        Some(&["850315/1234".to_string()][..])
    );
}

#[tokio::test]
async fn test_dry_run_matches_real_run_detections() {
    let dry = AnonymizationEngine::new(AnonymizationConfig {
        dry_run: true,
        ..Default::default()
    })
    .unwrap();
    let real = AnonymizationEngine::new(AnonymizationConfig::default()).unwrap();

    let preview = dry.anonymize_document("a", CONTRACT).await.unwrap();
    let result = real.anonymize_document("a", CONTRACT).await.unwrap();

    assert_eq!(preview.spans, result.spans);
    assert_eq!(
        serde_json::to_value(&preview.mapping.replacements).unwrap(),
        serde_json::to_value(&result.mapping.replacements).unwrap()
    );
    assert_ne!(preview.anonymized_text, result.anonymized_text);
}

#[tokio::test]
async fn test_dry_run_command_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("smlouva.txt");
    fs::write(&input, CONTRACT).unwrap();

    let code = args(vec![input], true)
        .execute(&missing_config(dir.path()))
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(file_names(dir.path()), ["smlouva.txt"]);
}

#[tokio::test]
async fn test_dry_run_command_writes_report_when_asked() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("smlouva.txt");
    fs::write(&input, CONTRACT).unwrap();
    let report_path = dir.path().join("report.json");

    let mut dry = args(vec![input], true);
    dry.report = Some(report_path.clone());
    assert_eq!(dry.execute(&missing_config(dir.path())).await.unwrap(), 0);

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["total_documents"], 1);
    assert_eq!(report["detections_by_category"]["BIRTH_ID"], 1);
    assert_eq!(
        file_names(dir.path()),
        ["report.json", "smlouva.txt"]
    );
}

#[tokio::test]
async fn test_real_run_writes_output_and_mappings() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("smlouva.txt");
    fs::write(&input, CONTRACT).unwrap();

    let mut run = args(vec![input], false);
    run.formats = vec!["json".to_string(), "csv".to_string()];
    assert_eq!(run.execute(&missing_config(dir.path())).await.unwrap(), 0);

    assert_eq!(
        file_names(dir.path()),
        [
            "smlouva.txt",
            "smlouva_anonymized.txt",
            "smlouva_anonymized_mapping.csv",
            "smlouva_anonymized_mapping.json",
        ]
    );
    let output = fs::read_to_string(dir.path().join("smlouva_anonymized.txt")).unwrap();
    assert!(output.contains("[[BIRTH_ID_1]]"));
    assert!(!output.contains("850315/1234"));

    let csv = fs::read_to_string(dir.path().join("smlouva_anonymized_mapping.csv")).unwrap();
    assert!(csv.starts_with("placeholder,original\r\n"));
    assert!(csv.contains("[[BIRTH_ID_1]],850315/1234\r\n"));
}

#[tokio::test]
async fn test_missing_input_exits_with_input_code() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("a.txt");
    fs::write(&present, CONTRACT).unwrap();

    let code = args(vec![present, dir.path().join("missing.txt")], true)
        .execute(&missing_config(dir.path()))
        .await
        .unwrap();

    assert_eq!(code, 3);
}

#[tokio::test]
async fn test_invalid_level_override_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("a.txt");
    fs::write(&input, CONTRACT).unwrap();

    let mut run = args(vec![input], true);
    run.level = Some("maximal".to_string());
    assert_eq!(run.execute(&missing_config(dir.path())).await.unwrap(), 2);
}

#[tokio::test]
async fn test_docx_run_writes_word_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("smlouva.docx");
    write_docx(&input);

    let mut run = args(vec![input], false);
    run.formats = vec!["json".to_string()];
    assert_eq!(run.execute(&missing_config(dir.path())).await.unwrap(), 0);

    assert_eq!(
        file_names(dir.path()),
        [
            "smlouva.docx",
            "smlouva_anonymized.docx",
            "smlouva_anonymized_mapping.json",
        ]
    );
    let output = DocxDocument::open(&dir.path().join("smlouva_anonymized.docx")).unwrap();
    assert_eq!(
        output.text(),
        "Pronajímatel [[PERSON_1]]\nrodné číslo: [[BIRTH_ID_1]]\n"
    );

    let mapping: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("smlouva_anonymized_mapping.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(mapping["replacements"]["[[PERSON_1]]"][0], "Jan Novák");
    assert_eq!(mapping["replacements"]["[[BIRTH_ID_1]]"][0], "850315/1234");
}

#[tokio::test]
async fn test_docx_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("smlouva.docx");
    write_docx(&input);

    let code = args(vec![input], true)
        .execute(&missing_config(dir.path()))
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(file_names(dir.path()), ["smlouva.docx"]);
}
