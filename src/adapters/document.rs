//! Input documents: UTF-8 text and Word files

use crate::adapters::docx::DocxDocument;
use crate::adapters::mapping::MappingFormat;
use crate::anonymization::AnonymizedDocument;
use crate::config::OutputConfig;
use crate::domain::{AnonymizerError, Result};
use std::path::{Path, PathBuf};

/// Container formats whose text must be extracted before anonymization
const CONTAINER_EXTENSIONS: &[&str] = &["doc", "odt", "rtf", "pdf", "xlsx", "pptx"];

const BOM: char = '\u{feff}';

/// A loaded input document
///
/// The engine only ever sees [`SourceDocument::text`]; writing the result
/// back goes through the same format the document was read from.
#[derive(Debug)]
pub enum SourceDocument {
    /// UTF-8 text file
    Text(String),
    /// Word document
    Docx(DocxDocument),
}

impl SourceDocument {
    /// Load `path`, choosing the format by extension
    ///
    /// # Errors
    ///
    /// Returns [`AnonymizerError::Input`] when the file is missing,
    /// unsupported or unreadable.
    pub fn open(path: &Path) -> Result<Self> {
        if is_docx(path) {
            DocxDocument::open(path).map(Self::Docx)
        } else {
            read_text(path).map(Self::Text)
        }
    }

    /// Text handed to the anonymization engine
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Docx(doc) => doc.text(),
        }
    }

    /// Write the anonymized form of this document to `path`
    pub fn write_anonymized(&self, path: &Path, result: &AnonymizedDocument) -> Result<()> {
        match self {
            Self::Text(_) => write_document(path, &result.anonymized_text),
            Self::Docx(doc) => doc.write_anonymized(path, result),
        }
    }
}

fn is_docx(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
}

/// Read the text of a document; `.docx` files are extracted, anything else
/// must be UTF-8 text
///
/// # Errors
///
/// Returns [`AnonymizerError::Input`] when the file is missing, is an
/// unsupported container format, or is not valid UTF-8.
pub fn read_document(path: &Path) -> Result<String> {
    Ok(match SourceDocument::open(path)? {
        SourceDocument::Text(text) => text,
        SourceDocument::Docx(doc) => doc.text().to_string(),
    })
}

/// Read a UTF-8 text document, stripping a leading byte-order mark
fn read_text(path: &Path) -> Result<String> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if CONTAINER_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
            return Err(AnonymizerError::Input(format!(
                "Unsupported container format '.{ext}' for {}: extract the text first",
                path.display()
            )));
        }
    }

    let bytes = std::fs::read(path).map_err(|e| {
        AnonymizerError::Input(format!("Failed to read {}: {e}", path.display()))
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        AnonymizerError::Input(format!(
            "{} is not valid UTF-8 text (invalid byte at offset {})",
            path.display(),
            e.utf8_error().valid_up_to()
        ))
    })?;

    Ok(match text.strip_prefix(BOM) {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

/// Write text to `path`, creating the parent directory
pub fn write_document(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text).map_err(|e| {
        AnonymizerError::Io(format!("Failed to write {}: {e}", path.display()))
    })
}

fn output_dir(input: &Path, output: &OutputConfig) -> PathBuf {
    match output.directory {
        Some(ref dir) => dir.clone(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

fn stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// `<dir>/<stem><suffix>.<ext>` for an input document
pub fn output_path_for(input: &Path, output: &OutputConfig) -> PathBuf {
    let mut name = format!("{}{}", stem(input), output.suffix);
    if let Some(ext) = input.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    output_dir(input, output).join(name)
}

/// `<dir>/<stem><suffix>_mapping.<fmt>` for an input document
pub fn mapping_path_for(input: &Path, output: &OutputConfig, format: MappingFormat) -> PathBuf {
    output_dir(input, output).join(format!(
        "{}{}_mapping.{}",
        stem(input),
        output.suffix,
        format.extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    #[test]
    fn test_read_strips_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smlouva.txt");
        std::fs::write(&path, "\u{feff}Jan Novák").unwrap();
        assert_eq!(read_document(&path).unwrap(), "Jan Novák");
    }

    #[test]
    fn test_read_missing_file_is_input_error() {
        let err = read_document(Path::new("/nonexistent/smlouva.txt")).unwrap_err();
        assert!(matches!(err, AnonymizerError::Input(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_read_invalid_utf8_is_input_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin2.txt");
        std::fs::write(&path, [b'N', b'o', b'v', 0xe1, b'k']).unwrap();
        assert!(matches!(read_document(&path), Err(AnonymizerError::Input(_))));
    }

    #[test_case("smlouva.doc")]
    #[test_case("smlouva.PDF")]
    #[test_case("smlouva.odt")]
    fn test_container_formats_rejected(name: &str) {
        let err = read_document(Path::new(name)).unwrap_err();
        assert!(err.to_string().contains("Unsupported container format"));
    }

    #[test]
    fn test_docx_dispatch_by_extension() {
        assert!(is_docx(Path::new("smlouva.docx")));
        assert!(is_docx(Path::new("SMLOUVA.DOCX")));
        assert!(!is_docx(Path::new("smlouva.txt")));
        let err = SourceDocument::open(Path::new("/nonexistent/smlouva.docx")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_text_source_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smlouva.txt");
        std::fs::write(&path, "Jan Novák").unwrap();
        let source = SourceDocument::open(&path).unwrap();
        assert!(matches!(source, SourceDocument::Text(_)));
        assert_eq!(source.text(), "Jan Novák");
    }

    #[test]
    fn test_output_paths_next_to_input() {
        let output = OutputConfig::default();
        let input = Path::new("/data/smlouva.txt");
        assert_eq!(
            output_path_for(input, &output),
            PathBuf::from("/data/smlouva_anonymized.txt")
        );
        assert_eq!(
            mapping_path_for(input, &output, MappingFormat::Csv),
            PathBuf::from("/data/smlouva_anonymized_mapping.csv")
        );
    }

    #[test]
    fn test_output_paths_in_directory() {
        let output = OutputConfig {
            directory: Some(PathBuf::from("/out")),
            suffix: "_anon".to_string(),
            ..Default::default()
        };
        let input = Path::new("/data/zapis");
        assert_eq!(output_path_for(input, &output), PathBuf::from("/out/zapis_anon"));
        assert_eq!(
            mapping_path_for(input, &output, MappingFormat::Json),
            PathBuf::from("/out/zapis_anon_mapping.json")
        );
    }

    #[test]
    fn test_write_document_creates_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("a.txt");
        write_document(&path, "[[PERSON_1]]").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[[PERSON_1]]");
    }
}
