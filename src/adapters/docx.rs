//! Word (`.docx`) documents
//!
//! Only `word/document.xml` is touched. Its `w:t` runs are read in document
//! order, which covers body paragraphs and table cells alike; paragraphs are
//! joined with line breaks into the text handed to the engine. Replacements
//! are written back run by run, so runs outside a detected value keep their
//! text and formatting. Every other archive entry is copied unchanged.

use crate::anonymization::AnonymizedDocument;
use crate::domain::{AnonymizerError, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Write};
use std::ops::Range;
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DOCUMENT_XML: &str = "word/document.xml";

const TEXT: &[u8] = b"w:t";
const PARAGRAPH: &[u8] = b"w:p";
const TAB: &[u8] = b"w:tab";
const BREAKS: &[&[u8]] = &[b"w:br", b"w:cr"];

/// Opened Word document
#[derive(Debug)]
pub struct DocxDocument {
    archive: Vec<u8>,
    xml: String,
    text: String,
    /// Byte range of every `w:t` run inside `text`, in document order
    runs: Vec<Range<usize>>,
}

fn invalid(path: &Path, what: impl Display) -> AnonymizerError {
    AnonymizerError::Input(format!("{} is not a readable .docx: {what}", path.display()))
}

impl DocxDocument {
    /// Read the archive and extract the document text
    ///
    /// # Errors
    ///
    /// Returns [`AnonymizerError::Input`] when the file is missing, is not a
    /// zip archive or has no readable `word/document.xml`.
    pub fn open(path: &Path) -> Result<Self> {
        let archive = std::fs::read(path).map_err(|e| {
            AnonymizerError::Input(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_bytes(&archive).map_err(|e| invalid(path, e))
    }

    fn from_bytes(archive: &[u8]) -> std::result::Result<Self, String> {
        let mut zip = ZipArchive::new(Cursor::new(archive)).map_err(|e| e.to_string())?;
        let mut xml = String::new();
        zip.by_name(DOCUMENT_XML)
            .map_err(|e| format!("{DOCUMENT_XML}: {e}"))?
            .read_to_string(&mut xml)
            .map_err(|e| format!("{DOCUMENT_XML}: {e}"))?;

        let (text, runs) = extract(&xml)?;
        tracing::debug!(runs = runs.len(), text_len = text.len(), "Extracted .docx text");

        Ok(Self {
            archive: archive.to_vec(),
            xml,
            text,
            runs,
        })
    }

    /// Document text: paragraphs separated by `\n`, tabs as `\t`
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Write a copy with every span of `result` replaced by its placeholder
    ///
    /// # Errors
    ///
    /// Returns an error when a span has no placeholder in the result's
    /// mapping or the archive cannot be written.
    pub fn write_anonymized(&self, path: &Path, result: &AnonymizedDocument) -> Result<()> {
        let mut replacements = Vec::with_capacity(result.spans.len());
        for span in &result.spans {
            let placeholder = result
                .mapping
                .placeholder_for(span.category, &span.text)
                .ok_or_else(|| {
                    AnonymizerError::Other(format!(
                        "No placeholder recorded for {} span at {}..{}",
                        span.category, span.start, span.end
                    ))
                })?;
            replacements.push((span.start..span.end, placeholder.to_string()));
        }

        let rewritten = rewrite_runs(&self.text, &self.runs, &replacements);
        let xml = write_runs(&self.xml, &rewritten).map_err(|e| {
            AnonymizerError::Other(format!("Failed to rewrite {DOCUMENT_XML}: {e}"))
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.write_archive(path, &xml).map_err(|e| {
            AnonymizerError::Io(format!("Failed to write {}: {e}", path.display()))
        })
    }

    fn write_archive(&self, path: &Path, xml: &str) -> std::result::Result<(), String> {
        let mut source =
            ZipArchive::new(Cursor::new(&self.archive)).map_err(|e| e.to_string())?;
        let file = File::create(path).map_err(|e| e.to_string())?;
        let mut target = ZipWriter::new(BufWriter::new(file));

        for index in 0..source.len() {
            let entry = source.by_index(index).map_err(|e| e.to_string())?;
            if entry.name() == DOCUMENT_XML {
                drop(entry);
                let options =
                    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
                target
                    .start_file(DOCUMENT_XML, options)
                    .map_err(|e| e.to_string())?;
                target.write_all(xml.as_bytes()).map_err(|e| e.to_string())?;
            } else {
                target.raw_copy_file(entry).map_err(|e| e.to_string())?;
            }
        }

        target
            .finish()
            .map_err(|e| e.to_string())?
            .flush()
            .map_err(|e| e.to_string())
    }
}

/// Collect the text of every `w:t` run plus paragraph, tab and break
/// separators
fn extract(xml: &str) -> std::result::Result<(String, Vec<Range<usize>>), String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut runs = Vec::new();
    let mut open_run: Option<usize> = None;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) if e.name().as_ref() == TEXT => open_run = Some(text.len()),
            Event::End(e) if e.name().as_ref() == TEXT => {
                if let Some(start) = open_run.take() {
                    runs.push(start..text.len());
                }
            }
            Event::Empty(e) if e.name().as_ref() == TEXT => runs.push(text.len()..text.len()),
            Event::Text(e) if open_run.is_some() => {
                text.push_str(&e.unescape().map_err(|e| e.to_string())?);
            }
            Event::End(e) if e.name().as_ref() == PARAGRAPH => text.push('\n'),
            Event::Empty(e) if e.name().as_ref() == TAB => text.push('\t'),
            Event::Empty(e) if BREAKS.contains(&e.name().as_ref()) => text.push('\n'),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok((text, runs))
}

/// New content of every run after applying `replacements`
///
/// A placeholder lands in the first run its span touches; the rest of the
/// span is cut from the following runs.
fn rewrite_runs(
    text: &str,
    runs: &[Range<usize>],
    replacements: &[(Range<usize>, String)],
) -> Vec<String> {
    let mut placed = vec![false; replacements.len()];
    let mut first = 0;

    runs.iter()
        .map(|run| {
            while first < replacements.len() && replacements[first].0.end <= run.start {
                first += 1;
            }

            let mut out = String::with_capacity(run.len());
            let mut pos = run.start;
            for (index, (span, token)) in replacements.iter().enumerate().skip(first) {
                if span.start >= run.end {
                    break;
                }
                if span.end <= run.start {
                    continue;
                }
                let from = span.start.max(pos);
                out.push_str(&text[pos..from]);
                if !placed[index] {
                    out.push_str(token);
                    placed[index] = true;
                }
                pos = span.end.min(run.end);
            }
            out.push_str(&text[pos..run.end]);
            out
        })
        .collect()
}

/// Re-serialize `xml` with the `w:t` runs replaced by `runs`
fn write_runs(xml: &str, runs: &[String]) -> std::result::Result<String, String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut index = 0;
    let mut in_run = false;

    loop {
        let event = reader.read_event().map_err(|e| e.to_string())?;
        match event {
            Event::Start(e) if e.name().as_ref() == TEXT => {
                in_run = true;
                write(&mut writer, Event::Start(preserve_space(&e)))?;
            }
            Event::End(e) if e.name().as_ref() == TEXT => {
                in_run = false;
                let content = runs.get(index).map(String::as_str).unwrap_or_default();
                if !content.is_empty() {
                    write(&mut writer, Event::Text(BytesText::new(content)))?;
                }
                index += 1;
                write(&mut writer, Event::End(e))?;
            }
            Event::Empty(e) if e.name().as_ref() == TEXT => {
                let content = runs.get(index).map(String::as_str).unwrap_or_default();
                index += 1;
                if content.is_empty() {
                    write(&mut writer, Event::Empty(e))?;
                } else {
                    write(&mut writer, Event::Start(preserve_space(&e)))?;
                    write(&mut writer, Event::Text(BytesText::new(content)))?;
                    write(&mut writer, Event::End(BytesEnd::new("w:t")))?;
                }
            }
            Event::Text(_) | Event::CData(_) if in_run => {}
            Event::Eof => break,
            other => write(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> std::result::Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

/// Placeholders may start or end a run with a space Word would otherwise drop
fn preserve_space(start: &BytesStart<'_>) -> BytesStart<'static> {
    let mut owned = start.clone().into_owned();
    let preserved = start
        .attributes()
        .flatten()
        .any(|a| a.key.as_ref() == b"xml:space");
    if !preserved {
        owned.push_attribute(("xml:space", "preserve"));
    }
    owned
}
