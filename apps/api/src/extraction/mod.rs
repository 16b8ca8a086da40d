//! Text extraction from uploaded CV files (PDF via pdf-extract, DOCX via zip + quick-xml).

use std::io::{Cursor, Read};
use std::path::Path;

use axum::extract::Multipart;
use bytes::Bytes;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::error;
use zip::ZipArchive;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Doc,
    Docx,
}

impl FileKind {
    /// Detects the kind from the file name's extension (case-insensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "doc" => Some(FileKind::Doc),
            "docx" => Some(FileKind::Docx),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Invalid PDF file format: {0}")]
    Pdf(String),

    #[error("Failed to extract text from DOC: {0}")]
    Doc(String),
}

/// Validates the upload's file name, rejecting anything but PDF and DOC/DOCX.
pub fn validate_file_type(filename: &str) -> Result<FileKind, AppError> {
    FileKind::from_filename(filename).ok_or_else(|| {
        AppError::Validation(
            "Invalid file type. Only PDF and DOC/DOCX files are allowed.".to_string(),
        )
    })
}

/// The `file` field of a multipart upload, already type-checked.
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub kind: FileKind,
    pub bytes: Bytes,
}

/// Pulls the `file` field out of a multipart body. The extension is checked
/// before the body is read.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let kind = validate_file_type(&filename)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read uploaded file: {e}")))?;

        return Ok(Upload {
            filename,
            kind,
            bytes,
        });
    }

    Err(AppError::Validation("Missing 'file' field".to_string()))
}

/// Extracts plain text on the blocking pool.
pub async fn extract_text(kind: FileKind, bytes: Bytes) -> Result<String, AppError> {
    run_extraction(move || extract_text_sync(kind, &bytes)).await
}

/// Runs an extractor on the blocking pool. A parser panic counts as a
/// malformed file.
async fn run_extraction<F>(extract: F) -> Result<String, AppError>
where
    F: FnOnce() -> Result<String, ExtractionError> + Send + 'static,
{
    let text = tokio::task::spawn_blocking(extract).await.map_err(|e| {
        if e.is_panic() {
            error!("Text extraction panicked: {e}");
            AppError::Extraction("Failed to extract text: the file could not be parsed".to_string())
        } else {
            AppError::Internal(anyhow::anyhow!("Text extraction task failed: {e}"))
        }
    })?;

    text.map_err(|e| {
        error!("Text extraction failed: {e}");
        AppError::Extraction(e.to_string())
    })
}

pub fn extract_text_sync(kind: FileKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    match kind {
        FileKind::Pdf => extract_pdf_text(bytes),
        // Legacy .doc uploads are only readable when they are actually OOXML.
        FileKind::Doc | FileKind::Docx => extract_docx_text(bytes),
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    Ok(text.trim().to_string())
}

/// Reads `word/document.xml` and returns its non-empty paragraphs, one per line.
fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Doc(e.to_string()))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::Doc(format!("missing word/document.xml: {e}")))?
        .read_to_string(&mut document_xml)
        .map_err(|e| ExtractionError::Doc(e.to_string()))?;

    let mut reader = Reader::from_str(&document_xml);
    reader.config_mut().trim_text(false);

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let decoded = t.unescape().map_err(|e| ExtractionError::Doc(e.to_string()))?;
                current.push_str(&decoded);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    if !current.trim().is_empty() {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractionError::Doc(format!("malformed document XML: {e}"))),
        }
    }

    Ok(paragraphs.join("\n").trim().to_string())
}
