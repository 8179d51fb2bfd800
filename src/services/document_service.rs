use crate::error::{Error, Result};
use bytes::Bytes;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "txt" => Ok(DocumentKind::Text),
            "" => Err(Error::UnsupportedFormat(format!(
                "{} has no file extension",
                file_name
            ))),
            other => Err(Error::UnsupportedFormat(format!(
                ".{} files are not supported, only pdf and txt",
                other
            ))),
        }
    }
}

/// Extracts the text of an uploaded document. Reads nothing but `data`.
pub async fn load_document(file_name: &str, data: Bytes) -> Result<String> {
    let kind = DocumentKind::from_file_name(file_name)?;
    tracing::info!(file_name, bytes = data.len(), ?kind, "extracting document text");

    let text = match kind {
        DocumentKind::Text => decode_text(&data)?,
        DocumentKind::Pdf => extract_pdf_text(data).await?,
    };

    tracing::debug!(chars = text.chars().count(), "document text extracted");
    Ok(text)
}

fn decode_text(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::Extraction(format!("text file is not valid UTF-8: {}", e)))
}

async fn extract_pdf_text(data: Bytes) -> Result<String> {
    if !data.starts_with(b"%PDF") {
        return Err(Error::Extraction("Invalid PDF file content".into()));
    }

    // The parser can panic on hostile input; a blocking task turns that into a JoinError.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| {
            tracing::error!("PDF extraction task aborted: {}", e);
            Error::Extraction("error reading the PDF file".into())
        })?
        .map_err(|e| {
            tracing::error!("PDF extraction failed: {}", e);
            Error::Extraction("error reading the PDF file".into())
        })?;

    Ok(text)
}
