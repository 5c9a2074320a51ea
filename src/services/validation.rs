use crate::models::WizardError;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// The only media type the backend's upload endpoint accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file the user picked for upload, read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its media type from the extension.
    pub fn from_path(path: &Utf8Path) -> Result<Self, WizardError> {
        let bytes = fs::read(path).map_err(|source| WizardError::Io {
            path: path.to_string(),
            source,
        })?;
        let name = path.file_name().unwrap_or(path.as_str()).to_string();
        Ok(Self {
            media_type: media_type_for(path).to_string(),
            name,
            bytes,
        })
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }
}

/// Media type for a file name, by extension.
pub fn media_type_for(path: &Utf8Path) -> &'static str {
    let extension = path.extension().map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("txt") | Some("md") => "text/plain",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("pptx") => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        Some("doc") => "application/msword",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Reject anything the upload endpoint won't take, before any request is made.
pub fn validate_upload(candidate: &UploadCandidate) -> Result<(), WizardError> {
    if candidate.is_pdf() {
        Ok(())
    } else {
        Err(WizardError::UnsupportedFileType {
            name: candidate.name.clone(),
            media_type: candidate.media_type.clone(),
        })
    }
}

/// Normalise a path typed at a prompt: trims whitespace and surrounding quotes
/// left by drag-and-drop into a terminal.
pub fn clean_input_path(raw: &str) -> Utf8PathBuf {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed);
    Utf8PathBuf::from(unquoted)
}
