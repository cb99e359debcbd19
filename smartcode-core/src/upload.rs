//! Local validation and loading of files submitted for review.
//!
//! Every check here runs before any network call: oversized files and
//! unsupported extensions are rejected with a [`ValidationError`].

use std::path::Path;

use crate::error::{Result, ValidationError};
use crate::types::Language;

/// Largest accepted file, in bytes (1 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Extensions accepted for upload, in the order shown to the user.
pub const ALLOWED_EXTENSIONS: [&str; 9] =
    [".js", ".ts", ".py", ".html", ".css", ".json", ".c", ".cpp", ".php"];

/// A validated file ready to be sent as multipart field `file`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub language: Language,
}

impl FileUpload {
    /// Validates an in-memory file.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();
        let language = validate(&file_name, bytes.len() as u64)?;
        Ok(Self { file_name, bytes, language })
    }

    /// Validates the file at `path` from its metadata, then reads it.
    ///
    /// The size check uses the metadata so an oversized file is never read.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = std::fs::metadata(path)?.len();
        let language = validate(&file_name, size)?;
        let bytes = std::fs::read(path)?;
        Ok(Self { file_name, bytes, language })
    }

    /// Text shown in the code surface while the server analyses the raw bytes.
    ///
    /// Invalid UTF-8 is replaced, so the preview may differ from what was sent.
    pub fn preview_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Checks size then extension; returns the language inferred from the extension.
pub fn validate(file_name: &str, size: u64) -> std::result::Result<Language, ValidationError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size });
    }
    extension(file_name)
        .and_then(Language::from_extension)
        .ok_or_else(|| ValidationError::InvalidFileType { allowed: ALLOWED_EXTENSIONS.join(", ") })
}

/// Text after the last `.` of the name, if any.
fn extension(file_name: &str) -> Option<&str> {
    file_name.rsplit_once('.').map(|(_, ext)| ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn python_script_under_limit_is_accepted() {
        let upload = FileUpload::from_bytes("script.py", vec![b'#'; 500 * 1024]).unwrap();
        assert_eq!(upload.language, Language::Python);
    }

    #[test]
    fn text_file_is_rejected_with_allowed_list() {
        let err = validate("notes.txt", 10).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid file type. Allowed: .js, .ts, .py, .html, .css, .json, .c, .cpp, .php"
        );
        assert!(validate("Makefile", 10).is_err());
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate("a.js", MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate("a.js", MAX_UPLOAD_BYTES + 1),
            Err(ValidationError::FileTooLarge { size: MAX_UPLOAD_BYTES + 1 })
        );
    }

    #[test]
    fn from_path_reads_and_previews_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Main.CPP");
        std::fs::write(&path, b"int main() {}\xff").unwrap();
        let upload = FileUpload::from_path(&path).unwrap();
        assert_eq!(upload.language, Language::Cpp);
        assert_eq!(upload.file_name, "Main.CPP");
        assert_eq!(upload.preview_text(), "int main() {}\u{fffd}");
        assert_eq!(upload.bytes.len(), 14);
    }
}
