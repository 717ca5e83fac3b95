//! Extraction error types
//!
//! Only whole-document failures live here. Individual malformed records are
//! skipped and counted, never reported as errors.

use thiserror::Error;

/// Fatal errors that abort an extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Reading the source failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML reader rejected the document
    #[error("Malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    /// The document is not a single well-formed element tree
    #[error("Malformed XML: {0}")]
    Malformed(String),

    /// ZIP container could not be opened or read
    #[error("Invalid ZIP archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// ZIP container has no export document
    #[error("No export.xml found in archive")]
    MissingExport,
}

/// Result type alias for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;

impl ExtractError {
    /// Build from a reader error, keeping I/O failures distinct from markup errors
    pub(crate) fn from_xml(position: usize, err: quick_xml::Error) -> Self {
        match err {
            quick_xml::Error::Io(io) => {
                ExtractError::Io(std::io::Error::new(io.kind(), io.to_string()))
            }
            other => ExtractError::Xml {
                position,
                source: other,
            },
        }
    }

    /// Whether the failure came from the document's content rather than I/O
    pub fn is_malformed(&self) -> bool {
        !matches!(self, ExtractError::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExtractError::Malformed("document has no root element".to_string());
        assert_eq!(err.to_string(), "Malformed XML: document has no root element");

        let err = ExtractError::MissingExport;
        assert_eq!(err.to_string(), "No export.xml found in archive");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExtractError = io_err.into();
        assert!(matches!(err, ExtractError::Io(_)));
        assert!(!err.is_malformed());
    }
}
