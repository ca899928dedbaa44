use thiserror::Error;

use crate::format::SerializationFormat;

/// Errors produced while saving, loading or deleting a record.
///
/// Everything except `UnsupportedFormat` is recoverable: the store reports it
/// through the `After*` event and leaves the held value untouched.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing file does not exist.
    #[error("file not found: {path}")]
    MissingFile { path: String },
    /// The payload is malformed or was written in another format.
    #[error("{format} serialization failed: {reason}")]
    Serialization {
        format: SerializationFormat,
        reason: String,
    },
    /// Wrong secret or corrupted ciphertext.
    #[error("decryption failed: {reason}")]
    Decryption { reason: String },
    /// Encrypting the serialized payload failed.
    #[error("encryption failed: {reason}")]
    Encryption { reason: String },
    /// The requested format has no codec.
    #[error("unsupported format: {name}")]
    UnsupportedFormat { name: String },
    /// Underlying filesystem or path resolution failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

impl StoreError {
    pub fn serialization(format: SerializationFormat, err: impl ToString) -> Self {
        StoreError::Serialization {
            format,
            reason: err.to_string(),
        }
    }

    pub fn storage(err: impl ToString) -> Self {
        StoreError::Storage {
            reason: err.to_string(),
        }
    }

    /// True for a load/delete whose target file was absent.
    pub fn is_missing_file(&self) -> bool {
        matches!(self, StoreError::MissingFile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = StoreError::serialization(SerializationFormat::Xml, "unexpected eof");
        assert_eq!(err.to_string(), "xml serialization failed: unexpected eof");

        let err = StoreError::MissingFile {
            path: "/tmp/data.bin".into(),
        };
        assert!(err.is_missing_file());
        assert_eq!(err.to_string(), "file not found: /tmp/data.bin");
    }
}
