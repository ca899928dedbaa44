use std::{fmt, path::Path};

use crate::{codec::Codec, format::SerializationFormat};

/// Immutable storage configuration bound to a store at construction.
///
/// Encryption is active exactly when a non-empty secret was supplied; an empty
/// secret is treated the same as none.
#[derive(Clone, PartialEq, Eq)]
pub struct StorageDescriptor {
    file_name: String,
    format: SerializationFormat,
    secret: Option<String>,
}

impl StorageDescriptor {
    pub fn new(
        file_name: impl Into<String>,
        format: SerializationFormat,
        secret: Option<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            format,
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Descriptor without encryption.
    pub fn plain(file_name: impl Into<String>, format: SerializationFormat) -> Self {
        Self::new(file_name, format, None)
    }

    /// Descriptor whose payload is encrypted with `secret`.
    pub fn encrypted(
        file_name: impl Into<String>,
        format: SerializationFormat,
        secret: impl Into<String>,
    ) -> Self {
        Self::new(file_name, format, Some(secret.into()))
    }

    /// Logical name as supplied by the caller.
    pub fn logical_name(&self) -> &str {
        &self.file_name
    }

    /// File name including the format's extension. The extension is not
    /// doubled when the logical name already ends with it.
    pub fn file_name(&self) -> String {
        let ext = self.format.extension();
        match Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
        {
            Some(existing) if existing.eq_ignore_ascii_case(ext) => self.file_name.clone(),
            _ => format!("{}.{ext}", self.file_name),
        }
    }

    pub fn format(&self) -> SerializationFormat {
        self.format
    }

    pub fn codec(&self) -> Codec {
        Codec::new(self.format)
    }

    pub fn secret(&self) -> Option<&str> {
        self.secret.as_deref()
    }

    pub fn is_encrypted(&self) -> bool {
        self.secret.is_some()
    }
}

impl fmt::Debug for StorageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret itself.
        f.debug_struct("StorageDescriptor")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("encrypted", &self.is_encrypted())
            .finish()
    }
}
