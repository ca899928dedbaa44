use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// On-disk encoding bound to a store. Also decides the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerializationFormat {
    /// Tagged, length-prefixed binary encoding.
    #[default]
    Binary,
    /// One XML element per field, rooted at the type name.
    Xml,
    /// Pretty-printed JSON object.
    Json,
}

impl SerializationFormat {
    pub const ALL: [SerializationFormat; 3] = [
        SerializationFormat::Binary,
        SerializationFormat::Xml,
        SerializationFormat::Json,
    ];

    /// File extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            SerializationFormat::Binary => "bin",
            SerializationFormat::Xml => "xml",
            SerializationFormat::Json => "json",
        }
    }

    /// Infer the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(ext))
    }
}

impl fmt::Display for SerializationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SerializationFormat::Binary => "binary",
            SerializationFormat::Xml => "xml",
            SerializationFormat::Json => "json",
        };
        f.write_str(name)
    }
}

impl FromStr for SerializationFormat {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" => Ok(SerializationFormat::Binary),
            "xml" => Ok(SerializationFormat::Xml),
            "json" => Ok(SerializationFormat::Json),
            _ => Err(StoreError::UnsupportedFormat {
                name: s.to_string(),
            }),
        }
    }
}
