use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use tracing::trace;

use crate::{error::StoreError, format::SerializationFormat};

/// Header written in front of every binary payload so files written in other
/// formats are rejected instead of being decoded as garbage.
pub const BINARY_MAGIC: &[u8; 4] = b"KSB1";

/// Stateless serialize/deserialize pair for one `SerializationFormat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    format: SerializationFormat,
}

impl Codec {
    pub const fn new(format: SerializationFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> SerializationFormat {
        self.format
    }

    /// Render `value` in this codec's format.
    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, StoreError> {
        let bytes = match self.format {
            SerializationFormat::Binary => {
                let body = binary_options().serialize(value).map_err(|e| self.err(e))?;
                let mut out = Vec::with_capacity(BINARY_MAGIC.len() + body.len());
                out.extend_from_slice(BINARY_MAGIC);
                out.extend_from_slice(&body);
                out
            }
            SerializationFormat::Xml => quick_xml::se::to_string(value)
                .map_err(|e| self.err(e))?
                .into_bytes(),
            SerializationFormat::Json => {
                serde_json::to_vec_pretty(value).map_err(|e| self.err(e))?
            }
        };
        trace!(format = %self.format, len = bytes.len(), "encoded payload");
        Ok(bytes)
    }

    /// Like `encode`, but refuses output that would not read back as the same
    /// value.
    ///
    /// XML cannot express `None` fields, empty sequences or padded text, so
    /// XML output is decoded and re-encoded; any difference is an error. The
    /// other formats are lossless for serde types and are returned as is.
    pub fn encode_checked<T>(&self, value: &T) -> Result<Vec<u8>, StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let bytes = self.encode(value)?;
        if self.format != SerializationFormat::Xml {
            return Ok(bytes);
        }

        let reread: T = self.decode(&bytes).map_err(|err| match err {
            StoreError::Serialization { reason, .. } => {
                self.err(format!("written value does not read back: {reason}"))
            }
            other => other,
        })?;
        if self.encode(&reread)? != bytes {
            return Err(self.err("written value changes when read back"));
        }
        Ok(bytes)
    }

    /// Parse `bytes` previously produced by `encode` with the same format.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, StoreError> {
        match self.format {
            SerializationFormat::Binary => {
                let body = bytes
                    .strip_prefix(BINARY_MAGIC.as_slice())
                    .ok_or_else(|| self.err("missing binary header"))?;
                binary_options().deserialize(body).map_err(|e| self.err(e))
            }
            SerializationFormat::Xml => {
                let text = std::str::from_utf8(bytes).map_err(|e| self.err(e))?;
                quick_xml::de::from_str(text).map_err(|e| self.err(e))
            }
            SerializationFormat::Json => serde_json::from_slice(bytes).map_err(|e| self.err(e)),
        }
    }

    fn err(&self, err: impl ToString) -> StoreError {
        StoreError::serialization(self.format, err)
    }
}

impl From<SerializationFormat> for Codec {
    fn from(format: SerializationFormat) -> Self {
        Codec::new(format)
    }
}

fn binary_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_varint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Inner {
        label: String,
        weight: u16,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Sample {
        highscore: u32,
        last_score: i64,
        player: String,
        muted: bool,
        inner: Inner,
    }

    fn sample() -> Sample {
        Sample {
            highscore: 100,
            last_score: -20,
            player: "Ada & <co>".into(),
            muted: true,
            inner: Inner {
                label: "north".into(),
                weight: 7,
            },
        }
    }

    #[test]
    fn round_trips_in_every_format() {
        for format in SerializationFormat::ALL {
            let codec = Codec::new(format);
            let bytes = codec.encode(&sample()).expect("encode");
            let decoded: Sample = codec.decode(&bytes).expect("decode");
            assert_eq!(decoded, sample(), "{format} round trip");
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        for format in SerializationFormat::ALL {
            let codec = Codec::new(format);
            let first = codec.encode(&sample()).expect("encode");
            let second = codec.encode(&sample()).expect("encode");
            assert_eq!(first, second, "{format} output must be stable");
        }
    }

    #[test]
    fn xml_uses_field_names_as_elements() {
        let xml = Codec::new(SerializationFormat::Xml)
            .encode(&sample())
            .expect("encode");
        let text = String::from_utf8(xml).expect("utf8");
        assert!(text.starts_with("<Sample>"), "{text}");
        assert!(text.contains("<highscore>100</highscore>"), "{text}");
        assert!(text.contains("<label>north</label>"), "{text}");
    }

    #[test]
    fn binary_payload_is_tagged() {
        let bytes = Codec::new(SerializationFormat::Binary)
            .encode(&sample())
            .expect("encode");
        assert!(bytes.starts_with(BINARY_MAGIC));
    }

    #[test]
    fn cross_format_decode_fails_with_serialization_error() {
        for written in SerializationFormat::ALL {
            let bytes = Codec::new(written).encode(&sample()).expect("encode");
            for read in SerializationFormat::ALL.into_iter().filter(|f| *f != written) {
                let err = Codec::new(read)
                    .decode::<Sample>(&bytes)
                    .expect_err("mismatched format must fail");
                assert!(
                    matches!(err, StoreError::Serialization { format, .. } if format == read),
                    "{written} read as {read}: {err:?}"
                );
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Profile {
        name: String,
        best_lap: Option<u32>,
        unlocked: Vec<String>,
    }

    fn profile(best_lap: Option<u32>, unlocked: &[&str]) -> Profile {
        Profile {
            name: "ada".into(),
            best_lap,
            unlocked: unlocked.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn optional_and_sequence_fields_round_trip_where_representable() {
        let lossless = [
            profile(Some(42), &["a", "b"]),
            profile(Some(0), &["solo"]),
            profile(None, &[]),
            profile(None, &["a", " b", "c "]),
        ];
        for format in [SerializationFormat::Binary, SerializationFormat::Json] {
            let codec = Codec::new(format);
            for value in &lossless {
                let bytes = codec.encode_checked(value).expect("encode");
                let decoded: Profile = codec.decode(&bytes).expect("decode");
                assert_eq!(&decoded, value, "{format}");
            }
        }

        let xml = Codec::new(SerializationFormat::Xml);
        for value in [profile(Some(42), &["a", "b"]), profile(Some(0), &["solo"])] {
            let bytes = xml.encode_checked(&value).expect("encode");
            let decoded: Profile = xml.decode(&bytes).expect("decode");
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn xml_refuses_values_that_cannot_be_read_back() {
        let xml = Codec::new(SerializationFormat::Xml);
        for value in [
            profile(None, &["a"]),
            profile(Some(1), &[]),
            profile(Some(1), &["a", " b"]),
        ] {
            let err = xml
                .encode_checked(&value)
                .expect_err("lossy xml must be refused");
            assert!(
                matches!(
                    err,
                    StoreError::Serialization {
                        format: SerializationFormat::Xml,
                        ..
                    }
                ),
                "{value:?}: {err:?}"
            );
        }
    }

    #[test]
    fn malformed_input_is_rejected() {
        let codec = Codec::new(SerializationFormat::Binary);
        let mut bytes = codec.encode(&sample()).expect("encode");
        bytes.truncate(bytes.len() - 3);
        assert!(codec.decode::<Sample>(&bytes).is_err());

        let json = Codec::new(SerializationFormat::Json);
        assert!(json.decode::<Sample>(b"{\"highscore\": 1").is_err());
    }
}
