//! Avro block compression codec selection.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{DestinationError, DestinationResult};
use crate::fields::present;

/// Deflate level used when `compression_level` is absent.
pub const DEFAULT_DEFLATE_LEVEL: i32 = 0;
/// Xz level used when `compression_level` is absent.
pub const DEFAULT_XZ_LEVEL: i32 = 6;
/// Zstandard level used when `compression_level` is absent.
pub const DEFAULT_ZSTANDARD_LEVEL: i32 = 3;
/// Zstandard checksum flag used when `include_checksum` is absent.
pub const DEFAULT_ZSTANDARD_CHECKSUM: bool = false;

/// Compression codec for the data blocks of an Avro container file.
///
/// `Null` is the "no compression" selection. Levels are handed to the
/// compressor as-is; range checks belong to the compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "codec", rename_all = "lowercase")]
pub enum AvroCodec {
    #[default]
    Null,
    Deflate {
        compression_level: i32,
    },
    Bzip2,
    Xz {
        compression_level: i32,
    },
    Zstandard {
        compression_level: i32,
        include_checksum: bool,
    },
    Snappy,
}

impl AvroCodec {
    /// Resolve a codec from a mapping holding `codec`, `compression_level`
    /// and `include_checksum`.
    ///
    /// An absent `codec` selects [`AvroCodec::Null`]. Names are matched
    /// case-insensitively; anything unrecognised fails with
    /// [`DestinationError::InvalidCodec`]. `config` must be a JSON object.
    pub fn from_config(config: &Value) -> DestinationResult<Self> {
        if !config.is_object() {
            return Err(DestinationError::invalid_field(
                "compression_codec",
                format!("expected an object, got {}", config),
            ));
        }

        let name = match present(config, "codec") {
            None => {
                debug!("No codec configured, writing uncompressed Avro");
                return Ok(Self::Null);
            }
            Some(Value::String(name)) => name,
            Some(other) => return Err(DestinationError::invalid_codec(other.to_string())),
        };

        let codec = match name.to_ascii_lowercase().as_str() {
            "no compression" | "null" => Self::Null,
            "deflate" => Self::Deflate {
                compression_level: compression_level(config, DEFAULT_DEFLATE_LEVEL)?,
            },
            "bzip2" => Self::Bzip2,
            "xz" => Self::Xz {
                compression_level: compression_level(config, DEFAULT_XZ_LEVEL)?,
            },
            "zstandard" => Self::Zstandard {
                compression_level: compression_level(config, DEFAULT_ZSTANDARD_LEVEL)?,
                include_checksum: include_checksum(config)?,
            },
            "snappy" => Self::Snappy,
            _ => {
                warn!(codec = %name, "Rejected unknown Avro codec");
                return Err(DestinationError::invalid_codec(name.as_str()));
            }
        };

        debug!(codec = %codec, "Resolved Avro codec");
        Ok(codec)
    }

    /// Codec name as written to the `avro.codec` file header.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Deflate { .. } => "deflate",
            Self::Bzip2 => "bzip2",
            Self::Xz { .. } => "xz",
            Self::Zstandard { .. } => "zstandard",
            Self::Snappy => "snappy",
        }
    }

    /// Compression level, for codecs that take one.
    pub fn compression_level(&self) -> Option<i32> {
        match self {
            Self::Deflate { compression_level }
            | Self::Xz { compression_level }
            | Self::Zstandard {
                compression_level, ..
            } => Some(*compression_level),
            Self::Null | Self::Bzip2 | Self::Snappy => None,
        }
    }
}

impl fmt::Display for AvroCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deflate { compression_level } => write!(f, "deflate-{}", compression_level),
            Self::Xz { compression_level } => write!(f, "xz-{}", compression_level),
            Self::Zstandard {
                compression_level, ..
            } => write!(f, "zstandard[{}]", compression_level),
            other => f.write_str(other.name()),
        }
    }
}

fn compression_level(config: &Value, default: i32) -> DestinationResult<i32> {
    match present(config, "compression_level") {
        None => Ok(default),
        Some(value) => value
            .as_i64()
            .and_then(|level| i32::try_from(level).ok())
            .ok_or_else(|| {
                DestinationError::invalid_field(
                    "compression_level",
                    format!("expected an integer, got {}", value),
                )
            }),
    }
}

fn include_checksum(config: &Value) -> DestinationResult<bool> {
    match present(config, "include_checksum") {
        None => Ok(DEFAULT_ZSTANDARD_CHECKSUM),
        Some(value) => value.as_bool().ok_or_else(|| {
            DestinationError::invalid_field(
                "include_checksum",
                format!("expected a boolean, got {}", value),
            )
        }),
    }
}
