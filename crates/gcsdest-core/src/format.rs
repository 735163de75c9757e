//! Output format block of the destination configuration.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::codec::AvroCodec;
use crate::error::{DestinationError, DestinationResult};
use crate::fields::{optional_str, present};

/// Part size used when `part_size_mb` is absent.
pub const DEFAULT_PART_SIZE_MB: u32 = 5;

/// Bytes in one part-size megabyte.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Resolve `part_size_mb` from a format mapping.
///
/// Absent (or `null`) yields [`DEFAULT_PART_SIZE_MB`]. Anything other than a
/// positive integer fails with [`DestinationError::InvalidPartSize`].
pub fn resolve_part_size(config: &Value) -> DestinationResult<u32> {
    let Some(value) = present(config, "part_size_mb") else {
        return Ok(DEFAULT_PART_SIZE_MB);
    };

    value
        .as_u64()
        .filter(|mb| *mb > 0)
        .and_then(|mb| u32::try_from(mb).ok())
        .ok_or_else(|| DestinationError::InvalidPartSize {
            value: value.to_string(),
        })
}

/// Convert a part size in megabytes to bytes.
pub fn part_size_bytes(part_size_mb: u32) -> u64 {
    u64::from(part_size_mb) * BYTES_PER_MB
}

/// Supported output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FormatType {
    #[default]
    Avro,
}

impl FormatType {
    /// Parse a `format_type` value, case-insensitively.
    pub fn parse(value: &str) -> DestinationResult<Self> {
        if value.eq_ignore_ascii_case("avro") {
            Ok(Self::Avro)
        } else {
            Err(DestinationError::UnsupportedFormat {
                format_type: value.to_string(),
            })
        }
    }

    /// Canonical `format_type` value.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Avro => "AVRO",
        }
    }

    /// Extension of the object keys written in this format.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Avro => "avro",
        }
    }
}

/// Resolved Avro format settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AvroFormatConfig {
    format_type: FormatType,
    codec: AvroCodec,
    part_size_mb: u32,
}

impl Default for AvroFormatConfig {
    fn default() -> Self {
        Self {
            format_type: FormatType::Avro,
            codec: AvroCodec::Null,
            part_size_mb: DEFAULT_PART_SIZE_MB,
        }
    }
}

impl AvroFormatConfig {
    /// Resolve the format block of a destination document.
    ///
    /// Codec keys are read from the nested `compression_codec` mapping when it
    /// is present, otherwise from the format mapping itself. Both `format` and
    /// a present `compression_codec` must be JSON objects.
    pub fn from_config(format: &Value) -> DestinationResult<Self> {
        if !format.is_object() {
            return Err(DestinationError::invalid_field(
                "format",
                format!("expected an object, got {}", format),
            ));
        }

        let format_type = match optional_str(format, "format_type", "format.format_type")? {
            Some(value) => FormatType::parse(value)?,
            None => FormatType::Avro,
        };

        let codec = match present(format, "compression_codec") {
            Some(nested) if nested.is_object() => AvroCodec::from_config(nested)?,
            Some(nested) => {
                return Err(DestinationError::invalid_field(
                    "format.compression_codec",
                    format!("expected an object, got {}", nested),
                ))
            }
            None => AvroCodec::from_config(format)?,
        };
        let part_size_mb = resolve_part_size(format)?;

        debug!(
            format = format_type.name(),
            codec = %codec,
            part_size_mb,
            "Resolved format configuration"
        );

        Ok(Self {
            format_type,
            codec,
            part_size_mb,
        })
    }

    /// Output file format.
    pub fn format_type(&self) -> FormatType {
        self.format_type
    }

    /// Codec for the Avro data blocks.
    pub fn codec(&self) -> AvroCodec {
        self.codec
    }

    /// Resolved part size in megabytes.
    pub fn part_size_mb(&self) -> u32 {
        self.part_size_mb
    }

    /// Part size handed to the multipart uploader.
    pub fn part_size_bytes(&self) -> u64 {
        part_size_bytes(self.part_size_mb)
    }
}
