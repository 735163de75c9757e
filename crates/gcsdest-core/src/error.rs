use thiserror::Error;

/// Canonical error type for destination configuration parsing.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// The `codec` value is not one of the supported Avro codecs.
    #[error("invalid codec `{codec}`")]
    InvalidCodec {
        /// Raw value supplied by the user.
        codec: String,
    },

    /// `part_size_mb` is present but not a positive integer.
    #[error("invalid part_size_mb `{value}`: expected a positive integer")]
    InvalidPartSize {
        /// Raw value supplied by the user, rendered as JSON.
        value: String,
    },

    /// A required field is absent.
    #[error("missing required field `{field}`")]
    MissingField {
        /// Dotted path of the missing field.
        field: &'static str,
    },

    /// A field is present but has the wrong type or an unusable value.
    #[error("invalid field `{field}`: {message}")]
    InvalidField {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// The format block names a format other than Avro.
    #[error("unsupported format type `{format_type}`")]
    UnsupportedFormat {
        /// Raw `format_type` value.
        format_type: String,
    },

    /// The credential block names a credential type other than an HMAC key.
    #[error("unsupported credential type `{credential_type}`")]
    UnsupportedCredential {
        /// Raw `credential_type` value.
        credential_type: String,
    },

    /// The part size in bytes is outside what the multipart uploader accepts.
    #[error("part size {part_size_bytes} bytes is outside [{min_bytes}, {max_bytes}]")]
    PartSizeOutOfBounds {
        /// Requested part size.
        part_size_bytes: u64,
        /// Smallest accepted part size.
        min_bytes: u64,
        /// Largest accepted part size.
        max_bytes: u64,
    },

    /// Layered configuration could not be read.
    #[error("configuration load error: {0}")]
    Load(#[from] config::ConfigError),

    /// Inline JSON document could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DestinationError {
    /// Creates an `InvalidCodec` variant.
    #[must_use]
    pub fn invalid_codec(codec: impl Into<String>) -> Self {
        Self::InvalidCodec {
            codec: codec.into(),
        }
    }

    /// Creates an `InvalidField` variant.
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }
}

/// Convenient result alias for destination configuration operations.
pub type DestinationResult<T> = Result<T, DestinationError>;
