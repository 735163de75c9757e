//! Destination configuration for writing Avro files to a GCS bucket.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{DestinationError, DestinationResult};
use crate::fields::{optional_str, required_object, required_str};
use crate::format::AvroFormatConfig;

/// S3-compatible interoperability endpoint of Google Cloud Storage.
pub const GCS_ENDPOINT: &str = "https://storage.googleapis.com";

/// HMAC key credential for the GCS interoperability API.
#[derive(Clone, PartialEq, Eq)]
pub struct HmacKeyCredential {
    access_id: String,
    secret: String,
}

impl HmacKeyCredential {
    pub fn new(access_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_id: access_id.into(),
            secret: secret.into(),
        }
    }

    fn from_config(credential: &Value) -> DestinationResult<Self> {
        let credential_type =
            required_str(credential, "credential_type", "credential.credential_type")?;
        if !credential_type.eq_ignore_ascii_case("HMAC_KEY") {
            return Err(DestinationError::UnsupportedCredential {
                credential_type: credential_type.to_string(),
            });
        }

        Ok(Self::new(
            required_str(credential, "hmac_key_access_id", "credential.hmac_key_access_id")?,
            required_str(credential, "hmac_key_secret", "credential.hmac_key_secret")?,
        ))
    }

    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for HmacKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacKeyCredential")
            .field("access_id", &self.access_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Parsed destination configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcsDestinationConfig {
    bucket_name: String,
    bucket_path: String,
    bucket_region: String,
    credential: HmacKeyCredential,
    format: AvroFormatConfig,
}

impl GcsDestinationConfig {
    /// Parse a full destination document.
    ///
    /// # Errors
    ///
    /// - `MissingField` / `InvalidField` for absent or mistyped bucket,
    ///   credential and format fields (`credential` and `format` must be
    ///   objects)
    /// - `UnsupportedCredential` unless the credential is an HMAC key
    /// - any error of [`AvroFormatConfig::from_config`]
    pub fn from_config(config: &Value) -> DestinationResult<Self> {
        let bucket_name = required_str(config, "gcs_bucket_name", "gcs_bucket_name")?;
        let bucket_path = required_str(config, "gcs_bucket_path", "gcs_bucket_path")?;
        let bucket_region =
            optional_str(config, "gcs_bucket_region", "gcs_bucket_region")?.unwrap_or_default();

        let credential = required_object(config, "credential", "credential")
            .and_then(HmacKeyCredential::from_config)?;
        let format =
            required_object(config, "format", "format").and_then(AvroFormatConfig::from_config)?;

        debug!(
            bucket = bucket_name,
            path = bucket_path,
            region = bucket_region,
            "Parsed GCS destination configuration"
        );

        Ok(Self {
            bucket_name: bucket_name.to_string(),
            bucket_path: bucket_path.to_string(),
            bucket_region: bucket_region.to_string(),
            credential,
            format,
        })
    }

    /// Bucket the Avro files are written to.
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Key prefix inside the bucket.
    pub fn bucket_path(&self) -> &str {
        &self.bucket_path
    }

    pub fn bucket_region(&self) -> &str {
        &self.bucket_region
    }

    pub fn credential(&self) -> &HmacKeyCredential {
        &self.credential
    }

    /// Resolved format block.
    pub fn format_config(&self) -> &AvroFormatConfig {
        &self.format
    }

    /// Settings for an S3-compatible client pointed at this bucket.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: GCS_ENDPOINT.to_string(),
            region: self.bucket_region.clone(),
            access_key: self.credential.access_id.clone(),
            secret_key: self.credential.secret.clone(),
            bucket: self.bucket_name.clone(),
        }
    }

    /// Serializable view with the credential secret omitted.
    pub fn summary(&self) -> DestinationSummary<'_> {
        DestinationSummary {
            bucket_name: &self.bucket_name,
            bucket_path: &self.bucket_path,
            bucket_region: &self.bucket_region,
            access_id: &self.credential.access_id,
            format: &self.format,
            part_size_bytes: self.format.part_size_bytes(),
        }
    }
}

/// S3-compatible client settings
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Endpoint URL
    pub endpoint: String,
    /// Bucket region (may be empty)
    pub region: String,
    /// Access key ID
    pub access_key: String,
    /// Secret access key
    pub secret_key: String,
    /// Bucket name
    pub bucket: String,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct DestinationSummary<'a> {
    pub bucket_name: &'a str,
    pub bucket_path: &'a str,
    pub bucket_region: &'a str,
    pub access_id: &'a str,
    pub format: &'a AvroFormatConfig,
    pub part_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AvroCodec;
    use serde_json::json;

    fn base_config() -> Value {
        json!({
            "gcs_bucket_name": "test-bucket-name",
            "gcs_bucket_path": "test_path",
            "gcs_bucket_region": "us-west1",
            "credential": {
                "credential_type": "HMAC_KEY",
                "hmac_key_access_id": "test_access_id",
                "hmac_key_secret": "test_secret"
            },
            "format": {
                "format_type": "AVRO",
                "compression_codec": { "codec": "deflate", "compression_level": 5 }
            }
        })
    }

    #[test]
    fn test_parse_full_document() {
        let config = GcsDestinationConfig::from_config(&base_config()).unwrap();

        assert_eq!(config.bucket_name(), "test-bucket-name");
        assert_eq!(config.bucket_path(), "test_path");
        assert_eq!(config.bucket_region(), "us-west1");
        assert_eq!(config.credential().access_id(), "test_access_id");
        assert_eq!(config.credential().secret(), "test_secret");
        assert_eq!(
            config.format_config().codec(),
            AvroCodec::Deflate {
                compression_level: 5
            }
        );
        assert_eq!(config.format_config().part_size_mb(), 5);
    }

    #[test]
    fn test_region_is_optional() {
        let mut doc = base_config();
        doc.as_object_mut().unwrap().remove("gcs_bucket_region");

        let config = GcsDestinationConfig::from_config(&doc).unwrap();
        assert_eq!(config.bucket_region(), "");
    }

    #[test]
    fn test_missing_fields() {
        for field in ["gcs_bucket_name", "gcs_bucket_path", "credential", "format"] {
            let mut doc = base_config();
            doc.as_object_mut().unwrap().remove(field);

            let err = GcsDestinationConfig::from_config(&doc).unwrap_err();
            assert!(
                matches!(err, DestinationError::MissingField { field: f } if f == field),
                "unexpected error for {}: {}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_non_object_blocks_are_rejected() {
        for field in ["credential", "format"] {
            let mut doc = base_config();
            doc[field] = json!("CSV");

            let err = GcsDestinationConfig::from_config(&doc).unwrap_err();
            assert!(
                matches!(err, DestinationError::InvalidField { field: f, .. } if f == field),
                "unexpected error for {}: {}",
                field,
                err
            );
        }
    }

    #[test]
    fn test_unsupported_credential() {
        let mut doc = base_config();
        doc["credential"]["credential_type"] = json!("SERVICE_ACCOUNT");

        let err = GcsDestinationConfig::from_config(&doc).unwrap_err();
        assert!(matches!(err, DestinationError::UnsupportedCredential { .. }));
    }

    #[test]
    fn test_secret_is_redacted() {
        let config = GcsDestinationConfig::from_config(&base_config()).unwrap();

        assert!(!format!("{:?}", config).contains("test_secret"));
        assert!(!format!("{:?}", config.client_settings()).contains("test_secret"));

        let summary = serde_json::to_string(&config.summary()).unwrap();
        assert!(!summary.contains("test_secret"));
        assert!(summary.contains("\"part_size_bytes\":5242880"));
    }

    #[test]
    fn test_client_settings() {
        let settings = GcsDestinationConfig::from_config(&base_config())
            .unwrap()
            .client_settings();

        assert_eq!(settings.endpoint, GCS_ENDPOINT);
        assert_eq!(settings.region, "us-west1");
        assert_eq!(settings.access_key, "test_access_id");
        assert_eq!(settings.secret_key, "test_secret");
        assert_eq!(settings.bucket, "test-bucket-name");
    }
}
