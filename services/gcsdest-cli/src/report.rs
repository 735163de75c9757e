//! JSON reports printed by the CLI.

use gcsdest_core::{
    AvroCodec, AvroFormatConfig, DestinationResult, DestinationSummary, GcsDestinationConfig,
    UploadSettings,
};
use serde::Serialize;

/// Resolved format block.
#[derive(Debug, Serialize)]
pub struct FormatReport {
    pub format_type: &'static str,
    pub codec: AvroCodec,
    pub codec_factory: String,
    pub part_size_mb: u32,
    pub part_size_bytes: u64,
}

impl From<&AvroFormatConfig> for FormatReport {
    fn from(format: &AvroFormatConfig) -> Self {
        Self {
            format_type: format.format_type().name(),
            codec: format.codec(),
            codec_factory: format.codec().to_string(),
            part_size_mb: format.part_size_mb(),
            part_size_bytes: format.part_size_bytes(),
        }
    }
}

/// Object key used by `check` when none is given.
pub fn default_object_key(config: &GcsDestinationConfig) -> String {
    let extension = config.format_config().format_type().file_extension();
    let prefix = config.bucket_path().trim_end_matches('/');
    if prefix.is_empty() {
        format!("check.{}", extension)
    } else {
        format!("{}/check.{}", prefix, extension)
    }
}

/// Full destination check result.
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub destination: DestinationSummary<'a>,
    pub format: FormatReport,
    pub upload: UploadSettings,
}

impl<'a> CheckReport<'a> {
    pub fn build(config: &'a GcsDestinationConfig, object_key: &str) -> DestinationResult<Self> {
        Ok(Self {
            destination: config.summary(),
            format: FormatReport::from(config.format_config()),
            upload: UploadSettings::for_destination(config, object_key)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_report() {
        let format = AvroFormatConfig::from_config(&json!({
            "compression_codec": { "codec": "deflate", "compression_level": 5 },
            "part_size_mb": 6
        }))
        .unwrap();

        let report = serde_json::to_value(FormatReport::from(&format)).unwrap();
        assert_eq!(report["format_type"], "AVRO");
        assert_eq!(report["codec"]["codec"], "deflate");
        assert_eq!(report["codec_factory"], "deflate-5");
        assert_eq!(report["part_size_bytes"], 6_291_456);
    }

    #[test]
    fn test_check_report_hides_secret() {
        let config = gcsdest_core::config::from_json_str(
            r#"{
                "gcs_bucket_name": "bucket",
                "gcs_bucket_path": "path",
                "credential": {
                    "credential_type": "HMAC_KEY",
                    "hmac_key_access_id": "id",
                    "hmac_key_secret": "do-not-print"
                },
                "format": { "format_type": "AVRO" }
            }"#,
        )
        .unwrap();

        let report = CheckReport::build(&config, "path/stream.avro").unwrap();
        let text = serde_json::to_string(&report).unwrap();

        assert!(!text.contains("do-not-print"));
        assert_eq!(default_object_key(&config), "path/check.avro");
        assert_eq!(report.upload.part_size_bytes(), 5_242_880);
        assert_eq!(report.upload.object_key(), "path/stream.avro");
    }
}
