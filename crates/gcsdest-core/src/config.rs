//! Layered loading of the destination configuration document.
//!
//! Sources, lowest to highest precedence:
//! 1. The given file (JSON, YAML or TOML, picked by extension)
//! 2. Environment variables prefixed `GCSDEST`, `__` as the nesting separator
//!    (e.g. `GCSDEST_FORMAT__PART_SIZE_MB=8`)
//!
//! Environment values arrive as strings. Only the integer and boolean fields
//! of the format block are converted; every other override stays a string, so
//! secrets such as `0123456789` keep their exact text.

use std::path::Path;

use config::{Config, Environment, File};
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::destination::GcsDestinationConfig;
use crate::error::DestinationResult;

/// Prefix of environment variable overrides.
pub const ENV_PREFIX: &str = "GCSDEST";

/// Load and parse a destination configuration from `path` plus environment
/// overrides.
pub fn load<P: AsRef<Path>>(path: P) -> DestinationResult<GcsDestinationConfig> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env<P: AsRef<Path>>(
    path: P,
    env: Environment,
) -> DestinationResult<GcsDestinationConfig> {
    let path = path.as_ref();

    let mut document: Value = Config::builder()
        .add_source(File::from(path))
        .build()?
        .try_deserialize()?;

    let overrides: Value = Config::builder()
        .add_source(env.prefix_separator("_").separator("__"))
        .build()?
        .try_deserialize()?;
    apply_overrides(&mut document, overrides);

    let config = GcsDestinationConfig::from_config(&document)?;
    info!(
        path = %path.display(),
        bucket = config.bucket_name(),
        "Loaded destination configuration"
    );
    Ok(config)
}

/// Merge environment overrides into `document`, typing leaf values by key.
fn apply_overrides(document: &mut Value, overrides: Value) {
    let Value::Object(overrides) = overrides else {
        return;
    };
    if !document.is_object() {
        *document = Value::Object(Map::new());
    }
    let Some(target) = document.as_object_mut() else {
        return;
    };

    for (key, value) in overrides {
        match value {
            Value::Object(_) => {
                let entry = target
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                apply_overrides(entry, value);
            }
            Value::String(text) => {
                debug!(key = %key, "Applying environment override");
                let typed = typed_override(&key, text);
                target.insert(key, typed);
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}

// Unparseable values stay strings so the resolvers reject them.
fn typed_override(key: &str, text: String) -> Value {
    match key {
        "part_size_mb" | "compression_level" => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(text)),
        "include_checksum" => text
            .trim()
            .parse::<bool>()
            .map(Value::Bool)
            .unwrap_or(Value::String(text)),
        _ => Value::String(text),
    }
}

/// Parse a destination configuration from an inline JSON document.
pub fn from_json_str(text: &str) -> DestinationResult<GcsDestinationConfig> {
    let document: Value = serde_json::from_str(text)?;
    GcsDestinationConfig::from_config(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::AvroCodec;
    use crate::error::DestinationError;
    use std::io::Write;

    const DOCUMENT: &str = r#"{
        "gcs_bucket_name": "bucket",
        "gcs_bucket_path": "path",
        "credential": {
            "credential_type": "HMAC_KEY",
            "hmac_key_access_id": "id",
            "hmac_key_secret": "secret"
        },
        "format": {
            "format_type": "AVRO",
            "compression_codec": { "codec": "zstandard", "compression_level": 20, "include_checksum": true },
            "part_size_mb": 6
        }
    }"#;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    // Isolated environment source so tests do not race on process env.
    fn env_source(vars: &[(&str, &str)]) -> Environment {
        let source: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    #[test]
    fn test_load_from_file() {
        let file = write_json(DOCUMENT);
        let config = load_with_env(file.path(), env_source(&[])).unwrap();

        assert_eq!(config.bucket_name(), "bucket");
        assert_eq!(
            config.format_config().codec(),
            AvroCodec::Zstandard {
                compression_level: 20,
                include_checksum: true
            }
        );
        assert_eq!(config.format_config().part_size_bytes(), 6_291_456);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_json(DOCUMENT);
        let config = load_with_env(
            file.path(),
            env_source(&[("GCSDEST_FORMAT__PART_SIZE_MB", "8")]),
        )
        .unwrap();

        assert_eq!(config.format_config().part_size_mb(), 8);
    }

    #[test]
    fn test_env_string_fields_keep_their_text() {
        let file = write_json(DOCUMENT);
        let config = load_with_env(
            file.path(),
            env_source(&[
                ("GCSDEST_CREDENTIAL__HMAC_KEY_SECRET", "0123456789"),
                ("GCSDEST_CREDENTIAL__HMAC_KEY_ACCESS_ID", "true"),
                ("GCSDEST_GCS_BUCKET_NAME", "42"),
            ]),
        )
        .unwrap();

        assert_eq!(config.credential().secret(), "0123456789");
        assert_eq!(config.credential().access_id(), "true");
        assert_eq!(config.bucket_name(), "42");
    }

    #[test]
    fn test_env_codec_overrides_are_typed() {
        let file = write_json(DOCUMENT);
        let config = load_with_env(
            file.path(),
            env_source(&[
                ("GCSDEST_FORMAT__COMPRESSION_CODEC__COMPRESSION_LEVEL", "7"),
                ("GCSDEST_FORMAT__COMPRESSION_CODEC__INCLUDE_CHECKSUM", "false"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.format_config().codec(),
            AvroCodec::Zstandard {
                compression_level: 7,
                include_checksum: false
            }
        );
    }

    #[test]
    fn test_env_malformed_part_size_is_rejected() {
        let file = write_json(DOCUMENT);
        let err = load_with_env(
            file.path(),
            env_source(&[("GCSDEST_FORMAT__PART_SIZE_MB", "six")]),
        )
        .unwrap_err();

        assert!(matches!(err, DestinationError::InvalidPartSize { .. }));
    }

    #[test]
    fn test_typed_override() {
        assert_eq!(typed_override("part_size_mb", "8".to_string()), Value::from(8));
        assert_eq!(
            typed_override("include_checksum", "true".to_string()),
            Value::Bool(true)
        );
        assert_eq!(
            typed_override("hmac_key_secret", "007".to_string()),
            Value::String("007".to_string())
        );
        assert_eq!(
            typed_override("compression_level", "high".to_string()),
            Value::String("high".to_string())
        );
    }

    #[test]
    fn test_missing_file() {
        let err = load_with_env("/nonexistent/gcsdest.json", env_source(&[])).unwrap_err();
        assert!(matches!(err, DestinationError::Load(_)));
    }

    #[test]
    fn test_from_json_str() {
        let config = from_json_str(DOCUMENT).unwrap();
        assert_eq!(config.bucket_path(), "path");

        assert!(matches!(
            from_json_str("{ broken"),
            Err(DestinationError::Json(_))
        ));
    }
}
