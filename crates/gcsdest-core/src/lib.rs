//! Configuration translation for a destination that writes Avro files to
//! Google Cloud Storage through its S3-compatible API.

pub mod codec;
pub mod config;
pub mod destination;
pub mod error;
mod fields;
pub mod format;
pub mod upload;

pub use codec::AvroCodec;
pub use destination::{ClientSettings, DestinationSummary, GcsDestinationConfig, HmacKeyCredential};
pub use error::{DestinationError, DestinationResult};
pub use format::{part_size_bytes, resolve_part_size, AvroFormatConfig, FormatType};
pub use upload::UploadSettings;
