//! Multipart upload settings derived from the destination configuration.

use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::destination::GcsDestinationConfig;
use crate::error::{DestinationError, DestinationResult};

/// Smallest part accepted by S3-compatible multipart uploads (5 MiB).
pub const MIN_PART_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Largest part accepted by S3-compatible multipart uploads (5 GiB).
pub const MAX_PART_SIZE_BYTES: u64 = 5 * 1024 * 1024 * 1024;

/// Concurrent writer streams per object.
pub const DEFAULT_NUM_STREAMS: usize = 1;
/// Threads uploading finished parts.
pub const DEFAULT_UPLOAD_THREADS: usize = 10;
/// Finished parts buffered ahead of the upload threads.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Settings for streaming one object to the bucket in parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadSettings {
    bucket: String,
    object_key: String,
    part_size_bytes: u64,
    num_streams: usize,
    num_upload_threads: usize,
    queue_capacity: usize,
}

impl UploadSettings {
    /// Create settings with the default stream, thread and queue counts.
    ///
    /// Fails with `PartSizeOutOfBounds` when `part_size_bytes` is outside
    /// [`MIN_PART_SIZE_BYTES`, `MAX_PART_SIZE_BYTES`].
    pub fn new(
        bucket: impl Into<String>,
        object_key: impl Into<String>,
        part_size_bytes: u64,
    ) -> DestinationResult<Self> {
        if !(MIN_PART_SIZE_BYTES..=MAX_PART_SIZE_BYTES).contains(&part_size_bytes) {
            return Err(DestinationError::PartSizeOutOfBounds {
                part_size_bytes,
                min_bytes: MIN_PART_SIZE_BYTES,
                max_bytes: MAX_PART_SIZE_BYTES,
            });
        }

        Ok(Self {
            bucket: bucket.into(),
            object_key: object_key.into(),
            part_size_bytes,
            num_streams: DEFAULT_NUM_STREAMS,
            num_upload_threads: DEFAULT_UPLOAD_THREADS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        })
    }

    /// Default settings for uploading `object_key` to the configured bucket.
    pub fn for_destination(
        config: &GcsDestinationConfig,
        object_key: impl Into<String>,
    ) -> DestinationResult<Self> {
        let settings = Self::new(
            config.bucket_name(),
            object_key,
            config.format_config().part_size_bytes(),
        )?;

        debug!(
            bucket = %settings.bucket,
            object_key = %settings.object_key,
            part_size_bytes = settings.part_size_bytes,
            "Prepared multipart upload settings"
        );

        Ok(settings)
    }

    /// Override the stream count. Zero fails with `InvalidField`.
    pub fn with_num_streams(mut self, num_streams: usize) -> DestinationResult<Self> {
        self.num_streams = non_zero("num_streams", num_streams)?;
        Ok(self)
    }

    /// Override the upload thread count. Zero fails with `InvalidField`.
    pub fn with_upload_threads(mut self, num_upload_threads: usize) -> DestinationResult<Self> {
        self.num_upload_threads = non_zero("num_upload_threads", num_upload_threads)?;
        Ok(self)
    }

    /// Override the part queue capacity. Zero fails with `InvalidField`.
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> DestinationResult<Self> {
        self.queue_capacity = non_zero("queue_capacity", queue_capacity)?;
        Ok(self)
    }

    /// Target bucket.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Key of the object being written.
    pub fn object_key(&self) -> &str {
        &self.object_key
    }

    /// Size of every part except possibly the last.
    pub fn part_size_bytes(&self) -> u64 {
        self.part_size_bytes
    }

    /// Concurrent writer streams.
    pub fn num_streams(&self) -> usize {
        self.num_streams
    }

    /// Upload thread count.
    pub fn num_upload_threads(&self) -> usize {
        self.num_upload_threads
    }

    /// Part queue capacity.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Split a payload into consecutive parts of `part_size_bytes`.
    ///
    /// The last part may be shorter; an empty payload has no parts.
    pub fn split_parts(&self, payload: Bytes) -> Vec<Bytes> {
        // Bounded by MAX_PART_SIZE_BYTES, which fits in usize on 64-bit targets.
        let part_size = usize::try_from(self.part_size_bytes).unwrap_or(usize::MAX);

        let mut parts = Vec::with_capacity(payload.len().div_ceil(part_size));
        let mut offset = 0;
        while offset < payload.len() {
            let end = offset.saturating_add(part_size).min(payload.len());
            parts.push(payload.slice(offset..end));
            offset = end;
        }
        parts
    }
}

fn non_zero(field: &'static str, value: usize) -> DestinationResult<usize> {
    if value == 0 {
        return Err(DestinationError::invalid_field(field, "must be > 0"));
    }
    Ok(value)
}
