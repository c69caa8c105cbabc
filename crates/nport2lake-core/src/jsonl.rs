//! Decoding of the SEC bulk `.jsonl.gz` payloads.
//!
//! One JSON object per line. Individual malformed lines are skipped and
//! counted rather than failing the batch; a corrupt gzip stream or non-UTF-8
//! payload is a hard error.

use flate2::read::GzDecoder;
use serde_json::Value;
use std::io::Read;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("gzip decompression failed: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("decompressed payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Records decoded from one bulk file, with the count of lines that failed
/// JSON parsing and were skipped.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    pub records: Vec<Value>,
    pub skipped_lines: usize,
}

/// Decompress and parse a gzip-compressed JSONL payload.
pub fn decode_jsonl_gz(compressed: &[u8]) -> Result<DecodedBatch, DecodeError> {
    let mut decompressed = Vec::new();
    GzDecoder::new(compressed).read_to_end(&mut decompressed)?;
    let text = String::from_utf8(decompressed)?;

    let mut batch = DecodedBatch::default();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(line) {
            Ok(record) => batch.records.push(record),
            Err(err) => {
                warn!(line = index + 1, error = %err, "skipping malformed JSONL line");
                batch.skipped_lines += 1;
            }
        }
    }
    Ok(batch)
}
