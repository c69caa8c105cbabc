// nport2lake-core - Pure ingestion logic
//
// This crate contains the deterministic processing logic for N-PORT bulk
// ingestion: load-window expansion, partition-key derivation, and JSONL
// decoding. No I/O, no async, no shared state - every function only reads
// its input and returns a new value, so concurrent callers need no
// coordination.

pub mod jsonl;
pub mod period;
pub mod record;

// Re-export commonly used types
pub use jsonl::{decode_jsonl_gz, DecodeError, DecodedBatch};
pub use period::{InvalidRange, LoadRequest, Period};
pub use record::{annotate_partition_date, ReportingPeriod, AS_AT_DATE_FIELD};
