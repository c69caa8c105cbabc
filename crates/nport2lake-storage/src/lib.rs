// nport2lake-storage - Partitioned bronze staging
//
// Staged objects are line-delimited JSON, one object per `_as_at_date`
// partition per period, on an OpenDAL backend (local filesystem or any
// S3-compatible store). Downstream warehouse loaders pick partitions up by
// Hive-style path pruning.

mod operator;
pub mod partition;

pub use operator::init_operator;

use anyhow::{Context, Result};
use nport2lake_core::{Period, AS_AT_DATE_FIELD};
use opendal::Operator;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Outcome of staging one period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub files: usize,
    pub records: usize,
    /// Records that landed in the sentinel partition for lack of a
    /// reporting-period date. Counted, never dropped.
    pub missing_partition_key: usize,
}

pub struct StagingWriter {
    operator: Operator,
    dataset: String,
}

impl StagingWriter {
    pub fn new(operator: Operator, dataset: impl Into<String>) -> Self {
        Self {
            operator,
            dataset: dataset.into(),
        }
    }

    /// Stage one period's annotated records.
    ///
    /// Records are grouped by their `_as_at_date` annotation; each group is
    /// written as one JSONL object under its Hive partition. Records whose
    /// annotation is null or missing go to the sentinel partition.
    pub async fn write_period(&self, period: Period, records: &[Value]) -> Result<StageSummary> {
        let mut groups: BTreeMap<Option<String>, Vec<&Value>> = BTreeMap::new();
        for record in records {
            let key = record
                .get(AS_AT_DATE_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string);
            groups.entry(key).or_default().push(record);
        }

        let mut summary = StageSummary::default();
        for (seq, (key, group)) in groups.iter().enumerate() {
            let path = partition::staging_path(&self.dataset, key.as_deref(), period, seq);

            let mut body = Vec::new();
            for record in group {
                serde_json::to_writer(&mut body, record)
                    .context("serializing record for staging")?;
                body.push(b'\n');
            }

            self.operator
                .write(&path, body)
                .await
                .with_context(|| format!("writing staging object {path}"))?;
            debug!(%path, records = group.len(), "wrote staging object");

            summary.files += 1;
            summary.records += group.len();
            if key.is_none() {
                summary.missing_partition_key += group.len();
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nport2lake_core::annotate_partition_date;
    use serde_json::json;

    fn memory_writer() -> (Operator, StagingWriter) {
        let op = Operator::new(opendal::services::Memory::default())
            .unwrap()
            .finish();
        (op.clone(), StagingWriter::new(op, "nport_bronze"))
    }

    #[tokio::test]
    async fn test_groups_records_by_partition() {
        let (op, writer) = memory_writer();
        let mut records = vec![
            json!({"accessionNo": "a", "repPdDate": "2024-10-31"}),
            json!({"accessionNo": "b", "repPdDate": "2024-09-30"}),
            json!({"accessionNo": "c", "repPdDate": "2024-10-31"}),
        ];
        for record in &mut records {
            annotate_partition_date(record);
        }

        let period = Period::new(2024, 10).unwrap();
        let summary = writer.write_period(period, &records).await.unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.missing_partition_key, 0);

        let body = op
            .read("nport_bronze/_as_at_date=2024-10-31/2024-10-0001.jsonl")
            .await
            .unwrap()
            .to_vec();
        let text = String::from_utf8(body).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains(r#""accessionNo":"a""#));
        assert!(text.contains(r#""accessionNo":"c""#));
    }

    #[tokio::test]
    async fn test_missing_key_records_go_to_sentinel_partition() {
        let (op, writer) = memory_writer();
        let mut records = vec![
            json!({"accessionNo": "a", "repPdDate": "2024-10-31"}),
            json!({"accessionNo": "b", "filedAt": "2024-11-04"}),
        ];
        for record in &mut records {
            annotate_partition_date(record);
        }

        let period = Period::new(2024, 10).unwrap();
        let summary = writer.write_period(period, &records).await.unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.missing_partition_key, 1);

        // None sorts before Some, so the sentinel group takes seq 0.
        let body = op
            .read("nport_bronze/_as_at_date=__HIVE_DEFAULT_PARTITION__/2024-10-0000.jsonl")
            .await
            .unwrap()
            .to_vec();
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains(r#""accessionNo":"b""#));
    }

    #[tokio::test]
    async fn test_empty_period_writes_nothing() {
        let (_op, writer) = memory_writer();
        let period = Period::new(2024, 10).unwrap();
        let summary = writer.write_period(period, &[]).await.unwrap();
        assert_eq!(summary, StageSummary::default());
    }
}
