//! Hive-style partition path generation.
//!
//! Staged objects live at:
//! `{dataset}/_as_at_date={YYYY-MM-DD}/{year}-{month:02}-{seq:04}.jsonl`
//!
//! Records with no derivable reporting-period date share the sentinel
//! partition Hive itself uses for null keys, keeping them queryable instead
//! of silently dropped.

use nport2lake_core::Period;

/// Partition value for records whose reporting-period date is absent.
pub const NULL_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// Build the staging object key for one partition of one period.
pub fn staging_path(dataset: &str, as_at_date: Option<&str>, period: Period, seq: usize) -> String {
    let value = match as_at_date {
        Some(date) => sanitize_partition_value(date),
        None => NULL_PARTITION.to_string(),
    };
    format!("{dataset}/_as_at_date={value}/{period}-{seq:04}.jsonl")
}

/// Replace characters that are unsafe in object keys. The upstream dates are
/// plain `YYYY-MM-DD`, but the source data is untyped and a hostile value
/// must not escape its partition directory.
fn sanitize_partition_value(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period() -> Period {
        Period::new(2024, 10).unwrap()
    }

    #[test]
    fn test_staging_path_format() {
        assert_eq!(
            staging_path("nport_bronze", Some("2024-10-31"), period(), 0),
            "nport_bronze/_as_at_date=2024-10-31/2024-10-0000.jsonl"
        );
    }

    #[test]
    fn test_null_partition() {
        assert_eq!(
            staging_path("nport_bronze", None, period(), 3),
            "nport_bronze/_as_at_date=__HIVE_DEFAULT_PARTITION__/2024-10-0003.jsonl"
        );
    }

    #[test]
    fn test_partition_value_sanitized() {
        assert_eq!(
            staging_path("nport_bronze", Some("../escape"), period(), 0),
            "nport_bronze/_as_at_date=___escape/2024-10-0000.jsonl"
        );
        assert_eq!(sanitize_partition_value("2024-10-31"), "2024-10-31");
        assert_eq!(sanitize_partition_value("a/b c"), "a_b_c");
    }
}
