//! Partition-key derivation for filing records.
//!
//! Each decoded filing carries a reporting-period end date (the as-of date of
//! the portfolio snapshot). That date becomes the `_as_at_date` partition
//! column driving storage layout and pruning downstream. The filing-submission
//! date (`filedAt`) is a different date and is never a substitute: using it
//! would assign the record to the wrong partition.

use chrono::NaiveDate;
use serde_json::Value;
use tracing::warn;

/// Field written onto every staged record to drive storage partitioning.
pub const AS_AT_DATE_FIELD: &str = "_as_at_date";

/// Object holding the nested fallback location of the reporting-period date.
pub const GEN_INFO_FIELD: &str = "genInfo";

/// Candidate names for the reporting-period date, in priority order.
///
/// Upstream documentation spells this field inconsistently (`repPdDate` in
/// the bulk schema pages, `repPdEnd` elsewhere); the alternate spelling goes
/// here once confirmed against the live schema.
pub const REPORTING_PERIOD_FIELDS: &[&str] = &["repPdDate"];

/// Where (if anywhere) a record's reporting-period date was found.
///
/// All three lookup outcomes are represented explicitly so callers handle
/// them exhaustively instead of probing nested maps ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportingPeriod {
    /// Found at the top level of the record.
    TopLevel(String),
    /// Found nested under `genInfo`.
    Nested(String),
    /// Neither location carries a non-empty value.
    Absent,
}

impl ReportingPeriod {
    /// Locate the reporting-period date in a record.
    ///
    /// Total over arbitrary JSON and never panics. The top-level field wins
    /// regardless of any nested value; empty and whitespace-only strings
    /// count as absent.
    pub fn locate(record: &Value) -> Self {
        for name in REPORTING_PERIOD_FIELDS {
            if let Some(value) = non_empty_str(record.get(*name)) {
                return Self::TopLevel(value.to_string());
            }
        }
        for name in REPORTING_PERIOD_FIELDS {
            let nested = record.get(GEN_INFO_FIELD).and_then(|info| info.get(*name));
            if let Some(value) = non_empty_str(nested) {
                return Self::Nested(value.to_string());
            }
        }
        Self::Absent
    }

    /// The located date string, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::TopLevel(value) | Self::Nested(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Typed view of the located value.
    ///
    /// The upstream emits `YYYY-MM-DD`; anything else degrades to `None`
    /// rather than an error.
    pub fn as_date(&self) -> Option<NaiveDate> {
        self.value()
            .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Derive the partition key and attach it to the record as `_as_at_date`.
///
/// Never fails: a record with no usable reporting-period date is annotated
/// with JSON `null`, reported with a warning, and surfaced to the caller as
/// [`ReportingPeriod::Absent`] so the batch can proceed. Derivation only
/// reads the original source fields; any pre-existing annotation is ignored
/// and overwritten, so a second pass yields the same result as the first.
pub fn annotate_partition_date(record: &mut Value) -> ReportingPeriod {
    let located = ReportingPeriod::locate(record);

    let annotation = match located.value() {
        Some(value) => Value::String(value.to_string()),
        None => {
            let accession = record
                .get("accessionNo")
                .and_then(Value::as_str)
                .unwrap_or("UNKNOWN");
            warn!(
                accession_no = accession,
                "no reporting-period date found; partition key left null"
            );
            Value::Null
        }
    };

    if let Some(fields) = record.as_object_mut() {
        fields.insert(AS_AT_DATE_FIELD.to_string(), annotation);
    }

    located
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_top_level_wins_over_nested() {
        let record = json!({
            "repPdDate": "2024-10-31",
            "genInfo": { "repPdDate": "2024-09-30" },
        });
        assert_eq!(
            ReportingPeriod::locate(&record),
            ReportingPeriod::TopLevel("2024-10-31".to_string())
        );
    }

    #[test]
    fn test_nested_fallback() {
        let record = json!({
            "accessionNo": "0001752724-24-000001",
            "genInfo": { "repPdDate": "2024-10-31" },
        });
        assert_eq!(
            ReportingPeriod::locate(&record),
            ReportingPeriod::Nested("2024-10-31".to_string())
        );
    }

    #[test]
    fn test_empty_top_level_falls_through() {
        let record = json!({
            "repPdDate": "",
            "genInfo": { "repPdDate": "2024-10-31" },
        });
        assert_eq!(
            ReportingPeriod::locate(&record),
            ReportingPeriod::Nested("2024-10-31".to_string())
        );
    }

    #[test]
    fn test_absent_everywhere() {
        assert_eq!(
            ReportingPeriod::locate(&json!({ "accessionNo": "x" })),
            ReportingPeriod::Absent
        );
        // Non-object records are handled too, not panicked on.
        assert_eq!(ReportingPeriod::locate(&json!(42)), ReportingPeriod::Absent);
        assert_eq!(ReportingPeriod::locate(&Value::Null), ReportingPeriod::Absent);
    }

    #[test]
    fn test_filed_at_is_never_a_substitute() {
        let record = json!({
            "accessionNo": "0001752724-24-000002",
            "filedAt": "2024-11-04T12:00:00Z",
        });
        assert_eq!(ReportingPeriod::locate(&record), ReportingPeriod::Absent);
    }

    #[test]
    fn test_annotate_sets_field() {
        let mut record = json!({ "repPdDate": "2024-10-31" });
        let located = annotate_partition_date(&mut record);
        assert_eq!(located.value(), Some("2024-10-31"));
        assert_eq!(record[AS_AT_DATE_FIELD], json!("2024-10-31"));
    }

    #[test]
    fn test_annotate_missing_sets_null() {
        let mut record = json!({ "accessionNo": "x", "filedAt": "2024-11-04" });
        let located = annotate_partition_date(&mut record);
        assert_eq!(located, ReportingPeriod::Absent);
        assert_eq!(record[AS_AT_DATE_FIELD], Value::Null);
    }

    #[test]
    fn test_annotate_is_idempotent() {
        let mut record = json!({
            "repPdDate": "2024-10-31",
            "genInfo": { "repPdDate": "2024-09-30" },
        });
        let first = annotate_partition_date(&mut record);
        let after_first = record.clone();
        let second = annotate_partition_date(&mut record);
        assert_eq!(first, second);
        assert_eq!(record, after_first);
    }

    #[test]
    fn test_annotate_ignores_prior_annotation() {
        // A stale annotation must not shadow the source fields.
        let mut record = json!({
            "_as_at_date": "1999-01-01",
            "genInfo": { "repPdDate": "2024-10-31" },
        });
        let located = annotate_partition_date(&mut record);
        assert_eq!(located.value(), Some("2024-10-31"));
        assert_eq!(record[AS_AT_DATE_FIELD], json!("2024-10-31"));
    }

    #[test]
    fn test_as_date_parses_iso_dates_only() {
        let period = ReportingPeriod::TopLevel("2024-10-31".to_string());
        assert_eq!(
            period.as_date(),
            NaiveDate::from_ymd_opt(2024, 10, 31)
        );
        let garbage = ReportingPeriod::TopLevel("10/31/2024".to_string());
        assert_eq!(garbage.as_date(), None);
        assert_eq!(ReportingPeriod::Absent.as_date(), None);
    }
}
