//! Structural quality scoring for raw batches
//!
//! A record counts as valid when it is a non-empty JSON object. The
//! issue list is capped so a bad thousand-row batch does not blow up
//! the report; the full count survives in `total_issues`.

use crate::types::RawRecord;
use serde::Serialize;
use serde_json::Value;

/// Issue entries kept verbatim in a report.
pub const MAX_REPORTED_ISSUES: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub total_records: usize,
    pub valid_records: usize,
    /// `valid / total`, 0.0 for an empty batch.
    pub quality_score: f64,
    /// True when the batch is non-empty and structurally clean.
    pub valid: bool,
    /// First [`MAX_REPORTED_ISSUES`] issues, human-readable.
    pub issues: Vec<String>,
    /// Full issue count, including entries dropped by the cap.
    pub total_issues: usize,
}

/// Score a raw batch for structural validity.
pub fn evaluate_quality(batch: &[RawRecord]) -> QualityReport {
    if batch.is_empty() {
        return QualityReport {
            total_records: 0,
            valid_records: 0,
            quality_score: 0.0,
            valid: false,
            issues: vec!["no data: batch is empty".to_string()],
            total_issues: 1,
        };
    }

    let mut valid_records = 0;
    let mut issues = Vec::new();
    let mut total_issues = 0;

    for (index, record) in batch.iter().enumerate() {
        let problem = match record {
            Value::Object(map) if map.is_empty() => Some("empty object"),
            Value::Object(_) => None,
            _ => Some("not a structured object"),
        };

        match problem {
            None => valid_records += 1,
            Some(reason) => {
                total_issues += 1;
                if issues.len() < MAX_REPORTED_ISSUES {
                    issues.push(format!("record {index}: {reason}"));
                }
            }
        }
    }

    QualityReport {
        total_records: batch.len(),
        valid_records,
        quality_score: valid_records as f64 / batch.len() as f64,
        valid: total_issues == 0,
        issues,
        total_issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_batch_is_scored_per_record() {
        let mut batch: Vec<RawRecord> = (0..7).map(|i| json!({"fila": i})).collect();
        batch.push(json!("texto suelto"));
        batch.push(json!(42));
        batch.push(json!(null));

        let report = evaluate_quality(&batch);
        assert_eq!(report.total_records, 10);
        assert_eq!(report.valid_records, 7);
        assert_eq!(report.quality_score, 0.7);
        assert_eq!(report.total_issues, 3);
        assert_eq!(report.issues.len(), 3);
        assert!(!report.valid);
    }

    #[test]
    fn empty_batch_reports_no_data() {
        let report = evaluate_quality(&[]);
        assert_eq!(report.quality_score, 0.0);
        assert!(!report.valid);
        assert_eq!(report.issues, vec!["no data: batch is empty".to_string()]);
    }

    #[test]
    fn issue_list_is_capped_but_count_is_not() {
        let batch: Vec<RawRecord> = (0..25).map(|_| json!(false)).collect();

        let report = evaluate_quality(&batch);
        assert_eq!(report.issues.len(), MAX_REPORTED_ISSUES);
        assert_eq!(report.total_issues, 25);
        assert_eq!(report.valid_records, 0);
        assert_eq!(report.quality_score, 0.0);
    }

    #[test]
    fn clean_batch_is_valid() {
        let batch: Vec<RawRecord> =
            vec![json!({"numero": "05"}), json!({"numero": "34"})];

        let report = evaluate_quality(&batch);
        assert!(report.valid);
        assert_eq!(report.quality_score, 1.0);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn empty_objects_are_invalid() {
        let batch: Vec<RawRecord> = vec![json!({}), json!({"ok": 1})];
        let report = evaluate_quality(&batch);
        assert_eq!(report.valid_records, 1);
        assert_eq!(report.total_issues, 1);
    }
}
