use std::collections::BTreeMap;

use thiserror::Error;

use super::model::ExpressionDataset;
use crate::stats::{five_number, welch_t, FiveNumber, TTest};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a comparison could not be computed. None of these are fatal; the next
/// trigger starts from a clean slate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompareError {
    #[error("no probe annotated with symbol '{0}'")]
    SymbolNotFound(String),

    #[error("probe id '{0}' not present in the expression matrix")]
    ProbeNotFound(String),

    #[error("expected exactly two sample groups, found {0}")]
    GroupCount(usize),

    #[error("group '{group}' has {n} observation(s), need at least 2")]
    TooFewSamples { group: String, n: usize },

    #[error("expression values have zero variance in both groups")]
    ZeroVariance,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Per-group distribution summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub label: String,
    pub n: usize,
    pub mean: f64,
    pub box_stats: FiveNumber,
}

/// Everything the UI needs to render one comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// The symbol as entered (resolution is case-sensitive).
    pub symbol: String,
    /// Probe the symbol resolved to.
    pub probe_id: String,
    /// Exactly two entries, sorted by group label.
    pub groups: Vec<GroupSummary>,
    pub test: TTest,
}

// ---------------------------------------------------------------------------
// Pipeline: resolve → extract → group → compare
// ---------------------------------------------------------------------------

/// The value row for `probe_id`, or `ProbeNotFound`.
pub fn extract_row<'a>(
    dataset: &'a ExpressionDataset,
    probe_id: &str,
) -> Result<&'a [f64], CompareError> {
    dataset
        .values_for(probe_id)
        .ok_or_else(|| CompareError::ProbeNotFound(probe_id.to_string()))
}

/// Partition a value row by the dataset's group labels.
///
/// Keys are group labels in sorted order; values keep sample order.
pub fn group_values(
    dataset: &ExpressionDataset,
    values: &[f64],
) -> BTreeMap<String, Vec<f64>> {
    let mut by_group: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (label, &v) in dataset.groups.iter().zip(values.iter()) {
        by_group.entry(label.clone()).or_default().push(v);
    }
    by_group
}

/// Run the full gene comparison for one symbol.
///
/// Resolution happens against the annotation table (first matching row wins
/// on duplicate symbols), the resolved row is split by group label, and the
/// two groups are summarised and compared with Welch's t-test.
pub fn compare_symbol(
    dataset: &ExpressionDataset,
    symbol: &str,
) -> Result<ComparisonResult, CompareError> {
    let probe_id = dataset
        .resolve_symbol(symbol)
        .ok_or_else(|| CompareError::SymbolNotFound(symbol.to_string()))?
        .to_string();

    let values = extract_row(dataset, &probe_id)?;
    let by_group = group_values(dataset, values);

    if by_group.len() != 2 {
        return Err(CompareError::GroupCount(by_group.len()));
    }
    for (label, group_values) in &by_group {
        if group_values.len() < 2 {
            return Err(CompareError::TooFewSamples {
                group: label.clone(),
                n: group_values.len(),
            });
        }
    }

    let mut groups = Vec::with_capacity(2);
    for (label, group_values) in &by_group {
        let n = group_values.len();
        let mean = group_values.iter().sum::<f64>() / n as f64;
        let box_stats = five_number(group_values).ok_or_else(|| CompareError::TooFewSamples {
            group: label.clone(),
            n,
        })?;
        groups.push(GroupSummary {
            label: label.clone(),
            n,
            mean,
            box_stats,
        });
    }

    let rows: Vec<&[f64]> = by_group.values().map(|v| v.as_slice()).collect();
    let test = welch_t(rows[0], rows[1]).ok_or(CompareError::ZeroVariance)?;

    Ok(ComparisonResult {
        symbol: symbol.to_string(),
        probe_id,
        groups,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Probe;

    fn probe(id: &str, symbol: Option<&str>, values: &[f64]) -> Probe {
        Probe {
            id: id.to_string(),
            symbol: symbol.map(|s| s.to_string()),
            values: values.to_vec(),
        }
    }

    /// 5 "pos" + 5 "neg" samples; ESR1 clearly separated, GAPDH flat.
    fn dataset() -> ExpressionDataset {
        let samples = (1..=10).map(|i| format!("GSM{i}")).collect();
        let groups = vec![
            "pos".into(), "pos".into(), "pos".into(), "pos".into(), "pos".into(),
            "neg".into(), "neg".into(), "neg".into(), "neg".into(), "neg".into(),
        ];
        let probes = vec![
            probe(
                "205225_at",
                Some("ESR1"),
                &[9.8, 10.2, 10.1, 9.9, 10.0, 4.1, 3.9, 4.0, 4.2, 3.8],
            ),
            probe(
                "211233_x_at",
                Some("ESR1"),
                &[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
            ),
            probe(
                "212581_x_at",
                Some("GAPDH"),
                &[7.1, 6.9, 7.0, 7.2, 6.8, 7.0, 7.1, 6.9, 7.2, 6.8],
            ),
        ];
        ExpressionDataset::new(samples, groups, probes)
    }

    #[test]
    fn esr1_rejects_null_at_conventional_threshold() {
        let r = compare_symbol(&dataset(), "ESR1").unwrap();
        assert_eq!(r.probe_id, "205225_at");
        assert!(r.test.p < 0.05, "p = {}", r.test.p);
        assert!((0.0..=1.0).contains(&r.test.p));
    }

    #[test]
    fn duplicate_symbol_uses_first_annotated_row() {
        // The second ESR1 probe is flat; first-row tie-breaking means the
        // comparison runs on the separated probe.
        let r = compare_symbol(&dataset(), "ESR1").unwrap();
        assert_eq!(r.probe_id, "205225_at");
        let pos = r.groups.iter().find(|g| g.label == "pos").unwrap();
        let neg = r.groups.iter().find(|g| g.label == "neg").unwrap();
        assert!(pos.mean > neg.mean);
    }

    #[test]
    fn unknown_symbol_stops_before_extraction() {
        let err = compare_symbol(&dataset(), "NOTAREALGENE").unwrap_err();
        assert_eq!(err, CompareError::SymbolNotFound("NOTAREALGENE".into()));
    }

    #[test]
    fn groups_are_sorted_and_summarised() {
        let r = compare_symbol(&dataset(), "GAPDH").unwrap();
        assert_eq!(r.groups.len(), 2);
        assert_eq!(r.groups[0].label, "neg");
        assert_eq!(r.groups[1].label, "pos");
        assert_eq!(r.groups[0].n, 5);
        assert!(r.groups[0].box_stats.min <= r.groups[0].box_stats.median);
        assert!(r.groups[0].box_stats.median <= r.groups[0].box_stats.max);
    }

    #[test]
    fn housekeeping_gene_not_significant() {
        let r = compare_symbol(&dataset(), "GAPDH").unwrap();
        assert!(r.test.p > 0.05, "p = {}", r.test.p);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let ds = dataset();
        let first = compare_symbol(&ds, "ESR1").unwrap();
        let second = compare_symbol(&ds, "ESR1").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn single_group_is_rejected() {
        let ds = ExpressionDataset::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec!["only".into(), "only".into(), "only".into(), "only".into()],
            vec![probe("p1", Some("TP53"), &[1.0, 2.0, 3.0, 4.0])],
        );
        assert_eq!(
            compare_symbol(&ds, "TP53").unwrap_err(),
            CompareError::GroupCount(1)
        );
    }

    #[test]
    fn three_groups_are_rejected() {
        let ds = ExpressionDataset::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["x".into(), "y".into(), "z".into()],
            vec![probe("p1", Some("TP53"), &[1.0, 2.0, 3.0])],
        );
        assert_eq!(
            compare_symbol(&ds, "TP53").unwrap_err(),
            CompareError::GroupCount(3)
        );
    }

    #[test]
    fn undersized_group_is_rejected() {
        let ds = ExpressionDataset::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["pos".into(), "pos".into(), "neg".into()],
            vec![probe("p1", Some("TP53"), &[1.0, 2.0, 3.0])],
        );
        assert_eq!(
            compare_symbol(&ds, "TP53").unwrap_err(),
            CompareError::TooFewSamples {
                group: "neg".into(),
                n: 1
            }
        );
    }

    #[test]
    fn flat_probe_reports_zero_variance() {
        let ds = ExpressionDataset::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec!["pos".into(), "pos".into(), "neg".into(), "neg".into()],
            vec![probe("p1", Some("TP53"), &[2.0, 2.0, 2.0, 2.0])],
        );
        assert_eq!(
            compare_symbol(&ds, "TP53").unwrap_err(),
            CompareError::ZeroVariance
        );
    }

    #[test]
    fn extract_row_unknown_probe() {
        let err = extract_row(&dataset(), "999_at").unwrap_err();
        assert_eq!(err, CompareError::ProbeNotFound("999_at".into()));
    }
}
