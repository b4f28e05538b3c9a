use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Probe – one row of the expression matrix
// ---------------------------------------------------------------------------

/// A single measurement row: one probe across all samples.
#[derive(Debug, Clone)]
pub struct Probe {
    /// Internal row key (e.g. manufacturer probe ID).
    pub id: String,
    /// Annotated gene symbol, if the probe is annotated at all.
    pub symbol: Option<String>,
    /// Expression values, aligned with the dataset's sample order.
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ExpressionDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed lookup indices.
///
/// Loaded once and treated as immutable afterwards; every consumer receives
/// it by shared reference.
#[derive(Debug, Clone)]
pub struct ExpressionDataset {
    /// All probes (rows), in annotation-table order.
    pub probes: Vec<Probe>,
    /// Sample names, defining the column order of every probe row.
    pub samples: Vec<String>,
    /// Group label per sample, aligned with `samples`.
    pub groups: Vec<String>,

    /// symbol → first row carrying it (first occurrence wins on duplicates).
    symbol_index: HashMap<String, usize>,
    /// probe id → row.
    probe_index: HashMap<String, usize>,
}

impl ExpressionDataset {
    /// Assemble a dataset and build its lookup indices.
    ///
    /// Callers (the loaders) are responsible for validating that `groups`
    /// aligns with `samples` and that every probe row has one value per
    /// sample.
    pub fn new(samples: Vec<String>, groups: Vec<String>, probes: Vec<Probe>) -> Self {
        let mut symbol_index: HashMap<String, usize> = HashMap::new();
        let mut probe_index: HashMap<String, usize> = HashMap::new();

        for (row, probe) in probes.iter().enumerate() {
            if let Some(sym) = &probe.symbol {
                symbol_index.entry(sym.clone()).or_insert(row);
            }
            probe_index.entry(probe.id.clone()).or_insert(row);
        }

        ExpressionDataset {
            probes,
            samples,
            groups,
            symbol_index,
            probe_index,
        }
    }

    /// Resolve a gene symbol to a probe id.
    ///
    /// Case-sensitive exact match; when several probes share the symbol the
    /// first row in annotation order wins. `None` means "not found".
    pub fn resolve_symbol(&self, symbol: &str) -> Option<&str> {
        self.symbol_index
            .get(symbol)
            .map(|&row| self.probes[row].id.as_str())
    }

    /// The value row for a probe id, aligned with `samples`.
    pub fn values_for(&self, probe_id: &str) -> Option<&[f64]> {
        self.probe_index
            .get(probe_id)
            .map(|&row| self.probes[row].values.as_slice())
    }

    /// Sorted unique group labels.
    pub fn group_levels(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.groups.iter().collect();
        set.into_iter().cloned().collect()
    }

    /// Number of probes.
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Number of samples (columns).
    pub fn n_samples(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(id: &str, symbol: Option<&str>, values: &[f64]) -> Probe {
        Probe {
            id: id.to_string(),
            symbol: symbol.map(|s| s.to_string()),
            values: values.to_vec(),
        }
    }

    fn toy_dataset() -> ExpressionDataset {
        ExpressionDataset::new(
            vec!["S1".into(), "S2".into(), "S3".into(), "S4".into()],
            vec!["pos".into(), "pos".into(), "neg".into(), "neg".into()],
            vec![
                probe("p1", Some("ESR1"), &[1.0, 2.0, 3.0, 4.0]),
                probe("p2", Some("ESR1"), &[9.0, 9.0, 9.0, 9.0]),
                probe("p3", Some("GAPDH"), &[5.0, 5.0, 5.0, 5.0]),
                probe("p4", None, &[0.0, 0.0, 0.0, 0.0]),
            ],
        )
    }

    #[test]
    fn resolves_known_symbol() {
        let ds = toy_dataset();
        assert_eq!(ds.resolve_symbol("GAPDH"), Some("p3"));
    }

    #[test]
    fn duplicate_symbol_takes_first_row() {
        let ds = toy_dataset();
        assert_eq!(ds.resolve_symbol("ESR1"), Some("p1"));
    }

    #[test]
    fn unknown_symbol_is_none() {
        let ds = toy_dataset();
        assert_eq!(ds.resolve_symbol("NOTAREALGENE"), None);
    }

    #[test]
    fn symbol_match_is_case_sensitive() {
        let ds = toy_dataset();
        assert_eq!(ds.resolve_symbol("esr1"), None);
    }

    #[test]
    fn value_row_matches_sample_count() {
        let ds = toy_dataset();
        let row = ds.values_for("p1").unwrap();
        assert_eq!(row.len(), ds.n_samples());
        assert_eq!(row, &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn group_levels_sorted_unique() {
        let ds = toy_dataset();
        assert_eq!(ds.group_levels(), vec!["neg".to_string(), "pos".to_string()]);
    }
}
