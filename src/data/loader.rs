use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, LargeListArray, ListArray, StringArray};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{ExpressionDataset, Probe};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an expression dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – Parquet file with `probe_id`, `symbol` and `values` columns
///   (recommended); sample names and group labels live in the schema metadata
/// * `.json`    – `{ "samples": [...], "groups": [...], "probes": [...] }`
/// * `.csv`     – matrix layout, one probe per record; see [`load_csv`]
pub fn load_file(path: &Path) -> Result<ExpressionDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Validate dataset invariants and build the indexed dataset.
///
/// Checks: at least one sample and one probe, one group label per sample,
/// one value per sample in every probe row, unique probe ids.
fn finish(samples: Vec<String>, groups: Vec<String>, probes: Vec<Probe>) -> Result<ExpressionDataset> {
    if samples.is_empty() {
        bail!("Dataset has no samples");
    }
    if probes.is_empty() {
        bail!("Dataset has no probes");
    }
    if groups.len() != samples.len() {
        bail!(
            "{} group labels for {} samples",
            groups.len(),
            samples.len()
        );
    }
    for probe in &probes {
        if probe.values.len() != samples.len() {
            bail!(
                "Probe '{}' has {} values but the dataset has {} samples",
                probe.id,
                probe.values.len(),
                samples.len()
            );
        }
    }
    let mut seen: HashSet<&str> = HashSet::new();
    for probe in &probes {
        if !seen.insert(probe.id.as_str()) {
            bail!("Duplicate probe id '{}'", probe.id);
        }
    }

    Ok(ExpressionDataset::new(samples, groups, probes))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawDataset {
    samples: Vec<String>,
    groups: Vec<String>,
    probes: Vec<RawProbe>,
}

#[derive(Debug, Deserialize)]
struct RawProbe {
    id: String,
    #[serde(default)]
    symbol: Option<String>,
    values: Vec<f64>,
}

/// Expected JSON schema:
///
/// ```json
/// {
///   "samples": ["GSM001", "GSM002", ...],
///   "groups":  ["ER+",    "ER-",    ...],
///   "probes": [
///     { "id": "205225_at", "symbol": "ESR1", "values": [10.2, 4.1, ...] },
///     ...
///   ]
/// }
/// ```
///
/// `symbol` may be omitted or `null` for unannotated probes.
fn load_json(path: &Path) -> Result<ExpressionDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let raw: RawDataset = serde_json::from_str(&text).context("parsing JSON dataset")?;

    let probes = raw
        .probes
        .into_iter()
        .map(|p| Probe {
            id: p.id,
            symbol: p.symbol.filter(|s| !s.is_empty()),
            values: p.values,
        })
        .collect();

    finish(raw.samples, raw.groups, probes)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout:  header row `probe_id,symbol,<sample names...>`.
///
/// The first record must carry the literal id `group` and gives the group
/// label for each sample column; every following record is one probe row:
///
/// ```text
/// probe_id,symbol,GSM001,GSM002,GSM003,GSM004
/// group,,ER+,ER+,ER-,ER-
/// 205225_at,ESR1,10.2,9.8,4.1,3.9
/// ```
///
/// An empty `symbol` field marks an unannotated probe.
fn load_csv(path: &Path) -> Result<ExpressionDataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.len() < 3 || headers[0] != "probe_id" || headers[1] != "symbol" {
        bail!("CSV header must start with 'probe_id,symbol' followed by sample names");
    }
    let samples: Vec<String> = headers[2..].to_vec();

    let mut records = reader.records();

    let group_record = records
        .next()
        .context("CSV has no records; expected a 'group' row")?
        .context("reading CSV group row")?;
    if group_record.get(0) != Some("group") {
        bail!("First CSV record must have probe_id 'group' carrying the group labels");
    }
    let groups: Vec<String> = group_record.iter().skip(2).map(|g| g.to_string()).collect();

    let mut probes = Vec::new();
    for (row_no, result) in records.enumerate() {
        let record = result.with_context(|| format!("CSV probe row {row_no}"))?;

        let id = record.get(0).unwrap_or("").to_string();
        let symbol = match record.get(1).unwrap_or("") {
            "" => None,
            s => Some(s.to_string()),
        };

        let values: Vec<f64> = record
            .iter()
            .skip(2)
            .enumerate()
            .map(|(j, tok)| {
                tok.trim()
                    .parse::<f64>()
                    .with_context(|| format!("Row {row_no}, value[{j}]: '{tok}' is not a number"))
            })
            .collect::<Result<_>>()?;

        probes.push(Probe { id, symbol, values });
    }

    finish(samples, groups, probes)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet expression matrix.
///
/// Expected schema:
/// - `probe_id`: Utf8
/// - `symbol`: Utf8, nullable
/// - `values`: List<Float64> or LargeList<Float64> – one value per sample
///
/// Sample names and group labels are JSON string arrays stored in the Arrow
/// schema metadata under the keys `samples` and `groups` (as written by the
/// `generate_sample` binary).
fn load_parquet(path: &Path) -> Result<ExpressionDataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let metadata = builder.schema().metadata().clone();
    let samples: Vec<String> = metadata
        .get("samples")
        .context("Parquet schema metadata missing 'samples' key")
        .and_then(|s| serde_json::from_str(s).context("parsing 'samples' metadata"))?;
    let groups: Vec<String> = metadata
        .get("groups")
        .context("Parquet schema metadata missing 'groups' key")
        .and_then(|s| serde_json::from_str(s).context("parsing 'groups' metadata"))?;

    let reader = builder.build().context("building parquet reader")?;

    let mut probes = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let id_idx = schema
            .index_of("probe_id")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'probe_id' column"))?;
        let symbol_idx = schema
            .index_of("symbol")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'symbol' column"))?;
        let values_idx = schema
            .index_of("values")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'values' column"))?;

        let id_col = batch.column(id_idx);
        let symbol_col = batch.column(symbol_idx);
        let values_col = batch.column(values_idx);

        for row in 0..batch.num_rows() {
            let id = extract_string(id_col, row)
                .with_context(|| format!("Row {row}: failed to read 'probe_id'"))?;
            let symbol = if symbol_col.is_null(row) {
                None
            } else {
                Some(
                    extract_string(symbol_col, row)
                        .with_context(|| format!("Row {row}: failed to read 'symbol'"))?,
                )
            };
            let values = extract_f64_list(values_col, row)
                .with_context(|| format!("Row {row}: failed to read 'values'"))?;

            probes.push(Probe { id, symbol, values });
        }
    }

    finish(samples, groups, probes)
}

// -- Parquet / Arrow helpers --

/// Extract a `String` from a Utf8 or LargeUtf8 column at the given row.
fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    match col.data_type() {
        DataType::Utf8 => {
            let arr = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            Ok(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let arr = col.as_string::<i64>();
            Ok(arr.value(row).to_string())
        }
        other => bail!("Expected Utf8 column, got {other:?}"),
    }
}

/// Extract a `Vec<f64>` from a List or LargeList column at the given row.
fn extract_f64_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<f64>> {
    if col.is_null(row) {
        bail!("null value in list column");
    }

    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    // The inner array can be Float64 or Float32
    if let Some(f64_arr) = values_array.as_any().downcast_ref::<Float64Array>() {
        Ok(f64_arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(f32_arr) = values_array.as_any().downcast_ref::<Float32Array>() {
        Ok(f32_arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!(
            "List inner type is {:?}, expected Float64 or Float32",
            values_array.data_type()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("genescope-loader-{}-{name}", std::process::id()))
    }

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = temp_path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    const CSV_OK: &str = "\
probe_id,symbol,GSM1,GSM2,GSM3,GSM4
group,,ER+,ER+,ER-,ER-
205225_at,ESR1,10.2,9.8,4.1,3.9
212581_x_at,GAPDH,7.0,7.1,6.9,7.2
999_at,,1.0,2.0,3.0,4.0
";

    #[test]
    fn csv_round_trip() {
        let path = write_temp("ok.csv", CSV_OK);
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.samples, vec!["GSM1", "GSM2", "GSM3", "GSM4"]);
        assert_eq!(ds.groups, vec!["ER+", "ER+", "ER-", "ER-"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.resolve_symbol("ESR1"), Some("205225_at"));
        assert_eq!(ds.values_for("999_at"), Some(&[1.0, 2.0, 3.0, 4.0][..]));
        assert_eq!(ds.probes[2].symbol, None);
    }

    #[test]
    fn csv_missing_group_row_is_rejected() {
        let path = write_temp(
            "nogroup.csv",
            "probe_id,symbol,GSM1,GSM2\n205225_at,ESR1,10.2,4.1\n",
        );
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("group"), "{err:#}");
    }

    #[test]
    fn csv_non_numeric_value_is_rejected() {
        let path = write_temp(
            "badval.csv",
            "probe_id,symbol,GSM1,GSM2\ngroup,,ER+,ER-\n205225_at,ESR1,abc,4.1\n",
        );
        assert!(load_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn json_round_trip() {
        let path = write_temp(
            "ok.json",
            r#"{
                "samples": ["GSM1", "GSM2", "GSM3", "GSM4"],
                "groups": ["ER+", "ER+", "ER-", "ER-"],
                "probes": [
                    { "id": "205225_at", "symbol": "ESR1", "values": [10.2, 9.8, 4.1, 3.9] },
                    { "id": "999_at", "values": [1.0, 2.0, 3.0, 4.0] }
                ]
            }"#,
        );
        let ds = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ds.n_samples(), 4);
        assert_eq!(ds.resolve_symbol("ESR1"), Some("205225_at"));
        assert_eq!(ds.probes[1].symbol, None);
        assert_eq!(ds.group_levels(), vec!["ER+".to_string(), "ER-".to_string()]);
    }

    #[test]
    fn json_ragged_row_is_rejected() {
        let path = write_temp(
            "ragged.json",
            r#"{
                "samples": ["GSM1", "GSM2"],
                "groups": ["ER+", "ER-"],
                "probes": [{ "id": "p1", "symbol": "ESR1", "values": [1.0] }]
            }"#,
        );
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("p1"), "{err:#}");
    }

    #[test]
    fn json_group_label_mismatch_is_rejected() {
        let path = write_temp(
            "labels.json",
            r#"{
                "samples": ["GSM1", "GSM2"],
                "groups": ["ER+"],
                "probes": [{ "id": "p1", "symbol": "ESR1", "values": [1.0, 2.0] }]
            }"#,
        );
        assert!(load_file(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn duplicate_probe_id_is_rejected() {
        let path = write_temp(
            "dup.csv",
            "probe_id,symbol,GSM1,GSM2\ngroup,,ER+,ER-\np1,ESR1,1.0,2.0\np1,ESR1,3.0,4.0\n",
        );
        let err = load_file(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(err.to_string().contains("Duplicate"), "{err:#}");
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(load_file(Path::new("dataset.xlsx")).is_err());
    }
}
