use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Float64Builder, ListBuilder, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    // 12 receptor-positive and 12 receptor-negative samples
    let n_per_group = 12usize;
    let mut samples: Vec<String> = Vec::new();
    let mut groups: Vec<String> = Vec::new();
    for i in 0..n_per_group {
        samples.push(format!("GSM{:04}", i + 1));
        groups.push("ER+".to_string());
    }
    for i in n_per_group..2 * n_per_group {
        samples.push(format!("GSM{:04}", i + 1));
        groups.push("ER-".to_string());
    }

    // (probe_id, symbol, ER+ mean, ER- mean, sd) on a log2 intensity scale.
    // ESR1 appears on two probes so the dashboard's first-match resolution
    // is exercised; GAPDH/ACTB are flat housekeeping controls; the last
    // probe has no annotation.
    let probe_specs: Vec<(&str, Option<&str>, f64, f64, f64)> = vec![
        ("205225_at", Some("ESR1"), 10.5, 4.5, 0.6),
        ("211233_x_at", Some("ESR1"), 9.0, 5.2, 0.8),
        ("216836_s_at", Some("ERBB2"), 7.2, 9.4, 0.7),
        ("208305_at", Some("PGR"), 8.1, 4.2, 0.9),
        ("201438_at", Some("COL6A3"), 6.5, 6.9, 0.8),
        ("212581_x_at", Some("GAPDH"), 11.2, 11.2, 0.4),
        ("200801_x_at", Some("ACTB"), 12.0, 12.0, 0.4),
        ("244444_at", None, 5.0, 5.0, 1.0),
    ];

    let mut probe_ids: Vec<&str> = Vec::new();
    let mut symbols: Vec<Option<&str>> = Vec::new();
    let mut all_values: Vec<Vec<f64>> = Vec::new();

    for &(id, symbol, pos_mean, neg_mean, sd) in &probe_specs {
        let values: Vec<f64> = groups
            .iter()
            .map(|g| {
                let mean = if g == "ER+" { pos_mean } else { neg_mean };
                rng.gauss(mean, sd)
            })
            .collect();

        probe_ids.push(id);
        symbols.push(symbol);
        all_values.push(values);
    }

    // Build Arrow arrays
    let id_array = StringArray::from(probe_ids);
    let symbol_array = StringArray::from(symbols);

    let mut values_builder = ListBuilder::new(Float64Builder::new());
    for row in &all_values {
        let values = values_builder.values();
        for &v in row {
            values.append_value(v);
        }
        values_builder.append(true);
    }
    let values_array = values_builder.finish();

    // Sample names and group labels ride along in the schema metadata
    let mut metadata = HashMap::new();
    metadata.insert(
        "samples".to_string(),
        serde_json::to_string(&samples).expect("Failed to encode samples"),
    );
    metadata.insert(
        "groups".to_string(),
        serde_json::to_string(&groups).expect("Failed to encode groups"),
    );

    let schema = Arc::new(Schema::new_with_metadata(
        vec![
            Field::new("probe_id", DataType::Utf8, false),
            Field::new("symbol", DataType::Utf8, true),
            Field::new(
                "values",
                DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
                false,
            ),
        ],
        metadata,
    ));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(id_array),
            Arc::new(symbol_array),
            Arc::new(values_array),
        ],
    )
    .expect("Failed to create RecordBatch");

    // Write Parquet
    let output_path = "sample_expression.parquet";
    let file = std::fs::File::create(output_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {} probes across {} samples (ER+/ER-) to {output_path}",
        probe_specs.len(),
        samples.len()
    );
}
