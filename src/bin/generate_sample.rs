//! Write a small synthetic toxicity table as CSV, JSON and Parquet, for
//! trying the browser without network access.
//!
//! Usage: `generate_sample [OUTPUT_DIR]`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Value as JsonValue};

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

/// (name, CAS, SMILES, baseline log10 LC50 in mg/L)
const CHEMICALS: &[(&str, &str, &str, f64)] = &[
    ("PFOA", "335-67-1", "OC(=O)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)F", 1.4),
    ("PFOS", "1763-23-1", "OS(=O)(=O)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)F", 0.9),
    ("PFBA", "375-22-4", "OC(=O)C(F)(F)C(F)(F)C(F)(F)F", 2.3),
    ("PFHxS", "355-46-4", "OS(=O)(=O)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)F", 1.2),
    ("GenX", "13252-13-6", "OC(=O)C(F)(OC(F)(F)C(F)(F)C(F)(F)F)C(F)(F)F", 2.0),
    ("6:2 FTS", "27619-97-2", "OS(=O)(=O)CCC(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)C(F)(F)F", 1.7),
];

/// (species, sensitivity offset in log10 units)
const SPECIES: &[(&str, f64)] = &[
    ("zebrafish", 0.0),
    ("fathead minnow", 0.15),
    ("rainbow trout", -0.25),
    ("bluegill", 0.1),
];

struct Row {
    chemical: &'static str,
    cas: &'static str,
    smiles: &'static str,
    species: &'static str,
    log_lc50: f64,
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let mut rows = Vec::new();
    for &(chemical, cas, smiles, base) in CHEMICALS {
        for &(species, offset) in SPECIES {
            rows.push(Row {
                chemical,
                cas,
                smiles,
                species,
                log_lc50: ((base + offset + rng.gauss(0.0, 0.1)) * 1000.0).round() / 1000.0,
            });
        }
    }

    // ---- CSV ----
    let csv_path = out_dir.join("sample_tox.csv");
    let mut writer = csv::Writer::from_path(&csv_path).context("opening CSV output")?;
    writer.write_record(["Chemicals", "CAS", "SMILES", "Species", "log_LC50"])?;
    for r in &rows {
        let lc50 = r.log_lc50.to_string();
        writer.write_record([r.chemical, r.cas, r.smiles, r.species, lc50.as_str()])?;
    }
    writer.flush()?;

    // ---- JSON (records) ----
    let json_path = out_dir.join("sample_tox.json");
    let records: Vec<JsonValue> = rows
        .iter()
        .map(|r| {
            json!({
                "Chemicals": r.chemical,
                "CAS": r.cas,
                "SMILES": r.smiles,
                "Species": r.species,
                "log_LC50": r.log_lc50,
            })
        })
        .collect();
    std::fs::write(&json_path, serde_json::to_vec_pretty(&records)?)
        .with_context(|| format!("writing {}", json_path.display()))?;

    // ---- Parquet ----
    let schema = Arc::new(Schema::new(vec![
        Field::new("Chemicals", DataType::Utf8, false),
        Field::new("CAS", DataType::Utf8, false),
        Field::new("SMILES", DataType::Utf8, false),
        Field::new("Species", DataType::Utf8, false),
        Field::new("log_LC50", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.chemical))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.cas))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.smiles))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.species))),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.log_lc50))),
        ],
    )
    .context("building record batch")?;

    let parquet_path = out_dir.join("sample_tox.parquet");
    let file = std::fs::File::create(&parquet_path)
        .with_context(|| format!("creating {}", parquet_path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    println!(
        "Wrote {} records to {}, {} and {}",
        rows.len(),
        csv_path.display(),
        json_path.display(),
        parquet_path.display()
    );
    Ok(())
}
