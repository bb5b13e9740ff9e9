use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::Float64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde_json::json;

use limit_plot::grid::log_grid;

/// Falling power-law limit with a resonance dip, in the plotted units.
fn limit_shape(mass: f64, scale: f64, dip: (f64, f64)) -> f64 {
    let (centre, depth) = dip;
    let dip = depth * (-(mass.ln() - centre.ln()).powi(2) / 0.5).exp();
    // small deterministic ripple so the curves do not look analytic
    let ripple = 1.0 + 0.03 * (7.0 * mass.ln()).sin();
    (scale * mass.powf(-0.45) * (1.0 - dip) * ripple).clamp(1e-4, 1.0)
}

fn generate_curve(lo: f64, hi: f64, n: usize, scale: f64, dip: (f64, f64)) -> Result<Vec<(f64, f64)>> {
    Ok(log_grid(lo, hi, n)?
        .into_iter()
        .map(|m| (m, limit_shape(m, scale, dip)))
        .collect())
}

// ---------------------------------------------------------------------------
// Writers, one per loader format
// ---------------------------------------------------------------------------

fn write_text(path: &Path, points: &[(f64, f64)]) -> Result<()> {
    let mut out = String::from("# mass limit\n");
    for (m, l) in points {
        out.push_str(&format!("{m:.6e} {l:.6e}\n"));
    }
    fs::write(path, out).with_context(|| format!("writing {}", path.display()))
}

fn write_csv(path: &Path, points: &[(f64, f64)]) -> Result<()> {
    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["mass", "limit"])?;
    for (m, l) in points {
        writer.write_record([m.to_string(), l.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &Path, points: &[(f64, f64)]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("mass", DataType::Float64, false),
        Field::new("limit", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.0))),
            Arc::new(Float64Array::from_iter_values(points.iter().map(|p| p.1))),
        ],
    )
    .context("building record batch")?;

    let file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let dir = Path::new("data");
    fs::create_dir_all(dir).context("creating data directory")?;

    // Loose and tight versions of one search, plus two independent limits.
    let loose = generate_curve(5.0, 5e3, 40, 1.6, (90.0, 0.3))?;
    let tight: Vec<(f64, f64)> = loose
        .iter()
        .map(|&(m, l)| (m, (l * 0.6).max(1e-4)))
        .collect();
    let dwarfs = generate_curve(2.0, 1e4, 60, 1.2, (300.0, 0.2))?;
    // Collider limit is stored in TeV and rescaled on load.
    let collider: Vec<(f64, f64)> = generate_curve(100.0, 3e3, 25, 4.0, (1e3, 0.1))?
        .into_iter()
        .map(|(m, l)| (m / 1e3, l))
        .collect();

    write_text(&dir.join("loose.txt"), &loose)?;
    write_csv(&dir.join("tight.csv"), &tight)?;
    write_text(&dir.join("dwarfs.dat"), &dwarfs)?;
    write_parquet(&dir.join("collider.parquet"), &collider)?;

    let figure = json!({
        "size": [1000, 750],
        "axes": {
            "x": { "log": true, "lim": [1.0, 1e4], "label": "Mass (GeV)" },
            "y": { "lim": [0.0, 1.0], "label": "Limit" },
            "title": "Sample exclusion limits",
            "legend": true
        },
        "curves": {
            "loose": {
                "file": "loose.txt",
                "label_x": 30, "label_y": 0.9,
                "style": { "label": "Search (loose)" }
            },
            "tight": { "file": "tight.csv" },
            "dwarfs": {
                "file": "dwarfs.dat",
                "label_x": 3000, "label_y": 0.25, "rotation": 90,
                "style": { "color": "orange", "label": "Dwarfs" }
            },
            "collider": {
                "file": "collider.parquet",
                "mass_unit": "tev",
                "style": { "color": "red", "edgecolor": "k", "linestyle": "--", "alpha": 0.2 }
            },
            "benchmark": {
                "xystring": "# mass limit\n10 0.05\n100 0.02\n1000 0.01",
                "label_x": 100, "label_y": "0.08", "fontsize": 14,
                "style": { "color": "gray", "linestyle": ":", "label": "Benchmark" }
            }
        },
        "layers": [
            { "kind": "two", "loose": "loose", "tight": "tight" },
            { "kind": "final", "curve": "dwarfs" },
            { "kind": "patch", "curve": "collider", "zorder": 0.5 },
            { "kind": "limit", "curve": "benchmark" }
        ]
    });
    let figure_path = dir.join("figure.json");
    fs::write(&figure_path, serde_json::to_string_pretty(&figure)?)
        .with_context(|| format!("writing {}", figure_path.display()))?;

    println!(
        "Wrote 4 sample curves and {} (render with: limit-plot {})",
        figure_path.display(),
        figure_path.display()
    );
    Ok(())
}
