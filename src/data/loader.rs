use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use arrow::util::pretty::pretty_format_batches;
use log::{Level, debug, log_enabled, trace};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::MassLimit;
use super::parse::parse_xy_text;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load raw (unscaled) curve points from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.txt` / `.dat` – two whitespace-separated columns, `#` comments
/// * `.csv`          – header row with `mass` and `limit` columns
/// * `.json`         – `{ "mass": [...], "limit": [...] }` or `[[m, l], ...]`
/// * `.parquet`      – numeric `mass` and `limit` columns
pub fn load_file(path: &Path) -> Result<MassLimit> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let data = match ext.as_str() {
        "txt" | "dat" | "" => load_text(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading curve data from {}", path.display()))?;

    if data.is_empty() {
        bail!("{} contains no data rows", path.display());
    }
    debug!("loaded {} points from {}", data.len(), path.display());
    Ok(data)
}

// ---------------------------------------------------------------------------
// Plain text loader
// ---------------------------------------------------------------------------

fn load_text(path: &Path) -> Result<MassLimit> {
    let text = std::fs::read_to_string(path).context("reading text file")?;
    Ok(parse_xy_text(&text)?)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with (at least) `mass` and `limit` columns.
/// Other columns are ignored.
fn load_csv(path: &Path) -> Result<MassLimit> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .context("opening CSV")?;
    let headers = reader.headers().context("reading CSV headers")?.clone();

    let mass_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("mass"))
        .context("CSV missing 'mass' column")?;
    let limit_idx = headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case("limit"))
        .context("CSV missing 'limit' column")?;

    let mut data = MassLimit::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        data.mass.push(parse_cell(record.get(mass_idx), row_no, "mass")?);
        data.limit.push(parse_cell(record.get(limit_idx), row_no, "limit")?);
    }
    Ok(data)
}

fn parse_cell(cell: Option<&str>, row: usize, col: &str) -> Result<f64> {
    let tok = cell.unwrap_or("");
    tok.parse::<f64>()
        .with_context(|| format!("Row {row}, {col}: '{tok}' is not a number"))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Accepted JSON shapes:
///
/// ```json
/// { "mass": [1.0, 10.0], "limit": [0.5, 0.1] }
/// ```
///
/// or a list of pairs `[[1.0, 0.5], [10.0, 0.1]]`.
fn load_json(path: &Path) -> Result<MassLimit> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    json_to_mass_limit(&root)
}

fn json_to_mass_limit(root: &JsonValue) -> Result<MassLimit> {
    match root {
        JsonValue::Object(obj) => {
            let mass = json_array_to_f64(obj.get("mass"), "mass")?;
            let limit = json_array_to_f64(obj.get("limit"), "limit")?;
            if mass.len() != limit.len() {
                bail!("mass has {} values but limit has {}", mass.len(), limit.len());
            }
            Ok(MassLimit { mass, limit })
        }
        JsonValue::Array(rows) => {
            let mut data = MassLimit::default();
            for (i, row) in rows.iter().enumerate() {
                let pair = row
                    .as_array()
                    .filter(|p| p.len() == 2)
                    .with_context(|| format!("Row {i}: expected a [mass, limit] pair"))?;
                data.mass.push(json_number(&pair[0], i, "mass")?);
                data.limit.push(json_number(&pair[1], i, "limit")?);
            }
            Ok(data)
        }
        _ => bail!("Expected a JSON object or array of pairs"),
    }
}

fn json_array_to_f64(val: Option<&JsonValue>, col: &str) -> Result<Vec<f64>> {
    let arr = val
        .and_then(|v| v.as_array())
        .with_context(|| format!("missing or invalid '{col}' array"))?;

    arr.iter()
        .enumerate()
        .map(|(j, v)| json_number(v, j, col))
        .collect()
}

fn json_number(v: &JsonValue, row: usize, col: &str) -> Result<f64> {
    v.as_f64()
        .with_context(|| format!("Row {row}, {col}: not a number"))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat numeric `mass` and `limit` columns.
///
/// Float64, Float32, Int64 and Int32 columns are accepted, which covers files
/// written by Pandas (`df.to_parquet()`) and Polars (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<MassLimit> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut data = MassLimit::default();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if log_enabled!(Level::Trace) && data.is_empty() {
            if let Ok(table) = pretty_format_batches(&[batch.slice(0, batch.num_rows().min(5))]) {
                trace!("{}: first rows\n{table}", path.display());
            }
        }
        let schema = batch.schema();

        let mass_idx = schema
            .index_of("mass")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'mass' column"))?;
        let limit_idx = schema
            .index_of("limit")
            .map_err(|_| anyhow::anyhow!("Parquet file missing 'limit' column"))?;

        data.mass
            .extend(column_to_f64(batch.column(mass_idx)).context("reading 'mass'")?);
        data.limit
            .extend(column_to_f64(batch.column(limit_idx)).context("reading 'limit'")?);
    }

    if data.mass.len() != data.limit.len() {
        bail!(
            "mass has {} values but limit has {}",
            data.mass.len(),
            data.limit.len()
        );
    }
    Ok(data)
}

// -- Parquet / Arrow helpers --

/// Widen a numeric Arrow column to `f64`. Nulls become NaN.
fn column_to_f64(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    let values = match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect(),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .iter()
            .map(|v| v.map(f64::from).unwrap_or(f64::NAN))
            .collect(),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .context("expected Int64Array")?
            .iter()
            .map(|v| v.map(|i| i as f64).unwrap_or(f64::NAN))
            .collect(),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .context("expected Int32Array")?
            .iter()
            .map(|v| v.map(f64::from).unwrap_or(f64::NAN))
            .collect(),
        other => bail!("Expected a numeric column, got {other:?}"),
    };
    Ok(values)
}
