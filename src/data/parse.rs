use thiserror::Error;

use super::model::{Curve, MassLimit};

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: '{token}' is not a number")]
    BadToken { line: usize, token: String },
    #[error("line {line}: expected 2 columns, found {found}")]
    ColumnCount { line: usize, found: usize },
    #[error("no data rows")]
    Empty,
    #[error("curve has neither an 'xystring' nor a loaded 'file'")]
    NoSource,
}

/// Parse whitespace-delimited two-column text (one `mass limit` row per line).
///
/// Blank lines and `#` comments are skipped; everything else must be a pair
/// of floats.
pub fn parse_xy_text(text: &str) -> Result<MassLimit, ParseError> {
    let mut data = MassLimit::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let content = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let tokens: Vec<&str> = content.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        if tokens.len() != 2 {
            return Err(ParseError::ColumnCount {
                line: line_no,
                found: tokens.len(),
            });
        }
        let mut values = [0.0f64; 2];
        for (slot, tok) in values.iter_mut().zip(&tokens) {
            *slot = tok.parse::<f64>().map_err(|_| ParseError::BadToken {
                line: line_no,
                token: tok.to_string(),
            })?;
        }
        data.mass.push(values[0]);
        data.limit.push(values[1]);
    }

    if data.is_empty() {
        return Err(ParseError::Empty);
    }
    Ok(data)
}

/// Mass and limit columns of `curve`, with its unit conversion applied.
pub fn parse_mass_limit(curve: &Curve) -> Result<MassLimit, ParseError> {
    let mut data = match (&curve.points, &curve.xystring) {
        (Some(points), _) => points.clone(),
        (None, Some(text)) => parse_xy_text(text)?,
        (None, None) => return Err(ParseError::NoSource),
    };
    if data.is_empty() {
        return Err(ParseError::Empty);
    }
    data.rescale(curve.mass_unit);
    Ok(data)
}
