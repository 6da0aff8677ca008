//! Feature payload parsing.
//!
//! Accepts the two encodings clients send in the `features` form field:
//! a JSON array (`[0.1, 0.2, ...]`, or `[[...], [...]]` for a batch) and a
//! comma-separated list (`0.1, 0.2, ...`). Parsing only recovers the numbers;
//! counts are checked by [`ShapeValidator`](crate::shape::ShapeValidator).

use serde::Deserialize;

use crate::error::ParseError;

/// Numbers recovered from a payload, before shape validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFeatures {
    /// One feature row.
    Row(Vec<f32>),
    /// Several feature rows (JSON array of arrays).
    Batch(Vec<Vec<f32>>),
}

impl RawFeatures {
    /// Total number of values across all rows.
    pub fn value_count(&self) -> usize {
        match self {
            RawFeatures::Row(row) => row.len(),
            RawFeatures::Batch(rows) => rows.iter().map(Vec::len).sum(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonFeatures {
    Row(Vec<f64>),
    Batch(Vec<Vec<f64>>),
}

/// Parse a raw `features` payload.
pub fn parse(raw: &str) -> Result<RawFeatures, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    if raw.starts_with('[') {
        parse_json(raw)
    } else {
        parse_scalar_list(raw).map(RawFeatures::Row)
    }
}

fn parse_json(raw: &str) -> Result<RawFeatures, ParseError> {
    let parsed: JsonFeatures =
        serde_json::from_str(raw).map_err(|e| ParseError::MalformedJson(e.to_string()))?;

    match parsed {
        JsonFeatures::Row(row) => narrow_row(&row, 0).map(RawFeatures::Row),
        JsonFeatures::Batch(rows) => {
            let mut out = Vec::with_capacity(rows.len());
            let mut offset = 0;
            for row in &rows {
                out.push(narrow_row(row, offset)?);
                offset += row.len();
            }
            Ok(RawFeatures::Batch(out))
        }
    }
}

/// Convert to f32, rejecting values that overflow or are not finite.
fn narrow_row(row: &[f64], offset: usize) -> Result<Vec<f32>, ParseError> {
    row.iter()
        .enumerate()
        .map(|(i, &v)| narrow(v, offset + i))
        .collect()
}

/// Shared by both encodings: numbers are read as f64 and rounded to f32 once.
fn narrow(value: f64, position: usize) -> Result<f32, ParseError> {
    let value = value as f32;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ParseError::NonFinite { position })
    }
}

fn parse_scalar_list(raw: &str) -> Result<Vec<f32>, ParseError> {
    raw.split(',')
        .map(str::trim)
        .enumerate()
        .map(|(position, token)| {
            let value: f64 = token
                .parse()
                .map_err(|_| ParseError::MalformedScalarList {
                    token: token.to_string(),
                    position,
                })?;
            narrow(value, position)
        })
        .collect()
}
