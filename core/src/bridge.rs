//! Text <-> tree conversion.
//!
//! Stateless. `parse` accepts any JSON document (object, array or scalar at the
//! top level); `serialize` produces the canonical two-space pretty form.
//! Numbers keep their literal text, so a parsed number is written back
//! digit for digit.

use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Number, Value};
use thiserror::Error;

pub const INDENT: &str = "  ";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid JSON: {detail}")]
pub struct ParseError {
  pub detail: String,
  pub line: usize,
  pub column: usize,
}

impl From<serde_json::Error> for ParseError {
  fn from(err: serde_json::Error) -> Self {
    Self {
      detail: err.to_string(),
      line: err.line(),
      column: err.column(),
    }
  }
}

pub fn parse(text: &str) -> Result<Value, ParseError> {
  serde_json::from_str(text).map_err(ParseError::from)
}

/// Pretty-print with [`INDENT`], keys in map (insertion) order.
pub fn serialize(value: &Value) -> String {
  let mut out = Vec::with_capacity(128);
  let formatter = PrettyFormatter::with_indent(INDENT.as_bytes());
  let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
  // An in-memory `Value` always has string keys and finite numbers.
  if value.serialize(&mut ser).is_err() {
    return String::new();
  }
  String::from_utf8(out).unwrap_or_default()
}

/// Compact single-line form, used for collapsed-node summaries.
pub(crate) fn compact(value: &Value) -> String {
  serde_json::to_string(value).unwrap_or_default()
}

/// Parse the text of a numeric input.
///
/// Returns `None` for empty, non-numeric, `NaN` or infinite input. Integral input
/// stays an integer so `2` is not rewritten as `2.0`. A JSON number literal too
/// large for `f64` (`1e400`) is kept as written, the same way `parse` keeps it.
pub fn parse_number(text: &str) -> Option<Number> {
  let t = text.trim();
  if t.is_empty() {
    return None;
  }
  if let Ok(i) = t.parse::<i64>() {
    return Some(Number::from(i));
  }
  if let Ok(u) = t.parse::<u64>() {
    return Some(Number::from(u));
  }
  match t.parse::<f64>() {
    Ok(f) if f.is_finite() => number_from_f64(f),
    _ => t.parse::<Number>().ok(),
  }
}

pub fn number_from_f64(f: f64) -> Option<Number> {
  if !f.is_finite() {
    return None;
  }
  if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
    return Some(Number::from(f as i64));
  }
  Number::from_f64(f)
}
