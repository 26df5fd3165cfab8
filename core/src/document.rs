use serde_json::{Map, Value};

use crate::bridge::{parse, serialize, ParseError};

/// A parsed root value together with its canonical text.
///
/// `text` is recomputed whenever the value is replaced, so the two never drift.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  value: Value,
  text: String,
}

impl Document {
  /// The initial mount: an empty object.
  pub fn empty() -> Self {
    Self::from_value(Value::Object(Map::new()))
  }

  pub fn from_value(value: Value) -> Self {
    let text = serialize(&value);
    Self { value, text }
  }

  pub fn from_text(text: &str) -> Result<Self, ParseError> {
    Ok(Self::from_value(parse(text)?))
  }

  pub fn value(&self) -> &Value {
    &self.value
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// Substitute a freshly built root; the previous value is dropped.
  pub fn replace_value(&mut self, value: Value) {
    *self = Self::from_value(value);
  }
}

impl Default for Document {
  fn default() -> Self {
    Self::empty()
  }
}
