//! Array structural edits and the item-shape inference behind "add item".
//!
//! The new item copies the shape of the first element only. Heterogeneous
//! arrays are not inspected any further.

use serde_json::{Map, Value};

use crate::{editor::EditError, models::EmptyArrayItem};

pub fn zero_value(value: &Value) -> Value {
  match value {
    Value::String(_) => Value::String(String::new()),
    Value::Number(_) => Value::from(0),
    Value::Bool(_) => Value::Bool(false),
    Value::Array(_) => Value::Array(Vec::new()),
    Value::Object(_) => Value::Object(Map::new()),
    Value::Null => Value::Null,
  }
}

pub fn infer_new_item(items: &[Value], when_empty: EmptyArrayItem) -> Value {
  match items.first() {
    None => match when_empty {
      EmptyArrayItem::Object => Value::Object(Map::new()),
      EmptyArrayItem::String => Value::String(String::new()),
    },
    Some(Value::Object(first)) => Value::Object(
      first
        .iter()
        .map(|(k, v)| (k.clone(), zero_value(v)))
        .collect(),
    ),
    Some(other) => zero_value(other),
  }
}

pub fn append_item(items: &[Value], when_empty: EmptyArrayItem) -> Vec<Value> {
  let mut out = Vec::with_capacity(items.len() + 1);
  out.extend(items.iter().cloned());
  out.push(infer_new_item(items, when_empty));
  out
}

pub fn remove_item(items: &[Value], index: usize) -> Result<Vec<Value>, EditError> {
  if index >= items.len() {
    return Err(EditError::IndexOutOfRange {
      index: index as u64,
      len: items.len(),
    });
  }
  Ok(
    items
      .iter()
      .enumerate()
      .filter(|(i, _)| *i != index)
      .map(|(_, v)| v.clone())
      .collect(),
  )
}
