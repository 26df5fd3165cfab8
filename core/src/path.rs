//! Path addressing into a value tree.
//!
//! `replace_at` is the only way a nested edit reaches the root: every level on
//! the path is rebuilt as a new container around the replaced child, and the
//! input tree is left untouched.

use serde_json::{Map, Value};

use crate::{editor::EditError, models::JsonPathSegment};

pub fn get_at<'a>(root: &'a Value, path: &[JsonPathSegment]) -> Option<&'a Value> {
  let mut cur = root;
  for seg in path {
    cur = match (seg, cur) {
      (JsonPathSegment::Key(k), Value::Object(map)) => map.get(k)?,
      (JsonPathSegment::Index(i), Value::Array(items)) => items.get(usize::try_from(*i).ok()?)?,
      _ => return None,
    };
  }
  Some(cur)
}

/// Build a new root in which the node at `path` is `new_value`.
///
/// Siblings are carried over in their original order. The empty path replaces the root.
pub fn replace_at(
  root: &Value,
  path: &[JsonPathSegment],
  new_value: Value,
) -> Result<Value, EditError> {
  replace_inner(root, path, 0, new_value)
}

fn replace_inner(
  node: &Value,
  path: &[JsonPathSegment],
  depth: usize,
  new_value: Value,
) -> Result<Value, EditError> {
  let Some(seg) = path.get(depth) else {
    return Ok(new_value);
  };
  let not_found = || EditError::PathNotFound(format_json_pointer(&path[..=depth]));

  match (seg, node) {
    (JsonPathSegment::Key(k), Value::Object(map)) => {
      let child = map.get(k).ok_or_else(not_found)?;
      let mut replaced = Some(replace_inner(child, path, depth + 1, new_value)?);
      let mut out = Map::with_capacity(map.len());
      for (key, v) in map {
        let v = if key == k {
          replaced.take().unwrap_or_else(|| v.clone())
        } else {
          v.clone()
        };
        out.insert(key.clone(), v);
      }
      Ok(Value::Object(out))
    }
    (JsonPathSegment::Index(i), Value::Array(items)) => {
      let idx = usize::try_from(*i)
        .ok()
        .filter(|idx| *idx < items.len())
        .ok_or_else(not_found)?;
      let replaced = replace_inner(&items[idx], path, depth + 1, new_value)?;
      let mut out = Vec::with_capacity(items.len());
      out.extend(items[..idx].iter().cloned());
      out.push(replaced);
      out.extend(items[idx + 1..].iter().cloned());
      Ok(Value::Array(out))
    }
    _ => Err(not_found()),
  }
}

/// Escapes one JSON Pointer token component.
pub fn escape_component(component: &str) -> String {
  if !component.contains('/') && !component.contains('~') {
    return component.to_string();
  }
  component.replace('~', "~0").replace('/', "~1")
}

/// Format a path as an RFC 6901 pointer. Used for logs and error messages.
pub fn format_json_pointer(path: &[JsonPathSegment]) -> String {
  let mut out = String::new();
  for seg in path {
    out.push('/');
    match seg {
      JsonPathSegment::Key(k) => out.push_str(&escape_component(k)),
      JsonPathSegment::Index(i) => out.push_str(&i.to_string()),
    }
  }
  out
}
