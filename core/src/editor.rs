use std::collections::{HashMap, HashSet};

use serde_json::Value;
use thiserror::Error;

use crate::{
  bridge::{compact, parse_number},
  engine::CoreOptions,
  models::{EditRequest, EmptyArrayItem, JsonNodeKind, JsonPathSegment, NodeControl, NodeView},
  path::{format_json_pointer, get_at, replace_at},
  schema::{append_item, remove_item},
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditError {
  #[error("not a number: {0:?}")]
  InvalidNumber(String),
  #[error("no node at {0:?}")]
  PathNotFound(String),
  #[error("expected {expected} node, found {found}")]
  KindMismatch {
    expected: &'static str,
    found: &'static str,
  },
  #[error("index {index} out of range for array of length {len}")]
  IndexOutOfRange { index: u64, len: usize },
  #[error("string is not markup")]
  NotHtml,
}

/// Renders a markup-looking string for display. Output is never fed back into the tree.
pub trait HtmlPreview {
  fn render_markup(&self, source: &str) -> String;
}

/// Shows the markup source as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPreview;

impl HtmlPreview for PlainPreview {
  fn render_markup(&self, source: &str) -> String {
    source.to_string()
  }
}

/// Outcome of a committed edit.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
  /// A new root value; the old one should be discarded.
  Value(Value),
  /// Only expansion or preview state changed.
  View,
}

pub fn is_markup(s: &str) -> bool {
  s.starts_with('<') && s.ends_with('>')
}

/// UI-only state keyed by structural path, kept apart from the value tree.
#[derive(Debug, Clone, Default)]
struct ViewState {
  expanded: HashMap<Vec<JsonPathSegment>, bool>,
  previews: HashSet<Vec<JsonPathSegment>>,
}

impl ViewState {
  /// Element `index` was removed from the array at `array_path`: drop its entries and
  /// move later siblings' entries down by one.
  fn forget_index(&mut self, array_path: &[JsonPathSegment], index: u64) {
    self.expanded = std::mem::take(&mut self.expanded)
      .into_iter()
      .filter_map(|(p, v)| shift_after_removal(p, array_path, index).map(|p| (p, v)))
      .collect();
    self.previews = std::mem::take(&mut self.previews)
      .into_iter()
      .filter_map(|p| shift_after_removal(p, array_path, index))
      .collect();
  }
}

fn shift_after_removal(
  mut path: Vec<JsonPathSegment>,
  array_path: &[JsonPathSegment],
  removed: u64,
) -> Option<Vec<JsonPathSegment>> {
  if !path.starts_with(array_path) {
    return Some(path);
  }
  match path.get_mut(array_path.len()) {
    Some(JsonPathSegment::Index(i)) if *i == removed => None,
    Some(JsonPathSegment::Index(i)) if *i > removed => {
      *i -= 1;
      Some(path)
    }
    _ => Some(path),
  }
}

/// Recursive tree renderer and edit committer.
///
/// Holds no value of its own: every call receives the current root and edits
/// come back as a replacement root.
#[derive(Debug, Clone)]
pub struct TreeEditor {
  view: ViewState,
  default_expanded: bool,
  empty_array_item: EmptyArrayItem,
  preview_max_chars: usize,
}

impl TreeEditor {
  pub fn new(options: &CoreOptions) -> Self {
    Self {
      view: ViewState::default(),
      default_expanded: options.default_expanded,
      empty_array_item: options.empty_array_item,
      preview_max_chars: options.preview_max_chars,
    }
  }

  /// Forget all expansion and preview state, e.g. after a reparse.
  pub fn reset_view(&mut self) {
    self.view = ViewState::default();
  }

  pub fn is_expanded(&self, path: &[JsonPathSegment]) -> bool {
    self
      .view
      .expanded
      .get(path)
      .copied()
      .unwrap_or(self.default_expanded)
  }

  pub fn is_previewing(&self, path: &[JsonPathSegment]) -> bool {
    self.view.previews.contains(path)
  }

  pub fn render(&self, root: &Value, html: &dyn HtmlPreview) -> Vec<NodeView> {
    let mut rows = Vec::new();
    let mut path = Vec::new();
    self.render_node(root, &mut path, None, false, html, &mut rows);
    rows
  }

  fn render_node(
    &self,
    value: &Value,
    path: &mut Vec<JsonPathSegment>,
    label: Option<String>,
    removable: bool,
    html: &dyn HtmlPreview,
    out: &mut Vec<NodeView>,
  ) {
    let control = match value {
      Value::Object(map) => self.container(value, path, map.len(), false),
      Value::Array(items) => self.container(value, path, items.len(), true),
      Value::String(s) => {
        let html_eligible = is_markup(s);
        let preview = if html_eligible && self.is_previewing(path) {
          Some(html.render_markup(s))
        } else {
          None
        };
        NodeControl::TextArea {
          value: s.clone(),
          html_eligible,
          preview,
        }
      }
      Value::Number(n) => NodeControl::NumberInput {
        value: n.to_string(),
      },
      Value::Bool(b) => NodeControl::BooleanSelect { value: *b },
      Value::Null => NodeControl::ReadOnly {
        text: "null".to_string(),
      },
    };
    let expanded = matches!(control, NodeControl::Container { expanded: true, .. });

    out.push(NodeView {
      path: path.clone(),
      depth: path.len(),
      label,
      kind: JsonNodeKind::of(value),
      removable,
      control,
    });

    if !expanded {
      return;
    }
    match value {
      Value::Object(map) => {
        for (key, child) in map {
          path.push(JsonPathSegment::Key(key.clone()));
          self.render_node(child, path, Some(key.clone()), false, html, out);
          path.pop();
        }
      }
      Value::Array(items) => {
        for (i, child) in items.iter().enumerate() {
          path.push(JsonPathSegment::Index(i as u64));
          self.render_node(child, path, Some(format!("[{i}]")), true, html, out);
          path.pop();
        }
      }
      _ => {}
    }
  }

  fn container(
    &self,
    value: &Value,
    path: &[JsonPathSegment],
    len: usize,
    is_array: bool,
  ) -> NodeControl {
    let expanded = self.is_expanded(path);
    NodeControl::Container {
      len,
      expanded,
      can_add_item: is_array,
      summary: (!expanded).then(|| truncate_chars(&compact(value), self.preview_max_chars)),
    }
  }

  /// Apply one edit to the node at `path` inside `root`.
  ///
  /// Value and structural edits return [`Commit::Value`] with a rebuilt root;
  /// `root` itself is never modified.
  pub fn commit(
    &mut self,
    root: &Value,
    path: &[JsonPathSegment],
    edit: &EditRequest,
  ) -> Result<Commit, EditError> {
    let target =
      get_at(root, path).ok_or_else(|| EditError::PathNotFound(format_json_pointer(path)))?;

    match edit {
      EditRequest::SetString { value } => {
        expect_kind(target, JsonNodeKind::String)?;
        let next = replace_at(root, path, Value::String(value.clone()))?;
        Ok(Commit::Value(next))
      }
      EditRequest::SetNumber { text } => {
        expect_kind(target, JsonNodeKind::Number)?;
        let n = parse_number(text).ok_or_else(|| EditError::InvalidNumber(text.clone()))?;
        let next = replace_at(root, path, Value::Number(n))?;
        Ok(Commit::Value(next))
      }
      EditRequest::SetBoolean { value } => {
        expect_kind(target, JsonNodeKind::Boolean)?;
        let next = replace_at(root, path, Value::Bool(*value))?;
        Ok(Commit::Value(next))
      }
      EditRequest::AddItem => {
        let items = expect_array(target)?;
        let grown = append_item(items, self.empty_array_item);
        let next = replace_at(root, path, Value::Array(grown))?;
        Ok(Commit::Value(next))
      }
      EditRequest::RemoveItem { index } => {
        let items = expect_array(target)?;
        let idx = usize::try_from(*index).map_err(|_| EditError::IndexOutOfRange {
          index: *index,
          len: items.len(),
        })?;
        let shrunk = remove_item(items, idx)?;
        let next = replace_at(root, path, Value::Array(shrunk))?;
        self.view.forget_index(path, *index);
        Ok(Commit::Value(next))
      }
      EditRequest::ToggleExpanded => {
        if !matches!(target, Value::Object(_) | Value::Array(_)) {
          return Err(EditError::KindMismatch {
            expected: "object or array",
            found: JsonNodeKind::of(target).as_str(),
          });
        }
        let now = !self.is_expanded(path);
        self.view.expanded.insert(path.to_vec(), now);
        Ok(Commit::View)
      }
      EditRequest::TogglePreview => {
        let s = expect_kind(target, JsonNodeKind::String)?
          .as_str()
          .unwrap_or_default();
        if !is_markup(s) {
          return Err(EditError::NotHtml);
        }
        if !self.view.previews.remove(path) {
          self.view.previews.insert(path.to_vec());
        }
        Ok(Commit::View)
      }
    }
  }
}

fn expect_kind(value: &Value, kind: JsonNodeKind) -> Result<&Value, EditError> {
  let found = JsonNodeKind::of(value);
  if found != kind {
    return Err(EditError::KindMismatch {
      expected: kind.as_str(),
      found: found.as_str(),
    });
  }
  Ok(value)
}

fn expect_array(value: &Value) -> Result<&[Value], EditError> {
  match value {
    Value::Array(items) => Ok(items),
    other => Err(EditError::KindMismatch {
      expected: JsonNodeKind::Array.as_str(),
      found: JsonNodeKind::of(other).as_str(),
    }),
  }
}

fn truncate_chars(s: &str, max: usize) -> String {
  if max == 0 {
    return String::new();
  }
  let mut out = String::new();
  for (i, ch) in s.chars().enumerate() {
    if i >= max {
      out.push('…');
      break;
    }
    out.push(ch);
  }
  out
}
