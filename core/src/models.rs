use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
  pub session_id: String,
  pub created_at_ms: i64,
}

/// A JSON path segment used by the UI to refer to a subtree.
///
/// This is intentionally "untagged" so the IPC payload can be a simple
/// array like `["foo", 0, "bar"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum JsonPathSegment {
  Key(String),
  Index(u64),
}

impl From<&str> for JsonPathSegment {
  fn from(key: &str) -> Self {
    JsonPathSegment::Key(key.to_string())
  }
}

impl From<u64> for JsonPathSegment {
  fn from(index: u64) -> Self {
    JsonPathSegment::Index(index)
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JsonNodeKind {
  Object,
  Array,
  String,
  Number,
  Boolean,
  Null,
}

impl JsonNodeKind {
  pub fn of(value: &Value) -> Self {
    match value {
      Value::Object(_) => JsonNodeKind::Object,
      Value::Array(_) => JsonNodeKind::Array,
      Value::String(_) => JsonNodeKind::String,
      Value::Number(_) => JsonNodeKind::Number,
      Value::Bool(_) => JsonNodeKind::Boolean,
      Value::Null => JsonNodeKind::Null,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      JsonNodeKind::Object => "object",
      JsonNodeKind::Array => "array",
      JsonNodeKind::String => "string",
      JsonNodeKind::Number => "number",
      JsonNodeKind::Boolean => "boolean",
      JsonNodeKind::Null => "null",
    }
  }
}

/// The input widget the host should draw for one node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum NodeControl {
  /// Object or array header. Children follow as separate rows only when `expanded`.
  Container {
    len: usize,
    expanded: bool,
    /// True for arrays: the host offers an "add item" button.
    can_add_item: bool,
    /// Compact one-line preview, present only while collapsed.
    summary: Option<String>,
  },
  /// Free text. `preview` carries rendered markup while the preview toggle is on.
  TextArea {
    value: String,
    html_eligible: bool,
    preview: Option<String>,
  },
  NumberInput { value: String },
  BooleanSelect { value: bool },
  ReadOnly { text: String },
}

/// One rendered row of the tree.
///
/// `path` is the binding: the host sends it back unchanged with an [`EditRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeView {
  pub path: Vec<JsonPathSegment>,
  pub depth: usize,
  /// Object key or array index; `None` for the root.
  pub label: Option<String>,
  pub kind: JsonNodeKind,
  /// Array elements carry a "remove item" button.
  pub removable: bool,
  pub control: NodeControl,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EditRequest {
  SetString { value: String },
  /// Raw text from the numeric input; parsed (and possibly rejected) by the editor.
  SetNumber { text: String },
  SetBoolean { value: bool },
  /// Append to the array at the path.
  AddItem,
  /// Remove element `index` from the array at the path.
  RemoveItem { index: u64 },
  ToggleExpanded,
  TogglePreview,
}

impl EditRequest {
  pub fn name(&self) -> &'static str {
    match self {
      EditRequest::SetString { .. } => "set_string",
      EditRequest::SetNumber { .. } => "set_number",
      EditRequest::SetBoolean { .. } => "set_boolean",
      EditRequest::AddItem => "add_item",
      EditRequest::RemoveItem { .. } => "remove_item",
      EditRequest::ToggleExpanded => "toggle_expanded",
      EditRequest::TogglePreview => "toggle_preview",
    }
  }

  /// View-only requests never produce a new document value.
  pub fn is_view_only(&self) -> bool {
    matches!(self, EditRequest::ToggleExpanded | EditRequest::TogglePreview)
  }
}

/// What "add item" appends to an array that has no first element to copy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyArrayItem {
  #[default]
  Object,
  String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorSnapshot {
  pub session_id: String,
  pub revision: u64,
  /// Text for the raw input surface: exactly what was typed, or the canonical
  /// serialization after a tree edit.
  pub text: String,
  pub error: Option<String>,
  /// Empty while `error` is set.
  pub rows: Vec<NodeView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowPage {
  pub rows: Vec<NodeView>,
  pub next_cursor: Option<String>,
  pub reached_end: bool,
}
