mod bridge;
mod cursor;
mod document;
mod editor;
mod engine;
mod models;
mod path;
mod schema;

pub use crate::bridge::{number_from_f64, parse, parse_number, serialize, ParseError, INDENT};
pub use crate::document::Document;
pub use crate::editor::{is_markup, Commit, EditError, HtmlPreview, PlainPreview, TreeEditor};
pub use crate::engine::{normalize, Clipboard, CoreEngine, CoreError, CoreOptions};
pub use crate::models::{
  EditRequest, EditorSnapshot, EmptyArrayItem, JsonNodeKind, JsonPathSegment, NodeControl,
  NodeView, RowPage, SessionInfo,
};
pub use crate::path::{escape_component, format_json_pointer, get_at, replace_at};
pub use crate::schema::{append_item, infer_new_item, remove_item, zero_value};
