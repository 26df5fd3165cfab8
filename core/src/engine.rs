use std::{
  collections::HashMap,
  sync::Arc,
  time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
  bridge::{self, ParseError},
  cursor::{decode_cursor, encode_cursor, Cursor},
  document::Document,
  editor::{Commit, EditError, HtmlPreview, PlainPreview, TreeEditor},
  models::{EditRequest, EditorSnapshot, EmptyArrayItem, JsonPathSegment, NodeView, RowPage, SessionInfo},
  path::format_json_pointer,
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("unknown session: {0}")]
  UnknownSession(String),
  #[error(transparent)]
  Parse(#[from] ParseError),
  #[error("edit rejected: {0}")]
  Edit(#[from] EditError),
  #[error("bad cursor token: {0}")]
  BadCursor(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreOptions {
  pub default_page_size: usize,
  /// Max chars of the one-line summary shown for a collapsed container.
  pub preview_max_chars: usize,
  /// Whether containers start expanded when nothing was toggled yet.
  pub default_expanded: bool,
  pub empty_array_item: EmptyArrayItem,
}

impl Default for CoreOptions {
  fn default() -> Self {
    Self {
      default_page_size: 50,
      preview_max_chars: 80,
      default_expanded: true,
      empty_array_item: EmptyArrayItem::Object,
    }
  }
}

/// Receives the canonical text on "copy".
pub trait Clipboard {
  fn set_text(&mut self, text: &str);
}

#[derive(Debug, Clone)]
struct SessionState {
  info: SessionInfo,
  /// Last successfully parsed document.
  document: Document,
  /// What the raw text surface currently shows.
  raw_text: String,
  error: Option<ParseError>,
  editor: TreeEditor,
  revision: u64,
}

/// Session registry. Every call locks the registry for its whole duration, so
/// edits to one document are applied one at a time.
#[derive(Clone)]
pub struct CoreEngine {
  options: CoreOptions,
  sessions: Arc<Mutex<HashMap<String, SessionState>>>,
  html: Arc<dyn HtmlPreview + Send + Sync>,
}

impl CoreEngine {
  pub fn new(options: CoreOptions) -> Self {
    Self {
      options,
      sessions: Arc::new(Mutex::new(HashMap::new())),
      html: Arc::new(PlainPreview),
    }
  }

  pub fn with_html_preview(mut self, html: impl HtmlPreview + Send + Sync + 'static) -> Self {
    self.html = Arc::new(html);
    self
  }

  /// IPC API: open_document(text?) -> { session, snapshot }
  ///
  /// Without text the tree starts as an empty object. With text this behaves like
  /// an immediate `set_text`, so invalid text opens a session in the error state.
  pub fn open_document(
    &self,
    text: Option<&str>,
  ) -> Result<(SessionInfo, EditorSnapshot), CoreError> {
    let session_id = Uuid::new_v4().to_string();
    let info = SessionInfo {
      session_id: session_id.clone(),
      created_at_ms: now_ms(),
    };
    let document = Document::empty();
    let state = SessionState {
      info: info.clone(),
      raw_text: document.text().to_string(),
      document,
      error: None,
      editor: TreeEditor::new(&self.options),
      revision: 0,
    };
    self.sessions.lock().insert(session_id.clone(), state);
    debug!(session = %session_id, "opened document");

    let snapshot = match text {
      Some(text) => self.set_text(&session_id, text)?,
      None => self.snapshot(&session_id)?,
    };
    Ok((info, snapshot))
  }

  /// IPC API: set_text(session_id, text) -> EditorSnapshot
  ///
  /// Full-text resubmission from the raw input surface. A parse failure keeps the
  /// last valid tree and reports the error in the snapshot instead of failing the call.
  pub fn set_text(&self, session_id: &str, text: &str) -> Result<EditorSnapshot, CoreError> {
    let mut sessions = self.sessions.lock();
    let s = sessions
      .get_mut(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;

    s.raw_text = text.to_string();
    match Document::from_text(text) {
      Ok(document) => {
        s.document = document;
        s.editor.reset_view();
        s.error = None;
        s.revision += 1;
        debug!(session = %session_id, revision = s.revision, "reparsed text");
      }
      Err(err) => {
        debug!(session = %session_id, error = %err, "text rejected");
        s.error = Some(err);
      }
    }
    Ok(self.snapshot_of(s))
  }

  /// IPC API: edit(session_id, path, request) -> EditorSnapshot
  ///
  /// `path` is the binding from a rendered [`NodeView`]. Value edits replace the
  /// document and rewrite the raw text with the canonical serialization.
  pub fn edit(
    &self,
    session_id: &str,
    path: &[JsonPathSegment],
    request: EditRequest,
  ) -> Result<EditorSnapshot, CoreError> {
    let mut sessions = self.sessions.lock();
    let s = sessions
      .get_mut(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    if let Some(err) = &s.error {
      return Err(CoreError::Parse(err.clone()));
    }

    match s.editor.commit(s.document.value(), path, &request)? {
      Commit::Value(root) => {
        s.document.replace_value(root);
        s.raw_text = s.document.text().to_string();
      }
      Commit::View => {}
    }
    s.revision += 1;
    if request.is_view_only() {
      debug!(
        session = %session_id,
        pointer = %format_json_pointer(path),
        edit = request.name(),
        "view toggled"
      );
    } else {
      debug!(
        session = %session_id,
        pointer = %format_json_pointer(path),
        edit = request.name(),
        revision = s.revision,
        "committed edit"
      );
    }
    Ok(self.snapshot_of(s))
  }

  pub fn snapshot(&self, session_id: &str) -> Result<EditorSnapshot, CoreError> {
    let sessions = self.sessions.lock();
    let s = sessions
      .get(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    Ok(self.snapshot_of(s))
  }

  /// IPC API: rows_page(session_id, cursor, page_size) -> RowPage
  ///
  /// Cursor tokens are only valid for the revision that produced them.
  pub fn rows_page(
    &self,
    session_id: &str,
    cursor: Option<&str>,
    page_size: usize,
  ) -> Result<RowPage, CoreError> {
    let page_size = if page_size == 0 {
      self.options.default_page_size
    } else {
      page_size
    };
    let sessions = self.sessions.lock();
    let s = sessions
      .get(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    let c = decode_cursor(cursor, s.revision)?;

    let rows = self.render_rows(s);
    let total = rows.len();
    let start = usize::try_from(c.row).unwrap_or(usize::MAX).min(total);
    let end = start.saturating_add(page_size).min(total);
    let reached_end = end >= total;
    let next_cursor = if reached_end {
      None
    } else {
      Some(encode_cursor(Cursor {
        row: end as u64,
        revision: s.revision,
      })?)
    };
    Ok(RowPage {
      rows: rows.into_iter().skip(start).take(end - start).collect(),
      next_cursor,
      reached_end,
    })
  }

  /// Canonical serialization of the last valid document.
  pub fn canonical_text(&self, session_id: &str) -> Result<String, CoreError> {
    let sessions = self.sessions.lock();
    let s = sessions
      .get(session_id)
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))?;
    Ok(s.document.text().to_string())
  }

  pub fn copy_to_clipboard(
    &self,
    session_id: &str,
    clipboard: &mut impl Clipboard,
  ) -> Result<(), CoreError> {
    let text = self.canonical_text(session_id)?;
    clipboard.set_text(&text);
    Ok(())
  }

  pub fn close(&self, session_id: &str) -> Result<(), CoreError> {
    self
      .sessions
      .lock()
      .remove(session_id)
      .map(|_| ())
      .ok_or_else(|| CoreError::UnknownSession(session_id.to_string()))
  }

  fn render_rows(&self, s: &SessionState) -> Vec<NodeView> {
    if s.error.is_some() {
      return Vec::new();
    }
    s.editor.render(s.document.value(), self.html.as_ref())
  }

  fn snapshot_of(&self, s: &SessionState) -> EditorSnapshot {
    EditorSnapshot {
      session_id: s.info.session_id.clone(),
      revision: s.revision,
      text: s.raw_text.clone(),
      error: s.error.as_ref().map(ToString::to_string),
      rows: self.render_rows(s),
    }
  }
}

/// Parse and re-serialize without opening a session.
pub fn normalize(text: &str) -> Result<String, CoreError> {
  let value = bridge::parse(text)?;
  Ok(bridge::serialize(&value))
}

fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}
