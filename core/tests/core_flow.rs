use je_core::{
  Clipboard, CoreEngine, CoreError, CoreOptions, EditRequest, EmptyArrayItem, HtmlPreview,
  JsonPathSegment, NodeControl,
};

fn key(k: &str) -> JsonPathSegment {
  JsonPathSegment::Key(k.to_string())
}

fn idx(i: u64) -> JsonPathSegment {
  JsonPathSegment::Index(i)
}

fn engine() -> CoreEngine {
  CoreEngine::new(CoreOptions::default())
}

#[derive(Default)]
struct RecordingClipboard {
  copied: Vec<String>,
}

impl Clipboard for RecordingClipboard {
  fn set_text(&mut self, text: &str) {
    self.copied.push(text.to_string());
  }
}

struct Bracketed;

impl HtmlPreview for Bracketed {
  fn render_markup(&self, source: &str) -> String {
    format!("[rendered {} chars]", source.chars().count())
  }
}

#[test]
fn open_without_text_mounts_empty_object() {
  let eng = engine();
  let (session, snap) = eng.open_document(None).unwrap();
  assert_eq!(snap.session_id, session.session_id);
  assert_eq!(snap.text, "{}");
  assert!(snap.error.is_none());
  assert_eq!(snap.rows.len(), 1);
}

#[test]
fn edit_nested_leaf_and_serialize() {
  let eng = engine();
  let (session, snap) = eng
    .open_document(Some(r#"{"a": 1, "b": [{"x": "hi"}]}"#))
    .unwrap();
  let sid = session.session_id;
  assert_eq!(snap.rows.len(), 5);

  let snap = eng
    .edit(
      &sid,
      &[key("b"), idx(0), key("x")],
      EditRequest::SetString { value: "bye".into() },
    )
    .unwrap();
  assert_eq!(
    snap.text,
    "{\n  \"a\": 1,\n  \"b\": [\n    {\n      \"x\": \"bye\"\n    }\n  ]\n}"
  );
  assert_eq!(eng.canonical_text(&sid).unwrap(), snap.text);
}

#[test]
fn leaf_edit_changes_exactly_one_line() {
  let eng = engine();
  let (session, before) = eng
    .open_document(Some(r#"{"z": true, "m": {"n": 1.5, "s": "x"}, "a": [1, 2, 3]}"#))
    .unwrap();
  let before_text = eng.canonical_text(&session.session_id).unwrap();
  assert_ne!(before.text, before_text); // raw text is kept as typed until the first tree edit

  let after = eng
    .edit(
      &session.session_id,
      &[key("m"), key("n")],
      EditRequest::SetNumber { text: "7".into() },
    )
    .unwrap();
  let diff: Vec<(&str, &str)> = before_text
    .lines()
    .zip(after.text.lines())
    .filter(|(a, b)| a != b)
    .collect();
  assert_eq!(before_text.lines().count(), after.text.lines().count());
  assert_eq!(diff, vec![("    \"n\": 1.5,", "    \"n\": 7,")]);
}

#[test]
fn invalid_text_keeps_last_valid_tree() {
  let eng = engine();
  let (session, _) = eng.open_document(Some(r#"{"keep": 1}"#)).unwrap();
  let sid = session.session_id;

  let snap = eng.set_text(&sid, "not json").unwrap();
  assert!(snap.error.as_deref().unwrap().starts_with("invalid JSON"));
  assert!(snap.rows.is_empty());
  assert_eq!(snap.text, "not json");
  assert_eq!(eng.canonical_text(&sid).unwrap(), "{\n  \"keep\": 1\n}");

  let err = eng
    .edit(&sid, &[key("keep")], EditRequest::SetNumber { text: "2".into() })
    .unwrap_err();
  assert!(matches!(err, CoreError::Parse(_)));

  let snap = eng.set_text(&sid, r#"{"keep": 3}"#).unwrap();
  assert!(snap.error.is_none());
  assert_eq!(snap.rows.len(), 2);
}

#[test]
fn invalid_text_before_first_success_shows_nothing() {
  let eng = engine();
  let (session, snap) = eng.open_document(Some("{\"a\":")).unwrap();
  assert!(snap.error.is_some());
  assert!(snap.rows.is_empty());
  assert_eq!(eng.canonical_text(&session.session_id).unwrap(), "{}");
}

#[test]
fn add_item_on_empty_array_is_deterministic() {
  let eng = engine();
  let (session, _) = eng.open_document(Some(r#"{"b": []}"#)).unwrap();
  let snap = eng
    .edit(&session.session_id, &[key("b")], EditRequest::AddItem)
    .unwrap();
  assert_eq!(snap.text, "{\n  \"b\": [\n    {}\n  ]\n}");

  let eng = CoreEngine::new(CoreOptions {
    empty_array_item: EmptyArrayItem::String,
    ..CoreOptions::default()
  });
  let (session, _) = eng.open_document(Some(r#"{"b": []}"#)).unwrap();
  let snap = eng
    .edit(&session.session_id, &[key("b")], EditRequest::AddItem)
    .unwrap();
  assert_eq!(snap.text, "{\n  \"b\": [\n    \"\"\n  ]\n}");
}

#[test]
fn add_then_remove_items() {
  let eng = engine();
  let (session, _) = eng
    .open_document(Some(r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#))
    .unwrap();
  let sid = session.session_id;

  eng.edit(&sid, &[], EditRequest::AddItem).unwrap();
  let text = eng.canonical_text(&sid).unwrap();
  let v = je_core::parse(&text).unwrap();
  assert_eq!(v.as_array().unwrap().len(), 3);
  assert_eq!(v[2], serde_json::json!({"id": 0, "name": ""}));

  eng.edit(&sid, &[], EditRequest::RemoveItem { index: 0 }).unwrap();
  let v = je_core::parse(&eng.canonical_text(&sid).unwrap()).unwrap();
  assert_eq!(
    v,
    serde_json::json!([{"id": 2, "name": "b"}, {"id": 0, "name": ""}])
  );

  let err = eng
    .edit(&sid, &[], EditRequest::RemoveItem { index: 5 })
    .unwrap_err();
  assert!(matches!(err, CoreError::Edit(_)));
}

#[test]
fn rejected_number_leaves_document_alone() {
  let eng = engine();
  let (session, _) = eng.open_document(Some(r#"{"n": 1}"#)).unwrap();
  let sid = session.session_id;
  let before = eng.snapshot(&sid).unwrap();

  let err = eng
    .edit(&sid, &[key("n")], EditRequest::SetNumber { text: "".into() })
    .unwrap_err();
  assert!(matches!(err, CoreError::Edit(je_core::EditError::InvalidNumber(_))));
  let after = eng.snapshot(&sid).unwrap();
  assert_eq!(after.text, before.text);
  assert_eq!(after.revision, before.revision);
}

#[test]
fn reparse_resets_expansion() {
  let eng = engine();
  let (session, _) = eng.open_document(Some(r#"{"o": {"k": 1}}"#)).unwrap();
  let sid = session.session_id;

  let snap = eng.edit(&sid, &[key("o")], EditRequest::ToggleExpanded).unwrap();
  assert_eq!(snap.rows.len(), 2);
  assert_eq!(eng.canonical_text(&sid).unwrap(), "{\n  \"o\": {\n    \"k\": 1\n  }\n}");

  let snap = eng.set_text(&sid, r#"{"o": {"k": 2}}"#).unwrap();
  assert_eq!(snap.rows.len(), 3);
}

#[test]
fn toggles_bump_revision_but_keep_text() {
  let eng = engine();
  let (session, before) = eng.open_document(Some(r#"{"o": [1, 2]}"#)).unwrap();
  let after = eng
    .edit(&session.session_id, &[key("o")], EditRequest::ToggleExpanded)
    .unwrap();
  assert!(EditRequest::ToggleExpanded.is_view_only());
  assert!(!EditRequest::AddItem.is_view_only());
  assert_eq!(after.text, before.text);
  assert_eq!(after.revision, before.revision + 1);
  assert_eq!(after.rows.len(), 2);
}

#[test]
fn huge_number_literals_survive_edits_elsewhere() {
  let eng = engine();
  let (session, snap) = eng
    .open_document(Some(r#"{"big": 1e400, "f": 2.3841977108783828e225, "s": "a"}"#))
    .unwrap();
  assert!(snap.error.is_none());
  let snap = eng
    .edit(&session.session_id, &[key("s")], EditRequest::SetString { value: "b".into() })
    .unwrap();
  assert_eq!(
    snap.text,
    "{\n  \"big\": 1e400,\n  \"f\": 2.3841977108783828e225,\n  \"s\": \"b\"\n}"
  );
}

#[test]
fn array_rows_are_labelled_by_index() {
  let eng = engine();
  let (_, snap) = eng.open_document(Some(r#"["x", "y"]"#)).unwrap();
  let labels: Vec<Option<&str>> = snap.rows.iter().map(|r| r.label.as_deref()).collect();
  assert_eq!(labels, vec![None, Some("[0]"), Some("[1]")]);
}

#[test]
fn html_preview_goes_through_collaborator() {
  let eng = engine().with_html_preview(Bracketed);
  let (session, _) = eng.open_document(Some(r#"{"h": "<p>x</p>"}"#)).unwrap();
  let snap = eng
    .edit(&session.session_id, &[key("h")], EditRequest::TogglePreview)
    .unwrap();
  assert_eq!(
    snap.rows[1].control,
    NodeControl::TextArea {
      value: "<p>x</p>".into(),
      html_eligible: true,
      preview: Some("[rendered 8 chars]".into()),
    }
  );
  assert_eq!(eng.canonical_text(&session.session_id).unwrap(), "{\n  \"h\": \"<p>x</p>\"\n}");
}

#[test]
fn rows_page_cursor_no_dup_no_drop() {
  let eng = engine();
  let (session, _) = eng.open_document(Some("[1, 2, 3, 4]")).unwrap();
  let sid = session.session_id;

  let p1 = eng.rows_page(&sid, None, 2).unwrap();
  assert_eq!(p1.rows.len(), 2);
  assert!(!p1.reached_end);
  assert!(p1.rows[0].path.is_empty());
  assert_eq!(p1.rows[1].path, vec![idx(0)]);

  let cursor = p1.next_cursor.clone().unwrap();
  let p2 = eng.rows_page(&sid, Some(&cursor), 2).unwrap();
  assert_eq!(p2.rows[0].path, vec![idx(1)]);
  assert_eq!(p2.rows[1].path, vec![idx(2)]);

  let p3 = eng
    .rows_page(&sid, p2.next_cursor.as_deref(), 2)
    .unwrap();
  assert_eq!(p3.rows.len(), 1);
  assert!(p3.reached_end);
  assert!(p3.next_cursor.is_none());

  eng.edit(&sid, &[idx(0)], EditRequest::SetNumber { text: "9".into() }).unwrap();
  let err = eng.rows_page(&sid, Some(&cursor), 2).unwrap_err();
  assert!(matches!(err, CoreError::BadCursor(_)));
}

#[test]
fn copy_sends_canonical_text() {
  let eng = engine();
  let (session, _) = eng.open_document(Some(r#"{"a":[true,null]}"#)).unwrap();
  let mut clip = RecordingClipboard::default();
  eng.copy_to_clipboard(&session.session_id, &mut clip).unwrap();
  assert_eq!(clip.copied, vec!["{\n  \"a\": [\n    true,\n    null\n  ]\n}".to_string()]);
}

#[test]
fn unknown_and_closed_sessions() {
  let eng = engine();
  assert!(matches!(
    eng.snapshot("nope"),
    Err(CoreError::UnknownSession(_))
  ));
  let (session, _) = eng.open_document(None).unwrap();
  eng.close(&session.session_id).unwrap();
  assert!(matches!(
    eng.set_text(&session.session_id, "{}"),
    Err(CoreError::UnknownSession(_))
  ));
}

#[test]
fn options_load_from_json() {
  let opts: CoreOptions =
    serde_json::from_str(r#"{"default_expanded": false, "empty_array_item": "string"}"#).unwrap();
  assert!(!opts.default_expanded);
  assert_eq!(opts.empty_array_item, EmptyArrayItem::String);
  assert_eq!(opts.default_page_size, CoreOptions::default().default_page_size);
}
