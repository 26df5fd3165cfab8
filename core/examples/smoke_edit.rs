use je_core::{CoreEngine, CoreOptions, EditRequest, NodeControl};

fn main() -> Result<(), String> {
  let text = std::env::args().nth(1).ok_or_else(|| {
    "usage: cargo run -p je_core --example smoke_edit -- '<json text>'".to_string()
  })?;

  let eng = CoreEngine::new(CoreOptions::default());
  let (session, snap) = eng.open_document(Some(&text)).map_err(|e| e.to_string())?;
  if let Some(err) = &snap.error {
    println!("error={err}");
    return Ok(());
  }
  for row in &snap.rows {
    println!(
      "{}{} {:?}",
      "  ".repeat(row.depth),
      row.label.as_deref().unwrap_or("$"),
      row.control
    );
  }

  // Bump the first number, if any, to show a round trip through the tree.
  let first_number = snap.rows.iter().find_map(|r| match &r.control {
    NodeControl::NumberInput { value } => Some((r.path.clone(), value.clone())),
    _ => None,
  });
  if let Some((path, value)) = first_number {
    let bumped = value.parse::<f64>().map(|n| n + 1.0).unwrap_or(0.0);
    let snap = eng
      .edit(
        &session.session_id,
        &path,
        EditRequest::SetNumber {
          text: bumped.to_string(),
        },
      )
      .map_err(|e| e.to_string())?;
    println!("{}", snap.text);
  }
  Ok(())
}
