use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::engine::CoreError;

/// Position in the flattened row list of one document revision.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct Cursor {
  pub row: u64,
  pub revision: u64,
}

pub(crate) fn encode_cursor(c: Cursor) -> Result<String, CoreError> {
  let json = serde_json::to_vec(&c).map_err(|e| CoreError::BadCursor(e.to_string()))?;
  Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json))
}

/// Decode a token handed out for `revision`. A missing or empty token starts at row 0;
/// a token from an older revision is rejected because the rows have moved.
pub(crate) fn decode_cursor(token: Option<&str>, revision: u64) -> Result<Cursor, CoreError> {
  match token {
    None => Ok(Cursor { row: 0, revision }),
    Some(t) if t.is_empty() => Ok(Cursor { row: 0, revision }),
    Some(t) => {
      let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(t)
        .map_err(|e| CoreError::BadCursor(e.to_string()))?;
      let c: Cursor =
        serde_json::from_slice(&bytes).map_err(|e| CoreError::BadCursor(e.to_string()))?;
      if c.revision != revision {
        return Err(CoreError::BadCursor(format!(
          "stale cursor: revision {} but document is at {}",
          c.revision, revision
        )));
      }
      Ok(c)
    }
  }
}
