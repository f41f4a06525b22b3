//! Opaque pagination tokens.
//!
//! A token is standard base64 of `id`, or of `"{id}_{epoch_millis}"` when a
//! timestamp is attached. Decoding splits on the last `_` only when the
//! suffix parses as an integer, so ids may themselves contain underscores.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};

use crate::error::CoreError;

const SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub id: String,
    /// Epoch milliseconds.
    pub timestamp: Option<i64>,
}

impl Cursor {
    #[must_use]
    pub fn new(id: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            id: id.into(),
            timestamp,
        }
    }

    /// Cursor for a row, stamped with its creation time.
    #[must_use]
    pub fn for_row(id: &str, created_at: DateTime<Utc>) -> Self {
        Self::new(id, Some(created_at.timestamp_millis()))
    }

    #[must_use]
    pub fn encode(&self) -> String {
        encode(&self.id, self.timestamp)
    }

    /// The attached timestamp as a UTC datetime, if any and in range.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

#[must_use]
pub fn encode(id: &str, timestamp: Option<i64>) -> String {
    match timestamp {
        Some(ts) => STANDARD.encode(format!("{id}{SEPARATOR}{ts}")),
        None => STANDARD.encode(id),
    }
}

/// # Errors
///
/// Returns [`CoreError::InvalidCursor`] when the token is not base64, does
/// not decode to UTF-8, or carries an empty id.
pub fn decode(token: &str) -> Result<Cursor, CoreError> {
    let bytes = STANDARD
        .decode(token.trim())
        .map_err(|e| CoreError::InvalidCursor(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| CoreError::InvalidCursor(e.to_string()))?;

    let stamped = text
        .rsplit_once(SEPARATOR)
        .and_then(|(id, suffix)| suffix.parse::<i64>().ok().map(|ts| (id.to_string(), ts)));
    let cursor = match stamped {
        Some((id, ts)) => Cursor::new(id, Some(ts)),
        None => Cursor::new(text, None),
    };

    if cursor.id.is_empty() {
        return Err(CoreError::InvalidCursor("cursor has an empty id".to_string()));
    }
    Ok(cursor)
}
