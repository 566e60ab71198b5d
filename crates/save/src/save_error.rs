// ---------------------------------------------------------------------------
// SaveError: error type for selection persistence
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors from reading or writing the persisted selection.
///
/// None of these ever reach the selection store: `StoragePersistence` logs
/// and swallows them.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error from the native file backend.
    Io(std::io::Error),
    /// The selection could not be serialised.
    Encode(String),
    /// The stored blob is not valid JSON or not a JSON object.
    Decode(String),
    /// The blob was written by a newer build.
    VersionMismatch { expected_max: u32, found: u32 },
    /// The storage backend is unavailable or refused the operation
    /// (disabled storage, quota exceeded).
    Storage(String),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: selection is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::Storage(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}
