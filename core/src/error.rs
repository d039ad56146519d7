use std::fmt;

/// Failures surfaced by the map engine.
///
/// Only `Allocation` is fatal. A `MalformedPayload` drops the remainder of a
/// single command and everything applied before the bad byte stays in the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// The payload ended (or was inconsistent) before the command was complete.
    MalformedPayload {
        command: &'static str,
        offset: usize,
        cells_applied: usize,
    },
    /// Negotiated viewport exceeds what the protocol can address.
    ViewportTooLarge { width: usize, height: usize },
    /// The cell buffer for a resize could not be reserved.
    Allocation { cells: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::MalformedPayload {
                command,
                offset,
                cells_applied,
            } => write!(
                f,
                "malformed {command} payload at byte {offset} ({cells_applied} cells applied before it)"
            ),
            MapError::ViewportTooLarge { width, height } => {
                write!(f, "viewport {width}x{height} exceeds the protocol maximum")
            }
            MapError::Allocation { cells } => {
                write!(f, "failed to allocate map grid of {cells} cells")
            }
        }
    }
}

impl std::error::Error for MapError {}

impl MapError {
    /// Whether the process can keep running after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, MapError::Allocation { .. })
    }
}
