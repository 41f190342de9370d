//! Source positions attached to builder operations and diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in the design source, used only for error reporting.
///
/// Line numbers are 1-indexed; a line of 0 means the position is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilePos {
    /// The source file name as given to the front end.
    pub filename: String,
    /// The line number (1-indexed).
    pub line: u32,
}

impl FilePos {
    /// Creates a position in `filename` at `line`.
    pub fn new(filename: impl Into<String>, line: u32) -> Self {
        Self {
            filename: filename.into(),
            line,
        }
    }
}

impl fmt::Display for FilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let pos = FilePos::new("fsm.sv", 12);
        assert_eq!(format!("{pos}"), "fsm.sv:12");
    }

    #[test]
    fn default_is_unknown() {
        let pos = FilePos::default();
        assert_eq!(pos.line, 0);
        assert!(pos.filename.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let pos = FilePos::new("top.sv", 3);
        let json = serde_json::to_string(&pos).unwrap();
        let back: FilePos = serde_json::from_str(&json).unwrap();
        assert_eq!(pos, back);
    }
}
