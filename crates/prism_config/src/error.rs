//! Error types for configuration loading and validation.

use std::fmt;

/// Errors that can occur when loading or validating a hardware configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The file could not be parsed; the diagnostic points at the error.
    #[error("{0}")]
    ParseError(ParseDiagnostic),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),
}

/// A parse error located in the configuration source.
///
/// Renders as four lines, each prefixed with `file:line:col`: a header, the
/// offending source line, a caret under the error column, and the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// The configuration file name.
    pub file: String,
    /// Line of the error (1-indexed).
    pub line: usize,
    /// Column of the error in characters (1-indexed).
    pub column: usize,
    /// The full text of the offending line.
    pub source_line: String,
    /// The parser's message.
    pub message: String,
}

impl ParseDiagnostic {
    /// Locates byte `offset` of `source` and builds a diagnostic for it.
    ///
    /// An offset inside a multi-byte character points at that character.
    pub fn at(file: &str, source: &str, offset: usize, message: impl Into<String>) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let line_end = source[offset..]
            .find('\n')
            .map_or(source.len(), |i| offset + i);
        Self {
            file: file.to_string(),
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
            source_line: source[line_start..line_end].to_string(),
            message: message.into(),
        }
    }

    /// Returns the caret line, keeping tabs so the caret lines up.
    fn pointer(&self) -> String {
        let mut point: String = self
            .source_line
            .chars()
            .take(self.column - 1)
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        point.push('^');
        point
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let desc = format!("{}:{}:{}", self.file, self.line, self.column);
        writeln!(f, "{desc}: error parsing config")?;
        writeln!(f, "{desc}: {}", self.source_line)?;
        writeln!(f, "{desc}: {}", self.pointer())?;
        write!(f, "{desc}: error: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_offset() {
        let src = "title = \"x\"\nmuxes = {size = }\n";
        let diag = ParseDiagnostic::at("cfg.toml", src, 28, "expected a value");
        assert_eq!(diag.line, 2);
        assert_eq!(diag.column, 17);
        assert_eq!(diag.source_line, "muxes = {size = }");
    }

    #[test]
    fn renders_caret() {
        let diag = ParseDiagnostic::at("cfg.toml", "a = ?", 4, "bad value");
        let text = diag.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cfg.toml:1:5: error parsing config");
        assert_eq!(lines[1], "cfg.toml:1:5: a = ?");
        assert_eq!(lines[2], "cfg.toml:1:5:     ^");
        assert_eq!(lines[3], "cfg.toml:1:5: error: bad value");
    }

    #[test]
    fn caret_keeps_tabs() {
        let diag = ParseDiagnostic::at("c", "\tx = ?", 5, "m");
        assert_eq!(diag.pointer(), "\t    ^");
    }

    #[test]
    fn column_counts_characters() {
        let src = "title = \"\u{e9}tat\" ?\n";
        let diag = ParseDiagnostic::at("c", src, 16, "bad value");
        assert_eq!(diag.column, 16);
        assert_eq!(diag.pointer(), format!("{}^", " ".repeat(15)));

        // inside the two-byte character
        let diag = ParseDiagnostic::at("c", src, 10, "bad value");
        assert_eq!(diag.column, 10);
    }

    #[test]
    fn offset_at_end_of_input() {
        let diag = ParseDiagnostic::at("c", "a = ", 99, "unexpected end");
        assert_eq!(diag.line, 1);
        assert_eq!(diag.column, 5);
    }

    #[test]
    fn display_validation_error() {
        let err = ConfigError::ValidationError("mux count is zero".to_string());
        assert_eq!(format!("{err}"), "validation error: mux count is zero");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
