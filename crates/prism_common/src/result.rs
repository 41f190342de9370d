//! Common result and error types for the PRISM compiler.
//!
//! Every failure aborts the compilation; there is no recovery path. Each
//! error carries a human-readable message and, where the front end supplied
//! one, the source position of the construct that caused it.

use crate::bitmask::BitError;
use crate::file_pos::FilePos;

/// The standard result type for compiler operations.
pub type PrismResult<T> = Result<T, CompileError>;

/// A compilation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// An internal contract was violated, e.g. writing past a field bound.
    #[error("internal compiler error: {message}")]
    Internal {
        /// Description of the violation.
        message: String,
    },

    /// The same state id appeared in two `case` arms.
    #[error("{pos}: duplicate state {state}")]
    DuplicateState {
        /// The repeated state id.
        state: u32,
        /// Where the second arm was opened.
        pos: FilePos,
    },

    /// A transition targets a state that was never declared.
    #[error("{}: jump to undefined state {target}", display_pos(pos))]
    UndefinedJumpTarget {
        /// The unresolved target state id.
        target: u32,
        /// Position of the state containing the jump, if known.
        pos: Option<FilePos>,
    },

    /// More physical resources are needed than the hardware provides.
    #[error("{}: capacity exceeded: {message}", display_pos(pos))]
    CapacityExceeded {
        /// Which resource ran out.
        message: String,
        /// Position of the offending state, if known.
        pos: Option<FilePos>,
    },

    /// The wire allocation heuristic could not place a required input.
    #[error("{}: no suitable wire for virtual inputs {inputs}", display_pos(pos))]
    NoSuitableWire {
        /// The still-unallocated virtual inputs, rendered as a bitmask.
        inputs: String,
        /// Position of the offending state, if known.
        pos: Option<FilePos>,
    },

    /// A recorded design script could not be parsed or left scopes open.
    #[error("{}: malformed design script: {message}", display_pos(pos))]
    MalformedScript {
        /// What is wrong with the script.
        message: String,
        /// Position of the construct involved, if known.
        pos: Option<FilePos>,
    },

    /// The STEW layout lacks a field the state compiler needs.
    #[error("configuration mismatch: {message}")]
    ConfigurationMismatch {
        /// Description of the missing or inconsistent field.
        message: String,
    },
}

fn display_pos(pos: &Option<FilePos>) -> String {
    pos.as_ref()
        .map_or_else(|| "<unknown>".to_string(), ToString::to_string)
}

impl CompileError {
    /// Creates an internal error with the given message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Creates a capacity error with the given message.
    pub fn capacity(message: impl Into<String>, pos: Option<FilePos>) -> Self {
        Self::CapacityExceeded {
            message: message.into(),
            pos,
        }
    }

    /// Creates a malformed-script error with the given message.
    pub fn script(message: impl Into<String>, pos: Option<FilePos>) -> Self {
        Self::MalformedScript {
            message: message.into(),
            pos,
        }
    }

    /// Creates a configuration mismatch error with the given message.
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::ConfigurationMismatch {
            message: message.into(),
        }
    }

    /// Returns the source position attached to this error, if any.
    pub fn position(&self) -> Option<&FilePos> {
        match self {
            Self::DuplicateState { pos, .. } => Some(pos),
            Self::UndefinedJumpTarget { pos, .. }
            | Self::CapacityExceeded { pos, .. }
            | Self::NoSuitableWire { pos, .. }
            | Self::MalformedScript { pos, .. } => pos.as_ref(),
            Self::Internal { .. } | Self::ConfigurationMismatch { .. } => None,
        }
    }
}

impl From<BitError> for CompileError {
    fn from(err: BitError) -> Self {
        Self::internal(err.to_string())
    }
}
