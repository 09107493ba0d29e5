#![forbid(unsafe_code)]

//! Error type shared by the ledger, the slot pool and the engine.

use std::fmt;

/// Errors reported by [`RecyclingList`](crate::RecyclingList) and its parts.
///
/// Only data-mutation and lookup operations return these. Conditions hit in
/// the middle of a reorganize pass (no populate callback, zero-height
/// viewport) are logged and counted in [`EngineStats`](crate::EngineStats)
/// instead, and the pass degrades rather than failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlexListError {
    /// A row or slot index outside `[0, len)`.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of valid entries at the time of the call.
        len: usize,
    },
    /// A `(start, count)` range that is empty or runs past the last row.
    InvalidRange {
        /// First row of the requested range.
        start: usize,
        /// Requested number of rows.
        count: usize,
        /// Number of rows at the time of the call.
        len: usize,
    },
    /// No populate callback is installed.
    MissingCollaborator,
    /// The viewport has no usable height.
    DegenerateViewport {
        /// The reported viewport height.
        height: f32,
    },
    /// A configuration value failed validation.
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// What the field must satisfy.
        reason: &'static str,
    },
}

impl fmt::Display for FlexListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range (len={len})")
            }
            Self::InvalidRange { start, count, len } => write!(
                f,
                "invalid row range start={start} count={count} (len={len})"
            ),
            Self::MissingCollaborator => write!(f, "no item callback installed"),
            Self::DegenerateViewport { height } => {
                write!(f, "viewport height {height} leaves nothing visible")
            }
            Self::InvalidConfig { field, reason } => {
                write!(f, "invalid config: `{field}` {reason}")
            }
        }
    }
}

impl std::error::Error for FlexListError {}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FlexListError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_bounds() {
        let err = FlexListError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range (len=3)");

        let err = FlexListError::InvalidRange {
            start: 2,
            count: 0,
            len: 5,
        };
        assert!(err.to_string().contains("count=0"));
    }

    #[test]
    fn config_error_mentions_field() {
        let err = FlexListError::InvalidConfig {
            field: "min_item_height",
            reason: "must be finite and > 0",
        };
        let msg = err.to_string();
        assert!(msg.contains("min_item_height"), "{msg}");
    }

    #[test]
    fn is_std_error() {
        fn takes_error(_: &dyn std::error::Error) {}
        takes_error(&FlexListError::MissingCollaborator);
    }
}
