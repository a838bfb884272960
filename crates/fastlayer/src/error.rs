//! # Layer Error Types
//!
//! All errors that can occur while evaluating a layer over a grid.
//!
//! Every error is detected before the first cell is written. A failed call
//! leaves the caller's buffer untouched, and retrying with the same inputs
//! fails identically.

use thiserror::Error;

/// Errors that can occur in the layer engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// A size, count or bound parameter is out of range.
    #[error("invalid argument: {parameter} = {value} ({requirement})")]
    InvalidArgument {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// The value that was supplied.
        value: i64,
        /// What the parameter must satisfy.
        requirement: &'static str,
    },

    /// A caller-supplied buffer is shorter than the request needs.
    #[error("{buffer} buffer too small: need {required} cells, have {available}")]
    InsufficientCapacity {
        /// Which buffer was too small (`"input"` or `"output"`).
        buffer: &'static str,
        /// Number of cells the request covers.
        required: u64,
        /// Length of the supplied buffer.
        available: usize,
    },

    /// The required cell count does not fit in 64 bits.
    #[error("{buffer} buffer size overflows: request extents are too large")]
    CapacityOverflow {
        /// Which buffer the computation was for.
        buffer: &'static str,
    },

    /// A layer that reads input grids was invoked without them.
    #[error("layer expects {expected} input grid(s), {provided} provided")]
    MissingInput {
        /// Number of inputs the layer reads.
        expected: usize,
        /// Number of inputs supplied.
        provided: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of a [`LayerError`].
///
/// Hosts use this to decide whether to fix their arguments or grow their
/// allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad parameters.
    InvalidArgument,
    /// Buffer too small, including overflowing size computations.
    Capacity,
    /// The layer was wired up incorrectly.
    InternalInvariant,
    /// Configuration could not be loaded.
    Config,
}

impl LayerError {
    /// Returns the coarse category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::InsufficientCapacity { .. } | Self::CapacityOverflow { .. } => {
                ErrorKind::Capacity
            }
            Self::MissingInput { .. } => ErrorKind::InternalInvariant,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    /// Returns true if growing the buffer could make the call succeed.
    #[must_use]
    pub const fn is_capacity(&self) -> bool {
        matches!(self.kind(), ErrorKind::Capacity)
    }
}

/// Result type for layer operations.
pub type LayerResult<T> = Result<T, LayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let invalid = LayerError::InvalidArgument {
            parameter: "size_x",
            value: 0,
            requirement: "must be positive",
        };
        assert_eq!(invalid.kind(), ErrorKind::InvalidArgument);
        assert!(!invalid.is_capacity());

        let small = LayerError::InsufficientCapacity {
            buffer: "output",
            required: 16,
            available: 15,
        };
        assert!(small.is_capacity());
        assert!(LayerError::CapacityOverflow { buffer: "output" }.is_capacity());

        let missing = LayerError::MissingInput {
            expected: 1,
            provided: 0,
        };
        assert_eq!(missing.kind(), ErrorKind::InternalInvariant);
    }

    #[test]
    fn test_display_messages() {
        let small = LayerError::InsufficientCapacity {
            buffer: "output",
            required: 16,
            available: 15,
        };
        assert_eq!(
            small.to_string(),
            "output buffer too small: need 16 cells, have 15"
        );

        let invalid = LayerError::InvalidArgument {
            parameter: "bound",
            value: -3,
            requirement: "must be positive",
        };
        assert_eq!(
            invalid.to_string(),
            "invalid argument: bound = -3 (must be positive)"
        );
    }
}
