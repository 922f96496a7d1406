//! Error types for tensor algebra parsing, planning, and execution.

/// Errors that can occur while building, validating, planning, or executing
/// a labeled tensor expression.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EinsumError {
    /// Extents disagree across an operation's contract.
    #[error("shape mismatch for index '{index}': expected {expected}, got {got}")]
    ShapeMismatch {
        index: char,
        expected: usize,
        got: usize,
    },

    /// Label count differs from rank, an illegal label multiplicity was
    /// used, or a permutation was required but not supplied.
    #[error("label mismatch: {message}")]
    LabelMismatch { message: String },

    /// Raw buffer access on a non-in-core backend, or another
    /// backend-specific limit.
    #[error("backend-unsupported operation: {message}")]
    BackendUnsupported { message: String },

    /// A slice interval violates the extents of the axis it selects.
    #[error("range out of bounds on axis {axis}: [{lo}, {hi}) does not fit within extent {extent}")]
    RangeOutOfBounds {
        axis: usize,
        lo: usize,
        hi: usize,
        extent: usize,
    },

    /// An N-way product has inconsistent label algebra (e.g. a label
    /// appearing in three positions, or no valid bracketing exists).
    #[error("planning failure: {message}")]
    PlanningFailure { message: String },

    /// A backend could not obtain memory for a tensor or a temporary.
    #[error("allocation failure: {message}")]
    AllocationFailure { message: String },
}

impl EinsumError {
    pub fn shape(index: char, expected: usize, got: usize) -> Self {
        Self::ShapeMismatch { index, expected, got }
    }

    pub fn label(message: impl Into<String>) -> Self {
        Self::LabelMismatch { message: message.into() }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::BackendUnsupported { message: message.into() }
    }

    pub fn range(axis: usize, lo: usize, hi: usize, extent: usize) -> Self {
        Self::RangeOutOfBounds { axis, lo, hi, extent }
    }

    pub fn planning(message: impl Into<String>) -> Self {
        Self::PlanningFailure { message: message.into() }
    }

    pub fn allocation(message: impl Into<String>) -> Self {
        Self::AllocationFailure { message: message.into() }
    }
}

/// Result type for tensor algebra operations.
pub type EinsumResult<T> = std::result::Result<T, EinsumError>;
