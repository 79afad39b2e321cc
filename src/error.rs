//! Error taxonomy for the tree and sparse list public boundary

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by boundary-checked operations.
///
/// Both variants are deterministic functions of the inputs and recoverable:
/// a caller can always avoid them with a prior size/bounds check. Structural
/// problems (branch arity, depth mismatches) are bugs in the tree's own
/// construction path and abort via `debug_assert!`/`unreachable!` instead of
/// surfacing here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// An index or metric position fell outside its valid interval.
    #[error("index {index} out of bounds for length {bound}")]
    OutOfRange { index: usize, bound: usize },

    /// A range argument with its start past its end.
    #[error("invalid range: start {from} exceeds end {to}")]
    InvertedRange { from: usize, to: usize },

    /// A query asked for a value that does not exist: a lookup on an empty
    /// tree, or a required value at an absent position.
    #[error("no element present at index {index}")]
    NoSuchElement { index: usize },
}
