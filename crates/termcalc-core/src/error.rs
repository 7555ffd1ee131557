//! Document construction errors.

use thiserror::Error;

use crate::handle::EquationId;

/// Errors raised while building or editing a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// No equation with this id exists.
    #[error("unknown equation {0}")]
    UnknownEquation(EquationId),

    /// A call was built with the wrong number of arguments.
    #[error("{name} takes {expected} argument(s), {found} given")]
    ArityMismatch {
        /// Name of the called function.
        name: String,
        /// Required argument count.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },
}
