use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type used throughout this crate.
pub type Result<T> = StdResult<T, Error>;

/// Failures reported by the system frameworks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An Accessibility API call failed with the given error code.
    #[error("AX operation failed: code {0}")]
    AxCode(i32),

    /// The AX element became invalid (element removed) during the read.
    #[error("AX element invalid")]
    ElementGone,

    /// The attribute is missing or holds a value of an unexpected type.
    #[error("Unsupported attribute: {0}")]
    Unsupported(&'static str),

    /// Event tap could not be created or attached to a run loop.
    #[error("Event tap failed to start")]
    EventTapStart,
}
