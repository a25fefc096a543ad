use std::result::Result as StdResult;

use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = StdResult<T, Error>;

/// Unified error type for the dockpeek engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A system permission required to observe global events is missing.
    #[error("Permission denied: {0}")]
    PermissionDenied(&'static str),

    /// The platform event tap could not be installed.
    #[error("Event tap failed to start")]
    EventTapStart,

    /// `start()` was called on a source that is already running.
    #[error("Event source already started")]
    AlreadyStarted,

    /// An Accessibility API read failed with the given error code.
    #[error("AX operation failed: code {0}")]
    AxCode(i32),

    /// The element disappeared while it was being read.
    #[error("AX element gone")]
    ElementGone,

    /// The attribute is missing or has an unexpected type.
    #[error("Unsupported attribute")]
    Unsupported,

    /// The element tree does not have the expected shape.
    #[error("Unexpected AX structure: {0}")]
    Structure(&'static str),

    /// The engine task is no longer running.
    #[error("Engine channel closed")]
    ChannelClosed,
}

#[cfg(target_os = "macos")]
impl From<mac_dock::Error> for Error {
    fn from(e: mac_dock::Error) -> Self {
        match e {
            mac_dock::Error::AxCode(c) => Self::AxCode(c),
            mac_dock::Error::ElementGone => Self::ElementGone,
            mac_dock::Error::Unsupported(_) => Self::Unsupported,
            mac_dock::Error::EventTapStart => Self::EventTapStart,
        }
    }
}
