//! mac-dock: the macOS side of dock hover detection.
//!
//! Thin, synchronous wrappers over the system frameworks the hover pipeline
//! consumes:
//! - [`ax`]: Accessibility element reads (children, role, frame, title,
//!   running state).
//! - [`tap`]: a listen-only CoreGraphics event tap for mouse movement.
//! - [`displays`]: the current display set from CoreGraphics.
//! - [`windows`]: on-screen windows owned by an application.
//! - [`process`]: process lookup by bundle identifier.
//! - [`prefs`]: dock orientation and auto-hide preferences.
//!
//! Nothing here keeps state between calls; every query reads fresh from the
//! system. The crate is empty on other targets.
#![cfg(target_os = "macos")]

pub mod ax;
pub mod displays;
mod error;
pub mod prefs;
pub mod process;
pub mod tap;
pub mod windows;

pub use error::{Error, Result};

// Ensure Accessibility symbols (AX* functions) link correctly
#[link(name = "ApplicationServices", kind = "framework")]
unsafe extern "C" {}
