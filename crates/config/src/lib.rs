//! Runtime configuration for dockpeek.
//!
//! The configuration is a single RON struct. Every field has a default, so an
//! empty file (or no file at all) yields a working setup.

mod error;
mod loader;
mod types;

pub use error::Error;
pub use loader::{default_path, load_from_path, load_or_default, parse_str};
pub use types::{Config, OverlapPolicy, PreviewSize};
