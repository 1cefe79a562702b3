//! Configuration for packbridge
//!
//! This crate holds the immutable [`Settings`] value every compiler is built
//! from, the loader that assembles it from defaults, a JSON settings file and
//! the environment, and the locator that turns bundle identifiers into config
//! file paths.

pub mod loader;
pub mod locator;
pub mod settings;

pub use loader::*;
pub use locator::*;
pub use settings::*;
