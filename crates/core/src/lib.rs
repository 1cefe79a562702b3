//! Core domain types, errors, and constants for `packbridge`.
//!
//! Everything the other crates exchange lives here: the canonical
//! [`BuildRequest`] sent to the build service, the raw [`BuildResponse`]
//! envelope it answers with, and the [`Error`] taxonomy every stage of the
//! pipeline reports through.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias. Each variant maps to one
//!   failure kind a caller may want to handle differently.
//! - **`types`**: request, response and diagnostic types, serialized with the
//!   field names the build service speaks.
//! - **`constants`**: tool version and defaults shared across crates.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, ErrorKind, Result},
    types::*,
};
