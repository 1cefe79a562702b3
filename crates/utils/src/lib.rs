//! Shared utilities and pure functions for packbridge
//!
//! This crate provides common utility functions that are used throughout
//! the packbridge workspace. All functions here are designed to be pure and
//! side-effect free where possible.

pub mod atomic_file;
pub mod hashing;
pub mod tracing;

pub use atomic_file::*;
pub use hashing::*;
