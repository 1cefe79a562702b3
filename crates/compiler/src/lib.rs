//! Build orchestration for packbridge
//!
//! [`Compiler::webpack`] is the main entry point. It resolves a bundle
//! identifier into a [`BuildRequest`](packbridge_core::BuildRequest), serves
//! the result from the manifest, the cache file or the process memo when it
//! can, and otherwise asks the build service for a fresh build. The answer is
//! a [`BundleResult`] that knows how to list and render its assets.
//!
//! The `populate` operations run the same pipeline ahead of time and persist
//! the results, so production processes never need a build service.

pub mod bundle;
pub mod compiler;
pub mod options;
pub mod populate;

pub use bundle::{Asset, BundleResult};
pub use compiler::Compiler;
pub use options::OptionsResolver;
pub use populate::CacheListItem;
