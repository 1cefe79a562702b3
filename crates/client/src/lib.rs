//! Client for the external build service
//!
//! The build service is a long-lived bundler process reached over HTTP. This
//! crate sends it [`BuildRequest`](packbridge_core::BuildRequest)s and hands
//! back the raw [`BuildResponse`](packbridge_core::BuildResponse) envelope.
//! Interpreting build errors is left to the caller.

pub mod http;
pub mod service;

pub use http::HttpBuildClient;
pub use service::BuildService;
