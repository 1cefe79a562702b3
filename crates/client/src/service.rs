use async_trait::async_trait;
use packbridge_core::{BuildRequest, BuildResponse, Result};

/// Something that can turn a build request into a build response.
///
/// Implementations report transport problems as
/// [`Error::BuildServiceUnavailable`](packbridge_core::Error::BuildServiceUnavailable)
/// and malformed answers as
/// [`Error::BuildServiceProtocol`](packbridge_core::Error::BuildServiceProtocol).
/// They never retry and never inspect the build errors inside a valid
/// response.
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Run one build
    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse>;

    /// Human readable location of the service, used in diagnostics
    fn endpoint(&self) -> &str;
}
