//! HTTP transport to the build service

use crate::service::BuildService;
use async_trait::async_trait;
use packbridge_core::{
    BuildRequest, BuildResponse, Error, Result, BUILD_SERVICE_SIGNATURE, TOOL_VERSION,
};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build service client speaking JSON over HTTP.
///
/// Builds can take tens of seconds, so no overall request timeout is applied
/// unless one is configured explicitly.
#[derive(Debug, Clone)]
pub struct HttpBuildClient {
    url: String,
    client: reqwest::Client,
}

impl HttpBuildClient {
    /// Create a client for the service at `url`
    pub fn new(url: impl Into<String>, request_timeout: Option<Duration>) -> Result<Self> {
        let url = url.into();

        let mut builder = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .user_agent(format!("packbridge/{TOOL_VERSION}"));
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether a build service is answering at the configured URL
    pub async fn is_running(&self) -> bool {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %self.url, error = %e, "build service did not answer");
                return false;
            }
        };

        if response.status() != StatusCode::OK {
            return false;
        }

        match response.text().await {
            Ok(body) => body.contains(BUILD_SERVICE_SIGNATURE),
            Err(_) => false,
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> Error {
        let message = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        };
        Error::build_service_unavailable(&self.url, message)
    }
}

#[async_trait]
impl BuildService for HttpBuildClient {
    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse> {
        info!(
            url = %self.url,
            config = %request.config_path.display(),
            "sending build request"
        );

        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status != StatusCode::OK {
            return Err(Error::build_service_protocol(
                &self.url,
                Some(status.as_u16()),
                body,
            ));
        }

        let envelope: BuildResponse = serde_json::from_str(&body).map_err(|e| {
            debug!(url = %self.url, error = %e, "build service sent an unreadable body");
            Error::build_service_protocol(&self.url, None, body.clone())
        })?;

        debug!(
            url = %self.url,
            has_error = envelope.error.is_some(),
            has_data = envelope.data.is_some(),
            "received build response"
        );

        Ok(envelope)
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
