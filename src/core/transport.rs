// src/core/transport.rs

use crate::config::Settings;
use crate::core::models::{RawResponse, SubmissionRequest};
use color_eyre::eyre::{Result, WrapErr};
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Capability that delivers a [`SubmissionRequest`] (a submission or a list query) to the scan server.
///
/// Implementations report which path occurred (success status or not) and
/// hand back the body untouched; they do not interpret it and do not retry.
pub trait Transport {
    fn send(&self, request: &SubmissionRequest) -> impl Future<Output = RawResponse> + Send;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport for the server described by `settings`.
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = Url::parse(&settings.base_url())
            .wrap_err_with(|| format!("Invalid scan server address '{}'", settings.base_url()))?;
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .wrap_err("Failed to build HTTP client")?;
        info!(server = %base, "HTTP transport ready.");
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL of `request` on this server.
    pub fn url_for(&self, request: &SubmissionRequest) -> Result<Url, url::ParseError> {
        self.base.join(&request.path_and_query())
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: &SubmissionRequest) -> RawResponse {
        let url = match self.url_for(request) {
            Ok(url) => url,
            Err(e) => {
                error!(path = %request.path, error = %e, "Cannot form request URL.");
                return unreachable_server(format!("invalid request URL: {}", e));
            }
        };
        let method = Method::from_bytes(request.method.as_bytes()).unwrap_or(Method::POST);

        debug!(%method, %url, bytes = request.body.len(), "Sending request to scan server.");
        let mut builder = self.client.request(method.clone(), url.clone());
        if method != Method::GET {
            builder = builder
                .header(CONTENT_TYPE, request.content_type)
                .body(request.body.clone());
        }
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "HTTP request failed.");
                return unreachable_server(e.to_string());
            }
        };

        let status = response.status();
        info!(status = %status, path = %request.path, "Received HTTP response from scan server.");
        let body = response.text().await;

        if status.is_success() {
            match body {
                Ok(body) => RawResponse::Completed { body },
                Err(e) => {
                    error!(error = %e, "Failed to read response body.");
                    RawResponse::Failed {
                        status: Some(status.as_u16()),
                        reason: format!("cannot read response: {}", e),
                        body: None,
                    }
                }
            }
        } else {
            RawResponse::Failed {
                status: Some(status.as_u16()),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                body: body.ok().filter(|b| !b.trim().is_empty()),
            }
        }
    }
}

fn unreachable_server(reason: String) -> RawResponse {
    RawResponse::Failed {
        status: None,
        reason,
        body: None,
    }
}
