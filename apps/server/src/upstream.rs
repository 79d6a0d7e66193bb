//! HTTP client for the upstream FHIR store.
//!
//! The proxy is a body-copying forwarder: the already-read request body is
//! replayed against the upstream URL, and the upstream status, headers, and
//! body are copied back verbatim.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::Duration;

use crate::error::{Error, Result};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(base_url: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forward a request to `<base_url><path_and_query>` and copy the
    /// upstream response back. Connection or read failures surface as 502.
    pub async fn forward(
        &self,
        method: Method,
        path_and_query: &str,
        headers: &HeaderMap,
        body: Option<Bytes>,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path_and_query);

        let mut forward_headers = headers.clone();
        // The client computes these itself.
        forward_headers.remove(header::HOST);
        forward_headers.remove(header::CONTENT_LENGTH);

        let mut request = self.http.request(method, &url).headers(forward_headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(url, error = %e, "upstream request failed");
            Error::Upstream("Failed to forward request to FHIR server".to_string())
        })?;

        let status = response.status();
        let mut response_headers = response.headers().clone();
        // Recomputed for the copied body.
        response_headers.remove(header::TRANSFER_ENCODING);
        response_headers.remove(header::CONTENT_LENGTH);

        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(url, error = %e, "failed to read upstream response");
            Error::Upstream("Failed to forward request to FHIR server".to_string())
        })?;

        Ok((status, response_headers, bytes).into_response())
    }

    /// Probe upstream availability via its `metadata` endpoint.
    pub async fn health(&self) -> bool {
        match self
            .http
            .get(format!("{}/metadata", self.base_url))
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }
}
