// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP Transport (§4.4): authenticated request/response client with
//! retry, a circuit breaker, and the endpoints consumed by the
//! Orchestrator and Update Pipeline.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use parking_lot::RwLock;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::AsyncWriteExt;

use warden_core::identity::AgentId;
use warden_wire::{
    CheckUpdateResponse, HardwareInventory, IdentifyRequest, IdentifyResponse, ReportErrorRequest,
    VerifyMfaRequest, VerifyMfaResponse,
};

use crate::circuit_breaker::CircuitBreaker;
use crate::error::TransportError;

const CLIENT_TYPE: &str = "warden-agent";
const MAX_RETRIES: u32 = 3;

/// Authenticated HTTP client for the control plane's request/response
/// endpoints. Cheap to share behind an `Arc`; internal state (bearer
/// token, circuit breaker) is interior-mutable.
pub struct HttpTransport {
    inner: ClientWithMiddleware,
    base_url: Url,
    agent_id: AgentId,
    token: RwLock<Option<String>>,
    breaker: CircuitBreaker,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        agent_id: AgentId,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let base_url =
            Url::parse(base_url).map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        let inner = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        Ok(Self { inner, base_url, agent_id, token: RwLock::new(None), breaker: CircuitBreaker::new() })
    }

    /// Updates the bearer token used on subsequent requests (post
    /// identify/refresh).
    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token;
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-client-type", HeaderValue::from_static(CLIENT_TYPE));
        if let Ok(value) = HeaderValue::from_str(&self.agent_id.to_string()) {
            headers.insert("x-agent-id", value);
        }
        if let Some(token) = self.token.read().as_deref() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
                headers.insert(AUTHORIZATION, value);
            }
        }
        headers
    }

    fn is_transient_status(status: StatusCode) -> bool {
        status.as_u16() == 408 || status.as_u16() == 429 || status.is_server_error()
    }

    async fn request_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Option<T>, TransportError> {
        if !self.breaker.allow_request() {
            return Err(TransportError::CircuitOpen);
        }

        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        let mut req = self.inner.request(method, url).headers(self.auth_headers());
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.breaker.record_failure();
                return Err(TransportError::HttpRequestFailed(e.to_string()));
            }
        };

        let status = resp.status();
        if status == StatusCode::NO_CONTENT {
            self.breaker.record_success();
            return Ok(None);
        }
        if status.is_success() {
            self.breaker.record_success();
            let value = resp
                .json::<T>()
                .await
                .map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
            return Ok(Some(value));
        }

        if Self::is_transient_status(status) {
            self.breaker.record_failure();
        }
        let message = resp.text().await.unwrap_or_default();
        Err(TransportError::HttpStatus { status: status.as_u16(), message })
    }

    /// `identify` / `refresh` (§4.4, §6).
    pub async fn identify(&self, request: &IdentifyRequest) -> Result<IdentifyResponse, TransportError> {
        self.request_json(Method::POST, "identify", Some(request))
            .await?
            .ok_or_else(|| TransportError::HttpRequestFailed("empty identify response".into()))
    }

    /// `verify_mfa` (§6), used by `configure` when `identify` responds
    /// `MfaRequired`.
    pub async fn verify_mfa(&self, request: &VerifyMfaRequest) -> Result<VerifyMfaResponse, TransportError> {
        self.request_json(Method::POST, "verify-mfa", Some(request))
            .await?
            .ok_or_else(|| TransportError::HttpRequestFailed("empty verify_mfa response".into()))
    }

    /// One-shot, best-effort on first successful connect.
    pub async fn submit_hardware_inventory(
        &self,
        inventory: &HardwareInventory,
    ) -> Result<(), TransportError> {
        self.request_json::<_, serde_json::Value>(Method::POST, "hardware-inventory", Some(inventory))
            .await?;
        Ok(())
    }

    pub async fn check_update(&self, current_version: &str) -> Result<CheckUpdateResponse, TransportError> {
        let path = format!("check-update?current_version={current_version}");
        let response: Option<CheckUpdateResponse> =
            self.request_json(Method::GET, &path, None::<&()>).await?;
        Ok(response.flatten())
    }

    /// Non-blocking; best-effort; the caller enqueues offline on failure.
    pub async fn report_error(&self, request: &ReportErrorRequest) -> Result<(), TransportError> {
        self.request_json::<_, serde_json::Value>(Method::POST, "report-error", Some(request)).await?;
        Ok(())
    }

    /// Streams the update package to `dest_path` without buffering the
    /// whole body in memory.
    pub async fn download_update_package(
        &self,
        download_url: &str,
        dest_path: &Path,
    ) -> Result<(), TransportError> {
        if !self.breaker.allow_request() {
            return Err(TransportError::CircuitOpen);
        }

        let resp = match self.inner.get(download_url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                self.breaker.record_failure();
                return Err(TransportError::HttpRequestFailed(e.to_string()));
            }
        };
        if !resp.status().is_success() {
            self.breaker.record_failure();
            return Err(TransportError::HttpStatus {
                status: resp.status().as_u16(),
                message: "update package download failed".into(),
            });
        }

        if let Some(parent) = dest_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        }
        let mut file = tokio::fs::File::create(dest_path)
            .await
            .map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        }
        file.flush().await.map_err(|e| TransportError::HttpRequestFailed(e.to_string()))?;
        self.breaker.record_success();
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
