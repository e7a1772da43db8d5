//! HTTP client for the file service.
//!
//! Wraps a [`reqwest::Client`] and applies the request contract shared by
//! every endpoint: JSON `Accept` unless a binary body is expected, bearer
//! auth only when requested and configured, and normalization of non-2xx
//! responses into [`ApiError`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::{ApiError, FileApi, FileRecord, ListResponse, SingleResponse, UploadPayload};
use crate::config::ApiConfig;
use crate::download::SaveSink;
use crate::{FiledeskError, Result};

/// Body attached to a request.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON body; sent with `Content-Type: application/json`.
    Json(Value),
    /// Multipart form; reqwest sets the boundary content type.
    Multipart(Form),
}

/// Per-request options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Attach the bearer token, if one is configured.
    pub authorize: bool,
    /// The response body is binary; skip JSON negotiation and error parsing.
    pub expect_binary: bool,
}

impl RequestOptions {
    /// Options for an authorized JSON request.
    pub fn authorized() -> Self {
        Self {
            authorize: true,
            expect_binary: false,
        }
    }

    /// Options for an unauthenticated binary download.
    pub fn binary() -> Self {
        Self {
            authorize: false,
            expect_binary: true,
        }
    }
}

/// Client for the file service REST API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    sink: Arc<dyn SaveSink>,
}

impl ApiClient {
    /// Create a client from configuration.
    ///
    /// Fails with [`FiledeskError::Config`] when the base URL is empty or is
    /// not an http(s) URL.
    pub fn new(config: &ApiConfig, sink: Arc<dyn SaveSink>) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FiledeskError::Config(format!("failed to create HTTP client: {e}")))?;

        debug!(base_url = %base_url, authorized = config.token().is_some(), "API client ready");

        Ok(Self {
            client,
            base_url,
            token: config.token().map(str::to_string),
            sink,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and return the successful response.
    ///
    /// Non-2xx responses become [`FiledeskError::Api`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<Response> {
        let url = self.url(path);
        debug!(%method, %url, authorize = options.authorize, "sending request");

        let builder = self.client.request(method, &url);
        let builder = self.apply_contract(builder, body, options)?;
        let response = builder.send().await?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let payload = if options.expect_binary {
            None
        } else {
            response.json::<Value>().await.ok()
        };

        let err = ApiError::from_payload(status, payload);
        debug!(status, message = %err.message, %url, "request failed");
        Err(err.into())
    }

    fn apply_contract(
        &self,
        mut builder: RequestBuilder,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<RequestBuilder> {
        if !options.expect_binary {
            builder = builder.header(ACCEPT, "application/json");
        }

        if options.authorize {
            if let Some(token) = &self.token {
                builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
            }
        }

        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Multipart(form) => builder.multipart(form),
            RequestBody::Json(value) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| FiledeskError::Decode(format!("failed to encode body: {e}")))?;
                if options.expect_binary {
                    builder.body(bytes)
                } else {
                    builder.header(CONTENT_TYPE, "application/json").body(bytes)
                }
            }
        };

        Ok(builder)
    }
}

#[async_trait]
impl FileApi for ApiClient {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let response = self
            .request(Method::GET, "/files", RequestBody::Empty, RequestOptions::default())
            .await?;
        let envelope: ListResponse = read_json(response).await?;
        Ok(envelope.data)
    }

    async fn upload_file(&self, payload: &UploadPayload) -> Result<FileRecord> {
        let part = Part::bytes(payload.bytes.clone())
            .file_name(payload.file_name.clone())
            .mime_str(&payload.content_type())
            .map_err(|e| FiledeskError::Validation(format!("invalid MIME type: {e}")))?;

        let mut form = Form::new().part("file", part);
        if let Some(description) = payload.description.as_deref().filter(|d| !d.is_empty()) {
            form = form.text("description", description.to_string());
        }

        let response = self
            .request(
                Method::POST,
                "/files",
                RequestBody::Multipart(form),
                RequestOptions::authorized(),
            )
            .await?;
        let envelope: SingleResponse = read_json(response).await?;

        info!(id = envelope.data.id, name = %envelope.data.original_name, "file uploaded");
        Ok(envelope.data)
    }

    async fn delete_file(&self, id: i64) -> Result<()> {
        self.request(
            Method::DELETE,
            &format!("/files/{id}"),
            RequestBody::Empty,
            RequestOptions::authorized(),
        )
        .await?;

        info!(id, "file deleted");
        Ok(())
    }

    async fn download_file(&self, id: i64, filename: &str) -> Result<PathBuf> {
        let response = self
            .request(
                Method::GET,
                &format!("/files/{id}"),
                RequestBody::Empty,
                RequestOptions::binary(),
            )
            .await?;
        let bytes = response.bytes().await?;

        let saved = self.sink.save(filename, &bytes).await?;
        info!(id, bytes = bytes.len(), path = %saved.display(), "file downloaded");
        Ok(saved)
    }
}

/// Decode a success body, reporting malformed JSON as [`FiledeskError::Decode`].
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FiledeskError::Decode(format!("unexpected response body: {e}")))
}

/// Validate the configured base URL and strip trailing slashes.
fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(FiledeskError::Config("API base URL is missing".to_string()));
    }

    let parsed = url::Url::parse(trimmed)
        .map_err(|e| FiledeskError::Config(format!("invalid API base URL {trimmed:?}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(FiledeskError::Config(format!(
                "unsupported API base URL scheme: {scheme}"
            )));
        }
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}
