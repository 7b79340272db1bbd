use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::debug;

use crate::constants::MSG_GENERIC_FAILURE;
use crate::reports::{ExportScope, ReportFilters};
use crate::types::ApiResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Only admins and managers can export reports")]
    PermissionDenied,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text a provider surfaces as its `error`
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Server { message, .. } => message.clone(),
            ClientError::Validation(message) => message.clone(),
            ClientError::PermissionDenied => self.to_string(),
            _ => MSG_GENERIC_FAILURE.to_string(),
        }
    }
}

/// Shared bearer token slot; read on every request so a refreshed token applies immediately
#[derive(Debug, Clone, Default)]
pub struct TokenStore(Arc<RwLock<Option<String>>>);

impl TokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(token)))
    }

    pub fn set(&self, token: Option<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// A downloaded report export
#[derive(Debug, Clone)]
pub struct ExportDownload {
    pub file_name: Option<String>,
    pub body: String,
}

/// Thin JSON client for the `/api` surface
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/api/{}", self.base_url, path.trim_start_matches('/'));
        let mut builder = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = self.tokens.get() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send and unwrap the `{success, data, message}` envelope
    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<Option<T>, ClientError> {
        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        debug!("🌐 {} ({} bytes)", status, bytes.len());

        let envelope: ApiResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(ClientError::Decode(e.to_string())),
            Err(_) => return Err(server_error(status, None)),
        };

        if !status.is_success() || !envelope.success {
            return Err(server_error(status, envelope.message));
        }
        Ok(envelope.data)
    }

    async fn send_data<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T, ClientError> {
        self.send(builder)
            .await?
            .ok_or_else(|| ClientError::Decode("response carried no data".to_string()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_data(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ClientError> {
        self.send_data(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send_data(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send_data(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(self.request(Method::DELETE, path))
            .await
            .map(|_| ())
    }

    /// Fetch a server-side export; the body is the raw JSON document, not an envelope
    pub async fn download_export(
        &self,
        filters: &ReportFilters,
        scope: ExportScope,
    ) -> Result<ExportDownload, ClientError> {
        let response = self
            .request(Method::GET, "reports/export")
            .query(filters)
            .query(&[("scope", scope.as_str())])
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ApiResponse<serde_json::Value>>()
                .await
                .ok()
                .and_then(|envelope| envelope.message);
            return Err(server_error(status, message));
        }

        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_name);
        let body = response.text().await?;
        Ok(ExportDownload { file_name, body })
    }
}

fn server_error(status: StatusCode, message: Option<String>) -> ClientError {
    ClientError::Server {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| MSG_GENERIC_FAILURE.to_string()),
    }
}

fn attachment_name(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
}
