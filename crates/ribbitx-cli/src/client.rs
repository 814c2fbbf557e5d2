//! Shared HTTP client, configuration, and error types for the CLI.

use std::error::Error as _;
use std::fmt;
use std::time::Duration;

use anyhow::anyhow;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use ribbitx_api_models::ErrorsBody;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cli::OutputFormat;

pub(crate) const HEADER_API_KEY: &str = "x-jfrog-art-api";
pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type. Every variant carries the operation it interrupted so
/// the printed message names the request and the identifiers involved.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Usage(String),

    #[error("{operation}: request failed before a response was received")]
    Transport {
        operation: String,
        source: reqwest::Error,
    },

    #[error("{operation}: not authorized (status {status})")]
    Auth { operation: String, status: u16 },

    #[error("{operation}: not found (status {status})")]
    NotFound { operation: String, status: u16 },

    #[error("{operation}: rejected by the instance (status {status}): {message}")]
    Validation {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("{operation}: unexpected status {status}: {body}")]
    UnexpectedStatus {
        operation: String,
        status: u16,
        body: String,
    },

    #[error("{operation}: malformed response (status {status}): {detail}; raw body: {body}")]
    MalformedResponse {
        operation: String,
        status: u16,
        detail: String,
        body: String,
    },

    #[error(transparent)]
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Failure(_) => 1,
            Self::Usage(_) => 2,
            Self::Auth { .. }
            | Self::NotFound { .. }
            | Self::Validation { .. }
            | Self::UnexpectedStatus { .. }
            | Self::MalformedResponse { .. } => 3,
            Self::Transport { .. } => 4,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Failure(error) => format!("{error:#}"),
            Self::Transport { source, .. } => {
                let mut message = self.to_string();
                message.push_str(": ");
                message.push_str(&source.to_string());
                let mut cause = source.source();
                while let Some(err) = cause {
                    message.push_str(": ");
                    message.push_str(&err.to_string());
                    cause = err.source();
                }
                message
            }
            _ => self.to_string(),
        }
    }
}

/// Static credential forwarded on every request.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input so an empty variable behaves like an unset one.
    pub(crate) fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("ApiKey(<redacted>)")
    }
}

/// Connection settings resolved once at startup.
#[derive(Debug, Clone)]
pub(crate) struct ClientConfig {
    pub(crate) base_url: Url,
    pub(crate) api_key: Option<ApiKey>,
    pub(crate) timeout: Duration,
    pub(crate) request_id: String,
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
    pub(crate) output: OutputFormat,
}

/// Status and raw payload of a completed request.
#[derive(Debug, Clone)]
pub(crate) struct ApiResult {
    pub(crate) status: StatusCode,
    pub(crate) body: Vec<u8>,
}

impl ApiResult {
    pub(crate) fn json_value(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Decode the body into `T`, reporting a malformed response otherwise.
    pub(crate) fn decode<T: DeserializeOwned>(&self, operation: &str) -> CliResult<T> {
        serde_json::from_slice(&self.body).map_err(|err| self.malformed(operation, err.to_string()))
    }

    pub(crate) fn malformed(&self, operation: &str, detail: impl Into<String>) -> CliError {
        CliError::MalformedResponse {
            operation: operation.to_string(),
            status: self.status.as_u16(),
            detail: detail.into(),
            body: self.raw_text(),
        }
    }

    /// `errors[0].message` when the body is the instance's error envelope.
    pub(crate) fn error_message(&self) -> Option<String> {
        serde_json::from_slice::<ErrorsBody>(&self.body)
            .ok()
            .and_then(|body| body.first_message().map(str::to_string))
    }

    pub(crate) fn raw_text(&self) -> String {
        let text = String::from_utf8_lossy(&self.body);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            "<empty body>".to_string()
        } else {
            trimmed.to_string()
        }
    }
}

/// Thin wrapper over `reqwest` that knows the base URL and credential.
#[derive(Clone)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: Url,
    api_key: Option<HeaderValue>,
}

impl ApiClient {
    pub(crate) fn new(config: &ClientConfig) -> CliResult<Self> {
        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(&config.request_id).map_err(|_| {
            CliError::failure(anyhow!("request identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.as_ref().map(header_value).transpose()?,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> CliResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                CliError::failure(anyhow!(
                    "base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get(
        &self,
        operation: &str,
        segments: &[&str],
        query: &[(&str, &str)],
    ) -> CliResult<ApiResult> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        self.execute(operation, Method::GET, url, None::<&()>).await
    }

    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        segments: &[&str],
        body: &B,
    ) -> CliResult<ApiResult> {
        let url = self.endpoint(segments)?;
        self.execute(operation, Method::PUT, url, Some(body)).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        segments: &[&str],
        body: &B,
    ) -> CliResult<ApiResult> {
        let url = self.endpoint(segments)?;
        self.execute(operation, Method::POST, url, Some(body)).await
    }

    pub(crate) async fn delete(&self, operation: &str, segments: &[&str]) -> CliResult<ApiResult> {
        let url = self.endpoint(segments)?;
        self.execute(operation, Method::DELETE, url, None::<&()>).await
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> CliResult<ApiResult> {
        debug!(%method, %url, "sending request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = self.authorize(request);

        let response = request.send().await.map_err(|source| CliError::Transport {
            operation: operation.to_string(),
            source,
        })?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| CliError::Transport {
                operation: operation.to_string(),
                source,
            })?;

        debug!(status = status.as_u16(), bytes = body.len(), "response received");
        Ok(ApiResult {
            status,
            body: body.to_vec(),
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(HEADER_API_KEY, key.clone()),
            None => request,
        }
    }
}

/// Keys that cannot travel in a header are a configuration mistake, not a
/// transport failure.
fn header_value(key: &ApiKey) -> CliResult<HeaderValue> {
    let mut value = HeaderValue::from_str(key.expose()).map_err(|_| {
        CliError::usage("API key contains characters that are not allowed in an HTTP header")
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Parse the base URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    let url = input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(format!("invalid URL '{input}': expected an http(s) URL"));
    }
    Ok(url)
}

/// Pass the result through when it carries `expected`, classify it otherwise.
pub(crate) fn expect_status(
    result: ApiResult,
    expected: StatusCode,
    operation: &str,
) -> CliResult<ApiResult> {
    if result.status == expected {
        Ok(result)
    } else {
        Err(classify_problem(&result, operation))
    }
}

/// Classify an unsuccessful response into a CLI error.
pub(crate) fn classify_problem(result: &ApiResult, operation: &str) -> CliError {
    let status = result.status;
    let operation = operation.to_string();
    let message = result.error_message();

    match status {
        StatusCode::UNAUTHORIZED => CliError::Auth {
            operation,
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => CliError::NotFound {
            operation,
            status: status.as_u16(),
        },
        StatusCode::CONFLICT => CliError::Validation {
            operation,
            status: status.as_u16(),
            message: message
                .unwrap_or_else(|| "conflicts with an existing resource".to_string()),
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY if message.is_some() => {
            CliError::Validation {
                operation,
                status: status.as_u16(),
                message: message.unwrap_or_default(),
            }
        }
        _ => CliError::UnexpectedStatus {
            operation,
            status: status.as_u16(),
            body: message.unwrap_or_else(|| result.raw_text()),
        },
    }
}

/// Delete endpoints only distinguish 200, 401, and 404; everything else is a
/// generic failure.
pub(crate) fn expect_deleted(result: ApiResult, operation: &str) -> CliResult<()> {
    match result.status {
        StatusCode::OK => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => {
            Err(classify_problem(&result, operation))
        }
        status => Err(CliError::UnexpectedStatus {
            operation: operation.to_string(),
            status: status.as_u16(),
            body: result.error_message().unwrap_or_else(|| result.raw_text()),
        }),
    }
}
