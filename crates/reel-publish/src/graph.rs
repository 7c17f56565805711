//! Shared Graph API plumbing.

use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::{TargetError, TargetResult};

/// Default Graph API base URL.
pub const DEFAULT_GRAPH_API_URL: &str = "https://graph.facebook.com/v23.0";

/// `{"error": {...}}` envelope returned on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorBody {
    pub error: GraphErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorDetail {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
}

/// Which failures mean "media still processing".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotReadyRule {
    /// HTTP status of the readiness signal
    pub status: u16,
    /// Graph error codes that qualify; empty accepts any code
    pub codes: Vec<i64>,
}

impl NotReadyRule {
    /// Any response with `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            codes: Vec::new(),
        }
    }

    /// Responses with `status` and one of `codes`.
    pub fn status_with_codes(status: u16, codes: impl Into<Vec<i64>>) -> Self {
        Self {
            status,
            codes: codes.into(),
        }
    }

    pub fn matches(&self, error: &TargetError) -> bool {
        if error.status() != Some(self.status) {
            return false;
        }
        self.codes.is_empty() || error.code().is_some_and(|c| self.codes.contains(&c))
    }
}

/// Thin Graph API HTTP client.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    base_url: String,
}

impl GraphClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TargetResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reel-publish/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST {base}/{path}` with query parameters.
    pub async fn post(&self, path: &str, params: &[(&str, &str)]) -> TargetResult<Value> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!("POST {}", url);
        send(self.http.post(&url).query(params)).await
    }

    /// `POST` to an absolute URL with extra headers.
    pub async fn post_absolute(&self, url: &str, headers: &[(&str, &str)]) -> TargetResult<Value> {
        debug!("POST {}", url);
        let mut request = self.http.post(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        send(request).await
    }
}

async fn send(request: RequestBuilder) -> TargetResult<Value> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(parse_error(status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| TargetError::http(status.as_u16(), None, format!("invalid JSON body: {}", e)))
}

/// Build a `TargetError` from a failed response body.
pub fn parse_error(status: u16, body: &str) -> TargetError {
    match serde_json::from_str::<GraphErrorBody>(body) {
        Ok(parsed) => TargetError::http(status, parsed.error.code, parsed.error.message),
        Err(_) => TargetError::http(status, None, body.to_string()),
    }
}

/// Comma-separated list of Graph error codes read from `var`.
pub fn parse_codes(var: &str, raw: &str) -> TargetResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| TargetError::config_error(format!("{}: invalid code `{}`", var, s)))
        })
        .collect()
}

/// Read a string (or numeric) ID field from a response.
pub fn id_field(body: &Value, field: &'static str) -> TargetResult<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(TargetError::MissingField(field)),
    }
}
