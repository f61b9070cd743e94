//! Blocking reqwest client implementing [`ListSource`].

use eduadmin_core::{AppError, Config, ListPage, ListParams, ListSource, Record};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::debug;

/// List source backed by the content API.
#[derive(Debug, Clone)]
pub struct HttpListSource {
    client: Client,
    base: String,
}

impl HttpListSource {
    /// # Errors
    /// Returns [`AppError::BadRequest`] for an unparsable base URL and
    /// [`AppError::Transport`] when the HTTP client cannot be built.
    pub fn new(base: &str, timeout: Duration) -> Result<Self, AppError> {
        let base = normalize_server(base.trim().to_string());
        Url::parse(&base)
            .map_err(|err| AppError::BadRequest(format!("invalid server URL '{}': {}", base, err)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Transport(err.to_string()))?;
        Ok(Self { client, base })
    }

    /// # Errors
    /// See [`Self::new`].
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            &config.api_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

fn query_pairs(params: &ListParams) -> Vec<(&'static str, String)> {
    let mut pairs = vec![
        ("page", params.page.to_string()),
        ("perPage", params.per_page.to_string()),
        ("sort", params.sort_field.clone()),
        ("order", params.sort_order.as_str().to_string()),
    ];
    if !params.filter.is_empty() {
        pairs.push(("filter", params.filter.to_query_value()));
    }
    pairs
}

impl ListSource for HttpListSource {
    fn fetch_list(&self, resource: &str, params: &ListParams) -> Result<ListPage, AppError> {
        let url = api_url(&self.base, &["api", resource])?;
        let started = Instant::now();
        let response = self
            .client
            .get(url)
            .query(&query_pairs(params))
            .send()
            .map_err(|err| AppError::Transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| AppError::Transport(format!("failed to read response body: {}", err)))?;
        debug!(
            resource,
            page = params.page,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "list request"
        );
        if !status.is_success() {
            return Err(AppError::Http {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            });
        }
        decode_list_page(&body)
    }
}

/// Decode a list response body.
///
/// # Errors
/// Returns [`AppError::Decode`] when the body is neither a list envelope nor
/// a bare array of records.
pub fn decode_list_page(body: &str) -> Result<ListPage, AppError> {
    let value: Value = serde_json::from_str(body)?;
    if value.is_array() {
        let data: Vec<Record> = serde_json::from_value(value)?;
        return Ok(ListPage::new(data));
    }
    Ok(serde_json::from_value(value)?)
}

/// Best human-readable message for a failed response.
///
/// Prefers a JSON `error` string, then `error.message`, then `message`, then
/// the raw body, then the status reason.
pub fn error_message_for_response(status: StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .get("error")
            .and_then(|error| error.as_str().or_else(|| error.get("message")?.as_str()))
            .or_else(|| value.get("message").and_then(Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
    }
    body.trim().to_string()
}

/// Join `segments` onto `server`, percent-encoding each segment.
///
/// # Errors
/// Returns [`AppError::BadRequest`] for an unparsable or cannot-be-a-base URL.
pub fn api_url(server: &str, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = Url::parse(server)
        .map_err(|err| AppError::BadRequest(format!("invalid server URL '{}': {}", server, err)))?;
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            AppError::BadRequest(format!("server URL '{}' cannot be used as an API base", server))
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

/// Pin plain-http `localhost` to `127.0.0.1` and strip trailing slashes.
pub fn normalize_server(server: String) -> String {
    let Ok(mut url) = Url::parse(&server) else {
        return server;
    };
    let is_plain_localhost =
        url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
    if is_plain_localhost && url.set_host(Some("127.0.0.1")).is_err() {
        return server;
    }
    let mut normalized = url.to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}
