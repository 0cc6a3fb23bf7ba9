//! Outbound JSON client shared by the provider adapters.
//!
//! Every call is a single GET: no retries, no backoff. A timeout applies only
//! when one is configured. API keys travel either in a header or in the query
//! string and are masked wherever a request is logged. Setting
//! `REELSWIPE_HTTP_RAW=1` adds a curl-style repro line and the response body
//! on the `http.raw` target.
//!
//! ```no_run
//! # async fn demo() -> Result<(), reelswipe_http::HttpError> {
//! use reelswipe_http::{Auth, HttpClient, RequestOpts};
//!
//! let client = HttpClient::new("https://pixabay.com")?;
//! let hits: serde_json::Value = client
//!     .get_json(
//!         "api/videos/",
//!         RequestOpts {
//!             auth: Some(Auth::Query { name: "key", value: "secret".into() }),
//!             query: Some(vec![("q", "travel".into())]),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! # Ok(()) }
//! ```
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::{Duration, Instant};
use thiserror::Error;

const RAW_ENV: &str = "REELSWIPE_HTTP_RAW";
const RAW_BODY_LIMIT: usize = 64 * 1024;
const SNIPPET_LIMIT: usize = 500;
const MASK: &str = "<redacted>";

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("request build failed: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Where a provider's API key goes.
///
/// ```
/// use reelswipe_http::Auth;
///
/// let auth = Auth::Query { name: "key", value: "secret".into() };
/// assert_eq!(auth.kind(), "query");
/// assert_eq!(Auth::None.kind(), "none");
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// Raw key in a header, e.g. Pexels' `Authorization: <key>`.
    Header {
        name: HeaderName,
        value: Cow<'a, str>,
    },
    /// Key as a query parameter, e.g. `key=<key>` for YouTube and Pixabay.
    Query {
        name: &'a str,
        value: Cow<'a, str>,
    },
    None,
}

impl Auth<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Auth::Header { .. } => "header",
            Auth::Query { .. } => "query",
            Auth::None => "none",
        }
    }
}

/// Per-request options.
///
/// ```
/// use reelswipe_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     ..Default::default()
/// };
/// assert!(!opts.allow_absolute);
/// assert!(!opts.accept_error_status);
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    /// Overrides the client's timeout for this call.
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    pub headers: Option<HeaderMap>,
    pub query: Option<Vec<(&'a str, Cow<'a, str>)>>,
    /// Treat an absolute `path` as the full URL instead of joining it to the base.
    pub allow_absolute: bool,
    /// Decode non-2xx bodies like 2xx ones instead of failing with [`HttpError::Api`].
    pub accept_error_status: bool,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    timeout: Option<Duration>,
}

impl HttpClient {
    /// Client rooted at `base`, with no timeout.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Issue one GET and decode the JSON body into `T`.
    pub async fn get_json<T>(&self, path: &str, opts: RequestOpts<'_>) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let url = self.resolve(path, opts.allow_absolute)?;
        let mut query = opts.query.unwrap_or_default();
        let mut headers = opts.headers.unwrap_or_default();
        let auth = opts.auth.unwrap_or(Auth::None);
        let auth_kind = auth.kind();

        match auth {
            Auth::Query { name, value } => {
                query.push((name, Cow::Owned(sanitize_api_key(&value)?)));
            }
            Auth::Header { name, value } => {
                let value = HeaderValue::from_str(&sanitize_api_key(&value)?)
                    .map_err(|e| HttpError::Build(format!("invalid {name} header: {e}")))?;
                headers.insert(name, value);
            }
            Auth::None => {}
        }

        let mut full = url;
        if !query.is_empty() {
            full.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_ref())));
        }
        let timeout = opts.timeout.or(self.timeout);

        tracing::debug!(
            url = %redact_url(&full),
            auth_kind,
            timeout_ms = ?timeout.map(|t| t.as_millis() as u64),
            "http.request.start"
        );
        if raw_enabled() {
            tracing::debug!(target: "http.raw", curl = %curl_line(&full, &headers), "request");
        }

        let mut rb = self.inner.get(full.clone()).headers(headers);
        if let Some(timeout) = timeout {
            rb = rb.timeout(timeout);
        }

        let started = Instant::now();
        let resp = rb.send().await.map_err(|e| network_error(&full, e))?;
        let status = resp.status();
        let request_id = resp
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();
        let raw_headers = raw_enabled().then(|| redact_headers(resp.headers()));
        let bytes = resp.bytes().await.map_err(|e| network_error(&full, e))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            %status,
            elapsed_ms,
            body_len = bytes.len(),
            request_id = %request_id,
            "http.response"
        );
        if let Some(headers) = raw_headers {
            let shown = &bytes[..bytes.len().min(RAW_BODY_LIMIT)];
            tracing::debug!(
                target: "http.raw",
                %status,
                headers = ?headers,
                body = %String::from_utf8_lossy(shown),
                truncated = bytes.len() > RAW_BODY_LIMIT,
                "response"
            );
        }

        if !status.is_success() && !opts.accept_error_status {
            let message = error_message(&bytes);
            tracing::warn!(%status, %message, request_id = %request_id, "http.error");
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            let snippet = snip_body(&bytes);
            tracing::warn!(%status, error = %e, body_snippet = %snippet, "http.decode_error");
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    fn resolve(&self, path: &str, allow_absolute: bool) -> Result<Url, HttpError> {
        if allow_absolute {
            if let Ok(abs) = Url::parse(path) {
                return Ok(abs);
            }
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }
}

fn raw_enabled() -> bool {
    matches!(
        std::env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn network_error(url: &Url, err: reqwest::Error) -> HttpError {
    let message = err.to_string();
    tracing::warn!(url = %redact_url(url), %message, "http.network_error");
    HttpError::Network(message)
}

fn is_secret_param(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "key" | "api_key" | "apikey" | "access_token" | "token" | "secret"
    )
}

/// `url` with secret query values masked.
fn redact_url(url: &Url) -> Url {
    let mut out = url.clone();
    if url.query().is_none() {
        return out;
    }
    let masked: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if is_secret_param(&k) { MASK.into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    out.query_pairs_mut().clear().extend_pairs(masked);
    out
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if *name == reqwest::header::AUTHORIZATION {
                MASK.to_string()
            } else {
                value.to_str().unwrap_or("<binary>").to_string()
            };
            (name.as_str().to_string(), shown)
        })
        .collect()
}

fn curl_line(url: &Url, headers: &HeaderMap) -> String {
    let mut line = String::from("curl");
    for (name, value) in redact_headers(headers) {
        line.push_str(&format!(" -H '{name}: {}'", value.replace('\'', r"'\''")));
    }
    line.push_str(&format!(" '{}'", redact_url(url)));
    line
}

/// Best human-readable message from an error body.
fn error_message(body: &[u8]) -> String {
    // {"error":{"message":"..."}} (Google) or {"message"|"error"|"detail":"..."}
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        Nested { error: Inner },
        Flat(Flat),
    }
    #[derive(Deserialize)]
    struct Inner {
        message: String,
    }
    #[derive(Deserialize)]
    struct Flat {
        message: Option<String>,
        error: Option<String>,
        detail: Option<String>,
    }

    let found = match serde_json::from_slice::<Shape>(body) {
        Ok(Shape::Nested { error }) => Some(error.message),
        Ok(Shape::Flat(f)) => f.message.or(f.error).or(f.detail),
        Err(_) => None,
    };
    found
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= SNIPPET_LIMIT {
        return text.into_owned();
    }
    let mut cut = SNIPPET_LIMIT;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...", &text[..cut])
}

/// Strip quotes and whitespace a key picks up from env files; reject non-ASCII.
fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let key: String = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if !key.is_ascii() {
        return Err(HttpError::Build("API key contains non-ASCII bytes".into()));
    }
    if key.bytes().any(|b| b.is_ascii_control()) {
        return Err(HttpError::Build("API key contains control characters".into()));
    }
    Ok(key)
}
