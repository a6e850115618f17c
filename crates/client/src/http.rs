//! Plumbing shared by [`AuthClient`](crate::AuthClient) and
//! [`NodeRegistry`](crate::NodeRegistry): endpoint construction, the
//! single-shot send, and decode/error mapping.

use std::time::{Duration, Instant};

use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use wio_domain::error::{Error, Result};

/// Longest slice of a response body quoted in an error message.
const BODY_SNIPPET_CHARS: usize = 256;

/// Build a `reqwest::Client` whose timeout bounds connect + response.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Transport(e.to_string()))
}

/// Replace the path of `base` with `path`.
///
/// Query and fragment are cleared as well, so a host configured as
/// `https://srv/some/prefix?x=1` still resolves to `https://srv{path}`.
pub(crate) fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(path);
    url.set_query(None);
    url.set_fragment(None);
    url
}

/// Status and fully-read body of one HTTP exchange.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: StatusCode,
    pub body: String,
}

/// Send once and read the whole body. No retries.
pub(crate) async fn send(label: &str, rb: RequestBuilder) -> Result<Reply> {
    let start = Instant::now();
    let resp = rb.send().await.map_err(from_reqwest)?;
    let status = resp.status();
    let body = resp.text().await.map_err(from_reqwest)?;

    tracing::debug!(
        endpoint = label,
        status = status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        bytes = body.len(),
        "wio API call"
    );

    Ok(Reply { status, body })
}

/// Decode a JSON body, mapping any failure to `Error::Decode`.
pub(crate) fn decode<T: DeserializeOwned>(label: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| {
        Error::Decode(format!(
            "failed to parse {label} response: {e}: {}",
            snippet(body)
        ))
    })
}

pub(crate) fn snippet(body: &str) -> String {
    let mut out: String = body.chars().take(BODY_SNIPPET_CHARS).collect();
    if out.len() < body.len() {
        out.push('…');
    }
    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Error conversion helper
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Convert a `reqwest::Error` into a domain `Error`.
///
/// Timeout errors become `Error::Timeout`; everything else becomes
/// `Error::Transport`.
pub fn from_reqwest(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Transport(e.to_string())
    }
}
