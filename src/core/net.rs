// src/core/net.rs
//
// Blocking HTTP client with a shared cookie jar, and the retry loop used by
// every fetch (HTTP or browser).

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::cookie::Jar;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use crate::config::consts::{ACCEPT_LANGUAGE, MAX_RETRIES, RETRY_DELAY_MS};
use crate::error::FetchError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: MAX_RETRIES, delay: Duration::from_millis(RETRY_DELAY_MS) }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent (→ `FetchError::Exhausted`).
pub fn with_retry<T, F>(policy: RetryPolicy, url: &str, mut op: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match op() {
            Ok(v) => return Ok(v),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) if attempt > policy.max_retries => {
                if policy.max_retries == 0 {
                    return Err(e);
                }
                return Err(FetchError::Exhausted { url: s!(url), attempts: attempt, last: Box::new(e) });
            }
            Err(e) => {
                warn!(%url, attempt, error = %e, "fetch failed, retrying in {:?}", policy.delay);
                if !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
            }
        }
    }
}

/// A cookie lifted from a browser session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
}

impl BrowserCookie {
    fn as_set_cookie(&self) -> String {
        let mut s = format!("{}={}", self.name, self.value);
        if !self.domain.is_empty() {
            s.push_str("; Domain=");
            s.push_str(self.domain.trim_start_matches('.'));
        }
        if !self.path.is_empty() {
            s.push_str("; Path=");
            s.push_str(&self.path);
        }
        s
    }
}

pub struct HttpClient {
    client: Client,
    jar: Arc<Jar>,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE));
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::http("<client>", e))?;
        Ok(Self { client, jar })
    }

    /// Seed the jar, e.g. with the cookies of a logged-in Chrome profile.
    pub fn add_cookies(&self, cookies: &[BrowserCookie], url: &Url) {
        for c in cookies {
            self.jar.add_cookie_str(&c.as_set_cookie(), url);
        }
        debug!(count = cookies.len(), host = url.host_str().unwrap_or(""), "cookies imported");
    }

    pub fn get_text(&self, url: &str) -> Result<String, FetchError> {
        self.get_text_with(url, &[])
    }

    /// GET `url` with extra request headers and return the decoded body.
    pub fn get_text_with(&self, url: &str, extra: &[(&'static str, String)]) -> Result<String, FetchError> {
        let mut req = self.client.get(url);
        for (name, value) in extra {
            req = req.header(*name, value.as_str());
        }
        let resp = req.send().map_err(|e| FetchError::http(url, e))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(FetchError::Auth { url: s!(url), status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(FetchError::Status { url: s!(url), status: status.as_u16() });
        }
        resp.text().map_err(|e| FetchError::http(url, e))
    }
}
