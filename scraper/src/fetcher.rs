//! Page fetching with politeness delay, bounded retries and exponential backoff.
//!
//! [`Fetcher::fetch`] never fails: after the last attempt it logs and hands
//! back `None`, and the caller treats the source as empty.

use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, USER_AGENT,
};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::FetchError;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Something that can GET a page body.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String, FetchError>;
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Wait before every request, including the first.
    pub politeness_delay: Duration,
    /// Failed attempt `n` (0-based) waits `backoff_unit * 2^n`.
    pub backoff_unit: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            politeness_delay: Duration::from_secs(1),
            backoff_unit: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_unit * 2u32.saturating_pow(attempt)
    }
}

/// Blocking reqwest client that looks like a desktop browser.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text()?)
    }
}

// Accept-Encoding is left to reqwest so it can decode what it advertises.
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    for (name, value) in [
        ("upgrade-insecure-requests", "1"),
        ("sec-fetch-dest", "document"),
        ("sec-fetch-mode", "navigate"),
        ("sec-fetch-site", "none"),
    ] {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    headers
}

pub struct Fetcher<T = HttpTransport, S = ThreadSleeper> {
    transport: T,
    sleeper: S,
    policy: RetryPolicy,
}

impl Fetcher<HttpTransport, ThreadSleeper> {
    pub fn http(policy: RetryPolicy) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(policy.timeout)?;
        Ok(Self::new(transport, ThreadSleeper, policy))
    }
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn new(transport: T, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            transport,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches and parses `url` using the policy's attempt limit.
    pub fn fetch(&self, url: &str) -> Option<Html> {
        self.fetch_with_attempts(url, self.policy.max_attempts)
    }

    pub fn fetch_with_attempts(&self, url: &str, max_attempts: u32) -> Option<Html> {
        self.fetch_body(url, max_attempts)
            .map(|body| Html::parse_document(&body))
    }

    fn fetch_body(&self, url: &str, max_attempts: u32) -> Option<String> {
        for attempt in 0..max_attempts {
            self.sleeper.sleep(self.policy.politeness_delay);

            match self.transport.get(url) {
                Ok(body) => {
                    debug!(url = %url, bytes = body.len(), "Fetched page");
                    return Some(body);
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}",
                        attempt + 1,
                        max_attempts,
                        e
                    );
                    if attempt + 1 < max_attempts {
                        self.sleeper.sleep(self.policy.backoff(attempt));
                    }
                }
            }
        }

        error!("Failed to fetch {} after {} attempts", url, max_attempts);
        None
    }
}
