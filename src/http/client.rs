//! HTTP client wrapper: fixed browser-like headers, per-request timeouts, request tracking

use crate::error::{Result, WebguardError};
use crate::http::cookies::parse_set_cookies;
use crate::models::{FetchedPage, ScanConfig};
use crate::error::FetchFailure;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, LOCATION,
};
use reqwest::{Client, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use url::Url;

const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";
const MAX_REDIRECTS: usize = 10;

/// Session-scoped HTTP client. Cookies set by the target are replayed on
/// later requests, like a browser session.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    request_count: Arc<AtomicU64>,
    follow_redirects: bool,
    root_timeout: Duration,
    crawl_timeout: Duration,
}

impl HttpClient {
    /// Creates a new HttpClient from scan configuration
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        // Redirects are followed by hand so every hop's Set-Cookie is seen
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(default_headers(config)?)
            .redirect(reqwest::redirect::Policy::none())
            .cookie_store(true)
            .danger_accept_invalid_certs(false)
            .build()?;

        Ok(Self {
            client,
            request_count: Arc::new(AtomicU64::new(0)),
            follow_redirects: config.follow_redirects,
            root_timeout: Duration::from_secs(config.root_timeout_secs),
            crawl_timeout: Duration::from_secs(config.crawl_timeout_secs),
        })
    }

    /// Fetches the scan target with the root timeout
    pub async fn fetch_root(&self, url: &str) -> Result<FetchedPage> {
        self.fetch(url, self.root_timeout).await
    }

    /// Fetches a crawled link with the crawl timeout
    pub async fn fetch_link(&self, url: &str) -> Result<FetchedPage> {
        self.fetch(url, self.crawl_timeout).await
    }

    /// Sends a GET request, follows redirects up to `MAX_REDIRECTS` hops, and
    /// reads the whole final response. `timeout` bounds the whole chain.
    /// Cookies set on intermediate hops are kept on the returned page.
    pub async fn fetch(&self, url: &str, timeout: Duration) -> Result<FetchedPage> {
        let deadline = Instant::now() + timeout;
        let mut cookies = Vec::new();
        let mut current = url.to_string();
        let mut hops = 0;

        let response = loop {
            let response = self.send(url, &current, deadline).await?;
            cookies.extend(parse_set_cookies(response.headers()));

            let Some(next) = self.redirect_target(&response) else {
                break response;
            };
            if hops == MAX_REDIRECTS {
                return Err(WebguardError::FetchError {
                    url: url.to_string(),
                    cause: FetchFailure::Redirect,
                    detail: format!("more than {MAX_REDIRECTS} redirects"),
                });
            }
            hops += 1;
            debug!("Redirect {} -> {next}", response.status());
            current = next.to_string();
        };

        let status = response.status();
        let final_url = response.url().to_string();
        let headers = response.headers().clone();
        debug!("Response: {status} for {final_url}");

        let body = response
            .text()
            .await
            .map_err(|e| WebguardError::fetch(url, e))?;

        Ok(FetchedPage {
            url: final_url,
            status,
            cookies,
            headers,
            body,
        })
    }

    async fn send(&self, origin: &str, url: &str, deadline: Instant) -> Result<Response> {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.client
            .get(url)
            .timeout(deadline.saturating_duration_since(Instant::now()))
            .send()
            .await
            .map_err(|e| WebguardError::fetch(origin, e))
    }

    /// Location of a 3xx response, resolved against the response URL
    fn redirect_target(&self, response: &Response) -> Option<Url> {
        if !self.follow_redirects || !response.status().is_redirection() {
            return None;
        }
        let location = response.headers().get(LOCATION)?.to_str().ok()?;
        response.url().join(location).ok()
    }

    /// Returns the total number of requests made
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}

fn default_headers(config: &ScanConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
    );
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

    for (key, value) in &config.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| WebguardError::ConfigError(format!("Invalid header name '{key}': {e}")))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            WebguardError::ConfigError(format!("Invalid value for header '{key}': {e}"))
        })?;
        headers.insert(name, value);
    }

    Ok(headers)
}
