use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScanError};

/// The fetch side of the crawl: give it a URL, get back an HTML body.
///
/// Network failure, a non-success status and a non-HTML payload are all
/// reported as errors; the crawl driver treats every one of them as the same
/// terminal outcome for that URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// reqwest-backed fetcher used outside of tests.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .user_agent("Tagsweep/0.1 (https://github.com/trapdoorsec/tagsweep)")
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(timeout_secs / 2))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .tcp_keepalive(std::time::Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("fetching {}", url);
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        // An absent header means the server never confirmed this is HTML, so
        // the page is treated like any other non-document payload.
        match content_type {
            Some(ct) if ct.contains("text/html") => {}
            Some(ct) => return Err(ScanError::UnsupportedContentType(ct)),
            None => {
                return Err(ScanError::UnsupportedContentType(
                    "missing content-type header".to_string(),
                ));
            }
        }

        Ok(response.text().await?)
    }
}
