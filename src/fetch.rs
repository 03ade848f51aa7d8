use std::cell::RefCell;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::config::ScrapeConfig;

/// Anything that can turn a URL into page text.
///
/// `None` means the page could not be retrieved; callers treat it as a page
/// that yielded nothing.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Option<String>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn fetch(&self, url: &Url) -> Option<String> {
        (**self).fetch(url)
    }
}

/// Blocking pause between requests.
pub trait Pacer {
    fn pause(&self, duration: Duration);
}

impl<P: Pacer + ?Sized> Pacer for &P {
    fn pause(&self, duration: Duration) {
        (**self).pause(duration);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Records requested pauses without sleeping.
#[derive(Debug, Default)]
pub struct RecordingPacer {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Pacer for RecordingPacer {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

pub struct HttpFetcher<P> {
    client: reqwest::blocking::Client,
    retries: u32,
    pacer: P,
}

impl<P: Pacer> HttpFetcher<P> {
    pub fn new(config: &ScrapeConfig, pacer: P) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("user agent header value")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );

        let client = reqwest::blocking::Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .context("build http client")?;

        Ok(Self {
            client,
            retries: config.retries.max(1),
            pacer,
        })
    }

    fn get_text(&self, url: &Url) -> anyhow::Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {url}: HTTP {status}");
        }

        // The marketplace serves UTF-8 whatever the headers claim.
        let bytes = response
            .bytes()
            .with_context(|| format!("read body: {url}"))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<P: Pacer> PageSource for HttpFetcher<P> {
    fn fetch(&self, url: &Url) -> Option<String> {
        for attempt in 0..self.retries {
            match self.get_text(url) {
                Ok(text) => return Some(text),
                Err(err) => {
                    tracing::warn!(%url, attempt = attempt + 1, "fetch attempt failed: {err:#}");
                    if attempt + 1 < self.retries {
                        self.pacer.pause(backoff(attempt));
                    }
                }
            }
        }

        tracing::error!(%url, retries = self.retries, "giving up on page after all attempts");
        None
    }
}

/// Delay before retrying after attempt number `attempt` (0-based) failed.
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1_u64 << attempt.min(16))
}
