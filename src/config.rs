use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://simania.co.il";

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Runtime knobs shared by every stage of a scrape run.
///
/// Only `base_url` is reachable from the command line. The timeout and the
/// delays bound the request rate against the marketplace and stay fixed.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub retries: u32,
    pub request_timeout: Duration,
    pub page_delay: Duration,
    pub item_delay: Duration,
    pub page_safety_limit: u32,
}

impl ScrapeConfig {
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("parse base url")?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("base url must be http/https: {base_url}");
        }

        Ok(Self {
            base_url,
            ..Self::default()
        })
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            user_agent: BROWSER_USER_AGENT.to_owned(),
            retries: 3,
            request_timeout: Duration::from_secs(30),
            page_delay: Duration::from_secs(1),
            item_delay: Duration::from_secs(2),
            page_safety_limit: 10_000,
        }
    }
}

/// How many listing pages to walk per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLimit {
    /// Walk until the site runs out of results (or the safety ceiling trips).
    All,
    Max(NonZeroU32),
}

impl PageLimit {
    pub fn allows(self, page_num: u32) -> bool {
        match self {
            PageLimit::All => true,
            PageLimit::Max(max) => page_num <= max.get(),
        }
    }
}

impl FromStr for PageLimit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageLimit::All);
        }

        let n: u32 = s
            .parse()
            .with_context(|| format!("expected `all` or a page count, got {s:?}"))?;
        NonZeroU32::new(n)
            .map(PageLimit::Max)
            .ok_or_else(|| anyhow::anyhow!("page count must be at least 1 (use `all` for no cap)"))
    }
}

impl fmt::Display for PageLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLimit::All => f.write_str("all"),
            PageLimit::Max(max) => write!(f, "{max}"),
        }
    }
}
