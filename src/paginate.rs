use scraper::Html;

use crate::config::{PageLimit, ScrapeConfig};
use crate::fetch::{Pacer, PageSource};
use crate::formats::BookOffer;
use crate::listing::{advertised_page_count, parse_listing_table};

/// Why a user's listing walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FetchFailed { page: u32 },
    NoMoreResults { page: u32 },
    PageLimit,
    SafetyLimit,
}

#[derive(Debug, Clone)]
pub struct UserListings {
    pub user_id: String,
    pub offers: Vec<BookOffer>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Walks a user's listing pages from page 1 until a stop condition trips.
pub fn scrape_user_listings(
    source: &dyn PageSource,
    pacer: &dyn Pacer,
    config: &ScrapeConfig,
    user_id: &str,
    limit: PageLimit,
) -> UserListings {
    tracing::info!(user_id, max_pages = %limit, "scraping listings for user");

    let mut offers: Vec<BookOffer> = Vec::new();
    let mut page_num: u32 = 1;
    let mut pages_fetched: u32 = 0;

    let stop = loop {
        if !limit.allows(page_num) {
            break StopReason::PageLimit;
        }
        if limit == PageLimit::All && page_num > config.page_safety_limit {
            tracing::warn!(
                user_id,
                limit = config.page_safety_limit,
                "reached page safety limit; stopping"
            );
            break StopReason::SafetyLimit;
        }

        if page_num > 1 {
            pacer.pause(config.page_delay);
        }

        let url = crate::site::listing_url(&config.base_url, user_id, page_num);
        tracing::info!(user_id, page = page_num, %url, "fetching listing page");

        pages_fetched += 1;
        let Some(html) = source.fetch(&url) else {
            tracing::error!(user_id, page = page_num, "failed to fetch listing page");
            break StopReason::FetchFailed { page: page_num };
        };

        let document = Html::parse_document(&html);
        let page_offers = parse_listing_table(&document, &config.base_url);
        if page_offers.is_empty() {
            tracing::info!(user_id, page = page_num, "no more books; stopping");
            break StopReason::NoMoreResults { page: page_num };
        }

        tracing::info!(user_id, page = page_num, books = page_offers.len(), "parsed listing page");
        offers.extend(page_offers);

        if let Some(total) = advertised_page_count(&document) {
            tracing::info!(user_id, total_pages = total, "pager advertises total pages");
        }

        match limit {
            PageLimit::Max(max) => tracing::info!(user_id, "completed page {page_num}/{max}"),
            PageLimit::All => tracing::info!(user_id, "completed page {page_num}"),
        }
        page_num += 1;
    };

    let before = offers.len();
    offers.retain(|offer| !offer.title.trim().is_empty());
    tracing::info!(
        user_id,
        kept = offers.len(),
        dropped = before - offers.len(),
        "filtered books without titles"
    );

    UserListings {
        user_id: user_id.to_owned(),
        offers,
        pages_fetched,
        stop,
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::time::Duration;

    use url::Url;

    use super::*;
    use crate::fetch::RecordingPacer;
    use crate::testing::CannedPages;

    fn page(rows: &[(&str, &str)]) -> String {
        let body: String = rows
            .iter()
            .map(|(id, title)| {
                format!(
                    r#"<tr><td><a href="/bookdetails.php?item_id={id}">{title}</a></td><td>מחבר</td><td>טוב</td><td>10 ₪ הוסף לסל</td></tr>"#
                )
            })
            .collect();
        format!(
            r#"<html><body><table class="table1"><tr><td>ספר</td><td>מחבר</td><td>מצב</td><td>מחיר</td></tr>{body}</table></body></html>"#
        )
    }

    fn config() -> ScrapeConfig {
        ScrapeConfig::with_base_url("http://books.test").unwrap()
    }

    fn listing(config: &ScrapeConfig, n: u32) -> Url {
        crate::site::listing_url(&config.base_url, "7", n)
    }

    #[test]
    fn stops_after_first_empty_page() {
        let config = config();
        let source = CannedPages::default()
            .with_page(&listing(&config, 1), page(&[("1", "א"), ("2", "ב")]))
            .with_page(&listing(&config, 2), page(&[("3", "ג")]))
            .with_page(&listing(&config, 3), page(&[]))
            .with_page(&listing(&config, 4), page(&[("4", "ד")]));
        let pacer = RecordingPacer::default();

        let result = scrape_user_listings(&source, &pacer, &config, "7", PageLimit::All);

        assert_eq!(result.offers.len(), 3);
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(result.stop, StopReason::NoMoreResults { page: 3 });
        assert_eq!(source.requests().len(), 3);
        assert_eq!(pacer.pauses(), vec![Duration::from_secs(1); 2]);
    }

    #[test]
    fn never_fetches_past_max_pages() {
        let config = config();
        let source = CannedPages::default()
            .with_page(&listing(&config, 1), page(&[("1", "א")]))
            .with_page(&listing(&config, 2), page(&[("2", "ב")]))
            .with_page(&listing(&config, 3), page(&[("3", "ג")]));
        let pacer = RecordingPacer::default();
        let limit = PageLimit::Max(NonZeroU32::new(2).unwrap());

        let result = scrape_user_listings(&source, &pacer, &config, "7", limit);

        assert_eq!(result.stop, StopReason::PageLimit);
        assert_eq!(source.requests().len(), 2);
        let ids: Vec<&str> = result.offers.iter().map(|o| o.book_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn fetch_failure_stops_and_keeps_earlier_pages() {
        let config = config();
        let source =
            CannedPages::default().with_page(&listing(&config, 1), page(&[("1", "א")]));
        let pacer = RecordingPacer::default();

        let result = scrape_user_listings(&source, &pacer, &config, "7", PageLimit::All);

        assert_eq!(result.stop, StopReason::FetchFailed { page: 2 });
        assert_eq!(result.offers.len(), 1);
    }

    #[test]
    fn unbounded_walk_hits_safety_limit() {
        let mut config = config();
        config.page_safety_limit = 4;
        let mut source = CannedPages::default();
        for n in 1..=6 {
            source = source.with_page(&listing(&config, n), page(&[("1", "א")]));
        }
        let pacer = RecordingPacer::default();

        let result = scrape_user_listings(&source, &pacer, &config, "7", PageLimit::All);

        assert_eq!(result.stop, StopReason::SafetyLimit);
        assert_eq!(source.requests().len(), 4);
        assert_eq!(result.offers.len(), 4);
    }
}
