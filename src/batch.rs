use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use scraper::Html;

use crate::config::{PageLimit, ScrapeConfig};
use crate::fetch::{Pacer, PageSource};
use crate::formats::{BookDetail, Seller};
use crate::paginate::{UserListings, scrape_user_listings};
use crate::sink::RecordSink;

#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub processed: usize,
    pub interrupted: bool,
}

/// Runs `scrape` for each id in order, one at a time, pausing `delay` between
/// items. `cancel` is only consulted between items, so an in-flight item
/// always completes. Ids that produce nothing are skipped.
pub fn run_batch<T>(
    kind: &str,
    ids: &[String],
    pacer: &dyn Pacer,
    delay: Duration,
    cancel: &AtomicBool,
    mut scrape: impl FnMut(&str) -> anyhow::Result<Option<T>>,
) -> anyhow::Result<BatchOutcome<T>> {
    let mut outcome = BatchOutcome {
        items: Vec::new(),
        processed: 0,
        interrupted: false,
    };

    for (index, id) in ids.iter().enumerate() {
        if index > 0 {
            pacer.pause(delay);
        }
        if cancel.load(Ordering::SeqCst) {
            tracing::warn!(
                kind,
                processed = outcome.processed,
                remaining = ids.len() - index,
                "scraping interrupted by user"
            );
            outcome.interrupted = true;
            break;
        }

        tracing::info!(kind, id = %id, "processing {}/{}", index + 1, ids.len());
        match scrape(id)? {
            Some(item) => outcome.items.push(item),
            None => tracing::warn!(kind, id = %id, "nothing scraped; skipping"),
        }
        outcome.processed += 1;
    }

    Ok(outcome)
}

/// Listing walk for every user. Each user's books go to the sink as soon as
/// that user is done.
pub fn scrape_users(
    source: &dyn PageSource,
    pacer: &dyn Pacer,
    config: &ScrapeConfig,
    user_ids: &[String],
    limit: PageLimit,
    sink: &mut dyn RecordSink,
    cancel: &AtomicBool,
) -> anyhow::Result<BatchOutcome<UserListings>> {
    run_batch("user", user_ids, pacer, config.item_delay, cancel, |user_id| {
        let listings = scrape_user_listings(source, pacer, config, user_id, limit);
        if listings.offers.is_empty() {
            tracing::warn!(user_id, "no books found for user");
            return Ok(None);
        }

        sink.write_user_listings(user_id, &listings.offers)?;
        tracing::info!(
            user_id,
            books = listings.offers.len(),
            pages = listings.pages_fetched,
            "finished user"
        );
        Ok(Some(listings))
    })
}

/// Fetches one detail page and extracts the book plus its sellers.
pub fn scrape_book(
    source: &dyn PageSource,
    config: &ScrapeConfig,
    book_id: &str,
    last_updated: &str,
) -> Option<(BookDetail, Vec<Seller>)> {
    let url = crate::site::detail_url(&config.base_url, book_id);
    tracing::info!(book_id, %url, "scraping book");

    let Some(html) = source.fetch(&url) else {
        tracing::error!(book_id, "failed to fetch book");
        return None;
    };

    let document = Html::parse_document(&html);
    let book = crate::detail::extract_book_detail(&document, book_id, &config.base_url);
    let sellers =
        crate::sellers::extract_sellers(&html, &document, book_id, &config.base_url, last_updated);
    tracing::info!(book_id, sellers = sellers.len(), "extracted sellers");

    Some((book, sellers))
}

#[derive(Debug, Default)]
pub struct DetailBatch {
    pub books: Vec<BookDetail>,
    pub sellers: Vec<Seller>,
    pub processed: usize,
    pub interrupted: bool,
}

/// Detail scrape for every book id. Books and sellers are handed to the sink
/// once, after the loop, including when the loop was interrupted.
pub fn scrape_books(
    source: &dyn PageSource,
    pacer: &dyn Pacer,
    config: &ScrapeConfig,
    book_ids: &[String],
    last_updated: &str,
    sink: &mut dyn RecordSink,
    cancel: &AtomicBool,
) -> anyhow::Result<DetailBatch> {
    let outcome = run_batch("book", book_ids, pacer, config.item_delay, cancel, |book_id| {
        Ok(scrape_book(source, config, book_id, last_updated))
    })?;

    let mut batch = DetailBatch {
        processed: outcome.processed,
        interrupted: outcome.interrupted,
        ..DetailBatch::default()
    };
    for (book, sellers) in outcome.items {
        batch.books.push(book);
        batch.sellers.extend(sellers);
    }

    sink.write_book_details(&batch.books)?;
    sink.write_sellers(&batch.sellers)?;
    Ok(batch)
}
