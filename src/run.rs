use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use anyhow::Context as _;

use crate::batch::{scrape_books, scrape_users};
use crate::cli::{DetailsArgs, ListingsArgs};
use crate::config::{PageLimit, ScrapeConfig};
use crate::fetch::{HttpFetcher, ThreadSleep};
use crate::sink::{CsvSink, read_listing_book_ids};

pub fn listings(args: ListingsArgs, cancel: &AtomicBool) -> anyhow::Result<()> {
    let config = ScrapeConfig::with_base_url(&args.base_url).context("--base-url")?;
    let fetcher = HttpFetcher::new(&config, ThreadSleep)?;
    let mut sink = CsvSink::for_listings(args.out_dir.clone());
    let user_ids = dedup_ids(args.user_ids);

    if args.max_pages == PageLimit::All {
        tracing::info!("no page limit set; scraping all available pages");
    }

    let outcome = scrape_users(
        &fetcher,
        &ThreadSleep,
        &config,
        &user_ids,
        args.max_pages,
        &mut sink,
        cancel,
    )?;

    let total_books: usize = outcome.items.iter().map(|u| u.offers.len()).sum();
    tracing::info!(
        users = outcome.processed,
        users_with_books = outcome.items.len(),
        books = total_books,
        max_pages = %args.max_pages,
        out_dir = %args.out_dir.display(),
        interrupted = outcome.interrupted,
        "listing scrape finished"
    );
    Ok(())
}

pub fn details(args: DetailsArgs, cancel: &AtomicBool) -> anyhow::Result<()> {
    let config = ScrapeConfig::with_base_url(&args.base_url).context("--base-url")?;

    let mut ids = args.book_ids;
    for path in &args.from_listings {
        let from_file = read_listing_book_ids(path)?;
        tracing::info!(path = %path.display(), ids = from_file.len(), "loaded book ids");
        ids.extend(from_file);
    }
    let book_ids = dedup_ids(ids);
    if book_ids.is_empty() {
        anyhow::bail!("no book ids given (use --book-id or --from-listings)");
    }

    let fetcher = HttpFetcher::new(&config, ThreadSleep)?;
    let mut sink = CsvSink::for_details(args.books_out.clone(), args.sellers_out.clone());
    let today = chrono::Local::now().format("%Y-%m-%d").to_string();

    let batch = scrape_books(
        &fetcher,
        &ThreadSleep,
        &config,
        &book_ids,
        &today,
        &mut sink,
        cancel,
    )?;

    tracing::info!(
        processed = batch.processed,
        books = batch.books.len(),
        sellers = batch.sellers.len(),
        books_out = %args.books_out.display(),
        sellers_out = %args.sellers_out.display(),
        interrupted = batch.interrupted,
        "detail scrape finished"
    );
    Ok(())
}

/// Trims ids, drops empties and repeats, keeps first-seen order.
pub fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}
