use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::Serialize;

use crate::formats::{BookDetail, BookOffer, Seller};

/// Final destination of scraped records.
pub trait RecordSink {
    fn write_user_listings(&mut self, user_id: &str, offers: &[BookOffer]) -> anyhow::Result<()>;
    fn write_book_details(&mut self, books: &[BookDetail]) -> anyhow::Result<()>;
    fn write_sellers(&mut self, sellers: &[Seller]) -> anyhow::Result<()>;
}

/// Writes UTF-8 CSV files with a header row. Empty record sets produce no file.
///
/// A sink only knows the destinations of the command that built it; writing
/// any other record kind is an error.
#[derive(Debug, Clone, Default)]
pub struct CsvSink {
    listings_dir: Option<PathBuf>,
    books_path: Option<PathBuf>,
    sellers_path: Option<PathBuf>,
}

impl CsvSink {
    pub fn for_listings(listings_dir: PathBuf) -> Self {
        Self {
            listings_dir: Some(listings_dir),
            ..Self::default()
        }
    }

    pub fn for_details(books_path: PathBuf, sellers_path: PathBuf) -> Self {
        Self {
            books_path: Some(books_path),
            sellers_path: Some(sellers_path),
            ..Self::default()
        }
    }

    /// `simania_books_user_<id>.csv` under the listings directory, if any.
    pub fn listings_path(&self, user_id: &str) -> Option<PathBuf> {
        self.listings_dir
            .as_ref()
            .map(|dir| dir.join(format!("simania_books_user_{user_id}.csv")))
    }
}

impl RecordSink for CsvSink {
    fn write_user_listings(&mut self, user_id: &str, offers: &[BookOffer]) -> anyhow::Result<()> {
        let path = self
            .listings_path(user_id)
            .context("sink has no listings directory")?;
        write_csv(&path, offers)
    }

    fn write_book_details(&mut self, books: &[BookDetail]) -> anyhow::Result<()> {
        let path = self.books_path.as_deref().context("sink has no books path")?;
        write_csv(path, books)
    }

    fn write_sellers(&mut self, sellers: &[Seller]) -> anyhow::Result<()> {
        let path = self
            .sellers_path
            .as_deref()
            .context("sink has no sellers path")?;
        write_csv(path, sellers)
    }
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> anyhow::Result<()> {
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "no records; file not written");
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }

    let file =
        File::create(path).with_context(|| format!("create csv: {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("write csv record: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush csv: {}", path.display()))?;

    tracing::info!(path = %path.display(), records = records.len(), "wrote csv");
    Ok(())
}

/// `book_id` column of listing CSVs written by [`CsvSink`], in file order.
pub fn read_listing_book_ids(path: &Path) -> anyhow::Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open listing csv: {}", path.display()))?;

    let mut ids = Vec::new();
    for record in reader.deserialize::<BookOffer>() {
        let offer = record.with_context(|| format!("read listing csv: {}", path.display()))?;
        if !offer.book_id.trim().is_empty() {
            ids.push(offer.book_id.trim().to_owned());
        }
    }
    Ok(ids)
}
