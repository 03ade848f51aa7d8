use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use url::Url;

use crate::fetch::PageSource;
use crate::formats::{BookDetail, BookOffer, Seller};
use crate::sink::RecordSink;

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a scoped debug-level subscriber and returns its result with
/// the log text.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().expect("log buffer lock").clone();
    (out, String::from_utf8_lossy(&bytes).into_owned())
}

pub fn count_level(logs: &str, level: &str) -> usize {
    logs.lines().filter(|line| line.contains(level)).count()
}

/// Serves canned pages keyed by full URL and remembers what was asked for.
#[derive(Default)]
pub struct CannedPages {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

impl CannedPages {
    pub fn with_page(mut self, url: &Url, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl PageSource for CannedPages {
    fn fetch(&self, url: &Url) -> Option<String> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(url.to_string());
        self.pages.get(url.as_str()).cloned()
    }
}

/// Keeps every written record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub listings: Vec<(String, Vec<BookOffer>)>,
    pub books: Vec<BookDetail>,
    pub sellers: Vec<Seller>,
}

impl RecordSink for MemorySink {
    fn write_user_listings(&mut self, user_id: &str, offers: &[BookOffer]) -> anyhow::Result<()> {
        self.listings.push((user_id.to_owned(), offers.to_vec()));
        Ok(())
    }

    fn write_book_details(&mut self, books: &[BookDetail]) -> anyhow::Result<()> {
        self.books.extend_from_slice(books);
        Ok(())
    }

    fn write_sellers(&mut self, sellers: &[Seller]) -> anyhow::Result<()> {
        self.sellers.extend_from_slice(sellers);
        Ok(())
    }
}
