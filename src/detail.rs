use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;

use crate::formats::{BookDetail, CATEGORY_LEVELS};
use crate::html::{collapse_whitespace, element_text, raw_text, selector};

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"בשנת\s*(\d{4})").expect("year regex"));
static PAGES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"מכיל\s*(\d+)\s*עמוד(?:ים)?").expect("pages regex"));

/// Pulls bibliographic fields out of a book's detail page.
///
/// `book_id` comes from the request, not the page. Each field is looked up
/// independently and left empty when its element is missing, so a record is
/// always returned.
pub fn extract_book_detail(document: &Html, book_id: &str, base: &Url) -> BookDetail {
    let book_url = crate::site::detail_url(base, book_id);
    let mut book = BookDetail::empty(book_id, book_url.as_str());

    book.title = first_text(document, r#"h2 span[style*="font-size:2em;color:#9E0B0E"]"#);
    book.author = first_text(document, r#"h3 a[href*="authorDetails"]"#);
    book.series = collapse_whitespace(&first_text(
        document,
        r#"a[href*="searchBooks.php?searchType=tabSeries"]"#,
    ));
    book.publisher = first_text(document, r#"a[href*="publisherDetails"]"#);

    match document.select(&selector(".when")).next() {
        Some(info) => fill_from_info_block(&mut book, info),
        None => tracing::warn!(book_id, "no info block on detail page"),
    }

    if book.title.is_empty() {
        tracing::warn!(book_id, "detail page has no title");
    }

    book
}

fn fill_from_info_block(book: &mut BookDetail, info: ElementRef<'_>) {
    let text = raw_text(info);

    if let Some(caps) = YEAR_RE.captures(&text) {
        book.year = caps[1].to_owned();
    }
    if let Some(caps) = PAGES_RE.captures(&text) {
        book.pages = caps[1].to_owned();
    }

    let path: Vec<String> = info
        .select(&selector(r#"a[href*="category.php"]"#))
        .take(CATEGORY_LEVELS)
        .map(element_text)
        .collect();
    book.set_categories(path.as_slice());
}

fn first_text(document: &Html, css: &'static str) -> String {
    document
        .select(&selector(css))
        .next()
        .map(element_text)
        .unwrap_or_default()
}
