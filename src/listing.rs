use anyhow::Context as _;
use scraper::{ElementRef, Html};
use url::Url;

use crate::formats::BookOffer;
use crate::html::{element_text, selector};

/// Label of the "add to cart" button that shares the price cell.
const CART_LABEL: &str = "הוסף";
const MIN_CELLS: usize = 4;

/// Extracts book offers from a user's listing page.
///
/// A page without the listing table yields an empty list.
pub fn parse_listing_table(document: &Html, base: &Url) -> Vec<BookOffer> {
    let Some(table) = document.select(&selector(".table1")).next() else {
        tracing::warn!("no listing table found on page");
        return Vec::new();
    };

    let mut offers = Vec::new();
    for (index, row) in table.select(&selector("tr")).enumerate().skip(1) {
        let cells = row_cells(row);
        if cells.len() < MIN_CELLS {
            tracing::warn!(row = index, cells = cells.len(), "skipping short listing row");
            continue;
        }

        let offer = match parse_row(&cells, base) {
            Ok(offer) => offer,
            Err(err) => {
                tracing::error!(row = index, "failed to parse listing row: {err:#}");
                continue;
            }
        };

        if offer.title.is_empty() || offer.author.is_empty() {
            tracing::warn!(
                row = index,
                title = %offer.title,
                author = %offer.author,
                "skipping row with missing title or author"
            );
            continue;
        }

        offers.push(offer);
    }

    offers
}

/// Highest page number advertised by the pager, if any. Informational only.
pub fn advertised_page_count(document: &Html) -> Option<u32> {
    document
        .select(&selector(r#".pagination input[type="submit"]"#))
        .filter_map(|input| input.value().attr("value"))
        .filter_map(|value| value.trim().parse::<u32>().ok())
        .max()
}

pub fn clean_price(text: &str) -> String {
    text.split(CART_LABEL)
        .next()
        .unwrap_or(text)
        .trim()
        .to_owned()
}

fn row_cells(row: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "td")
        .collect()
}

fn parse_row(cells: &[ElementRef<'_>], base: &Url) -> anyhow::Result<BookOffer> {
    let (title, book_url) = linked_text(cells[0], base).context("title cell")?;
    let (author, author_url) = linked_text(cells[1], base).context("author cell")?;

    let book_id = book_url
        .as_ref()
        .map(crate::site::item_id)
        .unwrap_or_default();

    Ok(BookOffer {
        book_id,
        title,
        author,
        condition: element_text(cells[2]),
        price: clean_price(&element_text(cells[3])),
        book_url: book_url.map(String::from).unwrap_or_default(),
        author_url: author_url.map(String::from).unwrap_or_default(),
    })
}

/// Text of the cell's first anchor (or of the cell itself) and the anchor's
/// absolute target.
fn linked_text(cell: ElementRef<'_>, base: &Url) -> anyhow::Result<(String, Option<Url>)> {
    let Some(anchor) = cell.select(&selector("a")).next() else {
        return Ok((element_text(cell), None));
    };

    let url = match anchor.value().attr("href") {
        Some(href) => Some(
            base.join(href.trim())
                .with_context(|| format!("resolve href {href:?}"))?,
        ),
        None => None,
    };

    Ok((element_text(anchor), url))
}
