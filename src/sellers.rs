//! Seller recovery from detail pages.
//!
//! Sellers are embedded in the page as a JSON-like `privateSellers` array that
//! is frequently malformed, so it is never parsed as a whole. The array is
//! isolated by pattern, every object fragment that names a `userId` is cut out
//! on its own, and each field is then read from the fragment independently.
//! When that recovers nobody, loosely classed elements are scanned for price
//! and condition cues instead. The two paths never mix for one book.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use url::Url;

use crate::formats::Seller;
use crate::html::{element_text, selector};

/// Array payload after the key, tolerant of newlines, escaped quotes and a
/// missing closing bracket.
static PAYLOAD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\\?"privateSellers\\?"\s*:\s*\[(.*?)(?:\]|\z)"#).expect("payload regex")
});
static FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^{}]*\\?"userId\\?"[^{}]*(?:\}|\z)"#).expect("fragment regex")
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(\d+)\s*(?:₪|ש"ח)"#).expect("price regex"));
static CONDITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(כחדש|מצוין|טוב|חדש|ישן|בינוני)").expect("condition regex"));

/// Keys read from each seller fragment, in [`SellerFragment`] field order.
const FRAGMENT_KEYS: [&str; 6] = [
    "userId",
    "userName",
    "userImage",
    "isFemale",
    "hasImage",
    "frozenUser",
];

/// `"key": "..."` (quotes optionally backslash-escaped) or a bare
/// number/boolean, one pattern per key.
static FIELD_RES: LazyLock<[Regex; 6]> = LazyLock::new(|| {
    FRAGMENT_KEYS.map(|key| {
        Regex::new(&format!(
            r#"\\?"{}\\?"\s*:\s*(?:\\?"([^"\\]*)\\?"|(-?\d+|true|false))"#,
            regex::escape(key)
        ))
        .expect("seller field regex")
    })
});

/// Markers that make an element look like it describes an offer.
const OFFER_KEYWORDS: [&str; 4] = ["₪", "ש\"ח", "מחיר", "מצב"];

/// Fields recovered from one seller object. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerFragment {
    pub user_id: Option<String>,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub is_female: Option<String>,
    pub has_image: Option<String>,
    pub frozen_user: Option<String>,
}

impl SellerFragment {
    pub fn parse(fragment: &str) -> Self {
        let [user_id, user_name, user_image, is_female, has_image, frozen_user] =
            std::array::from_fn(|i| field_value(&FIELD_RES[i], fragment));
        Self {
            user_id,
            user_name,
            user_image,
            is_female,
            has_image,
            frozen_user,
        }
    }
}

/// All sellers for one book. `html` is the page source the document was
/// parsed from; `last_updated` stamps every record.
pub fn extract_sellers(
    html: &str,
    document: &Html,
    book_id: &str,
    base: &Url,
    last_updated: &str,
) -> Vec<Seller> {
    let sellers = sellers_from_payload(html, book_id, base, last_updated);
    if !sellers.is_empty() {
        return sellers;
    }

    tracing::info!(book_id, "no private sellers recovered; scanning page elements");
    sellers_from_elements(document, book_id, last_updated)
}

/// Raw object fragments inside the `privateSellers` array, in page order.
pub fn payload_fragments(html: &str) -> Option<Vec<&str>> {
    let payload = PAYLOAD_RE.captures(html)?.get(1)?.as_str();
    Some(FRAGMENT_RE.find_iter(payload).map(|m| m.as_str()).collect())
}

fn sellers_from_payload(html: &str, book_id: &str, base: &Url, last_updated: &str) -> Vec<Seller> {
    let Some(fragments) = payload_fragments(html) else {
        tracing::debug!(book_id, "page has no privateSellers payload");
        return Vec::new();
    };
    tracing::info!(book_id, fragments = fragments.len(), "found privateSellers payload");

    let mut sellers = Vec::new();
    for (index, raw) in fragments.into_iter().enumerate() {
        let fragment = SellerFragment::parse(raw);
        let Some(user_id) = fragment.user_id.as_deref() else {
            tracing::warn!(book_id, fragment = index + 1, "seller fragment has no readable userId");
            continue;
        };

        tracing::debug!(
            book_id,
            user_id,
            user_name = fragment.user_name.as_deref().unwrap_or(""),
            user_image = fragment.user_image.as_deref().unwrap_or(""),
            is_female = fragment.is_female.as_deref().unwrap_or(""),
            has_image = fragment.has_image.as_deref().unwrap_or(""),
            frozen = fragment.frozen_user.as_deref().unwrap_or(""),
            "recovered seller"
        );
        sellers.push(Seller {
            seller_id: format!("{book_id}_{user_id}"),
            book_id: book_id.to_owned(),
            condition: String::new(),
            price: String::new(),
            seller_url: crate::site::seller_url(base, user_id).into(),
            last_updated: last_updated.to_owned(),
        });
    }

    sellers
}

fn sellers_from_elements(document: &Html, book_id: &str, last_updated: &str) -> Vec<Seller> {
    let candidates = selector(r#"[class*="seller"], [class*="user"], [class*="price"]"#);

    let mut sellers = Vec::new();
    for element in document.select(&candidates) {
        let text = element_text(element);
        if text.is_empty() || !OFFER_KEYWORDS.iter().any(|kw| text.contains(kw)) {
            continue;
        }

        let price = PRICE_RE
            .captures(&text)
            .map(|caps| format!("{} ₪", &caps[1]))
            .unwrap_or_default();
        let condition = CONDITION_RE
            .captures(&text)
            .map(|caps| caps[1].to_owned())
            .unwrap_or_default();

        sellers.push(Seller {
            seller_id: format!("{book_id}_html_{}", sellers.len() + 1),
            book_id: book_id.to_owned(),
            condition,
            price,
            seller_url: String::new(),
            last_updated: last_updated.to_owned(),
        });
    }

    tracing::info!(book_id, sellers = sellers.len(), "fallback seller scan finished");
    sellers
}

/// First value matched by a field pattern. Empty strings count as missing.
fn field_value(re: &Regex, fragment: &str) -> Option<String> {
    let caps = re.captures(fragment)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|value| !value.is_empty())
}
