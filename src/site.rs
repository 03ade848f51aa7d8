//! URL templates for the marketplace pages.

use url::Url;

const LISTING_PATH: &str = "user_books_for_sale.php";
const DETAIL_PATH: &str = "bookdetails.php";
const USER_PATH: &str = "userDetails.php";
const LISTING_ORDER_BY: &str = "authorLastName";

pub fn listing_url(base: &Url, user_id: &str, page_num: u32) -> Url {
    let mut url = endpoint(base, LISTING_PATH);
    url.query_pairs_mut()
        .append_pair("page_num", &page_num.to_string())
        .append_pair("search[displayType]", "")
        .append_pair("search[orderBy]", LISTING_ORDER_BY)
        .append_pair("userId", user_id);
    url
}

pub fn detail_url(base: &Url, book_id: &str) -> Url {
    let mut url = endpoint(base, DETAIL_PATH);
    url.query_pairs_mut().append_pair("item_id", book_id);
    url
}

pub fn seller_url(base: &Url, user_id: &str) -> Url {
    let mut url = endpoint(base, USER_PATH);
    url.query_pairs_mut().append_pair("userId", user_id);
    url
}

/// Reads the `item_id` query parameter, or `""` when the url has none.
pub fn item_id(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "item_id")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default()
}

fn endpoint(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    url.set_path(&format!("/{path}"));
    url.set_query(None);
    url.set_fragment(None);
    url
}
