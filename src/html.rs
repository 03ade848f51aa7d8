use scraper::{ElementRef, Selector};

/// Parses a selector known at compile time.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|err| panic!("invalid built-in selector {css:?}: {err}"))
}

/// Visible text of an element: each text node trimmed, empty nodes dropped,
/// the rest joined with single spaces.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Raw text content, whitespace kept as in the document.
pub fn raw_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    #[test]
    fn element_text_trims_nodes() {
        let doc = Html::parse_document(
            "<table><tr><td>\n  45 ₪ <a href='#'> הוסף לסל </a>\n</td></tr></table>",
        );
        let td = doc.select(&selector("td")).next().unwrap();
        assert_eq!(element_text(td), "45 ₪ הוסף לסל");
    }

    #[test]
    fn collapse_whitespace_joins_runs() {
        assert_eq!(collapse_whitespace("  טרזן \n\t #8  "), "טרזן #8");
    }
}
