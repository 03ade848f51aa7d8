use serde::{Deserialize, Serialize};

pub const CATEGORY_LEVELS: usize = 5;
pub const CATEGORY_SEPARATOR: &str = " » ";

/// One row of a user's for-sale listing table.
///
/// Field order is the column order of the listing CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookOffer {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub condition: String,
    pub price: String,
    pub book_url: String,
    pub author_url: String,
}

/// Bibliographic data from a book's detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDetail {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub series: String,
    pub publisher: String,
    pub year: String,
    pub pages: String,
    pub category_1: String,
    pub category_2: String,
    pub category_3: String,
    pub category_4: String,
    pub category_5: String,
    pub category_full: String,
    pub book_url: String,
}

impl BookDetail {
    pub fn empty(book_id: &str, book_url: &str) -> Self {
        Self {
            book_id: book_id.to_owned(),
            title: String::new(),
            author: String::new(),
            series: String::new(),
            publisher: String::new(),
            year: String::new(),
            pages: String::new(),
            category_1: String::new(),
            category_2: String::new(),
            category_3: String::new(),
            category_4: String::new(),
            category_5: String::new(),
            category_full: String::new(),
            book_url: book_url.to_owned(),
        }
    }

    /// Fills the category slots from the most general level down and
    /// recomputes `category_full`. Levels past the fifth are dropped.
    pub fn set_categories<S: AsRef<str>>(&mut self, path: &[S]) {
        let mut slots: [String; CATEGORY_LEVELS] = Default::default();
        for (slot, level) in slots.iter_mut().zip(path) {
            *slot = level.as_ref().trim().to_owned();
        }

        self.category_full = slots
            .iter()
            .filter(|level| !level.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(CATEGORY_SEPARATOR);

        let [c1, c2, c3, c4, c5] = slots;
        self.category_1 = c1;
        self.category_2 = c2;
        self.category_3 = c3;
        self.category_4 = c4;
        self.category_5 = c5;
    }

    pub fn categories(&self) -> [&str; CATEGORY_LEVELS] {
        [
            &self.category_1,
            &self.category_2,
            &self.category_3,
            &self.category_4,
            &self.category_5,
        ]
    }
}

/// A private seller offering a specific book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    pub seller_id: String,
    pub book_id: String,
    pub condition: String,
    pub price: String,
    pub seller_url: String,
    pub last_updated: String,
}
