use crate::config::CatalogEntry;
use crate::model::BookMetadata;
use std::collections::HashMap;

/// Local lookup table of known titles, keyed by uppercase product id
#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    books: HashMap<String, BookMetadata>,
}

impl BookCatalog {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let books = entries
            .iter()
            .map(|entry| {
                let asin = entry.asin.to_uppercase();
                let metadata = BookMetadata {
                    title: entry.title.clone(),
                    asin: Some(asin.clone()),
                    blurb: entry.blurb.clone(),
                    cover_url: entry.cover_url.clone(),
                };
                (asin, metadata)
            })
            .collect();
        Self { books }
    }

    pub fn get(&self, asin: &str) -> Option<&BookMetadata> {
        self.books.get(&asin.to_uppercase())
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
