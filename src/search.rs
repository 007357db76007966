use crate::api::{Book, User};

/// Records that can be narrowed by the search box.
pub trait Searchable {
    /// The single text field the search term is matched against.
    fn search_key(&self) -> &str;
}

impl Searchable for Book {
    fn search_key(&self) -> &str {
        &self.title
    }
}

impl Searchable for User {
    fn search_key(&self) -> &str {
        &self.name
    }
}

/// Case-insensitive substring filter over `items`, preserving order.
///
/// An empty term keeps every record.
pub fn filter<'a, R: Searchable>(items: &'a [R], term: &str) -> Vec<&'a R> {
    let q = term.to_lowercase();
    if q.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|r| r.search_key().to_lowercase().contains(&q))
        .collect()
}
