use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub has_next: bool,
}

impl<T> PagedResponse<T> {
    /// Builds a page from a query that fetched one row past the page size.
    pub fn from_overfetch(mut items: Vec<T>, page_size: usize) -> Self {
        let has_next = items.len() > page_size;
        items.truncate(page_size);
        Self { items, has_next }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overfetch_past_the_page_size_signals_a_next_page() {
        let page = PagedResponse::from_overfetch(vec![1, 2, 3, 4], 3);
        assert_eq!(page.items, vec![1, 2, 3]);
        assert!(page.has_next);

        let page = PagedResponse::from_overfetch(vec![1, 2], 3);
        assert_eq!(page.items, vec![1, 2]);
        assert!(!page.has_next);
    }
}
