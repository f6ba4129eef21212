/// One row of a listing or search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSummary {
    pub id: i64,
    pub name: String,
    pub num_upcoming_shows: u64,
}

/// Every match of a search together with how many there were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub count: u64,
    pub items: Vec<ListingSummary>,
}

impl SearchResults {
    pub fn new(items: Vec<ListingSummary>) -> Self {
        Self {
            count: items.len() as u64,
            items,
        }
    }
}

/// Case-insensitive substring matcher for names.
///
/// Matching happens in Rust rather than through SQLite's `LIKE`, which only
/// folds ASCII letters and treats `%` and `_` as wildcards. Every character of
/// the term is taken literally and case is folded with Unicode rules.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    needle: String,
}

impl NameMatcher {
    pub fn new(search_term: &str) -> Self {
        Self {
            needle: search_term.to_lowercase(),
        }
    }

    /// An empty term matches every name.
    pub fn matches(&self, name: &str) -> bool {
        self.needle.is_empty() || name.to_lowercase().contains(&self.needle)
    }

    /// Keep the items whose name matches, preserving their order.
    pub fn filter<T>(&self, items: Vec<T>, name: impl Fn(&T) -> &str) -> Vec<T> {
        items
            .into_iter()
            .filter(|item| self.matches(name(item)))
            .collect()
    }
}
