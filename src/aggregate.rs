//! Merging of listing pages into one ordered, duplicate-free result list.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{Property, ResultPage};

/// Append `page` after `pages`, dropping listings already seen by id.
///
/// Duplicates inside `page` itself are dropped as well; the first occurrence
/// wins. The (possibly empty) page is always appended so the page count keeps
/// tracking the server-side cursor.
pub fn append(mut pages: Vec<ResultPage>, page: ResultPage) -> Vec<ResultPage> {
    let mut seen: HashSet<String> = pages
        .iter()
        .flat_map(|p| p.projects.iter().map(|item| item.id.clone()))
        .collect();
    pages.push(retain_unseen(page, &mut seen));
    pages
}

/// A single-page result list; used when results come from outside pagination.
pub fn replace(page: ResultPage) -> Vec<ResultPage> {
    vec![retain_unseen(page, &mut HashSet::new())]
}

fn retain_unseen(mut page: ResultPage, seen: &mut HashSet<String>) -> ResultPage {
    let incoming = page.projects.len();
    page.projects.retain(|item| seen.insert(item.id.clone()));
    let dropped = incoming - page.projects.len();
    if dropped > 0 {
        debug!("Dropped {} duplicate listings from incoming page", dropped);
    }
    page
}

/// Every page fetched for the current filter session, flattened on read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResultSet {
    pages: Vec<ResultPage>,
    exhausted: bool,
}

impl AggregatedResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normal pagination: add the next page.
    pub fn append(&mut self, page: ResultPage) {
        if page.projects.is_empty() {
            // an empty page means the server has nothing past this offset
            self.exhausted = true;
        }
        self.pages = append(std::mem::take(&mut self.pages), page);
    }

    /// Install `items` as the entire result set with pagination exhausted.
    pub fn replace(&mut self, items: Vec<Property>) {
        let total = items.len() as u64;
        self.pages = replace(ResultPage::new(items, total));
        self.exhausted = true;
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.exhausted = false;
    }

    pub fn items(&self) -> impl Iterator<Item = &Property> {
        self.pages.iter().flat_map(|p| p.projects.iter())
    }

    pub fn len(&self) -> usize {
        self.pages.iter().map(|p| p.projects.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pages(&self) -> &[ResultPage] {
        &self.pages
    }

    pub fn pages_loaded(&self) -> usize {
        self.pages.len()
    }

    /// Total reported with the first page
    pub fn total_count(&self) -> u64 {
        self.pages.first().map_or(0, |p| p.total_count)
    }

    pub fn has_next_page(&self) -> bool {
        !self.pages.is_empty() && !self.exhausted && (self.len() as u64) < self.total_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(ids: &[&str], total: u64) -> ResultPage {
        ResultPage::new(
            ids.iter().map(|id| Property::new(*id, format!("Listing {id}"))).collect(),
            total,
        )
    }

    fn ids(set: &AggregatedResultSet) -> Vec<String> {
        set.items().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn append_drops_listings_seen_on_earlier_pages() {
        let pages = append(Vec::new(), page(&["a", "b", "c"], 6));
        let pages = append(pages, page(&["c", "d", "d", "e"], 6));
        let merged: Vec<&str> = pages
            .iter()
            .flat_map(|p| p.projects.iter().map(|x| x.id.as_str()))
            .collect();
        assert_eq!(merged, ["a", "b", "c", "d", "e"]);
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn appending_the_same_page_twice_is_idempotent() {
        let mut once = AggregatedResultSet::new();
        once.append(page(&["a", "b"], 10));

        let mut twice = once.clone();
        twice.append(page(&["a", "b"], 10));

        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn growth_counts_distinct_ids_and_stops_at_total() {
        let mut set = AggregatedResultSet::new();
        set.append(page(&["a", "b", "c"], 5));
        assert!(set.has_next_page());

        set.append(page(&["c", "d"], 5));
        assert_eq!(set.len(), 4);
        assert!(set.has_next_page());

        set.append(page(&["e"], 5));
        assert_eq!(set.len(), 5);
        assert!(!set.has_next_page());
    }

    #[test]
    fn total_count_comes_from_first_page() {
        let mut set = AggregatedResultSet::new();
        set.append(page(&["a"], 2));
        set.append(page(&["b"], 9));
        assert_eq!(set.total_count(), 2);
        assert!(!set.has_next_page());
    }

    #[test]
    fn empty_page_exhausts_pagination() {
        let mut set = AggregatedResultSet::new();
        set.append(page(&["a"], 3));
        set.append(page(&[], 3));
        assert!(!set.has_next_page());
        assert_eq!(set.pages_loaded(), 2);
    }

    #[test]
    fn replace_yields_single_exhausted_page() {
        let mut set = AggregatedResultSet::new();
        set.append(page(&["a", "b"], 50));
        set.replace(page(&["x", "y", "x", "z"], 0).projects);

        assert_eq!(ids(&set), ["x", "y", "z"]);
        assert_eq!(set.pages_loaded(), 1);
        assert!(!set.has_next_page());

        set.clear();
        assert!(set.is_empty());
        assert!(!set.has_next_page());
    }
}
