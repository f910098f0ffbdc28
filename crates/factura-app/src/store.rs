// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::editor::EditSession;
use crate::error::ValidationError;
use crate::filter::{Searchable, filter_items};
use crate::view::RowView;
use crate::{Entity, RecordId};

pub const PAGE_SIZE: usize = 5;

/// Displayed items of one collection plus the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStore<T> {
    items: Vec<T>,
    current_page: usize,
}

impl<T> Default for CollectionStore<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            current_page: 1,
        }
    }
}

impl<T> CollectionStore<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut store = Self::default();
        store.set_collection(items);
        store
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.items.len().div_ceil(PAGE_SIZE)
    }

    fn max_page(&self) -> usize {
        self.page_count().max(1)
    }

    /// Replaces the items. The current page is kept unless the new list is too
    /// short for it, in which case it moves to the last page.
    pub fn set_collection(&mut self, items: Vec<T>) {
        self.items = items;
        self.current_page = self.current_page.clamp(1, self.max_page());
    }

    pub fn set_page(&mut self, page: usize) -> Result<(), ValidationError> {
        let max_page = self.max_page();
        if page < 1 || page > max_page {
            return Err(ValidationError::InvalidPage {
                requested: page,
                max_page,
            });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn next_page(&mut self) -> Result<(), ValidationError> {
        self.set_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> Result<(), ValidationError> {
        self.set_page(self.current_page.saturating_sub(1))
    }

    pub fn reset_page(&mut self) {
        self.current_page = 1;
    }

    pub fn visible(&self) -> &[T] {
        let start = ((self.current_page - 1) * PAGE_SIZE).min(self.items.len());
        let end = (start + PAGE_SIZE).min(self.items.len());
        &self.items[start..end]
    }
}

/// One collection as the user sees it: the list last fetched from the server,
/// the filtered and paginated store derived from it, and the rows being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    source: Vec<T>,
    store: CollectionStore<T>,
    term: String,
    sessions: BTreeMap<RecordId, EditSession<RowView>>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            source: Vec::new(),
            store: CollectionStore::default(),
            term: String::new(),
            sessions: BTreeMap::new(),
        }
    }
}

impl<T: Entity + Searchable> Listing<T> {
    /// Replaces the collection wholesale. Clears the filter term and discards
    /// any in-progress edits; returns how many edits were discarded.
    pub fn load(&mut self, items: Vec<T>) -> usize {
        self.source = items.clone();
        self.term.clear();
        let dropped = self.sessions.len();
        self.sessions.clear();
        self.store.set_collection(items);
        dropped
    }

    /// Filters the fetched list (never the displayed one) and returns to page 1.
    pub fn apply_filter(&mut self, term: &str) -> usize {
        self.term = term.to_owned();
        let filtered = filter_items(&self.source, term);
        let count = filtered.len();
        self.store.set_collection(filtered);
        self.store.reset_page();
        count
    }

    pub fn source(&self) -> &[T] {
        &self.source
    }

    pub const fn store(&self) -> &CollectionStore<T> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CollectionStore<T> {
        &mut self.store
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn find(&self, record_id: &RecordId) -> Option<&T> {
        self.source
            .iter()
            .find(|item| item.record_id() == record_id)
    }

    pub fn session(&self, record_id: &RecordId) -> Option<&EditSession<RowView>> {
        self.sessions.get(record_id)
    }

    pub fn session_mut(&mut self, record_id: &RecordId) -> Option<&mut EditSession<RowView>> {
        self.sessions.get_mut(record_id)
    }

    pub fn open_session(&mut self, session: EditSession<RowView>) {
        self.sessions.insert(session.record_id().clone(), session);
    }

    pub fn take_session(&mut self, record_id: &RecordId) -> Option<EditSession<RowView>> {
        self.sessions.remove(record_id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionStore, PAGE_SIZE};
    use crate::error::ValidationError;

    fn store_of(len: usize) -> CollectionStore<usize> {
        CollectionStore::new((1..=len).collect())
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(store_of(0).page_count(), 0);
        assert_eq!(store_of(1).page_count(), 1);
        assert_eq!(store_of(PAGE_SIZE).page_count(), 1);
        assert_eq!(store_of(PAGE_SIZE + 1).page_count(), 2);
        assert_eq!(store_of(12).page_count(), 3);
    }

    #[test]
    fn set_page_rejects_out_of_range_without_mutating() {
        let mut store = store_of(12);
        store.set_page(2).expect("page 2 exists");

        for requested in [0, 4, 99] {
            let error = store.set_page(requested).expect_err("out of range");
            assert_eq!(
                error,
                ValidationError::InvalidPage {
                    requested,
                    max_page: 3
                }
            );
            assert_eq!(store.current_page(), 2);
        }
    }

    #[test]
    fn empty_store_accepts_only_page_one() {
        let mut store = store_of(0);
        assert!(store.set_page(1).is_ok());
        assert!(store.set_page(2).is_err());
        assert!(store.visible().is_empty());
    }

    #[test]
    fn visible_slice_follows_current_page() {
        let mut store = store_of(12);
        assert_eq!(store.visible(), &[1, 2, 3, 4, 5]);
        store.set_page(3).expect("page 3 exists");
        assert_eq!(store.visible(), &[11, 12]);
    }

    #[test]
    fn set_collection_keeps_page_when_still_valid() {
        let mut store = store_of(12);
        store.set_page(2).expect("page 2 exists");
        store.set_collection((1..=11).collect());
        assert_eq!(store.current_page(), 2);
    }

    #[test]
    fn set_collection_clamps_page_past_the_end() {
        let mut store = store_of(12);
        store.set_page(3).expect("page 3 exists");
        store.set_collection((1..=6).collect());
        assert_eq!(store.current_page(), 2);
        store.set_collection(Vec::new());
        assert_eq!(store.current_page(), 1);
    }

    #[test]
    fn prev_and_next_stop_at_the_edges() {
        let mut store = store_of(7);
        assert!(store.prev_page().is_err());
        assert!(store.next_page().is_ok());
        assert!(store.next_page().is_err());
        assert_eq!(store.current_page(), 2);
    }
}
