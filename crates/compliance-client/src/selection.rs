//! Dual selection store for user documents and regulatory documents.
//!
//! Holds two independent sets of selected filenames plus the listings they
//! are drawn from. Every selected filename must exist in its listing; the
//! store prunes selections whenever a listing refresh or a delete removes
//! the underlying document, so no dangling references survive. Nothing
//! outside this module mutates a selection set.

use std::collections::BTreeSet;

/// Which of the two document listings a selection belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Documents,
    Regulatory,
}

/// Derived checkbox state for a category's "select all" control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionStatus {
    pub checked: bool,
    pub indeterminate: bool,
}

#[derive(Debug, Clone, Default)]
struct CategoryState {
    listing: Vec<String>,
    selected: BTreeSet<String>,
}

/// Owns the two selection sets and their listings
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    documents: CategoryState,
    regulatory: CategoryState,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self, category: Category) -> &CategoryState {
        match category {
            Category::Documents => &self.documents,
            Category::Regulatory => &self.regulatory,
        }
    }

    fn state_mut(&mut self, category: Category) -> &mut CategoryState {
        match category {
            Category::Documents => &mut self.documents,
            Category::Regulatory => &mut self.regulatory,
        }
    }

    /// Replace a category's listing (after a refresh from the backend),
    /// pruning any selection that no longer exists.
    pub fn set_listing<I, S>(&mut self, category: Category, filenames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let state = self.state_mut(category);
        state.listing = filenames.into_iter().map(Into::into).collect();
        let listed: BTreeSet<&String> = state.listing.iter().collect();
        state.selected.retain(|f| listed.contains(f));
    }

    /// Flip membership of `filename` in the selection. No-op when the
    /// filename is not in the current listing, so an orphan id can never
    /// enter the set.
    pub fn toggle(&mut self, category: Category, filename: &str) {
        let state = self.state_mut(category);
        if !state.listing.iter().any(|f| f == filename) {
            return;
        }
        if !state.selected.remove(filename) {
            state.selected.insert(filename.to_string());
        }
    }

    /// Select every listed filename, or clear the selection. Snapshots the
    /// live listing; callers re-apply after a listing refresh rather than
    /// relying on a cached "all".
    pub fn select_all(&mut self, category: Category, checked: bool) {
        let state = self.state_mut(category);
        if checked {
            state.selected = state.listing.iter().cloned().collect();
        } else {
            state.selected.clear();
        }
    }

    /// Remove one document entirely (external delete): out of the listing
    /// and out of the selection.
    pub fn remove_document(&mut self, category: Category, filename: &str) {
        let state = self.state_mut(category);
        state.listing.retain(|f| f != filename);
        state.selected.remove(filename);
    }

    /// Derived select-all status, recomputed on every call
    pub fn status(&self, category: Category) -> SelectionStatus {
        let state = self.state(category);
        let total = state.listing.len();
        let selected = state.selected.len();
        SelectionStatus {
            checked: total > 0 && selected == total,
            indeterminate: selected > 0 && selected < total,
        }
    }

    pub fn is_selected(&self, category: Category, filename: &str) -> bool {
        self.state(category).selected.contains(filename)
    }

    pub fn selected_count(&self, category: Category) -> usize {
        self.state(category).selected.len()
    }

    pub fn listing_len(&self, category: Category) -> usize {
        self.state(category).listing.len()
    }

    pub fn listing(&self, category: Category) -> &[String] {
        &self.state(category).listing
    }

    /// Snapshot of the selection in listing order (stable for requests)
    pub fn selected(&self, category: Category) -> Vec<String> {
        let state = self.state(category);
        state
            .listing
            .iter()
            .filter(|f| state.selected.contains(*f))
            .cloned()
            .collect()
    }
}
