//! Owning application state for one browsing session.

use crate::filter::{FacetVocabulary, FilterState, visible_indices};
use crate::record::{Catalog, Record};
use log::trace;

/// The catalog, its filter state, and the derived visible subset.
///
/// All interaction goes through `&mut self` methods; each mutation rescans the
/// catalog so `visible()` always reflects the current filters.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog: Catalog,
    filters: FilterState,
    vocabulary: FacetVocabulary,
    visible: Vec<usize>,
}

impl CatalogStore {
    /// Build a store and discover the facet vocabulary for `filter_fields`.
    pub fn new<S: AsRef<str>>(catalog: Catalog, filter_fields: &[S]) -> Self {
        let vocabulary = FacetVocabulary::discover(&catalog, filter_fields);
        let visible = (0..catalog.len()).collect();
        Self {
            catalog,
            filters: FilterState::new(),
            vocabulary,
            visible,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn vocabulary(&self) -> &FacetVocabulary {
        &self.vocabulary
    }

    /// Records passing the current filters, in catalog order.
    pub fn visible(&self) -> Vec<&Record> {
        self.visible
            .iter()
            .filter_map(|&i| self.catalog.get(i))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// The record shown at `position` in the visible list.
    pub fn select(&self, position: usize) -> Option<&Record> {
        self.visible
            .get(position)
            .and_then(|&i| self.catalog.get(i))
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term == self.filters.search() {
            return;
        }
        self.filters.set_search(term);
        self.recompute();
    }

    pub fn set_facet(&mut self, field: &str, value: &str, checked: bool) {
        self.filters.set_facet(field, value, checked);
        self.recompute();
    }

    /// Flip one checkbox; returns whether it is now checked.
    pub fn toggle_facet(&mut self, field: &str, value: &str) -> bool {
        let checked = self.filters.toggle_facet(field, value);
        self.recompute();
        checked
    }

    /// Replace the whole filter state at once.
    pub fn apply(&mut self, filters: FilterState) {
        self.filters = filters;
        self.recompute();
    }

    /// Clear the search term and every facet selection.
    pub fn reset(&mut self) {
        self.filters.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.visible = visible_indices(&self.catalog, &self.filters);
        trace!(
            "filters changed: {} of {} records visible",
            self.visible.len(),
            self.catalog.len()
        );
    }
}
