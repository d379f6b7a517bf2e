//! Free-text search and faceted filtering over a catalog.
//!
//! Filtering is a full linear rescan: every predicate change recomputes the
//! visible subset from the whole catalog. Catalogs are expected to hold
//! hundreds to low thousands of rows, so no index is maintained.

use crate::record::{Catalog, Record, fields};
use std::collections::{BTreeMap, BTreeSet};

/// Fields consulted by the free-text search.
pub const SEARCH_FIELDS: [&str; 3] = [fields::TITLE, fields::AUTHOR, fields::TAGS];

/// Current search term plus the accepted values per facet field.
///
/// A field with no entry imposes no constraint. Entries are removed as soon as
/// their last value is unchecked, so an empty set is never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    search: String,
    facets: BTreeMap<String, BTreeSet<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Check or uncheck `value` for `field`.
    pub fn set_facet(&mut self, field: &str, value: &str, checked: bool) {
        if checked {
            self.facets
                .entry(field.to_string())
                .or_default()
                .insert(value.to_string());
            return;
        }

        if let Some(values) = self.facets.get_mut(field) {
            values.remove(value);
            if values.is_empty() {
                self.facets.remove(field);
            }
        }
    }

    /// Flip the checked state of `value` for `field`, returning the new state.
    pub fn toggle_facet(&mut self, field: &str, value: &str) -> bool {
        let checked = !self.is_selected(field, value);
        self.set_facet(field, value, checked);
        checked
    }

    pub fn is_selected(&self, field: &str, value: &str) -> bool {
        self.facets
            .get(field)
            .is_some_and(|values| values.contains(value))
    }

    /// Active facet constraints in field order.
    pub fn facets(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.facets
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(field, values)| (field.as_str(), values))
    }

    pub fn has_constraint(&self, field: &str) -> bool {
        self.facets.get(field).is_some_and(|v| !v.is_empty())
    }

    /// True when no search term and no facet would exclude anything.
    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty() && self.facets().next().is_none()
    }

    pub fn clear(&mut self) {
        self.search.clear();
        self.facets.clear();
    }

    /// Whether `record` passes both the search and every active facet.
    pub fn matches(&self, record: &Record) -> bool {
        self.matches_search(&self.search.to_lowercase(), record) && self.matches_facets(record)
    }

    fn matches_search(&self, needle: &str, record: &Record) -> bool {
        needle.is_empty()
            || SEARCH_FIELDS
                .iter()
                .any(|field| record.get(field).to_lowercase().contains(needle))
    }

    fn matches_facets(&self, record: &Record) -> bool {
        self.facets()
            .all(|(field, accepted)| accepted.contains(record.get(field)))
    }
}

/// Catalog positions of the records that pass `state`, in catalog order.
pub fn visible_indices(catalog: &Catalog, state: &FilterState) -> Vec<usize> {
    let needle = state.search.to_lowercase();
    catalog
        .iter()
        .enumerate()
        .filter(|(_, record)| state.matches_search(&needle, record) && state.matches_facets(record))
        .map(|(i, _)| i)
        .collect()
}

/// The order-preserving subsequence of `catalog` that passes `state`.
pub fn compute_visible<'a>(catalog: &'a Catalog, state: &FilterState) -> Vec<&'a Record> {
    visible_indices(catalog, state)
        .into_iter()
        .filter_map(|i| catalog.get(i))
        .collect()
}

/// Distinct values of one filterable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetGroup {
    pub field: String,
    /// Display heading, e.g. `Category` for `category`.
    pub label: String,
    /// Sorted distinct values across the whole catalog.
    pub values: Vec<String>,
}

/// Facet options for every configured field.
///
/// Computed once from the entire catalog; applying filters never changes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetVocabulary {
    groups: Vec<FacetGroup>,
}

impl FacetVocabulary {
    pub fn discover<S: AsRef<str>>(catalog: &Catalog, filter_fields: &[S]) -> Self {
        let groups = filter_fields
            .iter()
            .map(|field| {
                let field = field.as_ref();
                let values: BTreeSet<&str> = catalog.iter().map(|r| r.get(field)).collect();
                FacetGroup {
                    field: field.to_string(),
                    label: facet_label(field),
                    values: values.into_iter().map(str::to_string).collect(),
                }
            })
            .collect();
        Self { groups }
    }

    pub fn groups(&self) -> &[FacetGroup] {
        &self.groups
    }

    pub fn group(&self, field: &str) -> Option<&FacetGroup> {
        self.groups.iter().find(|g| g.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of selectable options across all groups.
    pub fn option_count(&self) -> usize {
        self.groups.iter().map(|g| g.values.len()).sum()
    }
}

fn facet_label(field: &str) -> String {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
