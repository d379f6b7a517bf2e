//! # shelf-catalog
//!
//! Everything `shelf` knows about a catalog that does not involve a terminal:
//! parsing the delimited source, holding the filter state, computing the
//! visible subset, and projecting records into display models.
//!
//! ```text
//! raw text ──parse_records──▶ Catalog ──CatalogStore──▶ visible records
//!                                            │                 │
//!                                            ▼                 ▼
//!                                      FacetVocabulary    render_cards / present_detail
//! ```
//!
//! The output side (CLI printer, terminal UI) lives in the `shelf` binary and
//! only consumes the display models defined here.

pub mod config;
pub mod filter;
pub mod lazy;
pub mod parser;
pub mod record;
pub mod source;
pub mod store;
pub mod view;

pub use config::{ConfigError, ShelfConfig};
pub use filter::{
    FacetGroup, FacetVocabulary, FilterState, SEARCH_FIELDS, compute_visible, visible_indices,
};
pub use lazy::{LazyLoader, Resolved};
pub use parser::{ParseOutcome, parse_records};
pub use record::{Catalog, Record, fields};
pub use source::{LOAD_FAILURE_MESSAGE, LoadError, Source, load_bytes, load_catalog, load_text};
pub use store::CatalogStore;
pub use view::{
    CardView, DetailPanel, DetailView, ImageRef, LinkAction, NO_RESULTS_MESSAGE, RenderedList,
    ViewOptions, present_detail, render_cards,
};
