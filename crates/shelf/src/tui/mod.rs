//! Interactive catalog browser
//!
//! Architecture:
//! - Main thread: rendering, input, filter state (`CatalogStore`)
//! - Loader thread: fetches and parses the catalog once, reports a `LoadEvent`
//! - Image worker: fetches and decodes thumbnails as cards scroll into view
//!
//! Layout:
//! ```text
//! ┌──────────────┬──────────────────────────────┬──────────────────┐
//! │ Filters      │ ▌ Alpha                      │  [thumbnail]     │
//! │ Category     │ ▌    Jane Doe · alpha_01     │                  │
//! │ [x] Fiction  │   Beta                       │ Alpha            │
//! │ [ ] Science  │      John Roe · beta_02      │ Author  Jane Doe │
//! │              │  2 of 5 items · filtered     │ Year    2001     │
//! │ Type         │  focus:results [↑↓ select]   │                  │
//! │ [ ] Book     │  [Filters reset]             │                  │
//! │              │ ▌ search                     │                  │
//! └──────────────┴──────────────────────────────┴──────────────────┘
//! ```
//! Enter on a card opens the detail overlay on top of all panes.

mod app;
mod image;
mod ui;
mod worker;

pub use app::run;
