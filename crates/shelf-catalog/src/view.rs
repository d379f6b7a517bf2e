//! Display models for cards and the detail view.
//!
//! These are plain values. The binary decides how they reach the screen
//! (colored CLI lines or ratatui widgets); nothing here touches a terminal.

use crate::config::ShelfConfig;
use crate::lazy::LazyLoader;
use crate::record::Record;

/// Shown instead of cards when nothing passes the filters.
pub const NO_RESULTS_MESSAGE: &str = "No items match your criteria.";
pub const DEFAULT_PLACEHOLDER: &str = "placeholder.jpg";
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive.org/details/{id}";

pub const DOWNLOAD_LABEL: &str = "Download / View File";
pub const ARCHIVE_LABEL: &str = "View on Archive.org";

/// Presentation settings shared by the card and detail projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Image reference used for cards whose thumbnail field is empty.
    pub placeholder: String,
    /// Archive lookup template; `{id}` is replaced by the record id.
    pub archive_url: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
        }
    }
}

impl From<&ShelfConfig> for ViewOptions {
    fn from(config: &ShelfConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            archive_url: config.archive_url.clone(),
        }
    }
}

/// A deferred image: where it comes from and whether it is the stand-in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub source: String,
    pub is_placeholder: bool,
}

impl ImageRef {
    fn for_card(record: &Record, options: &ViewOptions) -> Self {
        let thumbnail = record.thumbnail_url();
        if thumbnail.is_empty() {
            Self {
                source: options.placeholder.clone(),
                is_placeholder: true,
            }
        } else {
            Self {
                source: thumbnail.to_string(),
                is_placeholder: false,
            }
        }
    }
}

/// One result card. Selecting it hands back the full record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView<'a> {
    record: &'a Record,
    thumbnail: ImageRef,
}

impl<'a> CardView<'a> {
    pub fn id(&self) -> &'a str {
        self.record.id()
    }

    pub fn title(&self) -> &'a str {
        self.record.title()
    }

    pub fn author(&self) -> &'a str {
        self.record.author()
    }

    /// Alternative text for the thumbnail.
    pub fn alt(&self) -> &'a str {
        self.record.title()
    }

    pub fn thumbnail(&self) -> &ImageRef {
        &self.thumbnail
    }

    /// The record behind this card, for the detail view.
    pub fn select(&self) -> &'a Record {
        self.record
    }
}

/// Rendered result area: either cards in order or a single placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedList<'a> {
    Cards(Vec<CardView<'a>>),
    NoResults { message: &'static str },
}

impl<'a> RenderedList<'a> {
    /// Number of display units, which is never zero.
    pub fn unit_count(&self) -> usize {
        match self {
            RenderedList::Cards(cards) => cards.len(),
            RenderedList::NoResults { .. } => 1,
        }
    }

    pub fn cards(&self) -> &[CardView<'a>] {
        match self {
            RenderedList::Cards(cards) => cards,
            RenderedList::NoResults { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RenderedList::NoResults { .. })
    }

    /// Register every card thumbnail with `loader`, keyed by image source.
    pub fn register_thumbnails(&self, loader: &mut LazyLoader<String>) {
        for card in self.cards() {
            let source = &card.thumbnail.source;
            loader.register(source.clone(), source.clone());
        }
    }
}

/// Project a record subsequence into cards, preserving order.
pub fn render_cards<'a>(records: &[&'a Record], options: &ViewOptions) -> RenderedList<'a> {
    if records.is_empty() {
        return RenderedList::NoResults {
            message: NO_RESULTS_MESSAGE,
        };
    }

    RenderedList::Cards(
        records
            .iter()
            .map(|&record| CardView {
                record,
                thumbnail: ImageRef::for_card(record, options),
            })
            .collect(),
    )
}

/// An outbound link with its button label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAction {
    pub label: &'static str,
    pub url: String,
}

/// Expanded view of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub id: String,
    /// Full-size image; the raw thumbnail field, empty when the record has none.
    pub image: String,
    pub title: String,
    pub author: String,
    pub year: String,
    pub tags: Vec<String>,
    pub description: String,
    pub primary: LinkAction,
    pub secondary: LinkAction,
}

impl DetailView {
    /// `By <author> (<year>)`.
    pub fn byline(&self) -> String {
        format!("By {} ({})", self.author, self.year)
    }
}

pub fn present_detail(record: &Record, options: &ViewOptions) -> DetailView {
    DetailView {
        id: record.id().to_string(),
        image: record.thumbnail_url().to_string(),
        title: record.title().to_string(),
        author: record.author().to_string(),
        year: record.year().to_string(),
        tags: record.tag_list().into_iter().map(str::to_string).collect(),
        description: record.description().to_string(),
        primary: LinkAction {
            label: DOWNLOAD_LABEL,
            url: record.download_url().to_string(),
        },
        secondary: LinkAction {
            label: ARCHIVE_LABEL,
            url: archive_url(&options.archive_url, record.id()),
        },
    }
}

/// Fill the `{id}` slot of an archive lookup template.
pub fn archive_url(template: &str, id: &str) -> String {
    template.replace("{id}", &urlencoding::encode(id))
}

/// Shown/hidden state of the detail view.
#[derive(Debug, Clone, Default)]
pub struct DetailPanel {
    current: Option<DetailView>,
}

impl DetailPanel {
    pub fn open(&mut self, view: DetailView) {
        self.current = Some(view);
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&DetailView> {
        self.current.as_ref()
    }

    /// React to a pointer interaction; only clicks outside the panel close it.
    /// Returns whether the panel was closed.
    pub fn dismiss_on_click(&mut self, inside: bool) -> bool {
        if inside || !self.is_open() {
            return false;
        }
        self.close();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha() -> Record {
        [
            ("id", "alpha_01"),
            ("title", "Alpha"),
            ("author", "Jane Doe"),
            ("year", "2001"),
            ("tags", "fantasy, adventure"),
            ("description", "A tale"),
            ("thumbnail_url", ""),
            ("download_url", "http://x"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_empty_subsequence_renders_one_placeholder() {
        let rendered = render_cards(&[], &ViewOptions::default());
        assert_eq!(rendered.unit_count(), 1);
        assert!(rendered.cards().is_empty());
        assert_eq!(
            rendered,
            RenderedList::NoResults {
                message: NO_RESULTS_MESSAGE
            }
        );
    }

    #[test]
    fn test_cards_preserve_order_and_select_record() {
        let a = alpha();
        let b: Record = [("id", "b"), ("title", "Beta"), ("thumbnail_url", "b.png")]
            .into_iter()
            .collect();
        let rendered = render_cards(&[&b, &a], &ViewOptions::default());

        let cards = rendered.cards();
        assert_eq!(rendered.unit_count(), 2);
        assert_eq!(cards[0].title(), "Beta");
        assert_eq!(cards[1].title(), "Alpha");
        assert_eq!(cards[1].select(), &a);
        assert_eq!(cards[1].alt(), "Alpha");
    }

    #[test]
    fn test_empty_thumbnail_uses_placeholder() {
        let a = alpha();
        let options = ViewOptions {
            placeholder: "blank.png".to_string(),
            ..ViewOptions::default()
        };
        let rendered = render_cards(&[&a], &options);
        let thumb = rendered.cards()[0].thumbnail();
        assert_eq!(thumb.source, "blank.png");
        assert!(thumb.is_placeholder);
    }

    #[test]
    fn test_register_thumbnails() {
        let a = alpha();
        let b: Record = [("thumbnail_url", "b.png")].into_iter().collect();
        let rendered = render_cards(&[&a, &b], &ViewOptions::default());

        let mut loader = LazyLoader::new();
        rendered.register_thumbnails(&mut loader);
        assert_eq!(loader.pending_len(), 2);
        assert!(loader.is_pending(&DEFAULT_PLACEHOLDER.to_string()));
        assert!(loader.is_pending(&"b.png".to_string()));
    }

    #[test]
    fn test_present_detail() {
        let detail = present_detail(&alpha(), &ViewOptions::default());

        assert_eq!(detail.title, "Alpha");
        assert_eq!(detail.byline(), "By Jane Doe (2001)");
        assert_eq!(detail.tags, vec!["fantasy", "adventure"]);
        assert_eq!(detail.image, "");
        assert_eq!(detail.primary.label, "Download / View File");
        assert_eq!(detail.primary.url, "http://x");
        assert_eq!(detail.secondary.label, "View on Archive.org");
        assert_eq!(
            detail.secondary.url,
            "https://archive.org/details/alpha_01"
        );
    }

    #[test]
    fn test_archive_url_encodes_id() {
        assert_eq!(
            archive_url("https://example.org/item/{id}?ref=shelf", "a b/c"),
            "https://example.org/item/a%20b%2Fc?ref=shelf"
        );
    }

    #[test]
    fn test_detail_panel_dismissal() {
        let mut panel = DetailPanel::default();
        assert!(!panel.dismiss_on_click(false));

        panel.open(present_detail(&alpha(), &ViewOptions::default()));
        assert!(panel.is_open());
        assert!(!panel.dismiss_on_click(true));
        assert!(panel.is_open());
        assert!(panel.dismiss_on_click(false));
        assert!(!panel.is_open());

        panel.open(present_detail(&alpha(), &ViewOptions::default()));
        panel.close();
        assert!(panel.current().is_none());
    }
}
