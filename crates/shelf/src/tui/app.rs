//! Application state and event loop

use super::image::ImageProtocol;
use super::ui;
use super::worker::{ImageRequest, ImageResponse, LoadEvent, spawn_image_worker, spawn_loader};
use crate::display::CardDisplay;
use anyhow::Result;
use arboard::Clipboard;
use crossterm::{
    cursor::SetCursorStyle,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        KeyModifiers, MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::debug;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Position, Rect},
    widgets::ListState,
};
use ratatui_image::{picker::Picker, protocol::StatefulProtocol};
use shelf_catalog::{
    CatalogStore, DetailPanel, LazyLoader, Record, ShelfConfig, Source, ViewOptions,
    present_detail, render_cards,
};
use std::collections::HashMap;
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Single-line editable text with a byte-offset cursor kept on char boundaries.
#[derive(Debug, Default)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.text.len())
    }

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        let start = self.prev_boundary();
        self.text.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        let end = self.next_boundary();
        self.text.drain(self.cursor..end);
    }

    /// Remove the word (and any whitespace after it) left of the cursor.
    pub fn delete_word(&mut self) {
        let head = &self.text[..self.cursor];
        let start = head
            .trim_end()
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        self.text.drain(start..self.cursor);
        self.cursor = start;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Apply an editing key. Returns true if the key was consumed.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        let alt = modifiers.contains(KeyModifiers::ALT) || modifiers.contains(KeyModifiers::SUPER);

        match code {
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('w') if ctrl => self.delete_word(),
            KeyCode::Backspace if alt => self.delete_word(),
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.text.len(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Char(c) if !ctrl && !alt => self.insert_char(c),
            _ => return false,
        }
        true
    }
}

/// Toast notification state
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
    pub is_error: bool,
}

impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(2),
            is_error: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(5),
            is_error: true,
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Catalog load progress
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading { started_at: Instant },
    Ready,
    Failed(String),
}

/// Pane receiving keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Filters,
    Results,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Filters,
            Focus::Filters => Focus::Results,
            Focus::Results => Focus::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Results,
            Focus::Filters => Focus::Search,
            Focus::Results => Focus::Filters,
        }
    }
}

/// Fetch state of one thumbnail
pub enum Thumbnail {
    Loading,
    Ready(Box<StatefulProtocol>),
    Failed,
}

/// Application state
pub struct App {
    pub config: ShelfConfig,
    pub source: Source,
    pub view_options: ViewOptions,
    pub load_state: LoadState,
    /// Present once the catalog has loaded
    pub store: Option<CatalogStore>,
    pub search_input: TextInput,
    pub focus: Focus,
    /// Results list selection + scroll
    pub list_state: ListState,
    /// Cards for the current visible subset, in order
    pub cards: Vec<CardDisplay>,
    /// Image reference of each card, parallel to `cards`
    pub card_images: Vec<String>,
    /// Index into the flattened facet options
    pub filter_cursor: usize,
    pub filter_list_state: ListState,
    pub detail: DetailPanel,
    /// Where the detail overlay was last drawn, for click hit-testing
    pub detail_area: Option<Rect>,
    /// Cards that fit in the results viewport, set on render
    pub results_rows: usize,
    pub thumbnails: HashMap<String, Thumbnail>,
    pub image_protocol: ImageProtocol,
    pub picker: Option<Picker>,
    pub toast: Option<Toast>,
    pub should_quit: bool,
    loader: LazyLoader<String>,
    load_rx: Receiver<LoadEvent>,
    image_tx: Sender<ImageRequest>,
    image_rx: Receiver<ImageResponse>,
    clipboard: Option<Clipboard>,
}

impl App {
    pub fn new(config: ShelfConfig) -> Self {
        let source = Source::parse(&config.source);
        let load_rx = spawn_loader(source.clone());

        let (image_tx, image_req_rx) = mpsc::channel::<ImageRequest>();
        let (image_resp_tx, image_rx) = mpsc::channel::<ImageResponse>();
        spawn_image_worker(image_req_rx, image_resp_tx);

        let image_protocol = ImageProtocol::detect();
        let picker = if image_protocol.is_supported() {
            Picker::from_query_stdio().ok()
        } else {
            None
        };

        Self {
            view_options: config.view_options(),
            config,
            source,
            load_state: LoadState::Loading {
                started_at: Instant::now(),
            },
            store: None,
            search_input: TextInput::new(),
            focus: Focus::Search,
            list_state: ListState::default(),
            cards: Vec::new(),
            card_images: Vec::new(),
            filter_cursor: 0,
            filter_list_state: ListState::default(),
            detail: DetailPanel::default(),
            detail_area: None,
            results_rows: 0,
            thumbnails: HashMap::new(),
            image_protocol,
            picker,
            toast: None,
            should_quit: false,
            loader: LazyLoader::new(),
            load_rx,
            image_tx,
            image_rx,
            clipboard: Clipboard::new().ok(),
        }
    }

    /// Poll for the catalog from the loader thread (non-blocking)
    fn poll_load(&mut self) {
        let Ok(event) = self.load_rx.try_recv() else {
            return;
        };
        match event {
            LoadEvent::Loaded(outcome) => {
                if outcome.dropped > 0 {
                    self.toast = Some(Toast::new(format!(
                        "{} malformed row(s) skipped",
                        outcome.dropped
                    )));
                }
                self.store = Some(CatalogStore::new(
                    outcome.records,
                    &self.config.filter_fields,
                ));
                self.load_state = LoadState::Ready;
                self.refresh_results();
            }
            LoadEvent::Failed(message) => self.load_state = LoadState::Failed(message),
        }
    }

    /// Rebuild cards after any filter change and re-arm lazy thumbnails.
    fn refresh_results(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let visible = store.visible();
        let rendered = render_cards(&visible, &self.view_options);

        self.cards = rendered.cards().iter().map(CardDisplay::from_card).collect();
        self.card_images = rendered
            .cards()
            .iter()
            .map(|c| c.thumbnail().source.clone())
            .collect();

        self.loader.clear_pending();
        rendered.register_thumbnails(&mut self.loader);

        self.list_state = ListState::default();
        if !self.cards.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    /// Resolve thumbnails of the cards currently in the viewport.
    fn observe_viewport(&mut self) {
        if self.picker.is_none() || self.cards.is_empty() {
            return;
        }
        let start = self.list_state.offset().min(self.card_images.len());
        let end = (start + self.results_rows.max(1)).min(self.card_images.len());

        for resolved in self.loader.observe(&self.card_images[start..end]) {
            let source = self.source.resolve(&resolved.source);
            debug!("thumbnail {} visible, requesting {source}", resolved.key);
            self.thumbnails.insert(resolved.key.clone(), Thumbnail::Loading);
            let _ = self.image_tx.send(ImageRequest {
                key: resolved.key,
                source,
            });
        }
    }

    /// Poll for decoded thumbnails (non-blocking)
    fn poll_images(&mut self) {
        while let Ok(resp) = self.image_rx.try_recv() {
            let thumb = match (resp.image, &self.picker) {
                (Some(img), Some(picker)) => {
                    Thumbnail::Ready(Box::new(picker.new_resize_protocol(img)))
                }
                _ => Thumbnail::Failed,
            };
            self.thumbnails.insert(resp.key, thumb);
        }
    }

    /// Clear expired toast
    fn update_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn selected_index(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.store.as_ref()?.select(self.list_state.selected()?)
    }

    pub fn selected_image(&self) -> Option<&str> {
        self.card_images
            .get(self.list_state.selected()?)
            .map(String::as_str)
    }

    /// `(field, value)` of every facet option, in display order.
    pub fn filter_options(&self) -> Vec<(&str, &str)> {
        let Some(store) = &self.store else {
            return Vec::new();
        };
        store
            .vocabulary()
            .groups()
            .iter()
            .flat_map(|g| g.values.iter().map(|v| (g.field.as_str(), v.as_str())))
            .collect()
    }

    fn move_selection(&mut self, delta: isize) {
        if self.cards.is_empty() {
            return;
        }
        let max = self.cards.len() - 1;
        let next = self.selected_index().saturating_add_signed(delta).min(max);
        self.list_state.select(Some(next));
    }

    fn move_filter_cursor(&mut self, delta: isize) {
        let count = self.filter_options().len();
        if count == 0 {
            return;
        }
        self.filter_cursor = self
            .filter_cursor
            .saturating_add_signed(delta)
            .min(count - 1);
    }

    fn toggle_filter(&mut self) {
        let Some((field, value)) = self
            .filter_options()
            .get(self.filter_cursor)
            .map(|(f, v)| (f.to_string(), v.to_string()))
        else {
            return;
        };
        if let Some(store) = &mut self.store {
            store.toggle_facet(&field, &value);
        }
        self.refresh_results();
    }

    fn sync_search(&mut self) {
        let Some(store) = &mut self.store else {
            return;
        };
        if store.filters().search() == self.search_input.text {
            return;
        }
        store.set_search(self.search_input.text.as_str());
        self.refresh_results();
    }

    fn reset_filters(&mut self) {
        self.search_input.clear();
        if let Some(store) = &mut self.store {
            store.reset();
        }
        self.refresh_results();
        self.toast = Some(Toast::new("Filters reset"));
    }

    fn open_detail(&mut self) {
        let Some(record) = self.selected_record() else {
            return;
        };
        let view = present_detail(record, &self.view_options);
        self.detail.open(view);
    }

    fn close_detail(&mut self) {
        self.detail.close();
        self.detail_area = None;
    }

    fn open_link(&mut self, primary: bool) {
        let Some(detail) = self.detail.current() else {
            return;
        };
        let link = if primary {
            &detail.primary
        } else {
            &detail.secondary
        };
        if link.url.is_empty() {
            self.toast = Some(Toast::error(format!("{}: no link", link.label)));
            return;
        }
        self.toast = Some(match open::that(&link.url) {
            Ok(()) => Toast::new("Opened in browser"),
            Err(e) => Toast::error(format!("Failed to open browser: {e}")),
        });
    }

    fn copy_download_url(&mut self) {
        let Some(url) = self.detail.current().map(|d| d.primary.url.clone()) else {
            return;
        };
        self.toast = Some(match self.clipboard.as_mut().map(|c| c.set_text(&url)) {
            Some(Ok(())) => Toast::new(format!("Copied: {url}")),
            Some(Err(_)) => Toast::error("Failed to copy to clipboard"),
            None => Toast::error("Clipboard not available"),
        });
    }

    fn handle_detail_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_detail(),
            KeyCode::Char('d') => self.open_link(true),
            KeyCode::Char('a') => self.open_link(false),
            KeyCode::Char('y') => self.copy_download_url(),
            _ => {}
        }
    }

    /// Handle input event
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
                    self.should_quit = true;
                    return;
                }
                if self.detail.is_open() {
                    self.handle_detail_key(key.code);
                    return;
                }
                if !matches!(self.load_state, LoadState::Ready) {
                    if key.code == KeyCode::Esc {
                        self.should_quit = true;
                    }
                    return;
                }

                match (key.code, key.modifiers) {
                    (KeyCode::Esc, _) => self.should_quit = true,
                    (KeyCode::Tab, _) => self.focus = self.focus.next(),
                    (KeyCode::BackTab, _) => self.focus = self.focus.prev(),
                    (KeyCode::Char('r'), KeyModifiers::CONTROL) => self.reset_filters(),
                    _ => self.handle_focused_key(key.code, key.modifiers),
                }
            }
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) if self.detail.is_open() => {
                    let inside = self
                        .detail_area
                        .is_some_and(|area| area.contains(Position::new(mouse.column, mouse.row)));
                    if self.detail.dismiss_on_click(inside) {
                        self.detail_area = None;
                    }
                }
                MouseEventKind::ScrollDown if !self.detail.is_open() => self.move_selection(1),
                MouseEventKind::ScrollUp if !self.detail.is_open() => self.move_selection(-1),
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_focused_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match self.focus {
            Focus::Search => match code {
                KeyCode::Enter | KeyCode::Down => self.focus = Focus::Results,
                _ => {
                    if self.search_input.handle_key(code, modifiers) {
                        self.sync_search();
                    }
                }
            },
            Focus::Filters => match code {
                KeyCode::Up | KeyCode::Char('k') => self.move_filter_cursor(-1),
                KeyCode::Down | KeyCode::Char('j') => self.move_filter_cursor(1),
                KeyCode::Char(' ') | KeyCode::Enter => self.toggle_filter(),
                _ => {}
            },
            Focus::Results => match code {
                KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
                KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
                KeyCode::PageUp => self.move_selection(-(self.results_rows.max(1) as isize)),
                KeyCode::PageDown => self.move_selection(self.results_rows.max(1) as isize),
                KeyCode::Home => self.move_selection(isize::MIN),
                KeyCode::End => self.move_selection(isize::MAX),
                KeyCode::Enter => self.open_detail(),
                _ => {}
            },
        }
    }
}

/// Run the interactive browser until the user quits.
pub fn run(config: ShelfConfig) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetCursorStyle::BlinkingBar
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        SetCursorStyle::DefaultUserShape
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    const FRAME_TIME: Duration = Duration::from_millis(16);

    loop {
        while event::poll(Duration::from_millis(0))? {
            app.handle_event(event::read()?);
            if app.should_quit {
                return Ok(());
            }
        }

        app.update_toast();
        app.poll_load();
        app.poll_images();

        terminal.draw(|f| ui::render(f, app))?;

        // Viewport is known only after layout, so lazy loading runs post-draw.
        app.observe_viewport();

        if event::poll(FRAME_TIME)? {
            app.handle_event(event::read()?);
        }
        if app.should_quit {
            return Ok(());
        }
    }
}
