//! Text projections of cards and details, shared between the CLI and the TUI.

use colored::Colorize;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use shelf_catalog::{CardView, DetailView};

/// Formatted display of one result card.
pub struct CardDisplay {
    pub title: String,
    /// `(text, is_dimmed)` pieces of the second line.
    pub line2_parts: Vec<(String, bool)>,
}

impl CardDisplay {
    pub fn from_card(card: &CardView<'_>) -> Self {
        let mut line2_parts = Vec::new();
        if !card.author().is_empty() {
            line2_parts.push((card.author().to_string(), false));
        }
        if !card.id().is_empty() {
            if !line2_parts.is_empty() {
                line2_parts.push((" · ".to_string(), true));
            }
            line2_parts.push((card.id().to_string(), true));
        }

        Self {
            title: card.title().to_string(),
            line2_parts,
        }
    }

    /// Render to CLI output using colored crate
    pub fn to_cli_lines(&self) -> Vec<String> {
        let line2: String = self
            .line2_parts
            .iter()
            .map(|(text, dimmed)| {
                if *dimmed {
                    text.dimmed().to_string()
                } else {
                    text.clone()
                }
            })
            .collect();

        let mut lines = vec![self.title.bold().to_string()];
        if !line2.is_empty() {
            lines.push(format!("  {line2}"));
        }
        lines
    }

    /// Render to ratatui lines; the selected card gets a red bar and a lifted background.
    pub fn to_tui_lines(
        &self,
        is_selected: bool,
        base_style: Style,
        prefix_style: Style,
    ) -> Vec<Line<'static>> {
        let prefix = if is_selected { "▌" } else { " " };

        let title_style = if is_selected {
            base_style.fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            base_style.fg(Color::White)
        };

        let line1 = Line::from(vec![
            Span::styled(prefix.to_string(), prefix_style),
            Span::styled(" ".to_string(), base_style),
            Span::styled(self.title.clone(), title_style),
        ]);

        let mut line2_spans = vec![
            Span::styled(prefix.to_string(), prefix_style),
            Span::styled("   ".to_string(), base_style),
        ];
        for (text, dimmed) in &self.line2_parts {
            let style = if *dimmed {
                base_style.fg(Color::DarkGray)
            } else {
                base_style.fg(Color::Gray)
            };
            line2_spans.push(Span::styled(text.clone(), style));
        }

        vec![line1, Line::from(line2_spans)]
    }
}

/// Formatted display of the expanded view of one record.
pub struct DetailDisplay<'a> {
    detail: &'a DetailView,
}

impl<'a> DetailDisplay<'a> {
    pub fn new(detail: &'a DetailView) -> Self {
        Self { detail }
    }

    fn tag_chips(&self) -> Vec<String> {
        self.detail.tags.iter().map(|t| format!("[{t}]")).collect()
    }

    pub fn to_cli_lines(&self) -> Vec<String> {
        let d = self.detail;
        let mut lines = vec![d.title.bold().to_string(), d.byline().dimmed().to_string()];

        if !d.tags.is_empty() {
            lines.push(self.tag_chips().join(" ").cyan().to_string());
        }
        if !d.description.is_empty() {
            lines.push(String::new());
            lines.push(d.description.clone());
        }

        lines.push(String::new());
        for link in [&d.primary, &d.secondary] {
            lines.push(format!("{} {}", format!("{}:", link.label).dimmed(), link.url));
        }
        if !d.image.is_empty() {
            lines.push(format!("{} {}", "Image:".dimmed(), d.image));
        }
        lines
    }

    /// Lines for the detail overlay, wrapping the description to `width` columns.
    pub fn to_tui_lines(&self, width: usize) -> Vec<Line<'static>> {
        let d = self.detail;
        let label = Style::default().fg(Color::DarkGray);
        let key = Style::default().fg(Color::Yellow);

        let mut lines = vec![
            Line::from(Span::styled(
                d.title.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(d.byline(), label)),
        ];

        if !d.tags.is_empty() {
            let mut spans = Vec::new();
            for chip in self.tag_chips() {
                if !spans.is_empty() {
                    spans.push(Span::raw(" "));
                }
                spans.push(Span::styled(chip, Style::default().fg(Color::Cyan)));
            }
            lines.push(Line::from(spans));
        }

        if !d.description.is_empty() {
            lines.push(Line::default());
            for chunk in wrap_text(&d.description, width) {
                lines.push(Line::from(Span::styled(
                    chunk,
                    Style::default().fg(Color::White),
                )));
            }
        }

        lines.push(Line::default());
        for (hotkey, link) in [("d", &d.primary), ("a", &d.secondary)] {
            lines.push(Line::from(vec![
                Span::styled(format!("[{hotkey}] "), key),
                Span::styled(link.label, Style::default().fg(Color::White)),
            ]));
            lines.push(Line::from(Span::styled(format!("    {}", link.url), label)));
        }
        lines
    }
}

/// Greedy word wrap measured in terminal columns.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    use unicode_width::UnicodeWidthStr;

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.width() + 1 + word.width() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}
