//! The browser's panels: resource list, JSON content, status bar and the
//! help overlay. Pure rendering from borrowed state.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
};

use azbrowse_core::ResourceNode;

use crate::action::{Notification, NotificationLevel};
use crate::theme;
use crate::widgets::redact::maybe_redact;

/// Borrowed state for [`render_list`].
pub struct ListView<'a> {
    pub title: &'a str,
    pub nodes: &'a [ResourceNode],
    pub selected: usize,
    pub focused: bool,
    pub demo: bool,
}

/// Resource list with the breadcrumb title.
pub fn render_list(frame: &mut Frame, area: Rect, view: &ListView<'_>) {
    let border = if view.focused {
        theme::border_focused()
    } else {
        theme::border_default()
    };
    let block = Block::default()
        .title(format!(" {} ", view.title))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border);

    if view.nodes.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  (nothing here)",
            theme::key_hint(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = view
        .nodes
        .iter()
        .map(|node| {
            let label = if node.display.is_empty() {
                &node.name
            } else {
                &node.display
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{} ", theme::item_glyph(node.item_type)),
                    Style::default().fg(theme::item_color(node.item_type)),
                ),
                Span::styled(maybe_redact(label, view.demo).into_owned(), theme::list_row()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::list_selected())
        .highlight_symbol("▸ ");

    let mut state = ListState::default().with_selected(Some(view.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Borrowed state for [`render_content`].
pub struct ContentView<'a> {
    pub heading: &'a str,
    pub content: &'a str,
    pub scroll: u16,
    pub demo: bool,
}

/// Raw JSON of the expanded (or selected) node.
pub fn render_content(frame: &mut Frame, area: Rect, view: &ContentView<'_>) {
    let block = Block::default()
        .title(format!(" {} ", maybe_redact(view.heading, view.demo)))
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_default());

    let body = maybe_redact(view.content, view.demo).into_owned();
    let paragraph = Paragraph::new(body)
        .style(theme::content_text())
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((view.scroll, 0));
    frame.render_widget(paragraph, area);
}

/// Borrowed state for [`render_status`].
pub struct StatusView<'a> {
    pub busy: bool,
    pub depth: usize,
    pub navigating: bool,
    pub notification: Option<&'a Notification>,
}

/// One-line status bar: activity, notification and key hints.
pub fn render_status(frame: &mut Frame, area: Rect, view: &StatusView<'_>) {
    let mut spans = vec![Span::raw(" ")];

    if view.busy {
        spans.push(Span::styled(
            "◐ loading",
            Style::default().fg(theme::ELECTRIC_YELLOW),
        ));
    } else {
        spans.push(Span::styled(
            "● ready",
            Style::default().fg(theme::SUCCESS_GREEN),
        ));
    }
    if view.navigating {
        spans.push(Span::styled(" ⇢ auto", Style::default().fg(theme::CORAL)));
    }
    spans.push(Span::styled(format!("  depth {}", view.depth), theme::status_bar()));

    if let Some(note) = view.notification {
        let color = match note.level {
            NotificationLevel::Info => theme::LIGHT_BLUE,
            NotificationLevel::Success => theme::SUCCESS_GREEN,
            NotificationLevel::Error => theme::ERROR_RED,
        };
        spans.push(Span::styled(" │ ", theme::key_hint()));
        spans.push(Span::styled(note.message.clone(), Style::default().fg(color)));
    }

    spans.push(Span::styled(
        " │ ⏎ expand  ⌫ back  r refresh  ? help  q quit",
        theme::key_hint(),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn key_line(key: &'static str, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
        Span::styled(description, theme::key_hint()),
    ])
}

/// Keyboard shortcuts, centered over `area`.
pub fn render_help(frame: &mut Frame, area: Rect) {
    let help_width = 54u16.min(area.width.saturating_sub(4));
    let help_height = 20u16.min(area.height.saturating_sub(2));

    let x = area.width.saturating_sub(help_width) / 2;
    let y = area.height.saturating_sub(help_height) / 2;
    let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(
        Block::default().style(Style::default().bg(theme::BG_DARK)),
        help_area,
    );

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused());

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled("  Tree", theme::section_heading())),
        Line::from(Span::styled("  ────", theme::key_hint())),
        key_line("j/k ↑/↓", "Move selection"),
        key_line("g/G", "First / last"),
        key_line("PgUp/PgDn", "Page up / down"),
        key_line("Enter l →", "Expand selected node"),
        key_line("Bksp h ←", "Back to previous list"),
        key_line("r", "Refresh current node"),
        Line::from(""),
        Line::from(Span::styled("  Content", theme::section_heading())),
        Line::from(Span::styled("  ───────", theme::key_hint())),
        key_line("J/K", "Scroll content"),
        key_line("f Ctrl+f", "Toggle fullscreen"),
        Line::from(""),
        key_line("?", "Toggle this help"),
        key_line("q Ctrl+c", "Quit"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
