//! Neon palette and semantic styling for the browser panels.

use ratatui::style::{Color, Modifier, Style};

use azbrowse_core::ItemType;

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Normal list row text.
pub fn list_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected list row.
pub fn list_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

/// Content panel body (JSON).
pub fn content_text() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Status bar text.
pub fn status_bar() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Section heading inside overlays.
pub fn section_heading() -> Style {
    Style::default().fg(NEON_CYAN)
}

// ── Node Styles ───────────────────────────────────────────────────────

/// Glyph prefixed to list rows by item type.
pub fn item_glyph(item_type: ItemType) -> &'static str {
    match item_type {
        ItemType::Subscription => "◆",
        ItemType::ResourceGroup => "▣",
        ItemType::Resource => "●",
        ItemType::Deployment => "◇",
        ItemType::Action => "▶",
        ItemType::Other => "·",
    }
}

/// Glyph color by item type.
pub fn item_color(item_type: ItemType) -> Color {
    match item_type {
        ItemType::Subscription => ELECTRIC_PURPLE,
        ItemType::ResourceGroup => LIGHT_BLUE,
        ItemType::Resource => NEON_CYAN,
        ItemType::Deployment => ELECTRIC_YELLOW,
        ItemType::Action => CORAL,
        ItemType::Other => DIM_WHITE,
    }
}
