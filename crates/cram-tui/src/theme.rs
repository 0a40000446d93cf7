//! Color palette and style constants for the cram TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(16, 18, 16);
pub const C_ACCENT: Color = Color::Rgb(120, 220, 130);
pub const C_PRIMARY: Color = Color::Rgb(208, 214, 205);
pub const C_SECONDARY: Color = Color::Rgb(118, 128, 116);
pub const C_MUTED: Color = Color::Rgb(74, 82, 72);
pub const C_SELECTION_BG: Color = Color::Rgb(30, 38, 30);
pub const C_PANEL_BORDER: Color = Color::Rgb(44, 52, 44);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(120, 220, 130);
pub const C_ERROR: Color = Color::Rgb(235, 100, 95);
pub const C_WARNING: Color = Color::Rgb(235, 190, 90);
pub const C_PLAYING: Color = Color::Rgb(120, 220, 130);
pub const C_DONE: Color = Color::Rgb(100, 160, 110);
pub const C_DUE: Color = Color::Rgb(190, 150, 240);

// ── Predefined styles ─────────────────────────────────────────────────────────

pub fn style_default() -> Style {
    Style::default().fg(C_PRIMARY)
}

pub fn style_secondary() -> Style {
    Style::default().fg(C_SECONDARY)
}

pub fn style_accent() -> Style {
    Style::default().fg(C_ACCENT)
}

pub fn style_muted() -> Style {
    Style::default().fg(C_MUTED)
}

pub fn style_error() -> Style {
    Style::default().fg(C_ERROR)
}

pub fn style_selected() -> Style {
    Style::default().bg(C_SELECTION_BG).fg(C_PRIMARY)
}

pub fn style_selected_focused() -> Style {
    Style::default()
        .bg(C_SELECTION_BG)
        .fg(C_PRIMARY)
        .add_modifier(Modifier::BOLD)
}

pub fn style_focused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER_FOCUSED)
}

pub fn style_unfocused_border() -> Style {
    Style::default().fg(C_PANEL_BORDER)
}

pub fn style_title() -> Style {
    Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD)
}
