//! Header, tab bar, and footer.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::{AppState, Tab};
use crate::theme;

pub fn draw_header(frame: &mut Frame, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" cram ", theme::style_title()),
        Span::styled("· semester tracker", theme::style_secondary()),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

pub fn draw_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in Tab::visible(state.lofi.enabled).into_iter().enumerate() {
        let label = format!("{} {}", i + 1, tab.title());
        let style = if tab == state.active_tab {
            theme::style_accent()
        } else {
            theme::style_secondary()
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw("  "));
    }

    let week = state.week_label();
    let tabs_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let pad = (area.width as usize)
        .saturating_sub(tabs_width + week.chars().count() + 1);
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(week, theme::style_secondary()));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

pub fn draw_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let hints = match state.active_tab {
        Tab::Dashboard => "j/k scroll  ←/→ week  1-6 tabs  q quit",
        Tab::Exams => "a add exam  s add subject  e edit  d delete  Tab focus  j/k move",
        Tab::Todos => "a/n add  e edit  d delete  Space toggle  j/k move",
        Tab::Projects => "a add  e edit  d delete  j/k move",
        Tab::Settings => "o confirm  w week span  l lofi  u playlist URL  c clear all",
        Tab::Lofi => "Enter play  Space pause  n next  b prev  x stop  u URL",
    };

    let mut spans = vec![Span::styled(format!(" {hints}"), theme::style_muted())];
    if !state.save_error.is_empty() {
        let pad = (area.width as usize)
            .saturating_sub(hints.chars().count() + state.save_error.chars().count() + 2);
        spans.push(Span::raw(" ".repeat(pad)));
        spans.push(Span::styled(state.save_error.clone(), theme::style_error()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(theme::C_SELECTION_BG)),
        area,
    );
}
