//! Settings tab.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::AppState;
use crate::theme;
use crate::ui::helpers::panel;

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Settings", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let on_off = |on: bool| if on { "ON" } else { "OFF" };
    let url = if state.lofi.url.is_empty() {
        "(not set)".to_string()
    } else {
        state.lofi.url.clone()
    };

    let mut lines = vec![
        setting_line("o", "Confirm before delete", on_off(state.confirm_on)),
        setting_line("w", "Week window", &state.week_label()),
        setting_line("l", "Lofi player", on_off(state.lofi.enabled)),
        setting_line("u", "Lofi playlist URL", &url),
        Line::default(),
        Line::from(Span::styled(
            "  c  Clear all data (asks for confirmation when enabled)",
            theme::style_muted(),
        )),
    ];
    if !state.lofi.last_error.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("  {}", state.lofi.last_error),
            theme::style_error(),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn setting_line<'a>(key: &'a str, label: &'a str, value: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {key}  "), theme::style_accent()),
        Span::styled(format!("{label}: "), theme::style_default()),
        Span::styled(value.to_string(), theme::style_secondary()),
    ])
}
