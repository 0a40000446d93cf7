//! Todos tab — the full checklist for the active window.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::projection;
use crate::state::AppState;
use crate::theme;
use crate::ui::helpers::{panel, scroll_offset, truncate};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Todos", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.todo_visible.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Nothing here. Press a to add a task.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let rank = state
        .todo_cursor
        .and_then(|c| projection::rank_of(&state.todo_visible, c));
    let offset = scroll_offset(rank, height);

    let lines: Vec<Line> = state
        .todo_visible
        .iter()
        .skip(offset)
        .take(height)
        .filter_map(|&idx| state.todos.get(idx).map(|todo| (idx, todo)))
        .map(|(idx, todo)| {
            let selected = state.todo_cursor == Some(idx);
            let mark = if todo.done { "[x]" } else { "[ ]" };
            let text_style = match (selected, todo.done) {
                (true, _) => theme::style_selected_focused(),
                (false, true) => theme::style_muted(),
                (false, false) => theme::style_default(),
            };
            Line::from(vec![
                Span::styled(if selected { "▸ " } else { "  " }, theme::style_accent()),
                Span::styled(mark, theme::style_secondary()),
                Span::raw(" "),
                Span::styled(
                    truncate(&todo.text, inner.width.saturating_sub(20) as usize),
                    text_style,
                ),
                Span::raw("  "),
                Span::styled(todo.due.clone(), ratatui::style::Style::default().fg(theme::C_DUE)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
