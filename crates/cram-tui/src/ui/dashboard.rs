//! Dashboard — upcoming exams next to this window's todos.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use cram_core::dates;

use crate::state::AppState;
use crate::theme;
use crate::ui::helpers::{panel, truncate};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let halves =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    draw_upcoming_exams(frame, halves[0], state);
    draw_todo_digest(frame, halves[1], state);
}

fn draw_upcoming_exams(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Upcoming Exams", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let window = state.window();
    let mut rows: Vec<(chrono::NaiveDate, Line)> = Vec::new();
    for subject in &state.subjects {
        for exam in &subject.exams {
            let Some(date) = dates::parse_exam_date(&exam.date) else {
                continue;
            };
            if !window.contains(date) {
                continue;
            }
            let width = inner.width as usize;
            let line = Line::from(vec![
                Span::styled(dates::format_date(date), theme::style_secondary()),
                Span::raw("  "),
                Span::styled(subject.code.clone(), theme::style_accent()),
                Span::raw("  "),
                Span::styled(
                    truncate(&exam.name, width.saturating_sub(24)),
                    theme::style_default(),
                ),
                Span::raw("  "),
                Span::styled(exam.priority.clone(), priority_style(&exam.priority)),
            ]);
            rows.push((date, line));
        }
    }
    rows.sort_by_key(|(date, _)| *date);

    if rows.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No exams in this window.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let lines: Vec<Line> = rows.into_iter().map(|(_, line)| line).collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_todo_digest(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Todos", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.todo_visible.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Nothing due in this window.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let max_offset = state.todo_visible.len().saturating_sub(height);
    let offset = state.dash_scroll.min(max_offset);

    let lines: Vec<Line> = state
        .todo_visible
        .iter()
        .skip(offset)
        .take(height)
        .filter_map(|&idx| state.todos.get(idx))
        .map(|todo| {
            let (mark, style) = if todo.done {
                ("[x] ", theme::style_muted())
            } else {
                ("[ ] ", theme::style_default())
            };
            Line::from(vec![
                Span::styled(mark, theme::style_secondary()),
                Span::styled(
                    truncate(&todo.text, inner.width.saturating_sub(16) as usize),
                    style,
                ),
                Span::raw("  "),
                Span::styled(todo.due.clone(), theme::style_secondary()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

pub(super) fn priority_style(priority: &str) -> ratatui::style::Style {
    match priority {
        "HIGH" => theme::style_error(),
        "MED" => ratatui::style::Style::default().fg(theme::C_WARNING),
        _ => theme::style_muted(),
    }
}
