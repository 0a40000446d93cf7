//! Exams tab — subjects on the left, the selected subject's filtered exams
//! on the right.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::{AppState, SemesterFocus};
use crate::theme;
use crate::ui::dashboard::priority_style;
use crate::ui::helpers::{panel, scroll_offset, truncate};
use crate::projection;

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let halves =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(area);
    draw_subjects(frame, halves[0], state);
    draw_exams(frame, halves[1], state);
}

fn draw_subjects(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.semester_focus == SemesterFocus::Subjects;
    let block = panel("Subjects", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.subjects.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Press s to add a subject.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let offset = scroll_offset(Some(state.selected_subject), height);
    let lines: Vec<Line> = state
        .subjects
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, subject)| {
            let selected = i == state.selected_subject;
            let style = match (selected, focused) {
                (true, true) => theme::style_selected_focused(),
                (true, false) => theme::style_selected(),
                _ => theme::style_default(),
            };
            let marker = if selected { "▸ " } else { "  " };
            Line::from(vec![
                Span::styled(marker, theme::style_accent()),
                Span::styled(subject.code.clone(), style),
                Span::raw("  "),
                Span::styled(
                    truncate(&subject.name, inner.width.saturating_sub(16) as usize),
                    style,
                ),
                Span::styled(
                    format!("  ({})", subject.exams.len()),
                    theme::style_secondary(),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_exams(frame: &mut Frame, area: Rect, state: &AppState) {
    let focused = state.semester_focus == SemesterFocus::Exams;
    let block = panel("Exams", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let exams = state.selected_exams();
    if state.exam_visible.is_empty() {
        let message = if exams.is_empty() {
            "No exams for this subject yet. Press a to add one."
        } else {
            "No exams in this window."
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(message, theme::style_muted()))),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let rank = state
        .exam_cursor
        .and_then(|c| projection::rank_of(&state.exam_visible, c));
    let offset = scroll_offset(rank, height);

    let lines: Vec<Line> = state
        .exam_visible
        .iter()
        .skip(offset)
        .take(height)
        .filter_map(|&idx| exams.get(idx).map(|exam| (idx, exam)))
        .map(|(idx, exam)| {
            let selected = state.exam_cursor == Some(idx);
            let style = match (selected, focused) {
                (true, true) => theme::style_selected_focused(),
                (true, false) => theme::style_selected(),
                _ => theme::style_default(),
            };
            let retakes = if exam.retakes.is_empty() {
                String::new()
            } else {
                format!("  retakes: {}", exam.retakes.join(", "))
            };
            Line::from(vec![
                Span::styled(exam.date.clone(), theme::style_secondary()),
                Span::raw("  "),
                Span::styled(
                    truncate(&exam.name, inner.width.saturating_sub(30) as usize),
                    style,
                ),
                Span::raw("  "),
                Span::styled(exam.priority.clone(), priority_style(&exam.priority)),
                Span::styled(retakes, theme::style_muted()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
