//! Projects tab.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use cram_core::model::{PROJECT_STATUS_DONE, PROJECT_STATUS_IN_PROGRESS};

use crate::state::AppState;
use crate::theme;
use crate::ui::helpers::{panel, scroll_offset, truncate};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Projects", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.projects.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No projects yet. Press a to add one.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let offset = scroll_offset(Some(state.project_cursor), height);

    let lines: Vec<Line> = state
        .projects
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, project)| {
            let selected = i == state.project_cursor;
            let style = if selected {
                theme::style_selected_focused()
            } else {
                theme::style_default()
            };
            let status_style = match project.status.as_str() {
                PROJECT_STATUS_DONE => ratatui::style::Style::default().fg(theme::C_DONE),
                PROJECT_STATUS_IN_PROGRESS => {
                    ratatui::style::Style::default().fg(theme::C_WARNING)
                }
                _ => theme::style_secondary(),
            };
            Line::from(vec![
                Span::styled(if selected { "▸ " } else { "  " }, theme::style_accent()),
                Span::styled(
                    truncate(&project.name, inner.width.saturating_sub(44) as usize),
                    style,
                ),
                Span::raw("  "),
                Span::styled(truncate(&project.subject, 12), theme::style_secondary()),
                Span::raw("  "),
                Span::styled(project.due.clone(), theme::style_secondary()),
                Span::raw("  "),
                Span::styled(project.status.clone(), status_style),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
