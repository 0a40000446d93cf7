//! Modal overlay — form or confirmation, centered over the active screen.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use ratatui::Frame;

use crate::modal::{FormModal, ModalState};
use crate::state::AppState;
use crate::theme;
use crate::ui::helpers::{centered, panel};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    match &state.modal {
        ModalState::Closed => {}
        ModalState::Editing(form) => draw_form(frame, area, form),
        ModalState::Confirming { message, .. } => draw_confirm(frame, area, message),
    }
}

fn draw_form(frame: &mut Frame, area: Rect, form: &FormModal) {
    let width = 70.min(area.width.saturating_sub(4)).max(42);
    let height = (form.fields.len() as u16) * 2 + 5;
    let rect = centered(area, width, height);

    frame.render_widget(Clear, rect);
    let block = panel(form.title, true);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let value_width = inner.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            theme::style_accent()
        } else {
            theme::style_secondary()
        };
        let required = if field.required { "*" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("{}{required}", field.label),
            label_style,
        )));

        let scroll = field.input.visual_scroll(value_width.saturating_sub(1));
        let value = field.input.value();
        lines.push(Line::from(Span::styled(
            format!("> {}", &value[scroll.min(value.len())..]),
            theme::style_default(),
        )));
    }

    lines.push(Line::default());
    if form.error.is_empty() {
        lines.push(Line::from(Span::styled(form.hint, theme::style_muted())));
    } else {
        lines.push(Line::from(Span::styled(
            form.error.clone(),
            theme::style_error(),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);

    // Cursor inside the focused field's value row.
    if let Some(field) = form.fields.get(form.focus) {
        let scroll = field.input.visual_scroll(value_width.saturating_sub(1));
        let x = inner.x + 2 + (field.input.visual_cursor().saturating_sub(scroll)) as u16;
        let y = inner.y + (form.focus as u16) * 2 + 1;
        if x < inner.right() && y < inner.bottom() {
            frame.set_cursor_position((x, y));
        }
    }
}

fn draw_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let width = 60.min(area.width.saturating_sub(4)).max(30);
    let rect = centered(area, width, 5);

    frame.render_widget(Clear, rect);
    let block = panel("Confirm", true);
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let lines = vec![
        Line::from(Span::styled(message.to_string(), theme::style_default())),
        Line::default(),
        Line::from(Span::styled("[Y] Confirm  [N] Cancel", theme::style_muted())),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
