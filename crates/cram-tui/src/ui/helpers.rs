//! Small rendering helpers shared by the screens.

use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme;

/// Clip `text` to `width` terminal cells, appending an ellipsis when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if text.width() <= width {
        return text.to_string();
    }
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Standard bordered panel with a focus-aware border color.
pub fn panel(title: &str, focused: bool) -> Block<'_> {
    let border = if focused {
        theme::style_focused_border()
    } else {
        theme::style_unfocused_border()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {title} "))
        .title_style(theme::style_title())
}

/// Centered sub-rectangle, clamped to `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// First visible row so the cursor rank stays inside a `height`-row viewport.
pub fn scroll_offset(rank: Option<usize>, height: usize) -> usize {
    match (rank, height) {
        (Some(rank), h) if h > 0 && rank >= h => rank + 1 - h,
        _ => 0,
    }
}
