//! Lofi tab — player panel and playlist.

use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::lofi::LofiStatus;
use crate::state::AppState;
use crate::theme;
use crate::ui::helpers::{panel, scroll_offset, truncate};

pub fn draw(frame: &mut Frame, area: Rect, state: &AppState) {
    if !state.lofi.enabled {
        let block = panel("Lofi Player", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "Enable the Lofi player in Settings to use it.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let halves =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).split(area);
    draw_player(frame, halves[0], state);
    draw_playlist(frame, halves[1], state);
}

fn draw_player(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Now Playing", false);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lofi = &state.lofi;
    let (title, note) = match lofi.now_playing.and_then(|i| lofi.playlist.get(i)) {
        Some(track) => (track.title.clone(), track.note.clone()),
        None => (
            "No track selected".to_string(),
            "Pick a track and press Enter".to_string(),
        ),
    };

    let status_style = match lofi.status {
        LofiStatus::Playing => ratatui::style::Style::default().fg(theme::C_PLAYING),
        LofiStatus::Loading => ratatui::style::Style::default().fg(theme::C_WARNING),
        _ => theme::style_secondary(),
    };

    let width = inner.width as usize;
    let mut lines = vec![
        Line::from(Span::styled(truncate(&title, width), theme::style_title())),
        Line::from(Span::styled(truncate(&note, width), theme::style_secondary())),
        Line::default(),
        Line::from(vec![
            Span::styled("Status: ", theme::style_default()),
            Span::styled(lofi.status.label(), status_style),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "[Enter] Play  [Space] Pause  [n] Next  [b] Prev  [x] Stop",
            theme::style_muted(),
        )),
    ];
    if !lofi.last_error.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            truncate(&lofi.last_error, width),
            theme::style_error(),
        )));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_playlist(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = panel("Playlist", true);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lofi = &state.lofi;
    if lofi.playlist.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "No tracks loaded. Set a playlist URL with u.",
                theme::style_muted(),
            ))),
            inner,
        );
        return;
    }

    let height = inner.height as usize;
    let offset = scroll_offset(Some(lofi.cursor), height);

    let lines: Vec<Line> = lofi
        .playlist
        .iter()
        .enumerate()
        .skip(offset)
        .take(height)
        .map(|(i, track)| {
            let selected = i == lofi.cursor;
            let playing = lofi.now_playing == Some(i);
            let marker = if playing { "♪ " } else { "  " };
            let style = if selected {
                theme::style_selected_focused()
            } else if playing {
                ratatui::style::Style::default().fg(theme::C_PLAYING)
            } else {
                theme::style_default()
            };
            let note = if track.note.is_empty() {
                String::new()
            } else {
                format!("  — {}", truncate(&track.note, 24))
            };
            Line::from(vec![
                Span::styled(marker, ratatui::style::Style::default().fg(theme::C_PLAYING)),
                Span::styled(
                    truncate(&track.title, inner.width.saturating_sub(30) as usize),
                    style,
                ),
                Span::styled(note, theme::style_secondary()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
