//! Screen rendering.  Everything here reads `AppState` and draws; no state
//! mutation happens during a frame.

mod chrome;
mod dashboard;
mod helpers;
mod lofi;
mod modal_view;
mod projects;
mod semester;
mod settings;
mod todos;

use ratatui::layout::{Constraint, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::Frame;

use crate::state::{AppState, Tab};
use crate::theme;

pub fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme::C_BG)), area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .split(area);

    chrome::draw_header(frame, chunks[0]);
    chrome::draw_tabs(frame, chunks[1], state);

    match state.active_tab {
        Tab::Dashboard => dashboard::draw(frame, chunks[2], state),
        Tab::Exams => semester::draw(frame, chunks[2], state),
        Tab::Todos => todos::draw(frame, chunks[2], state),
        Tab::Projects => projects::draw(frame, chunks[2], state),
        Tab::Settings => settings::draw(frame, chunks[2], state),
        Tab::Lofi => lofi::draw(frame, chunks[2], state),
    }

    chrome::draw_footer(frame, chunks[3], state);

    if state.modal.is_open() {
        modal_view::draw(frame, chunks[2], state);
    }
}
