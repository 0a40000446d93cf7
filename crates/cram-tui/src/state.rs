//! AppState — the single aggregate the engine mutates.
//!
//! Only `Engine::handle` writes here; screens read it during draw.

use chrono::{Local, NaiveDate};

use cram_core::dates::{self, FilterWindow, WeekSpan};
use cram_core::model::{Exam, Project, Subject, TodoItem};
use cram_core::store::Snapshot;

use crate::lofi::LofiState;
use crate::modal::ModalState;
use crate::projection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Exams,
    Todos,
    Projects,
    Settings,
    Lofi,
}

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Exams => "Exams",
            Tab::Todos => "Todos",
            Tab::Projects => "Projects",
            Tab::Settings => "Settings",
            Tab::Lofi => "Lofi",
        }
    }

    /// Tab order as shown in the tab bar.  The Lofi tab is only listed (and
    /// only reachable) while the feature is enabled.
    pub fn visible(lofi_enabled: bool) -> Vec<Tab> {
        let mut tabs = vec![
            Tab::Dashboard,
            Tab::Exams,
            Tab::Todos,
            Tab::Projects,
            Tab::Settings,
        ];
        if lofi_enabled {
            tabs.push(Tab::Lofi);
        }
        tabs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemesterFocus {
    Subjects,
    Exams,
}

pub struct AppState {
    pub active_tab: Tab,

    pub subjects: Vec<Subject>,
    pub selected_subject: usize,
    pub exam_cursor: Option<usize>,
    pub exam_visible: Vec<usize>,
    pub semester_focus: SemesterFocus,

    pub projects: Vec<Project>,
    pub project_cursor: usize,

    pub todos: Vec<TodoItem>,
    pub todo_cursor: Option<usize>,
    pub todo_visible: Vec<usize>,

    pub dash_scroll: usize,

    pub week_start: NaiveDate,
    pub week_span: WeekSpan,
    pub confirm_on: bool,

    pub modal: ModalState,
    pub lofi: LofiState,

    /// Footer message from the last failed save; cleared on success.
    pub save_error: String,
    pub should_quit: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            active_tab: Tab::Dashboard,
            subjects: Vec::new(),
            selected_subject: 0,
            exam_cursor: None,
            exam_visible: Vec::new(),
            semester_focus: SemesterFocus::Subjects,
            projects: Vec::new(),
            project_cursor: 0,
            todos: Vec::new(),
            todo_cursor: None,
            todo_visible: Vec::new(),
            dash_scroll: 0,
            week_start: dates::week_start_of(Local::now().date_naive()),
            week_span: WeekSpan::Weeks(1),
            confirm_on: true,
            modal: ModalState::Closed,
            lofi: LofiState::default(),
            save_error: String::new(),
            should_quit: false,
        }
    }
}

impl AppState {
    pub fn from_snapshot(snapshot: Option<Snapshot>) -> Self {
        let mut state = Self::default();
        if let Some(snapshot) = snapshot {
            state.import(snapshot);
        }
        state
    }

    fn import(&mut self, snapshot: Snapshot) {
        self.subjects = snapshot.subjects;
        self.projects = snapshot.projects;
        self.todos = snapshot.todos;
        self.confirm_on = snapshot.confirm_on;
        self.week_span = WeekSpan::from_raw(snapshot.week_span);
        self.week_start = match dates::parse_strict_date(&snapshot.week_start) {
            Some(date) => dates::week_start_of(date),
            None => dates::week_start_of(Local::now().date_naive()),
        };
        self.lofi.enabled = snapshot.lofi_enabled;
        self.lofi.url = snapshot.lofi_url.trim().to_string();

        self.ensure_todo_due_dates();
        self.refresh_exam_filter();
        self.refresh_todo_filter();
        self.selected_subject = clamp_index(self.selected_subject, self.subjects.len());
        self.project_cursor = clamp_index(self.project_cursor, self.projects.len());
    }

    pub fn export(&self) -> Snapshot {
        Snapshot {
            subjects: self.subjects.clone(),
            projects: self.projects.clone(),
            todos: self.todos.clone(),
            confirm_on: self.confirm_on,
            week_start: dates::format_date(self.week_start),
            week_span: self.week_span.as_raw(),
            lofi_enabled: self.lofi.enabled,
            lofi_url: self.lofi.url.clone(),
        }
    }

    // ── window & filters ──────────────────────────────────────────────────────

    pub fn window(&self) -> FilterWindow {
        FilterWindow {
            start: self.week_start,
            span: self.week_span,
        }
    }

    pub fn week_label(&self) -> String {
        dates::week_label(self.week_start, self.week_span)
    }

    pub fn selected_exams(&self) -> &[Exam] {
        self.subjects
            .get(self.selected_subject)
            .map(|s| s.exams.as_slice())
            .unwrap_or(&[])
    }

    pub fn refresh_exam_filter(&mut self) {
        let visible = {
            let exams = self.selected_exams();
            let window = self.window();
            projection::visible_positions(
                exams.len(),
                |i| dates::parse_exam_date(&exams[i].date),
                &window,
            )
        };
        self.exam_visible = visible;
        self.exam_cursor = projection::repair_cursor(&self.exam_visible, self.exam_cursor);
        if self.exam_visible.is_empty() {
            self.semester_focus = SemesterFocus::Subjects;
        }
    }

    pub fn refresh_todo_filter(&mut self) {
        let visible = {
            let window = self.window();
            projection::visible_positions(
                self.todos.len(),
                |i| dates::parse_strict_date(&self.todos[i].due),
                &window,
            )
        };
        self.todo_visible = visible;
        self.todo_cursor = projection::repair_cursor(&self.todo_visible, self.todo_cursor);
    }

    pub fn refresh_filters(&mut self) {
        self.refresh_exam_filter();
        self.refresh_todo_filter();
    }

    /// Legacy todos may lack a due date; give them the current week start so
    /// they stay visible under bounded windows.  The backfilled dates reach
    /// disk with the next write-through save.
    pub fn ensure_todo_due_dates(&mut self) {
        let default_due = dates::format_date(self.week_start);
        for todo in &mut self.todos {
            if todo.due.trim().is_empty() {
                todo.due = default_due.clone();
            }
        }
    }

    // ── week navigation ───────────────────────────────────────────────────────

    pub fn shift_week(&mut self, delta: i64) {
        self.week_start = self.week_start + chrono::Duration::days(delta * 7);
        self.refresh_filters();
    }

    pub fn cycle_week_span(&mut self) {
        self.week_span = self.week_span.cycle();
        self.refresh_filters();
    }
}

/// Normalize a plain (unfiltered) cursor after a collection changed.
pub fn clamp_index(idx: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        idx.min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trip_preserves_settings() {
        let snapshot = Snapshot {
            todos: vec![TodoItem {
                text: "read".into(),
                done: false,
                due: "03/08/2026".into(),
            }],
            confirm_on: true,
            week_start: "05/08/2026".into(),
            week_span: -1,
            lofi_enabled: true,
            lofi_url: "  https://example.com/mix  ".into(),
            ..Default::default()
        };
        let state = AppState::from_snapshot(Some(snapshot));

        // Week start snaps back to the Monday of the stored week.
        assert_eq!(dates::format_date(state.week_start), "03/08/2026");
        assert_eq!(state.week_span, WeekSpan::All);
        assert!(state.lofi.enabled);
        assert_eq!(state.lofi.url, "https://example.com/mix");

        let out = state.export();
        assert_eq!(out.week_span, -1);
        assert_eq!(out.week_start, "03/08/2026");
        assert_eq!(out.todos.len(), 1);
    }

    #[test]
    fn import_backfills_missing_due_dates() {
        let snapshot = Snapshot {
            todos: vec![TodoItem {
                text: "dateless".into(),
                done: false,
                due: "   ".into(),
            }],
            week_span: 1,
            ..Default::default()
        };
        let state = AppState::from_snapshot(Some(snapshot));
        assert_eq!(state.todos[0].due, dates::format_date(state.week_start));
        // Backfilled todos are visible under the bounded window.
        assert_eq!(state.todo_visible, vec![0]);
        assert_eq!(state.todo_cursor, Some(0));
    }

    #[test]
    fn import_clamps_stale_cursors() {
        let state = AppState::from_snapshot(Some(Snapshot::default()));
        assert_eq!(state.selected_subject, 0);
        assert_eq!(state.project_cursor, 0);
        assert_eq!(state.exam_cursor, None);
    }

    #[test]
    fn tab_listing_follows_lofi_enablement() {
        assert_eq!(Tab::visible(false).len(), 5);
        let with_lofi = Tab::visible(true);
        assert_eq!(with_lofi.len(), 6);
        assert_eq!(*with_lofi.last().unwrap(), Tab::Lofi);
    }
}
