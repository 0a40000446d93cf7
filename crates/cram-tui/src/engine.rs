//! Engine — the event dispatcher.
//!
//! `handle` is the reducer: one event in, state mutated, zero or more
//! background tasks out.  It is synchronous and never blocks; anything slow
//! happens in the tasks it returns.  The run loop in `main` is the only
//! caller, so state is single-owner and lock-free.
//!
//! Every committed mutation is written through to the store before control
//! returns to the input loop; a failed save becomes a footer message and
//! nothing is rolled back.

use std::time::Duration;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{info, warn};

use cram_core::config::LofiConfig;
use cram_core::dates;
use cram_core::store::Store;

use crate::event::AppEvent;
use crate::forms::{form_def, format_date_for_input, EditTarget, FormKind};
use crate::lofi::player::{self, ControlMsg};
use crate::lofi::PlayerProcess;
use crate::modal::{ConfirmAction, ModalState};
use crate::projection;
use crate::state::{clamp_index, AppState, SemesterFocus, Tab};
use crate::task::Task;

pub struct Engine {
    pub state: AppState,
    store: Box<dyn Store + Send>,
    lofi_cfg: LofiConfig,
    events_tx: mpsc::Sender<AppEvent>,
}

impl Engine {
    pub fn new(
        state: AppState,
        store: Box<dyn Store + Send>,
        lofi_cfg: LofiConfig,
        events_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            state,
            store,
            lofi_cfg,
            events_tx,
        }
    }

    /// Work to schedule right after startup.
    pub fn startup_tasks(&mut self) -> Vec<Task> {
        if self.state.lofi.enabled && !self.state.lofi.url.trim().is_empty() {
            return vec![Task::FetchPlaylist {
                url: self.state.lofi.url.clone(),
            }];
        }
        Vec::new()
    }

    // ── the reducer ───────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: AppEvent) -> Vec<Task> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            // Nothing to update; the next draw reads the new frame area.
            AppEvent::Resize(_, _) => Vec::new(),
            AppEvent::PlaylistLoaded(result) => {
                self.state.lofi.apply_playlist(result);
                Vec::new()
            }
            AppEvent::SeekDue { socket, index } => self.state.lofi.apply_seek(&socket, index),
            AppEvent::PlaybackPolled {
                socket,
                playing,
                attempts,
                error,
            } => self.state.lofi.apply_poll(
                &socket,
                playing,
                attempts,
                error,
                self.lofi_cfg.poll_attempt_cap,
            ),
            AppEvent::ControlSent { socket, result } => {
                self.state.lofi.apply_control_sent(&socket, result);
                Vec::new()
            }
            AppEvent::PlayerExited { socket, error } => {
                self.state.lofi.apply_exit(&socket, error);
                Vec::new()
            }
        }
    }

    // ── key routing ───────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Task> {
        if self.state.modal.is_open() {
            return self.handle_modal_key(key);
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.state.should_quit = true;
            return Vec::new();
        }

        if let KeyCode::Char(c @ '1'..='9') = key.code {
            self.switch_tab(c as usize - '1' as usize);
            return Vec::new();
        }

        match key.code {
            KeyCode::Char('q') => {
                info!("engine: quit requested");
                self.state.should_quit = true;
                return Vec::new();
            }
            KeyCode::Left => {
                self.state.shift_week(-1);
                self.persist();
                return Vec::new();
            }
            KeyCode::Right => {
                self.state.shift_week(1);
                self.persist();
                return Vec::new();
            }
            KeyCode::Char('a' | 'A') => {
                if self.open_add_for_tab() {
                    return Vec::new();
                }
            }
            KeyCode::Char('s' | 'S') if self.state.active_tab == Tab::Exams => {
                self.state.modal = ModalState::open_form(FormKind::AddSubject, None, &[]);
                return Vec::new();
            }
            KeyCode::Char('e' | 'E') => {
                self.open_edit_current();
                return Vec::new();
            }
            KeyCode::Char('d' | 'D') => {
                self.queue_delete();
                return Vec::new();
            }
            KeyCode::Char('c' | 'C') if self.state.active_tab == Tab::Settings => {
                self.confirm_or_apply(
                    ConfirmAction::ClearAll,
                    "Clear all data? This cannot be undone.".to_string(),
                );
                return Vec::new();
            }
            KeyCode::Char('o' | 'O') if self.state.active_tab == Tab::Settings => {
                self.state.confirm_on = !self.state.confirm_on;
                self.persist();
                return Vec::new();
            }
            KeyCode::Char('w' | 'W') if self.state.active_tab == Tab::Settings => {
                self.state.cycle_week_span();
                self.persist();
                return Vec::new();
            }
            KeyCode::Char('l' | 'L') if self.state.active_tab == Tab::Settings => {
                let tasks = self.state.lofi.toggle_enabled();
                if !self.state.lofi.enabled && self.state.active_tab == Tab::Lofi {
                    self.state.active_tab = Tab::Settings;
                }
                self.persist();
                return tasks;
            }
            KeyCode::Char('u' | 'U')
                if matches!(self.state.active_tab, Tab::Settings | Tab::Lofi) =>
            {
                let url = self.state.lofi.url.clone();
                self.state.modal = ModalState::open_form(FormKind::EditLofiUrl, None, &[url]);
                return Vec::new();
            }
            _ => {}
        }

        match self.state.active_tab {
            Tab::Dashboard => self.handle_dashboard_key(key),
            Tab::Exams => self.handle_exams_key(key),
            Tab::Todos => self.handle_todos_key(key),
            Tab::Projects => self.handle_projects_key(key),
            Tab::Settings => Vec::new(),
            Tab::Lofi => self.handle_lofi_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.dash_scroll += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.dash_scroll = self.state.dash_scroll.saturating_sub(1)
            }
            KeyCode::PageDown => self.state.dash_scroll += 10,
            KeyCode::PageUp => self.state.dash_scroll = self.state.dash_scroll.saturating_sub(10),
            _ => {}
        }
        Vec::new()
    }

    fn handle_exams_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match key.code {
            KeyCode::Tab => self.toggle_semester_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.move_semester_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_semester_cursor(-1),
            _ => {}
        }
        Vec::new()
    }

    fn handle_todos_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_todo_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_todo_cursor(-1),
            KeyCode::PageDown => self.move_todo_cursor(10),
            KeyCode::PageUp => self.move_todo_cursor(-10),
            KeyCode::Char(' ' | 'x' | 'X') | KeyCode::Enter => self.toggle_todo(),
            KeyCode::Char('n' | 'N') => {
                self.state.modal = ModalState::open_form(
                    FormKind::AddTodo,
                    None,
                    &[String::new(), dates::format_date(self.state.week_start)],
                );
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_projects_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let len = self.state.projects.len();
        match key.code {
            KeyCode::Char('j') | KeyCode::Down if len > 0 => {
                self.state.project_cursor = (self.state.project_cursor + 1).min(len - 1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.project_cursor = self.state.project_cursor.saturating_sub(1);
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_lofi_key(&mut self, key: KeyEvent) -> Vec<Task> {
        match key.code {
            KeyCode::Enter => {
                let cursor = self.state.lofi.cursor;
                self.state.lofi.play_at(cursor, &self.events_tx)
            }
            KeyCode::Char(' ') => self.state.lofi.toggle_play_pause(&self.events_tx),
            KeyCode::Char('n' | 'N') => self.state.lofi.next(&self.events_tx),
            KeyCode::Char('b' | 'B') => self.state.lofi.prev(&self.events_tx),
            KeyCode::Char('x' | 'X') => self.state.lofi.stop(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_lofi_cursor(1);
                Vec::new()
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_lofi_cursor(-1);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    // ── modal handling ────────────────────────────────────────────────────────

    fn handle_modal_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let modal = std::mem::take(&mut self.state.modal);
        let mut tasks = Vec::new();
        match modal {
            ModalState::Closed => {}
            ModalState::Confirming { action, message } => match key.code {
                KeyCode::Enter | KeyCode::Char('y' | 'Y') => self.apply_confirm(action),
                KeyCode::Esc | KeyCode::Char('n' | 'N') => {}
                _ => self.state.modal = ModalState::Confirming { action, message },
            },
            ModalState::Editing(mut form) => match key.code {
                KeyCode::Esc => {}
                KeyCode::Enter if form.on_last_field() => {
                    let def = form_def(form.kind);
                    let values = form.values();
                    match (def.apply)(&mut self.state, &values, form.target) {
                        Ok(mut follow_up) => {
                            tasks.append(&mut follow_up);
                            tasks.extend(self.state.lofi.consume_reload());
                            self.persist();
                        }
                        Err(message) => {
                            form.error = message;
                            self.state.modal = ModalState::Editing(form);
                        }
                    }
                }
                KeyCode::Enter => {
                    form.focus += 1;
                    self.state.modal = ModalState::Editing(form);
                }
                KeyCode::Tab => {
                    form.focus_next();
                    self.state.modal = ModalState::Editing(form);
                }
                KeyCode::BackTab => {
                    form.focus_prev();
                    self.state.modal = ModalState::Editing(form);
                }
                _ => {
                    form.forward_key(key);
                    self.state.modal = ModalState::Editing(form);
                }
            },
        }
        tasks
    }

    fn open_add_for_tab(&mut self) -> bool {
        match self.state.active_tab {
            Tab::Exams => {
                self.state.modal = ModalState::open_form(FormKind::AddExam, None, &[]);
                true
            }
            Tab::Todos => {
                self.state.modal = ModalState::open_form(
                    FormKind::AddTodo,
                    None,
                    &[String::new(), dates::format_date(self.state.week_start)],
                );
                true
            }
            Tab::Projects => {
                self.state.modal = ModalState::open_form(FormKind::AddProject, None, &[]);
                true
            }
            _ => false,
        }
    }

    fn open_edit_current(&mut self) {
        match self.state.active_tab {
            Tab::Exams => {
                if self.state.semester_focus == SemesterFocus::Exams {
                    self.open_edit_exam();
                } else {
                    self.open_edit_subject();
                }
            }
            Tab::Todos => self.open_edit_todo(),
            Tab::Projects => self.open_edit_project(),
            _ => {}
        }
    }

    fn open_edit_subject(&mut self) {
        let idx = self.state.selected_subject;
        let Some(subject) = self.state.subjects.get(idx) else {
            return;
        };
        self.state.modal = ModalState::open_form(
            FormKind::EditSubject,
            Some(EditTarget::Subject(idx)),
            &[subject.code.clone(), subject.name.clone()],
        );
    }

    fn open_edit_exam(&mut self) {
        let subject = self.state.selected_subject;
        let Some(exam_idx) = self.state.exam_cursor else {
            return;
        };
        let Some(exam) = self.state.selected_exams().get(exam_idx) else {
            return;
        };
        let retakes = exam
            .retakes
            .iter()
            .map(|r| format_date_for_input(r))
            .collect::<Vec<_>>()
            .join(", ");
        self.state.modal = ModalState::open_form(
            FormKind::EditExam,
            Some(EditTarget::Exam {
                subject,
                exam: exam_idx,
            }),
            &[
                exam.name.clone(),
                format_date_for_input(&exam.date),
                retakes,
                exam.priority.clone(),
            ],
        );
    }

    fn open_edit_project(&mut self) {
        let idx = self.state.project_cursor;
        let Some(project) = self.state.projects.get(idx) else {
            return;
        };
        self.state.modal = ModalState::open_form(
            FormKind::EditProject,
            Some(EditTarget::Project(idx)),
            &[
                project.name.clone(),
                project.subject.clone(),
                format_date_for_input(&project.due),
                project.status.clone(),
            ],
        );
    }

    fn open_edit_todo(&mut self) {
        let Some(idx) = self.state.todo_cursor else {
            return;
        };
        let Some(todo) = self.state.todos.get(idx) else {
            return;
        };
        self.state.modal = ModalState::open_form(
            FormKind::EditTodo,
            Some(EditTarget::Todo(idx)),
            &[todo.text.clone(), format_date_for_input(&todo.due)],
        );
    }

    // ── destructive actions ───────────────────────────────────────────────────

    fn queue_delete(&mut self) {
        match self.state.active_tab {
            Tab::Exams => {
                let idx = self.state.selected_subject;
                let Some(subject) = self.state.subjects.get(idx) else {
                    return;
                };
                let message = format!("Delete subject {} and its exams?", subject.code);
                self.confirm_or_apply(ConfirmAction::DeleteSubject(idx), message);
            }
            Tab::Projects => {
                let idx = self.state.project_cursor;
                let Some(project) = self.state.projects.get(idx) else {
                    return;
                };
                let message = format!("Delete project {}?", project.name);
                self.confirm_or_apply(ConfirmAction::DeleteProject(idx), message);
            }
            Tab::Todos => {
                let Some(idx) = self.state.todo_cursor else {
                    return;
                };
                let Some(todo) = self.state.todos.get(idx) else {
                    return;
                };
                let message = format!("Delete task \"{}\"?", todo.text);
                self.confirm_or_apply(ConfirmAction::DeleteTodo(idx), message);
            }
            _ => {}
        }
    }

    /// Confirmation gate: when the preference is off, destructive actions
    /// apply immediately without a modal.
    fn confirm_or_apply(&mut self, action: ConfirmAction, message: String) {
        if self.state.confirm_on {
            self.state.modal = ModalState::confirm(action, message);
        } else {
            self.apply_confirm(action);
        }
    }

    fn apply_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteSubject(idx) => {
                if idx < self.state.subjects.len() {
                    self.state.subjects.remove(idx);
                    self.state.selected_subject =
                        clamp_index(self.state.selected_subject, self.state.subjects.len());
                    self.state.refresh_exam_filter();
                }
            }
            ConfirmAction::DeleteProject(idx) => {
                if idx < self.state.projects.len() {
                    self.state.projects.remove(idx);
                    self.state.project_cursor =
                        clamp_index(self.state.project_cursor, self.state.projects.len());
                }
            }
            ConfirmAction::DeleteTodo(idx) => {
                if idx < self.state.todos.len() {
                    self.state.todos.remove(idx);
                    self.state.refresh_todo_filter();
                }
            }
            ConfirmAction::ClearAll => {
                self.state.subjects.clear();
                self.state.projects.clear();
                self.state.todos.clear();
                self.state.selected_subject = 0;
                self.state.project_cursor = 0;
                self.state.refresh_filters();
            }
        }
        self.persist();
    }

    // ── cursor movement ───────────────────────────────────────────────────────

    fn toggle_semester_focus(&mut self) {
        match self.state.semester_focus {
            SemesterFocus::Subjects => {
                if !self.state.exam_visible.is_empty() {
                    self.state.semester_focus = SemesterFocus::Exams;
                }
            }
            SemesterFocus::Exams => self.state.semester_focus = SemesterFocus::Subjects,
        }
    }

    fn move_semester_cursor(&mut self, delta: isize) {
        match self.state.semester_focus {
            SemesterFocus::Subjects => {
                let len = self.state.subjects.len();
                if len == 0 {
                    return;
                }
                let next = self.state.selected_subject as isize + delta;
                self.state.selected_subject = next.clamp(0, len as isize - 1) as usize;
                self.state.refresh_exam_filter();
            }
            SemesterFocus::Exams => {
                if self.state.exam_visible.is_empty() {
                    self.state.semester_focus = SemesterFocus::Subjects;
                    return;
                }
                self.state.exam_cursor =
                    projection::step(&self.state.exam_visible, self.state.exam_cursor, delta);
            }
        }
    }

    fn move_todo_cursor(&mut self, delta: isize) {
        self.state.todo_cursor =
            projection::step(&self.state.todo_visible, self.state.todo_cursor, delta);
    }

    fn move_lofi_cursor(&mut self, delta: isize) {
        let len = self.state.lofi.playlist.len();
        if len == 0 {
            return;
        }
        let next = self.state.lofi.cursor as isize + delta;
        self.state.lofi.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn toggle_todo(&mut self) {
        if self.state.todo_visible.is_empty() {
            return;
        }
        let Some(idx) = self.state.todo_cursor else {
            return;
        };
        if let Some(todo) = self.state.todos.get_mut(idx) {
            todo.done = !todo.done;
            self.persist();
        }
    }

    fn switch_tab(&mut self, idx: usize) {
        let tabs = Tab::visible(self.state.lofi.enabled);
        if let Some(&tab) = tabs.get(idx) {
            self.state.active_tab = tab;
        }
    }

    // ── persistence & teardown ────────────────────────────────────────────────

    fn persist(&mut self) {
        match self.store.save(&self.state.export()) {
            Ok(()) => self.state.save_error.clear(),
            Err(e) => {
                warn!("engine: save failed: {e}");
                self.state.save_error = format!("Save failed: {e}");
            }
        }
    }

    /// Quit-time teardown: graceful stop of the player, then force kill.
    /// This is the one place allowed to await — the reducer loop has ended.
    pub async fn shutdown(&mut self) {
        let player = std::mem::replace(&mut self.state.lofi.player, PlayerProcess::Idle);
        if let PlayerProcess::Running(handle) = player {
            info!("engine: shutting down player");
            let quit = player::send_control(&handle.socket, &ControlMsg::Quit, &self.lofi_cfg);
            let _ = tokio::time::timeout(Duration::from_millis(500), quit).await;
            handle.kill();
            // Let the monitor reap the child before the runtime goes away.
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use cram_core::dates::WeekSpan;
    use cram_core::model::{Exam, Subject, TodoItem};
    use cram_core::store::Snapshot;

    use crate::lofi::{LofiStatus, PlayerHandle, PlayerProcess};

    struct NullStore;

    impl Store for NullStore {
        fn load(&self) -> anyhow::Result<Option<Snapshot>> {
            Ok(None)
        }
        fn save(&self, _snapshot: &Snapshot) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct CountingStore(Arc<AtomicUsize>);

    impl Store for CountingStore {
        fn load(&self) -> anyhow::Result<Option<Snapshot>> {
            Ok(None)
        }
        fn save(&self, _snapshot: &Snapshot) -> anyhow::Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingStore;

    impl Store for FailingStore {
        fn load(&self) -> anyhow::Result<Option<Snapshot>> {
            Ok(None)
        }
        fn save(&self, _snapshot: &Snapshot) -> anyhow::Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    fn engine_with(store: Box<dyn Store + Send>) -> Engine {
        let (tx, _rx) = mpsc::channel(64);
        Engine::new(AppState::default(), store, LofiConfig::default(), tx)
    }

    fn engine() -> Engine {
        engine_with(Box::new(NullStore))
    }

    fn press(engine: &mut Engine, code: KeyCode) -> Vec<Task> {
        engine.handle(AppEvent::Key(KeyEvent::from(code)))
    }

    fn type_text(engine: &mut Engine, text: &str) {
        for c in text.chars() {
            press(engine, KeyCode::Char(c));
        }
    }

    fn monday() -> String {
        dates::format_date(dates::week_start_of(chrono::Local::now().date_naive()))
    }

    fn wednesday() -> String {
        let start = dates::week_start_of(chrono::Local::now().date_naive());
        dates::format_date(start + chrono::Duration::days(2))
    }

    fn todo(text: &str, due: &str) -> TodoItem {
        TodoItem {
            text: text.into(),
            done: false,
            due: due.into(),
        }
    }

    fn running_lofi(engine: &mut Engine, socket: &str) -> PathBuf {
        engine.state.lofi.enabled = true;
        engine.state.lofi.url = "https://example.com/mix".into();
        engine.state.lofi.player = PlayerProcess::Running(PlayerHandle::fake(socket));
        PathBuf::from(socket)
    }

    // ── confirm gating ────────────────────────────────────────────────────────

    #[test]
    fn delete_applies_immediately_when_confirmation_off() {
        let mut e = engine();
        e.state.confirm_on = false;
        e.state.active_tab = Tab::Todos;
        e.state.todos = vec![todo("a", &monday())];
        e.state.refresh_todo_filter();

        press(&mut e, KeyCode::Char('d'));
        assert!(e.state.todos.is_empty());
        assert!(!e.state.modal.is_open());
    }

    #[test]
    fn delete_waits_for_yes_when_confirmation_on() {
        let mut e = engine();
        e.state.confirm_on = true;
        e.state.active_tab = Tab::Todos;
        e.state.todos = vec![todo("a", &monday())];
        e.state.refresh_todo_filter();

        press(&mut e, KeyCode::Char('d'));
        assert!(matches!(e.state.modal, ModalState::Confirming { .. }));
        assert_eq!(e.state.todos.len(), 1);

        // 'n' backs out without applying.
        press(&mut e, KeyCode::Char('n'));
        assert!(!e.state.modal.is_open());
        assert_eq!(e.state.todos.len(), 1);

        press(&mut e, KeyCode::Char('d'));
        press(&mut e, KeyCode::Char('y'));
        assert!(e.state.todos.is_empty());
    }

    // ── cursor/projection through the reducer ─────────────────────────────────

    #[test]
    fn deleting_cursor_target_repairs_to_first_visible() {
        // [A(Mon), B(Wed), C(no date)], one-week window; cursor on B.
        let mut e = engine();
        e.state.confirm_on = false;
        e.state.active_tab = Tab::Todos;
        e.state.week_span = WeekSpan::Weeks(1);
        e.state.todos = vec![todo("A", &monday()), todo("B", &wednesday()), todo("C", "")];
        e.state.refresh_todo_filter();
        assert_eq!(e.state.todo_visible, vec![0, 1]);

        press(&mut e, KeyCode::Char('j'));
        assert_eq!(e.state.todo_cursor, Some(1));

        press(&mut e, KeyCode::Char('d'));
        assert_eq!(e.state.todo_visible, vec![0]);
        assert_eq!(e.state.todo_cursor, Some(0));
    }

    #[test]
    fn todo_cursor_survives_arbitrary_mutation_sequences() {
        let mut e = engine();
        e.state.confirm_on = false;
        e.state.active_tab = Tab::Todos;
        e.state.week_span = WeekSpan::All;
        for i in 0..5 {
            e.state.todos.push(todo(&format!("t{i}"), &monday()));
        }
        e.state.refresh_todo_filter();

        for code in [
            KeyCode::Char('j'),
            KeyCode::Char('j'),
            KeyCode::Char('d'),
            KeyCode::Char('d'),
            KeyCode::Char('k'),
            KeyCode::Char('d'),
            KeyCode::PageDown,
            KeyCode::Char('d'),
            KeyCode::Char('d'),
            KeyCode::Char('d'),
        ] {
            press(&mut e, code);
            match e.state.todo_cursor {
                None => assert!(e.state.todo_visible.is_empty()),
                Some(c) => assert!(e.state.todo_visible.contains(&c)),
            }
        }
        assert!(e.state.todos.is_empty());
        assert_eq!(e.state.todo_cursor, None);
    }

    // ── modal flow ────────────────────────────────────────────────────────────

    #[test]
    fn enter_advances_and_only_last_field_commits() {
        let mut e = engine();
        e.state.active_tab = Tab::Exams;
        press(&mut e, KeyCode::Char('s'));
        assert!(matches!(e.state.modal, ModalState::Editing(_)));

        type_text(&mut e, "cs101");
        press(&mut e, KeyCode::Enter); // advance to Name, no commit
        assert!(e.state.subjects.is_empty());
        assert!(e.state.modal.is_open());

        type_text(&mut e, "Intro");
        press(&mut e, KeyCode::Enter); // commit from last field
        assert!(!e.state.modal.is_open());
        assert_eq!(e.state.subjects.len(), 1);
        assert_eq!(e.state.subjects[0].code, "cs101");
    }

    #[test]
    fn failed_validation_keeps_modal_open_with_error() {
        let mut e = engine();
        e.state.active_tab = Tab::Exams;
        press(&mut e, KeyCode::Char('s'));
        press(&mut e, KeyCode::Enter); // empty code → advance to name
        press(&mut e, KeyCode::Enter); // empty commit

        match &e.state.modal {
            ModalState::Editing(form) => assert_eq!(form.error, "code and name are required"),
            other => panic!("expected open form, got {other:?}"),
        }
        assert!(e.state.subjects.is_empty());

        press(&mut e, KeyCode::Esc);
        assert!(!e.state.modal.is_open());
    }

    #[test]
    fn edit_lofi_url_queues_reload_on_commit() {
        let mut e = engine();
        e.state.active_tab = Tab::Settings;
        press(&mut e, KeyCode::Char('u'));
        type_text(&mut e, "https://example.com/mix");
        let tasks = press(&mut e, KeyCode::Enter);
        assert!(matches!(&tasks[..], [Task::FetchPlaylist { url }] if url.contains("example.com")));
        assert_eq!(e.state.lofi.url, "https://example.com/mix");
    }

    // ── tabs & settings ───────────────────────────────────────────────────────

    #[test]
    fn lofi_tab_hidden_until_enabled() {
        let mut e = engine();
        press(&mut e, KeyCode::Char('6'));
        assert_eq!(e.state.active_tab, Tab::Dashboard);

        e.state.lofi.enabled = true;
        press(&mut e, KeyCode::Char('6'));
        assert_eq!(e.state.active_tab, Tab::Lofi);
    }

    #[test]
    fn week_span_cycles_and_persists() {
        let saves = Arc::new(AtomicUsize::new(0));
        let mut e = engine_with(Box::new(CountingStore(saves.clone())));
        e.state.active_tab = Tab::Settings;

        press(&mut e, KeyCode::Char('w'));
        assert_eq!(e.state.week_span, WeekSpan::Weeks(2));
        for _ in 0..3 {
            press(&mut e, KeyCode::Char('w'));
        }
        assert_eq!(e.state.week_span, WeekSpan::All);
        assert_eq!(saves.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn clear_all_empties_every_collection() {
        let mut e = engine();
        e.state.confirm_on = false;
        e.state.active_tab = Tab::Settings;
        e.state.subjects.push(Subject {
            code: "CS101".into(),
            name: "Intro".into(),
            exams: vec![Exam {
                name: "Midterm".into(),
                date: monday(),
                ..Default::default()
            }],
        });
        e.state.todos.push(todo("a", &monday()));
        e.state.refresh_filters();

        press(&mut e, KeyCode::Char('c'));
        assert!(e.state.subjects.is_empty());
        assert!(e.state.todos.is_empty());
        assert_eq!(e.state.exam_cursor, None);
        assert_eq!(e.state.todo_cursor, None);
    }

    #[test]
    fn failed_save_surfaces_in_footer_without_rollback() {
        let mut e = engine_with(Box::new(FailingStore));
        e.state.active_tab = Tab::Settings;
        press(&mut e, KeyCode::Char('o'));
        assert!(!e.state.confirm_on); // mutation kept
        assert!(e.state.save_error.contains("disk on fire"));
    }

    // ── lofi through the reducer ──────────────────────────────────────────────

    #[test]
    fn play_with_feature_disabled_only_sets_error() {
        let mut e = engine();
        e.state.active_tab = Tab::Lofi;
        let tasks = press(&mut e, KeyCode::Enter);
        assert!(tasks.is_empty());
        assert_eq!(e.state.lofi.last_error, "enable Lofi in Settings first");
        assert_eq!(e.state.lofi.status, LofiStatus::Stopped);
    }

    #[test]
    fn play_without_url_only_sets_error() {
        let mut e = engine();
        e.state.active_tab = Tab::Lofi;
        e.state.lofi.enabled = true;
        press(&mut e, KeyCode::Enter);
        assert_eq!(e.state.lofi.last_error, "set a playlist URL in Settings");
    }

    #[test]
    fn play_with_empty_playlist_asks_for_selection() {
        let mut e = engine();
        e.state.active_tab = Tab::Lofi;
        e.state.lofi.enabled = true;
        e.state.lofi.url = "https://example.com/mix".into();
        press(&mut e, KeyCode::Enter);
        assert_eq!(e.state.lofi.last_error, "Select a track first.");
    }

    #[test]
    fn play_on_stopped_player_reloads_seeks_and_polls() {
        let mut e = engine();
        e.state.active_tab = Tab::Lofi;
        let socket = running_lofi(&mut e, "/tmp/cram-test-a.sock");
        e.state.lofi.playlist = vec![Default::default(), Default::default()];
        e.state.lofi.cursor = 1;
        e.state.lofi.status = LofiStatus::Stopped;

        let tasks = press(&mut e, KeyCode::Enter);
        assert_eq!(e.state.lofi.status, LofiStatus::Loading);
        assert_eq!(e.state.lofi.now_playing, Some(1));
        assert_eq!(tasks.len(), 3);
        assert!(matches!(&tasks[0], Task::Control { socket: s, msg: ControlMsg::Load(_) } if *s == socket));
        assert!(matches!(&tasks[1], Task::DeferSeek { index: 1, .. }));
        assert!(matches!(&tasks[2], Task::PollPlayback { attempts: 0, .. }));
    }

    #[test]
    fn seek_due_jumps_and_restarts_poll() {
        let mut e = engine();
        let socket = running_lofi(&mut e, "/tmp/cram-test-b.sock");
        e.state.lofi.status = LofiStatus::Loading;

        let tasks = e.handle(AppEvent::SeekDue {
            socket: socket.clone(),
            index: 3,
        });
        assert_eq!(tasks.len(), 2);
        assert!(matches!(&tasks[0], Task::Control { msg: ControlMsg::PlayIndex(3), .. }));
        assert!(matches!(&tasks[1], Task::PollPlayback { attempts: 0, .. }));

        // A seek for a player that no longer exists is dropped.
        let stale = e.handle(AppEvent::SeekDue {
            socket: PathBuf::from("/tmp/other.sock"),
            index: 3,
        });
        assert!(stale.is_empty());
    }

    #[test]
    fn poll_loop_stops_after_attempt_cap() {
        let mut e = engine();
        let socket = running_lofi(&mut e, "/tmp/cram-test-c.sock");
        e.state.lofi.status = LofiStatus::Loading;
        let cap = e.lofi_cfg.poll_attempt_cap;

        let mut reschedules = 0;
        for attempts in 0..=cap {
            let tasks = e.handle(AppEvent::PlaybackPolled {
                socket: socket.clone(),
                playing: false,
                attempts,
                error: None,
            });
            match &tasks[..] {
                [] => break,
                [Task::PollPlayback { attempts: next, .. }] => {
                    assert_eq!(*next, attempts + 1);
                    reschedules += 1;
                }
                other => panic!("unexpected tasks {other:?}"),
            }
        }
        assert_eq!(reschedules, cap);
        // Gave up quietly: still Loading, no error.
        assert_eq!(e.state.lofi.status, LofiStatus::Loading);
        assert!(e.state.lofi.last_error.is_empty());
    }

    #[test]
    fn confirmed_poll_marks_playing_and_stops() {
        let mut e = engine();
        let socket = running_lofi(&mut e, "/tmp/cram-test-d.sock");
        e.state.lofi.status = LofiStatus::Loading;
        e.state.lofi.last_error = "old noise".into();

        let tasks = e.handle(AppEvent::PlaybackPolled {
            socket,
            playing: true,
            attempts: 4,
            error: None,
        });
        assert!(tasks.is_empty());
        assert_eq!(e.state.lofi.status, LofiStatus::Playing);
        assert!(e.state.lofi.last_error.is_empty());
    }

    #[test]
    fn pause_toggle_flips_optimistically() {
        let mut e = engine();
        e.state.active_tab = Tab::Lofi;
        running_lofi(&mut e, "/tmp/cram-test-e.sock");
        e.state.lofi.status = LofiStatus::Playing;

        let tasks = press(&mut e, KeyCode::Char(' '));
        assert_eq!(e.state.lofi.status, LofiStatus::Paused);
        assert!(matches!(&tasks[..], [Task::Control { msg: ControlMsg::TogglePause, .. }]));

        let tasks = press(&mut e, KeyCode::Char(' '));
        assert_eq!(e.state.lofi.status, LofiStatus::Playing);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn next_clamps_at_playlist_end() {
        let mut e = engine();
        e.state.active_tab = Tab::Lofi;
        running_lofi(&mut e, "/tmp/cram-test-f.sock");
        e.state.lofi.status = LofiStatus::Playing;
        e.state.lofi.playlist = vec![Default::default(), Default::default()];
        e.state.lofi.now_playing = Some(1);

        let tasks = press(&mut e, KeyCode::Char('n'));
        // Skip is still sent, but the in-memory position does not wrap.
        assert!(matches!(&tasks[0], Task::Control { msg: ControlMsg::Next, .. }));
        assert_eq!(e.state.lofi.now_playing, Some(1));
        assert_eq!(e.state.lofi.status, LofiStatus::Loading);
    }

    #[test]
    fn player_exit_clears_handle_and_reports_error() {
        let mut e = engine();
        let socket = running_lofi(&mut e, "/tmp/cram-test-g.sock");
        e.state.lofi.status = LofiStatus::Playing;

        e.handle(AppEvent::PlayerExited {
            socket: socket.clone(),
            error: Some("exit status: 1".into()),
        });
        assert!(!e.state.lofi.player.is_running());
        assert_eq!(e.state.lofi.status, LofiStatus::Stopped);
        assert_eq!(e.state.lofi.last_error, "Lofi player stopped.");

        // A second, stale exit event for the same socket is a no-op.
        e.state.lofi.last_error.clear();
        e.handle(AppEvent::PlayerExited {
            socket,
            error: Some("again".into()),
        });
        assert!(e.state.lofi.last_error.is_empty());
    }

    #[test]
    fn disable_tears_down_the_player() {
        let mut e = engine();
        e.state.active_tab = Tab::Settings;
        running_lofi(&mut e, "/tmp/cram-test-h.sock");
        e.state.lofi.status = LofiStatus::Playing;

        let tasks = press(&mut e, KeyCode::Char('l'));
        assert!(!e.state.lofi.enabled);
        assert_eq!(e.state.lofi.status, LofiStatus::Stopped);
        assert!(!e.state.lofi.player.is_running());
        assert!(matches!(&tasks[..], [Task::ShutdownPlayer { .. }]));
    }

    #[test]
    fn playlist_result_populates_or_reports() {
        let mut e = engine();
        e.state.lofi.enabled = true;

        e.handle(AppEvent::PlaylistLoaded(Err("yt-dlp error: boom".into())));
        assert_eq!(e.state.lofi.last_error, "yt-dlp error: boom");

        e.handle(AppEvent::PlaylistLoaded(Ok(vec![cram_core::model::LofiTrack {
            title: "Rainy Tapes".into(),
            note: "Chill Dept.".into(),
        }])));
        assert!(e.state.lofi.last_error.is_empty());
        assert_eq!(e.state.lofi.playlist.len(), 1);
        assert_eq!(e.state.lofi.now_playing, Some(0));
    }

    #[test]
    fn quit_key_requests_shutdown() {
        let mut e = engine();
        press(&mut e, KeyCode::Char('q'));
        assert!(e.state.should_quit);
    }
}
