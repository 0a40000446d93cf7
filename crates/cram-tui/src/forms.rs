//! Form capability table — one entry per modal kind: its title, field
//! specification, and commit handler.  Adding a record kind means adding a
//! row here; nothing else branches on the kind.
//!
//! Commit handlers take the trimmed field values, validate, and either apply
//! the mutation to `AppState` (returning any follow-up tasks) or return the
//! message to show inline.  Persistence is the engine's job, after a
//! successful commit.

use cram_core::dates;
use cram_core::model::{Exam, Project, Subject, TodoItem, PROJECT_STATUS_NOT_STARTED};

use crate::state::{clamp_index, AppState};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddSubject,
    AddExam,
    AddProject,
    AddTodo,
    EditSubject,
    EditExam,
    EditProject,
    EditTodo,
    EditLofiUrl,
}

/// Which existing record an edit form writes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Subject(usize),
    Exam { subject: usize, exam: usize },
    Project(usize),
    Todo(usize),
}

pub struct FieldSpec {
    pub label: &'static str,
    pub required: bool,
}

type ApplyFn = fn(&mut AppState, &[String], Option<EditTarget>) -> Result<Vec<Task>, String>;

pub struct FormDef {
    pub kind: FormKind,
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    pub apply: ApplyFn,
}

const SUBJECT_FIELDS: &[FieldSpec] = &[
    FieldSpec { label: "Code", required: true },
    FieldSpec { label: "Name", required: true },
];

const EXAM_ADD_FIELDS: &[FieldSpec] = &[
    FieldSpec { label: "Subject", required: true },
    FieldSpec { label: "Exam Name", required: true },
    FieldSpec { label: "Date (DD/MM/YYYY)", required: true },
    FieldSpec { label: "Retakes (DD/MM/YYYY, ...)", required: false },
    FieldSpec { label: "Priority", required: false },
];

const EXAM_EDIT_FIELDS: &[FieldSpec] = &[
    FieldSpec { label: "Exam Name", required: true },
    FieldSpec { label: "Date (DD/MM/YYYY)", required: true },
    FieldSpec { label: "Retakes (DD/MM/YYYY, ...)", required: false },
    FieldSpec { label: "Priority", required: false },
];

const PROJECT_FIELDS: &[FieldSpec] = &[
    FieldSpec { label: "Name", required: true },
    FieldSpec { label: "Subject", required: true },
    FieldSpec { label: "Deadline (DD/MM/YYYY)", required: true },
    FieldSpec { label: "Status", required: false },
];

const TODO_FIELDS: &[FieldSpec] = &[
    FieldSpec { label: "Task", required: true },
    FieldSpec { label: "Due (DD/MM/YYYY)", required: true },
];

const LOFI_URL_FIELDS: &[FieldSpec] = &[FieldSpec {
    label: "Playlist URL",
    required: true,
}];

pub static FORM_DEFS: &[FormDef] = &[
    FormDef { kind: FormKind::AddSubject, title: "Add Subject", fields: SUBJECT_FIELDS, apply: apply_subject },
    FormDef { kind: FormKind::EditSubject, title: "Edit Subject", fields: SUBJECT_FIELDS, apply: apply_subject },
    FormDef { kind: FormKind::AddExam, title: "Add Exam", fields: EXAM_ADD_FIELDS, apply: apply_add_exam },
    FormDef { kind: FormKind::EditExam, title: "Edit Exam", fields: EXAM_EDIT_FIELDS, apply: apply_edit_exam },
    FormDef { kind: FormKind::AddProject, title: "Add Project", fields: PROJECT_FIELDS, apply: apply_project },
    FormDef { kind: FormKind::EditProject, title: "Edit Project", fields: PROJECT_FIELDS, apply: apply_project },
    FormDef { kind: FormKind::AddTodo, title: "Add Todo", fields: TODO_FIELDS, apply: apply_todo },
    FormDef { kind: FormKind::EditTodo, title: "Edit Todo", fields: TODO_FIELDS, apply: apply_todo },
    FormDef { kind: FormKind::EditLofiUrl, title: "Edit Lofi Playlist", fields: LOFI_URL_FIELDS, apply: apply_lofi_url },
];

pub fn form_def(kind: FormKind) -> &'static FormDef {
    FORM_DEFS
        .iter()
        .find(|def| def.kind == kind)
        .expect("every form kind is registered")
}

// ── commit handlers ───────────────────────────────────────────────────────────

fn apply_subject(
    state: &mut AppState,
    values: &[String],
    target: Option<EditTarget>,
) -> Result<Vec<Task>, String> {
    let (code, name) = (&values[0], &values[1]);
    if code.is_empty() || name.is_empty() {
        return Err("code and name are required".to_string());
    }
    match target {
        None => {
            state.subjects.push(Subject {
                code: code.clone(),
                name: name.clone(),
                exams: Vec::new(),
            });
            state.selected_subject = state.subjects.len() - 1;
            state.refresh_exam_filter();
        }
        Some(EditTarget::Subject(idx)) => {
            if let Some(subject) = state.subjects.get_mut(idx) {
                subject.code = code.clone();
                subject.name = name.clone();
            }
        }
        Some(_) => {}
    }
    Ok(Vec::new())
}

fn apply_add_exam(
    state: &mut AppState,
    values: &[String],
    _target: Option<EditTarget>,
) -> Result<Vec<Task>, String> {
    let (code, name, date, retakes_raw, priority) =
        (&values[0], &values[1], &values[2], &values[3], &values[4]);
    if code.is_empty() || name.is_empty() || date.is_empty() {
        return Err("subject, exam name, and date are required".to_string());
    }
    let date = parse_date_field(date, "date must be DD/MM/YYYY")?;
    let idx = Subject::find_by_code(&state.subjects, code)
        .ok_or_else(|| "subject code not found".to_string())?;
    let retakes = parse_retakes(retakes_raw)?;

    state.subjects[idx].exams.push(Exam {
        name: name.clone(),
        date,
        retakes,
        priority: priority.to_uppercase(),
    });
    state.selected_subject = idx;
    state.exam_cursor = Some(state.subjects[idx].exams.len() - 1);
    state.refresh_exam_filter();
    Ok(Vec::new())
}

fn apply_edit_exam(
    state: &mut AppState,
    values: &[String],
    target: Option<EditTarget>,
) -> Result<Vec<Task>, String> {
    let Some(EditTarget::Exam { subject, exam }) = target else {
        return Ok(Vec::new());
    };
    let (name, date, retakes_raw, priority) = (&values[0], &values[1], &values[2], &values[3]);
    if name.is_empty() || date.is_empty() {
        return Err("exam name and date are required".to_string());
    }
    let date = parse_date_field(date, "date must be DD/MM/YYYY")?;
    let retakes = parse_retakes(retakes_raw)?;

    let Some(slot) = state
        .subjects
        .get_mut(subject)
        .and_then(|s| s.exams.get_mut(exam))
    else {
        return Ok(Vec::new());
    };
    slot.name = name.clone();
    slot.date = date;
    slot.retakes = retakes;
    slot.priority = priority.to_uppercase();
    state.exam_cursor = Some(exam);
    state.refresh_exam_filter();
    Ok(Vec::new())
}

fn apply_project(
    state: &mut AppState,
    values: &[String],
    target: Option<EditTarget>,
) -> Result<Vec<Task>, String> {
    let (name, subject, deadline, status) = (&values[0], &values[1], &values[2], &values[3]);
    if name.is_empty() || subject.is_empty() || deadline.is_empty() {
        return Err("name, subject, and deadline are required".to_string());
    }
    let due = parse_date_field(deadline, "deadline must be DD/MM/YYYY")?;
    let status = if status.is_empty() {
        PROJECT_STATUS_NOT_STARTED.to_string()
    } else {
        status.to_uppercase()
    };

    match target {
        None => {
            state.projects.push(Project {
                name: name.clone(),
                subject: subject.clone(),
                due,
                status,
            });
            state.project_cursor = state.projects.len() - 1;
        }
        Some(EditTarget::Project(idx)) => {
            if let Some(project) = state.projects.get_mut(idx) {
                project.name = name.clone();
                project.subject = subject.clone();
                project.due = due;
                project.status = status;
                state.project_cursor = idx;
            }
        }
        Some(_) => {}
    }
    Ok(Vec::new())
}

fn apply_todo(
    state: &mut AppState,
    values: &[String],
    target: Option<EditTarget>,
) -> Result<Vec<Task>, String> {
    let (text, due) = (&values[0], &values[1]);
    if text.is_empty() {
        return Err("task is required".to_string());
    }
    if due.is_empty() {
        return Err("due date is required".to_string());
    }
    let due = parse_date_field(due, "due date must be DD/MM/YYYY")?;

    match target {
        None => {
            state.todos.push(TodoItem {
                text: text.clone(),
                done: false,
                due,
            });
            state.todo_cursor = Some(state.todos.len() - 1);
        }
        Some(EditTarget::Todo(idx)) => {
            if let Some(todo) = state.todos.get_mut(idx) {
                todo.text = text.clone();
                todo.due = due;
            }
        }
        Some(_) => {}
    }
    state.refresh_todo_filter();
    Ok(Vec::new())
}

fn apply_lofi_url(
    state: &mut AppState,
    values: &[String],
    _target: Option<EditTarget>,
) -> Result<Vec<Task>, String> {
    let url = &values[0];
    if url.is_empty() {
        return Err("playlist URL is required".to_string());
    }
    Ok(state.lofi.set_url(url.clone()))
}

// ── field parsing helpers ─────────────────────────────────────────────────────

/// Validate a strict date and normalize it to canonical `DD/MM/YYYY`.
fn parse_date_field(value: &str, message: &str) -> Result<String, String> {
    dates::parse_strict_date(value)
        .map(dates::format_date)
        .ok_or_else(|| message.to_string())
}

fn parse_retakes(raw: &str) -> Result<Vec<String>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            dates::parse_strict_date(part)
                .map(dates::format_date)
                .ok_or_else(|| "retakes must be DD/MM/YYYY".to_string())
        })
        .collect()
}

/// Format a stored date back into the entry format for an edit form; values
/// that never parsed are passed through untouched so the user can fix them.
pub fn format_date_for_input(value: &str) -> String {
    match dates::parse_exam_date(value) {
        Some(date) => dates::format_date(date),
        None => value.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_subject() -> AppState {
        let mut state = AppState::default();
        state.subjects.push(Subject {
            code: "CS101".into(),
            name: "Intro".into(),
            exams: Vec::new(),
        });
        state
    }

    fn vals(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn every_kind_has_a_registry_row() {
        for kind in [
            FormKind::AddSubject,
            FormKind::AddExam,
            FormKind::AddProject,
            FormKind::AddTodo,
            FormKind::EditSubject,
            FormKind::EditExam,
            FormKind::EditProject,
            FormKind::EditTodo,
            FormKind::EditLofiUrl,
        ] {
            assert_eq!(form_def(kind).kind, kind);
        }
    }

    #[test]
    fn add_exam_requires_known_subject_code() {
        let mut state = state_with_subject();
        let err = apply_add_exam(
            &mut state,
            &vals(&["NOPE", "Midterm", "17/03/2026", "", ""]),
            None,
        )
        .unwrap_err();
        assert_eq!(err, "subject code not found");

        // Case-insensitive match succeeds and normalizes priority.
        apply_add_exam(
            &mut state,
            &vals(&["cs101", "Midterm", "17/03/2026", "", "high"]),
            None,
        )
        .unwrap();
        assert_eq!(state.subjects[0].exams[0].priority, "HIGH");
        assert_eq!(state.exam_cursor, Some(0));
    }

    #[test]
    fn add_exam_rejects_bad_dates_and_retakes() {
        let mut state = state_with_subject();
        let err = apply_add_exam(
            &mut state,
            &vals(&["CS101", "Midterm", "soon", "", ""]),
            None,
        )
        .unwrap_err();
        assert_eq!(err, "date must be DD/MM/YYYY");

        let err = apply_add_exam(
            &mut state,
            &vals(&["CS101", "Midterm", "17/03/2026", "01/04/2026, whenever", ""]),
            None,
        )
        .unwrap_err();
        assert_eq!(err, "retakes must be DD/MM/YYYY");
        assert!(state.subjects[0].exams.is_empty());
    }

    #[test]
    fn project_status_defaults_and_uppercases() {
        let mut state = AppState::default();
        apply_project(&mut state, &vals(&["Site", "CS101", "17/03/2026", ""]), None).unwrap();
        assert_eq!(state.projects[0].status, PROJECT_STATUS_NOT_STARTED);

        apply_project(
            &mut state,
            &vals(&["Site", "CS101", "17/03/2026", "in progress"]),
            Some(EditTarget::Project(0)),
        )
        .unwrap();
        assert_eq!(state.projects[0].status, "IN PROGRESS");
    }

    #[test]
    fn todo_commit_positions_cursor_and_refilters() {
        let mut state = AppState::default();
        let due = cram_core::dates::format_date(state.week_start);
        apply_todo(&mut state, &vals(&["read ch. 4", &due]), None).unwrap();
        assert_eq!(state.todo_cursor, Some(0));
        assert_eq!(state.todo_visible, vec![0]);
    }

    #[test]
    fn lofi_url_required() {
        let mut state = AppState::default();
        assert!(apply_lofi_url(&mut state, &vals(&[""]), None).is_err());
        apply_lofi_url(&mut state, &vals(&["https://x"]), None).unwrap();
        assert_eq!(state.lofi.url, "https://x");
        // A pending reload was queued for after the modal closes.
        assert_eq!(state.lofi.consume_reload().len(), 1);
    }

    #[test]
    fn format_date_for_input_normalizes_or_passes_through() {
        assert_eq!(format_date_for_input("17/03/2026 14:30"), "17/03/2026");
        assert_eq!(format_date_for_input(" garbled "), "garbled");
    }
}
