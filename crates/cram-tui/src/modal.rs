//! Modal state — the single overlay: closed, a form, or a confirmation.
//!
//! The engine drives the transitions; this module owns the data and the
//! focus/field mechanics.  Raw keystrokes reach field text only through
//! `FormModal::forward_key`.

use ratatui::crossterm::event::{Event, KeyEvent};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::forms::{form_def, EditTarget, FormKind};

/// A destructive operation waiting on the user's yes/no.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSubject(usize),
    DeleteProject(usize),
    DeleteTodo(usize),
    ClearAll,
}

#[derive(Debug)]
pub struct FormField {
    pub label: &'static str,
    pub required: bool,
    pub input: Input,
}

#[derive(Debug)]
pub struct FormModal {
    pub kind: FormKind,
    pub title: &'static str,
    pub hint: &'static str,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: String,
    pub target: Option<EditTarget>,
}

#[derive(Debug, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Editing(FormModal),
    Confirming {
        action: ConfirmAction,
        message: String,
    },
}

impl ModalState {
    /// Build a form modal from the capability table, focus on field 0.
    pub fn open_form(kind: FormKind, target: Option<EditTarget>, initial: &[String]) -> Self {
        let def = form_def(kind);
        let fields = def
            .fields
            .iter()
            .enumerate()
            .map(|(i, spec)| FormField {
                label: spec.label,
                required: spec.required,
                input: Input::new(initial.get(i).cloned().unwrap_or_default()),
            })
            .collect();
        ModalState::Editing(FormModal {
            kind,
            title: def.title,
            hint: "Tab to switch, Enter to save, Esc to cancel",
            fields,
            focus: 0,
            error: String::new(),
            target,
        })
    }

    pub fn confirm(action: ConfirmAction, message: String) -> Self {
        ModalState::Confirming { action, message }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ModalState::Closed)
    }
}

impl FormModal {
    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = self.focus.checked_sub(1).unwrap_or(self.fields.len() - 1);
        }
    }

    /// Commit is only legal from the last field; Enter elsewhere advances.
    pub fn on_last_field(&self) -> bool {
        self.focus + 1 == self.fields.len()
    }

    pub fn values(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.input.value().trim().to_string())
            .collect()
    }

    /// Route an unhandled keystroke into the focused field's editor.
    pub fn forward_key(&mut self, key: KeyEvent) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.input.handle_event(&Event::Key(key));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyCode;

    #[test]
    fn open_form_prefills_and_focuses_first() {
        let modal = ModalState::open_form(
            FormKind::EditSubject,
            Some(EditTarget::Subject(0)),
            &["CS101".to_string(), "Intro".to_string()],
        );
        let ModalState::Editing(form) = modal else {
            panic!("expected a form");
        };
        assert_eq!(form.focus, 0);
        assert_eq!(form.fields.len(), 2);
        assert_eq!(form.fields[0].input.value(), "CS101");
        assert_eq!(form.title, "Edit Subject");
    }

    #[test]
    fn focus_cycles_both_ways() {
        let ModalState::Editing(mut form) =
            ModalState::open_form(FormKind::AddTodo, None, &[])
        else {
            panic!("expected a form");
        };
        form.focus_next();
        assert!(form.on_last_field());
        form.focus_next();
        assert_eq!(form.focus, 0);
        form.focus_prev();
        assert!(form.on_last_field());
    }

    #[test]
    fn forwarded_keys_edit_the_focused_field_only() {
        let ModalState::Editing(mut form) =
            ModalState::open_form(FormKind::AddSubject, None, &[])
        else {
            panic!("expected a form");
        };
        form.forward_key(KeyEvent::from(KeyCode::Char('c')));
        form.forward_key(KeyEvent::from(KeyCode::Char('s')));
        form.focus_next();
        form.forward_key(KeyEvent::from(KeyCode::Char('x')));
        form.forward_key(KeyEvent::from(KeyCode::Backspace));
        let values = form.values();
        assert_eq!(values, vec!["cs".to_string(), String::new()]);
    }
}
