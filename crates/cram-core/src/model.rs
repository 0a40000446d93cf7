use serde::{Deserialize, Serialize};

/// A course the user is enrolled in.  Exams belong to their subject.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Subject {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub exams: Vec<Exam>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Exam {
    pub name: String,
    /// `DD/MM/YYYY`, optionally with ` HH:MM`.  Kept as entered; parsing
    /// happens at filter/render time so a bad legacy value never blocks load.
    pub date: String,
    #[serde(default)]
    pub retakes: Vec<String>,
    #[serde(default)]
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Project {
    pub name: String,
    pub subject: String,
    pub due: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TodoItem {
    pub text: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub due: String,
}

/// One entry of the lofi playlist as reported by the metadata fetcher.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LofiTrack {
    pub title: String,
    #[serde(default)]
    pub note: String,
}

pub const PRIORITY_HIGH: &str = "HIGH";
pub const PRIORITY_MED: &str = "MED";
pub const PRIORITY_LOW: &str = "LOW";

pub const PROJECT_STATUS_NOT_STARTED: &str = "NOT STARTED";
pub const PROJECT_STATUS_IN_PROGRESS: &str = "IN PROGRESS";
pub const PROJECT_STATUS_DONE: &str = "DONE";

impl Subject {
    /// Case-insensitive lookup of a subject position by its code.
    pub fn find_by_code(subjects: &[Subject], code: &str) -> Option<usize> {
        let code = code.trim().to_uppercase();
        subjects
            .iter()
            .position(|s| s.code.to_uppercase() == code)
    }
}
