//! Planner features around the gradebook: tasks, study sessions, the class
//! timetable and the student profile.

pub mod profile;
pub mod schedule;
pub mod study;
pub mod tasks;

pub use profile::UserProfile;
pub use schedule::{ClassDraft, ClassEntry, Period, Weekday};
pub use study::{StudyDraft, StudySession};
pub use tasks::{Task, TaskDraft, TaskPriority};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The dashboard tab that was last open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Dashboard,
    #[default]
    Performance,
    AiTools,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Performance => "performance",
            Screen::AiTools => "ai-tools",
        }
    }
}

/// Remove the item whose id matches, or report that none does.
pub(crate) fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: i64,
    item_id: impl Fn(&T) -> i64,
    what: &str,
) -> Result<T> {
    let index = items
        .iter()
        .position(|item| item_id(item) == id)
        .ok_or_else(|| Error::NotFound(format!("no {} with id {}", what, id)))?;
    Ok(items.remove(index))
}

/// Require at least `min` characters after trimming.
pub(crate) fn check_min_len(problems: &mut Vec<String>, field: &str, value: &str, min: usize) {
    if value.trim().chars().count() < min {
        problems.push(format!("{} must be at least {} characters", field, min));
    }
}

pub(crate) fn finish(problems: Vec<String>) -> Result<()> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_names() {
        assert_eq!(serde_json::to_string(&Screen::AiTools).unwrap(), "\"ai-tools\"");
        let parsed: Screen = serde_json::from_str("\"dashboard\"").unwrap();
        assert_eq!(parsed, Screen::Dashboard);
        assert_eq!(Screen::default().as_str(), "performance");
    }

    #[test]
    fn test_remove_by_id() {
        let mut items = vec![1_i64, 2, 3];
        assert_eq!(remove_by_id(&mut items, 2, |i| *i, "item").unwrap(), 2);
        assert!(matches!(
            remove_by_id(&mut items, 2, |i| *i, "item"),
            Err(Error::NotFound(_))
        ));
    }
}
