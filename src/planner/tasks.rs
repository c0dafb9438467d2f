//! Task manager.

use crate::error::{Error, Result};
use crate::planner::{check_min_len, finish, remove_by_id};
use crate::store::allocate_id;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Urgent,
    Intermediate,
    Later,
}

impl TaskPriority {
    pub fn label(&self) -> &'static str {
        match self {
            TaskPriority::Urgent => "Urgent",
            TaskPriority::Intermediate => "Intermediate",
            TaskPriority::Later => "Later",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
    pub is_completed: bool,
}

/// A task as submitted.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub priority: TaskPriority,
    pub due_date: DateTime<Utc>,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        check_min_len(&mut problems, "task title", &self.title, 3);
        finish(problems)
    }
}

/// Validate and append a task.
pub fn add_task(tasks: &mut Vec<Task>, draft: TaskDraft) -> Result<&Task> {
    draft.validate()?;
    let id = allocate_id(tasks.iter().map(|t| t.id));
    tasks.push(Task {
        id,
        title: draft.title.trim().to_string(),
        priority: draft.priority,
        due_date: draft.due_date,
        is_completed: false,
    });
    Ok(&tasks[tasks.len() - 1])
}

pub fn set_completed(tasks: &mut [Task], id: i64, completed: bool) -> Result<&Task> {
    let task = tasks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| Error::NotFound(format!("no task with id {}", id)))?;
    task.is_completed = completed;
    Ok(task)
}

pub fn remove_task(tasks: &mut Vec<Task>, id: i64) -> Result<Task> {
    remove_by_id(tasks, id, |t| t.id, "task")
}

/// Tasks by priority, earliest due first within a priority.
pub fn sorted_tasks(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.due_date.cmp(&b.due_date))
    });
    sorted
}

/// Time left until `due`, as shown next to each task.
pub fn countdown(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let remaining = due - now;
    if remaining <= Duration::zero() {
        return "OVERDUE".to_string();
    }

    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;

    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect();

    if parts.is_empty() {
        "Due Soon!".to_string()
    } else {
        format!("Countdown: {}", parts.join(" "))
    }
}

/// Parse a due date: RFC 3339, `YYYY-MM-DDTHH:MM`, `YYYY-MM-DD HH:MM`, or a
/// bare date (midnight). Times without an offset are taken as UTC.
pub fn parse_due_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Ok(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(Error::invalid(format!(
        "due date '{}' is not a date (expected YYYY-MM-DD or YYYY-MM-DDTHH:MM)",
        input
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, minute, 0).unwrap()
    }

    fn task(id: i64, priority: TaskPriority, due: DateTime<Utc>) -> Task {
        Task {
            id,
            title: format!("Task {}", id),
            priority,
            due_date: due,
            is_completed: false,
        }
    }

    #[test]
    fn test_sorted_by_priority_then_due_date() {
        let tasks = vec![
            task(1, TaskPriority::Later, at(1, 0, 0)),
            task(2, TaskPriority::Urgent, at(5, 0, 0)),
            task(3, TaskPriority::Urgent, at(2, 0, 0)),
            task(4, TaskPriority::Intermediate, at(1, 0, 0)),
        ];
        let ids: Vec<i64> = sorted_tasks(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 4, 1]);
    }

    #[test]
    fn test_countdown_labels() {
        let now = at(1, 12, 0);
        assert_eq!(countdown(at(1, 11, 0), now), "OVERDUE");
        assert_eq!(countdown(now, now), "OVERDUE");
        assert_eq!(countdown(now + Duration::seconds(30), now), "Due Soon!");
        assert_eq!(countdown(at(3, 15, 30), now), "Countdown: 2d 3h 30m");
        assert_eq!(countdown(at(2, 12, 0), now), "Countdown: 1d");
        assert_eq!(countdown(at(1, 12, 45), now), "Countdown: 45m");
    }

    #[test]
    fn test_add_task_validates_title() {
        let mut tasks = Vec::new();
        let draft = TaskDraft {
            title: "ab".to_string(),
            priority: TaskPriority::Urgent,
            due_date: at(1, 0, 0),
        };
        assert!(matches!(add_task(&mut tasks, draft), Err(Error::Validation(_))));

        let draft = TaskDraft {
            title: "Essay draft".to_string(),
            priority: TaskPriority::Later,
            due_date: at(1, 0, 0),
        };
        let added = add_task(&mut tasks, draft).unwrap();
        assert!(!added.is_completed);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_complete_and_remove() {
        let mut tasks = vec![task(1, TaskPriority::Urgent, at(1, 0, 0))];
        assert!(set_completed(&mut tasks, 1, true).unwrap().is_completed);
        assert!(matches!(set_completed(&mut tasks, 9, true), Err(Error::NotFound(_))));
        remove_task(&mut tasks, 1).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_parse_due_date() {
        assert_eq!(parse_due_date("2026-03-01").unwrap(), at(1, 0, 0));
        assert_eq!(parse_due_date("2026-03-01T09:30").unwrap(), at(1, 9, 30));
        assert_eq!(parse_due_date("2026-03-01 09:30").unwrap(), at(1, 9, 30));
        assert_eq!(parse_due_date("2026-03-01T10:30:00+01:00").unwrap(), at(1, 9, 30));
        assert!(parse_due_date("next friday").is_err());
    }
}
