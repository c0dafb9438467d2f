//! Study session planner.

use crate::error::Result;
use crate::planner::{check_min_len, finish, remove_by_id};
use crate::store::allocate_id;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A planned study block. `date` is `YYYY-MM-DD`, `time` is `HH:MM`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub id: i64,
    pub topic: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct StudyDraft {
    pub topic: String,
    pub starts_at: NaiveDateTime,
    pub notes: Option<String>,
}

impl StudyDraft {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        check_min_len(&mut problems, "topic", &self.topic, 3);
        finish(problems)
    }
}

/// Validate and insert a session, keeping the list in date and time order.
pub fn add_session(sessions: &mut Vec<StudySession>, draft: StudyDraft) -> Result<StudySession> {
    draft.validate()?;
    let session = StudySession {
        id: allocate_id(sessions.iter().map(|s| s.id)),
        topic: draft.topic.trim().to_string(),
        date: draft.starts_at.format("%Y-%m-%d").to_string(),
        time: draft.starts_at.format("%H:%M").to_string(),
        notes: draft.notes.unwrap_or_default().trim().to_string(),
    };
    sessions.push(session.clone());
    sort_sessions(sessions);
    Ok(session)
}

pub fn remove_session(sessions: &mut Vec<StudySession>, id: i64) -> Result<StudySession> {
    remove_by_id(sessions, id, |s| s.id, "study session")
}

/// Zero-padded dates and times sort chronologically as text.
pub fn sort_sessions(sessions: &mut [StudySession]) {
    sessions.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time)));
}

/// Parse `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD HH:MM`.
pub fn parse_start(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .ok_or_else(|| {
            crate::error::Error::invalid(format!(
                "'{}' is not a date and time (expected YYYY-MM-DDTHH:MM)",
                input
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn draft(topic: &str, when: &str) -> StudyDraft {
        StudyDraft {
            topic: topic.to_string(),
            starts_at: parse_start(when).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_sessions_stay_sorted() {
        let mut sessions = Vec::new();
        add_session(&mut sessions, draft("Organic chemistry", "2026-03-02T14:00")).unwrap();
        add_session(&mut sessions, draft("Linear algebra", "2026-03-01T18:00")).unwrap();
        add_session(&mut sessions, draft("Statistics", "2026-03-02T09:00")).unwrap();

        let topics: Vec<&str> = sessions.iter().map(|s| s.topic.as_str()).collect();
        assert_eq!(topics, vec!["Linear algebra", "Statistics", "Organic chemistry"]);
        assert_eq!(sessions[0].date, "2026-03-01");
        assert_eq!(sessions[0].time, "18:00");
    }

    #[test]
    fn test_short_topic_rejected() {
        let mut sessions = Vec::new();
        assert!(matches!(
            add_session(&mut sessions, draft("AI", "2026-03-01T10:00")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_remove_session() {
        let mut sessions = Vec::new();
        let id = add_session(&mut sessions, draft("Statistics", "2026-03-01T10:00"))
            .unwrap()
            .id;
        remove_session(&mut sessions, id).unwrap();
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_parse_start_rejects_date_only() {
        assert!(parse_start("2026-03-01").is_err());
        assert!(parse_start("2026-03-01 07:15").is_ok());
    }
}
