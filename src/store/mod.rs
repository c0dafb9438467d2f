//! Persistent dashboard state.
//!
//! State lives in a flat key-value store whose values are JSON documents,
//! the same layout the browser dashboard kept in local storage. The store
//! is injected; the analysis engine never sees it.

pub mod json_file;
#[cfg(test)]
pub mod memory;
pub mod migrate;

pub use json_file::JsonFileStore;
#[cfg(test)]
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use crate::models::{GradeRecord, GradingScale};
use crate::planner::{ClassEntry, Screen, StudySession, Task, UserProfile};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

pub const GRADES_KEY: &str = "grades";
pub const TASKS_KEY: &str = "tasks";
pub const USER_KEY: &str = "user";
pub const SCREEN_KEY: &str = "activeScreen";
pub const STUDY_SESSIONS_KEY: &str = "studySessions";
pub const CLASSES_KEY: &str = "classes";

/// String-valued key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: String) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Drop every key.
    fn clear(&mut self) -> Result<()>;

    /// Persist pending writes. Stores that write through can ignore this.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Everything the dashboard persists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub grades: Vec<GradeRecord>,
    pub tasks: Vec<Task>,
    pub study_sessions: Vec<StudySession>,
    pub classes: Vec<ClassEntry>,
    pub user: Option<UserProfile>,
    pub active_screen: Screen,
}

/// Read the dashboard state, migrating legacy grade records on the way in.
pub fn load_state<S: KeyValueStore + ?Sized>(store: &S, scale: &GradingScale) -> Result<DashboardState> {
    let grades = match store.get(GRADES_KEY)? {
        Some(raw) => {
            let values: Vec<Value> = parse_entry(GRADES_KEY, &raw)?;
            migrate::canonicalize_grades(&values, scale)
                .map_err(|e| Error::Store(format!("stored grades are unreadable: {}", e)))?
        }
        None => Vec::new(),
    };

    let state = DashboardState {
        grades,
        tasks: load_entry(store, TASKS_KEY)?.unwrap_or_default(),
        study_sessions: load_entry(store, STUDY_SESSIONS_KEY)?.unwrap_or_default(),
        classes: load_entry(store, CLASSES_KEY)?.unwrap_or_default(),
        user: load_entry(store, USER_KEY)?,
        active_screen: load_entry(store, SCREEN_KEY)?.unwrap_or_default(),
    };

    debug!(
        "Loaded {} grades, {} tasks, {} study sessions, {} classes",
        state.grades.len(),
        state.tasks.len(),
        state.study_sessions.len(),
        state.classes.len()
    );

    Ok(state)
}

/// Write the full dashboard state and flush the store.
pub fn save_state<S: KeyValueStore + ?Sized>(store: &mut S, state: &DashboardState) -> Result<()> {
    save_entry(store, GRADES_KEY, &state.grades)?;
    save_entry(store, TASKS_KEY, &state.tasks)?;
    save_entry(store, STUDY_SESSIONS_KEY, &state.study_sessions)?;
    save_entry(store, CLASSES_KEY, &state.classes)?;
    save_entry(store, SCREEN_KEY, &state.active_screen)?;

    match &state.user {
        Some(user) => save_entry(store, USER_KEY, user)?,
        None => store.remove(USER_KEY)?,
    }

    store.flush()
}

fn load_entry<S, T>(store: &S, key: &str) -> Result<Option<T>>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    store
        .get(key)?
        .map(|raw| parse_entry(key, &raw))
        .transpose()
}

fn parse_entry<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::Store(format!("stored {} are unreadable: {}", key, e)))
}

fn save_entry<S, T>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    store.set(key, serde_json::to_string(value)?)
}

/// Allocate a record id: the current time in milliseconds, bumped past any
/// existing id so that ids stay unique within a collection.
pub fn allocate_id<I: IntoIterator<Item = i64>>(existing: I) -> i64 {
    allocate_id_at(existing, Utc::now().timestamp_millis())
}

pub fn allocate_id_at<I: IntoIterator<Item = i64>>(existing: I, now_millis: i64) -> i64 {
    match existing.into_iter().max() {
        Some(max) if max >= now_millis => max + 1,
        _ => now_millis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::TaskPriority;
    use chrono::TimeZone;

    fn sample_state() -> DashboardState {
        DashboardState {
            grades: vec![GradeRecord {
                id: 1,
                course_name: "Biology".to_string(),
                grade_point: 4.0,
                credits: 3.0,
                year: "Year 1".to_string(),
                session: "1st Semester".to_string(),
            }],
            tasks: vec![Task {
                id: 2,
                title: "Lab report".to_string(),
                priority: TaskPriority::Urgent,
                due_date: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                is_completed: false,
            }],
            user: Some(UserProfile {
                name: "Ada".to_string(),
                university: "State University".to_string(),
                faculty: "Science".to_string(),
                department: "Biology".to_string(),
                year: "Year 1".to_string(),
            }),
            active_screen: Screen::AiTools,
            ..DashboardState::default()
        }
    }

    #[test]
    fn test_state_round_trip_through_store() {
        let mut store = MemoryStore::new();
        let state = sample_state();

        save_state(&mut store, &state).unwrap();
        let loaded = load_state(&store, &GradingScale::five_point()).unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn test_layout_uses_dashboard_keys() {
        let mut store = MemoryStore::new();
        save_state(&mut store, &sample_state()).unwrap();

        let screen = store.get(SCREEN_KEY).unwrap();
        assert_eq!(screen.as_deref(), Some("\"ai-tools\""));

        let tasks = store.get(TASKS_KEY).unwrap().unwrap();
        assert!(tasks.contains("\"isCompleted\":false"));
        assert!(tasks.contains("\"dueDate\""));

        let grades = store.get(GRADES_KEY).unwrap().unwrap();
        assert!(grades.contains("\"name\":\"Biology\""));
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = MemoryStore::new();
        let state = load_state(&store, &GradingScale::five_point()).unwrap();
        assert_eq!(state, DashboardState::default());
        assert_eq!(state.active_screen, Screen::Performance);
    }

    #[test]
    fn test_clearing_user_removes_key() {
        let mut store = MemoryStore::new();
        let mut state = sample_state();
        save_state(&mut store, &state).unwrap();

        state.user = None;
        save_state(&mut store, &state).unwrap();
        assert_eq!(store.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_entry_is_store_error() {
        let mut store = MemoryStore::new();
        store.set(TASKS_KEY, "{not json".to_string()).unwrap();
        let err = load_state(&store, &GradingScale::five_point()).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[test]
    fn test_legacy_grades_are_migrated_on_load() {
        let mut store = MemoryStore::new();
        store
            .set(
                GRADES_KEY,
                r#"[{"id":7,"name":"Algebra","grade":3,"credits":2,"semester":"Year 2 1st Semester"}]"#
                    .to_string(),
            )
            .unwrap();

        let state = load_state(&store, &GradingScale::five_point()).unwrap();
        assert_eq!(state.grades[0].year, "Year 2");
        assert_eq!(state.grades[0].session, "1st Semester");
    }

    #[test]
    fn test_allocate_id() {
        assert_eq!(allocate_id_at(Vec::new(), 1_000), 1_000);
        assert_eq!(allocate_id_at(vec![5, 9], 1_000), 1_000);
        assert_eq!(allocate_id_at(vec![1_000, 3], 1_000), 1_001);
        assert_eq!(allocate_id_at(vec![2_000], 1_000), 2_001);
    }
}
