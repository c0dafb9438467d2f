//! Weekly class timetable.

use crate::error::{Error, Result};
use crate::planner::{check_min_len, finish, remove_by_id};
use crate::store::allocate_id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Teaching days.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    pub fn full_name(&self) -> &'static str {
        match self {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Period {
    #[value(name = "AM", alias = "am")]
    Am,
    #[value(name = "PM", alias = "pm")]
    Pm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub id: i64,
    pub name: String,
    pub day: Weekday,
    /// 24-hour `HH:MM`.
    pub time: String,
    pub location: String,
}

/// A class as entered on a 12-hour clock.
#[derive(Debug, Clone)]
pub struct ClassDraft {
    pub name: String,
    pub day: Weekday,
    pub hour: u8,
    pub minute: u8,
    pub period: Period,
    pub location: Option<String>,
}

impl ClassDraft {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        check_min_len(&mut problems, "class name", &self.name, 2);
        if !(1..=12).contains(&self.hour) {
            problems.push("hour must be between 1 and 12".to_string());
        }
        if self.minute > 59 {
            problems.push("minute must be between 0 and 59".to_string());
        }
        finish(problems)
    }

    /// The start time on a 24-hour clock.
    pub fn time_24h(&self) -> String {
        let hour = match (self.period, self.hour) {
            (Period::Am, 12) => 0,
            (Period::Am, h) => h,
            (Period::Pm, 12) => 12,
            (Period::Pm, h) => h + 12,
        };
        format!("{:02}:{:02}", hour, self.minute)
    }
}

/// Parse `H:MM` on a 12-hour clock into (hour, minute).
pub fn parse_clock(input: &str) -> Result<(u8, u8)> {
    let parsed = input.trim().split_once(':').and_then(|(h, m)| {
        let minute_ok = m.len() == 2;
        Some((h.parse::<u8>().ok()?, m.parse::<u8>().ok()?)).filter(|_| minute_ok)
    });
    parsed.ok_or_else(|| Error::invalid(format!("'{}' is not a time (expected H:MM)", input)))
}

pub fn add_class(classes: &mut Vec<ClassEntry>, draft: ClassDraft) -> Result<ClassEntry> {
    draft.validate()?;
    let location = draft
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("N/A")
        .to_string();

    let entry = ClassEntry {
        id: allocate_id(classes.iter().map(|c| c.id)),
        name: draft.name.trim().to_string(),
        day: draft.day,
        time: draft.time_24h(),
        location,
    };
    classes.push(entry.clone());
    Ok(entry)
}

pub fn remove_class(classes: &mut Vec<ClassEntry>, id: i64) -> Result<ClassEntry> {
    remove_by_id(classes, id, |c| c.id, "class")
}

/// Classes per weekday, Monday first, each day sorted by start time.
/// Days without classes are left out.
pub fn group_by_day(classes: &[ClassEntry]) -> Vec<(Weekday, Vec<&ClassEntry>)> {
    Weekday::ALL
        .iter()
        .filter_map(|day| {
            let mut entries: Vec<&ClassEntry> = classes.iter().filter(|c| c.day == *day).collect();
            if entries.is_empty() {
                return None;
            }
            entries.sort_by(|a, b| a.time.cmp(&b.time));
            Some((*day, entries))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, day: Weekday, hour: u8, minute: u8, period: Period) -> ClassDraft {
        ClassDraft {
            name: name.to_string(),
            day,
            hour,
            minute,
            period,
            location: None,
        }
    }

    #[test]
    fn test_twelve_hour_conversion() {
        assert_eq!(draft("Bio", Weekday::Mon, 12, 0, Period::Am).time_24h(), "00:00");
        assert_eq!(draft("Bio", Weekday::Mon, 12, 30, Period::Pm).time_24h(), "12:30");
        assert_eq!(draft("Bio", Weekday::Mon, 9, 5, Period::Am).time_24h(), "09:05");
        assert_eq!(draft("Bio", Weekday::Mon, 3, 15, Period::Pm).time_24h(), "15:15");
    }

    #[test]
    fn test_location_defaults() {
        let mut classes = Vec::new();
        let entry = add_class(&mut classes, draft("Biology", Weekday::Tue, 9, 0, Period::Am)).unwrap();
        assert_eq!(entry.location, "N/A");
    }

    #[test]
    fn test_validation() {
        let mut classes = Vec::new();
        let bad = draft("B", Weekday::Tue, 13, 75, Period::Am);
        match add_class(&mut classes, bad) {
            Err(Error::Validation(problems)) => assert_eq!(problems.len(), 3),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_group_by_day() {
        let mut classes = Vec::new();
        add_class(&mut classes, draft("Physics", Weekday::Wed, 2, 0, Period::Pm)).unwrap();
        add_class(&mut classes, draft("Biology", Weekday::Mon, 11, 0, Period::Am)).unwrap();
        add_class(&mut classes, draft("Algebra", Weekday::Wed, 8, 0, Period::Am)).unwrap();

        let grouped = group_by_day(&classes);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].0, Weekday::Mon);
        let wednesday: Vec<&str> = grouped[1].1.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(wednesday, vec!["Algebra", "Physics"]);
    }

    #[test]
    fn test_parse_clock() {
        assert_eq!(parse_clock("9:05").unwrap(), (9, 5));
        assert_eq!(parse_clock("12:30").unwrap(), (12, 30));
        assert!(parse_clock("9").is_err());
        assert!(parse_clock("9:5").is_err());
    }

    #[test]
    fn test_weekday_serializes_short_name() {
        assert_eq!(serde_json::to_string(&Weekday::Thu).unwrap(), "\"Thu\"");
    }
}
