//! Grade record migration.
//!
//! Older dashboards stored a single `semester` label instead of `year` and
//! `session`, and some recorded grades on a different maximum scale. Every
//! stored or imported record passes through [`canonicalize_grade`] once, so
//! the rest of the crate only ever sees the canonical [`GradeRecord`].

use crate::error::{Error, Result};
use crate::models::{GradeRecord, GradingScale};
use serde_json::Value;
use tracing::debug;

/// Canonicalize a list of stored records, failing on the first bad one.
pub fn canonicalize_grades(values: &[Value], scale: &GradingScale) -> Result<Vec<GradeRecord>> {
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            canonicalize_grade(value, scale)
                .map_err(|e| Error::invalid(format!("record {}: {}", i + 1, e)))
        })
        .collect()
}

/// Convert any known record shape into a [`GradeRecord`].
pub fn canonicalize_grade(value: &Value, scale: &GradingScale) -> Result<GradeRecord> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::invalid("record is not an object"))?;

    let id = object
        .get("id")
        .and_then(integer_field)
        .ok_or_else(|| Error::invalid("missing or non-numeric id"))?;

    let course_name = object
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::invalid("missing course name"))?
        .to_string();

    let mut grade_point = object
        .get("grade")
        .and_then(number_field)
        .ok_or_else(|| Error::invalid("missing or non-numeric grade"))?;

    let credits = match object.get("credits") {
        None | Some(Value::Null) => 0.0,
        Some(v) => number_field(v).ok_or_else(|| Error::invalid("non-numeric credits"))?,
    };

    if let Some(record_scale) = object.get("scale").and_then(number_field) {
        if record_scale > 0.0 && record_scale != scale.max_point {
            debug!(
                "Rescaling {} from a {} scale to {}",
                course_name, record_scale, scale.max_point
            );
            grade_point = grade_point * scale.max_point / record_scale;
        }
    }

    let year = object.get("year").and_then(Value::as_str);
    let session = object.get("session").and_then(Value::as_str);
    let (year, session) = match (year, session, object.get("semester").and_then(Value::as_str)) {
        (None, None, Some(semester)) => split_semester(semester),
        (year, session, _) => (
            year.unwrap_or_default().to_string(),
            session.unwrap_or_default().to_string(),
        ),
    };

    Ok(GradeRecord {
        id,
        course_name,
        grade_point,
        credits,
        year,
        session,
    })
}

/// Split a legacy semester label into (year, session).
///
/// "Year 2 1st Semester" → ("Year 2", "1st Semester"),
/// "Fall 2023" → ("2023", "Fall"), "Year 1, Harmattan" → ("Year 1", "Harmattan").
/// Labels that fit none of these become the year with an empty session.
pub fn split_semester(label: &str) -> (String, String) {
    let label = label.trim();

    if let Some((year, session)) = label.split_once(',').or_else(|| label.split_once(" - ")) {
        return (year.trim().to_string(), session.trim().to_string());
    }

    let tokens: Vec<&str> = label.split_whitespace().collect();

    if tokens.len() >= 3 && tokens[0].eq_ignore_ascii_case("year") {
        return (tokens[..2].join(" "), tokens[2..].join(" "));
    }

    if let Some((last, rest)) = tokens.split_last() {
        let looks_like_year = last.chars().next().is_some_and(|c| c.is_ascii_digit())
            && last.chars().all(|c| c.is_ascii_digit() || c == '/');
        if looks_like_year && !rest.is_empty() {
            return (last.to_string(), rest.join(" "));
        }
    }

    (label.to_string(), String::new())
}

fn number_field(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|n: &f64| n.is_finite())
}

fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
