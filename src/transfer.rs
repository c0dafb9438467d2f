//! Grade import and export.
//!
//! Export writes the six-column CSV the dashboard has always produced.
//! Imports are all-or-nothing: a single bad element rejects the file and
//! the caller's state is left as it was.

use crate::error::{Error, Result};
use crate::models::{GradeRecord, GradingScale};
use crate::store::migrate;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const CSV_HEADER: &str = "id,name,grade,credits,year,session";

/// Fields a JSON import element must carry.
const REQUIRED_FIELDS: [&str; 3] = ["id", "name", "grade"];

/// Wrap a text field in quotes, doubling any inner quote.
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Render grades as CSV. Text fields are always quoted with inner quotes
/// doubled, even when they look numeric; numbers are written bare.
pub fn export_csv_string(records: &[GradeRecord]) -> Result<String> {
    if records.is_empty() {
        return Err(Error::invalid("no grades to export; add some grades first"));
    }

    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for record in records {
        writer.write_record([
            record.id.to_string(),
            quoted(&record.course_name),
            record.grade_point.to_string(),
            record.credits.to_string(),
            quoted(&record.year),
            quoted(&record.session),
        ])?;
    }

    let body = writer
        .into_inner()
        .map_err(|e| Error::Io(e.into_error()))?;
    let body = String::from_utf8_lossy(&body);

    Ok(format!("{}\n{}", CSV_HEADER, body.trim_end_matches('\n')))
}

/// Write the CSV export to `path`, returning the number of rows written.
pub fn export_csv(records: &[GradeRecord], path: &Path) -> Result<usize> {
    let content = export_csv_string(records)?;
    fs::write(path, content)?;
    info!("Exported {} grades to {}", records.len(), path.display());
    Ok(records.len())
}

/// Parse a JSON grade export.
///
/// The document must be an array of objects that each carry `id`, `name`
/// and `grade`. Accepted elements go through the same migration as stored
/// records.
pub fn import_json(content: &str, scale: &GradingScale) -> Result<Vec<GradeRecord>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| Error::Import(format!("not valid JSON: {}", e)))?;

    let Value::Array(elements) = document else {
        return Err(Error::Import("expected a JSON array of grades".to_string()));
    };

    for (i, element) in elements.iter().enumerate() {
        let has_required = element
            .as_object()
            .is_some_and(|object| REQUIRED_FIELDS.iter().all(|f| object.contains_key(*f)));
        if !has_required {
            return Err(Error::Import(format!(
                "element {} is not a grade record (needs {})",
                i + 1,
                REQUIRED_FIELDS.join(", ")
            )));
        }
    }

    migrate::canonicalize_grades(&elements, scale).map_err(|e| Error::Import(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    id: i64,
    name: String,
    grade: f64,
    #[serde(default)]
    credits: Option<f64>,
    #[serde(default)]
    year: String,
    #[serde(default)]
    session: String,
}

/// Parse a CSV file in the export format.
pub fn import_csv(content: &str) -> Result<Vec<GradeRecord>> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row.map_err(|e| Error::Import(format!("row {}: {}", i + 1, e)))?;
        if !row.grade.is_finite() {
            return Err(Error::Import(format!("row {}: grade is not a number", i + 1)));
        }
        records.push(GradeRecord {
            id: row.id,
            course_name: row.name,
            grade_point: row.grade,
            credits: row.credits.unwrap_or(0.0),
            year: row.year,
            session: row.session,
        });
    }

    debug!("Parsed {} CSV rows", records.len());
    Ok(records)
}

/// Import a file, choosing the format from its extension (`.csv`, else JSON).
pub fn import_file(path: &Path, scale: &GradingScale) -> Result<Vec<GradeRecord>> {
    let content = fs::read_to_string(path)?;
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let records = if is_csv {
        import_csv(&content)?
    } else {
        import_json(&content, scale)?
    };

    info!("Read {} grades from {}", records.len(), path.display());
    Ok(records)
}
