//! The gradebook: validated mutations over the stored grade records.
//!
//! Records are created and deleted, never edited in place. Validation
//! happens here so the analysis engine can stay permissive.

use crate::error::{Error, Result};
use crate::models::{GradeRecord, GradingScale};
use crate::store::allocate_id;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Whether zero-credit courses may be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CreditPolicy {
    /// Credits must be at least 0.5.
    #[default]
    RequirePositive,
    /// Credits may be 0, e.g. for audited courses.
    AllowZero,
}

impl CreditPolicy {
    pub fn min_credits(&self) -> f64 {
        match self {
            CreditPolicy::RequirePositive => 0.5,
            CreditPolicy::AllowZero => 0.0,
        }
    }
}

/// A grade as submitted, before it gets an id.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeEntry {
    pub course_name: String,
    pub grade_point: f64,
    pub credits: f64,
    pub year: String,
    pub session: String,
}

impl GradeEntry {
    /// Check every field, reporting all failures at once.
    pub fn validate(&self, scale: &GradingScale, policy: CreditPolicy) -> Result<()> {
        let mut problems = Vec::new();

        if self.course_name.trim().chars().count() < 2 {
            problems.push("course name must be at least 2 characters".to_string());
        }
        if !scale.contains(self.grade_point) {
            problems.push(format!(
                "grade must be between 0.0 and {:.1}",
                scale.max_point
            ));
        }
        let min = policy.min_credits();
        if !self.credits.is_finite() || self.credits < min {
            problems.push(format!("credits must be at least {}", min));
        }
        if self.year.trim().is_empty() {
            problems.push("year is required".to_string());
        }
        if self.session.trim().is_empty() {
            problems.push("session is required".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems))
        }
    }

    fn into_record(self, id: i64) -> GradeRecord {
        GradeRecord {
            id,
            course_name: self.course_name.trim().to_string(),
            grade_point: self.grade_point,
            credits: self.credits,
            year: self.year.trim().to_string(),
            session: self.session.trim().to_string(),
        }
    }
}

/// Grade records plus the rules for changing them.
#[derive(Debug, Clone)]
pub struct Gradebook {
    records: Vec<GradeRecord>,
    scale: GradingScale,
    policy: CreditPolicy,
}

impl Gradebook {
    pub fn new(records: Vec<GradeRecord>, scale: GradingScale, policy: CreditPolicy) -> Self {
        Self {
            records,
            scale,
            policy,
        }
    }

    pub fn records(&self) -> &[GradeRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<GradeRecord> {
        self.records
    }

    /// Validate and append an entry, returning the stored record.
    pub fn add(&mut self, entry: GradeEntry) -> Result<&GradeRecord> {
        let id = allocate_id(self.records.iter().map(|r| r.id));
        self.add_with_id(entry, id)
    }

    /// Like [`Gradebook::add`] with a caller-chosen id.
    pub fn add_with_id(&mut self, entry: GradeEntry, id: i64) -> Result<&GradeRecord> {
        entry.validate(&self.scale, self.policy)?;
        if self.records.iter().any(|r| r.id == id) {
            return Err(Error::invalid(format!("grade id {} is already in use", id)));
        }

        let record = entry.into_record(id);
        info!(
            "Added {} ({} credits) to {}",
            record.course_name,
            record.credits,
            record.semester_key()
        );
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    /// Remove one record by id.
    pub fn remove(&mut self, id: i64) -> Result<GradeRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("no grade with id {}", id)))?;
        let removed = self.records.remove(index);
        debug!("Removed grade {} ({})", id, removed.course_name);
        Ok(removed)
    }

    /// Remove every record of one semester, returning how many went.
    pub fn remove_semester(&mut self, year: &str, session: &str) -> Result<usize> {
        let (year, session) = (year.trim(), session.trim());
        let before = self.records.len();
        self.records
            .retain(|r| !(r.year == year && r.session == session));
        let removed = before - self.records.len();

        if removed == 0 {
            return Err(Error::NotFound(format!(
                "no grades recorded for {} {}",
                year, session
            )));
        }
        info!("Removed {} grades from {} {}", removed, year, session);
        Ok(removed)
    }

    /// Replace every record, as an import does.
    pub fn replace_all(&mut self, records: Vec<GradeRecord>) {
        info!(
            "Replacing {} grades with {} imported grades",
            self.records.len(),
            records.len()
        );
        self.records = records;
    }
}
