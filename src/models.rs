//! Data models for the gradebook.
//!
//! This module contains the grade records, grading scales and the derived
//! aggregates produced by the analysis engine.

use crate::error::{Error, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Letter grade bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
    F,
}

impl Letter {
    /// All letters, best first.
    pub const ALL: [Letter; 5] = [Letter::A, Letter::B, Letter::C, Letter::D, Letter::F];

    pub fn as_str(&self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::B => "B",
            Letter::C => "C",
            Letter::D => "D",
            Letter::F => "F",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bound of a letter band: grade points `>= min` earn `letter`
/// unless a higher band already matched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub min: f64,
    pub letter: Letter,
}

/// A grading scale: the maximum grade point and its letter bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingScale {
    pub max_point: f64,
    /// Bands ordered from the highest threshold down to 0.
    pub bands: Vec<GradeBand>,
}

impl GradingScale {
    /// The 5.0 scale: A>=4, B>=3, C>=2, D>=1, else F.
    pub fn five_point() -> Self {
        Self::proportional(5.0)
    }

    /// The 4.0 scale with the same proportional bands.
    pub fn four_point() -> Self {
        Self::proportional(4.0)
    }

    /// Bands at 4/5, 3/5, 2/5 and 1/5 of `max_point`.
    pub fn proportional(max_point: f64) -> Self {
        let band = |steps: u8, letter| GradeBand {
            min: max_point * f64::from(steps) / 5.0,
            letter,
        };
        Self {
            max_point,
            bands: vec![
                band(4, Letter::A),
                band(3, Letter::B),
                band(2, Letter::C),
                band(1, Letter::D),
                band(0, Letter::F),
            ],
        }
    }

    /// Build a custom scale, rejecting band layouts with gaps or overlaps.
    pub fn new(max_point: f64, bands: Vec<GradeBand>) -> Result<Self> {
        let scale = Self { max_point, bands };
        scale.validate()?;
        Ok(scale)
    }

    /// Check that the bands form a total, ordered partition of `[0, max_point]`.
    pub fn validate(&self) -> Result<()> {
        if !self.max_point.is_finite() || self.max_point <= 0.0 {
            return Err(Error::Scale(format!(
                "max point must be a positive number, got {}",
                self.max_point
            )));
        }

        let Some(last) = self.bands.last() else {
            return Err(Error::Scale("at least one band is required".to_string()));
        };

        for pair in self.bands.windows(2) {
            let (upper, lower) = (pair[0], pair[1]);
            if upper.min <= lower.min {
                return Err(Error::Scale(format!(
                    "band thresholds must strictly decrease ({} then {})",
                    upper.min, lower.min
                )));
            }
            if upper.letter >= lower.letter {
                return Err(Error::Scale(format!(
                    "letters must run from best to worst ({} then {})",
                    upper.letter, lower.letter
                )));
            }
        }

        for band in &self.bands {
            if !band.min.is_finite() || band.min < 0.0 || band.min > self.max_point {
                return Err(Error::Scale(format!(
                    "threshold {} for {} is outside [0, {}]",
                    band.min, band.letter, self.max_point
                )));
            }
        }

        if last.min != 0.0 {
            return Err(Error::Scale(format!(
                "lowest band must start at 0, got {}",
                last.min
            )));
        }

        Ok(())
    }

    /// Map a grade point to its letter.
    ///
    /// Values above the maximum land in the top band; negative or
    /// non-finite values land in the bottom band.
    pub fn letter_for(&self, grade_point: f64) -> Letter {
        self.bands
            .iter()
            .find(|band| grade_point >= band.min)
            .or(self.bands.last())
            .map(|band| band.letter)
            .unwrap_or(Letter::F)
    }

    /// Whether a grade point lies within `[0, max_point]`.
    pub fn contains(&self, grade_point: f64) -> bool {
        grade_point.is_finite() && (0.0..=self.max_point).contains(&grade_point)
    }
}

impl Default for GradingScale {
    fn default() -> Self {
        Self::five_point()
    }
}

/// A single course result.
///
/// Serialized with the field names of the persisted dashboard layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: i64,
    #[serde(rename = "name")]
    pub course_name: String,
    #[serde(rename = "grade")]
    pub grade_point: f64,
    pub credits: f64,
    pub year: String,
    pub session: String,
}

impl GradeRecord {
    pub fn semester_key(&self) -> SemesterKey {
        SemesterKey::new(&self.year, &self.session)
    }

    /// Grade point weighted by credits.
    pub fn quality_points(&self) -> f64 {
        self.grade_point * self.credits
    }
}

/// Aggregation key: one academic year plus one session within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemesterKey {
    pub year: String,
    pub session: String,
}

impl SemesterKey {
    pub fn new(year: &str, session: &str) -> Self {
        Self {
            year: year.to_string(),
            session: session.to_string(),
        }
    }

    /// Display label, e.g. "Year 1 1st Semester".
    pub fn label(&self) -> String {
        match (self.year.is_empty(), self.session.is_empty()) {
            (false, false) => format!("{} {}", self.year, self.session),
            (false, true) => self.year.clone(),
            (true, _) => self.session.clone(),
        }
    }
}

impl fmt::Display for SemesterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Running credit and quality-point totals for one semester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SemesterAggregate {
    pub total_credits: f64,
    pub total_quality_points: f64,
}

impl SemesterAggregate {
    pub fn add(&mut self, record: &GradeRecord) {
        self.total_credits += record.credits;
        self.total_quality_points += record.quality_points();
    }

    /// Unrounded GPA; exactly 0 when there are no credits.
    pub fn gpa(&self) -> f64 {
        ratio_or_zero(self.total_quality_points, self.total_credits)
    }
}

/// Quotient that is 0 instead of NaN or infinity when the denominator is 0.
pub(crate) fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let value = numerator / denominator;
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One semester's records with their aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterGroup {
    pub key: SemesterKey,
    pub aggregate: SemesterAggregate,
    /// Member records in their original relative order.
    pub records: Vec<GradeRecord>,
}

/// One point of the GPA trend, values rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub label: String,
    pub semester_gpa: f64,
    pub cumulative_gpa: f64,
}

/// Fixed-size letter histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GradeDistribution {
    counts: [usize; 5],
}

impl GradeDistribution {
    pub fn record(&mut self, letter: Letter) {
        self.counts[letter.index()] += 1;
    }

    pub fn count(&self, letter: Letter) -> usize {
        self.counts[letter.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(letter, count)` pairs, best letter first.
    pub fn iter(&self) -> impl Iterator<Item = (Letter, usize)> + '_ {
        Letter::ALL.iter().map(|letter| (*letter, self.count(*letter)))
    }
}

impl Serialize for GradeDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Letter::ALL.len()))?;
        for (letter, count) in self.iter() {
            map.serialize_entry(letter.as_str(), &count)?;
        }
        map.end()
    }
}

/// Summary row for one semester, for tables and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterRow {
    pub year: String,
    pub session: String,
    pub label: String,
    pub gpa: f64,
    pub credits: f64,
    pub quality_points: f64,
    pub courses: Vec<GradeRecord>,
}

/// Everything the dashboard shows about grades.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeSummary {
    /// Semesters in chronological order.
    pub semesters: Vec<SemesterRow>,
    pub trajectory: Vec<TrajectoryPoint>,
    pub overall_cgpa: f64,
    pub total_credits: f64,
    pub latest_semester_gpa: f64,
    pub latest_semester_credits: f64,
    pub distribution: GradeDistribution,
}
