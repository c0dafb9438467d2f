//! Future GPA prediction.
//!
//! The predicted value is plain credit-weighted arithmetic over the
//! current standing and the planned courses. The assistant may add prose
//! around it but never supplies the number.

use crate::analysis::aggregator::{grade_totals, round2};
use crate::error::{Error, Result};
use crate::models::{ratio_or_zero, GradeRecord, GradingScale};
use serde::{Deserialize, Serialize};

/// Minimum credits for a planned course.
pub const MIN_COURSE_CREDITS: f64 = 0.5;

/// A course the student is taking, with the grade they expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedCourse {
    pub name: String,
    pub expected_grade: f64,
    pub credits: f64,
}

/// Inputs to a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub current_gpa: f64,
    pub total_credits: f64,
    pub courses: Vec<PlannedCourse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub predicted_gpa: f64,
}

impl PredictionInput {
    /// Seed current GPA and credits from recorded grades.
    pub fn from_grades(records: &[GradeRecord], courses: Vec<PlannedCourse>) -> Self {
        let totals = grade_totals(records);
        Self {
            current_gpa: totals.gpa(),
            total_credits: totals.total_credits,
            courses,
        }
    }

    /// Apply the prediction form's rules, collecting every failure.
    pub fn validate(&self, scale: &GradingScale) -> Result<()> {
        let mut problems = Vec::new();
        let max = scale.max_point;

        if !scale.contains(self.current_gpa) {
            problems.push(format!("current GPA must be between 0.0 and {:.1}", max));
        }
        if !self.total_credits.is_finite() || self.total_credits < 0.0 {
            problems.push("total credits must be zero or more".to_string());
        }
        if self.courses.is_empty() {
            problems.push("at least one course is required".to_string());
        }

        for (i, course) in self.courses.iter().enumerate() {
            let label = if course.name.trim().is_empty() {
                format!("course {}", i + 1)
            } else {
                course.name.trim().to_string()
            };

            if course.name.trim().is_empty() {
                problems.push(format!("{}: name is required", label));
            }
            if !course.credits.is_finite() || course.credits < MIN_COURSE_CREDITS {
                problems.push(format!(
                    "{}: credits must be at least {}",
                    label, MIN_COURSE_CREDITS
                ));
            }
            if !scale.contains(course.expected_grade) {
                problems.push(format!(
                    "{}: expected grade must be between 0.0 and {:.1}",
                    label, max
                ));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(problems))
        }
    }
}

/// Predicted GPA after the planned courses, clamped to `[0, max_point]`.
pub fn predict_gpa(input: &PredictionInput, scale: &GradingScale) -> Prediction {
    let mut points = input.current_gpa * input.total_credits;
    let mut credits = input.total_credits;

    for course in &input.courses {
        points += course.expected_grade * course.credits;
        credits += course.credits;
    }

    let predicted = ratio_or_zero(points, credits).clamp(0.0, scale.max_point);
    Prediction {
        predicted_gpa: round2(predicted),
    }
}
