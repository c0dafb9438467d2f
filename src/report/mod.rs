//! Academic report generation.

pub mod generator;

pub use generator::write_report;

use crate::analysis::SemesterOrder;
use crate::models::{GradeSummary, GradingScale};
use crate::planner::UserProfile;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Context printed at the top of a report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub student: Option<UserProfile>,
    pub generated_at: DateTime<Utc>,
    pub scale: GradingScale,
    pub semester_order: SemesterOrder,
}

/// Everything a report shows.
#[derive(Debug, Clone, Serialize)]
pub struct AcademicReport {
    pub metadata: ReportMetadata,
    pub summary: GradeSummary,
}

/// Output format for reports and listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}
