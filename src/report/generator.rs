//! Markdown and JSON report generation.
//!
//! This module renders the grade summary as a Markdown document for
//! reading, or as JSON for other tools.

use crate::error::Result;
use crate::models::{GradeDistribution, SemesterRow, TrajectoryPoint};
use crate::report::{AcademicReport, ReportFormat, ReportMetadata};
use std::path::Path;
use tracing::info;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AcademicReport, include_courses: bool) -> String {
    let mut output = String::new();

    output.push_str("# StudentSavvy Academic Report\n\n");

    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_key_figures_section(report));
    output.push_str(&generate_semesters_section(&report.summary.semesters, include_courses));
    output.push_str(&generate_trajectory_section(&report.summary.trajectory));
    output.push_str(&generate_distribution_section(&report.summary.distribution));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Student\n\n");
    match &metadata.student {
        Some(student) => {
            section.push_str(&format!("- **Name:** {}\n", student.name));
            section.push_str(&format!("- **University:** {}\n", student.university));
            section.push_str(&format!(
                "- **Faculty / Department:** {} / {}\n",
                student.faculty, student.department
            ));
            section.push_str(&format!("- **Year:** {}\n", student.year));
        }
        None => section.push_str("- *No profile set*\n"),
    }
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Scale:** {:.1}\n\n", metadata.scale.max_point));

    section
}

fn generate_key_figures_section(report: &AcademicReport) -> String {
    let summary = &report.summary;
    let mut section = String::new();

    section.push_str("## Key Figures\n\n");
    section.push_str("| Latest Semester GPA | Overall CGPA | Latest Semester Credits | Total Credits |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {:.2} | **{:.2}** | {} | {} |\n\n",
        summary.latest_semester_gpa,
        summary.overall_cgpa,
        summary.latest_semester_credits,
        summary.total_credits
    ));

    section
}

fn generate_semesters_section(semesters: &[SemesterRow], include_courses: bool) -> String {
    let mut section = String::new();

    section.push_str("## Semesters\n\n");

    if semesters.is_empty() {
        section.push_str("No grades recorded yet.\n\n");
        return section;
    }

    section.push_str("| Semester | GPA | Credits | Courses |\n");
    section.push_str("|:---|:---:|:---:|:---:|\n");
    for row in semesters {
        section.push_str(&format!(
            "| {} | {:.2} | {} | {} |\n",
            escape_cell(&row.label),
            row.gpa,
            row.credits,
            row.courses.len()
        ));
    }
    section.push('\n');

    if include_courses {
        for row in semesters {
            section.push_str(&format!("### {}\n\n", escape_cell(&row.label)));
            section.push_str("| Course | Grade | Credits |\n");
            section.push_str("|:---|:---:|:---:|\n");
            for course in &row.courses {
                section.push_str(&format!(
                    "| {} | {} | {} |\n",
                    escape_cell(&course.course_name),
                    course.grade_point,
                    course.credits
                ));
            }
            section.push('\n');
        }
    }

    section
}

fn generate_trajectory_section(trajectory: &[TrajectoryPoint]) -> String {
    if trajectory.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## GPA Trajectory\n\n");
    section.push_str("| Semester | Semester GPA | Cumulative GPA |\n");
    section.push_str("|:---|:---:|:---:|\n");
    for point in trajectory {
        section.push_str(&format!(
            "| {} | {:.2} | {:.2} |\n",
            escape_cell(&point.label),
            point.semester_gpa,
            point.cumulative_gpa
        ));
    }
    section.push('\n');

    section
}

fn generate_distribution_section(distribution: &GradeDistribution) -> String {
    let mut section = String::new();

    section.push_str("## Grade Distribution\n\n");
    section.push_str("| Letter | Courses |\n");
    section.push_str("|:---:|:---:|\n");
    for (letter, count) in distribution.iter() {
        section.push_str(&format!("| {} | {} |\n", letter, count));
    }
    section.push_str(&format!("| **Total** | **{}** |\n", distribution.total()));
    section.push('\n');

    section
}

/// Escape text placed in a table cell or heading.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn generate_footer() -> String {
    "---\n\n*Report generated by StudentSavvy*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AcademicReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Render the report in `format` and write it to `path`.
pub fn write_report(
    report: &AcademicReport,
    format: ReportFormat,
    include_courses: bool,
    path: &Path,
) -> Result<()> {
    let content = match format {
        ReportFormat::Json => generate_json_report(report)?,
        ReportFormat::Markdown => generate_markdown_report(report, include_courses),
    };
    std::fs::write(path, content)?;
    info!("Report written to {}", path.display());
    Ok(())
}
