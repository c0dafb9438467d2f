//! GPA aggregation and statistics.
//!
//! Pure functions from grade records to per-semester aggregates, the
//! cumulative trajectory, the overall CGPA and the letter distribution.
//! Nothing here validates input: zero or negative credits are summed as
//! given and a semester without credits reports a GPA of exactly 0.

use crate::analysis::chronology::{compare_keys, SemesterOrder};
use crate::models::{
    GradeDistribution, GradeRecord, GradeSummary, GradingScale, SemesterAggregate, SemesterGroup,
    SemesterKey, SemesterRow, TrajectoryPoint,
};
use std::collections::HashMap;

/// Which records a distribution covers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DistributionScope {
    #[default]
    Overall,
    Semester(SemesterKey),
}

/// Round for display. Accumulation always uses unrounded values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Group records by (year, session), accumulating credits and quality points.
pub fn group_by_semester(records: &[GradeRecord]) -> HashMap<SemesterKey, SemesterGroup> {
    let mut grouped: HashMap<SemesterKey, SemesterGroup> = HashMap::new();

    for record in records {
        let key = record.semester_key();
        let group = grouped.entry(key.clone()).or_insert_with(|| SemesterGroup {
            key,
            aggregate: SemesterAggregate::default(),
            records: Vec::new(),
        });
        group.aggregate.add(record);
        group.records.push(record.clone());
    }

    grouped
}

/// Groups sorted by the semester comparator.
pub fn ordered_groups(
    groups: &HashMap<SemesterKey, SemesterGroup>,
    order: SemesterOrder,
) -> Vec<&SemesterGroup> {
    let mut ordered: Vec<&SemesterGroup> = groups.values().collect();
    ordered.sort_by(|a, b| compare_keys(&a.key, &b.key, order));
    ordered
}

/// Per-semester and cumulative GPA, one point per semester in order.
pub fn compute_trajectory(
    groups: &HashMap<SemesterKey, SemesterGroup>,
    order: SemesterOrder,
) -> Vec<TrajectoryPoint> {
    let mut running = SemesterAggregate::default();

    ordered_groups(groups, order)
        .into_iter()
        .map(|group| {
            running.total_credits += group.aggregate.total_credits;
            running.total_quality_points += group.aggregate.total_quality_points;

            TrajectoryPoint {
                label: group.key.label(),
                semester_gpa: round2(group.aggregate.gpa()),
                cumulative_gpa: round2(running.gpa()),
            }
        })
        .collect()
}

/// Overall CGPA across every semester, rounded to 2 decimals.
///
/// Sums in the same order as [`compute_trajectory`], so the result is
/// identical to the last trajectory point's cumulative GPA.
pub fn compute_overall_cgpa(groups: &HashMap<SemesterKey, SemesterGroup>, order: SemesterOrder) -> f64 {
    round2(overall_totals(groups, order).gpa())
}

fn overall_totals(
    groups: &HashMap<SemesterKey, SemesterGroup>,
    order: SemesterOrder,
) -> SemesterAggregate {
    let mut totals = SemesterAggregate::default();
    for group in ordered_groups(groups, order) {
        totals.total_credits += group.aggregate.total_credits;
        totals.total_quality_points += group.aggregate.total_quality_points;
    }
    totals
}

/// Credits and quality points over all records, in record order.
pub fn grade_totals(records: &[GradeRecord]) -> SemesterAggregate {
    let mut totals = SemesterAggregate::default();
    for record in records {
        totals.add(record);
    }
    totals
}

/// Count records per letter under the given scale.
pub fn compute_grade_distribution<'a, I>(records: I, scale: &GradingScale) -> GradeDistribution
where
    I: IntoIterator<Item = &'a GradeRecord>,
{
    let mut distribution = GradeDistribution::default();
    for record in records {
        distribution.record(scale.letter_for(record.grade_point));
    }
    distribution
}

/// Distribution over all records or a single semester.
pub fn scoped_distribution(
    records: &[GradeRecord],
    scope: &DistributionScope,
    scale: &GradingScale,
) -> GradeDistribution {
    match scope {
        DistributionScope::Overall => compute_grade_distribution(records, scale),
        DistributionScope::Semester(key) => compute_grade_distribution(
            records.iter().filter(|r| r.year == key.year && r.session == key.session),
            scale,
        ),
    }
}

/// Build the full dashboard summary.
pub fn summarize(records: &[GradeRecord], scale: &GradingScale, order: SemesterOrder) -> GradeSummary {
    let groups = group_by_semester(records);
    let ordered = ordered_groups(&groups, order);

    let semesters: Vec<SemesterRow> = ordered
        .iter()
        .map(|group| SemesterRow {
            year: group.key.year.clone(),
            session: group.key.session.clone(),
            label: group.key.label(),
            gpa: round2(group.aggregate.gpa()),
            credits: group.aggregate.total_credits,
            quality_points: group.aggregate.total_quality_points,
            courses: group.records.clone(),
        })
        .collect();

    let latest = ordered.last();
    let totals = overall_totals(&groups, order);

    GradeSummary {
        trajectory: compute_trajectory(&groups, order),
        overall_cgpa: compute_overall_cgpa(&groups, order),
        total_credits: totals.total_credits,
        latest_semester_gpa: latest.map(|g| round2(g.aggregate.gpa())).unwrap_or(0.0),
        latest_semester_credits: latest.map(|g| g.aggregate.total_credits).unwrap_or(0.0),
        distribution: compute_grade_distribution(records, scale),
        semesters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Letter;

    fn record(id: i64, grade: f64, credits: f64, year: &str, session: &str) -> GradeRecord {
        GradeRecord {
            id,
            course_name: format!("Course {}", id),
            grade_point: grade,
            credits,
            year: year.to_string(),
            session: session.to_string(),
        }
    }

    fn worked_example() -> Vec<GradeRecord> {
        vec![
            record(1, 5.0, 3.0, "Year 1", "1st Semester"),
            record(2, 4.0, 4.0, "Year 1", "1st Semester"),
            record(3, 3.0, 3.0, "Year 1", "2nd Semester"),
        ]
    }

    #[test]
    fn test_group_by_semester() {
        let groups = group_by_semester(&worked_example());
        assert_eq!(groups.len(), 2);

        let first = &groups[&SemesterKey::new("Year 1", "1st Semester")];
        assert_eq!(first.aggregate.total_credits, 7.0);
        assert_eq!(first.aggregate.total_quality_points, 31.0);
        assert_eq!(first.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_worked_example() {
        let groups = group_by_semester(&worked_example());
        let trajectory = compute_trajectory(&groups, SemesterOrder::Chronological);

        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory[0].label, "Year 1 1st Semester");
        assert_eq!(trajectory[0].semester_gpa, 4.43);
        assert_eq!(trajectory[0].cumulative_gpa, 4.43);
        assert_eq!(trajectory[1].semester_gpa, 3.0);
        assert_eq!(trajectory[1].cumulative_gpa, 4.0);
        assert_eq!(compute_overall_cgpa(&groups, SemesterOrder::Chronological), 4.0);
    }

    #[test]
    fn test_zero_credit_semester() {
        let records = vec![record(1, 5.0, 0.0, "Year 1", "1st Semester")];
        let groups = group_by_semester(&records);
        let trajectory = compute_trajectory(&groups, SemesterOrder::Chronological);

        assert_eq!(trajectory[0].semester_gpa, 0.0);
        assert_eq!(trajectory[0].cumulative_gpa, 0.0);
        assert!(trajectory[0].semester_gpa.is_finite());
        assert_eq!(compute_overall_cgpa(&groups, SemesterOrder::Chronological), 0.0);
    }

    #[test]
    fn test_zero_credit_semester_between_others() {
        let records = vec![
            record(1, 4.0, 3.0, "Year 1", "1st Semester"),
            record(2, 5.0, 0.0, "Year 1", "2nd Semester"),
        ];
        let groups = group_by_semester(&records);
        let trajectory = compute_trajectory(&groups, SemesterOrder::Chronological);

        assert_eq!(trajectory[1].semester_gpa, 0.0);
        assert_eq!(trajectory[1].cumulative_gpa, 4.0);
    }

    #[test]
    fn test_negative_credits_are_summed_without_panic() {
        let records = vec![
            record(1, 4.0, 3.0, "Year 1", "1st Semester"),
            record(2, 4.0, -3.0, "Year 1", "1st Semester"),
        ];
        let groups = group_by_semester(&records);
        let group = &groups[&SemesterKey::new("Year 1", "1st Semester")];
        assert_eq!(group.aggregate.total_credits, 0.0);
        assert_eq!(group.aggregate.gpa(), 0.0);
    }

    #[test]
    fn test_empty_input() {
        let groups = group_by_semester(&[]);
        assert!(groups.is_empty());
        assert!(compute_trajectory(&groups, SemesterOrder::Chronological).is_empty());
        assert_eq!(compute_overall_cgpa(&groups, SemesterOrder::Chronological), 0.0);

        let summary = summarize(&[], &GradingScale::five_point(), SemesterOrder::Chronological);
        assert_eq!(summary.distribution.total(), 0);
        assert_eq!(summary.latest_semester_gpa, 0.0);
    }

    #[test]
    fn test_overall_cgpa_matches_last_trajectory_point() {
        let mut records = Vec::new();
        let mut id = 0;
        for year in 1..=12 {
            for (session, grade) in [("1st Semester", 3.7), ("2nd Semester", 4.1)] {
                for credits in [1.5, 2.0, 3.0] {
                    id += 1;
                    let grade = grade + (id % 7) as f64 * 0.13;
                    records.push(record(id, grade, credits, &format!("Year {}", year), session));
                }
            }
        }

        let groups = group_by_semester(&records);
        let trajectory = compute_trajectory(&groups, SemesterOrder::Chronological);
        let overall = compute_overall_cgpa(&groups, SemesterOrder::Chronological);

        assert_eq!(trajectory.len(), 24);
        assert_eq!(trajectory.last().map(|p| p.cumulative_gpa), Some(overall));
        assert_eq!(trajectory[2].label, "Year 2 1st Semester");
        assert_eq!(trajectory[18].label, "Year 10 1st Semester");
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let records = worked_example();
        let first = summarize(&records, &GradingScale::five_point(), SemesterOrder::Chronological);
        let second = summarize(&records, &GradingScale::five_point(), SemesterOrder::Chronological);
        assert_eq!(first, second);
        assert_eq!(first.overall_cgpa.to_bits(), second.overall_cgpa.to_bits());
    }

    #[test]
    fn test_distribution_counts_every_record() {
        let records = vec![
            record(1, 5.0, 3.0, "Year 1", "1st Semester"),
            record(2, 4.0, 3.0, "Year 1", "1st Semester"),
            record(3, 3.5, 3.0, "Year 1", "1st Semester"),
            record(4, 0.5, 3.0, "Year 1", "2nd Semester"),
            record(5, 9.0, 3.0, "Year 1", "2nd Semester"),
            record(6, -2.0, 3.0, "Year 1", "2nd Semester"),
        ];
        let dist = compute_grade_distribution(&records, &GradingScale::five_point());

        assert_eq!(dist.total(), records.len());
        assert_eq!(dist.count(Letter::A), 3);
        assert_eq!(dist.count(Letter::B), 1);
        assert_eq!(dist.count(Letter::F), 2);
    }

    #[test]
    fn test_distribution_depends_on_scale() {
        let records = vec![record(1, 3.5, 3.0, "Year 1", "1st Semester")];
        let five = compute_grade_distribution(&records, &GradingScale::five_point());
        let four = compute_grade_distribution(&records, &GradingScale::four_point());
        assert_eq!(five.count(Letter::B), 1);
        assert_eq!(four.count(Letter::A), 1);
    }

    #[test]
    fn test_scoped_distribution() {
        let records = worked_example();
        let scope = DistributionScope::Semester(SemesterKey::new("Year 1", "2nd Semester"));
        let dist = scoped_distribution(&records, &scope, &GradingScale::five_point());
        assert_eq!(dist.total(), 1);
        assert_eq!(dist.count(Letter::B), 1);
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(
            &worked_example(),
            &GradingScale::five_point(),
            SemesterOrder::Chronological,
        );
        assert_eq!(summary.semesters.len(), 2);
        assert_eq!(summary.semesters[0].gpa, 4.43);
        assert_eq!(summary.total_credits, 10.0);
        assert_eq!(summary.latest_semester_gpa, 3.0);
        assert_eq!(summary.latest_semester_credits, 3.0);
        assert_eq!(summary.overall_cgpa, 4.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(31.0 / 7.0), 4.43);
        assert_eq!(round2(45.0 / 13.0), 3.46);
        assert_eq!(round2(0.0), 0.0);
    }
}
