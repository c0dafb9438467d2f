//! Subcommand handlers.
//!
//! Each handler works on the loaded [`App`] state and saves it back when it
//! changed something. Output goes to stdout, as JSON with `--json`.

use crate::analysis::{scoped_distribution, summarize, DistributionScope, PredictionInput};
use crate::assistant::{self, OllamaClient, PredictionOutcome};
use crate::cli::{ClassCommand, Command, GradeCommand, PredictArgs, ProfileCommand, StudyCommand, TaskCommand};
use crate::config::Config;
use crate::error::Error;
use crate::gradebook::{GradeEntry, Gradebook};
use crate::models::{GradeDistribution, GradeRecord, GradeSummary, GradingScale, SemesterKey};
use crate::planner::{schedule, study, tasks, ClassDraft, StudyDraft, TaskDraft, UserProfile};
use crate::report::{self, AcademicReport, ReportMetadata};
use crate::store::{self, DashboardState, JsonFileStore, KeyValueStore};
use crate::transfer;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Loaded configuration and dashboard state for one command.
pub struct App {
    pub config: Config,
    pub scale: GradingScale,
    pub store: JsonFileStore,
    pub state: DashboardState,
    pub json: bool,
}

impl App {
    pub fn open(config: Config, data_file: PathBuf, json: bool) -> Result<Self> {
        let scale = config.grading.scale()?;
        config.grading.semester_order.warn_if_legacy();

        let store = JsonFileStore::open(&data_file)
            .with_context(|| format!("Failed to open data file {}", data_file.display()))?;
        let state = store::load_state(&store, &scale)?;
        debug!("Dashboard state loaded from {}", data_file.display());

        Ok(Self {
            config,
            scale,
            store,
            state,
            json,
        })
    }

    fn save(&mut self) -> Result<()> {
        store::save_state(&mut self.store, &self.state)
            .with_context(|| format!("Failed to save {}", self.store.path().display()))
    }

    fn gradebook(&self) -> Gradebook {
        Gradebook::new(
            self.state.grades.clone(),
            self.scale.clone(),
            self.config.grading.credit_policy,
        )
    }

    fn summary(&self) -> GradeSummary {
        summarize(
            &self.state.grades,
            &self.scale,
            self.config.grading.semester_order,
        )
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run one subcommand against the loaded state.
pub async fn run_command(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::InitConfig { .. } => Ok(()),
        Command::Grade(cmd) => handle_grade(app, cmd),
        Command::Summary { year, session } => {
            let scope = match (year, session) {
                (Some(year), Some(session)) => {
                    DistributionScope::Semester(SemesterKey::new(year.trim(), session.trim()))
                }
                _ => DistributionScope::Overall,
            };
            handle_summary(app, &scope)
        }
        Command::Report { output, format } => handle_report(app, output, format),
        Command::Export { output } => {
            let count = transfer::export_csv(&app.state.grades, &output)?;
            if app.json {
                print_json(&serde_json::json!({ "exported": count, "file": output }))
            } else {
                println!("✅ Exported {} grades to {}", count, output.display());
                Ok(())
            }
        }
        Command::Import { file } => {
            let records = transfer::import_file(&file, &app.scale)?;
            let mut book = app.gradebook();
            book.replace_all(records);
            let count = book.records().len();
            app.state.grades = book.into_records();
            app.save()?;
            if app.json {
                print_json(&serde_json::json!({ "imported": count }))
            } else {
                println!("✅ Imported {} grades from {}", count, file.display());
                Ok(())
            }
        }
        Command::Predict(predict) => handle_predict(app, predict).await,
        Command::Suggest { notes, file } => {
            let notes = match (notes, file) {
                (Some(notes), _) => notes,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read notes from {}", path.display()))?,
                (None, None) => return Err(Error::invalid("notes are required").into()),
            };
            let client = OllamaClient::new(app.config.client_config())?;
            let sessions = assistant::suggest_study_sessions(&client, &notes).await?;
            if app.json {
                print_json(&serde_json::json!({ "sessions": sessions }))
            } else {
                println!("📚 Suggested study sessions:");
                for (i, session) in sessions.iter().enumerate() {
                    println!("   {}. {}", i + 1, session);
                }
                Ok(())
            }
        }
        Command::Task(cmd) => handle_task(app, cmd),
        Command::Study(cmd) => handle_study(app, cmd),
        Command::Class(cmd) => handle_class(app, cmd),
        Command::Profile(cmd) => handle_profile(app, cmd),
        Command::Screen { screen } => {
            if let Some(screen) = screen {
                app.state.active_screen = screen;
                app.save()?;
            }
            if app.json {
                print_json(&app.state.active_screen)
            } else {
                println!("{}", app.state.active_screen.as_str());
                Ok(())
            }
        }
        Command::Reset { .. } => {
            app.store.clear()?;
            app.store.flush()?;
            app.state = DashboardState::default();
            info!("All stored data erased");
            if !app.json {
                println!("✅ All data has been reset.");
            }
            Ok(())
        }
    }
}

fn handle_grade(app: &mut App, cmd: GradeCommand) -> Result<()> {
    match cmd {
        GradeCommand::Add {
            name,
            grade,
            credits,
            year,
            session,
        } => {
            let mut book = app.gradebook();
            let record = book
                .add(GradeEntry {
                    course_name: name,
                    grade_point: grade,
                    credits,
                    year,
                    session,
                })?
                .clone();
            app.state.grades = book.into_records();
            app.save()?;

            if app.json {
                print_json(&record)
            } else {
                println!(
                    "✅ Added {} ({}) to {} [id {}]",
                    record.course_name,
                    app.scale.letter_for(record.grade_point),
                    record.semester_key(),
                    record.id
                );
                Ok(())
            }
        }
        GradeCommand::List => {
            let summary = app.summary();
            if app.json {
                return print_json(&summary.semesters);
            }
            if summary.semesters.is_empty() {
                println!("No grades recorded yet.");
                return Ok(());
            }
            for row in &summary.semesters {
                println!("\n📘 {} (GPA {:.2}, {} credits)", row.label, row.gpa, row.credits);
                for course in &row.courses {
                    print_course(course, &app.scale);
                }
            }
            Ok(())
        }
        GradeCommand::Remove { id } => {
            let mut book = app.gradebook();
            let removed = book.remove(id)?;
            app.state.grades = book.into_records();
            app.save()?;
            if app.json {
                print_json(&removed)
            } else {
                println!("🗑️  Removed {} [id {}]", removed.course_name, removed.id);
                Ok(())
            }
        }
        GradeCommand::RemoveSemester { year, session } => {
            let mut book = app.gradebook();
            let count = book.remove_semester(&year, &session)?;
            app.state.grades = book.into_records();
            app.save()?;
            if app.json {
                print_json(&serde_json::json!({ "removed": count }))
            } else {
                println!("🗑️  Removed {} grades from {} {}", count, year.trim(), session.trim());
                Ok(())
            }
        }
    }
}

fn print_course(course: &GradeRecord, scale: &GradingScale) {
    println!(
        "   [{}] {:<32} {:>5} {:>2} {:>5} cr",
        course.id,
        course.course_name,
        course.grade_point,
        scale.letter_for(course.grade_point),
        course.credits
    );
}

fn handle_summary(app: &App, scope: &DistributionScope) -> Result<()> {
    let summary = app.summary();
    let distribution = scoped_distribution(&app.state.grades, scope, &app.scale);

    if app.json {
        return print_json(&summary_json(&summary, &distribution));
    }

    println!("📊 GPA Summary");
    println!("   Overall CGPA: {:.2}", summary.overall_cgpa);
    println!(
        "   Latest semester GPA: {:.2} ({} credits)",
        summary.latest_semester_gpa, summary.latest_semester_credits
    );
    println!("   Total credits: {}", summary.total_credits);

    if !summary.trajectory.is_empty() {
        println!("\n📈 Trajectory");
        for point in &summary.trajectory {
            println!(
                "   {:<28} semester {:.2} | cumulative {:.2}",
                point.label, point.semester_gpa, point.cumulative_gpa
            );
        }
    }

    match scope {
        DistributionScope::Overall => {
            println!("\n🔤 Grade distribution ({} courses)", distribution.total())
        }
        DistributionScope::Semester(key) => println!(
            "\n🔤 Grade distribution for {} ({} courses)",
            key,
            distribution.total()
        ),
    }
    let line: Vec<String> = distribution
        .iter()
        .map(|(letter, count)| format!("{}: {}", letter, count))
        .collect();
    println!("   {}", line.join(" | "));

    Ok(())
}

/// JSON body of `summary --json`. Keys follow the snake_case used by
/// [`GradeSummary`].
fn summary_json(summary: &GradeSummary, distribution: &GradeDistribution) -> serde_json::Value {
    serde_json::json!({
        "summary": summary,
        "scoped_distribution": distribution,
    })
}

fn handle_report(app: &App, output: Option<PathBuf>, format: Option<report::ReportFormat>) -> Result<()> {
    let report = AcademicReport {
        metadata: ReportMetadata {
            student: app.state.user.clone(),
            generated_at: Utc::now(),
            scale: app.scale.clone(),
            semester_order: app.config.grading.semester_order,
        },
        summary: app.summary(),
    };

    let format = format.unwrap_or(app.config.report.format);
    let output = output.unwrap_or_else(|| app.config.report.output.clone());
    report::write_report(&report, format, app.config.report.include_courses, &output)
        .with_context(|| format!("Failed to write report to {}", output.display()))?;

    if app.json {
        print_json(&serde_json::json!({ "report": output }))
    } else {
        println!("✅ Report saved to: {}", output.display());
        Ok(())
    }
}

async fn handle_predict(app: &App, predict: PredictArgs) -> Result<()> {
    let input = match (predict.current_gpa, predict.total_credits) {
        (Some(current_gpa), Some(total_credits)) => PredictionInput {
            current_gpa,
            total_credits,
            courses: predict.courses,
        },
        _ => PredictionInput::from_grades(&app.state.grades, predict.courses),
    };

    let client = OllamaClient::new(app.config.client_config())?;
    let outcome: PredictionOutcome =
        assistant::predict_future_gpa(&client, &input, &app.scale, predict.explain).await?;

    if let Some(ref reason) = outcome.commentary_error {
        eprintln!("⚠️  Commentary unavailable: {}", reason);
    }

    if app.json {
        return print_json(&outcome);
    }

    println!(
        "🔮 Predicted GPA: {:.2} (from {:.2} over {} credits)",
        outcome.prediction.predicted_gpa, input.current_gpa, input.total_credits
    );
    if let Some(ref commentary) = outcome.commentary {
        println!("\n{}", commentary);
    }
    Ok(())
}

fn handle_task(app: &mut App, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add {
            title,
            priority,
            due,
        } => {
            let due_date = tasks::parse_due_date(&due)?;
            let task = tasks::add_task(
                &mut app.state.tasks,
                TaskDraft {
                    title,
                    priority,
                    due_date,
                },
            )?
            .clone();
            app.save()?;
            if app.json {
                print_json(&task)
            } else {
                println!("✅ Added task {} [id {}]", task.title, task.id);
                Ok(())
            }
        }
        TaskCommand::List => {
            let sorted = tasks::sorted_tasks(&app.state.tasks);
            if app.json {
                return print_json(&sorted);
            }
            if sorted.is_empty() {
                println!("No tasks yet.");
                return Ok(());
            }
            let now = Utc::now();
            for task in sorted {
                let status = if task.is_completed {
                    "Completed".to_string()
                } else {
                    tasks::countdown(task.due_date, now)
                };
                println!(
                    "   [{}] {} {:<32} {} | Due: {} | {}",
                    task.id,
                    if task.is_completed { "☑" } else { "☐" },
                    task.title,
                    task.priority,
                    task.due_date.format("%Y-%m-%d %H:%M"),
                    status
                );
            }
            Ok(())
        }
        TaskCommand::Done { id, undo } => {
            let task = tasks::set_completed(&mut app.state.tasks, id, !undo)?.clone();
            app.save()?;
            if app.json {
                print_json(&task)
            } else {
                let verb = if task.is_completed { "Completed" } else { "Reopened" };
                println!("✅ {} {}", verb, task.title);
                Ok(())
            }
        }
        TaskCommand::Remove { id } => {
            let task = tasks::remove_task(&mut app.state.tasks, id)?;
            app.save()?;
            if app.json {
                print_json(&task)
            } else {
                println!("🗑️  Removed task {}", task.title);
                Ok(())
            }
        }
    }
}

fn handle_study(app: &mut App, cmd: StudyCommand) -> Result<()> {
    match cmd {
        StudyCommand::Add { topic, at, notes } => {
            let starts_at = study::parse_start(&at)?;
            let session = study::add_session(
                &mut app.state.study_sessions,
                StudyDraft {
                    topic,
                    starts_at,
                    notes,
                },
            )?;
            app.save()?;
            if app.json {
                print_json(&session)
            } else {
                println!(
                    "✅ Planned {} on {} at {} [id {}]",
                    session.topic, session.date, session.time, session.id
                );
                Ok(())
            }
        }
        StudyCommand::List => {
            let sessions = &app.state.study_sessions;
            if app.json {
                return print_json(sessions);
            }
            if sessions.is_empty() {
                println!("No study sessions planned.");
                return Ok(());
            }
            for session in sessions {
                println!(
                    "   [{}] {} {} {}",
                    session.id, session.date, session.time, session.topic
                );
                if !session.notes.is_empty() {
                    println!("        {}", session.notes);
                }
            }
            Ok(())
        }
        StudyCommand::Remove { id } => {
            let session = study::remove_session(&mut app.state.study_sessions, id)?;
            app.save()?;
            if app.json {
                print_json(&session)
            } else {
                println!("🗑️  Removed study session {}", session.topic);
                Ok(())
            }
        }
    }
}

fn handle_class(app: &mut App, cmd: ClassCommand) -> Result<()> {
    match cmd {
        ClassCommand::Add {
            name,
            day,
            time,
            period,
            location,
        } => {
            let (hour, minute) = schedule::parse_clock(&time)?;
            let entry = schedule::add_class(
                &mut app.state.classes,
                ClassDraft {
                    name,
                    day,
                    hour,
                    minute,
                    period,
                    location,
                },
            )?;
            app.save()?;
            if app.json {
                print_json(&entry)
            } else {
                println!(
                    "✅ Added {} on {} at {} [id {}]",
                    entry.name, entry.day, entry.time, entry.id
                );
                Ok(())
            }
        }
        ClassCommand::List => {
            let grouped = schedule::group_by_day(&app.state.classes);
            if app.json {
                let days: Vec<_> = grouped
                    .iter()
                    .map(|(day, entries)| serde_json::json!({ "day": day, "classes": entries }))
                    .collect();
                return print_json(&days);
            }
            if grouped.is_empty() {
                println!("No classes scheduled.");
                return Ok(());
            }
            for (day, entries) in grouped {
                println!("\n🗓️  {}", day);
                for entry in entries {
                    println!(
                        "   [{}] {} {} ({})",
                        entry.id, entry.time, entry.name, entry.location
                    );
                }
            }
            Ok(())
        }
        ClassCommand::Remove { id } => {
            let entry = schedule::remove_class(&mut app.state.classes, id)?;
            app.save()?;
            if app.json {
                print_json(&entry)
            } else {
                println!("🗑️  Removed class {}", entry.name);
                Ok(())
            }
        }
    }
}

fn handle_profile(app: &mut App, cmd: ProfileCommand) -> Result<()> {
    match cmd {
        ProfileCommand::Set {
            name,
            university,
            faculty,
            department,
            year,
        } => {
            let profile = UserProfile {
                name,
                university,
                faculty,
                department,
                year,
            }
            .normalized();
            profile.validate()?;
            app.state.user = Some(profile);
            app.save()?;
            if !app.json {
                println!("✅ Profile saved.");
            }
            Ok(())
        }
        ProfileCommand::Show => match &app.state.user {
            Some(profile) if app.json => print_json(profile),
            Some(profile) => {
                println!("👤 {}", profile.name);
                println!("   {} | {} | {}", profile.university, profile.faculty, profile.department);
                println!("   {}", profile.year);
                Ok(())
            }
            None => Err(Error::NotFound("no profile set; run `profile set`".to_string()).into()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use clap::Parser;
    use tempfile::TempDir;

    fn app(dir: &TempDir) -> App {
        App::open(Config::default(), dir.path().join("state.json"), true).unwrap()
    }

    async fn run(dir: &TempDir, argv: &[&str]) -> Result<()> {
        let mut full = vec!["studentsavvy"];
        full.extend_from_slice(argv);
        let args = Args::try_parse_from(full).unwrap();
        let mut app = app(dir);
        run_command(&mut app, args.command).await
    }

    #[tokio::test]
    async fn test_grades_persist_between_commands() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["grade", "add", "Physics", "--grade", "5", "--credits", "3", "--year", "Year 1", "--session", "1st Semester"])
            .await
            .unwrap();
        run(&dir, &["grade", "add", "Calculus", "--grade", "4", "--credits", "4", "--year", "Year 1", "--session", "1st Semester"])
            .await
            .unwrap();

        let app = app(&dir);
        assert_eq!(app.state.grades.len(), 2);
        assert_eq!(app.summary().overall_cgpa, 4.43);
    }

    #[tokio::test]
    async fn test_invalid_grade_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let err = run(&dir, &["grade", "add", "Physics", "--grade", "7", "--credits", "3", "--year", "Year 1", "--session", "1st"])
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<Error>().map(Error::exit_code), Some(2));
        assert!(app(&dir).state.grades.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_import_leaves_grades() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["grade", "add", "Physics", "--grade", "5", "--credits", "3", "--year", "Year 1", "--session", "1st Semester"])
            .await
            .unwrap();

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"[{"id": 1, "name": "Art"}]"#).unwrap();
        let err = run(&dir, &["import", bad.to_str().unwrap()]).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Import(_))));
        assert_eq!(app(&dir).state.grades.len(), 1);
    }

    #[tokio::test]
    async fn test_export_and_reimport() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["grade", "add", "Physics", "--grade", "5", "--credits", "3", "--year", "Year 1", "--session", "1st Semester"])
            .await
            .unwrap();
        let csv = dir.path().join("grades.csv");
        run(&dir, &["export", csv.to_str().unwrap()]).await.unwrap();
        run(&dir, &["grade", "remove-semester", "--year", "Year 1", "--session", "1st Semester"])
            .await
            .unwrap();
        assert!(app(&dir).state.grades.is_empty());

        run(&dir, &["import", csv.to_str().unwrap()]).await.unwrap();
        assert_eq!(app(&dir).state.grades[0].course_name, "Physics");
    }

    #[tokio::test]
    async fn test_planner_commands() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["task", "add", "Lab report", "--priority", "urgent", "--due", "2030-01-01"])
            .await
            .unwrap();
        run(&dir, &["study", "add", "Thermodynamics", "--at", "2030-01-02T10:00"])
            .await
            .unwrap();
        run(&dir, &["class", "add", "Biology", "--day", "tue", "--time", "2:15", "--period", "PM"])
            .await
            .unwrap();
        run(&dir, &["screen", "ai-tools"]).await.unwrap();

        let app = app(&dir);
        assert_eq!(app.state.tasks.len(), 1);
        assert_eq!(app.state.study_sessions[0].time, "10:00");
        assert_eq!(app.state.classes[0].time, "14:15");
        assert_eq!(app.state.active_screen, crate::planner::Screen::AiTools);
    }

    #[tokio::test]
    async fn test_profile_and_reset() {
        let dir = TempDir::new().unwrap();
        assert!(run(&dir, &["profile", "show"]).await.is_err());
        run(&dir, &[
            "profile", "set", "--name", "Ada", "--university", "State University",
            "--faculty", "Science", "--department", "Physics", "--year", "Year 2",
        ])
        .await
        .unwrap();
        assert!(app(&dir).state.user.is_some());

        run(&dir, &["reset", "--yes"]).await.unwrap();
        assert_eq!(app(&dir).state, DashboardState::default());
    }

    #[tokio::test]
    async fn test_predict_from_flags_without_model() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["predict", "--course", "Stats:5:3", "--current-gpa", "3", "--total-credits", "10"])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_summary_json_keys_are_snake_case() {
        let dir = TempDir::new().unwrap();
        run(&dir, &["grade", "add", "Physics", "--grade", "5", "--credits", "3", "--year", "Year 1", "--session", "1st Semester"])
            .await
            .unwrap();

        let app = app(&dir);
        let summary = app.summary();
        let json = summary_json(&summary, &summary.distribution);
        assert!(json.get("scoped_distribution").is_some());
        assert!(json.get("scopedDistribution").is_none());
        assert_eq!(json["summary"]["overall_cgpa"], 5.0);
        assert_eq!(json["scoped_distribution"]["A"], 1);
    }
}
