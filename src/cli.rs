//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::{PlannedCourse, SemesterOrder};
use crate::gradebook::CreditPolicy;
use crate::planner::{Period, Screen, TaskPriority, Weekday};
use crate::report::ReportFormat;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// StudentSavvy - GPA tracking and study planning from the terminal
///
/// Record grades per year and session, follow your GPA trajectory, plan
/// tasks, classes and study sessions, and ask a local model for help.
///
/// Examples:
///   studentsavvy grade add "Calculus I" --grade 4.5 --credits 3 --year "Year 1" --session "1st Semester"
///   studentsavvy summary
///   studentsavvy predict --course "Statistics:4:3" --course "Physics:5:4" --explain
///   studentsavvy report --format json --output report.json
///   studentsavvy init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .studentsavvy.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Dashboard data file
    #[arg(long, value_name = "FILE", env = "STUDENTSAVVY_DATA", global = true)]
    pub data_file: Option<PathBuf>,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Semester ordering for trajectories and reports
    #[arg(long, value_name = "ORDER", global = true)]
    pub semester_order: Option<SemesterOrder>,

    /// Whether zero-credit courses may be recorded
    #[arg(long, value_name = "POLICY", global = true)]
    pub credit_policy: Option<CreditPolicy>,

    /// Ollama model to use
    #[arg(short, long, env = "STUDENTSAVVY_MODEL", global = true)]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    #[arg(long, env = "OLLAMA_URL", global = true)]
    pub ollama_url: Option<String>,

    /// Model request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a default .studentsavvy.toml configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Record, list and remove grades
    #[command(subcommand)]
    Grade(GradeCommand),

    /// Show GPA figures, the trajectory and the grade distribution
    Summary {
        /// Limit the distribution to one year (requires --session)
        #[arg(long, requires = "session")]
        year: Option<String>,

        /// Limit the distribution to one session (requires --year)
        #[arg(long, requires = "year")]
        session: Option<String>,
    },

    /// Write an academic report
    Report {
        /// Output file path (default from config)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<ReportFormat>,
    },

    /// Export grades as CSV
    Export {
        #[arg(default_value = "studentsavvy_grades.csv", value_name = "FILE")]
        output: PathBuf,
    },

    /// Replace all grades with the contents of a JSON or CSV export
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Predict the GPA after the courses you are taking
    Predict(PredictArgs),

    /// Suggest study sessions from lecture notes
    Suggest {
        /// Notes text
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        notes: Option<String>,

        /// Read notes from a file
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Plan study sessions
    #[command(subcommand)]
    Study(StudyCommand),

    /// Manage the weekly class schedule
    #[command(subcommand)]
    Class(ClassCommand),

    /// Set or show the student profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Show or set the active dashboard screen
    Screen {
        #[arg(value_name = "SCREEN")]
        screen: Option<Screen>,
    },

    /// Erase all stored data
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum GradeCommand {
    /// Record a course grade
    Add {
        /// Course name
        name: String,
        #[arg(short, long)]
        grade: f64,
        #[arg(long)]
        credits: f64,
        #[arg(long)]
        year: String,
        #[arg(long)]
        session: String,
    },
    /// List grades by semester
    List,
    /// Remove one grade
    Remove { id: i64 },
    /// Remove every grade of a semester
    RemoveSemester {
        #[arg(long)]
        year: String,
        #[arg(long)]
        session: String,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PredictArgs {
    /// Planned course as NAME:EXPECTED_GRADE:CREDITS (repeatable)
    #[arg(long = "course", value_name = "COURSE", required = true, value_parser = parse_course)]
    pub courses: Vec<PlannedCourse>,

    /// Current GPA (default: from recorded grades)
    #[arg(long, requires = "total_credits")]
    pub current_gpa: Option<f64>,

    /// Credits earned so far (default: from recorded grades)
    #[arg(long, requires = "current_gpa")]
    pub total_credits: Option<f64>,

    /// Ask the model to comment on the prediction
    #[arg(long)]
    pub explain: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,
        #[arg(short, long)]
        priority: TaskPriority,
        /// Due date, YYYY-MM-DD or YYYY-MM-DDTHH:MM
        #[arg(short, long)]
        due: String,
    },
    /// List tasks by priority and due date
    List,
    /// Mark a task completed
    Done {
        id: i64,
        /// Mark it not completed instead
        #[arg(long)]
        undo: bool,
    },
    /// Remove a task
    Remove { id: i64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum StudyCommand {
    /// Plan a study session
    Add {
        topic: String,
        /// Start, YYYY-MM-DDTHH:MM
        #[arg(long)]
        at: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List study sessions in date order
    List,
    /// Remove a study session
    Remove { id: i64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClassCommand {
    /// Add a class
    Add {
        name: String,
        #[arg(long)]
        day: Weekday,
        /// Start time on a 12-hour clock, H:MM
        #[arg(long)]
        time: String,
        #[arg(long)]
        period: Period,
        #[arg(long)]
        location: Option<String>,
    },
    /// Show the week's classes
    List,
    /// Remove a class
    Remove { id: i64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommand {
    /// Set the profile
    Set {
        #[arg(long)]
        name: String,
        #[arg(long)]
        university: String,
        #[arg(long)]
        faculty: String,
        #[arg(long)]
        department: String,
        #[arg(long)]
        year: String,
    },
    /// Show the profile
    Show,
}

/// Parse `NAME:EXPECTED_GRADE:CREDITS`. The name may itself contain colons.
pub fn parse_course(input: &str) -> Result<PlannedCourse, String> {
    let mut parts = input.rsplitn(3, ':');
    let (credits, grade, name) = match (parts.next(), parts.next(), parts.next()) {
        (Some(credits), Some(grade), Some(name)) => (credits, grade, name),
        _ => return Err(format!("'{}' is not NAME:EXPECTED_GRADE:CREDITS", input)),
    };

    let expected_grade = grade
        .trim()
        .parse()
        .map_err(|_| format!("expected grade '{}' is not a number", grade))?;
    let credits = credits
        .trim()
        .parse()
        .map_err(|_| format!("credits '{}' is not a number", credits))?;

    Ok(PlannedCourse {
        name: name.trim().to_string(),
        expected_grade,
        credits,
    })
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate Ollama URL format
        if let Some(ref url) = self.ollama_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Command::Reset { yes: false } = self.command {
            return Err("Reset erases all data; pass --yes to confirm".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        }
    }
}
