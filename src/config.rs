//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.studentsavvy.toml` files.

use crate::analysis::SemesterOrder;
use crate::assistant::ClientConfig;
use crate::gradebook::CreditPolicy;
use crate::models::{GradeBand, GradingScale};
use crate::report::ReportFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = ".studentsavvy.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Grading scale and gradebook rules.
    #[serde(default)]
    pub grading: GradingConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data file path. Unset means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    /// Show a spinner while waiting on the model.
    #[serde(default = "default_true")]
    pub progress: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            progress: true,
        }
    }
}

/// Named grading scale presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalePreset {
    #[default]
    Five,
    Four,
}

/// Grading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    /// Preset used when no custom bands are given.
    #[serde(default)]
    pub scale: ScalePreset,

    /// Custom maximum grade point. Without `bands`, letters are placed
    /// proportionally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_point: Option<f64>,

    /// Custom letter bands, highest threshold first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bands: Option<Vec<GradeBand>>,

    #[serde(default)]
    pub credit_policy: CreditPolicy,

    #[serde(default)]
    pub semester_order: SemesterOrder,
}

impl Default for GradingConfig {
    fn default() -> Self {
        Self {
            scale: ScalePreset::Five,
            max_point: None,
            bands: None,
            credit_policy: CreditPolicy::default(),
            semester_order: SemesterOrder::default(),
        }
    }
}

impl GradingConfig {
    /// Build and validate the configured grading scale.
    pub fn scale(&self) -> Result<GradingScale> {
        let preset = match self.scale {
            ScalePreset::Five => GradingScale::five_point(),
            ScalePreset::Four => GradingScale::four_point(),
        };
        let max_point = self.max_point.unwrap_or(preset.max_point);

        let scale = match &self.bands {
            Some(bands) => GradingScale::new(max_point, bands.clone())?,
            None if max_point == preset.max_point => preset,
            None => {
                let scale = GradingScale::proportional(max_point);
                scale.validate()?;
                scale
            }
        };
        Ok(scale)
    }
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    120
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    #[serde(default)]
    pub format: ReportFormat,

    /// List every course under its semester.
    #[serde(default = "default_true")]
    pub include_courses: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: ReportFormat::Markdown,
            include_courses: true,
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("studentsavvy_report.md")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .grading
            .scale()
            .with_context(|| format!("Invalid [grading] section in {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings; only
    /// values the user actually passed override.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data_file) = args.data_file {
            self.general.data_file = Some(data_file.clone());
        }
        if args.quiet {
            self.general.progress = false;
        }
        if let Some(order) = args.semester_order {
            self.grading.semester_order = order;
        }
        if let Some(policy) = args.credit_policy {
            self.grading.credit_policy = policy;
        }
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
    }

    /// Settings for the model client.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            ollama_url: self.model.ollama_url.clone(),
            model_name: self.model.name.clone(),
            temperature: self.model.temperature,
            timeout_seconds: self.model.timeout_seconds,
            show_progress: self.general.progress,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Letter;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "llama3.2:latest");
        assert_eq!(config.grading.credit_policy, CreditPolicy::RequirePositive);
        assert_eq!(config.grading.semester_order, SemesterOrder::Chronological);
        assert_eq!(config.grading.scale().unwrap(), GradingScale::five_point());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
data_file = "grades/state.json"
progress = false

[grading]
scale = "four"
credit_policy = "allow-zero"
semester_order = "lexical"

[model]
name = "qwen2.5:7b"
temperature = 0.2

[report]
format = "json"
include_courses = false
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.data_file, Some(PathBuf::from("grades/state.json")));
        assert!(!config.general.progress);
        assert_eq!(config.grading.credit_policy, CreditPolicy::AllowZero);
        assert_eq!(config.grading.semester_order, SemesterOrder::Lexical);
        assert_eq!(config.grading.scale().unwrap(), GradingScale::four_point());
        assert_eq!(config.model.name, "qwen2.5:7b");
        assert_eq!(config.model.timeout_seconds, 120);
        assert_eq!(config.report.format, ReportFormat::Json);
        assert!(!config.report.include_courses);
    }

    #[test]
    fn test_custom_bands() {
        let toml_content = r#"
[grading]
max_point = 4.0
bands = [
    { min = 3.5, letter = "A" },
    { min = 3.0, letter = "B" },
    { min = 2.0, letter = "C" },
    { min = 1.0, letter = "D" },
    { min = 0.0, letter = "F" },
]
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        let scale = config.grading.scale().unwrap();
        assert_eq!(scale.letter_for(3.4), Letter::B);
        assert_eq!(scale.letter_for(3.5), Letter::A);
    }

    #[test]
    fn test_custom_bands_with_gap_rejected() {
        let toml_content = r#"
[grading]
max_point = 4.0
bands = [
    { min = 3.0, letter = "A" },
    { min = 1.0, letter = "B" },
]
"#;
        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.grading.scale().is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[grading]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.name, "llama3.2:latest");
    }

    #[test]
    fn test_client_config() {
        let mut config = Config::default();
        config.general.progress = false;
        let client = config.client_config();
        assert_eq!(client.model_name, "llama3.2:latest");
        assert!(!client.show_progress);
    }
}
