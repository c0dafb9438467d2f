//! GPA prediction and study-session suggestion flows.

use crate::analysis::{predict_gpa, Prediction, PredictionInput};
use crate::assistant::{ChatMessage, LanguageModel};
use crate::error::{Error, Result};
use crate::models::GradingScale;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

pub const MIN_NOTES_CHARS: usize = 50;
pub const MAX_NOTES_CHARS: usize = 5000;

/// A prediction, plus the model's commentary when it was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    #[serde(flatten)]
    pub prediction: Prediction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    /// Why the commentary is missing, if it was requested and failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commentary_error: Option<String>,
}

/// Predict the GPA after the planned courses.
///
/// The number always comes from the credit-weighted formula. With
/// `explain`, the model is asked to comment on it; if that call fails the
/// prediction is still returned and the failure is carried alongside.
pub async fn predict_future_gpa<M: LanguageModel>(
    model: &M,
    input: &PredictionInput,
    scale: &GradingScale,
    explain: bool,
) -> Result<PredictionOutcome> {
    input.validate(scale)?;
    let prediction = predict_gpa(input, scale);
    info!("Predicted GPA {:.2}", prediction.predicted_gpa);

    let mut outcome = PredictionOutcome {
        prediction,
        commentary: None,
        commentary_error: None,
    };

    if explain {
        let messages = [
            ChatMessage::system(PREDICTION_SYSTEM_PROMPT),
            ChatMessage::user(prediction_prompt(input, scale, prediction)),
        ];
        match model.chat(&messages, false).await {
            Ok(text) if !text.trim().is_empty() => outcome.commentary = Some(text.trim().to_string()),
            Ok(_) => outcome.commentary_error = Some("the model returned an empty reply".to_string()),
            Err(e) => {
                warn!("GPA commentary unavailable: {}", e);
                outcome.commentary_error = Some(e.to_string());
            }
        }
    }

    Ok(outcome)
}

/// Ask the model for study sessions based on lecture notes.
pub async fn suggest_study_sessions<M: LanguageModel>(model: &M, notes: &str) -> Result<Vec<String>> {
    let notes = notes.trim();
    let length = notes.chars().count();
    if length < MIN_NOTES_CHARS {
        return Err(Error::invalid(format!(
            "notes must be at least {} characters (got {})",
            MIN_NOTES_CHARS, length
        )));
    }
    if length > MAX_NOTES_CHARS {
        return Err(Error::invalid(format!(
            "notes must be at most {} characters (got {})",
            MAX_NOTES_CHARS, length
        )));
    }

    let messages = [
        ChatMessage::system(SUGGEST_SYSTEM_PROMPT),
        ChatMessage::user(format!("Text: {}", notes)),
    ];
    let response = model.chat(&messages, true).await?;
    let sessions = parse_sessions(&response)?;
    info!("Model suggested {} study sessions", sessions.len());
    Ok(sessions)
}

/// Pull the session list out of a model reply.
///
/// Accepts `{"sessions": [...]}` or a bare array, wrapped in code fences or
/// prose. Blank entries are dropped.
pub fn parse_sessions(response: &str) -> Result<Vec<String>> {
    let body = strip_code_fences(response);

    let value = [('{', '}'), ('[', ']')]
        .iter()
        .filter_map(|(open, close)| {
            let start = body.find(*open)?;
            let end = body.rfind(*close)?;
            (end > start).then(|| &body[start..=end])
        })
        .find_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
        .ok_or_else(|| Error::Assistant("the model reply did not contain JSON".to_string()))?;

    let items = match &value {
        Value::Object(object) => object.get("sessions").and_then(Value::as_array),
        Value::Array(items) => Some(items),
        _ => None,
    }
    .ok_or_else(|| Error::Assistant("the model reply has no session list".to_string()))?;

    let sessions: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if sessions.is_empty() {
        return Err(Error::Assistant("the model suggested no study sessions".to_string()));
    }
    Ok(sessions)
}

fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the language tag line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

fn prediction_prompt(input: &PredictionInput, scale: &GradingScale, prediction: Prediction) -> String {
    let mut prompt = format!(
        "The GPA scale is {:.1}.\n\nCurrent GPA: {:.2}\nTotal Credits: {}\nCourses:\n",
        scale.max_point, input.current_gpa, input.total_credits
    );
    for course in &input.courses {
        prompt.push_str(&format!(
            "- Course: {}, Expected Grade: {}, Credits: {}\n",
            course.name, course.expected_grade, course.credits
        ));
    }
    prompt.push_str(&format!(
        "\nPredicted GPA: {:.2}\n\nIn two or three sentences, explain what this prediction means for the student and which course matters most.",
        prediction.predicted_gpa
    ));
    prompt
}

const PREDICTION_SYSTEM_PROMPT: &str = r#"You are a helpful academic advisor.
The student's predicted GPA has already been calculated; do not recalculate it or contradict it.
Reply in plain prose, without lists or markdown."#;

const SUGGEST_SYSTEM_PROMPT: &str = r#"You are an AI study assistant. Given the text from the user, generate a list of study sessions that would be helpful for a student.
Each session should be concise and actionable.
Reply only with JSON in this shape:
{"sessions": ["Review key concepts from chapter 3", "Practice problems on sections 3.1-3.3"]}"#;
