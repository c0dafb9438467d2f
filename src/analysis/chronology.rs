//! Semester ordering.
//!
//! Year and session labels are free text ("Year 10", "2nd Semester",
//! "Harmattan"), so plain string order gets them wrong. The chronological
//! comparator ranks each label by the number or ordinal it carries and
//! only falls back to text comparison for labels without one.

use crate::models::SemesterKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// How semesters are ordered in trajectories and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SemesterOrder {
    /// Rank year and session labels by the period they name.
    #[default]
    Chronological,
    /// Legacy string sort on the combined label. Misorders "Year 10" before
    /// "Year 2"; kept for comparison with old exports only.
    Lexical,
}

impl SemesterOrder {
    /// Log once per run when the non-authoritative ordering is selected.
    pub fn warn_if_legacy(&self) {
        if *self == SemesterOrder::Lexical {
            warn!("Lexical semester ordering is a legacy mode; multi-digit years and named sessions may be misordered");
        }
    }
}

/// Sort key for one label: ranked labels first, by rank, then by folded text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct LabelRank {
    unranked: bool,
    rank: u64,
    folded: String,
}

impl LabelRank {
    fn of(label: &str) -> Self {
        let rank = label_rank(label);
        Self {
            unranked: rank.is_none(),
            rank: rank.unwrap_or(0),
            folded: label.trim().to_lowercase(),
        }
    }
}

/// Compare two semester keys under the given ordering.
///
/// Both orderings end with a comparison of the raw labels, so the result
/// is a total order consistent with key equality.
pub fn compare_keys(a: &SemesterKey, b: &SemesterKey, order: SemesterOrder) -> Ordering {
    let primary = match order {
        SemesterOrder::Chronological => LabelRank::of(&a.year)
            .cmp(&LabelRank::of(&b.year))
            .then_with(|| LabelRank::of(&a.session).cmp(&LabelRank::of(&b.session))),
        SemesterOrder::Lexical => a.label().cmp(&b.label()),
    };

    primary
        .then_with(|| a.year.cmp(&b.year))
        .then_with(|| a.session.cmp(&b.session))
}

/// Rank a label by the first number it contains, else by an ordinal or
/// term word ("second", "spring").
fn label_rank(label: &str) -> Option<u64> {
    first_number(label).or_else(|| {
        label
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .find_map(|word| word_rank(&word.to_lowercase()))
    })
}

fn first_number(label: &str) -> Option<u64> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

fn word_rank(word: &str) -> Option<u64> {
    let rank = match word {
        "first" | "one" => 1,
        "second" | "two" => 2,
        "third" | "three" => 3,
        "fourth" | "four" => 4,
        "fifth" | "five" => 5,
        "sixth" | "six" => 6,
        // Term names, in academic-year order.
        "fall" | "autumn" | "harmattan" => 1,
        "winter" | "rain" => 2,
        "spring" => 3,
        "summer" => 4,
        _ => return None,
    };
    Some(rank)
}
