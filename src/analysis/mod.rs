//! Grade analysis modules.
//!
//! The aggregation engine, semester ordering and GPA prediction. Everything
//! here takes plain records and returns plain data.

pub mod aggregator;
pub mod chronology;
pub mod prediction;

pub use aggregator::*;
pub use chronology::SemesterOrder;
pub use prediction::{predict_gpa, PlannedCourse, Prediction, PredictionInput};
