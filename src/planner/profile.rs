//! The student profile collected at onboarding.

use crate::error::Result;
use crate::planner::{check_min_len, finish};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub university: String,
    pub faculty: String,
    pub department: String,
    pub year: String,
}

impl UserProfile {
    /// Check every field, reporting each one that fails.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        check_min_len(&mut problems, "name", &self.name, 2);
        check_min_len(&mut problems, "university", &self.university, 3);
        check_min_len(&mut problems, "faculty", &self.faculty, 2);
        check_min_len(&mut problems, "department", &self.department, 2);
        if self.year.trim().is_empty() {
            problems.push("year is required".to_string());
        }
        finish(problems)
    }

    /// Trimmed copy of the profile.
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            university: self.university.trim().to_string(),
            faculty: self.faculty.trim().to_string(),
            department: self.department.trim().to_string(),
            year: self.year.trim().to_string(),
        }
    }
}
