use serde::{Deserialize, Serialize};

/// Whole years of experience a candidate must exceed to count as senior.
pub const SENIOR_YEAR_EXPERIENCE: i32 = 5;

/// Which branch a candidate takes after the coding test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Standard,
    Senior,
}

impl Seniority {
    pub fn from_experience_months(months: Option<i32>) -> Self {
        let years = months.unwrap_or(0).max(0).div_euclid(12);
        if years > SENIOR_YEAR_EXPERIENCE {
            Seniority::Senior
        } else {
            Seniority::Standard
        }
    }

    pub const fn is_senior(self) -> bool {
        matches!(self, Seniority::Senior)
    }
}

impl From<bool> for Seniority {
    fn from(is_senior: bool) -> Self {
        if is_senior {
            Seniority::Senior
        } else {
            Seniority::Standard
        }
    }
}

/// Computed once at intake and stored with the candidate.
pub fn is_senior(experience_month: Option<i32>) -> bool {
    Seniority::from_experience_months(experience_month).is_senior()
}
