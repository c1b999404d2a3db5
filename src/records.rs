use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder when the place name cannot be read from the page.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Placeholder when neither reviewer-name selector matches.
pub const UNKNOWN_REVIEWER: &str = "Unknown Reviewer";

/// One observed review. Created once per review card during a harvesting
/// pass and never mutated afterwards. Column names match the CSV layout
/// so previously exported datasets load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub location: String,
    pub reviewer_name: String,
    pub rating: f64,
    /// Verbatim phrase from the page, e.g. "2 days ago".
    pub time_text: String,
    /// Best-effort absolute time derived from `time_text`; never more
    /// precise than the phrase implies.
    pub exact_time: DateTime<Utc>,
    /// Identical for every record of one pass.
    pub scraped_at: DateTime<Utc>,
}

/// Per-month summary of the record set. Months without any contributing
/// record are never emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u32,
    pub avg_rating: f64,
    pub review_count: usize,
}

impl MonthlyStat {
    /// Axis label like "Mar 2022".
    pub fn month_label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(date) => date.format("%b %Y").to_string(),
            None => format!("{:04}-{:02}", self.year, self.month),
        }
    }
}
