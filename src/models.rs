use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub credit_hours: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliverableStatus {
    Pending,
    Submitted,
    Graded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: Uuid,
    pub course_id: String,
    pub category: String,
    pub title: String,
    #[serde(default)]
    pub open_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_date: Option<DateTime<Utc>>,
    pub weight_percent: f64,
    /// Raw grade expression as entered: "87", "87%", or "45/50".
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub letter_grade: Option<String>,
    pub status: DeliverableStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradingScaleEntry {
    pub min_percent: f64,
    pub max_percent: f64,
    pub letter: String,
    pub grade_points: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub course_id: String,
    /// Weekday name ("Monday".."Sunday"); entries with an unrecognized
    /// name are skipped during calendar expansion.
    pub day_of_week: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub location: Option<String>,
    pub recurring: bool,
    #[serde(default)]
    pub period: Option<String>,
}

/// Computed fresh from the current deliverable set; never persisted.
#[derive(Debug, Clone)]
pub struct CourseGradeSummary {
    pub course_id: String,
    /// `None` means no grades available, which is distinct from 0%.
    pub average_percent: Option<f64>,
    pub letter: String,
    pub grade_points: f64,
    pub graded_weight: f64,
    pub total_weight: f64,
    pub completion_percent: f64,
}

#[derive(Debug, Clone)]
pub struct OverallGrade {
    pub average_percent: f64,
    pub gpa: f64,
    pub letter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub uid: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub location: Option<String>,
    pub description: Option<String>,
}
