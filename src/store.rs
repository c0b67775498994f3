use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::grades::GradingScale;
use crate::models::{Course, Deliverable, DeliverableStatus, GradingScaleEntry, ScheduleEntry};

/// JSON-file-backed store. Each record type lives in its own document
/// under the data directory; a missing document reads as empty.
pub struct Store {
    data_dir: PathBuf,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> anyhow::Result<Vec<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn write_json<T: Serialize>(&self, file: &str, records: &[T]) -> anyhow::Result<()> {
        let path = self.path(file);
        let raw = serde_json::to_string_pretty(records)?;
        fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Create the data directory and a default grading scale if none exists.
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        if !self.path("grading_scale.json").exists() {
            let scale = GradingScale::default_scale();
            self.write_json("grading_scale.json", scale.entries())?;
        }
        Ok(())
    }

    pub fn load_courses(&self) -> anyhow::Result<Vec<Course>> {
        self.read_json("courses.json")
    }

    pub fn load_deliverables(&self) -> anyhow::Result<Vec<Deliverable>> {
        self.read_json("deliverables.json")
    }

    pub fn load_schedule(&self) -> anyhow::Result<Vec<ScheduleEntry>> {
        self.read_json("schedule.json")
    }

    /// Load the grading scale, falling back to the default when none is
    /// configured. A misconfigured scale fails here, at load time.
    pub fn load_scale(&self) -> anyhow::Result<GradingScale> {
        let entries: Vec<GradingScaleEntry> = self.read_json("grading_scale.json")?;
        let scale = if entries.is_empty() {
            GradingScale::default_scale()
        } else {
            GradingScale::new(entries)
        };
        scale.validate().context("grading scale is misconfigured")?;
        Ok(scale)
    }

    pub fn save_courses(&self, courses: &[Course]) -> anyhow::Result<()> {
        self.write_json("courses.json", courses)
    }

    pub fn save_deliverables(&self, deliverables: &[Deliverable]) -> anyhow::Result<()> {
        self.write_json("deliverables.json", deliverables)
    }

    pub fn save_schedule(&self, schedule: &[ScheduleEntry]) -> anyhow::Result<()> {
        self.write_json("schedule.json", schedule)
    }

    /// Load realistic sample data.
    pub fn seed(&self) -> anyhow::Result<()> {
        self.init()?;

        let courses = vec![
            Course {
                id: "math101".to_string(),
                name: "Calculus I".to_string(),
                credit_hours: 4.0,
            },
            Course {
                id: "bio202".to_string(),
                name: "Molecular Biology".to_string(),
                credit_hours: 3.0,
            },
            Course {
                id: "hist150".to_string(),
                name: "Modern History".to_string(),
                credit_hours: 3.0,
            },
        ];

        let due = |y, m, d| {
            Utc.with_ymd_and_hms(y, m, d, 23, 59, 0)
                .single()
                .context("invalid date")
        };
        let deliverable = |course_id: &str,
                           category: &str,
                           title: &str,
                           weight: f64,
                           grade: Option<&str>,
                           status: DeliverableStatus,
                           close: chrono::DateTime<Utc>| Deliverable {
            id: Uuid::new_v4(),
            course_id: course_id.to_string(),
            category: category.to_string(),
            title: title.to_string(),
            open_date: None,
            close_date: Some(close),
            weight_percent: weight,
            grade: grade.map(str::to_string),
            letter_grade: None,
            status,
        };

        let deliverables = vec![
            deliverable(
                "math101",
                "homework",
                "Problem set 1",
                10.0,
                Some("45/50"),
                DeliverableStatus::Graded,
                due(2026, 1, 23)?,
            ),
            deliverable(
                "math101",
                "exam",
                "Midterm",
                30.0,
                Some("82%"),
                DeliverableStatus::Graded,
                due(2026, 3, 6)?,
            ),
            deliverable(
                "math101",
                "exam",
                "Final",
                40.0,
                None,
                DeliverableStatus::Pending,
                due(2026, 5, 8)?,
            ),
            deliverable(
                "bio202",
                "lab",
                "Lab report 1",
                20.0,
                Some("88"),
                DeliverableStatus::Graded,
                due(2026, 2, 13)?,
            ),
            deliverable(
                "bio202",
                "paper",
                "Term paper",
                30.0,
                None,
                DeliverableStatus::Submitted,
                due(2026, 4, 17)?,
            ),
            deliverable(
                "hist150",
                "essay",
                "Essay 1",
                25.0,
                None,
                DeliverableStatus::Pending,
                due(2026, 3, 20)?,
            ),
        ];

        let class = |course_id: &str, day: &str, start, end, location: &str| ScheduleEntry {
            course_id: course_id.to_string(),
            day_of_week: day.to_string(),
            start,
            end,
            location: Some(location.to_string()),
            recurring: true,
            period: None,
        };
        let at = |y, m, d, h, min| {
            Utc.with_ymd_and_hms(y, m, d, h, min, 0)
                .single()
                .context("invalid date")
        };

        let schedule = vec![
            class(
                "math101",
                "Monday",
                at(2026, 1, 12, 9, 0)?,
                at(2026, 1, 12, 10, 30)?,
                "Hall A",
            ),
            class(
                "math101",
                "Wednesday",
                at(2026, 1, 14, 9, 0)?,
                at(2026, 1, 14, 10, 30)?,
                "Hall A",
            ),
            class(
                "bio202",
                "Tuesday",
                at(2026, 1, 13, 13, 0)?,
                at(2026, 1, 13, 15, 0)?,
                "Lab 3",
            ),
            class(
                "hist150",
                "Thursday",
                at(2026, 1, 15, 11, 0)?,
                at(2026, 1, 15, 12, 30)?,
                "Room 210",
            ),
        ];

        self.save_courses(&courses)?;
        self.save_deliverables(&deliverables)?;
        self.save_schedule(&schedule)?;
        Ok(())
    }

    /// Import deliverables from a CSV file, skipping rows that duplicate an
    /// existing (course, title) pair. Returns the number inserted.
    pub fn import_csv(&self, csv_path: &Path) -> anyhow::Result<usize> {
        #[derive(serde::Deserialize)]
        struct CsvRow {
            course_id: String,
            category: String,
            title: String,
            weight_percent: f64,
            grade: Option<String>,
            close_date: Option<chrono::DateTime<Utc>>,
        }

        let mut deliverables = self.load_deliverables()?;
        let mut reader = csv::Reader::from_path(csv_path)
            .with_context(|| format!("failed to open {}", csv_path.display()))?;
        let mut inserted = 0usize;

        for result in reader.deserialize::<CsvRow>() {
            let row = result?;
            let exists = deliverables
                .iter()
                .any(|d| d.course_id == row.course_id && d.title == row.title);
            if exists {
                continue;
            }

            let graded = row
                .grade
                .as_deref()
                .is_some_and(|g| !g.trim().is_empty());
            deliverables.push(Deliverable {
                id: Uuid::new_v4(),
                course_id: row.course_id,
                category: row.category,
                title: row.title,
                open_date: None,
                close_date: row.close_date,
                weight_percent: row.weight_percent,
                grade: row.grade.filter(|g| !g.trim().is_empty()),
                letter_grade: None,
                status: if graded {
                    DeliverableStatus::Graded
                } else {
                    DeliverableStatus::Pending
                },
            });
            inserted += 1;
        }

        self.init()?;
        self.save_deliverables(&deliverables)?;
        Ok(inserted)
    }
}
