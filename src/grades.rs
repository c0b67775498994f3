use crate::models::{
    Course, CourseGradeSummary, Deliverable, DeliverableStatus, GradingScaleEntry, OverallGrade,
};

/// Parse a raw grade expression into a percentage.
///
/// Accepts "87", "87%", and "45/50" (fraction of points earned). Anything
/// else, including a fraction with a zero denominator, yields `None`.
/// Callers must treat `None` as ungraded, never as zero.
pub fn parse_grade_expression(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((numerator, denominator)) = trimmed.split_once('/') {
        if denominator.contains('/') {
            return None;
        }
        let n: f64 = numerator.trim().parse().ok()?;
        let d: f64 = denominator.trim().parse().ok()?;
        if d == 0.0 || !n.is_finite() || !d.is_finite() {
            return None;
        }
        return Some(n / d * 100.0);
    }

    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// The percentage a deliverable counts toward its course average, or `None`
/// if it is ungraded. A present-but-zero or unparseable grade is treated as
/// ungraded; change here if a real 0% should ever count.
pub fn graded_percent(deliverable: &Deliverable) -> Option<f64> {
    let raw = deliverable.grade.as_deref()?;
    match parse_grade_expression(raw) {
        Some(percent) if percent > 0.0 => Some(percent),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct GradingScale {
    entries: Vec<GradingScaleEntry>,
}

impl GradingScale {
    pub fn new(entries: Vec<GradingScaleEntry>) -> Self {
        Self { entries }
    }

    /// Standard ten-point letter scale used until a custom one is configured.
    pub fn default_scale() -> Self {
        let bucket = |min: f64, max: f64, letter: &str, points: f64| GradingScaleEntry {
            min_percent: min,
            max_percent: max,
            letter: letter.to_string(),
            grade_points: points,
        };
        Self::new(vec![
            bucket(90.0, 100.0, "A", 4.0),
            bucket(80.0, 89.99, "B", 3.0),
            bucket(70.0, 79.99, "C", 2.0),
            bucket(60.0, 69.99, "D", 1.0),
            bucket(0.0, 59.99, "F", 0.0),
        ])
    }

    /// Reject scales with overlapping buckets. Classification is first-match
    /// either way, but an overlap is a configuration mistake better caught
    /// when the scale is loaded than papered over per lookup.
    pub fn validate(&self) -> anyhow::Result<()> {
        for entry in &self.entries {
            if entry.min_percent > entry.max_percent {
                anyhow::bail!(
                    "grading scale entry '{}' has min {} above max {}",
                    entry.letter,
                    entry.min_percent,
                    entry.max_percent
                );
            }
        }
        let mut sorted: Vec<&GradingScaleEntry> = self.entries.iter().collect();
        sorted.sort_by(|a, b| {
            a.min_percent
                .partial_cmp(&b.min_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for pair in sorted.windows(2) {
            if pair[1].min_percent <= pair[0].max_percent {
                anyhow::bail!(
                    "grading scale entries '{}' and '{}' overlap",
                    pair[0].letter,
                    pair[1].letter
                );
            }
        }
        Ok(())
    }

    /// First entry whose bounds contain `percent`, inclusive on both ends.
    /// NaN or an out-of-range percentage finds nothing: the caller renders
    /// that as an empty letter with zero grade points.
    pub fn classify(&self, percent: f64) -> Option<&GradingScaleEntry> {
        if percent.is_nan() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| percent >= entry.min_percent && percent <= entry.max_percent)
    }

    pub fn entries(&self) -> &[GradingScaleEntry] {
        &self.entries
    }
}

/// Weighted grade summary for one course's deliverables.
///
/// Only graded items enter the average; an ungraded item's weight is left
/// out of both the numerator and the denominator, so partial completion
/// does not drag the average toward zero. Submitted-but-ungraded work
/// counts toward completion only.
pub fn course_summary(
    course_id: &str,
    deliverables: &[Deliverable],
    scale: &GradingScale,
) -> CourseGradeSummary {
    let mut graded_weight = 0.0;
    let mut graded_sum = 0.0;
    let mut total_weight = 0.0;
    let mut completed_weight = 0.0;

    for deliverable in deliverables.iter().filter(|d| d.course_id == course_id) {
        total_weight += deliverable.weight_percent;
        let graded = graded_percent(deliverable);
        if let Some(percent) = graded {
            graded_weight += deliverable.weight_percent;
            graded_sum += percent * deliverable.weight_percent;
        }
        if graded.is_some() || deliverable.status != DeliverableStatus::Pending {
            completed_weight += deliverable.weight_percent;
        }
    }

    let average_percent = if graded_weight > 0.0 {
        Some(graded_sum / graded_weight)
    } else {
        None
    };
    let bucket = average_percent.and_then(|p| scale.classify(p));

    CourseGradeSummary {
        course_id: course_id.to_string(),
        average_percent,
        letter: bucket.map(|b| b.letter.clone()).unwrap_or_default(),
        grade_points: bucket.map(|b| b.grade_points).unwrap_or(0.0),
        graded_weight,
        total_weight,
        completion_percent: if total_weight > 0.0 {
            completed_weight / total_weight * 100.0
        } else {
            0.0
        },
    }
}

/// Overall GPA across courses: a credit-hour-weighted mean of the course
/// percentages, classified once through the scale. Courses without any
/// graded deliverable contribute nothing to either side of the mean. Not
/// an average of per-course grade points.
pub fn overall_gpa(
    courses: &[Course],
    summaries: &[CourseGradeSummary],
    scale: &GradingScale,
) -> Option<OverallGrade> {
    let mut credit_hours = 0.0;
    let mut weighted_sum = 0.0;

    for course in courses {
        let Some(summary) = summaries.iter().find(|s| s.course_id == course.id) else {
            continue;
        };
        if let Some(percent) = summary.average_percent {
            credit_hours += course.credit_hours;
            weighted_sum += percent * course.credit_hours;
        }
    }

    if credit_hours <= 0.0 {
        return None;
    }

    let average_percent = weighted_sum / credit_hours;
    let bucket = scale.classify(average_percent);
    Some(OverallGrade {
        average_percent,
        gpa: bucket.map(|b| b.grade_points).unwrap_or(0.0),
        letter: bucket.map(|b| b.letter.clone()).unwrap_or_default(),
    })
}
