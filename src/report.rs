use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::calendar;
use crate::grades::{self, GradingScale};
use crate::models::{Course, Deliverable, ScheduleEntry};

pub fn build_report(
    courses: &[Course],
    deliverables: &[Deliverable],
    schedule: &[ScheduleEntry],
    scale: &GradingScale,
    now: DateTime<Utc>,
) -> String {
    let summaries: Vec<_> = courses
        .iter()
        .map(|course| grades::course_summary(&course.id, deliverables, scale))
        .collect();
    let overall = grades::overall_gpa(courses, &summaries, scale);

    let mut output = String::new();
    let _ = writeln!(output, "# Course Grade Report");
    let _ = writeln!(output, "Generated {}", now.format("%Y-%m-%d"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Courses");

    if courses.is_empty() {
        let _ = writeln!(output, "No courses on record.");
    } else {
        for (course, summary) in courses.iter().zip(summaries.iter()) {
            match summary.average_percent {
                Some(percent) => {
                    let _ = writeln!(
                        output,
                        "- {} ({} cr): {:.1}% {} ({:.1} gp), {:.0}% complete",
                        course.name,
                        course.credit_hours,
                        percent,
                        summary.letter,
                        summary.grade_points,
                        summary.completion_percent
                    );
                }
                None => {
                    let _ = writeln!(
                        output,
                        "- {} ({} cr): No grades available, {:.0}% complete",
                        course.name, course.credit_hours, summary.completion_percent
                    );
                }
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Overall");
    match overall {
        Some(grade) => {
            let _ = writeln!(
                output,
                "Weighted average {:.2}% -> {} (GPA {:.1})",
                grade.average_percent, grade.letter, grade.gpa
            );
        }
        None => {
            let _ = writeln!(output, "No grades available.");
        }
    }

    let mut events = calendar::expand(schedule, 14, now);
    events.retain(|event| event.start >= now);
    events.sort_by_key(|event| event.start);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Next Two Weeks");

    if events.is_empty() {
        let _ = writeln!(output, "No scheduled sessions.");
    } else {
        for event in events.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} on {}{}",
                event.summary,
                event.start.format("%a %Y-%m-%d %H:%M"),
                event
                    .location
                    .as_deref()
                    .map(|l| format!(" ({l})"))
                    .unwrap_or_default()
            );
        }
    }

    output
}
