use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};

use crate::models::{CalendarEvent, ScheduleEntry};

pub const DEFAULT_LOOK_AHEAD_DAYS: i64 = 180;

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// One UID per schedule template, shared by every occurrence, so a calendar
/// client updates the series on re-fetch instead of duplicating it.
fn template_uid(entry: &ScheduleEntry) -> String {
    let course = entry.course_id.replace(char::is_whitespace, "-");
    format!(
        "{}-{}-{}@coursedesk",
        course,
        entry.day_of_week.trim().to_ascii_lowercase(),
        entry.start.format("%Y%m%dT%H%M%SZ")
    )
}

fn occurrence(entry: &ScheduleEntry, start: DateTime<Utc>, end: DateTime<Utc>) -> CalendarEvent {
    CalendarEvent {
        uid: template_uid(entry),
        start,
        end,
        summary: entry.course_id.clone(),
        location: entry.location.clone(),
        description: entry.period.as_ref().map(|p| format!("Period {p}")),
    }
}

/// Materialize concrete events from schedule templates.
///
/// Non-recurring entries emit exactly one event at their own timestamps.
/// Recurring entries walk day by day from their original start date through
/// `reference_now + look_ahead_days`, emitting an occurrence on every
/// matching weekday; each occurrence keeps the template's time-of-day.
/// Entries with an unrecognized weekday name are skipped. Output is in
/// entry order, chronological within each template, and identical across
/// calls for the same inputs and `reference_now`.
pub fn expand(
    entries: &[ScheduleEntry],
    look_ahead_days: i64,
    reference_now: DateTime<Utc>,
) -> Vec<CalendarEvent> {
    let horizon = (reference_now + Duration::days(look_ahead_days)).date_naive();
    let mut events = Vec::new();

    for entry in entries {
        if !entry.recurring {
            events.push(occurrence(entry, entry.start, entry.end));
            continue;
        }

        let Some(weekday) = parse_weekday(&entry.day_of_week) else {
            continue;
        };

        let start_time = entry.start.time();
        let end_time = entry.end.time();
        let mut date = entry.start.date_naive();
        while date <= horizon {
            if date.weekday() == weekday {
                let start = Utc.from_utc_datetime(&date.and_time(start_time));
                let end = Utc.from_utc_datetime(&date.and_time(end_time));
                events.push(occurrence(entry, start, end));
            }
            date += Duration::days(1);
        }
    }

    events
}

/// Escape iCalendar TEXT values; order matters, backslash first.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}

fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Serialize events into a single VCALENDAR document. `generated_at` stamps
/// DTSTAMP and LAST-MODIFIED so the output is reproducible for a fixed
/// clock; events are never versioned, so SEQUENCE stays 0.
pub fn to_ics(events: &[CalendarEvent], generated_at: DateTime<Utc>) -> String {
    let stamp = format_utc(generated_at);
    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "PRODID:-//coursedesk//Course Schedule//EN".to_string(),
        "VERSION:2.0".to_string(),
        "METHOD:PUBLISH".to_string(),
        "X-WR-CALNAME:Course Schedule".to_string(),
    ];

    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("SUMMARY:{}", escape_text(&event.summary)));
        if let Some(location) = &event.location {
            lines.push(format!("LOCATION:{}", escape_text(location)));
        }
        if let Some(description) = &event.description {
            lines.push(format!("DESCRIPTION:{}", escape_text(description)));
        }
        lines.push("CLASS:PUBLIC".to_string());
        lines.push(format!("DTSTART:{}", format_utc(event.start)));
        lines.push(format!("DTEND:{}", format_utc(event.end)));
        lines.push(format!("UID:{}", event.uid));
        lines.push("SEQUENCE:0".to_string());
        lines.push(format!("LAST-MODIFIED:{stamp}"));
        lines.push("END:VEVENT".to_string());
    }

    lines.push("END:VCALENDAR".to_string());
    let mut document = lines.join("\r\n");
    document.push_str("\r\n");
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
    }

    fn entry(course_id: &str, day: &str, start: DateTime<Utc>, end: DateTime<Utc>, recurring: bool) -> ScheduleEntry {
        ScheduleEntry {
            course_id: course_id.to_string(),
            day_of_week: day.to_string(),
            start,
            end,
            location: Some("Room 12".to_string()),
            recurring,
            period: None,
        }
    }

    #[test]
    fn non_recurring_entry_emits_exactly_one_event() {
        let exam = entry(
            "math101",
            "Friday",
            utc(2026, 3, 6, 9, 0),
            utc(2026, 3, 6, 11, 0),
            false,
        );
        let events = expand(&[exam], 365, utc(2026, 1, 1, 0, 0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, utc(2026, 3, 6, 9, 0));
        assert_eq!(events[0].end, utc(2026, 3, 6, 11, 0));
    }

    #[test]
    fn recurring_tuesday_over_two_weeks_from_monday() {
        // 2026-01-05 is a Monday, 2026-01-06 a Tuesday.
        let class = entry(
            "bio202",
            "Tuesday",
            utc(2026, 1, 6, 10, 0),
            utc(2026, 1, 6, 11, 0),
            true,
        );
        let events = expand(&[class], 14, utc(2026, 1, 5, 0, 0));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].start, utc(2026, 1, 6, 10, 0));
        assert_eq!(events[0].end, utc(2026, 1, 6, 11, 0));
        assert_eq!(events[1].start, utc(2026, 1, 13, 10, 0));
        assert_eq!(events[1].end, utc(2026, 1, 13, 11, 0));
    }

    #[test]
    fn occurrences_share_the_template_uid() {
        let class = entry(
            "bio202",
            "Tuesday",
            utc(2026, 1, 6, 10, 0),
            utc(2026, 1, 6, 11, 0),
            true,
        );
        let events = expand(&[class], 30, utc(2026, 1, 5, 0, 0));
        assert!(events.len() > 1);
        assert!(events.iter().all(|e| e.uid == events[0].uid));
    }

    #[test]
    fn unknown_weekday_is_skipped() {
        let bad = entry(
            "bio202",
            "Someday",
            utc(2026, 1, 6, 10, 0),
            utc(2026, 1, 6, 11, 0),
            true,
        );
        let good = entry(
            "math101",
            "Wednesday",
            utc(2026, 1, 7, 8, 0),
            utc(2026, 1, 7, 9, 0),
            true,
        );
        let events = expand(&[bad, good], 7, utc(2026, 1, 5, 0, 0));
        assert!(events.iter().all(|e| e.summary == "math101"));
        assert!(!events.is_empty());
    }

    #[test]
    fn expand_is_idempotent_for_a_fixed_reference_now() {
        let entries = vec![
            entry(
                "bio202",
                "Tuesday",
                utc(2026, 1, 6, 10, 0),
                utc(2026, 1, 6, 11, 0),
                true,
            ),
            entry(
                "math101",
                "Friday",
                utc(2026, 1, 9, 13, 0),
                utc(2026, 1, 9, 14, 30),
                true,
            ),
        ];
        let now = utc(2026, 1, 5, 12, 0);
        let first = expand(&entries, 60, now);
        let second = expand(&entries, 60, now);
        assert_eq!(first, second);
    }

    #[test]
    fn escapes_reserved_text_characters() {
        let event = CalendarEvent {
            uid: "x@coursedesk".to_string(),
            start: utc(2026, 1, 6, 10, 0),
            end: utc(2026, 1, 6, 11, 0),
            summary: "Lab; intro, part\\one\nnotes".to_string(),
            location: None,
            description: None,
        };
        let ics = to_ics(&[event], utc(2026, 1, 5, 0, 0));
        assert!(ics.contains("SUMMARY:Lab\\; intro\\, part\\\\one\\nnotes"));
    }

    #[test]
    fn ics_document_carries_required_fields() {
        let class = entry(
            "bio202",
            "Tuesday",
            utc(2026, 1, 6, 10, 0),
            utc(2026, 1, 6, 11, 0),
            false,
        );
        let ics = to_ics(&expand(&[class], 14, utc(2026, 1, 5, 0, 0)), utc(2026, 1, 5, 0, 0));
        for field in [
            "BEGIN:VCALENDAR",
            "PRODID:",
            "VERSION:2.0",
            "METHOD:PUBLISH",
            "DTSTAMP:20260105T000000Z",
            "DTSTART:20260106T100000Z",
            "DTEND:20260106T110000Z",
            "SEQUENCE:0",
            "END:VCALENDAR",
        ] {
            assert!(ics.contains(field), "missing {field}");
        }
    }

    fn parse_event_triples(ics: &str) -> Vec<(String, String, String)> {
        let mut triples = Vec::new();
        let (mut uid, mut start, mut end) = (String::new(), String::new(), String::new());
        for line in ics.lines() {
            if let Some(value) = line.strip_prefix("UID:") {
                uid = value.to_string();
            } else if let Some(value) = line.strip_prefix("DTSTART:") {
                start = value.to_string();
            } else if let Some(value) = line.strip_prefix("DTEND:") {
                end = value.to_string();
            } else if line == "END:VEVENT" {
                triples.push((uid.clone(), start.clone(), end.clone()));
            }
        }
        triples
    }

    #[test]
    fn serialized_document_round_trips_event_triples() {
        let entries = vec![
            entry(
                "bio202",
                "Tuesday",
                utc(2026, 1, 6, 10, 0),
                utc(2026, 1, 6, 11, 0),
                true,
            ),
            entry(
                "math101",
                "Friday",
                utc(2026, 1, 9, 13, 0),
                utc(2026, 1, 9, 14, 30),
                false,
            ),
        ];
        let events = expand(&entries, 21, utc(2026, 1, 5, 0, 0));
        let ics = to_ics(&events, utc(2026, 1, 5, 0, 0));

        let expected: Vec<(String, String, String)> = events
            .iter()
            .map(|e| {
                (
                    e.uid.clone(),
                    format_utc(e.start),
                    format_utc(e.end),
                )
            })
            .collect();
        assert_eq!(parse_event_triples(&ics), expected);
    }

    #[test]
    fn recurring_walk_starts_at_the_entry_date_not_reference_now() {
        // Template began in the past; occurrences before reference_now are
        // still emitted because the walk starts at the entry's own date.
        let class = entry(
            "bio202",
            "Tuesday",
            utc(2025, 12, 30, 10, 0),
            utc(2025, 12, 30, 11, 0),
            true,
        );
        let events = expand(&[class], 7, utc(2026, 1, 5, 0, 0));
        let first_date = events[0].start.date_naive();
        assert_eq!(first_date, NaiveDate::from_ymd_opt(2025, 12, 30).unwrap());
    }
}
