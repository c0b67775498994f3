use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};

mod calendar;
mod grades;
mod models;
mod report;
mod store;

use store::Store;

#[derive(Parser)]
#[command(name = "coursedesk")]
#[command(about = "Course, grade, and schedule tracker", long_about = None)]
struct Cli {
    /// Data directory holding the JSON record files; defaults to the
    /// COURSEDESK_DATA environment variable, then "data"
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and default grading scale
    Init,
    /// Load realistic seed data
    Seed,
    /// Import deliverables from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show per-course grade summaries and the overall GPA
    Grades {
        #[arg(long)]
        course: Option<String>,
    },
    /// Write the schedule as an ICS calendar feed
    Calendar {
        #[arg(long, default_value_t = calendar::DEFAULT_LOOK_AHEAD_DAYS)]
        days: i64,
        #[arg(long, default_value = "schedule.ics")]
        out: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var_os("COURSEDESK_DATA").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"));
    let store = Store::new(&data_dir);

    match cli.command {
        Commands::Init => {
            store.init()?;
            println!("Data directory ready at {}.", data_dir.display());
        }
        Commands::Seed => {
            store.seed()?;
            println!("Seed data written.");
        }
        Commands::Import { csv } => {
            let inserted = store.import_csv(&csv)?;
            println!("Inserted {inserted} deliverables from {}.", csv.display());
        }
        Commands::Grades { course } => {
            let scale = store.load_scale()?;
            let mut courses = store.load_courses()?;
            if let Some(id) = course {
                courses.retain(|c| c.id == id);
                if courses.is_empty() {
                    println!("No course with id {id}.");
                    return Ok(());
                }
            }
            let deliverables = store.load_deliverables()?;

            let summaries: Vec<_> = courses
                .iter()
                .map(|c| grades::course_summary(&c.id, &deliverables, &scale))
                .collect();

            for (course, summary) in courses.iter().zip(summaries.iter()) {
                match summary.average_percent {
                    Some(percent) => println!(
                        "{} ({} cr): {:.1}% {} ({:.1} gp), {:.0}% complete",
                        course.name,
                        course.credit_hours,
                        percent,
                        summary.letter,
                        summary.grade_points,
                        summary.completion_percent
                    ),
                    None => println!(
                        "{} ({} cr): No grades available, {:.0}% complete",
                        course.name, course.credit_hours, summary.completion_percent
                    ),
                }
            }

            match grades::overall_gpa(&courses, &summaries, &scale) {
                Some(overall) => println!(
                    "Overall: {:.2}% -> {} (GPA {:.1})",
                    overall.average_percent, overall.letter, overall.gpa
                ),
                None => println!("Overall: No grades available."),
            }
        }
        Commands::Calendar { days, out } => {
            let schedule = store.load_schedule()?;
            let now = Utc::now();
            let events = calendar::expand(&schedule, days, now);
            std::fs::write(&out, calendar::to_ics(&events, now))?;
            println!("Wrote {} events to {}.", events.len(), out.display());
        }
        Commands::Report { out } => {
            let scale = store.load_scale()?;
            let courses = store.load_courses()?;
            let deliverables = store.load_deliverables()?;
            let schedule = store.load_schedule()?;
            let report =
                report::build_report(&courses, &deliverables, &schedule, &scale, Utc::now());
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
