use std::future::Future;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{Datelike, Local, NaiveDate, Weekday};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use campus_portal::actions::{self, Attendee};
use campus_portal::calendar::{date_label, exam_urgency, DateBuckets, DateRange, Urgency};
use campus_portal::config::Config;
use campus_portal::filter::{Criteria, Selection};
use campus_portal::models::{ClassSession, Event, EventRegistration, ExamRecord};
use campus_portal::report;
use campus_portal::store::CsvStore;
use campus_portal::views::{
    self, AcademicsView, AnnouncementsView, AttendanceView, DashboardView, EventsView,
    FacultyView, LibraryView, ViewState,
};

#[derive(Parser)]
#[command(name = "campus-portal")]
#[command(about = "Student portal views over a directory of CSV records", long_about = None)]
struct Cli {
    /// Directory with one CSV file per record kind (overrides PORTAL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Day used for today/upcoming/past, defaults to the local date
    #[arg(long, global = true)]
    today: Option<NaiveDate>,
    /// Print the view as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct AttendeeArgs {
    /// Event id as printed by `events`
    #[arg(long)]
    event_id: Uuid,
    #[arg(long)]
    student_id: String,
    #[arg(long, default_value = "Student")]
    name: String,
    #[arg(long)]
    email: Option<String>,
}

impl AttendeeArgs {
    fn attendee(self) -> (Uuid, Attendee) {
        let attendee = Attendee {
            student_id: self.student_id,
            name: self.name,
            email: self.email,
        };
        (self.event_id, attendee)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Today's classes, recent attendance and headline numbers
    Dashboard,
    /// CGPA, per-semester GPA and grade records
    Academics {
        #[arg(long)]
        semester: Option<String>,
    },
    /// Attendance rate and records
    Attendance {
        #[arg(long)]
        subject: Option<String>,
        /// all, current, previous or START..END
        #[arg(long, default_value = "current")]
        month: String,
    },
    /// Exams due today, upcoming and completed
    Exams,
    /// Events happening today, upcoming and past
    Events {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Announcements, most urgent first
    Announcements {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Library catalogue
    Library {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        status: Option<String>,
    },
    /// Faculty directory
    Faculty {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// Class timetable for one day
    Schedule {
        /// Defaults to the weekday of --today
        #[arg(long)]
        day: Option<Weekday>,
    },
    /// Register for an event
    Register(AttendeeArgs),
    /// Turn the reminder for an event on or off, registering if needed
    Remind(AttendeeArgs),
    /// Mark a registered student as present at an event
    CheckIn {
        #[arg(long)]
        event_id: Uuid,
        #[arg(long)]
        student_id: String,
    },
    /// Rate a completed event you checked in to
    Review {
        #[arg(long)]
        event_id: Uuid,
        #[arg(long)]
        student_id: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long)]
        text: Option<String>,
    },
    /// Write a markdown summary report
    Report {
        #[arg(long)]
        student: Option<String>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let store = CsvStore::new(&config.data_dir);
    info!(data_dir = %config.data_dir.display(), %today, "opening portal data");

    match cli.command {
        Commands::Dashboard => {
            show(
                views::dashboard_view(&store, today, config.recent_limit),
                json,
                print_dashboard,
            )
            .await?;
        }
        Commands::Academics { semester } => {
            show(
                views::academics_view(&store, Selection::from(semester)),
                json,
                print_academics,
            )
            .await?;
        }
        Commands::Attendance { subject, month } => {
            let range = DateRange::parse(&month, today).context("invalid --month")?;
            show(
                views::attendance_view(&store, Selection::from(subject), range),
                json,
                print_attendance,
            )
            .await?;
        }
        Commands::Exams => {
            show(
                views::exams_view(&store, today),
                json,
                |buckets: &DateBuckets<ExamRecord>| print_exams(buckets, today),
            )
            .await?;
        }
        Commands::Events { search, category } => {
            let criteria = Criteria::new()
                .search(search.unwrap_or_default())
                .with("category", category);
            show(
                views::events_view(&store, &criteria, today),
                json,
                |view: &EventsView| print_events(&view.buckets),
            )
            .await?;
        }
        Commands::Announcements {
            search,
            category,
            priority,
        } => {
            let criteria = Criteria::new()
                .search(search.unwrap_or_default())
                .with("category", category)
                .with("priority", priority);
            show(
                views::announcements_view(&store, &criteria),
                json,
                |view: &AnnouncementsView| print_announcements(view, today),
            )
            .await?;
        }
        Commands::Library {
            search,
            category,
            status,
        } => {
            let criteria = Criteria::new()
                .search(search.unwrap_or_default())
                .with("category", category)
                .with("status", status);
            show(views::library_view(&store, &criteria), json, print_library).await?;
        }
        Commands::Faculty { search, department } => {
            let criteria = Criteria::new()
                .search(search.unwrap_or_default())
                .with("department", department);
            show(views::faculty_view(&store, &criteria), json, print_faculty).await?;
        }
        Commands::Schedule { day } => {
            let day = day.unwrap_or_else(|| today.weekday());
            show(
                views::schedule_view(&store, day),
                json,
                |sessions: &Vec<ClassSession>| print_schedule(sessions, day),
            )
            .await?;
        }
        Commands::Register(args) => {
            let (event_id, attendee) = args.attendee();
            let registration = actions::register_for_event(&store, event_id, &attendee)
                .await
                .context("failed to register")?;
            print_registration(&registration, json)?;
        }
        Commands::Remind(args) => {
            let (event_id, attendee) = args.attendee();
            let registration = actions::toggle_reminder(&store, event_id, &attendee)
                .await
                .context("failed to update reminder")?;
            print_registration(&registration, json)?;
        }
        Commands::CheckIn {
            event_id,
            student_id,
        } => {
            let registration = actions::check_in(&store, event_id, &student_id)
                .await
                .context("failed to check in")?;
            print_registration(&registration, json)?;
        }
        Commands::Review {
            event_id,
            student_id,
            rating,
            text,
        } => {
            let event = actions::submit_review(&store, event_id, &student_id, rating, text)
                .await
                .context("failed to save review")?;
            if json {
                print_json(&event)?;
            } else {
                println!(
                    "Review saved. {} is now rated {:.1}.",
                    event.title,
                    event.average_rating.unwrap_or_default()
                );
            }
        }
        Commands::Report { student, out } => {
            let snapshot = views::load_snapshot(&store).await;
            let report = report::build_report(student.as_deref(), today, &snapshot);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

/// Loads a page into a fresh view state and prints whatever it settled on.
async fn show<T, F, P>(load: F, json: bool, print: P) -> anyhow::Result<()>
where
    T: Serialize,
    F: Future<Output = T>,
    P: FnOnce(&T),
{
    let mut page = ViewState::new();
    views::refresh(&mut page, load).await;
    match page.current() {
        Some(view) if json => print_json(view),
        Some(view) => {
            print(view);
            Ok(())
        }
        None => Ok(()),
    }
}

fn print_registration(registration: &EventRegistration, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(registration);
    }
    println!(
        "{} ({}) for event {}: reminder {}, {}",
        registration.student_name,
        registration.student_id,
        registration.event_id,
        if registration.remind_me { "on" } else { "off" },
        if registration.checked_in {
            "checked in"
        } else {
            "not checked in"
        }
    );
    Ok(())
}

fn print_announcements(view: &AnnouncementsView, today: NaiveDate) {
    if view.announcements.is_empty() {
        println!("No announcements match these filters.");
    }
    for notice in view.announcements.iter() {
        let validity = match notice.valid_until {
            Some(until) if notice.is_active(today) => format!(", valid until {until}"),
            Some(_) => ", expired".to_string(),
            None => String::new(),
        };
        println!(
            "- [{} {}] {} ({}, {}){}",
            notice.priority.tone(),
            notice.priority,
            notice.title,
            notice.category,
            date_label(notice.created_date, today),
            validity
        );
    }
}

fn print_schedule(sessions: &[ClassSession], day: Weekday) {
    if sessions.is_empty() {
        println!("No classes on {day}.");
    }
    for session in sessions.iter() {
        println!(
            "- {} {} [{}] with {} in {}",
            session.time_slot,
            session.subject,
            session.session_type,
            session.faculty_name,
            session.room_number
        );
    }
}

fn print_library(view: &LibraryView) {
    println!(
        "{} books: {} available, {} issued, {} reserved, {} lost",
        view.counts.total,
        view.counts.available,
        view.counts.issued,
        view.counts.reserved,
        view.counts.lost
    );
    for book in view.books.iter() {
        println!(
            "- {} by {} ({}) [{} {}]",
            book.title,
            book.author,
            book.category,
            book.status.tone(),
            book.status
        );
    }
}

fn print_faculty(view: &FacultyView) {
    if view.members.is_empty() {
        println!("No faculty match these filters.");
    }
    for member in view.members.iter() {
        println!(
            "- {}, {} ({}): {}",
            member.name,
            member.designation,
            member.department,
            member.subjects.join(", ")
        );
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_dashboard(view: &DashboardView) {
    println!("Dashboard for {} ({})", view.today, view.today.weekday());
    println!(
        "Attendance {}% | CGPA {:.2} | {} exams today | {} upcoming events",
        view.attendance.percentage, view.cgpa, view.exams_today, view.upcoming_events
    );

    println!("Today's classes:");
    if view.todays_sessions.is_empty() {
        println!("  none");
    }
    for session in view.todays_sessions.iter() {
        println!(
            "  {} {} with {}, room {}",
            session.time_slot, session.subject, session.faculty_name, session.room_number
        );
    }

    println!("Recent attendance:");
    if view.recent_attendance.is_empty() {
        println!("  none");
    }
    for record in view.recent_attendance.iter() {
        println!(
            "  {} {} {} [{}]",
            record.date, record.time_slot, record.subject, record.status
        );
    }
}

fn print_academics(view: &AcademicsView) {
    println!(
        "CGPA {:.2} | {} credits | {} semesters",
        view.stats.cgpa,
        view.stats.total_credits,
        view.semesters.len()
    );
    for semester in view.stats.semester_gpas.iter() {
        println!(
            "- {}: GPA {:.2} over {} credits",
            semester.semester, semester.gpa, semester.credits
        );
    }

    if view.records.is_empty() {
        println!("No grade records.");
        return;
    }
    println!("Grades:");
    for record in view.records.iter() {
        let score = record
            .score_percent()
            .map(|percent| format!(", {percent:.0}%"))
            .unwrap_or_default();
        println!(
            "  {} {} ({}) [{} {}]{}",
            record.semester,
            record.subject_name,
            record.subject_code,
            record.grade.tone(),
            record.grade,
            score
        );
    }
}

fn print_attendance(view: &AttendanceView) {
    let stats = &view.stats;
    println!(
        "Attendance {}%: {} present, {} absent, {} late of {}",
        stats.percentage, stats.present, stats.absent, stats.late, stats.total
    );
    for summary in view.by_subject.iter() {
        println!(
            "- {}: {}% of {}",
            summary.subject, summary.stats.percentage, summary.stats.total
        );
    }

    if view.records.is_empty() {
        println!("No attendance records in this range.");
        return;
    }
    println!("Records:");
    for record in view.records.iter() {
        println!(
            "  {} {} {} with {} [{} {}]",
            record.date,
            record.time_slot,
            record.subject,
            record.faculty_name,
            record.status.tone(),
            record.status
        );
    }
}

fn print_exams(buckets: &DateBuckets<ExamRecord>, today: NaiveDate) {
    let sections = [
        ("Today", &buckets.today),
        ("Upcoming", &buckets.upcoming),
        ("Completed", &buckets.past),
    ];
    for (title, exams) in sections {
        println!("{} ({}):", title, exams.len());
        for exam in exams.iter() {
            let flag = match exam_urgency(exam.exam_date, today) {
                Urgency::Today => " !today",
                Urgency::Tomorrow => " !tomorrow",
                Urgency::Normal => "",
            };
            let seat = exam
                .seat_number
                .as_deref()
                .map(|seat| format!(", seat {seat}"))
                .unwrap_or_default();
            println!(
                "  {} {} [{} {}] {} {} room {}{}{}",
                exam.subject_code,
                exam.subject_name,
                exam.exam_type.tone(),
                exam.exam_type,
                exam.exam_date,
                exam.exam_time,
                exam.room_number,
                seat,
                flag
            );
        }
    }
}

fn print_events(buckets: &DateBuckets<Event>) {
    let sections = [
        ("Today", &buckets.today),
        ("Upcoming", &buckets.upcoming),
        ("Past", &buckets.past),
    ];
    for (title, events) in sections {
        println!("{} ({}):", title, events.len());
        for event in events.iter() {
            let rating = event
                .average_rating
                .map(|rating| format!(", rated {rating:.1}"))
                .unwrap_or_default();
            println!(
                "  {} {} [{} {}] {} at {} by {}{}",
                event.id,
                event.title,
                event.category.tone(),
                event.category,
                event.event_date,
                event.venue,
                event.organizer,
                rating
            );
        }
    }
}
