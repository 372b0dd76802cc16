use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::labels::{AttendanceStatus, BookStatus};
use crate::models::{AcademicRecord, AttendanceRecord, EventReview, LibraryBook, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterGpa {
    pub semester: String,
    pub gpa: f64,
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AcademicStats {
    pub cgpa: f64,
    pub total_credits: f64,
    pub semester_gpas: Vec<SemesterGpa>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectAttendance {
    pub subject: String,
    pub stats: AttendanceStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BookStatusCounts {
    pub total: usize,
    pub available: usize,
    pub issued: usize,
    pub reserved: usize,
    pub lost: usize,
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Credit-weighted GPA over `records`, with the credits it covers.
fn weighted_gpa<'a, I>(records: I) -> (f64, f64)
where
    I: IntoIterator<Item = &'a AcademicRecord>,
{
    let (credits, points) = records
        .into_iter()
        .fold((0.0, 0.0), |(credits, points), record| {
            let weight = record.credit_weight();
            (credits + weight, points + record.grade.points() * weight)
        });

    let gpa = if credits > 0.0 {
        round_to(points / credits, 2)
    } else {
        0.0
    };
    (gpa, credits)
}

pub fn compute_academic_stats(records: &[AcademicRecord]) -> AcademicStats {
    if records.is_empty() {
        return AcademicStats::default();
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&AcademicRecord>> = HashMap::new();
    for record in records {
        let group = groups.entry(record.semester.as_str()).or_insert_with(|| {
            order.push(record.semester.as_str());
            Vec::new()
        });
        group.push(record);
    }

    let semester_gpas = order
        .into_iter()
        .map(|semester| {
            let group = groups.remove(semester).unwrap_or_default();
            let (gpa, credits) = weighted_gpa(group);
            SemesterGpa {
                semester: semester.to_string(),
                gpa,
                credits,
            }
        })
        .collect();

    // CGPA is weighted over every record, not averaged across semesters.
    let (cgpa, total_credits) = weighted_gpa(records);

    AcademicStats {
        cgpa,
        total_credits,
        semester_gpas,
    }
}

pub fn compute_attendance_stats(records: &[AttendanceRecord]) -> AttendanceStats {
    let mut stats = AttendanceStats {
        total: records.len(),
        ..AttendanceStats::default()
    };

    for record in records {
        match record.status {
            AttendanceStatus::Present => stats.present += 1,
            AttendanceStatus::Absent => stats.absent += 1,
            AttendanceStatus::Late => stats.late += 1,
            AttendanceStatus::Other(_) => {}
        }
    }

    if stats.total > 0 {
        stats.percentage = round_to(stats.present as f64 / stats.total as f64 * 100.0, 0) as u32;
    }
    stats
}

/// Attendance per subject, lowest percentage first.
pub fn attendance_by_subject(records: &[AttendanceRecord]) -> Vec<SubjectAttendance> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<AttendanceRecord>> = HashMap::new();
    for record in records {
        groups
            .entry(record.subject.as_str())
            .or_insert_with(|| {
                order.push(record.subject.as_str());
                Vec::new()
            })
            .push(record.clone());
    }

    let mut summaries: Vec<SubjectAttendance> = order
        .into_iter()
        .map(|subject| SubjectAttendance {
            subject: subject.to_string(),
            stats: compute_attendance_stats(
                groups.get(subject).map(Vec::as_slice).unwrap_or_default(),
            ),
        })
        .collect();

    summaries.sort_by_key(|summary| summary.stats.percentage);
    summaries
}

/// Mean rating of the reviews for `event_id`, `None` when it has none.
pub fn average_rating(reviews: &[EventReview], event_id: Uuid) -> Option<f64> {
    let ratings: Vec<f64> = reviews
        .iter()
        .filter(|review| review.event_id == event_id)
        .map(|review| f64::from(review.rating))
        .collect();

    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}

pub fn book_status_counts(books: &[LibraryBook]) -> BookStatusCounts {
    books.iter().fold(
        BookStatusCounts {
            total: books.len(),
            ..BookStatusCounts::default()
        },
        |mut counts, book| {
            match book.status {
                BookStatus::Available => counts.available += 1,
                BookStatus::Issued => counts.issued += 1,
                BookStatus::Reserved => counts.reserved += 1,
                BookStatus::Lost => counts.lost += 1,
                BookStatus::Other(_) => {}
            }
            counts
        },
    )
}

/// Distinct values of `field` in first-appearance order.
pub fn unique_values<T: Record>(records: &[T], field: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter_map(|record| record.field(field))
        .map(|value| value.to_text())
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
