use std::fmt::Write;

use chrono::NaiveDate;

use crate::calendar::{classify_events, classify_exams, exam_urgency, Urgency};
use crate::filter::sort_announcements;
use crate::stats::{attendance_by_subject, compute_academic_stats, compute_attendance_stats};
use crate::views::PortalSnapshot;

pub fn build_report(student: Option<&str>, today: NaiveDate, snapshot: &PortalSnapshot) -> String {
    let academics = compute_academic_stats(&snapshot.academics);
    let attendance = compute_attendance_stats(&snapshot.attendance);
    let by_subject = attendance_by_subject(&snapshot.attendance);
    let exams = classify_exams(&snapshot.exams, today);
    let events = classify_events(&snapshot.events, today);

    let mut output = String::new();
    let student_label = student.unwrap_or("current student");

    let _ = writeln!(output, "# Student Portal Summary");
    let _ = writeln!(output, "Generated for {} on {}", student_label, today);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Academics");

    if academics.semester_gpas.is_empty() {
        let _ = writeln!(output, "No academic records yet.");
    } else {
        let _ = writeln!(
            output,
            "CGPA {:.2} across {} credits",
            academics.cgpa, academics.total_credits
        );
        for semester in academics.semester_gpas.iter() {
            let _ = writeln!(
                output,
                "- {}: GPA {:.2} ({} credits)",
                semester.semester, semester.gpa, semester.credits
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Attendance");

    if attendance.total == 0 {
        let _ = writeln!(output, "No attendance recorded.");
    } else {
        let _ = writeln!(
            output,
            "{}% present ({} present, {} absent, {} late of {} classes)",
            attendance.percentage,
            attendance.present,
            attendance.absent,
            attendance.late,
            attendance.total
        );
        for summary in by_subject.iter().take(5) {
            let _ = writeln!(
                output,
                "- {}: {}% of {} classes",
                summary.subject, summary.stats.percentage, summary.stats.total
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Exams");

    if exams.today.is_empty() && exams.upcoming.is_empty() {
        let _ = writeln!(output, "No scheduled exams ahead.");
    } else {
        for exam in exams.today.iter().chain(exams.upcoming.iter()).take(10) {
            let marker = match exam_urgency(exam.exam_date, today) {
                Urgency::Today => " (today)",
                Urgency::Tomorrow => " (tomorrow)",
                Urgency::Normal => "",
            };
            let _ = writeln!(
                output,
                "- {} {} on {} at {}, room {}{}",
                exam.subject_name,
                exam.exam_type,
                exam.exam_date,
                exam.exam_time,
                exam.room_number,
                marker
            );
        }
    }
    let _ = writeln!(output, "{} exams completed.", exams.past.len());

    let _ = writeln!(output);
    let _ = writeln!(output, "## Events");

    if events.today.is_empty() && events.upcoming.is_empty() {
        let _ = writeln!(output, "No events coming up.");
    } else {
        for event in events.today.iter().chain(events.upcoming.iter()).take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) on {} at {}",
                event.title, event.category, event.event_date, event.venue
            );
        }
    }

    let mut notices: Vec<_> = snapshot
        .announcements
        .iter()
        .filter(|announcement| announcement.is_active(today))
        .cloned()
        .collect();
    sort_announcements(&mut notices);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Announcements");

    if notices.is_empty() {
        let _ = writeln!(output, "No active announcements.");
    } else {
        for notice in notices.iter().take(5) {
            let _ = writeln!(
                output,
                "- [{}] {} by {}",
                notice.priority, notice.title, notice.author
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::{
        AnnouncementCategory, AttendanceStatus, ExamStatus, ExamType, Grade, Priority,
    };
    use crate::models::{AcademicRecord, Announcement, AttendanceRecord, ExamRecord};
    use uuid::Uuid;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_snapshot_reports_placeholders() {
        let report = build_report(None, day(2026, 3, 1), &PortalSnapshot::default());
        assert!(report.contains("Generated for current student on 2026-03-01"));
        assert!(report.contains("No academic records yet."));
        assert!(report.contains("No attendance recorded."));
        assert!(report.contains("No scheduled exams ahead."));
        assert!(report.contains("No active announcements."));
    }

    #[test]
    fn report_lists_stats_exams_and_active_notices() {
        let today = day(2026, 3, 1);
        let snapshot = PortalSnapshot {
            academics: vec![AcademicRecord {
                id: Uuid::new_v4(),
                subject_name: "Networks".to_string(),
                subject_code: "CS305".to_string(),
                semester: "S5".to_string(),
                credits: Some(4.0),
                grade: Grade::BPlus,
                marks: None,
                max_marks: None,
            }],
            attendance: vec![AttendanceRecord {
                id: Uuid::new_v4(),
                subject: "Networks".to_string(),
                date: today,
                status: AttendanceStatus::Present,
                time_slot: "10:00".to_string(),
                faculty_name: "Dr. Nair".to_string(),
                remarks: None,
            }],
            exams: vec![ExamRecord {
                id: Uuid::new_v4(),
                subject_name: "Networks".to_string(),
                subject_code: "CS305".to_string(),
                exam_type: ExamType::Quiz,
                exam_date: day(2026, 3, 2),
                exam_time: "14:00".to_string(),
                room_number: "L-3".to_string(),
                status: ExamStatus::Scheduled,
                seat_number: None,
            }],
            events: Vec::new(),
            announcements: vec![
                Announcement {
                    id: Uuid::new_v4(),
                    title: "Fee deadline".to_string(),
                    content: "Pay by Friday".to_string(),
                    author: "Accounts".to_string(),
                    category: AnnouncementCategory::Important,
                    priority: Priority::Urgent,
                    created_date: day(2026, 2, 27).and_hms_opt(9, 0, 0).unwrap(),
                    valid_until: Some(day(2026, 3, 6)),
                },
                Announcement {
                    id: Uuid::new_v4(),
                    title: "Expired notice".to_string(),
                    content: "Old".to_string(),
                    author: "Office".to_string(),
                    category: AnnouncementCategory::General,
                    priority: Priority::High,
                    created_date: day(2026, 2, 1).and_hms_opt(9, 0, 0).unwrap(),
                    valid_until: Some(day(2026, 2, 10)),
                },
            ],
        };

        let report = build_report(Some("Riya Shah"), today, &snapshot);
        assert!(report.contains("CGPA 8.00 across 4 credits"));
        assert!(report.contains("100% present"));
        assert!(report.contains("- Networks Quiz on 2026-03-02 at 14:00, room L-3 (tomorrow)"));
        assert!(report.contains("- [Urgent] Fee deadline by Accounts"));
        assert!(!report.contains("Expired notice"));
    }
}
