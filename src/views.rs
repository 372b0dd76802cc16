//! Load-then-derive pipelines behind each portal page.
//!
//! Every page fetches a snapshot from the store and hands it to the pure
//! aggregation, classification and filter functions. A failed fetch is
//! logged and the page renders as empty.

use std::future::Future;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{debug, warn};

use crate::calendar::{classify_events, classify_exams, DateBuckets, DateRange};
use crate::filter::{
    filter_records, sessions_for_day, sort_announcements, sort_attendance, Criteria, Selection,
};
use crate::models::{
    AcademicRecord, Announcement, AttendanceRecord, ClassSession, Event, ExamRecord,
    FacultyMember, LibraryBook, Record,
};
use crate::stats::{
    attendance_by_subject, book_status_counts, compute_academic_stats, compute_attendance_stats,
    unique_values, AcademicStats, AttendanceStats, BookStatusCounts, SubjectAttendance,
};
use crate::store::RecordStore;

/// Lists a collection, degrading to an empty one when the store fails.
pub async fn load_or_empty<T, S>(store: &S, sort_key: Option<&str>) -> Vec<T>
where
    T: Record,
    S: RecordStore,
{
    match store.list::<T>(sort_key).await {
        Ok(records) => {
            debug!(kind = T::KIND, count = records.len(), "loaded records");
            records
        }
        Err(err) => {
            warn!(kind = T::KIND, error = %err, "failed to load records, showing empty view");
            Vec::new()
        }
    }
}

/// Visible state of one mounted view.
///
/// Each applied result replaces the previous one. Results arriving after
/// the view is unmounted are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    mounted: bool,
    current: Option<T>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            mounted: true,
            current: None,
        }
    }
}

impl<T> ViewState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loading(&self) -> bool {
        self.current.is_none()
    }

    /// Shows the loading placeholder again ahead of a new fetch.
    pub fn reload(&mut self) {
        self.current = None;
    }

    /// Returns false when the view is gone and the result was dropped.
    pub fn apply(&mut self, value: T) -> bool {
        if !self.mounted {
            debug!("view unmounted, dropping result");
            return false;
        }
        self.current = Some(value);
        true
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.current = None;
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }
}

/// Shows the loading state, awaits `load` and applies its result.
pub async fn refresh<T, F>(state: &mut ViewState<T>, load: F) -> bool
where
    F: Future<Output = T>,
{
    state.reload();
    let value = load.await;
    state.apply(value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcademicsView {
    pub stats: AcademicStats,
    pub semesters: Vec<String>,
    pub records: Vec<AcademicRecord>,
}

/// Stats cover every record; the list shows the selected semester only.
pub async fn academics_view<S: RecordStore>(store: &S, semester: Selection) -> AcademicsView {
    let records: Vec<AcademicRecord> = load_or_empty(store, Some("-semester")).await;
    let stats = compute_academic_stats(&records);
    let semesters = unique_values(&records, "semester");
    let records = filter_records(&records, &Criteria::new().with("semester", semester));

    AcademicsView {
        stats,
        semesters,
        records,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceView {
    pub stats: AttendanceStats,
    pub by_subject: Vec<SubjectAttendance>,
    pub subjects: Vec<String>,
    pub records: Vec<AttendanceRecord>,
}

pub async fn attendance_view<S: RecordStore>(
    store: &S,
    subject: Selection,
    range: DateRange,
) -> AttendanceView {
    let records: Vec<AttendanceRecord> = load_or_empty(store, Some("-date")).await;
    let stats = compute_attendance_stats(&records);
    let by_subject = attendance_by_subject(&records);
    let subjects = unique_values(&records, "subject");

    let criteria = Criteria::new().with("subject", subject).within(range);
    let mut records = filter_records(&records, &criteria);
    sort_attendance(&mut records);

    AttendanceView {
        stats,
        by_subject,
        subjects,
        records,
    }
}

pub async fn exams_view<S: RecordStore>(store: &S, today: NaiveDate) -> DateBuckets<ExamRecord> {
    let exams: Vec<ExamRecord> = load_or_empty(store, Some("exam_date")).await;
    classify_exams(&exams, today)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventsView {
    pub categories: Vec<String>,
    pub buckets: DateBuckets<Event>,
}

/// Filters first, then buckets what is left.
pub async fn events_view<S: RecordStore>(
    store: &S,
    criteria: &Criteria,
    today: NaiveDate,
) -> EventsView {
    let events: Vec<Event> = load_or_empty(store, Some("event_date")).await;
    let categories = unique_values(&events, "category");
    let filtered = filter_records(&events, criteria);

    EventsView {
        categories,
        buckets: classify_events(&filtered, today),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnouncementsView {
    pub categories: Vec<String>,
    pub announcements: Vec<Announcement>,
}

pub async fn announcements_view<S: RecordStore>(
    store: &S,
    criteria: &Criteria,
) -> AnnouncementsView {
    let announcements: Vec<Announcement> = load_or_empty(store, Some("-created_date")).await;
    let categories = unique_values(&announcements, "category");
    let mut announcements = filter_records(&announcements, criteria);
    sort_announcements(&mut announcements);

    AnnouncementsView {
        categories,
        announcements,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryView {
    pub counts: BookStatusCounts,
    pub categories: Vec<String>,
    pub books: Vec<LibraryBook>,
}

pub async fn library_view<S: RecordStore>(store: &S, criteria: &Criteria) -> LibraryView {
    let books: Vec<LibraryBook> = load_or_empty(store, Some("title")).await;

    LibraryView {
        counts: book_status_counts(&books),
        categories: unique_values(&books, "category"),
        books: filter_records(&books, criteria),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacultyView {
    pub departments: Vec<String>,
    pub members: Vec<FacultyMember>,
}

pub async fn faculty_view<S: RecordStore>(store: &S, criteria: &Criteria) -> FacultyView {
    let members: Vec<FacultyMember> = load_or_empty(store, None).await;

    FacultyView {
        departments: unique_values(&members, "department"),
        members: filter_records(&members, criteria),
    }
}

pub async fn schedule_view<S: RecordStore>(store: &S, day: chrono::Weekday) -> Vec<ClassSession> {
    let sessions: Vec<ClassSession> = load_or_empty(store, None).await;
    sessions_for_day(&sessions, day)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub today: NaiveDate,
    pub todays_sessions: Vec<ClassSession>,
    pub recent_attendance: Vec<AttendanceRecord>,
    pub attendance: AttendanceStats,
    pub cgpa: f64,
    pub exams_today: usize,
    pub upcoming_events: usize,
}

pub async fn dashboard_view<S: RecordStore>(
    store: &S,
    today: NaiveDate,
    recent_limit: usize,
) -> DashboardView {
    let sessions: Vec<ClassSession> = load_or_empty(store, None).await;
    let mut attendance: Vec<AttendanceRecord> = load_or_empty(store, Some("-date")).await;
    let grades: Vec<AcademicRecord> = load_or_empty(store, None).await;
    let exams: Vec<ExamRecord> = load_or_empty(store, None).await;
    let events: Vec<Event> = load_or_empty(store, None).await;

    let stats = compute_attendance_stats(&attendance);
    sort_attendance(&mut attendance);
    attendance.truncate(recent_limit);

    DashboardView {
        today,
        todays_sessions: sessions_for_day(&sessions, today.weekday()),
        recent_attendance: attendance,
        attendance: stats,
        cgpa: compute_academic_stats(&grades).cgpa,
        exams_today: classify_exams(&exams, today).today.len(),
        upcoming_events: classify_events(&events, today).upcoming.len(),
    }
}

/// Everything the summary report needs, loaded in one pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortalSnapshot {
    pub academics: Vec<AcademicRecord>,
    pub attendance: Vec<AttendanceRecord>,
    pub exams: Vec<ExamRecord>,
    pub events: Vec<Event>,
    pub announcements: Vec<Announcement>,
}

pub async fn load_snapshot<S: RecordStore>(store: &S) -> PortalSnapshot {
    PortalSnapshot {
        academics: load_or_empty(store, Some("-semester")).await,
        attendance: load_or_empty(store, Some("-date")).await,
        exams: load_or_empty(store, Some("exam_date")).await,
        events: load_or_empty(store, Some("event_date")).await,
        announcements: load_or_empty(store, Some("-created_date")).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, StoreError};
    use crate::store::CsvStore;
    use async_trait::async_trait;
    use uuid::Uuid;

    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn list<T: Record>(&self, _sort_key: Option<&str>) -> Result<Vec<T>> {
            Err(StoreError::Io {
                path: "unreachable".into(),
                source: std::io::Error::new(std::io::ErrorKind::TimedOut, "backend timed out"),
            })
        }

        async fn create<T: Record>(&self, record: T) -> Result<T> {
            Ok(record)
        }

        async fn update<T: Record>(&self, _id: Uuid, record: T) -> Result<T> {
            Ok(record)
        }

        async fn delete<T: Record>(&self, id: Uuid) -> Result<()> {
            Err(StoreError::NotFound { kind: T::KIND, id })
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn seed(dir: &std::path::Path, file: &str, contents: &str) {
        std::fs::write(dir.join(file), contents).unwrap();
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_zero_state() {
        let view = academics_view(&BrokenStore, Selection::All).await;
        assert_eq!(view.stats, AcademicStats::default());
        assert!(view.records.is_empty());

        let dashboard = dashboard_view(&BrokenStore, day(2026, 3, 2), 5).await;
        assert_eq!(dashboard.attendance, AttendanceStats::default());
        assert_eq!(dashboard.cgpa, 0.0);
    }

    #[tokio::test]
    async fn academics_stats_ignore_semester_selection() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "academic_records.csv",
            "subject_name,subject_code,semester,credits,grade\n\
             Algebra,MA101,S1,4,A\n\
             Mechanics,PH101,S1,2,B\n\
             Compilers,CS301,S2,3,A+\n",
        );
        let store = CsvStore::new(dir.path());

        let view = academics_view(&store, Selection::from("S1")).await;
        assert_eq!(view.records.len(), 2);
        assert_eq!(view.stats.total_credits, 9.0);
        assert_eq!(view.semesters, vec!["S2", "S1"]);
        assert_eq!(view.stats.semester_gpas[0].semester, "S2");
    }

    #[tokio::test]
    async fn attendance_view_filters_month_and_subject() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "attendance.csv",
            "subject,date,status,time_slot,faculty_name\n\
             Maths,2026-03-02,Present,09:00,Dr. Sen\n\
             Maths,2026-02-27,Absent,09:00,Dr. Sen\n\
             Physics,2026-03-03,Late,11:00,Dr. Roy\n",
        );
        let store = CsvStore::new(dir.path());

        let view = attendance_view(
            &store,
            Selection::from("Maths"),
            DateRange::current_month(day(2026, 3, 10)),
        )
        .await;
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.stats.total, 3);
        assert_eq!(view.stats.percentage, 33);
        assert_eq!(view.subjects, vec!["Physics", "Maths"]);
    }

    #[tokio::test]
    async fn events_view_filters_before_bucketing() {
        let dir = tempfile::tempdir().unwrap();
        seed(
            dir.path(),
            "events.csv",
            "title,description,category,event_date,venue,organizer,status\n\
             Tech Fest,Robotics and code,Tech,2026-03-12,Hall A,CS Club,Upcoming\n\
             Sports Day,Track events,Sports,2026-03-12,Ground,PE Dept,Upcoming\n\
             Hackathon,24h build,Tech,2026-03-10,Lab 2,CS Club,Completed\n",
        );
        let store = CsvStore::new(dir.path());

        let criteria = Criteria::new().search("tech").with("category", "Tech");
        let view = events_view(&store, &criteria, day(2026, 3, 10)).await;
        assert_eq!(view.buckets.upcoming.len(), 1);
        assert!(view.buckets.today.is_empty());
        assert_eq!(view.categories, vec!["Tech", "Sports"]);

        let view = events_view(&store, &Criteria::new(), day(2026, 3, 10)).await;
        assert_eq!(view.buckets.today.len(), 1);
        assert_eq!(view.buckets.upcoming.len(), 2);
    }

    #[test]
    fn view_state_is_last_write_wins() {
        let mut state: ViewState<Vec<u32>> = ViewState::new();
        assert!(state.is_loading());

        assert!(state.apply(vec![1]));
        assert!(state.apply(vec![2, 3]));
        assert_eq!(state.current(), Some(&vec![2, 3]));

        state.reload();
        assert!(state.is_loading());
        assert!(state.apply(vec![4]));

        state.unmount();
        assert!(!state.apply(vec![5]));
        assert_eq!(state.current(), None);
    }

    #[tokio::test]
    async fn refresh_replaces_the_shown_view() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path());
        let mut page = ViewState::new();

        assert!(refresh(&mut page, exams_view(&store, day(2026, 3, 2))).await);
        assert_eq!(page.current().map(DateBuckets::len), Some(0));

        seed(
            dir.path(),
            "exams.csv",
            "subject_name,subject_code,exam_type,exam_date,exam_time,room_number,status\n\
             Algebra,MA101,Quiz,2026-03-02,10:00,A-1,Scheduled\n",
        );
        assert!(refresh(&mut page, exams_view(&store, day(2026, 3, 2))).await);
        assert_eq!(page.current().map(|buckets| buckets.today.len()), Some(1));

        page.unmount();
        assert!(!refresh(&mut page, exams_view(&store, day(2026, 3, 2))).await);
        assert!(page.current().is_none());
    }
}
