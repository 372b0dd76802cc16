use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::labels::{
    AnnouncementCategory, AttendanceStatus, BookStatus, EventCategory, EventStatus, ExamStatus,
    ExamType, Grade, Priority, SessionType,
};

/// A typed row held by a [`RecordStore`](crate::store::RecordStore).
///
/// `field` exposes named values for store sorting and exact-match filter
/// dimensions; `search_fields` lists the text a search term is matched
/// against.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Collection name, also the CSV file stem.
    const KIND: &'static str;

    fn id(&self) -> Uuid;

    fn set_id(&mut self, id: Uuid);

    fn field(&self, name: &str) -> Option<FieldValue<'_>>;

    fn search_fields(&self) -> Vec<&str>;

    fn primary_date(&self) -> Option<NaiveDate> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl FieldValue<'_> {
    /// Exact match against a selector value as a user would type it.
    pub fn matches(&self, wanted: &str) -> bool {
        match self {
            FieldValue::Text(text) => *text == wanted,
            FieldValue::Number(value) => wanted
                .trim()
                .parse::<f64>()
                .map(|parsed| parsed == *value)
                .unwrap_or(false),
            FieldValue::Date(date) => wanted.trim().parse::<NaiveDate>().ok() == Some(*date),
            FieldValue::Timestamp(ts) => {
                wanted.trim().parse::<NaiveDateTime>().ok() == Some(*ts)
            }
        }
    }

    /// Values of different kinds compare equal.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.to_string(),
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Date(date) => date.to_string(),
            FieldValue::Timestamp(ts) => ts.to_string(),
        }
    }
}

fn text(value: &str) -> Option<FieldValue<'_>> {
    Some(FieldValue::Text(value))
}

fn optional_text(value: &Option<String>) -> Option<FieldValue<'_>> {
    value.as_deref().map(FieldValue::Text)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    #[serde(default)]
    pub id: Uuid,
    pub subject_name: String,
    pub subject_code: String,
    pub semester: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub credits: Option<f64>,
    pub grade: Grade,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub marks: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub max_marks: Option<f64>,
}

impl AcademicRecord {
    /// Credits as a GPA weight. Missing, negative or non-finite values weigh 0.
    pub fn credit_weight(&self) -> f64 {
        match self.credits {
            Some(credits) if credits.is_finite() && credits > 0.0 => credits,
            _ => 0.0,
        }
    }

    pub fn score_percent(&self) -> Option<f64> {
        match (self.marks, self.max_marks) {
            (Some(marks), Some(max)) if max > 0.0 => Some(marks / max * 100.0),
            _ => None,
        }
    }
}

impl Record for AcademicRecord {
    const KIND: &'static str = "academic_records";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "subject_name" => text(&self.subject_name),
            "subject_code" => text(&self.subject_code),
            "semester" => text(&self.semester),
            "grade" => text(self.grade.as_str()),
            "credits" => self.credits.map(FieldValue::Number),
            "marks" => self.marks.map(FieldValue::Number),
            "max_marks" => self.max_marks.map(FieldValue::Number),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject_name.as_str(), self.subject_code.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub id: Uuid,
    pub subject: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub time_slot: String,
    pub faculty_name: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl Record for AttendanceRecord {
    const KIND: &'static str = "attendance";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "subject" => text(&self.subject),
            "date" => Some(FieldValue::Date(self.date)),
            "status" => text(self.status.as_str()),
            "time_slot" => text(&self.time_slot),
            "faculty_name" => text(&self.faculty_name),
            "remarks" => optional_text(&self.remarks),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject.as_str(), self.faculty_name.as_str()]
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: Option<String>,
    pub venue: String,
    pub organizer: String,
    pub status: EventStatus,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub prizes: Option<String>,
}

impl Record for Event {
    const KIND: &'static str = "events";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => text(&self.title),
            "description" => text(&self.description),
            "category" => text(self.category.as_str()),
            "event_date" => Some(FieldValue::Date(self.event_date)),
            "event_time" => optional_text(&self.event_time),
            "venue" => text(&self.venue),
            "organizer" => text(&self.organizer),
            "status" => text(self.status.as_str()),
            "average_rating" => self.average_rating.map(FieldValue::Number),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.organizer.as_str()]
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.event_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamRecord {
    #[serde(default)]
    pub id: Uuid,
    pub subject_name: String,
    pub subject_code: String,
    pub exam_type: ExamType,
    pub exam_date: NaiveDate,
    pub exam_time: String,
    pub room_number: String,
    pub status: ExamStatus,
    #[serde(default)]
    pub seat_number: Option<String>,
}

impl Record for ExamRecord {
    const KIND: &'static str = "exams";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "subject_name" => text(&self.subject_name),
            "subject_code" => text(&self.subject_code),
            "exam_type" => text(self.exam_type.as_str()),
            "exam_date" => Some(FieldValue::Date(self.exam_date)),
            "exam_time" => text(&self.exam_time),
            "room_number" => text(&self.room_number),
            "status" => text(self.status.as_str()),
            "seat_number" => optional_text(&self.seat_number),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject_name.as_str(), self.subject_code.as_str(), self.exam_type.as_str()]
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.exam_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: String,
    pub category: AnnouncementCategory,
    pub priority: Priority,
    pub created_date: NaiveDateTime,
    #[serde(default)]
    pub valid_until: Option<NaiveDate>,
}

impl Announcement {
    /// Still shown as valid on `reference` when it has no end date or ends later.
    pub fn is_active(&self, reference: NaiveDate) -> bool {
        self.valid_until.map_or(true, |until| until > reference)
    }
}

impl Record for Announcement {
    const KIND: &'static str = "announcements";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => text(&self.title),
            "content" => text(&self.content),
            "author" => text(&self.author),
            "category" => text(self.category.as_str()),
            "priority" => text(self.priority.as_str()),
            "created_date" => Some(FieldValue::Timestamp(self.created_date)),
            "valid_until" => self.valid_until.map(FieldValue::Date),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.content.as_str(), self.author.as_str()]
    }

    fn primary_date(&self) -> Option<NaiveDate> {
        Some(self.created_date.date())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryBook {
    #[serde(default)]
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub isbn: Option<String>,
    pub category: String,
    pub status: BookStatus,
    #[serde(default)]
    pub location: Option<String>,
}

impl Record for LibraryBook {
    const KIND: &'static str = "library_books";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => text(&self.title),
            "author" => text(&self.author),
            "isbn" => optional_text(&self.isbn),
            "category" => text(&self.category),
            "status" => text(self.status.as_str()),
            "location" => optional_text(&self.location),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.author.as_str()];
        if let Some(isbn) = &self.isbn {
            fields.push(isbn);
        }
        fields.push(&self.category);
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyMember {
    #[serde(default)]
    pub id: Uuid,
    pub name: String,
    pub designation: String,
    pub department: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, with = "list_cell")]
    pub subjects: Vec<String>,
}

impl Record for FacultyMember {
    const KIND: &'static str = "faculty";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => text(&self.name),
            "designation" => text(&self.designation),
            "department" => text(&self.department),
            "email" => optional_text(&self.email),
            "phone" => optional_text(&self.phone),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.designation.as_str()];
        fields.extend(self.subjects.iter().map(String::as_str));
        fields
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSession {
    #[serde(default)]
    pub id: Uuid,
    pub day_of_week: String,
    pub time_slot: String,
    pub subject: String,
    pub faculty_name: String,
    pub room_number: String,
    #[serde(rename = "type")]
    pub session_type: SessionType,
}

impl ClassSession {
    pub fn weekday(&self) -> Option<Weekday> {
        self.day_of_week.trim().parse().ok()
    }
}

impl Record for ClassSession {
    const KIND: &'static str = "schedule";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "day_of_week" => text(&self.day_of_week),
            "time_slot" => text(&self.time_slot),
            "subject" => text(&self.subject),
            "faculty_name" => text(&self.faculty_name),
            "room_number" => text(&self.room_number),
            "type" => text(self.session_type.as_str()),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.subject.as_str(), self.faculty_name.as_str(), self.room_number.as_str()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReview {
    #[serde(default)]
    pub id: Uuid,
    pub event_id: Uuid,
    #[serde(default)]
    pub student_id: String,
    pub student_name: String,
    pub rating: u8,
    #[serde(default)]
    pub review: Option<String>,
}

impl Record for EventReview {
    const KIND: &'static str = "event_reviews";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "student_id" => text(&self.student_id),
            "student_name" => text(&self.student_name),
            "rating" => Some(FieldValue::Number(f64::from(self.rating))),
            "review" => optional_text(&self.review),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.student_name.as_str()];
        if let Some(review) = &self.review {
            fields.push(review);
        }
        fields
    }
}

/// A student's sign-up for an event, with their reminder and check-in flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRegistration {
    #[serde(default)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub student_id: String,
    pub student_name: String,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default)]
    pub remind_me: bool,
    #[serde(default)]
    pub checked_in: bool,
}

impl EventRegistration {
    pub fn is_for(&self, event_id: Uuid, student_id: &str) -> bool {
        !event_id.is_nil() && self.event_id == event_id && self.student_id == student_id
    }
}

impl Record for EventRegistration {
    const KIND: &'static str = "event_registrations";

    fn id(&self) -> Uuid {
        self.id
    }

    fn set_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        let flag = |value: bool| text(if value { "true" } else { "false" });
        match name {
            "student_id" => text(&self.student_id),
            "student_name" => text(&self.student_name),
            "student_email" => optional_text(&self.student_email),
            "remind_me" => flag(self.remind_me),
            "checked_in" => flag(self.checked_in),
            _ => None,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.student_name.as_str(), self.student_id.as_str()]
    }
}

/// Lists stored in a single CSV cell, separated by `;`.
mod list_cell {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&items.join("; "))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        Ok(raw
            .split(';')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn academic(credits: Option<f64>) -> AcademicRecord {
        AcademicRecord {
            id: Uuid::nil(),
            subject_name: "Data Structures".to_string(),
            subject_code: "CS201".to_string(),
            semester: "S3".to_string(),
            credits,
            grade: Grade::A,
            marks: Some(78.0),
            max_marks: Some(100.0),
        }
    }

    #[test]
    fn credit_weight_degrades_to_zero() {
        assert_eq!(academic(Some(4.0)).credit_weight(), 4.0);
        assert_eq!(academic(None).credit_weight(), 0.0);
        assert_eq!(academic(Some(-2.0)).credit_weight(), 0.0);
        assert_eq!(academic(Some(f64::NAN)).credit_weight(), 0.0);
    }

    #[test]
    fn score_percent_needs_positive_max() {
        assert_eq!(academic(Some(4.0)).score_percent(), Some(78.0));
        let mut record = academic(Some(4.0));
        record.max_marks = Some(0.0);
        assert_eq!(record.score_percent(), None);
    }

    #[test]
    fn field_values_match_typed_selectors() {
        let record = academic(Some(4.0));
        assert!(record.field("semester").unwrap().matches("S3"));
        assert!(record.field("credits").unwrap().matches("4"));
        assert!(record.field("unknown").is_none());

        let date = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        assert!(FieldValue::Date(date).matches("2026-03-04"));
        assert!(!FieldValue::Date(date).matches("March"));
    }

    #[test]
    fn session_weekday_accepts_full_names() {
        let session = ClassSession {
            id: Uuid::nil(),
            day_of_week: "Wednesday".to_string(),
            time_slot: "09:00-10:00".to_string(),
            subject: "Physics".to_string(),
            faculty_name: "Dr. Rao".to_string(),
            room_number: "B-204".to_string(),
            session_type: SessionType::Lab,
        };
        assert_eq!(session.weekday(), Some(Weekday::Wed));
    }

    #[test]
    fn faculty_subjects_round_trip_through_one_cell() {
        let csv_data = "name,designation,department,subjects\n\
                        Dr. Mehta,Professor,CSE,Compilers; Operating Systems\n";
        let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
        let member: FacultyMember = reader.deserialize().next().unwrap().unwrap();
        assert_eq!(member.subjects, vec!["Compilers", "Operating Systems"]);
        assert!(member.search_fields().contains(&"Compilers"));
    }

    #[test]
    fn announcement_validity_is_exclusive_of_end_day() {
        let today = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let mut announcement = Announcement {
            id: Uuid::nil(),
            title: "Library hours".to_string(),
            content: "Extended during exams".to_string(),
            author: "Librarian".to_string(),
            category: AnnouncementCategory::General,
            priority: Priority::Low,
            created_date: today.and_hms_opt(8, 0, 0).unwrap(),
            valid_until: None,
        };
        assert!(announcement.is_active(today));
        announcement.valid_until = Some(today);
        assert!(!announcement.is_active(today));
        announcement.valid_until = today.succ_opt();
        assert!(announcement.is_active(today));
    }

    #[test]
    fn registration_flags_read_from_csv() {
        let event_id = Uuid::new_v4();
        let csv_data = format!(
            "event_id,student_id,student_name,student_email,remind_me,checked_in\n\
             {event_id},STU001,Asha,,true,false\n"
        );
        let mut reader = csv::Reader::from_reader(csv_data.as_bytes());
        let registration: EventRegistration = reader.deserialize().next().unwrap().unwrap();
        assert!(registration.id.is_nil());
        assert_eq!(registration.student_email, None);
        assert!(registration.remind_me);
        assert!(!registration.checked_in);
        assert!(registration.is_for(event_id, "STU001"));
        assert!(!registration.is_for(event_id, "STU002"));
        assert!(!registration.is_for(Uuid::nil(), "STU001"));
    }
}
