use std::cmp::Ordering;

use chrono::Weekday;
use serde::Serialize;

use crate::calendar::DateRange;
use crate::models::{Announcement, AttendanceRecord, ClassSession, Record};

/// One exact-match filter dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map_or(Selection::All, Selection::from)
    }
}

/// Filters applied to a record list, all of which must pass.
///
/// Order of evaluation is search term, then each dimension in the order it
/// was added, then the date range. An empty term, `Selection::All` or
/// `DateRange::All` leaves that step out.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Criteria {
    pub search_term: String,
    pub dimensions: Vec<(String, Selection)>,
    pub date_range: DateRange,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with(mut self, field: &str, selection: impl Into<Selection>) -> Self {
        self.dimensions.push((field.to_string(), selection.into()));
        self
    }

    pub fn within(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn matches<T: Record>(&self, record: &T) -> bool {
        self.matches_search(record) && self.matches_dimensions(record) && self.matches_dates(record)
    }

    fn matches_search<T: Record>(&self, record: &T) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        record
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    fn matches_dimensions<T: Record>(&self, record: &T) -> bool {
        self.dimensions.iter().all(|(field, selection)| match selection {
            Selection::All => true,
            Selection::Only(wanted) => record
                .field(field)
                .map_or(false, |value| value.matches(wanted)),
        })
    }

    fn matches_dates<T: Record>(&self, record: &T) -> bool {
        if self.date_range.is_all() {
            return true;
        }
        record
            .primary_date()
            .map_or(false, |date| self.date_range.contains(date))
    }
}

pub fn filter_records<T: Record>(records: &[T], criteria: &Criteria) -> Vec<T> {
    records
        .iter()
        .filter(|record| criteria.matches(*record))
        .cloned()
        .collect()
}

/// A store sort key: a field name, descending when prefixed with `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey<'a> {
    pub field: &'a str,
    pub descending: bool,
}

impl<'a> SortKey<'a> {
    pub fn parse(key: &'a str) -> Self {
        let key = key.trim();
        match key.strip_prefix('-') {
            Some(field) => SortKey {
                field,
                descending: true,
            },
            None => SortKey {
                field: key,
                descending: false,
            },
        }
    }
}

/// Stable sort by a named field. Records missing the field go last; an
/// unknown field leaves the order unchanged.
pub fn sort_by_field<T: Record>(records: &mut [T], key: &str) {
    let key = SortKey::parse(key);
    records.sort_by(|a, b| match (a.field(key.field), b.field(key.field)) {
        (Some(x), Some(y)) if key.descending => x.compare(&y).reverse(),
        (Some(x), Some(y)) => x.compare(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Priority first (Urgent down to Low), newest first within a priority.
pub fn sort_announcements(announcements: &mut [Announcement]) {
    announcements.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| b.created_date.cmp(&a.created_date))
    });
}

/// Newest day first, then by time slot within a day.
pub fn sort_attendance(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.time_slot.cmp(&b.time_slot))
    });
}

/// Sessions held on `day`, ordered by time slot.
pub fn sessions_for_day(sessions: &[ClassSession], day: Weekday) -> Vec<ClassSession> {
    let mut selected: Vec<ClassSession> = sessions
        .iter()
        .filter(|session| session.weekday() == Some(day))
        .cloned()
        .collect();
    selected.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));
    selected
}
