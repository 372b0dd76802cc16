use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::CriteriaError;
use crate::labels::{EventStatus, ExamStatus};
use crate::models::{Event, ExamRecord};

/// Where a date falls relative to the reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPosition {
    Past,
    Today,
    Future,
}

impl DayPosition {
    pub fn of(date: NaiveDate, reference: NaiveDate) -> Self {
        match date.cmp(&reference) {
            std::cmp::Ordering::Less => DayPosition::Past,
            std::cmp::Ordering::Equal => DayPosition::Today,
            std::cmp::Ordering::Greater => DayPosition::Future,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Today,
    Upcoming,
    Past,
}

/// A partition of records by day. A record sits in at most one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateBuckets<T> {
    pub today: Vec<T>,
    pub upcoming: Vec<T>,
    pub past: Vec<T>,
}

impl<T> Default for DateBuckets<T> {
    fn default() -> Self {
        Self {
            today: Vec::new(),
            upcoming: Vec::new(),
            past: Vec::new(),
        }
    }
}

impl<T> DateBuckets<T> {
    pub fn len(&self) -> usize {
        self.today.len() + self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Sorts records into buckets. `admit` sees each record with its day
/// position and picks a bucket, or `None` to leave the record out.
pub fn classify_by_date<T, D, A>(
    records: &[T],
    reference: NaiveDate,
    date_of: D,
    admit: A,
) -> DateBuckets<T>
where
    T: Clone,
    D: Fn(&T) -> NaiveDate,
    A: Fn(&T, DayPosition) -> Option<Bucket>,
{
    let mut buckets = DateBuckets::default();

    for record in records {
        let position = DayPosition::of(date_of(record), reference);
        match admit(record, position) {
            Some(Bucket::Today) => buckets.today.push(record.clone()),
            Some(Bucket::Upcoming) => buckets.upcoming.push(record.clone()),
            Some(Bucket::Past) => buckets.past.push(record.clone()),
            None => {}
        }
    }

    buckets
}

/// Exams: scheduled ones split by day, completed ones (or scheduled ones
/// whose day has passed) go to `past`. Upcoming is strictly after today.
pub fn classify_exams(exams: &[ExamRecord], reference: NaiveDate) -> DateBuckets<ExamRecord> {
    classify_by_date(
        exams,
        reference,
        |exam| exam.exam_date,
        |exam, position| match (&exam.status, position) {
            (ExamStatus::Completed, _) => Some(Bucket::Past),
            (ExamStatus::Scheduled, DayPosition::Past) => Some(Bucket::Past),
            (ExamStatus::Scheduled, DayPosition::Today) => Some(Bucket::Today),
            (ExamStatus::Scheduled, DayPosition::Future) => Some(Bucket::Upcoming),
            _ => None,
        },
    )
}

/// Events: anything dated today, future `Upcoming` events, past `Completed` ones.
pub fn classify_events(events: &[Event], reference: NaiveDate) -> DateBuckets<Event> {
    classify_by_date(
        events,
        reference,
        |event| event.event_date,
        |event, position| match (position, &event.status) {
            (DayPosition::Today, _) => Some(Bucket::Today),
            (DayPosition::Future, EventStatus::Upcoming) => Some(Bucket::Upcoming),
            (DayPosition::Past, EventStatus::Completed) => Some(Bucket::Past),
            _ => None,
        },
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Today,
    Tomorrow,
    Normal,
}

pub fn exam_urgency(exam_date: NaiveDate, reference: NaiveDate) -> Urgency {
    if exam_date == reference {
        Urgency::Today
    } else if reference.succ_opt() == Some(exam_date) {
        Urgency::Tomorrow
    } else {
        Urgency::Normal
    }
}

/// Card label for a timestamp: "Today", "Yesterday" or `Mar 4, 2026`.
pub fn date_label(timestamp: NaiveDateTime, reference: NaiveDate) -> String {
    let date = timestamp.date();
    if date == reference {
        "Today".to_string()
    } else if reference.pred_opt() == Some(date) {
        "Yesterday".to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

/// Inclusive date bounds for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DateRange {
    #[default]
    All,
    Between { start: NaiveDate, end: NaiveDate },
}

impl DateRange {
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, CriteriaError> {
        if start > end {
            return Err(CriteriaError::InvertedDateRange { start, end });
        }
        Ok(DateRange::Between { start, end })
    }

    pub fn current_month(reference: NaiveDate) -> Self {
        month_range(reference.year(), reference.month())
    }

    pub fn previous_month(reference: NaiveDate) -> Self {
        if reference.month() == 1 {
            month_range(reference.year() - 1, 12)
        } else {
            month_range(reference.year(), reference.month() - 1)
        }
    }

    /// Parses `all`, `current`, `previous` (also `current-month` and
    /// `previous-month`) or `YYYY-MM-DD..YYYY-MM-DD`.
    pub fn parse(input: &str, reference: NaiveDate) -> Result<Self, CriteriaError> {
        let trimmed = input.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "all" => return Ok(DateRange::All),
            "current" | "current-month" => return Ok(Self::current_month(reference)),
            "previous" | "previous-month" => return Ok(Self::previous_month(reference)),
            _ => {}
        }

        let invalid = || CriteriaError::InvalidDateRange(trimmed.to_string());
        let (start, end) = trimmed.split_once("..").ok_or_else(invalid)?;
        let start = start.trim().parse::<NaiveDate>().map_err(|_| invalid())?;
        let end = end.trim().parse::<NaiveDate>().map_err(|_| invalid())?;
        Self::between(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            DateRange::All => true,
            DateRange::Between { start, end } => *start <= date && date <= *end,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, DateRange::All)
    }
}

fn month_range(year: i32, month: u32) -> DateRange {
    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let next_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    match (start, next_start.and_then(|next| next.pred_opt())) {
        (Some(start), Some(end)) => DateRange::Between { start, end },
        _ => DateRange::All,
    }
}
