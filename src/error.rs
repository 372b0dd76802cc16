use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::labels::EventStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("no {kind} record with id {id}")]
    NotFound { kind: &'static str, id: Uuid },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Why an event registration, reminder, check-in or review was refused.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no event with id {0}")]
    UnknownEvent(Uuid),
    #[error("student {student_id} is not registered for event {event_id}")]
    NotRegistered { event_id: Uuid, student_id: String },
    #[error("student {student_id} has not checked in to `{title}`")]
    NotCheckedIn { title: String, student_id: String },
    #[error("`{title}` is {status}, reviews open once it is completed")]
    NotCompleted { title: String, status: EventStatus },
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("invalid date range `{0}`: expected all, current, previous or START..END")]
    InvalidDateRange(String),
    #[error("date range starts after it ends: {start}..{end}")]
    InvertedDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },
}
