//! Write flows behind the event pages: sign-up, reminders, check-in and
//! reviews.
//!
//! Every flow resolves the event by a non-nil id before touching the store,
//! so a bad id never leaves a half-written registration or review behind.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ActionError;
use crate::labels::EventStatus;
use crate::models::{Event, EventRegistration, EventReview};
use crate::stats::average_rating;
use crate::store::RecordStore;

/// The student acting on an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub student_id: String,
    pub name: String,
    pub email: Option<String>,
}

impl Attendee {
    fn registration(&self, event_id: Uuid, remind_me: bool) -> EventRegistration {
        EventRegistration {
            id: Uuid::nil(),
            event_id,
            student_id: self.student_id.clone(),
            student_name: self.name.clone(),
            student_email: self.email.clone(),
            remind_me,
            checked_in: false,
        }
    }
}

pub async fn find_event<S: RecordStore>(store: &S, event_id: Uuid) -> Result<Event, ActionError> {
    if event_id.is_nil() {
        return Err(ActionError::UnknownEvent(event_id));
    }
    let events: Vec<Event> = store.list(None).await?;
    events
        .into_iter()
        .find(|event| event.id == event_id)
        .ok_or(ActionError::UnknownEvent(event_id))
}

pub async fn find_registration<S: RecordStore>(
    store: &S,
    event_id: Uuid,
    student_id: &str,
) -> Result<Option<EventRegistration>, ActionError> {
    let registrations: Vec<EventRegistration> = store.list(None).await?;
    Ok(registrations
        .into_iter()
        .find(|registration| registration.is_for(event_id, student_id)))
}

/// Signs the attendee up. An existing registration is returned as is.
pub async fn register_for_event<S: RecordStore>(
    store: &S,
    event_id: Uuid,
    attendee: &Attendee,
) -> Result<EventRegistration, ActionError> {
    let event = find_event(store, event_id).await?;
    if let Some(existing) = find_registration(store, event_id, &attendee.student_id).await? {
        debug!(event = %event.title, student = %attendee.student_id, "already registered");
        return Ok(existing);
    }

    let registration = store.create(attendee.registration(event_id, false)).await?;
    info!(event = %event.title, student = %attendee.student_id, "registered");
    Ok(registration)
}

/// Flips the reminder flag, registering with the reminder on when the
/// attendee has not signed up yet.
pub async fn toggle_reminder<S: RecordStore>(
    store: &S,
    event_id: Uuid,
    attendee: &Attendee,
) -> Result<EventRegistration, ActionError> {
    let event = find_event(store, event_id).await?;
    let registration = match find_registration(store, event_id, &attendee.student_id).await? {
        Some(mut existing) => {
            existing.remind_me = !existing.remind_me;
            store.update(existing.id, existing).await?
        }
        None => store.create(attendee.registration(event_id, true)).await?,
    };

    info!(
        event = %event.title,
        student = %attendee.student_id,
        remind_me = registration.remind_me,
        "reminder updated"
    );
    Ok(registration)
}

/// Marks a registered student as present at the event.
pub async fn check_in<S: RecordStore>(
    store: &S,
    event_id: Uuid,
    student_id: &str,
) -> Result<EventRegistration, ActionError> {
    let event = find_event(store, event_id).await?;
    let mut registration = find_registration(store, event_id, student_id)
        .await?
        .ok_or_else(|| ActionError::NotRegistered {
            event_id,
            student_id: student_id.to_string(),
        })?;
    if registration.checked_in {
        return Ok(registration);
    }

    registration.checked_in = true;
    let registration = store.update(registration.id, registration).await?;
    info!(event = %event.title, student = %student_id, "checked in");
    Ok(registration)
}

/// Records a review from a checked-in attendee of a completed event and
/// returns the event with its refreshed average rating.
///
/// The event is updated before the review is written. If writing the review
/// fails, the previous rating is put back.
pub async fn submit_review<S: RecordStore>(
    store: &S,
    event_id: Uuid,
    student_id: &str,
    rating: u8,
    text: Option<String>,
) -> Result<Event, ActionError> {
    if !(1..=5).contains(&rating) {
        return Err(ActionError::InvalidRating(rating));
    }

    let event = find_event(store, event_id).await?;
    if event.status != EventStatus::Completed {
        return Err(ActionError::NotCompleted {
            title: event.title,
            status: event.status,
        });
    }
    let registration = find_registration(store, event_id, student_id)
        .await?
        .filter(|registration| registration.checked_in)
        .ok_or_else(|| ActionError::NotCheckedIn {
            title: event.title.clone(),
            student_id: student_id.to_string(),
        })?;

    let review = EventReview {
        id: Uuid::nil(),
        event_id,
        student_id: registration.student_id,
        student_name: registration.student_name,
        rating,
        review: text.filter(|text| !text.trim().is_empty()),
    };
    let mut reviews: Vec<EventReview> = store.list(None).await?;
    reviews.push(review.clone());

    let previous = event.clone();
    let mut rated = event;
    rated.average_rating = average_rating(&reviews, event_id);
    let rated = store.update(event_id, rated).await?;

    if let Err(err) = store.create(review).await {
        if let Err(restore) = store.update(event_id, previous).await {
            warn!(event = %rated.title, error = %restore, "failed to restore rating");
        }
        return Err(err.into());
    }

    info!(event = %rated.title, rating, average = ?rated.average_rating, "review saved");
    Ok(rated)
}
