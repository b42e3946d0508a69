//! Reservation: a booking of a room over a time interval.
//!
//! Two interval rules coexist:
//! - conflicts use half-open `[start, end)` semantics, so back-to-back
//!   bookings are allowed;
//! - "current" uses closed `[start, end]` containment, so a reservation is
//!   still current at the exact instant it ends.

use serde::{Deserialize, Serialize};

use crate::error::{RateError, ValidationError};
use crate::id::{ReservationId, RoomId};
use crate::time::{Timestamp, minutes_between};

/// A stored room booking. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub room_id: RoomId,
    pub user_name: String,
    pub title: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub people_count: u32,
    pub created_at: Timestamp,
}

impl Reservation {
    /// Create a builder for constructing a [`Reservation`].
    #[must_use]
    pub fn builder() -> ReservationBuilder {
        ReservationBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Validation`] when:
    /// - `end <= start` ([`ValidationError::InvalidInterval`])
    /// - `title` is blank ([`ValidationError::EmptyTitle`])
    /// - `user_name` is blank ([`ValidationError::EmptyUserName`])
    pub fn validate(&self) -> Result<(), RateError> {
        if self.end <= self.start {
            return Err(ValidationError::InvalidInterval {
                start: self.start,
                end: self.end,
            }
            .into());
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        if self.user_name.trim().is_empty() {
            return Err(ValidationError::EmptyUserName.into());
        }
        Ok(())
    }

    /// Whether `[start, end)` intersects this reservation's `[start, end)`.
    ///
    /// Equivalent to `NOT (self.end <= start OR self.start >= end)`.
    #[must_use]
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        !(self.end <= start || self.start >= end)
    }

    /// Whether `at` lies within `[start, end]`, both bounds inclusive.
    #[must_use]
    pub fn is_current_at(&self, at: Timestamp) -> bool {
        self.start <= at && at <= self.end
    }

    /// Length of the booking in whole minutes.
    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        minutes_between(self.start, self.end)
    }
}

/// Step-by-step builder for [`Reservation`].
#[derive(Debug, Default)]
pub struct ReservationBuilder {
    id: Option<ReservationId>,
    room_id: Option<RoomId>,
    user_name: Option<String>,
    title: Option<String>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    people_count: u32,
    created_at: Option<Timestamp>,
}

impl ReservationBuilder {
    #[must_use]
    pub fn id(mut self, id: ReservationId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn room_id(mut self, room_id: RoomId) -> Self {
        self.room_id = Some(room_id);
        self
    }

    #[must_use]
    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn start(mut self, start: Timestamp) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn end(mut self, end: Timestamp) -> Self {
        self.end = Some(end);
        self
    }

    #[must_use]
    pub fn people_count(mut self, people_count: u32) -> Self {
        self.people_count = people_count;
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Consume the builder, validate, and return a [`Reservation`].
    ///
    /// Missing bounds default to "now", which fails the interval check.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Validation`] if the interval or metadata is invalid.
    pub fn build(self) -> Result<Reservation, RateError> {
        let now = crate::time::now();
        let reservation = Reservation {
            id: self.id.unwrap_or_default(),
            room_id: self.room_id.unwrap_or(RoomId::new(0)),
            user_name: self.user_name.unwrap_or_default(),
            title: self.title.unwrap_or_default(),
            start: self.start.unwrap_or(now),
            end: self.end.unwrap_or(now),
            people_count: self.people_count,
            created_at: self.created_at.unwrap_or(now),
        };
        reservation.validate()?;
        Ok(reservation)
    }
}
