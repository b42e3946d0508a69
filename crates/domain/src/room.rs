//! Room: a bookable space, optionally tied to a sensor stream.

use serde::{Deserialize, Serialize};

use crate::error::{RateError, ValidationError};
use crate::id::RoomId;

/// A managed room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub floor: String,
    pub description: Option<String>,
    /// Ties the room to a measurement stream.
    pub sensor_id: Option<String>,
}

impl Room {
    /// Create a builder for constructing a [`Room`].
    #[must_use]
    pub fn builder() -> RoomBuilder {
        RoomBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `capacity` is zero ([`ValidationError::InvalidCapacity`])
    pub fn validate(&self) -> Result<(), RateError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.capacity == 0 {
            return Err(ValidationError::InvalidCapacity.into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`Room`].
#[derive(Debug, Default)]
pub struct RoomBuilder {
    id: Option<RoomId>,
    name: Option<String>,
    capacity: Option<u32>,
    floor: Option<String>,
    description: Option<String>,
    sensor_id: Option<String>,
}

impl RoomBuilder {
    #[must_use]
    pub fn id(mut self, id: RoomId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn capacity(mut self, capacity: u32) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = Some(floor.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn sensor_id(mut self, sensor_id: impl Into<String>) -> Self {
        self.sensor_id = Some(sensor_id.into());
        self
    }

    /// Consume the builder, validate, and return a [`Room`].
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Validation`] if `name` is missing or `capacity` is zero.
    pub fn build(self) -> Result<Room, RateError> {
        let room = Room {
            id: self.id.unwrap_or(RoomId::new(0)),
            name: self.name.unwrap_or_default(),
            capacity: self.capacity.unwrap_or_default(),
            floor: self.floor.unwrap_or_default(),
            description: self.description,
            sensor_id: self.sensor_id,
        };
        room.validate()?;
        Ok(room)
    }
}
