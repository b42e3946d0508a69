//! Room service: use-cases for room metadata.

use rate_domain::error::{NotFoundError, RateError};
use rate_domain::id::RoomId;
use rate_domain::room::Room;

use crate::ports::RoomRepository;

/// Application service for room lookups and seeding.
pub struct RoomService<R> {
    repo: R,
}

impl<R: RoomRepository> RoomService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Insert or replace a room after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    pub async fn upsert_room(&self, room: Room) -> Result<Room, RateError> {
        room.validate()?;
        self.repo.upsert(room).await
    }

    /// Look up a room by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`RateError::NotFound`] when no room with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_room(&self, id: RoomId) -> Result<Room, RateError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Room",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all rooms.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rooms(&self) -> Result<Vec<Room>, RateError> {
        self.repo.get_all().await
    }
}
