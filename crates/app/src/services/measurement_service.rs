//! Measurement service: read access to the measurement log.

use rate_domain::error::RateError;
use rate_domain::id::RoomId;
use rate_domain::measurement::Measurement;

use crate::ports::MeasurementLog;

/// Upper bound on the number of rows any listing returns.
pub const MAX_LIST_LIMIT: usize = 1000;

/// Application service for querying stored measurements.
pub struct MeasurementService<L> {
    log: L,
}

impl<L: MeasurementLog> MeasurementService<L> {
    /// Create a new service backed by the given log.
    pub fn new(log: L) -> Self {
        Self { log }
    }

    pub(crate) fn log(&self) -> &L {
        &self.log
    }

    /// Most recent measurement of a room.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn latest(&self, room_id: RoomId) -> Result<Option<Measurement>, RateError> {
        self.log.latest_for_room(room_id).await
    }

    /// Up to `limit` measurements of a room, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn recent(
        &self,
        room_id: RoomId,
        limit: usize,
    ) -> Result<Vec<Measurement>, RateError> {
        self.log
            .recent_for_room(room_id, limit.min(MAX_LIST_LIMIT))
            .await
    }

    /// Most recent measurement across all rooms.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn last(&self) -> Result<Option<Measurement>, RateError> {
        self.log.last().await
    }

    /// Up to `limit` measurements across all rooms, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the log.
    pub async fn list(&self, limit: usize) -> Result<Vec<Measurement>, RateError> {
        self.log.list_recent(limit.min(MAX_LIST_LIMIT)).await
    }
}
