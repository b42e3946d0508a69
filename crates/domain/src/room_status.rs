//! Room status: the composed answer to "what is this room doing now?".

use serde::{Deserialize, Serialize};

use crate::heating::HeatingDecision;
use crate::reservation::Reservation;
use crate::room::Room;
use crate::time::Timestamp;

/// Everything a client needs to display one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomStatus {
    pub room: Room,
    pub current_temp: Option<f64>,
    pub target_temp: f64,
    pub last_measured_at: Option<Timestamp>,
    pub current_reservation: Option<Reservation>,
    /// Next reservation starting within the pre-heating horizon.
    pub upcoming_reservation: Option<Reservation>,
    /// Next reservation regardless of horizon.
    pub next_reservation: Option<Reservation>,
    pub heating: HeatingDecision,
}
