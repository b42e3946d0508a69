//! # rate-domain
//!
//! Pure domain model for the rate room-heating system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Rooms** (bookable spaces, optionally tied to a sensor stream)
//! - Define **Reservations** and their interval semantics (overlap, containment)
//! - Define **Measurements** and the occupancy context derived for each reading
//! - Define **Weather** snapshots and their freshness rule
//! - Decide **heating** status from temperature and reservation state
//! - Compose the per-room **status** record served to clients
//! - Build **forecast** feature windows and apply min-max scaling
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod forecast;
pub mod heating;
pub mod measurement;
pub mod reservation;
pub mod room;
pub mod room_status;
pub mod weather;
