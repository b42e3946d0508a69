//! # rate-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `rate-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `rate-app` (for port traits) and `rate-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod error;
pub mod measurement_repo;
pub mod pool;
pub mod reservation_repo;
pub mod room_repo;

mod timestamp;

pub use measurement_repo::SqliteMeasurementLog;
pub use pool::{Config, Database};
pub use reservation_repo::SqliteReservationRepository;
pub use room_repo::SqliteRoomRepository;
