//! Score persistence on SQLite.

mod error;
mod models;
mod repository;
mod schema; // Diesel schema - internal use only

pub use error::DbError;
pub use models::{NewScore, Score};
pub use repository::ScoreRepository;
