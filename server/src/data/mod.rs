//! Data access layer

pub mod sqlite;

pub use sqlite::{SqliteError, SqliteService};
