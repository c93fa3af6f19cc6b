//! SQLite repositories
//!
//! Free async functions per aggregate, all taking the shared pool.

pub mod dashboard;
pub mod saved_filter;
pub mod source;
pub mod user;
