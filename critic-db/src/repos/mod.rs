//! Repository implementations for database access

pub mod reviews;
