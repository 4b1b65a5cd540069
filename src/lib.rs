//! Connectivity probe for MySQL and PostgreSQL.
//!
//! Serves a single JSON endpoint that opens, and immediately closes, a
//! connection to the configured database and answers `{"message":"ok"}` or
//! `{"message":"unable to connect to database"}` with status 500.

pub mod cli;
pub mod config;
pub mod connector;
pub mod metrics;
pub mod probe;
pub mod tls;
