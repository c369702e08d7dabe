//! Interview Conductor API Library Crate
//!
//! This library contains the HTTP layer of the interview conductor: the
//! application state, configuration, the Postgres archive, handlers and
//! routing. The binaries are thin wrappers around it.

pub mod config;
pub mod db;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
