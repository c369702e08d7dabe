//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the resources
//! shared by every handler.

use conductor_core::InterviewConductor;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub conductor: Arc<InterviewConductor>,
}

impl AppState {
    pub fn new(conductor: InterviewConductor) -> Self {
        Self {
            conductor: Arc::new(conductor),
        }
    }
}
