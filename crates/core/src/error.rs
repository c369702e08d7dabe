use crate::session::{Phase, SessionId};

/// Errors surfaced by the conductor to its callers.
#[derive(Debug, thiserror::Error)]
pub enum ConductorError {
    #[error("Session '{0}' not found")]
    SessionNotFound(SessionId),
    #[error("Session '{0}' already exists")]
    SessionAlreadyExists(SessionId),
    #[error("Invalid transition: cannot {action} while session is in phase '{phase}'")]
    InvalidTransition { phase: Phase, action: &'static str },
    /// The judgment collaborator failed or timed out. Recovered inside the
    /// state machine; it only escapes from the judgment helpers themselves.
    #[error("Judgment unavailable: {0}")]
    JudgmentUnavailable(String),
    #[error("Topic catalog is empty; no topic can be selected")]
    CatalogExhaustedPrematurely,
    #[error("Invalid topic catalog: {0}")]
    InvalidCatalog(String),
}

pub type Result<T, E = ConductorError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            ConductorError::SessionNotFound(id).to_string(),
            "Session '550e8400-e29b-41d4-a716-446655440000' not found"
        );

        let err = ConductorError::InvalidTransition {
            phase: Phase::Completed,
            action: "submit an answer",
        };
        assert_eq!(
            err.to_string(),
            "Invalid transition: cannot submit an answer while session is in phase 'completed'"
        );
    }

    #[test]
    fn test_error_converts_into_anyhow() {
        let err: anyhow::Error = ConductorError::CatalogExhaustedPrematurely.into();
        assert!(matches!(
            err.downcast_ref::<ConductorError>(),
            Some(ConductorError::CatalogExhaustedPrematurely)
        ));
    }
}
