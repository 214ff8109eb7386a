use thiserror::Error as ThisError;

/// Errors that can occur in the privacy-policy crate.
///
/// Authorization decisions never surface these: a decision always produces a
/// [`PrivacyResponse`](crate::PrivacyResponse). They are returned only by the
/// direct handler lookup and by the settings mutation path.
#[derive(Debug, ThisError)]
pub enum Error {
    /// No handler exists for the requested action.
    ///
    /// Carries the literal requested value; an absent action renders as `<none>`.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// A privacy settings update was rejected by validation.
    #[error("Invalid privacy settings: {0}")]
    InvalidSettings(String),

    /// The persistence gateway failed on a path that surfaces failures.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl Error {
    /// Builds an [`Error::UnknownAction`] from a possibly absent action value.
    pub fn unknown_action(action: Option<&str>) -> Self {
        Error::UnknownAction(action.unwrap_or("<none>").to_string())
    }
}

/// A failure reported by a [`PersistenceGateway`](crate::gateway::PersistenceGateway).
///
/// Gateway errors name the operation that failed so that the fail-closed
/// fallback can log what was lost.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{operation} failed: {message}")]
pub struct GatewayError {
    operation: &'static str,
    message: String,
}

impl GatewayError {
    /// Creates a new gateway error for the given operation.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// Returns the gateway operation that failed.
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Returns the failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_action_carries_literal_value() {
        let err = Error::unknown_action(Some("view_wallet"));
        assert_eq!(err.to_string(), "Unknown action: view_wallet");
    }

    #[test]
    fn unknown_action_renders_absent_value() {
        let err = Error::unknown_action(None);
        assert_eq!(err.to_string(), "Unknown action: <none>");
    }

    #[test]
    fn gateway_error_display_names_operation() {
        let err = GatewayError::new("get_event", "connection reset");
        assert_eq!(err.to_string(), "get_event failed: connection reset");
        assert_eq!(err.operation(), "get_event");
        assert_eq!(err.message(), "connection reset");
    }

    #[test]
    fn gateway_error_converts_into_crate_error() {
        let err: Error = GatewayError::new("upsert_privacy_settings", "timeout").into();
        assert!(matches!(err, Error::Gateway(_)));
        assert_eq!(err.to_string(), "upsert_privacy_settings failed: timeout");
    }
}
