use serde::Deserialize;

/// Tunable names and switches for the policy engine.
///
/// Every field has a default, so a partial document is enough:
///
/// ```
/// use privacy_policy::PrivacyConfig;
///
/// let config = PrivacyConfig::from_json(r#"{"anonymous_name": "Someone"}"#).unwrap();
/// assert_eq!(config.anonymous_name, "Someone");
/// assert_eq!(config.private_name, "Private User");
/// assert!(config.audit_decisions);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Alias shown for anonymous users who did not choose one
    pub anonymous_name: String,
    /// Username placed in denial placeholders
    pub private_name: String,
    /// Display name for users that cannot be resolved
    pub unknown_name: String,
    /// Whether the authorizer records an audit event per decision
    pub audit_decisions: bool,
}

impl PrivacyConfig {
    /// Parses a configuration document, filling absent fields with defaults.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            anonymous_name: "Anonymous User".to_string(),
            private_name: "Private User".to_string(),
            unknown_name: "Unknown User".to_string(),
            audit_decisions: true,
        }
    }
}
