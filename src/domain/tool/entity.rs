//! Tool runtime and invocation result types

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Credential mapping handed to a tool provider; shape is provider specific
pub type ToolCredentials = HashMap<String, serde_json::Value>;

/// Parameters of a single tool invocation
pub type ToolParameters = HashMap<String, serde_json::Value>;

/// Contextual metadata a tool instance runs with
#[derive(Debug, Clone, Default)]
pub struct ToolRuntime {
    credentials: ToolCredentials,
}

impl ToolRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(mut self, credentials: ToolCredentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn credentials(&self) -> &ToolCredentials {
        &self.credentials
    }

    /// Non-empty string credential
    pub fn credential_str(&self, key: &str) -> Option<&str> {
        self.credentials
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// A message produced by a tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message", rename_all = "snake_case")]
pub enum ToolInvokeMessage {
    Text(String),
    Link(String),
}

impl ToolInvokeMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn link(url: impl Into<String>) -> Self {
        Self::Link(url.into())
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Text(s) | Self::Link(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credential_str_ignores_empty_and_non_string() {
        let mut credentials = ToolCredentials::new();
        credentials.insert("appid".to_string(), json!("ABC-123"));
        credentials.insert("empty".to_string(), json!(""));
        credentials.insert("number".to_string(), json!(7));

        let runtime = ToolRuntime::new().with_credentials(credentials);

        assert_eq!(runtime.credential_str("appid"), Some("ABC-123"));
        assert_eq!(runtime.credential_str("empty"), None);
        assert_eq!(runtime.credential_str("number"), None);
        assert_eq!(runtime.credential_str("missing"), None);
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(ToolInvokeMessage::link("https://example.com")).unwrap();
        assert_eq!(json, json!({"type": "link", "message": "https://example.com"}));
    }
}
