use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The namespaced result of calling a tool through the registry. Mirrors the
/// `{success, error}` envelope `ConnectorRegistry.call_tool` always returns
/// in `original_source/connectors/registry.py` — callers never see a raised
/// exception, only this result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolCallResult {
    pub fn ok(data: Value) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(message.into()) }
    }
}

/// Split a fully-qualified `<connector_id>.<tool_name>` tool name as exposed
/// by `ConnectorRegistry::get_all_tool_definitions`.
pub fn split_qualified_name(qualified: &str) -> Option<(&str, &str)> {
    qualified.split_once('.')
}

pub fn qualify(connector_id: &str, tool_name: &str) -> String {
    format!("{connector_id}.{tool_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_dot_only() {
        assert_eq!(split_qualified_name("slack.post_message"), Some(("slack", "post_message")));
        assert_eq!(split_qualified_name("mam.archive.optimize"), Some(("mam", "archive.optimize")));
        assert_eq!(split_qualified_name("no-dot"), None);
    }
}
