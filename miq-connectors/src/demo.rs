//! Minimal demo-mode connector implementations standing in for the external
//! systems the platform integrates with when no real credentials are
//! configured. Each exposes one or two illustrative tools so the registry
//! and router's LLM-fallback tier have something real to enumerate and call.

use crate::connector::{Connector, HealthCheckResult};
use async_trait::async_trait;
use miq_core::error::ConnectorError;
use miq_core::types::{ConnectorCategory, ToolDefinition};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct DemoChannelConnector {
    id: String,
    connected: AtomicBool,
}

impl DemoChannelConnector {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), connected: AtomicBool::new(false) }
    }
}

#[async_trait]
impl Connector for DemoChannelConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> ConnectorCategory {
        ConnectorCategory::Channel
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> HealthCheckResult {
        if self.is_connected() {
            HealthCheckResult::ok("demo channel reachable")
        } else {
            HealthCheckResult::unhealthy("not connected")
        }
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "post_message".to_string(),
            connector_id: self.id.clone(),
            description: "post a message to the default demo channel".to_string(),
            parameters_schema: json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"],
            }),
        }]
    }

    async fn call_tool(&self, tool_name: &str, params: Value) -> Result<Value, ConnectorError> {
        if !self.is_connected() {
            return Err(ConnectorError::NotConnected { id: self.id.clone() });
        }
        match tool_name {
            "post_message" => {
                let text = params.get("text").and_then(Value::as_str).unwrap_or_default();
                Ok(json!({"delivered": true, "channel": self.id, "text": text}))
            }
            other => Err(ConnectorError::ToolNotFound { name: other.to_string() }),
        }
    }
}

pub struct DemoMamConnector {
    id: String,
    connected: AtomicBool,
}

impl DemoMamConnector {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), connected: AtomicBool::new(false) }
    }
}

#[async_trait]
impl Connector for DemoMamConnector {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> ConnectorCategory {
        ConnectorCategory::Mam
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), ConnectorError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ConnectorError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> HealthCheckResult {
        if self.is_connected() {
            HealthCheckResult::ok("demo MAM catalog reachable")
        } else {
            HealthCheckResult::unhealthy("not connected")
        }
    }

    fn tool_definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "search_assets".to_string(),
            connector_id: self.id.clone(),
            description: "search the media asset catalog by keyword".to_string(),
            parameters_schema: json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"],
            }),
        }]
    }

    async fn call_tool(&self, tool_name: &str, params: Value) -> Result<Value, ConnectorError> {
        if !self.is_connected() {
            return Err(ConnectorError::NotConnected { id: self.id.clone() });
        }
        match tool_name {
            "search_assets" => {
                let query = params.get("query").and_then(Value::as_str).unwrap_or_default();
                Ok(json!({"results": [], "query": query}))
            }
            other => Err(ConnectorError::ToolNotFound { name: other.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_connector_requires_connect_before_calls() {
        let connector = DemoChannelConnector::new("slack");
        assert!(connector.call_tool("post_message", json!({"text": "hi"})).await.is_err());
        connector.connect().await.expect("connect must succeed");
        let result = connector.call_tool("post_message", json!({"text": "hi"})).await.expect("call must succeed");
        assert_eq!(result["delivered"], json!(true));
    }
}
