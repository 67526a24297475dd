//! The connector registry: a single namespace over every connected external
//! system, auto-reconnecting disconnected connectors on tool calls and never
//! raising — every call resolves to a [`ToolCallResult`].
//!
//! Grounded on `ConnectorRegistry` in `original_source/connectors/registry.py`
//! and the register/lookup/execute shape of `ToolRegistry` in
//! `rustant-tools/src/registry.rs`.

use crate::connector::{Connector, HealthCheckResult};
use crate::tool::{qualify, split_qualified_name, ToolCallResult};
use miq_core::error::ConnectorError;
use miq_core::types::{ConnectorCategory, ToolDefinition};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

const HEALTH_HISTORY_LIMIT: usize = 50;

pub struct ConnectorRegistry {
    connectors: RwLock<HashMap<String, Arc<dyn Connector>>>,
    health_history: RwLock<HashMap<String, VecDeque<HealthCheckResult>>>,
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self {
            connectors: RwLock::new(HashMap::new()),
            health_history: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(&self, connector: Arc<dyn Connector>) {
        let id = connector.id().to_string();
        self.connectors.write().await.insert(id, connector);
    }

    pub async fn deregister(&self, id: &str) -> Result<(), ConnectorError> {
        self.connectors
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ConnectorError::NotFound { id: id.to_string() })
    }

    pub async fn get(&self, id: &str) -> Result<Arc<dyn Connector>, ConnectorError> {
        self.connectors
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| ConnectorError::NotFound { id: id.to_string() })
    }

    pub async fn get_by_category(&self, category: ConnectorCategory) -> Vec<Arc<dyn Connector>> {
        self.connectors
            .read()
            .await
            .values()
            .filter(|c| c.category() == category)
            .cloned()
            .collect()
    }

    pub async fn get_connected(&self) -> Vec<Arc<dyn Connector>> {
        self.connectors.read().await.values().filter(|c| c.is_connected()).cloned().collect()
    }

    pub async fn list_ids(&self) -> Vec<String> {
        self.connectors.read().await.keys().cloned().collect()
    }

    pub async fn connect_all(&self) -> HashMap<String, Result<(), String>> {
        let connectors: Vec<_> = self.connectors.read().await.values().cloned().collect();
        let mut results = HashMap::new();
        for connector in connectors {
            let outcome = connector.connect().await.map_err(|e| e.to_string());
            results.insert(connector.id().to_string(), outcome);
        }
        results
    }

    pub async fn disconnect_all(&self) -> HashMap<String, Result<(), String>> {
        let connectors: Vec<_> = self.connectors.read().await.values().cloned().collect();
        let mut results = HashMap::new();
        for connector in connectors {
            let outcome = connector.disconnect().await.map_err(|e| e.to_string());
            results.insert(connector.id().to_string(), outcome);
        }
        results
    }

    pub async fn reconnect(&self, id: &str) -> Result<(), ConnectorError> {
        let connector = self.get(id).await?;
        let _ = connector.disconnect().await;
        connector.connect().await
    }

    /// Run a health check on every registered connector, recording each
    /// result and trimming each connector's history to the last 50 checks.
    pub async fn health_check_all(&self) -> HashMap<String, HealthCheckResult> {
        let connectors: Vec<_> = self.connectors.read().await.values().cloned().collect();
        let mut results = HashMap::new();
        let mut history = self.health_history.write().await;
        for connector in connectors {
            let result = connector.health_check().await;
            let entry = history.entry(connector.id().to_string()).or_default();
            entry.push_back(result.clone());
            if entry.len() > HEALTH_HISTORY_LIMIT {
                entry.pop_front();
            }
            results.insert(connector.id().to_string(), result);
        }
        results
    }

    pub async fn health_history(&self, id: &str) -> Vec<HealthCheckResult> {
        self.health_history.read().await.get(id).map(|h| h.iter().cloned().collect()).unwrap_or_default()
    }

    pub async fn get_all_tool_definitions(&self) -> Vec<ToolDefinition> {
        let connectors: Vec<_> = self.connectors.read().await.values().cloned().collect();
        connectors.iter().flat_map(|c| c.tool_definitions()).collect()
    }

    pub async fn get_tool_definitions_for_category(&self, category: ConnectorCategory) -> Vec<ToolDefinition> {
        let connectors = self.get_by_category(category).await;
        connectors.iter().flat_map(|c| c.tool_definitions()).collect()
    }

    /// Call `<connector_id>.<tool_name>`, auto-reconnecting a disconnected
    /// connector first. Never returns an `Err` — every failure mode surfaces
    /// as `ToolCallResult::err`.
    pub async fn call_tool(&self, qualified_name: &str, params: Value) -> ToolCallResult {
        let Some((connector_id, tool_name)) = split_qualified_name(qualified_name) else {
            return ToolCallResult::err(format!("malformed tool name: {qualified_name}"));
        };

        let connector = match self.get(connector_id).await {
            Ok(c) => c,
            Err(err) => return ToolCallResult::err(err.to_string()),
        };

        if !connector.is_connected() {
            if let Err(err) = connector.connect().await {
                return ToolCallResult::err(format!("auto-reconnect failed: {err}"));
            }
        }

        match connector.call_tool(tool_name, params).await {
            Ok(data) => ToolCallResult::ok(data),
            Err(err) => ToolCallResult::err(err.to_string()),
        }
    }
}

pub fn qualified_tool_name(connector_id: &str, tool_name: &str) -> String {
    qualify(connector_id, tool_name)
}
