//! Connector registry: a uniform namespace over external systems (storage,
//! chat channels, MAM/CDN/newsroom/broadcast-control) exposed as callable
//! tools to the router's LLM-fallback tier and to agents' production paths.

pub mod connector;
pub mod demo;
pub mod registry;
pub mod tool;

pub use connector::{Connector, HealthCheckResult};
pub use demo::{DemoChannelConnector, DemoMamConnector};
pub use registry::ConnectorRegistry;
pub use tool::ToolCallResult;
