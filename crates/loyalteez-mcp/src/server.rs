//! MCP server implementation
//!
//! This module provides the dispatcher that owns the tool registry and the
//! resource providers, and answers MCP requests.

use crate::brand_id::resolve_brand_id;
use crate::clients::{ClientResult, LoyalteezClient, Network, ServiceConfig};
use crate::domain::BrandId;
use crate::resources::docs::DocsIndex;
use crate::types::*;
use crate::validation::ValidationError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

/// Name announced in `initialize`.
pub const SERVER_NAME: &str = "loyalteez-mcp-server";

/// MCP server error types.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Tool not found
    #[error("Unknown tool: {0}")]
    ToolNotFound(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<McpServerError> for McpError {
    fn from(err: McpServerError) -> Self {
        match err {
            McpServerError::ToolNotFound(_) => McpError::invalid_params(err.to_string()),
            McpServerError::ResourceNotFound(uri) => McpError::resource_not_found(&uri),
            McpServerError::InvalidParams(message) => McpError::invalid_params(message),
            McpServerError::Internal(message) => McpError::internal_error(message),
        }
    }
}

/// Result type for MCP server operations.
pub type McpServerResult<T> = Result<T, McpServerError>;

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool definition.
    fn definition(&self) -> ToolDefinition;

    /// Execute the tool with given arguments.
    async fn execute(
        &self,
        args: serde_json::Value,
        context: &ToolContext,
    ) -> McpServerResult<ToolResult>;
}

/// A family of resources sharing one URI prefix.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// URI prefix routed to this provider, e.g. `loyalteez://contracts/`.
    fn prefix(&self) -> &str;

    /// Resources currently offered.
    async fn list(&self) -> Vec<ResourceDefinition>;

    /// Read one resource. Unknown URIs give [`McpServerError::ResourceNotFound`].
    async fn read(&self, uri: &str) -> McpServerResult<ResourceContents>;
}

/// Context handed to every tool call.
///
/// Built once at start-up from [`ServiceConfig`]; tools never read the
/// process environment themselves.
#[derive(Clone)]
pub struct ToolContext {
    /// Loyalteez service clients
    client: LoyalteezClient,

    /// Brand used when a call omits `brandId`
    default_brand_id: Option<String>,

    /// Documentation index
    docs: Arc<DocsIndex>,
}

impl ToolContext {
    /// Create a context from the service configuration.
    pub fn new(config: &ServiceConfig) -> ClientResult<Self> {
        Ok(Self {
            client: LoyalteezClient::new(config)?,
            default_brand_id: config.default_brand_id.clone(),
            docs: Arc::new(DocsIndex::new(config.docs_path.clone())),
        })
    }

    /// Replace the default brand id.
    pub fn with_default_brand_id(mut self, brand_id: Option<String>) -> Self {
        self.default_brand_id = brand_id;
        self
    }

    pub fn client(&self) -> &LoyalteezClient {
        &self.client
    }

    pub fn network(&self) -> Network {
        self.client.network()
    }

    pub fn docs(&self) -> &Arc<DocsIndex> {
        &self.docs
    }

    /// Resolve the brand for one call: the candidate, else the default.
    pub fn brand_id(&self, candidate: Option<&str>) -> Result<BrandId, ValidationError> {
        resolve_brand_id(candidate, self.default_brand_id.as_deref())
    }
}

/// Loyalteez MCP server.
///
/// Routes tool calls by exact name and resource reads by URI prefix.
pub struct McpServer {
    /// Server info
    info: ServerInfo,

    /// Server capabilities
    capabilities: ServerCapabilities,

    /// Shared tool context
    context: ToolContext,

    /// Registered tools
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,

    /// Registered resource providers
    resources: Arc<RwLock<Vec<Arc<dyn ResourceProvider>>>>,
}

impl McpServer {
    /// Create a new, empty MCP server.
    pub fn new(name: impl Into<String>, version: impl Into<String>, context: ToolContext) -> Self {
        Self {
            info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolCapabilities::default()),
                resources: Some(ResourceCapabilities::default()),
                experimental: HashMap::new(),
            },
            context,
            tools: Arc::new(RwLock::new(HashMap::new())),
            resources: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create an empty server with the Loyalteez name and crate version.
    pub fn loyalteez(context: ToolContext) -> Self {
        Self::new(SERVER_NAME, env!("CARGO_PKG_VERSION"), context)
    }

    /// Create a server with every tool and resource registered.
    pub async fn from_config(config: &ServiceConfig) -> ClientResult<Self> {
        let server = Self::loyalteez(ToolContext::new(config)?);
        server.register_tools(crate::tools::all_tools()).await;
        server
            .register_resources(crate::resources::all_resources(&server.context))
            .await;
        Ok(server)
    }

    /// Register a tool.
    pub async fn register_tool(&self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        let mut tools = self.tools.write().await;
        if tools.insert(name.clone(), tool).is_some() {
            warn!("Tool {} registered twice; keeping the latest", name);
        }
    }

    /// Register multiple tools.
    pub async fn register_tools(&self, tools: Vec<Arc<dyn Tool>>) {
        for tool in tools {
            self.register_tool(tool).await;
        }
    }

    /// Register a resource provider.
    pub async fn register_resource(&self, provider: Arc<dyn ResourceProvider>) {
        self.resources.write().await.push(provider);
    }

    /// Register multiple resource providers.
    pub async fn register_resources(&self, providers: Vec<Arc<dyn ResourceProvider>>) {
        for provider in providers {
            self.register_resource(provider).await;
        }
    }

    /// Get all tool definitions, ordered by name.
    pub async fn list_tools(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        let mut definitions: Vec<_> = tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Get all resources, in provider registration order.
    pub async fn list_resources(&self) -> Vec<ResourceDefinition> {
        let providers = self.resources.read().await.clone();
        let mut resources = Vec::new();
        for provider in providers {
            resources.extend(provider.list().await);
        }
        resources
    }

    /// Execute a tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> McpServerResult<ToolResult> {
        let tool = {
            let tools = self.tools.read().await;
            tools
                .get(name)
                .cloned()
                .ok_or_else(|| McpServerError::ToolNotFound(name.to_string()))?
        };

        tool.execute(arguments, &self.context).await
    }

    /// Read a resource through the provider owning its prefix.
    pub async fn read_resource(&self, uri: &str) -> McpServerResult<ResourceContents> {
        let provider = {
            let providers = self.resources.read().await;
            providers
                .iter()
                .find(|p| uri.starts_with(p.prefix()))
                .cloned()
                .ok_or_else(|| McpServerError::ResourceNotFound(uri.to_string()))?
        };

        provider.read(uri).await
    }

    /// Handle an MCP request. Notifications get no response.
    #[instrument(skip(self, request), fields(method = %request.method))]
    pub async fn handle_request(&self, request: McpRequest) -> Option<McpResponse> {
        let Some(id) = request.id else {
            debug!("Ignoring notification {}", request.method);
            return None;
        };

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => McpResponse::success(id, serde_json::json!({})),
            "tools/list" => self.handle_tools_list(id).await,
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "resources/list" => self.handle_resources_list(id).await,
            "resources/read" => self.handle_resources_read(id, request.params).await,
            _ => McpResponse::error(id, McpError::method_not_found(&request.method)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: RequestId) -> McpResponse {
        McpResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": self.capabilities,
                "serverInfo": self.info
            }),
        )
    }

    async fn handle_tools_list(&self, id: RequestId) -> McpResponse {
        let tools = self.list_tools().await;
        McpResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    async fn handle_tools_call(
        &self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let call: ToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        debug!("Calling tool {}", call.name);
        let result = self
            .call_tool(&call.name, call.arguments)
            .await
            .and_then(|result| {
                serde_json::to_value(result).map_err(|e| McpServerError::Internal(e.to_string()))
            });

        match result {
            Ok(value) => McpResponse::success(id, value),
            Err(e) => McpResponse::error(id, e.into()),
        }
    }

    async fn handle_resources_list(&self, id: RequestId) -> McpResponse {
        let resources = self.list_resources().await;
        McpResponse::success(id, serde_json::json!({ "resources": resources }))
    }

    async fn handle_resources_read(
        &self,
        id: RequestId,
        params: Option<serde_json::Value>,
    ) -> McpResponse {
        let params = match params {
            Some(p) => p,
            None => return McpResponse::error(id, McpError::invalid_params("Missing params")),
        };

        let params: ReadResourceParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return McpResponse::error(id, McpError::invalid_params(e.to_string())),
        };

        match self.read_resource(&params.uri).await {
            Ok(contents) => {
                McpResponse::success(id, serde_json::json!({ "contents": [contents] }))
            }
            Err(e) => McpResponse::error(id, e.into()),
        }
    }

    /// Get server info.
    pub fn info(&self) -> &ServerInfo {
        &self.info
    }

    /// Get server capabilities.
    pub fn capabilities(&self) -> &ServerCapabilities {
        &self.capabilities
    }

    /// Get the shared tool context.
    pub fn context(&self) -> &ToolContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestTool;

    #[async_trait]
    impl Tool for TestTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition::new("test_tool", "A test tool").with_category("test")
        }

        async fn execute(
            &self,
            _args: serde_json::Value,
            _context: &ToolContext,
        ) -> McpServerResult<ToolResult> {
            Ok(ToolResult::text("Test result"))
        }
    }

    struct TestResources;

    #[async_trait]
    impl ResourceProvider for TestResources {
        fn prefix(&self) -> &str {
            "loyalteez://test/"
        }

        async fn list(&self) -> Vec<ResourceDefinition> {
            vec![ResourceDefinition::json("loyalteez://test/item", "Item", "A test item")]
        }

        async fn read(&self, uri: &str) -> McpServerResult<ResourceContents> {
            match uri {
                "loyalteez://test/item" => Ok(ResourceContents::json(uri, &serde_json::json!({"ok": true}))),
                _ => Err(McpServerError::ResourceNotFound(uri.to_string())),
            }
        }
    }

    fn server() -> McpServer {
        let context = ToolContext::new(&ServiceConfig::default()).unwrap();
        McpServer::loyalteez(context)
    }

    #[tokio::test]
    async fn test_server_creation() {
        let server = server();
        assert_eq!(server.info().name, "loyalteez-mcp-server");
        assert_eq!(server.info().version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_register_tool() {
        let server = server();
        server.register_tool(Arc::new(TestTool)).await;

        let tools = server.list_tools().await;
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "test_tool");
        assert_eq!(tools[0].category.as_deref(), Some("test"));
    }

    #[tokio::test]
    async fn test_call_tool() {
        let server = server();
        server.register_tool(Arc::new(TestTool)).await;

        let result = server.call_tool("test_tool", serde_json::json!({})).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(result.text_content(), "Test result");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let server = server();
        let req = McpRequest::new(1, "tools/call")
            .with_params(serde_json::json!({"name": "nope", "arguments": {}}));
        let resp = server.handle_request(req).await.unwrap();

        let error = resp.error.unwrap();
        assert_eq!(error.code, McpError::INVALID_PARAMS);
        assert_eq!(error.message, "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let server = server();

        let req = McpRequest::new("1", "initialize");
        let resp = server.handle_request(req).await.unwrap();

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "loyalteez-mcp-server");
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(result["capabilities"]["resources"]["listChanged"], false);
        assert_eq!(result["capabilities"]["resources"]["subscribe"], false);
    }

    #[tokio::test]
    async fn test_ping_and_unknown_method() {
        let server = server();

        let resp = server.handle_request(McpRequest::new(2, "ping")).await.unwrap();
        assert_eq!(resp.result, Some(serde_json::json!({})));

        let resp = server
            .handle_request(McpRequest::new(3, "prompts/list"))
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, McpError::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notifications_are_not_answered() {
        let server = server();
        let resp = server
            .handle_request(McpRequest::notification("notifications/initialized"))
            .await;
        assert!(resp.is_none());
    }

    #[tokio::test]
    async fn test_resource_routing() {
        let server = server();
        server.register_resource(Arc::new(TestResources)).await;

        assert_eq!(server.list_resources().await.len(), 1);

        let contents = server.read_resource("loyalteez://test/item").await.unwrap();
        assert_eq!(contents.mime_type, "application/json");

        let err = server.read_resource("loyalteez://test/missing").await.unwrap_err();
        assert!(matches!(err, McpServerError::ResourceNotFound(_)));

        let req = McpRequest::new(4, "resources/read")
            .with_params(serde_json::json!({"uri": "loyalteez://other/x"}));
        let resp = server.handle_request(req).await.unwrap();
        let error = resp.error.unwrap();
        assert_eq!(error.code, McpError::RESOURCE_NOT_FOUND);
        assert_eq!(error.message, "Resource not found: loyalteez://other/x");
    }

    #[tokio::test]
    async fn test_context_resolves_default_brand() {
        let context = ToolContext::new(&ServiceConfig::default())
            .unwrap()
            .with_default_brand_id(Some("0xABCDEF1234567890ABCDEF1234567890ABCDEF12".to_string()));

        let brand = context.brand_id(None).unwrap();
        assert_eq!(brand.as_str(), "0xabcdef1234567890abcdef1234567890abcdef12");

        let context = context.with_default_brand_id(None);
        assert_eq!(context.brand_id(None), Err(ValidationError::BrandIdRequired));
    }
}
