//! # Loyalteez MCP
//!
//! This crate provides an MCP (Model Context Protocol) server for the
//! Loyalteez loyalty platform. AI assistants use it to track reward events,
//! run streaks and leaderboards, manage perks and drops, resolve user
//! wallets, relay gasless transactions and design loyalty programs.
//!
//! ## Overview
//!
//! The loyalteez-mcp crate handles:
//! - **Tools**: 29 tools forwarding validated calls to the Loyalteez APIs
//! - **Resources**: contract, network, rate limit, error, webhook and SDK
//!   reference material, plus an optional local documentation tree
//! - **JSON-RPC**: MCP protocol implementation over newline-delimited stdio
//! - **Clients**: HTTP clients for the event handler, shared services,
//!   wallet pregeneration and the gas relayer
//!
//! ## MCP Protocol
//!
//! Supported methods:
//! - `initialize`: Initialize the MCP session
//! - `ping`: Liveness check
//! - `tools/list`: List available tools
//! - `tools/call`: Execute a tool
//! - `resources/list`: List available resources
//! - `resources/read`: Read a resource
//!
//! ## Tool Categories
//!
//! - `events`: event definitions, tracking, bulk tracking, event config
//! - `identity`: platform user to wallet resolution
//! - `engagement`: streaks, milestones, leaderboards, activity stats
//! - `user`: balance, eligibility, aggregated stats
//! - `transactions`: gasless relay
//! - `drops`, `integrations`, `perks`, `achievements`
//! - `program-design`: program generation with starter code
//! - `diagnostics`, `webhooks`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loyalteez_mcp::{McpRequest, McpServer, ServiceConfig};
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_env()?;
//!     let server = McpServer::from_config(&config).await?;
//!
//!     let request = McpRequest::new(1, "tools/list");
//!     if let Some(response) = server.handle_request(request).await {
//!         println!("{}", serde_json::to_string(&response)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod brand_id;
pub mod clients;
pub mod codegen;
pub mod domain;
pub mod resources;
pub mod server;
pub mod tools;
pub mod transport;
pub mod types;
pub mod validation;

// Re-export main types
pub use server::{McpServer, McpServerError, McpServerResult, ResourceProvider, Tool, ToolContext};
pub use types::{
    ContentBlock, McpError, McpRequest, McpResponse, RequestId, ResourceCapabilities,
    ResourceContents, ResourceDefinition, ServerCapabilities, ServerInfo, ToolCall,
    ToolCapabilities, ToolDefinition, ToolResult,
};

pub use domain::{BrandId, EventDefinition, Platform, ProgramContext, UserIdentifier};
pub use validation::ValidationError;

// Re-export tool and resource collections
pub use resources::all_resources;
pub use tools::{all_tools, ToolError};

// Re-export service clients
pub use clients::{
    ClientError, ConfigError, LoyalteezClient, Network, ServiceConfig,
};

pub use transport::{serve, serve_stdio, TransportError};
