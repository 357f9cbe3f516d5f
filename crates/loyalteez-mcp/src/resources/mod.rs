//! Loyalteez MCP resources
//!
//! Reference material served under `loyalteez://`. Each module owns one URI
//! prefix. Everything except `docs/` is compiled into the binary.

pub mod contracts;
pub mod docs;
pub mod errors;
pub mod events;
pub mod network;
pub mod platforms;
pub mod rate_limits;
pub mod sdk;
pub mod shared_services;
pub mod webhooks;

use crate::server::{McpServerError, McpServerResult, ResourceProvider, ToolContext};
use crate::types::{ResourceContents, ResourceDefinition};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// URI scheme of every resource.
pub const SCHEME: &str = "loyalteez://";

enum Payload {
    Json(fn() -> Value),
    Markdown(&'static str),
}

/// A resource whose contents never change.
pub struct StaticResource {
    definition: ResourceDefinition,
    payload: Payload,
}

impl StaticResource {
    pub fn json(
        uri: &str,
        name: &str,
        description: &str,
        payload: fn() -> Value,
    ) -> Self {
        Self {
            definition: ResourceDefinition::json(uri, name, description),
            payload: Payload::Json(payload),
        }
    }

    pub fn markdown(uri: &str, name: &str, description: &str, text: &'static str) -> Self {
        Self {
            definition: ResourceDefinition::markdown(uri, name, description),
            payload: Payload::Markdown(text),
        }
    }

    fn contents(&self) -> ResourceContents {
        let uri = self.definition.uri.as_str();
        match &self.payload {
            Payload::Json(build) => ResourceContents::json(uri, &build()),
            Payload::Markdown(text) => ResourceContents::markdown(uri, *text),
        }
    }
}

/// Provider for a fixed set of resources under one prefix.
pub struct StaticProvider {
    prefix: &'static str,
    resources: Vec<StaticResource>,
}

impl StaticProvider {
    pub fn new(prefix: &'static str, resources: Vec<StaticResource>) -> Self {
        Self { prefix, resources }
    }
}

#[async_trait]
impl ResourceProvider for StaticProvider {
    fn prefix(&self) -> &str {
        self.prefix
    }

    async fn list(&self) -> Vec<ResourceDefinition> {
        self.resources.iter().map(|r| r.definition.clone()).collect()
    }

    async fn read(&self, uri: &str) -> McpServerResult<ResourceContents> {
        self.resources
            .iter()
            .find(|r| r.definition.uri == uri)
            .map(StaticResource::contents)
            .ok_or_else(|| McpServerError::ResourceNotFound(uri.to_string()))
    }
}

/// Every resource provider, in listing order.
pub fn all_resources(context: &ToolContext) -> Vec<Arc<dyn ResourceProvider>> {
    vec![
        Arc::new(contracts::provider()),
        Arc::new(network::provider()),
        Arc::new(platforms::provider()),
        Arc::new(events::provider()),
        Arc::new(shared_services::provider()),
        Arc::new(rate_limits::provider()),
        Arc::new(errors::provider()),
        Arc::new(webhooks::provider()),
        Arc::new(sdk::provider()),
        Arc::new(docs::DocsProvider::new(context.docs().clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::ServiceConfig;
    use std::collections::HashSet;

    fn providers() -> Vec<Arc<dyn ResourceProvider>> {
        let context = ToolContext::new(&ServiceConfig::default()).unwrap();
        all_resources(&context)
    }

    #[tokio::test]
    async fn test_static_resources_listed() {
        let mut uris = HashSet::new();
        for provider in providers() {
            for resource in provider.list().await {
                assert!(resource.uri.starts_with(provider.prefix()), "{}", resource.uri);
                assert!(uris.insert(resource.uri.clone()), "duplicate {}", resource.uri);
            }
        }
        assert_eq!(uris.len(), 15);
        assert!(uris.contains("loyalteez://sdk/mobile"));
    }

    #[tokio::test]
    async fn test_every_listed_resource_reads() {
        for provider in providers() {
            for resource in provider.list().await {
                let contents = provider.read(&resource.uri).await.unwrap();
                assert_eq!(contents.uri, resource.uri);
                assert_eq!(Some(contents.mime_type.clone()), resource.mime_type);
                if contents.mime_type == crate::types::MIME_JSON {
                    serde_json::from_str::<Value>(&contents.text).unwrap();
                }
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_uri_in_known_prefix() {
        let provider = contracts::provider();
        let err = provider.read("loyalteez://contracts/usdc").await.unwrap_err();
        assert!(matches!(err, McpServerError::ResourceNotFound(uri) if uri.ends_with("usdc")));
    }

    #[test]
    fn test_prefixes_use_scheme() {
        for provider in providers() {
            assert!(provider.prefix().starts_with(SCHEME));
            assert!(provider.prefix().ends_with('/'));
        }
    }
}
