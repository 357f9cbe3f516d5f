//! Documentation index tests over a temporary markdown tree.

use loyalteez_mcp::clients::ServiceConfig;
use loyalteez_mcp::resources::docs::{load_documentation, DocsIndex};
use loyalteez_mcp::{McpRequest, McpServer};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn docs_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(
        root,
        "getting-started.md",
        "---\ntitle: Getting Started\ndescription: First steps with Loyalteez\n---\n\nCreate a brand in the Partner Portal.\n",
    );
    write(
        root,
        "integrations/discord.md",
        "---\nlabel: Discord Bot\ntags:\n  - discord\n  - bots\n---\n\nReward your Discord community.\n",
    );
    write(root, "guides/webhooks.md", "# Webhooks\n\nVerify every signature.\n");
    write(root, "guides/notes.txt", "not markdown");
    write(root, ".drafts/secret.md", "# Draft\n");
    write(root, "node_modules/pkg/README.md", "# Vendored\n");
    dir
}

#[test]
fn test_load_skips_hidden_and_vendored_directories() {
    let dir = docs_tree();
    let docs = load_documentation(dir.path());

    let uris: Vec<&str> = docs.keys().map(String::as_str).collect();
    assert_eq!(
        uris,
        vec![
            "loyalteez://docs/getting-started",
            "loyalteez://docs/guides/webhooks",
            "loyalteez://docs/integrations/discord",
        ]
    );

    let discord = &docs["loyalteez://docs/integrations/discord"];
    assert_eq!(discord.title, "Discord Bot");
    assert_eq!(discord.category.as_deref(), Some("integrations"));

    let webhooks = &docs["loyalteez://docs/guides/webhooks"];
    assert_eq!(webhooks.title, "webhooks");
    assert!(webhooks.frontmatter.is_empty());

    assert_eq!(docs["loyalteez://docs/getting-started"].category, None);
}

#[test]
fn test_missing_root_loads_nothing() {
    let dir = TempDir::new().unwrap();
    assert!(load_documentation(&dir.path().join("absent")).is_empty());
}

#[tokio::test]
async fn test_search_matches_title_body_and_uri() {
    let dir = docs_tree();
    let index = DocsIndex::new(Some(dir.path().to_path_buf()));

    let hits = index.search("DISCORD").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].uri, "loyalteez://docs/integrations/discord");

    let hits = index.search("signature").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "webhooks");

    assert_eq!(index.search("guides").await.len(), 1);
    assert!(index.search("kubernetes").await.is_empty());
}

#[tokio::test]
async fn test_index_is_cached_until_ttl_expires() {
    let dir = docs_tree();
    let index = DocsIndex::new(Some(dir.path().to_path_buf()));

    assert!(!index.stats().await.cached);
    assert_eq!(index.list().await.len(), 3);
    let stats = index.stats().await;
    assert!(stats.cached);
    assert_eq!(stats.doc_count, 3);

    write(dir.path(), "faq.md", "# FAQ\n");
    assert_eq!(index.list().await.len(), 3);

    index.clear().await;
    assert_eq!(index.list().await.len(), 4);
}

#[tokio::test]
async fn test_zero_ttl_rescans_every_time() {
    let dir = docs_tree();
    let index = DocsIndex::new(Some(dir.path().to_path_buf())).with_ttl(Duration::ZERO);

    assert_eq!(index.list().await.len(), 3);
    write(dir.path(), "faq.md", "# FAQ\n");
    assert_eq!(index.list().await.len(), 4);
}

#[tokio::test]
async fn test_docs_served_as_resources() {
    let dir = docs_tree();
    let mut config = ServiceConfig::default();
    config.docs_path = Some(dir.path().to_path_buf());
    let server = McpServer::from_config(&config).await.unwrap();

    let listed = server.list_resources().await;
    let getting_started = listed
        .iter()
        .find(|r| r.uri == "loyalteez://docs/getting-started")
        .unwrap();
    assert_eq!(getting_started.name, "Getting Started");
    assert_eq!(
        getting_started.description.as_deref(),
        Some("First steps with Loyalteez")
    );

    let request = McpRequest::new(1, "resources/read")
        .with_params(serde_json::json!({"uri": "loyalteez://docs/integrations/discord"}));
    let response = server.handle_request(request).await.unwrap();
    let contents = &response.result.unwrap()["contents"][0];
    assert_eq!(contents["mimeType"], "text/markdown");

    let text = contents["text"].as_str().unwrap();
    assert!(text.starts_with("# Discord Bot\n\n---\n"));
    assert!(text.contains("tags: discord,bots"));
    assert!(!text.contains("label:"));
    assert!(text.contains("Reward your Discord community."));

    let request = McpRequest::new(2, "resources/read")
        .with_params(serde_json::json!({"uri": "loyalteez://docs/.drafts/secret"}));
    let response = server.handle_request(request).await.unwrap();
    assert_eq!(response.error.unwrap().code, -32002);
}
