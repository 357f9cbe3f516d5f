//! Developer documentation from a local markdown tree
//!
//! Files under the configured root are served as `loyalteez://docs/{path}`
//! with the `.md` extension dropped. The index is built on first use and
//! rebuilt once it is older than [`CACHE_TTL`].
//!
//! Frontmatter is YAML between `---` lines at the top of a file:
//!
//! ```markdown
//! ---
//! title: Discord Integration
//! description: Reward your Discord community
//! ---
//!
//! Body starts here.
//! ```

use crate::server::{McpServerError, McpServerResult, ResourceProvider};
use crate::types::{ResourceContents, ResourceDefinition, MIME_MARKDOWN};
use async_trait::async_trait;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

pub const DOCS_PREFIX: &str = "loyalteez://docs/";

/// How long a loaded index is served before the tree is scanned again.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// One markdown document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocFile {
    pub uri: String,
    pub path: PathBuf,
    pub title: String,
    /// Frontmatter in file order, values rendered as text.
    pub frontmatter: Vec<(String, String)>,
    pub body: String,
    /// First directory below the root, for nested files.
    pub category: Option<String>,
}

impl DocFile {
    pub fn description(&self) -> Option<&str> {
        self.frontmatter
            .iter()
            .find(|(key, _)| key == "description")
            .map(|(_, value)| value.as_str())
    }

    /// Markdown served for this document: the title, the remaining
    /// frontmatter and the body.
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n\n", self.title);
        if !self.frontmatter.is_empty() {
            out.push_str("---\n");
            for (key, value) in &self.frontmatter {
                if key != "title" && key != "label" {
                    out.push_str(&format!("{}: {}\n", key, value));
                }
            }
            out.push_str("---\n\n");
        }
        out.push_str(&self.body);
        out
    }

    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.body.to_lowercase().contains(needle)
            || self.uri.to_lowercase().contains(needle)
    }
}

type Index = Arc<BTreeMap<String, DocFile>>;

struct Snapshot {
    loaded_at: Instant,
    docs: Index,
}

/// Cache state, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: bool,
    pub age: Option<Duration>,
    pub doc_count: usize,
}

/// Lazily loaded, time-limited index of the documentation tree.
pub struct DocsIndex {
    root: Option<PathBuf>,
    ttl: Duration,
    cache: RwLock<Option<Snapshot>>,
}

impl DocsIndex {
    /// Index over `root`. Without a root the index is always empty.
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            ttl: CACHE_TTL,
            cache: RwLock::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    async fn snapshot(&self) -> Index {
        {
            let cache = self.cache.read().await;
            if let Some(snapshot) = cache.as_ref() {
                if snapshot.loaded_at.elapsed() < self.ttl {
                    return snapshot.docs.clone();
                }
            }
        }

        let mut cache = self.cache.write().await;
        // Another caller may have reloaded while we waited for the lock.
        if let Some(snapshot) = cache.as_ref() {
            if snapshot.loaded_at.elapsed() < self.ttl {
                return snapshot.docs.clone();
            }
        }

        let docs: Index = match &self.root {
            Some(root) => {
                let root = root.clone();
                match tokio::task::spawn_blocking(move || load_documentation(&root)).await {
                    Ok(docs) => Arc::new(docs),
                    Err(e) => {
                        warn!("Documentation load aborted: {}", e);
                        Arc::new(BTreeMap::new())
                    }
                }
            }
            None => Arc::new(BTreeMap::new()),
        };

        *cache = Some(Snapshot {
            loaded_at: Instant::now(),
            docs: docs.clone(),
        });
        docs
    }

    /// All documents, ordered by URI.
    pub async fn list(&self) -> Vec<DocFile> {
        self.snapshot().await.values().cloned().collect()
    }

    pub async fn get(&self, uri: &str) -> Option<DocFile> {
        self.snapshot().await.get(uri).cloned()
    }

    /// Documents whose title, body or URI contain `query`, ignoring case.
    pub async fn search(&self, query: &str) -> Vec<DocFile> {
        let needle = query.to_lowercase();
        self.snapshot()
            .await
            .values()
            .filter(|doc| doc.matches(&needle))
            .cloned()
            .collect()
    }

    /// Drop the cached index; the next access rescans the tree.
    pub async fn clear(&self) {
        *self.cache.write().await = None;
    }

    pub async fn stats(&self) -> CacheStats {
        let cache = self.cache.read().await;
        match cache.as_ref() {
            Some(snapshot) => CacheStats {
                cached: true,
                age: Some(snapshot.loaded_at.elapsed()),
                doc_count: snapshot.docs.len(),
            },
            None => CacheStats {
                cached: false,
                age: None,
                doc_count: 0,
            },
        }
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.depth() > 0
        && entry.file_type().is_dir()
        && (name.starts_with('.') || name == "node_modules")
}

/// Scan `root` for markdown files. Unreadable files are logged and skipped.
pub fn load_documentation(root: &Path) -> BTreeMap<String, DocFile> {
    let mut docs = BTreeMap::new();
    if !root.is_dir() {
        warn!("Documentation directory not found: {}", root.display());
        return docs;
    }

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Walk error: {}", e);
                continue;
            }
        };
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md")
        {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => {
                if let Some(doc) = parse_doc(root, path, &content) {
                    docs.insert(doc.uri.clone(), doc);
                }
            }
            Err(e) => warn!("Error loading doc file {}: {}", path.display(), e),
        }
    }

    info!("Loaded {} documentation files from {}", docs.len(), root.display());
    docs
}

fn parse_doc(root: &Path, path: &Path, content: &str) -> Option<DocFile> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = parts.join("/");
    let uri_path = joined.strip_suffix(".md").unwrap_or(&joined);
    let uri = format!("{}{}", DOCS_PREFIX, uri_path);

    let (frontmatter, body) = split_frontmatter(content);
    let frontmatter = frontmatter.map(parse_frontmatter).unwrap_or_default();

    let field = |key: &str| {
        frontmatter
            .iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.clone())
    };
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Untitled".to_string());
    let title = field("title").or_else(|| field("label")).unwrap_or(stem);

    debug!("Indexed {}", uri);
    Some(DocFile {
        uri,
        path: path.to_path_buf(),
        title,
        frontmatter,
        body: body.to_string(),
        category: (parts.len() > 1).then(|| parts[0].clone()),
    })
}

/// Split leading `---` delimited frontmatter from the body.
fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content.strip_prefix("---") else {
        return (None, content);
    };
    let Some(newline) = rest.find('\n') else {
        return (None, content);
    };
    if !rest[..newline].trim().is_empty() {
        return (None, content);
    }
    let yaml_start = &rest[newline + 1..];

    let mut offset = 0;
    for line in yaml_start.split_inclusive('\n') {
        if line.trim_end() == "---" && line.ends_with('\n') {
            let yaml = yaml_start[..offset].trim_end_matches(['\r', '\n']);
            let body = &yaml_start[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }
    (None, content)
}

fn parse_frontmatter(yaml: &str) -> Vec<(String, String)> {
    if yaml.trim().is_empty() {
        return Vec::new();
    }
    match serde_yaml::from_str::<YamlValue>(yaml) {
        Ok(YamlValue::Mapping(mapping)) => mapping
            .into_iter()
            .filter_map(|(key, value)| Some((scalar_text(&key)?, yaml_text(&value))))
            .collect(),
        Ok(_) => Vec::new(),
        Err(e) => {
            warn!("Invalid frontmatter: {}", e);
            Vec::new()
        }
    }
}

fn scalar_text(value: &YamlValue) -> Option<String> {
    match value {
        YamlValue::String(s) => Some(s.clone()),
        YamlValue::Bool(b) => Some(b.to_string()),
        YamlValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn yaml_text(value: &YamlValue) -> String {
    match value {
        YamlValue::Null => String::new(),
        YamlValue::Sequence(items) => items
            .iter()
            .map(yaml_text)
            .collect::<Vec<_>>()
            .join(","),
        YamlValue::Tagged(tagged) => yaml_text(&tagged.value),
        other => scalar_text(other).unwrap_or_else(|| {
            serde_yaml::to_string(other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default()
        }),
    }
}

/// Serves the [`DocsIndex`] under `loyalteez://docs/`.
pub struct DocsProvider {
    index: Arc<DocsIndex>,
}

impl DocsProvider {
    pub fn new(index: Arc<DocsIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl ResourceProvider for DocsProvider {
    fn prefix(&self) -> &str {
        DOCS_PREFIX
    }

    async fn list(&self) -> Vec<ResourceDefinition> {
        self.index
            .list()
            .await
            .into_iter()
            .map(|doc| ResourceDefinition {
                description: doc.description().map(String::from),
                uri: doc.uri,
                name: doc.title,
                mime_type: Some(MIME_MARKDOWN.to_string()),
            })
            .collect()
    }

    async fn read(&self, uri: &str) -> McpServerResult<ResourceContents> {
        let doc = self
            .index
            .get(uri)
            .await
            .ok_or_else(|| McpServerError::ResourceNotFound(uri.to_string()))?;
        Ok(ResourceContents::markdown(doc.uri.clone(), doc.render()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_frontmatter() {
        let (yaml, body) = split_frontmatter("---\ntitle: Hello\n---\n\nBody");
        assert_eq!(yaml, Some("title: Hello"));
        assert_eq!(body, "\nBody");

        let (yaml, body) = split_frontmatter("# No frontmatter");
        assert!(yaml.is_none());
        assert_eq!(body, "# No frontmatter");

        let (yaml, _) = split_frontmatter("---\ntitle: unterminated\n");
        assert!(yaml.is_none());
    }

    #[test]
    fn test_parse_frontmatter_values() {
        let fields = parse_frontmatter("title: \"Quoted\"\nsidebar_position: 3\ndraft: false\ntags: [a, b]");
        assert_eq!(
            fields,
            vec![
                ("title".to_string(), "Quoted".to_string()),
                ("sidebar_position".to_string(), "3".to_string()),
                ("draft".to_string(), "false".to_string()),
                ("tags".to_string(), "a,b".to_string()),
            ]
        );
        assert!(parse_frontmatter("not: [valid").is_empty());
    }

    #[test]
    fn test_title_fallbacks() {
        let root = Path::new("/docs");
        let doc = parse_doc(root, Path::new("/docs/guides/webhooks.md"), "---\nlabel: Hooks\n---\nx").unwrap();
        assert_eq!(doc.title, "Hooks");
        assert_eq!(doc.uri, "loyalteez://docs/guides/webhooks");
        assert_eq!(doc.category.as_deref(), Some("guides"));

        let doc = parse_doc(root, Path::new("/docs/architecture.md"), "plain").unwrap();
        assert_eq!(doc.title, "architecture");
        assert!(doc.category.is_none());
    }

    #[test]
    fn test_render_skips_title_keys() {
        let doc = parse_doc(
            Path::new("/docs"),
            Path::new("/docs/intro.md"),
            "---\ntitle: Intro\ndescription: Start here\n---\nWelcome",
        )
        .unwrap();
        assert_eq!(
            doc.render(),
            "# Intro\n\n---\ndescription: Start here\n---\n\nWelcome"
        );
        assert_eq!(doc.description(), Some("Start here"));
    }

    #[tokio::test]
    async fn test_index_without_root_is_empty() {
        let index = DocsIndex::new(None);
        assert!(index.list().await.is_empty());
        assert!(index.search("anything").await.is_empty());
        assert_eq!(index.stats().await.doc_count, 0);
    }
}
