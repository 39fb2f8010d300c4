use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  /// Prefix for every namespace name (e.g., "music-blog")
  #[serde(default = "default_app_name")]
  pub app_name: String,
  /// Deployed version; bumping it retires every namespace of the previous one
  pub version: String,
  /// Origin of the site the router serves
  pub origin: Url,
  /// App shell assets precached into the static namespace
  #[serde(default)]
  pub static_assets: Vec<String>,
  /// Third-party assets precached into the dynamic namespace
  #[serde(default)]
  pub cdn_assets: Vec<String>,
  #[serde(default)]
  pub sync: SyncConfig,
  #[serde(default)]
  pub notifications: NotificationConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub network: NetworkConfig,
  #[serde(default)]
  pub log: LogConfig,
}

fn default_app_name() -> String {
  "swcache".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
  /// Sync tag that triggers a content refresh
  #[serde(default = "default_sync_tag")]
  pub tag: String,
  /// Markdown documents refreshed on sync
  #[serde(default)]
  pub files: Vec<String>,
}

fn default_sync_tag() -> String {
  "background-sync".to_string()
}

impl Default for SyncConfig {
  fn default() -> Self {
    Self {
      tag: default_sync_tag(),
      files: Vec::new(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
  pub title: String,
  /// Body used when a push arrives without a payload
  pub default_body: String,
  pub icon: String,
  pub badge: String,
  /// Route opened by the "explore" action
  pub blog_route: String,
}

impl Default for NotificationConfig {
  fn default() -> Self {
    Self {
      title: "New post".to_string(),
      default_body: "New content available!".to_string(),
      icon: "/images/icon-192.png".to_string(),
      badge: "/images/badge-72.png".to_string(),
      blog_route: "/blog".to_string(),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Persist caches to SQLite; when false everything lives in memory
  pub persist: bool,
  /// Database path (default: $XDG_DATA_HOME/swcache/cache.db)
  pub path: Option<PathBuf>,
  /// Entry cap for the dynamic namespace; unset means unbounded
  pub max_dynamic_entries: Option<usize>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      persist: true,
      path: None,
      max_dynamic_entries: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
  pub timeout_secs: u64,
}

impl Default for NetworkConfig {
  fn default() -> Self {
    Self { timeout_secs: 10 }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Filter directive, overridden by RUST_LOG
  pub level: String,
  /// Optional log file, written in addition to stderr
  pub file: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      file: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./swcache.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/swcache/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(eyre!(
        "No configuration file found. Create one at ~/.config/swcache/config.yaml\n\
                 See swcache.example.yaml for the format."
      )),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("swcache.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("swcache").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  pub fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents)?;
    config.validate()?;
    Ok(config)
  }

  fn validate(&self) -> Result<()> {
    if self.version.trim().is_empty() {
      return Err(eyre!("version must not be empty"));
    }
    if !matches!(self.origin.scheme(), "http" | "https") {
      return Err(eyre!("origin must be an http(s) URL, got {}", self.origin));
    }
    if self.cache.max_dynamic_entries == Some(0) {
      return Err(eyre!("cache.max_dynamic_entries must be at least 1"));
    }
    Ok(())
  }

  /// Resolve a manifest entry against the site origin.
  pub fn resolve(&self, path: &str) -> Result<Url> {
    self
      .origin
      .join(path)
      .map_err(|e| eyre!("Invalid manifest entry '{}': {}", path, e))
  }

  pub fn resolve_all(&self, paths: &[String]) -> Result<Vec<Url>> {
    paths.iter().map(|p| self.resolve(p)).collect()
  }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
  Config::from_yaml(
    r#"
app_name: music-blog
version: v1.0.0
origin: https://blog.example.com
static_assets:
  - /
  - /index.html
  - /css/base.css
  - /js/main.js
cdn_assets:
  - https://cdn.jsdelivr.net/npm/marked/marked.min.js
sync:
  files:
    - /posts/welcome.md
    - /posts/second.md
    - /posts/third.md
"#,
  )
  .expect("test config parses")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = Config::from_yaml("version: v2\norigin: https://site.test\n").unwrap();

    assert_eq!(config.app_name, "swcache");
    assert_eq!(config.sync.tag, "background-sync");
    assert_eq!(config.notifications.default_body, "New content available!");
    assert_eq!(config.notifications.blog_route, "/blog");
    assert!(config.cache.persist);
    assert_eq!(config.cache.max_dynamic_entries, None);
    assert_eq!(config.network.timeout_secs, 10);
    assert!(config.static_assets.is_empty());
  }

  #[test]
  fn test_rejects_non_http_origin() {
    assert!(Config::from_yaml("version: v1\norigin: file:///tmp/site\n").is_err());
  }

  #[test]
  fn test_rejects_empty_version() {
    assert!(Config::from_yaml("version: ''\norigin: https://site.test\n").is_err());
  }

  #[test]
  fn test_rejects_zero_entry_cap() {
    let yaml = "version: v1\norigin: https://site.test\ncache:\n  max_dynamic_entries: 0\n";
    assert!(Config::from_yaml(yaml).is_err());
  }

  #[test]
  fn test_resolve_manifest_entries() {
    let config = test_config();
    let urls = config.resolve_all(&config.cdn_assets).unwrap();
    assert_eq!(urls[0].host_str(), Some("cdn.jsdelivr.net"));
    assert_eq!(
      config.resolve("/css/base.css").unwrap().as_str(),
      "https://blog.example.com/css/base.css"
    );
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/nonexistent/swcache.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }
}
