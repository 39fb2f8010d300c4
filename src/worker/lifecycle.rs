//! Worker lifecycle: install, activate, and event dispatch.

use color_eyre::{eyre::eyre, Result};
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

use super::events::{EventOutcome, WorkerEvent};
use super::message::{ControlMessage, MessageReply};
use super::namespaces::Namespaces;
use super::push::{self, ClickOutcome, Notification};
use super::router::{FetchOutcome, Router};
use super::sync::{refresh_documents, SyncReport};
use crate::cache::{CacheLayer, CacheStorage, RequestKey};
use crate::config::{Config, NotificationConfig};
use crate::net::{Network, Request, Response};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
  Uninstalled,
  Installing,
  /// Installed and waiting for activation
  Installed,
  Activating,
  Active,
  /// Replaced by a newer version; receives no more events
  Redundant,
}

impl WorkerState {
  pub fn label(self) -> &'static str {
    match self {
      Self::Uninstalled => "uninstalled",
      Self::Installing => "installing",
      Self::Installed => "installed",
      Self::Activating => "activating",
      Self::Active => "active",
      Self::Redundant => "redundant",
    }
  }

  /// Only settled states are recorded in storage.
  fn from_recorded(label: &str) -> Option<Self> {
    match label {
      "installed" => Some(Self::Installed),
      "active" => Some(Self::Active),
      _ => None,
    }
  }
}

impl fmt::Display for WorkerState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
  pub static_entries: usize,
  pub dynamic_entries: usize,
  /// Set when skip-waiting activated the worker straight after install
  pub activated: Option<ActivateReport>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateReport {
  /// Namespaces of other versions that were removed
  pub deleted: Vec<String>,
}

/// The offline cache router together with its lifecycle state.
pub struct Worker<S: CacheStorage, N: Network> {
  router: Router<S, N>,
  static_assets: Vec<Url>,
  cdn_assets: Vec<Url>,
  sync_tag: String,
  sync_files: Vec<Url>,
  notifications: NotificationConfig,
  state: WorkerState,
  skip_waiting: bool,
  clients_claimed: bool,
}

impl<S: CacheStorage, N: Network> Worker<S, N> {
  /// Create an uninstalled worker for the configured version.
  pub fn new(config: &Config, storage: S, network: N) -> Result<Self> {
    let namespaces = Namespaces::new(&config.app_name, &config.version);

    let mut cache = CacheLayer::new(storage);
    if let Some(max) = config.cache.max_dynamic_entries {
      cache = cache.with_entry_limit(namespaces.dynamic_name.clone(), max);
    }

    let router = Router::new(
      cache,
      Arc::new(network),
      config.origin.clone(),
      namespaces,
    );

    Ok(Self {
      router,
      static_assets: config.resolve_all(&config.static_assets)?,
      cdn_assets: config.resolve_all(&config.cdn_assets)?,
      sync_tag: config.sync.tag.clone(),
      sync_files: config.resolve_all(&config.sync.files)?,
      notifications: config.notifications.clone(),
      state: WorkerState::Uninstalled,
      skip_waiting: false,
      clients_claimed: false,
    })
  }

  /// Create a worker against an existing store, restoring the lifecycle
  /// state recorded for this version. A recorded state only counts while
  /// both of the version's namespaces are still present.
  pub fn resume(config: &Config, storage: S, network: N) -> Result<Self> {
    let mut worker = Self::new(config, storage, network)?;

    let namespaces = worker.router.namespaces();
    let storage = worker.router.cache().storage();
    let Some(recorded) = storage
      .load_state(&namespaces.cache_name)?
      .as_deref()
      .and_then(WorkerState::from_recorded)
    else {
      return Ok(worker);
    };

    if !storage.has_namespace(&namespaces.static_name)? || !storage.has_namespace(&namespaces.dynamic_name)? {
      warn!(version = %namespaces.cache_name, state = %recorded, "namespaces missing, starting uninstalled");
      return Ok(worker);
    }

    debug!(version = %namespaces.cache_name, state = %recorded, "resuming worker");
    worker.state = recorded;
    worker.clients_claimed = recorded == WorkerState::Active;
    Ok(worker)
  }

  pub fn state(&self) -> WorkerState {
    self.state
  }

  pub fn router(&self) -> &Router<S, N> {
    &self.router
  }

  pub fn namespaces(&self) -> &Namespaces {
    self.router.namespaces()
  }

  /// Cache name reported to GET_VERSION.
  pub fn version(&self) -> &str {
    &self.router.namespaces().cache_name
  }

  pub fn sync_tag(&self) -> &str {
    &self.sync_tag
  }

  /// Whether the worker controls open pages.
  pub fn clients_claimed(&self) -> bool {
    self.clients_claimed
  }

  /// Precache both manifests. All-or-nothing: if any asset fails, nothing
  /// is written and the worker stays uninstalled.
  pub async fn install(&mut self) -> Result<InstallReport> {
    if self.state != WorkerState::Uninstalled {
      return Err(eyre!("Cannot install a worker that is {}", self.state));
    }

    info!(version = %self.version(), "installing");
    self.state = WorkerState::Installing;

    let (static_entries, dynamic_entries) = match self.populate().await {
      Ok(counts) => counts,
      Err(e) => {
        error!(version = %self.version(), error = %e, "install failed");
        self.state = WorkerState::Uninstalled;
        return Err(e.wrap_err("Install failed"));
      }
    };

    self.state = WorkerState::Installed;
    info!(static_entries, dynamic_entries, "installed");

    let activated = if self.skip_waiting {
      Some(self.activate()?)
    } else {
      None
    };

    Ok(InstallReport {
      static_entries,
      dynamic_entries,
      activated,
    })
  }

  async fn populate(&self) -> Result<(usize, usize)> {
    let network = self.router.network();
    let statics = try_join_all(self.static_assets.iter().map(|url| precache(network, url))).await?;
    let cdn = try_join_all(self.cdn_assets.iter().map(|url| precache(network, url))).await?;

    let storage = self.router.cache().storage();
    let namespaces = self.router.namespaces();

    // Only namespaces this install creates are rolled back
    let mut created = Vec::new();
    for name in [&namespaces.static_name, &namespaces.dynamic_name] {
      if !storage.has_namespace(name)? {
        created.push(name);
      }
    }

    let written = storage
      .put_all(&namespaces.static_name, &statics)
      .and_then(|_| storage.put_all(&namespaces.dynamic_name, &cdn))
      .and_then(|_| storage.save_state(&namespaces.cache_name, WorkerState::Installed.label()));

    if let Err(e) = written {
      for name in created {
        if let Err(cleanup) = storage.delete_namespace(name) {
          warn!(namespace = %name, error = %cleanup, "failed to roll back namespace");
        }
      }
      return Err(e);
    }

    Ok((statics.len(), cdn.len()))
  }

  /// Delete every namespace that does not belong to this version and take
  /// control of open pages. Safe to repeat.
  pub fn activate(&mut self) -> Result<ActivateReport> {
    if !matches!(self.state, WorkerState::Installed | WorkerState::Active) {
      return Err(eyre!("Cannot activate a worker that is {}", self.state));
    }

    let previous = self.state;
    self.state = WorkerState::Activating;
    let namespaces = self.router.namespaces().clone();
    let storage = self.router.cache().storage();

    let mut deleted = Vec::new();
    let existing = match storage.namespaces() {
      Ok(existing) => existing,
      Err(e) => {
        self.state = previous;
        return Err(e.wrap_err("Activate failed"));
      }
    };
    for name in existing.into_iter().filter(|n| !namespaces.is_current(n)) {
      info!(namespace = %name, "deleting stale namespace");
      match storage.delete_namespace(&name) {
        Ok(_) => deleted.push(name),
        Err(e) => warn!(namespace = %name, error = %e, "failed to delete stale namespace"),
      }
    }

    if let Err(e) = storage.save_state(&namespaces.cache_name, WorkerState::Active.label()) {
      self.state = previous;
      return Err(e.wrap_err("Activate failed"));
    }

    self.clients_claimed = true;
    self.state = WorkerState::Active;
    info!(version = %namespaces.cache_name, deleted = deleted.len(), "activated");

    Ok(ActivateReport { deleted })
  }

  /// A newer version took over. The CLI runs one version per store, so only
  /// tests drive this transition.
  #[cfg(test)]
  pub fn supersede(&mut self) {
    info!(version = %self.version(), "superseded");
    self.state = WorkerState::Redundant;
    self.clients_claimed = false;
  }

  pub fn skip_waiting(&mut self) {
    self.skip_waiting = true;
  }

  /// Route a request. Until the worker is active it controls no page and
  /// every request passes through.
  pub async fn handle_fetch(&self, request: &Request) -> FetchOutcome {
    if self.state != WorkerState::Active {
      debug!(state = %self.state, url = %request.url, "not controlling, pass through");
      return FetchOutcome::PassThrough;
    }
    self.router.handle(request).await
  }

  /// Refresh markdown documents when `tag` is the configured sync tag.
  pub async fn handle_sync(&self, tag: &str) -> Option<SyncReport> {
    if tag != self.sync_tag {
      debug!(tag, "ignoring unknown sync tag");
      return None;
    }
    Some(refresh_documents(&self.router, &self.sync_files).await)
  }

  pub fn handle_push(&self, payload: Option<&str>) -> Notification {
    let notification = push::build_notification(&self.notifications, payload);
    debug!(body = %notification.body, "showing notification");
    notification
  }

  pub fn handle_click(&self, action: Option<&str>) -> ClickOutcome {
    push::handle_click(&self.notifications, action)
  }

  pub fn handle_message(&mut self, message: ControlMessage) -> Result<MessageReply> {
    match message {
      ControlMessage::GetVersion => Ok(MessageReply::Version {
        version: self.version().to_string(),
      }),
      ControlMessage::SkipWaiting => {
        self.skip_waiting();
        if self.state == WorkerState::Installed {
          self.activate()?;
        }
        Ok(MessageReply::SkipWaiting { skip_waiting: true })
      }
    }
  }

  /// Handle one event. Only install and invalid lifecycle transitions
  /// return errors; everything else degrades to a response or a log line.
  pub async fn dispatch(&mut self, event: WorkerEvent) -> Result<EventOutcome> {
    if self.state == WorkerState::Redundant {
      debug!(event = event.name(), "redundant worker ignores event");
      return Ok(EventOutcome::Ignored);
    }

    let outcome = match event {
      WorkerEvent::Install => EventOutcome::Installed(self.install().await?),
      WorkerEvent::Activate => EventOutcome::Activated(self.activate()?),
      WorkerEvent::Fetch(request) => EventOutcome::Fetch(self.handle_fetch(&request).await),
      WorkerEvent::Sync(tag) => match self.handle_sync(&tag).await {
        Some(report) => EventOutcome::Synced(report),
        None => EventOutcome::Ignored,
      },
      WorkerEvent::Push(payload) => EventOutcome::Notify(self.handle_push(payload.as_deref())),
      WorkerEvent::NotificationClick(action) => {
        EventOutcome::Click(self.handle_click(action.as_deref()))
      }
      WorkerEvent::Message(message) => EventOutcome::Reply(self.handle_message(message)?),
      WorkerEvent::Error(message) => {
        error!(message = %message, "worker error");
        EventOutcome::Logged
      }
      WorkerEvent::UnhandledRejection(reason) => {
        error!(reason = %reason, "unhandled rejection");
        EventOutcome::Logged
      }
    };

    Ok(outcome)
  }
}

/// Fetch one manifest entry for install. Error statuses count as failures.
async fn precache<N: Network>(network: &N, url: &Url) -> Result<(RequestKey, Response)> {
  let request = Request::get(url.clone());
  let response = network.fetch(&request).await?;
  if !response.is_success() {
    return Err(eyre!(
      "Precache of {} failed with status {}",
      url,
      response.status
    ));
  }
  Ok((RequestKey::for_request(&request), response))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheEntry, CacheSource, MemoryStorage, SqliteStorage};
  use crate::config::test_config;
  use crate::net::testing::FakeNetwork;
  use tempfile::TempDir;

  const STATIC_URLS: &[&str] = &[
    "https://blog.example.com/",
    "https://blog.example.com/index.html",
    "https://blog.example.com/css/base.css",
    "https://blog.example.com/js/main.js",
  ];
  const MARKED: &str = "https://cdn.jsdelivr.net/npm/marked/marked.min.js";

  fn online() -> FakeNetwork {
    let network = STATIC_URLS
      .iter()
      .fold(FakeNetwork::new(), |n, url| n.respond_text(url, "text/plain", url));
    network.respond_text(MARKED, "application/javascript", "/* marked */")
  }

  fn worker(network: FakeNetwork) -> Worker<MemoryStorage, FakeNetwork> {
    Worker::new(&test_config(), MemoryStorage::new(), network).unwrap()
  }

  fn storage(worker: &Worker<MemoryStorage, FakeNetwork>) -> &MemoryStorage {
    worker.router().cache().storage()
  }

  #[tokio::test]
  async fn test_install_populates_both_namespaces() {
    let mut worker = worker(online());

    let report = worker.install().await.unwrap();

    assert_eq!(report.static_entries, 4);
    assert_eq!(report.dynamic_entries, 1);
    assert_eq!(report.activated, None);
    assert_eq!(worker.state(), WorkerState::Installed);
    assert_eq!(storage(&worker).entries("music-blog-static-v1.0.0").unwrap().len(), 4);
    assert_eq!(storage(&worker).entries("music-blog-dynamic-v1.0.0").unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_install_is_all_or_nothing() {
    let mut worker = worker(online().fail("https://blog.example.com/js/main.js", "offline"));

    assert!(worker.install().await.is_err());
    assert_eq!(worker.state(), WorkerState::Uninstalled);
    assert!(storage(&worker).namespaces().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_install_fails_on_error_status() {
    let mut worker = worker(online().respond(MARKED, Response::new(500, "Internal Server Error")));

    let err = worker.install().await.unwrap_err();
    assert!(format!("{:?}", err).contains("status 500"));
    assert!(storage(&worker).namespaces().unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_activate_deletes_only_stale_namespaces() {
    let mut worker = worker(online());
    storage(&worker).open_namespace("music-blog-static-v0.9.0").unwrap();
    storage(&worker).open_namespace("music-blog-dynamic-v0.9.0").unwrap();
    worker.install().await.unwrap();

    let report = worker.activate().unwrap();

    assert_eq!(
      report.deleted,
      vec!["music-blog-static-v0.9.0", "music-blog-dynamic-v0.9.0"]
    );
    assert_eq!(worker.state(), WorkerState::Active);
    assert!(worker.clients_claimed());
    assert_eq!(
      storage(&worker).namespaces().unwrap(),
      vec!["music-blog-static-v1.0.0", "music-blog-dynamic-v1.0.0"]
    );
  }

  #[tokio::test]
  async fn test_activate_twice_keeps_current_namespaces() {
    let mut worker = worker(online());
    worker.install().await.unwrap();
    worker.activate().unwrap();

    let second = worker.activate().unwrap();

    assert!(second.deleted.is_empty());
    assert_eq!(storage(&worker).entries("music-blog-static-v1.0.0").unwrap().len(), 4);
    assert_eq!(storage(&worker).entries("music-blog-dynamic-v1.0.0").unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_activate_before_install_is_error() {
    let mut worker = worker(online());
    assert!(worker.activate().is_err());
    assert_eq!(worker.state(), WorkerState::Uninstalled);
  }

  #[tokio::test]
  async fn test_skip_waiting_activates_after_install() {
    let mut worker = worker(online());
    storage(&worker).open_namespace("music-blog-static-v0.9.0").unwrap();
    worker.skip_waiting();

    let report = worker.install().await.unwrap();

    assert_eq!(worker.state(), WorkerState::Active);
    assert_eq!(report.activated.unwrap().deleted, vec!["music-blog-static-v0.9.0"]);
  }

  #[tokio::test]
  async fn test_skip_waiting_message_activates_waiting_worker() {
    let mut worker = worker(online());
    worker.install().await.unwrap();

    let outcome = worker
      .dispatch(WorkerEvent::Message(ControlMessage::SkipWaiting))
      .await
      .unwrap();

    assert!(matches!(
      outcome,
      EventOutcome::Reply(MessageReply::SkipWaiting { skip_waiting: true })
    ));
    assert_eq!(worker.state(), WorkerState::Active);
  }

  #[tokio::test]
  async fn test_get_version_message() {
    let mut worker = worker(online());
    let outcome = worker
      .dispatch(WorkerEvent::Message(ControlMessage::GetVersion))
      .await
      .unwrap();

    match outcome {
      EventOutcome::Reply(MessageReply::Version { version }) => {
        assert_eq!(version, "music-blog-v1.0.0")
      }
      other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(worker.state(), WorkerState::Uninstalled);
  }

  #[tokio::test]
  async fn test_fetch_passes_through_until_active() {
    let mut worker = worker(online());
    let request = Request::get(Url::parse("https://blog.example.com/css/base.css").unwrap());

    assert!(matches!(worker.handle_fetch(&request).await, FetchOutcome::PassThrough));

    worker.install().await.unwrap();
    assert!(matches!(worker.handle_fetch(&request).await, FetchOutcome::PassThrough));

    worker.activate().unwrap();
    match worker.handle_fetch(&request).await {
      FetchOutcome::Respond(result) => assert_eq!(result.source, CacheSource::Cache),
      FetchOutcome::PassThrough => panic!("active worker must intercept"),
    }
  }

  #[tokio::test]
  async fn test_resume_needs_recorded_state_and_namespaces() {
    let bare = MemoryStorage::new();
    bare.open_namespace("music-blog-static-v1.0.0").unwrap();
    bare.open_namespace("music-blog-dynamic-v1.0.0").unwrap();
    let resumed = Worker::resume(&test_config(), bare, FakeNetwork::new()).unwrap();
    assert_eq!(resumed.state(), WorkerState::Uninstalled);

    let orphaned = MemoryStorage::new();
    orphaned.save_state("music-blog-v1.0.0", "active").unwrap();
    let resumed = Worker::resume(&test_config(), orphaned, FakeNetwork::new()).unwrap();
    assert_eq!(resumed.state(), WorkerState::Uninstalled);

    let empty = Worker::resume(&test_config(), MemoryStorage::new(), FakeNetwork::new()).unwrap();
    assert_eq!(empty.state(), WorkerState::Uninstalled);
  }

  #[tokio::test]
  async fn test_resume_restores_waiting_then_active_state() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.db");
    let open = || SqliteStorage::open(Some(&path)).unwrap();
    let css = Request::get(Url::parse("https://blog.example.com/css/base.css").unwrap());

    {
      let mut worker = Worker::new(&test_config(), open(), online()).unwrap();
      worker.install().await.unwrap();
    }

    let mut worker = Worker::resume(&test_config(), open(), FakeNetwork::new()).unwrap();
    assert_eq!(worker.state(), WorkerState::Installed);
    assert!(!worker.clients_claimed());
    assert!(matches!(worker.handle_fetch(&css).await, FetchOutcome::PassThrough));

    worker.activate().unwrap();
    drop(worker);

    let worker = Worker::resume(&test_config(), open(), FakeNetwork::new()).unwrap();
    assert_eq!(worker.state(), WorkerState::Active);
    assert!(worker.clients_claimed());
    match worker.handle_fetch(&css).await {
      FetchOutcome::Respond(result) => assert_eq!(result.source, CacheSource::Cache),
      FetchOutcome::PassThrough => panic!("resumed active worker must intercept"),
    }
  }

  #[tokio::test]
  async fn test_dynamic_entry_cap_from_config() {
    let mut config = test_config();
    config.cache.max_dynamic_entries = Some(1);
    let network = online()
      .respond_text("https://blog.example.com/api/a", "application/json", "{}")
      .respond_text("https://blog.example.com/api/b", "application/json", "{}");
    let mut worker = Worker::new(&config, MemoryStorage::new(), network).unwrap();
    worker.skip_waiting();
    worker.install().await.unwrap();

    for path in ["https://blog.example.com/api/a", "https://blog.example.com/api/b"] {
      let request = Request::get(Url::parse(path).unwrap());
      assert!(matches!(worker.handle_fetch(&request).await, FetchOutcome::Respond(_)));
    }

    assert_eq!(
      storage(&worker).entries("music-blog-dynamic-v1.0.0").unwrap(),
      vec![RequestKey::new("GET", "https://blog.example.com/api/b")]
    );
    assert_eq!(storage(&worker).entries("music-blog-static-v1.0.0").unwrap().len(), 4);
  }

  /// Memory storage whose batch writes to dynamic namespaces fail.
  struct FailingDynamicWrites(MemoryStorage);

  impl CacheStorage for FailingDynamicWrites {
    fn open_namespace(&self, namespace: &str) -> Result<()> {
      self.0.open_namespace(namespace)
    }
    fn has_namespace(&self, namespace: &str) -> Result<bool> {
      self.0.has_namespace(namespace)
    }
    fn namespaces(&self) -> Result<Vec<String>> {
      self.0.namespaces()
    }
    fn delete_namespace(&self, namespace: &str) -> Result<bool> {
      self.0.delete_namespace(namespace)
    }
    fn get(&self, namespace: &str, key: &RequestKey) -> Result<Option<CacheEntry>> {
      self.0.get(namespace, key)
    }
    fn put(&self, namespace: &str, key: &RequestKey, response: &Response) -> Result<()> {
      self.0.put(namespace, key, response)
    }
    fn put_all(&self, namespace: &str, entries: &[(RequestKey, Response)]) -> Result<()> {
      if namespace.contains("-dynamic-") {
        return Err(eyre!("disk full"));
      }
      self.0.put_all(namespace, entries)
    }
    fn entries(&self, namespace: &str) -> Result<Vec<RequestKey>> {
      self.0.entries(namespace)
    }
    fn trim(&self, namespace: &str, max_entries: usize) -> Result<usize> {
      self.0.trim(namespace, max_entries)
    }
    fn load_state(&self, version: &str) -> Result<Option<String>> {
      self.0.load_state(version)
    }
    fn save_state(&self, version: &str, state: &str) -> Result<()> {
      self.0.save_state(version, state)
    }
  }

  #[tokio::test]
  async fn test_failed_install_keeps_namespaces_it_did_not_create() {
    let storage = FailingDynamicWrites(MemoryStorage::new());
    let synced = RequestKey::new("GET", "https://blog.example.com/posts/welcome.md");
    storage
      .put("music-blog-dynamic-v1.0.0", &synced, &Response::ok().with_body("# Welcome"))
      .unwrap();
    let mut worker = Worker::new(&test_config(), storage, online()).unwrap();

    assert!(worker.install().await.is_err());

    let storage = worker.router().cache().storage();
    assert_eq!(storage.namespaces().unwrap(), vec!["music-blog-dynamic-v1.0.0"]);
    assert!(storage.get("music-blog-dynamic-v1.0.0", &synced).unwrap().is_some());
    assert_eq!(storage.load_state("music-blog-v1.0.0").unwrap(), None);
    assert_eq!(worker.state(), WorkerState::Uninstalled);
  }

  #[tokio::test]
  async fn test_sync_event_refreshes_configured_files() {
    let network = online()
      .respond_text("https://blog.example.com/posts/welcome.md", "text/markdown", "# Welcome")
      .fail("https://blog.example.com/posts/second.md", "timeout")
      .respond_text("https://blog.example.com/posts/third.md", "text/markdown", "# Third");
    let mut worker = worker(network);

    let outcome = worker
      .dispatch(WorkerEvent::Sync("background-sync".to_string()))
      .await
      .unwrap();

    let EventOutcome::Synced(report) = outcome else {
      panic!("expected sync report");
    };
    assert_eq!(report.refreshed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(
      storage(&worker).entries("music-blog-dynamic-v1.0.0").unwrap().len(),
      2
    );
  }

  #[tokio::test]
  async fn test_unknown_sync_tag_is_ignored() {
    let mut worker = worker(online());
    let outcome = worker
      .dispatch(WorkerEvent::Sync("other".to_string()))
      .await
      .unwrap();
    assert!(matches!(outcome, EventOutcome::Ignored));
  }

  #[tokio::test]
  async fn test_push_and_click_events() {
    let mut worker = worker(online());

    let EventOutcome::Notify(notification) = worker.dispatch(WorkerEvent::Push(None)).await.unwrap()
    else {
      panic!("expected notification");
    };
    assert_eq!(notification.body, "New content available!");

    let outcome = worker
      .dispatch(WorkerEvent::NotificationClick(Some("explore".to_string())))
      .await
      .unwrap();
    assert!(matches!(outcome, EventOutcome::Click(ClickOutcome::OpenWindow(route)) if route == "/blog"));
  }

  #[tokio::test]
  async fn test_error_events_are_logged() {
    let mut worker = worker(online());
    let outcome = worker
      .dispatch(WorkerEvent::UnhandledRejection("boom".to_string()))
      .await
      .unwrap();
    assert!(matches!(outcome, EventOutcome::Logged));
    assert_eq!(worker.state(), WorkerState::Uninstalled);
  }

  #[tokio::test]
  async fn test_redundant_worker_ignores_events() {
    let mut worker = worker(online());
    worker.install().await.unwrap();
    worker.activate().unwrap();
    worker.supersede();

    let request = Request::get(Url::parse("https://blog.example.com/css/base.css").unwrap());
    let outcome = worker.dispatch(WorkerEvent::Fetch(request)).await.unwrap();

    assert!(matches!(outcome, EventOutcome::Ignored));
    assert_eq!(worker.state(), WorkerState::Redundant);
    assert!(worker.dispatch(WorkerEvent::Install).await.is_ok());
    assert_eq!(worker.state(), WorkerState::Redundant);
  }
}
