//! Background refresh of markdown documents.

use futures::future::join_all;
use tracing::{info, warn};
use url::Url;

use super::router::Router;
use crate::cache::{CacheStorage, RequestKey};
use crate::net::{Network, Request};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
  pub refreshed: Vec<String>,
  /// (url, reason)
  pub failed: Vec<(String, String)>,
}

/// Re-fetch every document and overwrite its dynamic-namespace entry.
///
/// Files are independent: one failure is recorded and the rest still run.
pub async fn refresh_documents<S, N>(router: &Router<S, N>, files: &[Url]) -> SyncReport
where
  S: CacheStorage,
  N: Network,
{
  let namespace = &router.namespaces().dynamic_name;

  let results = join_all(files.iter().map(|url| async move {
    let request = Request::get(url.clone());
    let outcome = match router.network().fetch(&request).await {
      Ok(response) if response.is_success() => {
        let key = RequestKey::for_request(&request);
        if router.cache().store(namespace, &key, &response) {
          Ok(())
        } else {
          Err("cache write failed".to_string())
        }
      }
      Ok(response) => Err(format!("status {}", response.status)),
      Err(e) => Err(e.to_string()),
    };
    (url.to_string(), outcome)
  }))
  .await;

  let mut report = SyncReport::default();
  for (url, outcome) in results {
    match outcome {
      Ok(()) => report.refreshed.push(url),
      Err(reason) => {
        warn!(url = %url, reason = %reason, "background sync failed for file");
        report.failed.push((url, reason));
      }
    }
  }

  info!(
    refreshed = report.refreshed.len(),
    failed = report.failed.len(),
    "background sync finished"
  );
  report
}
