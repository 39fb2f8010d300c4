//! Fetch interception: classify, dispatch through the routing table, and
//! substitute a fallback when nothing else answers.

use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

use super::classify::{classify, RequestCategory};
use super::fallback;
use super::namespaces::Namespaces;
use super::strategy::{route_for, Strategy};
use crate::cache::{CacheLayer, CacheResult, CacheStorage, RequestKey};
use crate::net::{Network, Request, Response};

/// What the router decided for one request.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
  /// Not intercepted; the request goes to the network untouched
  PassThrough,
  Respond(CacheResult<Response>),
}

pub struct Router<S: CacheStorage, N: Network> {
  cache: CacheLayer<S>,
  network: Arc<N>,
  origin: Url,
  namespaces: Namespaces,
}

impl<S: CacheStorage, N: Network> Router<S, N> {
  pub fn new(cache: CacheLayer<S>, network: Arc<N>, origin: Url, namespaces: Namespaces) -> Self {
    Self {
      cache,
      network,
      origin,
      namespaces,
    }
  }

  pub fn cache(&self) -> &CacheLayer<S> {
    &self.cache
  }

  pub fn network(&self) -> &N {
    &self.network
  }

  pub fn namespaces(&self) -> &Namespaces {
    &self.namespaces
  }

  pub fn classify(&self, request: &Request) -> Option<RequestCategory> {
    classify(request, &self.origin)
  }

  /// Handle one intercepted request. Never fails: every path ends in a
  /// response from network, cache, or a synthesized placeholder.
  pub async fn handle(&self, request: &Request) -> FetchOutcome {
    let Some(category) = self.classify(request) else {
      debug!(method = %request.method, url = %request.url, "pass through");
      return FetchOutcome::PassThrough;
    };

    let route = route_for(category);
    let namespace = self.namespaces.name(route.namespace);
    let key = RequestKey::for_request(request);
    let fetch = || self.network.fetch(request);

    let result = match route.strategy {
      Strategy::CacheFirst => self.cache.cache_first(namespace, &key, fetch).await,
      Strategy::NetworkFirst => self.cache.network_first(namespace, &key, fetch).await,
    };

    match result {
      Ok(result) => {
        debug!(
          url = %request.url,
          ?category,
          source = %result.source,
          status = result.data.status,
          "served"
        );
        FetchOutcome::Respond(result)
      }
      Err(e) => {
        warn!(url = %request.url, ?category, error = %e, "serving offline fallback");
        let response = fallback::synthesize(route.fallback, request);
        FetchOutcome::Respond(CacheResult::synthesized(response))
      }
    }
  }
}
