//! Routing from request category to cache strategy.

use super::classify::RequestCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
  /// Serve from the namespace, fall back to network on a miss
  CacheFirst,
  /// Serve from network, fall back to any cached copy on failure
  NetworkFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
  Static,
  Dynamic,
}

/// Content synthesized when neither cache nor network can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
  NotFound,
  OfflineMarkdown,
  /// Stub script for known CDN libraries, 404 otherwise
  CdnStub,
  OfflinePage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
  pub strategy: Strategy,
  /// Namespace that successful responses are written to
  pub namespace: NamespaceKind,
  pub fallback: Fallback,
}

pub fn route_for(category: RequestCategory) -> Route {
  match category {
    RequestCategory::StaticAsset => Route {
      strategy: Strategy::CacheFirst,
      namespace: NamespaceKind::Static,
      fallback: Fallback::NotFound,
    },
    RequestCategory::MarkdownDocument => Route {
      strategy: Strategy::CacheFirst,
      namespace: NamespaceKind::Dynamic,
      fallback: Fallback::OfflineMarkdown,
    },
    RequestCategory::ExternalResource => Route {
      strategy: Strategy::CacheFirst,
      namespace: NamespaceKind::Dynamic,
      fallback: Fallback::CdnStub,
    },
    RequestCategory::DynamicRequest => Route {
      strategy: Strategy::NetworkFirst,
      namespace: NamespaceKind::Dynamic,
      fallback: Fallback::OfflinePage,
    },
  }
}
