//! Request classification.

use url::Url;

use crate::net::Request;

/// Path extensions served as static assets.
pub const STATIC_EXTENSIONS: &[&str] = &[
  "css", "js", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf", "eot",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestCategory {
  StaticAsset,
  MarkdownDocument,
  ExternalResource,
  DynamicRequest,
}

impl RequestCategory {
  #[cfg(test)]
  pub const ALL: [RequestCategory; 4] = [
    Self::StaticAsset,
    Self::MarkdownDocument,
    Self::ExternalResource,
    Self::DynamicRequest,
  ];
}

/// Classify a request, or return `None` when the router must not intercept it.
///
/// Only http(s) GET requests are intercepted. Cross-origin requests are
/// external regardless of extension, so CDN scripts precached into the
/// dynamic namespace are found there.
pub fn classify(request: &Request, origin: &Url) -> Option<RequestCategory> {
  if !request.is_get() || !matches!(request.url.scheme(), "http" | "https") {
    return None;
  }

  if request.url.origin() != origin.origin() {
    return Some(RequestCategory::ExternalResource);
  }

  let category = match extension(&request.url).as_deref() {
    Some("md") => RequestCategory::MarkdownDocument,
    Some(ext) if STATIC_EXTENSIONS.contains(&ext) => RequestCategory::StaticAsset,
    _ => RequestCategory::DynamicRequest,
  };
  Some(category)
}

/// Lowercased extension of the last path segment, ignoring the query.
fn extension(url: &Url) -> Option<String> {
  let segment = url.path_segments()?.next_back()?;
  let (stem, ext) = segment.rsplit_once('.')?;
  if stem.is_empty() || ext.is_empty() {
    return None;
  }
  Some(ext.to_ascii_lowercase())
}
