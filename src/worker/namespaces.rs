use super::strategy::NamespaceKind;

/// Namespace names owned by one deployed version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespaces {
  /// `<app>-<version>`, reported to GET_VERSION
  pub cache_name: String,
  pub static_name: String,
  pub dynamic_name: String,
}

impl Namespaces {
  pub fn new(app_name: &str, version: &str) -> Self {
    Self {
      cache_name: format!("{}-{}", app_name, version),
      static_name: format!("{}-static-{}", app_name, version),
      dynamic_name: format!("{}-dynamic-{}", app_name, version),
    }
  }

  pub fn name(&self, kind: NamespaceKind) -> &str {
    match kind {
      NamespaceKind::Static => &self.static_name,
      NamespaceKind::Dynamic => &self.dynamic_name,
    }
  }

  /// Whether `name` belongs to this version.
  pub fn is_current(&self, name: &str) -> bool {
    name == self.static_name || name == self.dynamic_name
  }
}
