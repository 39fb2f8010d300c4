//! Offline placeholder content.

use crate::net::{Request, Response};

use super::strategy::Fallback;

pub const OFFLINE_MARKDOWN: &str = "# You're offline

This post isn't available offline yet.

Reconnect to the internet and reload the page to read it. Posts you have
opened before stay available while you are offline.
";

pub const OFFLINE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Offline</title>
  <style>
    body { font-family: sans-serif; display: flex; min-height: 100vh; align-items: center; justify-content: center; margin: 0; }
    main { text-align: center; padding: 2rem; }
    button { padding: 0.6rem 1.4rem; border: 0; border-radius: 4px; cursor: pointer; }
  </style>
</head>
<body>
  <main>
    <h1>You're offline</h1>
    <p>This page isn't available without a connection.</p>
    <button type="button" onclick="window.location.reload()">Try again</button>
  </main>
</body>
</html>
"#;

/// No-op stand-in for the markdown renderer so pages keep working offline.
pub const MARKED_STUB: &str = "window.marked = { parse: function (text) { return text; }, setOptions: function () {} };\n";

/// No-op stand-in for the syntax highlighter.
pub const HIGHLIGHT_STUB: &str = "window.hljs = { highlightAll: function () {}, highlightElement: function () {} };\n";

/// Stub script for a recognized CDN library URL.
pub fn cdn_stub(url: &str) -> Option<&'static str> {
  let url = url.to_ascii_lowercase();
  if url.contains("marked") {
    Some(MARKED_STUB)
  } else if url.contains("highlight") {
    Some(HIGHLIGHT_STUB)
  } else {
    None
  }
}

pub fn offline_markdown() -> Response {
  Response::ok()
    .with_header("Content-Type", "text/markdown; charset=utf-8")
    .with_body(OFFLINE_MARKDOWN)
}

pub fn offline_page() -> Response {
  Response::ok()
    .with_header("Content-Type", "text/html; charset=utf-8")
    .with_body(OFFLINE_HTML)
}

pub fn not_found() -> Response {
  Response::not_found()
    .with_header("Content-Type", "text/plain; charset=utf-8")
    .with_body("Not available offline")
}

/// Build the placeholder response for a request that could not be served.
pub fn synthesize(fallback: Fallback, request: &Request) -> Response {
  match fallback {
    Fallback::NotFound => not_found(),
    Fallback::OfflineMarkdown => offline_markdown(),
    Fallback::OfflinePage => offline_page(),
    Fallback::CdnStub => match cdn_stub(request.url.as_str()) {
      Some(script) => Response::ok()
        .with_header("Content-Type", "application/javascript; charset=utf-8")
        .with_body(script),
      None => not_found(),
    },
  }
}
