//! Offline cache router.
//!
//! Every intercepted GET request is classified, then answered through the
//! routing table:
//! - Static assets: cache-first from the static namespace
//! - Markdown documents and external resources: cache-first from the dynamic namespace
//! - Everything else: network-first, falling back to any cached copy
//!
//! When neither cache nor network can answer, a placeholder is synthesized
//! so the page always gets a response.

mod classify;
mod events;
mod fallback;
mod lifecycle;
mod message;
mod namespaces;
mod push;
mod router;
mod strategy;
mod sync;

pub use events::{EventOutcome, WorkerEvent};
pub use lifecycle::{Worker, WorkerState};
pub use message::ControlMessage;
pub use push::ClickOutcome;
pub use router::FetchOutcome;
