//! Network plumbing: request/response types and the fetch capability.

mod client;
mod types;

#[cfg(test)]
pub mod testing;

pub use client::{HttpNetwork, Network};
pub use types::{Request, Response};
