//! Scripted network used by unit tests.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use super::client::Network;
use super::types::{Request, Response};

enum Reply {
  Respond(Response),
  Fail(String),
}

/// Network fake. Unscripted URLs fail as if offline.
#[derive(Default)]
pub struct FakeNetwork {
  replies: Mutex<HashMap<String, Reply>>,
  delays: Mutex<HashMap<String, Duration>>,
  calls: Mutex<Vec<String>>,
}

impl FakeNetwork {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn respond(self, url: &str, response: Response) -> Self {
    self
      .replies
      .lock()
      .unwrap()
      .insert(url.to_string(), Reply::Respond(response));
    self
  }

  pub fn respond_text(self, url: &str, content_type: &str, body: &str) -> Self {
    self.respond(
      url,
      Response::ok()
        .with_header("content-type", content_type)
        .with_body(body),
    )
  }

  pub fn fail(self, url: &str, reason: &str) -> Self {
    self
      .replies
      .lock()
      .unwrap()
      .insert(url.to_string(), Reply::Fail(reason.to_string()));
    self
  }

  /// Hold the reply for `url` back by `delay`.
  pub fn delay(self, url: &str, delay: Duration) -> Self {
    self.delays.lock().unwrap().insert(url.to_string(), delay);
    self
  }

  /// URLs fetched so far, in order.
  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self, url: &str) -> usize {
    self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
  }
}

#[async_trait]
impl Network for FakeNetwork {
  async fn fetch(&self, request: &Request) -> Result<Response> {
    let url = request.url.to_string();
    self.calls.lock().unwrap().push(url.clone());

    let delay = self.delays.lock().unwrap().get(&url).copied();
    if let Some(delay) = delay {
      tokio::time::sleep(delay).await;
    }

    match self.replies.lock().unwrap().get(&url) {
      Some(Reply::Respond(response)) => Ok(response.clone()),
      Some(Reply::Fail(reason)) => Err(eyre!("{}", reason)),
      None => Err(eyre!("network unreachable: {}", url)),
    }
  }
}
