use crate::net::Request;

use super::lifecycle::{ActivateReport, InstallReport};
use super::message::{ControlMessage, MessageReply};
use super::push::{ClickOutcome, Notification};
use super::router::FetchOutcome;
use super::sync::SyncReport;

/// Events delivered to the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
  Install,
  Activate,
  Fetch(Request),
  Sync(String),
  Push(Option<String>),
  NotificationClick(Option<String>),
  Message(ControlMessage),
  Error(String),
  UnhandledRejection(String),
}

impl WorkerEvent {
  pub fn name(&self) -> &'static str {
    match self {
      Self::Install => "install",
      Self::Activate => "activate",
      Self::Fetch(_) => "fetch",
      Self::Sync(_) => "sync",
      Self::Push(_) => "push",
      Self::NotificationClick(_) => "notificationclick",
      Self::Message(_) => "message",
      Self::Error(_) => "error",
      Self::UnhandledRejection(_) => "unhandledrejection",
    }
  }
}

/// What handling an event produced.
#[derive(Debug, Clone)]
pub enum EventOutcome {
  Installed(InstallReport),
  Activated(ActivateReport),
  Fetch(FetchOutcome),
  Synced(SyncReport),
  Notify(Notification),
  Click(ClickOutcome),
  Reply(MessageReply),
  /// Error event recorded in the log
  Logged,
  /// Event not meant for this worker (unknown sync tag, redundant worker)
  Ignored,
}
