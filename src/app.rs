use clap::Subcommand;
use color_eyre::Result;
use futures::future::join_all;
use std::fmt::Write;
use tracing::warn;
use url::Url;

use crate::cache::{CacheResult, CacheStorage};
use crate::config::Config;
use crate::net::{Network, Request, Response};
use crate::worker::{
  ClickOutcome, ControlMessage, EventOutcome, FetchOutcome, Worker, WorkerEvent, WorkerState,
};

/// One worker event per invocation
#[derive(Subcommand, Debug)]
pub enum Command {
  /// Precache both manifests, then activate unless --wait is given
  Install {
    /// Stay installed and waiting instead of activating
    #[arg(long)]
    wait: bool,
  },
  /// Activate the installed version and delete stale namespaces
  Activate,
  /// Route one or more requests through the cache
  Fetch {
    /// URLs or paths relative to the configured origin
    #[arg(required = true)]
    urls: Vec<String>,
    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,
    /// Print response bodies
    #[arg(long)]
    show_body: bool,
  },
  /// Refresh markdown documents (defaults to the configured sync tag)
  Sync {
    #[arg(long)]
    tag: Option<String>,
  },
  /// Show the notification for a push message
  Push { payload: Option<String> },
  /// Click a notification action (explore, close)
  Click { action: Option<String> },
  /// Send a control message: SKIP_WAITING, GET_VERSION, or JSON
  Message { message: String },
  /// Show worker state and namespaces
  Status,
}

/// Main application state
pub struct App<S: CacheStorage, N: Network> {
  worker: Worker<S, N>,
  origin: Url,
}

impl<S: CacheStorage, N: Network> App<S, N> {
  pub fn new(config: &Config, storage: S, network: N) -> Result<Self> {
    Ok(Self {
      worker: Worker::resume(config, storage, network)?,
      origin: config.origin.clone(),
    })
  }

  pub async fn run(&mut self, command: Command) -> Result<()> {
    let output = self.execute(command).await?;
    print!("{}", output);
    Ok(())
  }

  /// Execute a command and return what should be printed.
  pub async fn execute(&mut self, command: Command) -> Result<String> {
    let mut out = String::new();

    match command {
      Command::Install { wait } => {
        match self.worker.state() {
          WorkerState::Active => {
            writeln!(out, "{} already active", self.worker.version())?;
            return Ok(out);
          }
          WorkerState::Installed if wait => {
            writeln!(out, "{} installed, waiting to activate", self.worker.version())?;
            return Ok(out);
          }
          WorkerState::Installed => {
            if let EventOutcome::Activated(report) = self.worker.dispatch(WorkerEvent::Activate).await? {
              write_activation(&mut out, &report.deleted)?;
            }
            return Ok(out);
          }
          _ => {}
        }
        if !wait {
          self.worker.skip_waiting();
        }
        if let EventOutcome::Installed(report) = self.worker.dispatch(WorkerEvent::Install).await? {
          writeln!(
            out,
            "installed {}: {} static, {} dynamic entries",
            self.worker.version(),
            report.static_entries,
            report.dynamic_entries
          )?;
          if let Some(activated) = report.activated {
            write_activation(&mut out, &activated.deleted)?;
          }
        }
      }
      Command::Activate => {
        if let EventOutcome::Activated(report) = self.worker.dispatch(WorkerEvent::Activate).await? {
          write_activation(&mut out, &report.deleted)?;
        }
      }
      Command::Fetch {
        urls,
        method,
        show_body,
      } => {
        self.ensure_active().await;
        let requests = urls
          .iter()
          .map(|u| Request::parse(&method, u, &self.origin))
          .collect::<Result<Vec<_>>>()?;

        let worker = &self.worker;
        let outcomes = join_all(requests.iter().map(|r| worker.handle_fetch(r))).await;

        for (request, outcome) in requests.iter().zip(outcomes) {
          match outcome {
            FetchOutcome::Respond(result) => write_response(&mut out, request, &result, show_body)?,
            FetchOutcome::PassThrough => match worker.router().network().fetch(request).await {
              Ok(response) => {
                let result = CacheResult::from_network(response);
                write_response(&mut out, request, &result, show_body)?;
              }
              Err(e) => writeln!(out, "ERR {} {}: {}", request.method, request.url, e)?,
            },
          }
        }
      }
      Command::Sync { tag } => {
        let tag = tag.unwrap_or_else(|| self.worker.sync_tag().to_string());
        match self.worker.dispatch(WorkerEvent::Sync(tag.clone())).await? {
          EventOutcome::Synced(report) => {
            for url in &report.refreshed {
              writeln!(out, "refreshed {}", url)?;
            }
            for (url, reason) in &report.failed {
              writeln!(out, "failed    {} ({})", url, reason)?;
            }
          }
          _ => writeln!(out, "ignored sync tag '{}'", tag)?,
        }
      }
      Command::Push { payload } => {
        if let EventOutcome::Notify(notification) = self.worker.dispatch(WorkerEvent::Push(payload)).await? {
          writeln!(out, "{}", serde_json::to_string_pretty(&notification)?)?;
        }
      }
      Command::Click { action } => {
        if let EventOutcome::Click(outcome) = self
          .worker
          .dispatch(WorkerEvent::NotificationClick(action))
          .await?
        {
          match outcome {
            ClickOutcome::OpenWindow(route) => {
              writeln!(out, "open {}", self.origin.join(&route)?)?;
            }
            ClickOutcome::Dismiss => writeln!(out, "dismissed")?,
          }
        }
      }
      Command::Message { message } => {
        let message = ControlMessage::parse(&message)?;
        if let EventOutcome::Reply(reply) = self.worker.dispatch(WorkerEvent::Message(message)).await? {
          writeln!(out, "{}", serde_json::to_string(&reply)?)?;
        }
      }
      Command::Status => self.write_status(&mut out)?,
    }

    Ok(out)
  }

  /// First visit: install and activate so the request can be intercepted.
  /// An install failure leaves the worker uninstalled and requests pass through.
  async fn ensure_active(&mut self) {
    if self.worker.state() != WorkerState::Uninstalled {
      return;
    }
    self.worker.skip_waiting();
    if let Err(e) = self.worker.install().await {
      warn!(error = %e, "install failed, requests will go to the network");
    }
  }

  fn write_status(&self, out: &mut String) -> Result<()> {
    let namespaces = self.worker.namespaces();
    let storage = self.worker.router().cache().storage();

    writeln!(out, "version: {}", self.worker.version())?;
    writeln!(out, "state:   {}", self.worker.state())?;
    writeln!(out, "clients: {}", if self.worker.clients_claimed() { "claimed" } else { "none" })?;
    writeln!(out, "namespaces:")?;
    for name in storage.namespaces()? {
      let marker = if namespaces.is_current(&name) { "*" } else { " " };
      writeln!(out, " {} {} ({} entries)", marker, name, storage.entries(&name)?.len())?;
    }
    Ok(())
  }
}

fn write_activation(out: &mut String, deleted: &[String]) -> Result<()> {
  writeln!(out, "activated")?;
  for name in deleted {
    writeln!(out, "deleted {}", name)?;
  }
  Ok(())
}

fn write_response(
  out: &mut String,
  request: &Request,
  result: &CacheResult<Response>,
  show_body: bool,
) -> Result<()> {
  let response = &result.data;
  write!(
    out,
    "{} {} {} [{}] {}",
    response.status, response.status_text, request.method, result.source, request.url
  )?;
  match result.cached_at {
    Some(cached_at) => writeln!(out, " (cached {})", cached_at.format("%Y-%m-%d %H:%M:%S"))?,
    None => writeln!(out)?,
  }
  if show_body {
    writeln!(out, "{}", response.text())?;
  }
  Ok(())
}
