//! Push notifications and notification clicks.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::NotificationConfig;

pub const ACTION_EXPLORE: &str = "explore";
pub const ACTION_CLOSE: &str = "close";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
  pub title: String,
  pub body: String,
  pub icon: String,
  pub badge: String,
  pub vibrate: Vec<u32>,
  pub data: NotificationData,
  pub actions: Vec<NotificationAction>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
  pub date_of_arrival: DateTime<Utc>,
  pub primary_key: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
  pub action: String,
  pub title: String,
}

/// Build the notification shown for a push message.
pub fn build_notification(config: &NotificationConfig, payload: Option<&str>) -> Notification {
  let body = payload
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .unwrap_or(config.default_body.as_str())
    .to_string();

  Notification {
    title: config.title.clone(),
    body,
    icon: config.icon.clone(),
    badge: config.badge.clone(),
    vibrate: vec![100, 50, 100],
    data: NotificationData {
      date_of_arrival: Utc::now(),
      primary_key: 1,
    },
    actions: vec![
      NotificationAction {
        action: ACTION_EXPLORE.to_string(),
        title: "Explore".to_string(),
      },
      NotificationAction {
        action: ACTION_CLOSE.to_string(),
        title: "Close".to_string(),
      },
    ],
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
  /// Close the notification and open a window at this route
  OpenWindow(String),
  /// Close the notification only
  Dismiss,
}

pub fn handle_click(config: &NotificationConfig, action: Option<&str>) -> ClickOutcome {
  match action {
    Some(ACTION_EXPLORE) => ClickOutcome::OpenWindow(config.blog_route.clone()),
    Some(ACTION_CLOSE) => ClickOutcome::Dismiss,
    _ => ClickOutcome::OpenWindow("/".to_string()),
  }
}
