//! Outbound notifications (WhatsApp / email).
//!
//! Delivery itself belongs to an external gateway. The core only hands a
//! [`Notification`] to a [`Notifier`], records the outcome and moves on;
//! failed sends are never retried here.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{Channel, DeliveryStatus, MessageTemplate};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub recipient: String,
    pub template: MessageTemplate,
    pub content: String,
}

impl Notification {
    pub fn whatsapp(to: impl Into<String>, template: MessageTemplate, content: impl Into<String>) -> Self {
        Self {
            channel: Channel::WhatsApp,
            recipient: to.into(),
            template,
            content: content.into(),
        }
    }

    pub fn email(to: impl Into<String>, template: MessageTemplate, content: impl Into<String>) -> Self {
        Self {
            channel: Channel::Email,
            recipient: to.into(),
            template,
            content: content.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn send(&self, notification: &Notification) -> DeliveryStatus;
}

/// Writes notifications to the log instead of a gateway.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, notification: &Notification) -> DeliveryStatus {
        info!(
            channel = ?notification.channel,
            template = notification.template.as_str(),
            "Notify {}: {}",
            notification.recipient,
            notification.content
        );
        DeliveryStatus::Sent
    }
}

/// Keeps every notification in memory and answers with a fixed status.
#[derive(Debug)]
pub struct RecordingNotifier {
    status: DeliveryStatus,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new(status: DeliveryStatus) -> Self {
        Self {
            status,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new(DeliveryStatus::Sent)
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: &Notification) -> DeliveryStatus {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification.clone());
        }
        self.status
    }
}
