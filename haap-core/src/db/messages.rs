use rusqlite::{params, Row};
use tracing::warn;
use uuid::Uuid;

use super::{datetime_col, enum_col, now, timestamp, uuid_col, Database};
use crate::error::Result;
use crate::models::{Channel, DeliveryStatus, MessageTemplate, WhatsAppMessage};
use crate::notify::{Notification, Notifier};

impl WhatsAppMessage {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: uuid_col(row, "id")?,
            to_number: row.get("to_number")?,
            template_type: enum_col(row, "template_type", MessageTemplate::from_str)?,
            content: row.get("content")?,
            status: enum_col(row, "status", DeliveryStatus::from_str)?,
            sent_at: datetime_col(row, "sent_at")?,
        })
    }
}

impl Database {
    /// Hand `notification` to `notifier` and log WhatsApp sends.
    pub fn dispatch(&self, notifier: &dyn Notifier, notification: &Notification) -> Result<DeliveryStatus> {
        let status = notifier.send(notification);
        if status == DeliveryStatus::Failed {
            warn!(
                template = notification.template.as_str(),
                "Notification to {} failed",
                notification.recipient
            );
        }

        if notification.channel == Channel::WhatsApp {
            self.record_message(
                &notification.recipient,
                notification.template,
                &notification.content,
                status,
            )?;
        }
        Ok(status)
    }

    pub fn record_message(
        &self,
        to_number: &str,
        template: MessageTemplate,
        content: &str,
        status: DeliveryStatus,
    ) -> Result<WhatsAppMessage> {
        let message = WhatsAppMessage {
            id: Uuid::new_v4(),
            to_number: to_number.to_string(),
            template_type: template,
            content: content.to_string(),
            status,
            sent_at: now(),
        };

        self.with_connection(|conn| {
            conn.execute(
                "INSERT INTO whatsapp_messages (id, to_number, template_type, content, status, sent_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    message.id.to_string(),
                    message.to_number,
                    message.template_type.as_str(),
                    message.content,
                    message.status.as_str(),
                    timestamp(&message.sent_at),
                ],
            )?;
            Ok(())
        })?;

        Ok(message)
    }

    /// Message log, newest first, optionally for one number.
    pub fn list_messages(&self, to_number: Option<&str>) -> Result<Vec<WhatsAppMessage>> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT * FROM whatsapp_messages
                 WHERE ?1 IS NULL OR to_number = ?1
                 ORDER BY sent_at DESC, rowid DESC",
            )?;
            let rows = stmt.query_map(params![to_number], WhatsAppMessage::from_row)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }
}
