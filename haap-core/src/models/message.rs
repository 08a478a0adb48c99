use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageTemplate {
    Verification,
    MonthlyReport,
    EnrollmentInfo,
    PasswordSetup,
}

impl MessageTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verification => "verification",
            Self::MonthlyReport => "monthly_report",
            Self::EnrollmentInfo => "enrollment_info",
            Self::PasswordSetup => "password_setup",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "verification" => Some(Self::Verification),
            "monthly_report" => Some(Self::MonthlyReport),
            "enrollment_info" => Some(Self::EnrollmentInfo),
            "password_setup" => Some(Self::PasswordSetup),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Delivered,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Delivered => "delivered",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            "delivered" => Some(Self::Delivered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    WhatsApp,
    Email,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppMessage {
    pub id: Uuid,
    pub to_number: String,
    pub template_type: MessageTemplate,
    pub content: String,
    pub status: DeliveryStatus,
    pub sent_at: DateTime<Utc>,
}
