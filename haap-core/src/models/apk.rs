use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApkVersion {
    pub id: Uuid,
    pub version_name: String,
    pub download_url: String,
    pub is_latest: bool,
    pub released_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishApkInput {
    pub version_name: String,
    pub download_url: String,
    #[serde(default)]
    pub is_latest: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateApkInput {
    pub version_name: Option<String>,
    pub download_url: Option<String>,
    pub is_latest: Option<bool>,
}
