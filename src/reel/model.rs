use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::social::model::SocialPlatform;

/// Point-in-time analytics for one piece of content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub likes: u64,
    pub comments: u64,
    pub views: u64,
    pub engagement_rate: f64,
    pub captured_at: DateTime<Utc>,
}

/// Per-platform content snapshot. `analytics_history` is append-only;
/// every refresh pushes a new snapshot and never rewrites old ones.
#[derive(Debug, Serialize, Deserialize)]
pub struct Reel {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub platform: SocialPlatform,
    /// Provider-side media id
    pub media_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub analytics_history: Vec<AnalyticsSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
