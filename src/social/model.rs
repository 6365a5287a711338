use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Instagram,
    Youtube,
}

impl SocialPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Youtube => "youtube",
        }
    }

    pub fn parse(s: &str) -> Option<SocialPlatform> {
        match s {
            "instagram" => Some(SocialPlatform::Instagram),
            "youtube" => Some(SocialPlatform::Youtube),
            _ => None,
        }
    }
}

/// OAuth connection stored on the user document. Token fields hold
/// AES-GCM ciphertext, never plaintext.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConnection {
    pub platform: SocialPlatform,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_username: Option<String>,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_expires_at: Option<DateTime<Utc>>,
    pub connected_at: DateTime<Utc>,
}

/// Aggregates recomputed on every refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub platform: SocialPlatform,
    pub followers: u64,
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_views: u64,
    pub media_count: u64,
    pub engagement_rate: f64,
    pub refreshed_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ConnectRequest {
    pub code: String,
}

// ============================================
// Provider API payloads
// ============================================

#[derive(Debug, Deserialize)]
pub struct InstagramTokenResponse {
    pub access_token: String,
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
pub struct InstagramProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub media_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct InstagramMedia {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comments_count: u64,
}

#[derive(Debug, Deserialize)]
pub struct InstagramMediaList {
    #[serde(default)]
    pub data: Vec<InstagramMedia>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeChannelStatistics {
    #[serde(rename = "subscriberCount", default)]
    pub subscriber_count: String,
    #[serde(rename = "viewCount", default)]
    pub view_count: String,
    #[serde(rename = "videoCount", default)]
    pub video_count: String,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeChannelSnippet {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeChannel {
    pub id: String,
    pub snippet: YoutubeChannelSnippet,
    pub statistics: YoutubeChannelStatistics,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeChannelList {
    #[serde(default)]
    pub items: Vec<YoutubeChannel>,
}

// ============================================
// Aggregation
// ============================================

/// Sums recomputed from a media fetch
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EngagementTotals {
    pub total_likes: u64,
    pub total_comments: u64,
    pub total_views: u64,
    pub media_count: u64,
}

pub fn sum_instagram_media(media: &[InstagramMedia]) -> EngagementTotals {
    EngagementTotals {
        total_likes: media.iter().map(|m| m.like_count).sum(),
        total_comments: media.iter().map(|m| m.comments_count).sum(),
        total_views: 0,
        media_count: media.len() as u64,
    }
}

/// Naive engagement-rate ratio: (likes + comments) / followers * 100.
/// Zero followers yields 0 rather than a division error.
pub fn engagement_rate(totals: &EngagementTotals, followers: u64) -> f64 {
    if followers == 0 {
        return 0.0;
    }
    (totals.total_likes + totals.total_comments) as f64 / followers as f64 * 100.0
}

impl PlatformMetrics {
    pub fn from_totals(
        platform: SocialPlatform,
        totals: EngagementTotals,
        followers: u64,
    ) -> Self {
        PlatformMetrics {
            platform,
            followers,
            total_likes: totals.total_likes,
            total_comments: totals.total_comments,
            total_views: totals.total_views,
            media_count: totals.media_count,
            engagement_rate: engagement_rate(&totals, followers),
            refreshed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(likes: u64, comments: u64) -> InstagramMedia {
        InstagramMedia {
            id: "m".to_string(),
            caption: None,
            like_count: likes,
            comments_count: comments,
        }
    }

    #[test]
    fn sums_across_media() {
        let totals = sum_instagram_media(&[media(10, 2), media(30, 8), media(0, 0)]);
        assert_eq!(totals.total_likes, 40);
        assert_eq!(totals.total_comments, 10);
        assert_eq!(totals.media_count, 3);
    }

    #[test]
    fn engagement_rate_ratio() {
        let totals = EngagementTotals {
            total_likes: 40,
            total_comments: 10,
            total_views: 0,
            media_count: 3,
        };
        assert!((engagement_rate(&totals, 1000) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_followers_means_zero_rate() {
        let totals = sum_instagram_media(&[media(10, 2)]);
        assert_eq!(engagement_rate(&totals, 0), 0.0);
    }

    #[test]
    fn platform_parse() {
        assert_eq!(SocialPlatform::parse("instagram"), Some(SocialPlatform::Instagram));
        assert_eq!(SocialPlatform::parse("youtube"), Some(SocialPlatform::Youtube));
        assert_eq!(SocialPlatform::parse("tiktok"), None);
    }
}
