use serde::{Deserialize, Serialize};

use crate::social::model::PlatformMetrics;
use crate::user::model::{MediaKit, User, UserStatus};

/// Public-facing media kit page. Contact details and account internals
/// stay private.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicMediaKit {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub categories: Vec<String>,
    pub connected_platforms: Vec<String>,
    pub platform_metrics: Vec<PlatformMetrics>,
    pub media_kit: MediaKit,
}

impl PublicMediaKit {
    /// Only approved influencers get a public page.
    pub fn from_user(user: User) -> Option<Self> {
        if user.status != UserStatus::Approved {
            return None;
        }
        let media_kit = user.media_kit?;

        Some(PublicMediaKit {
            name: user.name,
            username: user.username,
            bio: user.bio,
            categories: user.categories,
            connected_platforms: user
                .social_connections
                .iter()
                .map(|c| c.platform.as_str().to_string())
                .collect(),
            platform_metrics: user.platform_metrics,
            media_kit,
        })
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Cache key for the public page of a media kit. Slugs are stored
/// lowercase, so readers and invalidators must agree on casing.
pub fn media_kit_cache_key(slug: &str) -> String {
    format!("mediakit:{}", slug.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::model::Role;
    use chrono::Utc;

    fn influencer(status: UserStatus, media_kit: Option<MediaKit>) -> User {
        User {
            id: None,
            name: "Asha".to_string(),
            username: Some("asha".to_string()),
            email: "asha@example.com".to_string(),
            phone_number: "+911234567890".to_string(),
            password: "hashed".to_string(),
            role: Role::Influencer,
            status,
            terms_accepted: true,
            address: None,
            bio: Some("Travel creator".to_string()),
            categories: vec!["travel".to_string()],
            commercials: None,
            social_connections: vec![],
            platform_metrics: vec![],
            media_kit,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn approved_user_with_kit_is_public() {
        let user = influencer(UserStatus::Approved, Some(MediaKit::default()));
        assert!(PublicMediaKit::from_user(user).is_some());
    }

    #[test]
    fn pending_user_is_hidden() {
        let user = influencer(UserStatus::Pending, Some(MediaKit::default()));
        assert!(PublicMediaKit::from_user(user).is_none());
    }

    #[test]
    fn approved_user_without_kit_is_hidden() {
        let user = influencer(UserStatus::Approved, None);
        assert!(PublicMediaKit::from_user(user).is_none());
    }

    #[test]
    fn cache_key_is_case_normalized() {
        assert_eq!(media_kit_cache_key("Asha-Travels"), "mediakit:asha-travels");
        assert_eq!(
            media_kit_cache_key("asha-travels"),
            media_kit_cache_key("ASHA-TRAVELS")
        );
    }
}
