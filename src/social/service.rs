use chrono::{Duration, Utc};
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};
use std::env;

use crate::database::db::DB_NAME;
use crate::reel::model::AnalyticsSnapshot;
use crate::reel::service::ReelService;
use crate::social::model::{
    EngagementTotals, InstagramMediaList, InstagramProfile, InstagramTokenResponse,
    PlatformMetrics, SocialConnection, SocialPlatform, YoutubeChannelList, YoutubeTokenResponse,
    engagement_rate, sum_instagram_media,
};
use crate::user::model::User;
use crate::utils::crypto::TokenCipher;
use crate::utils::error::CustomError;

pub struct SocialService {
    users: Collection<User>,
    client: reqwest::Client,
    cipher: TokenCipher,
}

struct OauthCredentials {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OauthCredentials {
    fn from_env(prefix: &str) -> Result<Self, CustomError> {
        let var = |suffix: &str| {
            let name = format!("{}_{}", prefix, suffix);
            env::var(&name)
                .map_err(|_| CustomError::InternalServerError(format!("{} is required", name)))
        };
        Ok(Self {
            client_id: var("CLIENT_ID")?,
            client_secret: var("CLIENT_SECRET")?,
            redirect_uri: var("REDIRECT_URI")?,
        })
    }
}

impl SocialService {
    pub fn new(client: &Client) -> Result<Self, CustomError> {
        let users = client.database(DB_NAME).collection::<User>("users");
        Ok(SocialService {
            users,
            client: reqwest::Client::new(),
            cipher: TokenCipher::from_env()?,
        })
    }

    // ============================================
    // OAuth handshake
    // ============================================

    /// Authorization-code exchange, profile fetch, encrypted store
    pub async fn connect(
        &self,
        user_id: &str,
        platform: SocialPlatform,
        code: &str,
    ) -> Result<SocialConnection, CustomError> {
        let connection = match platform {
            SocialPlatform::Instagram => self.connect_instagram(code).await?,
            SocialPlatform::Youtube => self.connect_youtube(code).await?,
        };

        self.store_connection(user_id, &connection).await?;
        Ok(connection)
    }

    async fn connect_instagram(&self, code: &str) -> Result<SocialConnection, CustomError> {
        let creds = OauthCredentials::from_env("INSTAGRAM")?;

        let token: InstagramTokenResponse = self
            .client
            .post("https://api.instagram.com/oauth/access_token")
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", creds.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Instagram token exchange failed: {}", e)))?
            .error_for_status()
            .map_err(|_| CustomError::BadRequestError("Invalid authorization code".to_string()))?
            .json()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Malformed Instagram token response: {}", e)))?;

        let profile = self.fetch_instagram_profile(&token.access_token).await?;

        Ok(SocialConnection {
            platform: SocialPlatform::Instagram,
            account_id: profile.id,
            account_username: Some(profile.username),
            access_token: self.cipher.encrypt(&token.access_token)?,
            refresh_token: None,
            token_expires_at: None,
            connected_at: Utc::now(),
        })
    }

    async fn connect_youtube(&self, code: &str) -> Result<SocialConnection, CustomError> {
        let creds = OauthCredentials::from_env("YOUTUBE")?;

        let token: YoutubeTokenResponse = self
            .client
            .post("https://oauth2.googleapis.com/token")
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", creds.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("YouTube token exchange failed: {}", e)))?
            .error_for_status()
            .map_err(|_| CustomError::BadRequestError("Invalid authorization code".to_string()))?
            .json()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Malformed YouTube token response: {}", e)))?;

        let channels = self.fetch_youtube_channels(&token.access_token).await?;
        let channel = channels
            .items
            .into_iter()
            .next()
            .ok_or_else(|| CustomError::NotFoundError("No YouTube channel found".to_string()))?;

        let refresh_token = match &token.refresh_token {
            Some(rt) => Some(self.cipher.encrypt(rt)?),
            None => None,
        };

        Ok(SocialConnection {
            platform: SocialPlatform::Youtube,
            account_id: channel.id,
            account_username: Some(channel.snippet.title),
            access_token: self.cipher.encrypt(&token.access_token)?,
            refresh_token,
            token_expires_at: Some(Utc::now() + Duration::seconds(token.expires_in)),
            connected_at: Utc::now(),
        })
    }

    async fn store_connection(
        &self,
        user_id: &str,
        connection: &SocialConnection,
    ) -> Result<(), CustomError> {
        let object_id = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        self.users
            .update_one(
                doc! { "_id": object_id },
                doc! { "$pull": { "social_connections": { "platform": connection.platform.as_str() } } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let connection_doc = mongodb::bson::to_bson(connection)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let result = self
            .users
            .update_one(
                doc! { "_id": object_id },
                doc! {
                    "$push": { "social_connections": connection_doc },
                    "$set": { "updated_at": Utc::now().to_rfc3339() },
                },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("User not found".to_string()));
        }

        Ok(())
    }

    pub async fn disconnect(
        &self,
        user_id: &str,
        platform: SocialPlatform,
    ) -> Result<(), CustomError> {
        let object_id = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let result = self
            .users
            .update_one(
                doc! { "_id": object_id },
                doc! {
                    "$pull": {
                        "social_connections": { "platform": platform.as_str() },
                        "platform_metrics": { "platform": platform.as_str() },
                    },
                    "$set": { "updated_at": Utc::now().to_rfc3339() },
                },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("User not found".to_string()));
        }

        Ok(())
    }

    // ============================================
    // Metrics refresh
    // ============================================

    async fn fetch_instagram_profile(
        &self,
        access_token: &str,
    ) -> Result<InstagramProfile, CustomError> {
        self.client
            .get("https://graph.instagram.com/me")
            .query(&[
                ("fields", "id,username,followers_count,media_count"),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Instagram profile fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|_| CustomError::UnauthorizedError("Instagram token rejected".to_string()))?
            .json()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Malformed Instagram profile: {}", e)))
    }

    async fn fetch_instagram_media(
        &self,
        access_token: &str,
    ) -> Result<InstagramMediaList, CustomError> {
        self.client
            .get("https://graph.instagram.com/me/media")
            .query(&[
                ("fields", "id,caption,like_count,comments_count"),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Instagram media fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|_| CustomError::UnauthorizedError("Instagram token rejected".to_string()))?
            .json()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Malformed Instagram media list: {}", e)))
    }

    async fn fetch_youtube_channels(
        &self,
        access_token: &str,
    ) -> Result<YoutubeChannelList, CustomError> {
        self.client
            .get("https://www.googleapis.com/youtube/v3/channels")
            .query(&[("part", "snippet,statistics"), ("mine", "true")])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("YouTube channel fetch failed: {}", e)))?
            .error_for_status()
            .map_err(|_| CustomError::UnauthorizedError("YouTube token rejected".to_string()))?
            .json()
            .await
            .map_err(|e| CustomError::InternalServerError(format!("Malformed YouTube channel list: {}", e)))
    }

    /// Re-fetch profile and media for one platform, recompute the
    /// aggregates and store them; appends per-media snapshots to the
    /// reel history.
    pub async fn refresh_platform(
        &self,
        user: &User,
        platform: SocialPlatform,
        reel_service: &ReelService,
    ) -> Result<PlatformMetrics, CustomError> {
        let user_id = user
            .id
            .ok_or_else(|| CustomError::InternalServerError("User ID missing".to_string()))?;

        let connection = user
            .social_connections
            .iter()
            .find(|c| c.platform == platform)
            .ok_or_else(|| {
                CustomError::NotFoundError(format!("{} is not connected", platform.as_str()))
            })?;

        let access_token = self.cipher.decrypt(&connection.access_token)?;

        let metrics = match platform {
            SocialPlatform::Instagram => {
                let profile = self.fetch_instagram_profile(&access_token).await?;
                let media = self.fetch_instagram_media(&access_token).await?;

                for item in &media.data {
                    let totals = EngagementTotals {
                        total_likes: item.like_count,
                        total_comments: item.comments_count,
                        total_views: 0,
                        media_count: 1,
                    };
                    let snapshot = AnalyticsSnapshot {
                        likes: item.like_count,
                        comments: item.comments_count,
                        views: 0,
                        engagement_rate: engagement_rate(&totals, profile.followers_count),
                        captured_at: Utc::now(),
                    };
                    reel_service
                        .record_snapshot(
                            &user_id,
                            platform,
                            &item.id,
                            item.caption.as_deref(),
                            snapshot,
                        )
                        .await?;
                }

                let totals = sum_instagram_media(&media.data);
                PlatformMetrics::from_totals(platform, totals, profile.followers_count)
            }
            SocialPlatform::Youtube => {
                let channels = self.fetch_youtube_channels(&access_token).await?;
                let channel = channels.items.into_iter().next().ok_or_else(|| {
                    CustomError::NotFoundError("No YouTube channel found".to_string())
                })?;

                let followers = channel.statistics.subscriber_count.parse().unwrap_or(0);
                let totals = EngagementTotals {
                    total_likes: 0,
                    total_comments: 0,
                    total_views: channel.statistics.view_count.parse().unwrap_or(0),
                    media_count: channel.statistics.video_count.parse().unwrap_or(0),
                };
                PlatformMetrics::from_totals(platform, totals, followers)
            }
        };

        self.store_metrics(&user_id, &metrics).await?;
        Ok(metrics)
    }

    async fn store_metrics(
        &self,
        user_id: &ObjectId,
        metrics: &PlatformMetrics,
    ) -> Result<(), CustomError> {
        self.users
            .update_one(
                doc! { "_id": user_id },
                doc! { "$pull": { "platform_metrics": { "platform": metrics.platform.as_str() } } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let metrics_doc = mongodb::bson::to_bson(metrics)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        self.users
            .update_one(
                doc! { "_id": user_id },
                doc! {
                    "$push": { "platform_metrics": metrics_doc },
                    "$set": { "updated_at": Utc::now().to_rfc3339() },
                },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(())
    }

    /// Daily refresh over every connected account. Sequential, with a
    /// fixed one-second sleep between accounts to stay under provider
    /// rate limits; per-account failures are logged and skipped.
    pub async fn refresh_all(&self, reel_service: &ReelService) {
        let cursor = match self
            .users
            .find(doc! { "social_connections.0": { "$exists": true } })
            .await
        {
            Ok(cursor) => cursor,
            Err(e) => {
                log::error!("Analytics refresh: failed to query users: {}", e);
                return;
            }
        };

        let users: Vec<User> = match cursor.try_collect().await {
            Ok(users) => users,
            Err(e) => {
                log::error!("Analytics refresh: failed to read users: {}", e);
                return;
            }
        };

        log::info!("Analytics refresh: {} connected account(s)", users.len());

        for user in &users {
            let platforms: Vec<SocialPlatform> =
                user.social_connections.iter().map(|c| c.platform).collect();

            for platform in platforms {
                if let Err(e) = self.refresh_platform(user, platform, reel_service).await {
                    log::warn!(
                        "Analytics refresh failed for user {} on {}: {}",
                        user.email,
                        platform.as_str(),
                        e
                    );
                }
            }

            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
    }
}
