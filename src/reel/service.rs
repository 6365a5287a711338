use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::database::db::DB_NAME;
use crate::reel::model::{AnalyticsSnapshot, Reel};
use crate::social::model::SocialPlatform;
use crate::utils::error::CustomError;
use crate::utils::model::{PageQuery, Paginated};

pub struct ReelService {
    collection: Collection<Reel>,
}

impl ReelService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<Reel>("reels");
        ReelService { collection }
    }

    /// Append a snapshot to the content's history, creating the reel
    /// document on first sight of the media id.
    pub async fn record_snapshot(
        &self,
        user_id: &ObjectId,
        platform: SocialPlatform,
        media_id: &str,
        caption: Option<&str>,
        snapshot: AnalyticsSnapshot,
    ) -> Result<(), CustomError> {
        let existing = self
            .collection
            .find_one(doc! { "user_id": user_id, "media_id": media_id })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        match existing {
            Some(reel) => {
                let snapshot_doc = mongodb::bson::to_bson(&snapshot)
                    .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

                self.collection
                    .update_one(
                        doc! { "_id": reel.id },
                        doc! {
                            "$push": { "analytics_history": snapshot_doc },
                            "$set": { "updated_at": Utc::now().to_rfc3339() },
                        },
                    )
                    .await
                    .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            }
            None => {
                let reel = Reel {
                    id: None,
                    user_id: *user_id,
                    platform,
                    media_id: media_id.to_string(),
                    caption: caption.map(String::from),
                    analytics_history: vec![snapshot],
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };
                self.collection
                    .insert_one(reel)
                    .await
                    .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            }
        }

        Ok(())
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        query: &PageQuery,
    ) -> Result<Paginated<Reel>, CustomError> {
        let user_id = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let filter = doc! { "user_id": user_id };
        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let (_, limit) = query.resolve();
        let reels: Vec<Reel> = self
            .collection
            .find(filter)
            .sort(doc! { "updated_at": -1 })
            .skip(query.skip())
            .limit(limit as i64)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(Paginated::new(reels, query, total))
    }
}
