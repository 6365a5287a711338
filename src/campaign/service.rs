use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::campaign::model::{
    Campaign, CampaignInfluencer, CampaignQuery, CampaignStatus, CreateCampaignRequest,
    InfluencerStatus, PhaseProgress, UpdateCampaignRequest, filter_and_sort,
};
use crate::database::db::DB_NAME;
use crate::utils::error::CustomError;
use crate::utils::model::{PageQuery, Paginated};

pub struct CampaignService {
    collection: Collection<Campaign>,
}

impl CampaignService {
    pub fn new(client: &Client) -> Self {
        let collection = client.database(DB_NAME).collection::<Campaign>("campaigns");
        CampaignService { collection }
    }

    fn parse_id(id: &str) -> Result<ObjectId, CustomError> {
        ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError("Invalid campaign ID".to_string()))
    }

    pub async fn create(
        &self,
        brand_id: &str,
        req: CreateCampaignRequest,
    ) -> Result<Campaign, CustomError> {
        let brand_id = ObjectId::parse_str(brand_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        if req.budget < 0.0 {
            return Err(CustomError::ValidationError(
                "Budget cannot be negative".to_string(),
            ));
        }

        let campaign = Campaign {
            id: Some(ObjectId::new()),
            brand_id,
            title: req.title,
            description: req.description,
            budget: req.budget,
            region: req.region,
            industry: req.industry,
            requirements: req.requirements,
            status: CampaignStatus::Planning,
            influencers: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.collection
            .insert_one(&campaign)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to create campaign".into()))?;

        Ok(campaign)
    }

    pub async fn get(&self, id: &str) -> Result<Campaign, CustomError> {
        let object_id = Self::parse_id(id)?;

        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaign".into()))?
            .ok_or_else(|| CustomError::NotFoundError("Campaign not found".to_string()))
    }

    /// Fetch a campaign and check the caller owns it
    pub async fn get_owned(&self, id: &str, brand_id: &str) -> Result<Campaign, CustomError> {
        let campaign = self.get(id).await?;
        if campaign.brand_id.to_hex() != brand_id {
            return Err(CustomError::ForbiddenError(
                "You do not own this campaign".to_string(),
            ));
        }
        Ok(campaign)
    }

    pub async fn update(
        &self,
        id: &str,
        brand_id: &str,
        req: UpdateCampaignRequest,
    ) -> Result<Campaign, CustomError> {
        let campaign = self.get_owned(id, brand_id).await?;
        let object_id = campaign.id.ok_or_else(|| {
            CustomError::InternalServerError("Campaign ID missing".to_string())
        })?;

        let mut set = doc! { "updated_at": Utc::now().to_rfc3339() };
        if let Some(title) = req.title {
            set.insert("title", title);
        }
        if let Some(description) = req.description {
            set.insert("description", description);
        }
        if let Some(budget) = req.budget {
            if budget < 0.0 {
                return Err(CustomError::ValidationError(
                    "Budget cannot be negative".to_string(),
                ));
            }
            set.insert("budget", budget);
        }
        if let Some(region) = req.region {
            set.insert("region", region);
        }
        if let Some(industry) = req.industry {
            set.insert("industry", industry);
        }
        if let Some(requirements) = req.requirements {
            let requirements_doc = mongodb::bson::to_bson(&requirements)
                .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
            set.insert("requirements", requirements_doc);
        }
        if let Some(status) = req.status {
            let status = CampaignStatus::parse(&status)
                .ok_or_else(|| CustomError::BadRequestError("Invalid status".to_string()))?;
            set.insert("status", status.as_str());
        }

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set })
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to update campaign".into()))?
            .ok_or_else(|| CustomError::NotFoundError("Campaign not found".to_string()))?;

        Ok(updated)
    }

    /// Soft close: mark completed, keep the document
    pub async fn close(&self, id: &str, brand_id: &str) -> Result<Campaign, CustomError> {
        self.update(
            id,
            brand_id,
            UpdateCampaignRequest {
                title: None,
                description: None,
                budget: None,
                region: None,
                industry: None,
                requirements: None,
                status: Some("completed".to_string()),
            },
        )
        .await
    }

    async fn paginated_view(
        &self,
        filter: mongodb::bson::Document,
        query: &CampaignQuery,
    ) -> Result<Paginated<Campaign>, CustomError> {
        let page_query = PageQuery {
            page: query.page,
            limit: query.limit,
        };

        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to count campaigns".into()))?;

        let (_, limit) = page_query.resolve();
        let campaigns: Vec<Campaign> = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(page_query.skip())
            .limit(limit as i64)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaigns".into()))?
            .try_collect()
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaigns".into()))?;

        // Refine the fetched page the way the original views did
        let campaigns = filter_and_sort(campaigns, query);

        Ok(Paginated::new(campaigns, &page_query, total))
    }

    /// Campaigns authored by a brand
    pub async fn my_campaigns(
        &self,
        brand_id: &str,
        query: &CampaignQuery,
    ) -> Result<Paginated<Campaign>, CustomError> {
        let brand_id = ObjectId::parse_str(brand_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;
        self.paginated_view(doc! { "brand_id": brand_id }, query).await
    }

    /// Open campaigns the influencer has not applied to yet
    pub async fn explore_campaigns(
        &self,
        applied_campaign_ids: Vec<ObjectId>,
        query: &CampaignQuery,
    ) -> Result<Paginated<Campaign>, CustomError> {
        let filter = doc! {
            "status": { "$ne": CampaignStatus::Completed.as_str() },
            "_id": { "$nin": applied_campaign_ids },
        };
        self.paginated_view(filter, query).await
    }

    /// Campaigns matching a set of ids (applied view)
    pub async fn find_by_ids(&self, ids: Vec<ObjectId>) -> Result<Vec<Campaign>, CustomError> {
        self.collection
            .find(doc! { "_id": { "$in": ids } })
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaigns".into()))?
            .try_collect()
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaigns".into()))
    }

    /// Upsert an influencer into the campaign's embedded roster. Called
    /// after the application decision; this is a separate write from the
    /// application update, with no cross-document atomicity.
    pub async fn upsert_influencer(
        &self,
        campaign_id: &ObjectId,
        influencer_id: &ObjectId,
        status: InfluencerStatus,
    ) -> Result<(), CustomError> {
        // Drop any existing entry, then push the fresh one
        self.collection
            .update_one(
                doc! { "_id": campaign_id },
                doc! { "$pull": { "influencers": { "influencer_id": influencer_id } } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let entry = CampaignInfluencer {
            influencer_id: *influencer_id,
            status,
            phase: PhaseProgress::default(),
            updated_at: Utc::now(),
        };
        let entry_doc = mongodb::bson::to_bson(&entry)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        self.collection
            .update_one(
                doc! { "_id": campaign_id },
                doc! { "$push": { "influencers": entry_doc } },
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(())
    }

    /// Brand updates delivery progress for an approved influencer
    pub async fn update_phase(
        &self,
        campaign_id: &str,
        brand_id: &str,
        influencer_id: &str,
        phase: PhaseProgress,
    ) -> Result<(), CustomError> {
        let campaign = self.get_owned(campaign_id, brand_id).await?;
        let campaign_id = campaign.id.ok_or_else(|| {
            CustomError::InternalServerError("Campaign ID missing".to_string())
        })?;
        let influencer_id = ObjectId::parse_str(influencer_id)
            .map_err(|_| CustomError::BadRequestError("Invalid influencer ID".to_string()))?;

        let phase_doc = mongodb::bson::to_bson(&phase)
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let result = self
            .collection
            .update_one(
                doc! {
                    "_id": campaign_id,
                    "influencers.influencer_id": influencer_id,
                },
                doc! { "$set": {
                    "influencers.$.phase": phase_doc,
                    "influencers.$.updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError(
                "Influencer is not part of this campaign".to_string(),
            ));
        }

        Ok(())
    }

    /// Public search over open campaigns (title/industry/region)
    pub async fn search_public(
        &self,
        term: &str,
        query: &PageQuery,
    ) -> Result<Paginated<Campaign>, CustomError> {
        let pattern = regex::escape(term);
        let filter = doc! {
            "status": { "$ne": CampaignStatus::Completed.as_str() },
            "$or": [
                { "title": { "$regex": &pattern, "$options": "i" } },
                { "industry": { "$regex": &pattern, "$options": "i" } },
                { "region": { "$regex": &pattern, "$options": "i" } },
            ],
        };

        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to count campaigns".into()))?;

        let (_, limit) = query.resolve();
        let campaigns: Vec<Campaign> = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(query.skip())
            .limit(limit as i64)
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaigns".into()))?
            .try_collect()
            .await
            .map_err(|_| CustomError::InternalServerError("Failed to fetch campaigns".into()))?;

        Ok(Paginated::new(campaigns, query, total))
    }
}
