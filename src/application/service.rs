use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};

use crate::application::model::{
    Application, ApplicationStatus, AppliedCampaign, ApplyRequest, PayoutStatus,
};
use crate::campaign::model::{
    Campaign, CampaignQuery, CampaignStatus, InfluencerStatus, filter_and_sort,
};
use crate::campaign::service::CampaignService;
use crate::database::db::DB_NAME;
use crate::user::service::UserService;
use crate::utils::email::EmailService;
use crate::utils::error::CustomError;
use crate::utils::model::{PageQuery, Paginated};

/// Pre-insert checks: the campaign must be open, not the applicant's
/// own, and not already applied to.
fn check_new_application(
    campaign: &Campaign,
    influencer_id: &ObjectId,
    already_applied: bool,
) -> Result<(), CustomError> {
    if campaign.status == CampaignStatus::Completed {
        return Err(CustomError::BadRequestError(
            "This campaign is closed".to_string(),
        ));
    }

    if campaign.brand_id == *influencer_id {
        return Err(CustomError::BadRequestError(
            "You cannot apply to your own campaign".to_string(),
        ));
    }

    if already_applied {
        return Err(CustomError::ConflictError(
            "You have already applied to this campaign".to_string(),
        ));
    }

    Ok(())
}

pub struct ApplicationService {
    collection: Collection<Application>,
}

impl ApplicationService {
    pub fn new(client: &Client) -> Self {
        let collection = client
            .database(DB_NAME)
            .collection::<Application>("applications");
        ApplicationService { collection }
    }

    /// One application per (influencer, campaign) pair
    async fn already_applied(
        &self,
        influencer_id: &ObjectId,
        campaign_id: &ObjectId,
    ) -> Result<bool, CustomError> {
        let count = self
            .collection
            .count_documents(doc! {
                "influencer_id": influencer_id,
                "campaign_id": campaign_id,
            })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;
        Ok(count > 0)
    }

    pub async fn apply(
        &self,
        influencer_id: &str,
        req: ApplyRequest,
        campaign_service: &CampaignService,
    ) -> Result<ObjectId, CustomError> {
        let influencer_id = ObjectId::parse_str(influencer_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let campaign = campaign_service.get(&req.campaign_id).await?;
        let campaign_id = campaign.id.ok_or_else(|| {
            CustomError::InternalServerError("Campaign ID missing".to_string())
        })?;

        let already_applied = self.already_applied(&influencer_id, &campaign_id).await?;
        check_new_application(&campaign, &influencer_id, already_applied)?;

        let application = Application {
            id: None,
            campaign_id,
            influencer_id,
            status: ApplicationStatus::Pending,
            payout_status: PayoutStatus::Pending,
            message: req.message,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let result = self
            .collection
            .insert_one(application)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let application_id = result.inserted_id.as_object_id().ok_or_else(|| {
            CustomError::InternalServerError("Failed to get inserted ID".to_string())
        })?;

        // Second, independent write: mirror the applicant into the
        // campaign roster. A failure here is logged, not rolled back.
        if let Err(e) = campaign_service
            .upsert_influencer(&campaign_id, &influencer_id, InfluencerStatus::Applied)
            .await
        {
            log::error!(
                "Failed to mirror application {} into campaign {}: {}",
                application_id.to_hex(),
                campaign_id.to_hex(),
                e
            );
        }

        Ok(application_id)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Application, CustomError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| CustomError::BadRequestError("Invalid application ID".to_string()))?;

        self.collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Application not found".to_string()))
    }

    /// Brand decision on a pending application. Acceptance mirrors the
    /// influencer into the campaign roster and notifies them by email.
    pub async fn decide(
        &self,
        brand_id: &str,
        application_id: &str,
        decision: ApplicationStatus,
        campaign_service: &CampaignService,
        user_service: &UserService,
    ) -> Result<Application, CustomError> {
        if decision == ApplicationStatus::Pending {
            return Err(CustomError::BadRequestError(
                "Decision must be accepted or rejected".to_string(),
            ));
        }

        let application = self.find_by_id(application_id).await?;

        // Ownership check runs through the campaign
        let campaign = campaign_service
            .get_owned(&application.campaign_id.to_hex(), brand_id)
            .await?;

        if application.status != ApplicationStatus::Pending {
            return Err(CustomError::BadRequestError(
                "Application has already been decided".to_string(),
            ));
        }

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": application.id },
                doc! { "$set": {
                    "status": decision.as_str(),
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Application not found".to_string()))?;

        let roster_status = match decision {
            ApplicationStatus::Accepted => InfluencerStatus::Approved,
            _ => InfluencerStatus::Rejected,
        };
        if let Err(e) = campaign_service
            .upsert_influencer(&application.campaign_id, &application.influencer_id, roster_status)
            .await
        {
            log::error!(
                "Failed to update campaign roster for application {}: {}",
                application_id,
                e
            );
        }

        // Best-effort notification
        match user_service.find_by_id(&application.influencer_id.to_hex()).await {
            Ok(influencer) => {
                if let Ok(email_service) = EmailService::new() {
                    if let Err(e) = email_service
                        .send_application_decision_email(
                            &influencer.email,
                            &campaign.title,
                            decision == ApplicationStatus::Accepted,
                        )
                        .await
                    {
                        log::warn!("Failed to send decision email: {}", e);
                    }
                }
            }
            Err(e) => log::warn!("Could not load influencer for notification: {}", e),
        }

        Ok(updated)
    }

    /// Payout status moves independently of the application decision
    pub async fn update_payout(
        &self,
        brand_id: &str,
        application_id: &str,
        payout_status: PayoutStatus,
        campaign_service: &CampaignService,
    ) -> Result<Application, CustomError> {
        let application = self.find_by_id(application_id).await?;

        campaign_service
            .get_owned(&application.campaign_id.to_hex(), brand_id)
            .await?;

        if application.status != ApplicationStatus::Accepted {
            return Err(CustomError::BadRequestError(
                "Payout applies to accepted applications only".to_string(),
            ));
        }

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": application.id },
                doc! { "$set": {
                    "payout_status": payout_status.as_str(),
                    "updated_at": Utc::now().to_rfc3339(),
                }},
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Application not found".to_string()))?;

        Ok(updated)
    }

    pub async fn list_for_campaign(
        &self,
        brand_id: &str,
        campaign_id: &str,
        campaign_service: &CampaignService,
        query: &PageQuery,
    ) -> Result<Paginated<Application>, CustomError> {
        let campaign = campaign_service.get_owned(campaign_id, brand_id).await?;
        let campaign_id = campaign.id.ok_or_else(|| {
            CustomError::InternalServerError("Campaign ID missing".to_string())
        })?;

        let filter = doc! { "campaign_id": campaign_id };
        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let (_, limit) = query.resolve();
        let applications: Vec<Application> = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(query.skip())
            .limit(limit as i64)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(Paginated::new(applications, query, total))
    }

    /// Campaign ids the influencer has applied to, for the explore view
    pub async fn campaign_ids_for_influencer(
        &self,
        influencer_id: &str,
    ) -> Result<Vec<ObjectId>, CustomError> {
        let influencer_id = ObjectId::parse_str(influencer_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let applications: Vec<Application> = self
            .collection
            .find(doc! { "influencer_id": influencer_id })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok(applications.into_iter().map(|a| a.campaign_id).collect())
    }

    /// The influencer's "applied" view: their applications joined with
    /// the campaigns they point at.
    pub async fn applied_campaigns(
        &self,
        influencer_id: &str,
        campaign_service: &CampaignService,
        query: &CampaignQuery,
    ) -> Result<Paginated<AppliedCampaign>, CustomError> {
        let influencer_oid = ObjectId::parse_str(influencer_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let page_query = PageQuery {
            page: query.page,
            limit: query.limit,
        };

        let filter = doc! { "influencer_id": influencer_oid };
        let total = self
            .collection
            .count_documents(filter.clone())
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let (_, limit) = page_query.resolve();
        let applications: Vec<Application> = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(page_query.skip())
            .limit(limit as i64)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let campaign_ids: Vec<ObjectId> =
            applications.iter().map(|a| a.campaign_id).collect();
        let campaigns = campaign_service.find_by_ids(campaign_ids).await?;
        let campaigns = filter_and_sort(campaigns, query);

        let rows = campaigns
            .into_iter()
            .filter_map(|campaign| {
                let campaign_id = campaign.id?;
                let application = applications
                    .iter()
                    .find(|a| a.campaign_id == campaign_id)?;
                Some(AppliedCampaign {
                    campaign,
                    application_id: application
                        .id
                        .map(|id| id.to_hex())
                        .unwrap_or_default(),
                    application_status: application.status,
                    payout_status: application.payout_status,
                    applied_at: application.created_at,
                })
            })
            .collect();

        Ok(Paginated::new(rows, &page_query, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::model::Requirements;

    fn campaign(brand_id: ObjectId, status: CampaignStatus) -> Campaign {
        Campaign {
            id: Some(ObjectId::new()),
            brand_id,
            title: "Summer launch".to_string(),
            description: String::new(),
            budget: 5000.0,
            region: "Mumbai".to_string(),
            industry: "Fashion".to_string(),
            requirements: Requirements::default(),
            status,
            influencers: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn second_application_for_same_pair_is_a_conflict() {
        let campaign = campaign(ObjectId::new(), CampaignStatus::Ongoing);
        let influencer = ObjectId::new();
        let err = check_new_application(&campaign, &influencer, true).unwrap_err();
        assert!(matches!(err, CustomError::ConflictError(_)));
    }

    #[test]
    fn closed_campaign_rejects_applications() {
        let campaign = campaign(ObjectId::new(), CampaignStatus::Completed);
        let err = check_new_application(&campaign, &ObjectId::new(), false).unwrap_err();
        assert!(matches!(err, CustomError::BadRequestError(_)));
    }

    #[test]
    fn own_campaign_rejects_applications() {
        let brand = ObjectId::new();
        let campaign = campaign(brand, CampaignStatus::Planning);
        let err = check_new_application(&campaign, &brand, false).unwrap_err();
        assert!(matches!(err, CustomError::BadRequestError(_)));
    }

    #[test]
    fn first_application_to_open_campaign_passes() {
        let campaign = campaign(ObjectId::new(), CampaignStatus::Planning);
        assert!(check_new_application(&campaign, &ObjectId::new(), false).is_ok());
    }
}
