use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::campaign::model::Campaign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<ApplicationStatus> {
        match s {
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// Payout progress, tracked independently of the application decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Paid,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Processing => "processing",
            PayoutStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<PayoutStatus> {
        match s {
            "pending" => Some(PayoutStatus::Pending),
            "processing" => Some(PayoutStatus::Processing),
            "paid" => Some(PayoutStatus::Paid),
            _ => None,
        }
    }
}

/// Join entity between an influencer and a campaign. At most one per
/// (influencer, campaign) pair.
#[derive(Debug, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub campaign_id: ObjectId,
    pub influencer_id: ObjectId,
    pub status: ApplicationStatus,
    pub payout_status: PayoutStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct ApplyRequest {
    pub campaign_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    /// "accepted" or "rejected"
    pub status: String,
}

#[derive(Deserialize)]
pub struct PayoutUpdateRequest {
    pub payout_status: String,
}

/// Row in the influencer's "applied" view: the campaign joined with
/// the application that links to it.
#[derive(Debug, Serialize)]
pub struct AppliedCampaign {
    pub campaign: Campaign,
    pub application_id: String,
    pub application_status: ApplicationStatus,
    pub payout_status: PayoutStatus,
    pub applied_at: DateTime<Utc>,
}
