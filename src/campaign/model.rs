use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Campaign lifecycle. Closing a campaign is a status mutation, never
/// a hard delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Planning,
    Ongoing,
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Planning => "planning",
            CampaignStatus::Ongoing => "ongoing",
            CampaignStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<CampaignStatus> {
        match s {
            "planning" => Some(CampaignStatus::Planning),
            "ongoing" => Some(CampaignStatus::Ongoing),
            "completed" => Some(CampaignStatus::Completed),
            _ => None,
        }
    }
}

/// Status of an influencer inside a campaign's embedded roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfluencerStatus {
    Applied,
    Approved,
    Rejected,
    Completed,
}

impl InfluencerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InfluencerStatus::Applied => "applied",
            InfluencerStatus::Approved => "approved",
            InfluencerStatus::Rejected => "rejected",
            InfluencerStatus::Completed => "completed",
        }
    }
}

/// Delivery progress for an approved influencer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhaseProgress {
    #[serde(default)]
    pub content_submitted: bool,
    #[serde(default)]
    pub content_approved: bool,
    #[serde(default)]
    pub posted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignInfluencer {
    pub influencer_id: ObjectId,
    pub status: InfluencerStatus,
    #[serde(default)]
    pub phase: PhaseProgress,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_followers: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_followers: Option<u64>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub brand_id: ObjectId,
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub region: String,
    pub industry: String,
    #[serde(default)]
    pub requirements: Requirements,
    pub status: CampaignStatus,
    #[serde(default)]
    pub influencers: Vec<CampaignInfluencer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateCampaignRequest {
    pub title: String,
    pub description: String,
    pub budget: f64,
    pub region: String,
    pub industry: String,
    #[serde(default)]
    pub requirements: Requirements,
}

#[derive(Deserialize)]
pub struct UpdateCampaignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub region: Option<String>,
    pub industry: Option<String>,
    pub requirements: Option<Requirements>,
    pub status: Option<String>,
}

/// Query parameters shared by the campaign list views
#[derive(Debug, Deserialize)]
pub struct CampaignQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub region: Option<String>,
    pub industry: Option<String>,
    pub platform: Option<String>,
    /// `recent` (default) or `budget`
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Recent,
    Budget,
}

impl CampaignQuery {
    pub fn sort_key(&self) -> SortKey {
        match self.sort_by.as_deref() {
            Some("budget") => SortKey::Budget,
            _ => SortKey::Recent,
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// In-memory refinement of an already-fetched page: substring match on
/// region/industry/platform, then sort by recency or budget.
pub fn filter_and_sort(mut campaigns: Vec<Campaign>, query: &CampaignQuery) -> Vec<Campaign> {
    if let Some(region) = query.region.as_deref().filter(|s| !s.is_empty()) {
        campaigns.retain(|c| contains_ignore_case(&c.region, region));
    }
    if let Some(industry) = query.industry.as_deref().filter(|s| !s.is_empty()) {
        campaigns.retain(|c| contains_ignore_case(&c.industry, industry));
    }
    if let Some(platform) = query.platform.as_deref().filter(|s| !s.is_empty()) {
        campaigns.retain(|c| {
            c.requirements
                .platforms
                .iter()
                .any(|p| contains_ignore_case(p, platform))
        });
    }

    match query.sort_key() {
        SortKey::Recent => campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Budget => {
            campaigns.sort_by(|a, b| {
                b.budget
                    .partial_cmp(&a.budget)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }

    campaigns
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn campaign(title: &str, region: &str, industry: &str, platform: &str, budget: f64, age_days: i64) -> Campaign {
        Campaign {
            id: Some(ObjectId::new()),
            brand_id: ObjectId::new(),
            title: title.to_string(),
            description: String::new(),
            budget,
            region: region.to_string(),
            industry: industry.to_string(),
            requirements: Requirements {
                platforms: vec![platform.to_string()],
                ..Default::default()
            },
            status: CampaignStatus::Ongoing,
            influencers: Vec::new(),
            created_at: Utc::now() - Duration::days(age_days),
            updated_at: Utc::now(),
        }
    }

    fn query(region: Option<&str>, industry: Option<&str>, platform: Option<&str>, sort_by: Option<&str>) -> CampaignQuery {
        CampaignQuery {
            page: None,
            limit: None,
            region: region.map(String::from),
            industry: industry.map(String::from),
            platform: platform.map(String::from),
            sort_by: sort_by.map(String::from),
        }
    }

    #[test]
    fn region_filter_is_case_insensitive_substring() {
        let campaigns = vec![
            campaign("a", "Mumbai, India", "Fashion", "instagram", 100.0, 1),
            campaign("b", "Berlin", "Fashion", "instagram", 100.0, 1),
        ];
        let out = filter_and_sort(campaigns, &query(Some("mumbai"), None, None, None));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "a");
    }

    #[test]
    fn platform_filter_matches_requirements() {
        let campaigns = vec![
            campaign("ig", "X", "Y", "Instagram", 100.0, 1),
            campaign("yt", "X", "Y", "YouTube", 100.0, 1),
        ];
        let out = filter_and_sort(campaigns, &query(None, None, Some("youtube"), None));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "yt");
    }

    #[test]
    fn default_sort_is_most_recent_first() {
        let campaigns = vec![
            campaign("old", "X", "Y", "instagram", 100.0, 10),
            campaign("new", "X", "Y", "instagram", 100.0, 1),
        ];
        let out = filter_and_sort(campaigns, &query(None, None, None, None));
        assert_eq!(out[0].title, "new");
    }

    #[test]
    fn budget_sort_is_highest_first() {
        let campaigns = vec![
            campaign("small", "X", "Y", "instagram", 500.0, 1),
            campaign("big", "X", "Y", "instagram", 5000.0, 5),
        ];
        let out = filter_and_sort(campaigns, &query(None, None, None, Some("budget")));
        assert_eq!(out[0].title, "big");
    }

    #[test]
    fn combined_filters_stack() {
        let campaigns = vec![
            campaign("match", "Delhi", "Beauty", "instagram", 100.0, 1),
            campaign("wrong-industry", "Delhi", "Gaming", "instagram", 100.0, 1),
            campaign("wrong-region", "Pune", "Beauty", "instagram", 100.0, 1),
        ];
        let out = filter_and_sort(
            campaigns,
            &query(Some("delhi"), Some("beauty"), Some("insta"), None),
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].title, "match");
    }
}
