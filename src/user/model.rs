use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::social::model::{PlatformMetrics, SocialConnection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Brand,
    Influencer,
    Talentpartner,
    Agency,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Brand => "brand",
            Role::Influencer => "influencer",
            Role::Talentpartner => "talentpartner",
            Role::Agency => "agency",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "brand" => Some(Role::Brand),
            "influencer" => Some(Role::Influencer),
            "talentpartner" => Some(Role::Talentpartner),
            "agency" => Some(Role::Agency),
            _ => None,
        }
    }

    /// Influencer accounts wait for admin approval; everyone else is
    /// usable immediately.
    pub fn initial_status(&self) -> UserStatus {
        match self {
            Role::Influencer => UserStatus::Pending,
            _ => UserStatus::Approved,
        }
    }

    /// Brand and agency signups must use a company email address
    pub fn requires_business_email(&self) -> bool {
        matches!(self, Role::Brand | Role::Agency)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pincode: String,
}

/// Influencer rate card for direct collaborations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commercials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reel_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaKitLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaboration {
    pub brand_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Influencer-authored public pitch page
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaKit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default)]
    pub links: Vec<MediaKitLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rates: Option<Commercials>,
    #[serde(default)]
    pub collaborations: Vec<Collaboration>,
    /// Public slug; unique across users when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub role: Role,
    pub status: UserStatus,
    pub terms_accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercials: Option<Commercials>,
    #[serde(default)]
    pub social_connections: Vec<SocialConnection>,
    #[serde(default)]
    pub platform_metrics: Vec<PlatformMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kit: Option<MediaKit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User representation safe to return to clients: no password hash,
/// no OAuth token material.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub role: Role,
    pub status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commercials: Option<Commercials>,
    pub connected_platforms: Vec<String>,
    pub platform_metrics: Vec<PlatformMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kit: Option<MediaKit>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: user.name,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            status: user.status,
            address: user.address,
            bio: user.bio,
            categories: user.categories,
            commercials: user.commercials,
            connected_platforms: user
                .social_connections
                .iter()
                .map(|c| c.platform.as_str().to_string())
                .collect(),
            platform_metrics: user.platform_metrics,
            media_kit: user.media_kit,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub address: Option<Address>,
    pub categories: Option<Vec<String>>,
    pub commercials: Option<Commercials>,
}

#[derive(Deserialize)]
pub struct MediaKitRequest {
    pub about_me: Option<String>,
    pub contact: Option<String>,
    pub links: Option<Vec<MediaKitLink>>,
    pub rates: Option<Commercials>,
    pub collaborations: Option<Vec<Collaboration>>,
    pub custom_url: Option<String>,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_status_is_role_conditional() {
        assert_eq!(Role::Influencer.initial_status(), UserStatus::Pending);
        assert_eq!(Role::Brand.initial_status(), UserStatus::Approved);
        assert_eq!(Role::Agency.initial_status(), UserStatus::Approved);
        assert_eq!(Role::Talentpartner.initial_status(), UserStatus::Approved);
    }

    #[test]
    fn business_email_required_for_brand_and_agency_only() {
        assert!(Role::Brand.requires_business_email());
        assert!(Role::Agency.requires_business_email());
        assert!(!Role::Influencer.requires_business_email());
        assert!(!Role::Talentpartner.requires_business_email());
        assert!(!Role::Admin.requires_business_email());
    }

    #[test]
    fn role_parse_roundtrip() {
        for role in [
            Role::Admin,
            Role::Brand,
            Role::Influencer,
            Role::Talentpartner,
            Role::Agency,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }
}
