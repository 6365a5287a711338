use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Delivery channel / purpose of an OTP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    Email,
    Whatsapp,
    Reset,
}

impl OtpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpKind::Email => "email",
            OtpKind::Whatsapp => "whatsapp",
            OtpKind::Reset => "reset",
        }
    }
}

/// Ephemeral verification record. Deleted when consumed by the final
/// registration step (or password reset).
#[derive(Debug, Serialize, Deserialize)]
pub struct Otp {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Email address or phone number the code was sent to
    pub identifier: String,
    pub kind: OtpKind,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Otp {
    /// A code is accepted only once and only before `expires_at`.
    pub fn accepts(&self, code: &str, now: DateTime<Utc>) -> bool {
        !self.verified && self.code == code && self.expires_at > now
    }
}

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub identifier: String,
    pub kind: OtpKind,
    /// Intended account role; brand/agency emails get the company-domain check
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub identifier: String,
    pub kind: OtpKind,
    pub code: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn otp(code: &str, verified: bool, expires_in_minutes: i64) -> Otp {
        Otp {
            id: None,
            identifier: "jane@acme.com".to_string(),
            kind: OtpKind::Email,
            code: code.to_string(),
            expires_at: Utc::now() + Duration::minutes(expires_in_minutes),
            verified,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn accepts_matching_unexpired_code() {
        assert!(otp("482910", false, 10).accepts("482910", Utc::now()));
    }

    #[test]
    fn rejects_wrong_code() {
        assert!(!otp("482910", false, 10).accepts("000000", Utc::now()));
    }

    #[test]
    fn rejects_expired_code() {
        assert!(!otp("482910", false, -1).accepts("482910", Utc::now()));
    }

    #[test]
    fn rejects_already_verified_code() {
        assert!(!otp("482910", true, 10).accepts("482910", Utc::now()));
    }
}
