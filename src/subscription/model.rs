use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanInterval {
    Monthly,
    Yearly,
}

/// Pricing tier
#[derive(Debug, Serialize, Deserialize)]
pub struct Plan {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    /// Price in rupees
    pub price: f64,
    pub interval: PlanInterval,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_plan_id: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Created,
    Active,
    Failed,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Created => "created",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Failed => "failed",
        }
    }
}

/// Purchase record linked to Razorpay identifiers
#[derive(Debug, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub plan_id: ObjectId,
    pub razorpay_order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razorpay_payment_id: Option<String>,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreatePlanRequest {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub interval: PlanInterval,
    #[serde(default)]
    pub razorpay_plan_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub plan_id: String,
}

#[derive(Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Deserialize)]
pub struct RazorpayOrderResponse {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    pub status: String,
}

// ============================================
// Signature verification
// ============================================

fn hmac_sha256_hex(payload: &[u8], secret: &str) -> String {
    // HMAC accepts keys of any length
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Checkout signature: HMAC-SHA256 over "order_id|payment_id"
pub fn checkout_signature(order_id: &str, payment_id: &str, secret: &str) -> String {
    hmac_sha256_hex(format!("{}|{}", order_id, payment_id).as_bytes(), secret)
}

pub fn verify_checkout_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    secret: &str,
) -> bool {
    checkout_signature(order_id, payment_id, secret) == signature.to_lowercase()
}

/// Webhook signature: HMAC-SHA256 over the raw request body
pub fn verify_webhook_signature(body: &[u8], signature: &str, secret: &str) -> bool {
    hmac_sha256_hex(body, secret) == signature.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_signature_roundtrip() {
        let sig = checkout_signature("order_ABC123", "pay_XYZ789", "test_secret");
        assert!(verify_checkout_signature(
            "order_ABC123",
            "pay_XYZ789",
            &sig,
            "test_secret"
        ));
    }

    #[test]
    fn tampered_payment_id_fails() {
        let sig = checkout_signature("order_ABC123", "pay_XYZ789", "test_secret");
        assert!(!verify_checkout_signature(
            "order_ABC123",
            "pay_other",
            &sig,
            "test_secret"
        ));
    }

    #[test]
    fn wrong_secret_fails() {
        let sig = checkout_signature("order_ABC123", "pay_XYZ789", "test_secret");
        assert!(!verify_checkout_signature(
            "order_ABC123",
            "pay_XYZ789",
            &sig,
            "other_secret"
        ));
    }

    #[test]
    fn signature_is_hex_and_case_insensitive() {
        let sig = checkout_signature("o", "p", "s");
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(verify_checkout_signature("o", "p", &sig.to_uppercase(), "s"));
    }

    #[test]
    fn webhook_signature_over_raw_body() {
        let body = br#"{"event":"payment.captured"}"#;
        let sig = hmac_sha256_hex(body, "webhook_secret");
        assert!(verify_webhook_signature(body, &sig, "webhook_secret"));
        assert!(!verify_webhook_signature(b"{}", &sig, "webhook_secret"));
    }
}
