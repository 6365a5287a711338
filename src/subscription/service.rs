use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection};
use uuid::Uuid;

use crate::database::db::DB_NAME;
use crate::subscription::model::{
    CreatePlanRequest, Plan, RazorpayOrderResponse, Subscription, SubscriptionStatus,
    verify_checkout_signature, verify_webhook_signature,
};
use crate::utils::error::CustomError;

const RAZORPAY_ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";

#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
}

impl RazorpayConfig {
    pub fn from_env() -> Result<Self, String> {
        Ok(RazorpayConfig {
            key_id: std::env::var("RAZORPAY_KEY_ID")
                .map_err(|_| "RAZORPAY_KEY_ID must be set".to_string())?,
            key_secret: std::env::var("RAZORPAY_KEY_SECRET")
                .map_err(|_| "RAZORPAY_KEY_SECRET must be set".to_string())?,
            webhook_secret: std::env::var("RAZORPAY_WEBHOOK_SECRET")
                .map_err(|_| "RAZORPAY_WEBHOOK_SECRET must be set".to_string())?,
        })
    }
}

pub struct SubscriptionService {
    plans: Collection<Plan>,
    subscriptions: Collection<Subscription>,
    http: reqwest::Client,
    config: RazorpayConfig,
}

impl SubscriptionService {
    pub fn new(client: &Client, config: RazorpayConfig) -> Self {
        let db = client.database(DB_NAME);
        SubscriptionService {
            plans: db.collection::<Plan>("plans"),
            subscriptions: db.collection::<Subscription>("subscriptions"),
            http: reqwest::Client::new(),
            config,
        }
    }

    pub async fn create_plan(&self, request: CreatePlanRequest) -> Result<Plan, CustomError> {
        if request.price <= 0.0 {
            return Err(CustomError::ValidationError(
                "Plan price must be positive".to_string(),
            ));
        }

        let plan = Plan {
            id: None,
            name: request.name,
            description: request.description,
            price: request.price,
            interval: request.interval,
            razorpay_plan_id: request.razorpay_plan_id,
            active: true,
            created_at: Utc::now(),
        };

        let result = self
            .plans
            .insert_one(plan)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        let inserted_id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| CustomError::InternalServerError("Invalid inserted ID".to_string()))?;

        self.plans
            .find_one(doc! { "_id": inserted_id })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Plan not found".to_string()))
    }

    pub async fn list_plans(&self) -> Result<Vec<Plan>, CustomError> {
        let cursor = self
            .plans
            .find(doc! { "active": true })
            .sort(doc! { "price": 1 })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))
    }

    async fn find_plan(&self, plan_id: &str) -> Result<Plan, CustomError> {
        let oid = ObjectId::parse_str(plan_id)
            .map_err(|_| CustomError::BadRequestError("Invalid plan ID".to_string()))?;

        self.plans
            .find_one(doc! { "_id": oid, "active": true })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Plan not found".to_string()))
    }

    /// Create a Razorpay order for the plan and record a subscription in
    /// the created state. Amount is sent in paise.
    pub async fn create_order(
        &self,
        user_id: &str,
        plan_id: &str,
    ) -> Result<(Subscription, RazorpayOrderResponse), CustomError> {
        let user_oid = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;
        let plan = self.find_plan(plan_id).await?;
        let plan_oid = plan
            .id
            .ok_or_else(|| CustomError::InternalServerError("Plan has no ID".to_string()))?;

        let amount_paise = (plan.price * 100.0).round() as u64;
        let receipt = format!("rcpt_{}", Uuid::new_v4().simple());

        let response = self
            .http
            .post(RAZORPAY_ORDERS_URL)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&serde_json::json!({
                "amount": amount_paise,
                "currency": "INR",
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| {
                CustomError::InternalServerError(format!("Razorpay request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Razorpay order creation failed ({}): {}", status, body);
            return Err(CustomError::InternalServerError(
                "Payment provider rejected the order".to_string(),
            ));
        }

        let order: RazorpayOrderResponse = response.json().await.map_err(|e| {
            CustomError::InternalServerError(format!("Invalid Razorpay response: {}", e))
        })?;

        let subscription = Subscription {
            id: None,
            user_id: user_oid,
            plan_id: plan_oid,
            razorpay_order_id: order.id.clone(),
            razorpay_payment_id: None,
            status: SubscriptionStatus::Created,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.subscriptions
            .insert_one(&subscription)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?;

        Ok((subscription, order))
    }

    /// Verify the checkout callback signature and activate the
    /// subscription. Mismatch marks the record failed.
    pub async fn verify_payment(
        &self,
        user_id: &str,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<Subscription, CustomError> {
        let user_oid = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        let filter = doc! { "razorpay_order_id": order_id, "user_id": user_oid };
        self.subscriptions
            .find_one(filter.clone())
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("Subscription not found".to_string()))?;

        if !verify_checkout_signature(order_id, payment_id, signature, &self.config.key_secret) {
            self.mark_status(order_id, SubscriptionStatus::Failed, None)
                .await?;
            return Err(CustomError::BadRequestError(
                "Payment signature verification failed".to_string(),
            ));
        }

        self.mark_status(order_id, SubscriptionStatus::Active, Some(payment_id))
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Subscription not found".to_string()))
    }

    /// Process a Razorpay webhook. The signature covers the raw body, so
    /// verification must happen before JSON parsing.
    pub async fn handle_webhook(&self, body: &[u8], signature: &str) -> Result<(), CustomError> {
        if !verify_webhook_signature(body, signature, &self.config.webhook_secret) {
            return Err(CustomError::BadRequestError(
                "Invalid webhook signature".to_string(),
            ));
        }

        let event: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| CustomError::BadRequestError("Invalid webhook payload".to_string()))?;

        let event_name = event["event"].as_str().unwrap_or("");
        match event_name {
            "payment.captured" => {
                let payment = &event["payload"]["payment"]["entity"];
                let order_id = payment["order_id"].as_str().unwrap_or("");
                let payment_id = payment["id"].as_str();
                if order_id.is_empty() {
                    return Err(CustomError::BadRequestError(
                        "Webhook payload missing order_id".to_string(),
                    ));
                }
                self.mark_status(order_id, SubscriptionStatus::Active, payment_id)
                    .await?;
            }
            "payment.failed" => {
                let order_id = event["payload"]["payment"]["entity"]["order_id"]
                    .as_str()
                    .unwrap_or("");
                if !order_id.is_empty() {
                    self.mark_status(order_id, SubscriptionStatus::Failed, None)
                        .await?;
                }
            }
            other => {
                log::info!("Ignoring Razorpay webhook event: {}", other);
            }
        }

        Ok(())
    }

    async fn mark_status(
        &self,
        order_id: &str,
        status: SubscriptionStatus,
        payment_id: Option<&str>,
    ) -> Result<Option<Subscription>, CustomError> {
        let mut set = doc! {
            "status": status.as_str(),
            "updated_at": Utc::now().to_rfc3339(),
        };
        if let Some(payment_id) = payment_id {
            set.insert("razorpay_payment_id", payment_id);
        }

        self.subscriptions
            .find_one_and_update(doc! { "razorpay_order_id": order_id }, doc! { "$set": set })
            .return_document(mongodb::options::ReturnDocument::After)
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))
    }

    pub async fn my_subscription(&self, user_id: &str) -> Result<Subscription, CustomError> {
        let user_oid = ObjectId::parse_str(user_id)
            .map_err(|_| CustomError::BadRequestError("Invalid user ID".to_string()))?;

        self.subscriptions
            .find_one(doc! { "user_id": user_oid, "status": "active" })
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| CustomError::InternalServerError(e.to_string()))?
            .ok_or_else(|| CustomError::NotFoundError("No active subscription".to_string()))
    }
}
