use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::{authenticated_claims, require_role};
use crate::subscription::model::{CreateOrderRequest, CreatePlanRequest, VerifyPaymentRequest};
use crate::subscription::service::SubscriptionService;
use crate::user::model::Role;
use crate::utils::error::CustomError;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

pub async fn list_plans(
    subscription_service: web::Data<SubscriptionService>,
) -> Result<HttpResponse, CustomError> {
    let plans = subscription_service.list_plans().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Plans fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "plans": plans,
    })))
}

pub async fn create_plan(
    subscription_service: web::Data<SubscriptionService>,
    body: web::Json<CreatePlanRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    require_role(&req, &[Role::Admin])?;
    let plan = subscription_service.create_plan(body.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Plan created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "plan": plan,
    })))
}

pub async fn create_order(
    subscription_service: web::Data<SubscriptionService>,
    body: web::Json<CreateOrderRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Brand, Role::Agency])?;
    let (subscription, order) = subscription_service
        .create_order(&claims.id, &body.plan_id)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Order created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "subscription": subscription,
        "order": {
            "id": order.id,
            "amount": order.amount,
            "currency": order.currency,
            "status": order.status,
        },
    })))
}

pub async fn verify_payment(
    subscription_service: web::Data<SubscriptionService>,
    body: web::Json<VerifyPaymentRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = authenticated_claims(&req)?;
    let subscription = subscription_service
        .verify_payment(
            &claims.id,
            &body.razorpay_order_id,
            &body.razorpay_payment_id,
            &body.razorpay_signature,
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Payment verified successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "subscription": subscription,
    })))
}

pub async fn my_subscription(
    subscription_service: web::Data<SubscriptionService>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = authenticated_claims(&req)?;
    let subscription = subscription_service.my_subscription(&claims.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Subscription fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "subscription": subscription,
    })))
}

/// Razorpay calls this endpoint directly. Authentication is the body
/// signature, not a bearer token.
pub async fn razorpay_webhook(
    subscription_service: web::Data<SubscriptionService>,
    body: web::Bytes,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let signature = req
        .headers()
        .get("X-Razorpay-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            CustomError::BadRequestError("Missing X-Razorpay-Signature header".to_string())
        })?;

    subscription_service.handle_webhook(&body, signature).await?;

    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}
