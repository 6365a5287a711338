use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::application::model::{ApplicationStatus, ApplyRequest, DecisionRequest, PayoutStatus, PayoutUpdateRequest};
use crate::application::service::ApplicationService;
use crate::campaign::service::CampaignService;
use crate::middleware::auth::require_role;
use crate::user::model::Role;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::model::PageQuery;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

pub async fn apply_to_campaign(
    application_service: web::Data<ApplicationService>,
    campaign_service: web::Data<CampaignService>,
    body: web::Json<ApplyRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let application_id = application_service
        .apply(&claims.id, body.into_inner(), campaign_service.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Application submitted successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "application_id": application_id.to_hex(),
    })))
}

pub async fn decide_application(
    application_service: web::Data<ApplicationService>,
    campaign_service: web::Data<CampaignService>,
    user_service: web::Data<UserService>,
    application_id: web::Path<String>,
    body: web::Json<DecisionRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Brand, Role::Agency])?;

    let decision = ApplicationStatus::parse(&body.status)
        .filter(|s| *s != ApplicationStatus::Pending)
        .ok_or_else(|| {
            CustomError::BadRequestError("Status must be accepted or rejected".to_string())
        })?;

    let application = application_service
        .decide(
            &claims.id,
            &application_id.into_inner(),
            decision,
            campaign_service.get_ref(),
            user_service.get_ref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Application updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "application": application,
    })))
}

pub async fn update_payout_status(
    application_service: web::Data<ApplicationService>,
    campaign_service: web::Data<CampaignService>,
    application_id: web::Path<String>,
    body: web::Json<PayoutUpdateRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Brand, Role::Agency, Role::Admin])?;

    let payout_status = PayoutStatus::parse(&body.payout_status)
        .ok_or_else(|| CustomError::BadRequestError("Invalid payout status".to_string()))?;

    let application = application_service
        .update_payout(
            &claims.id,
            &application_id.into_inner(),
            payout_status,
            campaign_service.get_ref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Payout status updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "application": application,
    })))
}

pub async fn campaign_applications(
    application_service: web::Data<ApplicationService>,
    campaign_service: web::Data<CampaignService>,
    campaign_id: web::Path<String>,
    query: web::Query<PageQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Brand, Role::Agency])?;
    let page = application_service
        .list_for_campaign(
            &claims.id,
            &campaign_id.into_inner(),
            campaign_service.get_ref(),
            &query,
        )
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Applications fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": page.data,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
    })))
}
