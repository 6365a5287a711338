use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::application::service::ApplicationService;
use crate::campaign::model::{
    CampaignQuery, CreateCampaignRequest, PhaseProgress, UpdateCampaignRequest,
};
use crate::campaign::service::CampaignService;
use crate::middleware::auth::require_role;
use crate::user::model::Role;
use crate::utils::error::CustomError;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

const CAMPAIGN_OWNERS: &[Role] = &[Role::Brand, Role::Agency];

pub async fn create_campaign(
    campaign_service: web::Data<CampaignService>,
    body: web::Json<CreateCampaignRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, CAMPAIGN_OWNERS)?;
    let campaign = campaign_service.create(&claims.id, body.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Campaign created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "campaign": campaign,
    })))
}

pub async fn update_campaign(
    campaign_service: web::Data<CampaignService>,
    campaign_id: web::Path<String>,
    body: web::Json<UpdateCampaignRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, CAMPAIGN_OWNERS)?;
    let campaign = campaign_service
        .update(&campaign_id.into_inner(), &claims.id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaign updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "campaign": campaign,
    })))
}

pub async fn close_campaign(
    campaign_service: web::Data<CampaignService>,
    campaign_id: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, CAMPAIGN_OWNERS)?;
    let campaign = campaign_service
        .close(&campaign_id.into_inner(), &claims.id)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaign closed successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "campaign": campaign,
    })))
}

pub async fn get_campaign(
    campaign_service: web::Data<CampaignService>,
    campaign_id: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let campaign = campaign_service.get(&campaign_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaign fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "campaign": campaign,
    })))
}

/// Brand view: campaigns I authored
pub async fn my_campaigns(
    campaign_service: web::Data<CampaignService>,
    query: web::Query<CampaignQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, CAMPAIGN_OWNERS)?;
    let page = campaign_service.my_campaigns(&claims.id, &query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaigns fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": page.data,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
    })))
}

/// Influencer view: open campaigns I have not applied to
pub async fn explore_campaigns(
    campaign_service: web::Data<CampaignService>,
    application_service: web::Data<ApplicationService>,
    query: web::Query<CampaignQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let applied = application_service
        .campaign_ids_for_influencer(&claims.id)
        .await?;
    let page = campaign_service.explore_campaigns(applied, &query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaigns fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": page.data,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
    })))
}

/// Influencer view: campaigns I applied to, with application status
pub async fn applied_campaigns(
    campaign_service: web::Data<CampaignService>,
    application_service: web::Data<ApplicationService>,
    query: web::Query<CampaignQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let page = application_service
        .applied_campaigns(&claims.id, campaign_service.get_ref(), &query)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaigns fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "data": page.data,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
    })))
}

pub async fn update_phase(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<(String, String)>,
    body: web::Json<PhaseProgress>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, CAMPAIGN_OWNERS)?;
    let (campaign_id, influencer_id) = path.into_inner();

    campaign_service
        .update_phase(&campaign_id, &claims.id, &influencer_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Phase updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}
