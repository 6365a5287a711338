use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::require_role;
use crate::reel::service::ReelService;
use crate::social::model::{ConnectRequest, SocialPlatform};
use crate::social::service::SocialService;
use crate::user::model::Role;
use crate::user::service::UserService;
use crate::utils::error::CustomError;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

fn parse_platform(platform: &str) -> Result<SocialPlatform, CustomError> {
    SocialPlatform::parse(platform)
        .ok_or_else(|| CustomError::BadRequestError("Unsupported platform".to_string()))
}

/// OAuth callback: exchange the authorization code and store the
/// connection on the caller's account.
pub async fn connect_platform(
    social_service: web::Data<SocialService>,
    platform: web::Path<String>,
    body: web::Json<ConnectRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let platform = parse_platform(&platform)?;

    let connection = social_service
        .connect(&claims.id, platform, &body.code)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account connected successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "platform": connection.platform,
        "account_username": connection.account_username,
    })))
}

/// Re-fetch profile and media, recompute the aggregates now
pub async fn verify_platform(
    social_service: web::Data<SocialService>,
    user_service: web::Data<UserService>,
    reel_service: web::Data<ReelService>,
    platform: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let platform = parse_platform(&platform)?;

    let user = user_service.find_by_id(&claims.id).await?;
    let metrics = social_service
        .refresh_platform(&user, platform, reel_service.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Metrics refreshed successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "metrics": metrics,
    })))
}

pub async fn disconnect_platform(
    social_service: web::Data<SocialService>,
    platform: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let platform = parse_platform(&platform)?;

    social_service.disconnect(&claims.id, platform).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Account disconnected successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}
