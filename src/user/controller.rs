use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::database::RedisService;
use crate::middleware::auth::{authenticated_claims, invalidate_session, require_role};
use crate::otp::service::OtpService;
use crate::user::model::{
    ForgotPasswordRequest, MediaKitRequest, RegisterRequest, ResetPasswordRequest, Role,
    UpdateProfileRequest, UserView,
};
use crate::public::model::media_kit_cache_key;
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::model::LoginRequest;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

pub async fn register_user(
    user_service: web::Data<UserService>,
    otp_service: web::Data<OtpService>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, CustomError> {
    let user_id = user_service
        .register(body.into_inner(), otp_service.get_ref())
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User created successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "user_id": user_id.to_hex(),
    })))
}

pub async fn login_user(
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, CustomError> {
    let redis = redis_service.as_ref().map(|d| d.get_ref());
    let (token, user) = user_service
        .login(&body.email, &body.password, redis)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "httpStatusCode": 200,
        "service": service_name(),
        "token": token,
        "user": user,
    })))
}

pub async fn logout_user(
    redis_service: Option<web::Data<RedisService>>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = authenticated_claims(&req)?;

    if let Some(redis) = redis_service {
        invalidate_session(&claims.id, redis.get_ref()).await?;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logged out successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

pub async fn forgot_password(
    user_service: web::Data<UserService>,
    otp_service: web::Data<OtpService>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    user_service
        .forgot_password(&body.email, otp_service.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password reset code sent",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

pub async fn reset_password(
    user_service: web::Data<UserService>,
    otp_service: web::Data<OtpService>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, CustomError> {
    user_service
        .reset_password(&body.email, &body.code, &body.new_password, otp_service.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
    })))
}

pub async fn get_me(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = authenticated_claims(&req)?;
    let user = user_service.find_by_id(&claims.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": UserView::from(user),
    })))
}

pub async fn update_profile(
    user_service: web::Data<UserService>,
    body: web::Json<UpdateProfileRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = authenticated_claims(&req)?;
    let user = user_service
        .update_profile(&claims.id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Profile updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": user,
    })))
}

pub async fn get_media_kit(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let user = user_service.find_by_id(&claims.id).await?;

    match user.media_kit {
        Some(media_kit) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Media kit fetched successfully",
            "httpStatusCode": 200,
            "service": service_name(),
            "media_kit": media_kit,
        }))),
        None => Err(CustomError::NotFoundError(
            "Media kit not set up yet".to_string(),
        )),
    }
}

pub async fn update_media_kit(
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    body: web::Json<MediaKitRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;

    let previous_slug = user_service
        .find_by_id(&claims.id)
        .await?
        .media_kit
        .and_then(|kit| kit.custom_url);

    let media_kit = user_service
        .update_media_kit(&claims.id, body.into_inner())
        .await?;

    // The public page is cached; drop both the old and new slug so a
    // rename does not keep serving the stale entry
    if let Some(redis) = &redis_service {
        for slug in [previous_slug.as_deref(), media_kit.custom_url.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = redis.cache_delete(&media_kit_cache_key(slug)).await {
                log::warn!("Failed to invalidate media kit cache for {}: {}", slug, e);
            }
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Media kit updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "media_kit": media_kit,
    })))
}
