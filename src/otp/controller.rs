use actix_web::{HttpResponse, web};

use crate::otp::model::{SendOtpRequest, VerifyOtpRequest};
use crate::otp::service::OtpService;
use crate::user::model::Role;
use crate::utils::error::CustomError;

pub async fn send_otp(
    otp_service: web::Data<OtpService>,
    body: web::Json<SendOtpRequest>,
) -> Result<HttpResponse, CustomError> {
    let role = body.role.as_deref().and_then(Role::parse);

    otp_service
        .request_otp(&body.identifier, body.kind, role.as_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "OTP sent successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    })))
}

pub async fn verify_otp(
    otp_service: web::Data<OtpService>,
    body: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse, CustomError> {
    otp_service
        .verify_otp(&body.identifier, body.kind, &body.code)
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "message": "OTP verified successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    })))
}
