use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::admin::model::{StatusDecisionRequest, UserListQuery};
use crate::middleware::auth::require_role;
use crate::user::model::{Role, UserStatus};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::model::PageQuery;
use crate::wallet::model::CreditRequest;
use crate::wallet::service::KycService;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

pub async fn list_users(
    user_service: web::Data<UserService>,
    query: web::Query<UserListQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    require_role(&req, &[Role::Admin])?;

    let role = query.role_filter().map_err(CustomError::BadRequestError)?;
    let status = query.status_filter().map_err(CustomError::BadRequestError)?;
    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };

    let users = user_service.list_users(role, status, &page).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Users fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "users": users,
    })))
}

/// Approve or reject an influencer account.
pub async fn decide_user_status(
    user_service: web::Data<UserService>,
    path: web::Path<String>,
    body: web::Json<StatusDecisionRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    require_role(&req, &[Role::Admin])?;

    let status = match body.status.as_str() {
        "approved" => UserStatus::Approved,
        "rejected" => UserStatus::Rejected,
        other => {
            return Err(CustomError::BadRequestError(format!(
                "Status must be approved or rejected, got: {}",
                other
            )));
        }
    };

    let user = user_service.set_status(&path.into_inner(), status).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User status updated successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "user": user,
    })))
}

pub async fn verify_kyc(
    kyc_service: web::Data<KycService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    require_role(&req, &[Role::Admin])?;

    let kyc = kyc_service.set_verified(&path.into_inner(), true).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "KYC verified successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "kyc": kyc,
    })))
}

pub async fn reject_kyc(
    kyc_service: web::Data<KycService>,
    path: web::Path<String>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    require_role(&req, &[Role::Admin])?;

    let kyc = kyc_service.set_verified(&path.into_inner(), false).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "KYC rejected",
        "httpStatusCode": 200,
        "service": service_name(),
        "kyc": kyc,
    })))
}

pub async fn credit_wallet(
    kyc_service: web::Data<KycService>,
    path: web::Path<String>,
    body: web::Json<CreditRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    require_role(&req, &[Role::Admin])?;

    let balance = kyc_service.credit(&path.into_inner(), body.amount).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Wallet credited successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "balance": balance,
    })))
}
