use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;
use serde_json::json;

use crate::middleware::auth::require_role;
use crate::user::model::Role;
use crate::utils::error::CustomError;
use crate::utils::uploads::FileUpload;
use crate::wallet::model::KycDetails;
use crate::wallet::service::KycService;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

struct KycSubmission {
    pancard: Option<FileUpload>,
    aadhar: Option<FileUpload>,
    details: KycDetails,
}

/// Pull the two document files and the payout text fields out of the
/// multipart form.
async fn extract_submission(mut payload: Multipart) -> Result<KycSubmission, CustomError> {
    let mut submission = KycSubmission {
        pancard: None,
        aadhar: None,
        details: KycDetails::default(),
    };

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            CustomError::BadRequestError(format!("Error reading multipart field: {}", e))
        })?;

        let Some(content_disposition) = field.content_disposition() else {
            continue;
        };
        let field_name = content_disposition.get_name().unwrap_or("").to_string();
        let file_name = content_disposition.get_filename().map(|f| f.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                CustomError::BadRequestError(format!("Error reading field chunk: {}", e))
            })?;
            data.extend_from_slice(&chunk);
        }

        match field_name.as_str() {
            "pancard" | "aadhar" => {
                let file = FileUpload {
                    file_name: file_name.unwrap_or_else(|| "unknown".to_string()),
                    data,
                };
                if field_name == "pancard" {
                    submission.pancard = Some(file);
                } else {
                    submission.aadhar = Some(file);
                }
            }
            "account_holder" | "account_number" | "ifsc" | "upi_id" => {
                let value = String::from_utf8(data).map_err(|_| {
                    CustomError::BadRequestError(format!("Invalid value for {}", field_name))
                })?;
                let value = value.trim().to_string();
                if value.is_empty() {
                    continue;
                }
                match field_name.as_str() {
                    "account_holder" => submission.details.account_holder = Some(value),
                    "account_number" => submission.details.account_number = Some(value),
                    "ifsc" => submission.details.ifsc = Some(value),
                    "upi_id" => submission.details.upi_id = Some(value),
                    _ => unreachable!(),
                }
            }
            _ => continue,
        }
    }

    Ok(submission)
}

pub async fn submit_kyc(
    kyc_service: web::Data<KycService>,
    payload: Multipart,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;

    let submission = extract_submission(payload).await?;
    let pancard = submission
        .pancard
        .ok_or_else(|| CustomError::BadRequestError("Pancard document is required".to_string()))?;
    let aadhar = submission
        .aadhar
        .ok_or_else(|| CustomError::BadRequestError("Aadhar document is required".to_string()))?;

    let kyc = kyc_service
        .submit(&claims.id, pancard, aadhar, submission.details)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "KYC submitted successfully",
        "httpStatusCode": 201,
        "service": service_name(),
        "kyc": kyc,
    })))
}

pub async fn get_my_kyc(
    kyc_service: web::Data<KycService>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let kyc = kyc_service.find_for_user(&claims.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "KYC fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "kyc": kyc,
    })))
}

pub async fn get_balance(
    kyc_service: web::Data<KycService>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let balance = kyc_service.balance(&claims.id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Balance fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "balance": balance,
    })))
}
