use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::json;

use crate::middleware::auth::require_role;
use crate::reel::service::ReelService;
use crate::user::model::Role;
use crate::utils::error::CustomError;
use crate::utils::model::PageQuery;

pub async fn my_reels(
    reel_service: web::Data<ReelService>,
    query: web::Query<PageQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, CustomError> {
    let claims = require_role(&req, &[Role::Influencer])?;
    let page = reel_service.list_for_user(&claims.id, &query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Reels fetched successfully",
        "httpStatusCode": 200,
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
        "data": page.data,
        "page": page.page,
        "limit": page.limit,
        "total": page.total,
    })))
}
