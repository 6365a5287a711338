use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::campaign::service::CampaignService;
use crate::database::RedisService;
use crate::public::model::{PublicMediaKit, SearchQuery, media_kit_cache_key};
use crate::user::service::UserService;
use crate::utils::error::CustomError;
use crate::utils::model::PageQuery;

fn service_name() -> String {
    std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string())
}

const MEDIA_KIT_CACHE_SECONDS: u64 = 300;

/// Public media kit page, looked up by custom URL slug. Cached in Redis
/// for a few minutes since these pages get shared around.
pub async fn public_media_kit(
    user_service: web::Data<UserService>,
    redis_service: Option<web::Data<RedisService>>,
    path: web::Path<String>,
) -> Result<HttpResponse, CustomError> {
    let slug = path.into_inner().to_lowercase();
    let cache_key = media_kit_cache_key(&slug);

    if let Some(redis) = &redis_service {
        if let Ok(Some(cached)) = redis.cache_get_json::<PublicMediaKit>(&cache_key).await {
            return Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Media kit fetched successfully",
                "httpStatusCode": 200,
                "service": service_name(),
                "mediaKit": cached,
            })));
        }
    }

    let user = user_service.find_by_custom_url(&slug).await?;
    let kit = PublicMediaKit::from_user(user)
        .ok_or_else(|| CustomError::NotFoundError("Media kit not found".to_string()))?;

    if let Some(redis) = &redis_service {
        if let Err(e) = redis
            .cache_set_json(&cache_key, &kit, MEDIA_KIT_CACHE_SECONDS)
            .await
        {
            log::warn!("Failed to cache media kit {}: {}", slug, e);
        }
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Media kit fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "mediaKit": kit,
    })))
}

pub async fn search_campaigns(
    campaign_service: web::Data<CampaignService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, CustomError> {
    let term = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CustomError::BadRequestError("Search term 'q' is required".to_string())
        })?;

    let page = PageQuery {
        page: query.page,
        limit: query.limit,
    };
    let results = campaign_service.search_public(term, &page).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Campaigns fetched successfully",
        "httpStatusCode": 200,
        "service": service_name(),
        "campaigns": results,
    })))
}
