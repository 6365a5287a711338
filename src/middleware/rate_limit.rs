use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{Error, web};

use crate::database::RedisService;
use crate::utils::error::CustomError;

/// Global API limit: 100 requests per 15 minutes per client IP
const GLOBAL_MAX_REQUESTS: u64 = 100;
const GLOBAL_WINDOW_SECONDS: u64 = 15 * 60;

/// Public search limit: 5 requests per hour per client IP
const SEARCH_MAX_REQUESTS: u64 = 5;
const SEARCH_WINDOW_SECONDS: u64 = 60 * 60;

fn client_ip(req: &ServiceRequest) -> String {
    req.connection_info()
        .realip_remote_addr()
        .unwrap_or("unknown")
        .to_string()
}

async fn check_limit(
    req: &ServiceRequest,
    bucket: &str,
    max_requests: u64,
    window_seconds: u64,
) -> Result<(), Error> {
    // Without Redis the limiter is a no-op
    let Some(redis_service) = req.app_data::<web::Data<RedisService>>() else {
        return Ok(());
    };

    let key = format!("{}:{}", bucket, client_ip(req));
    match redis_service
        .is_rate_limited(&key, max_requests, window_seconds)
        .await
    {
        Ok(true) => Err(CustomError::TooManyRequestsError(
            "Too many requests, please try again later".to_string(),
        )
        .into()),
        Ok(false) => Ok(()),
        Err(e) => {
            // Redis failure should not take the API down
            log::warn!("Rate limiter unavailable: {}", e);
            Ok(())
        }
    }
}

pub async fn global_rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    check_limit(&req, "global", GLOBAL_MAX_REQUESTS, GLOBAL_WINDOW_SECONDS).await?;
    next.call(req).await
}

pub async fn public_search_rate_limit(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    check_limit(&req, "search", SEARCH_MAX_REQUESTS, SEARCH_WINDOW_SECONDS).await?;
    next.call(req).await
}
