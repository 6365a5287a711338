use actix_web::http::StatusCode;
use actix_web::middleware::from_fn;
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::admin::index::admin_routes;
use crate::application::index::application_routes;
use crate::campaign::index::campaign_routes;
use crate::middleware::rate_limit::global_rate_limit;
use crate::otp::index::otp_routes;
use crate::public::index::public_routes;
use crate::reel::index::reel_routes;
use crate::social::index::social_routes;
use crate::subscription::index::subscription_routes;
use crate::user::index::user_routes;
use crate::wallet::index::wallet_routes;

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "OK",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    }))
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(from_fn(global_rate_limit))
            .route("/health", web::get().to(health))
            .configure(otp_routes)
            .configure(user_routes)
            .configure(campaign_routes)
            .configure(application_routes)
            .configure(social_routes)
            .configure(reel_routes)
            .configure(wallet_routes)
            .configure(subscription_routes)
            .configure(public_routes)
            .configure(admin_routes),
    );
}
