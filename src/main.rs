use actix_web::http::StatusCode;
use actix_web::middleware::{ErrorHandlers, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, get, web};
use dotenv::dotenv;
use env_logger::Env;
use log::{info, warn};

mod admin;
mod application;
mod campaign;
mod database;
mod middleware;
mod otp;
mod public;
mod reel;
mod router;
mod social;
mod subscription;
mod user;
mod utils;
mod wallet;

use application::service::ApplicationService;
use campaign::service::CampaignService;
use database::RedisService;
use middleware::error_handler::handle_error;
use middleware::not_found::not_found;
use otp::service::OtpService;
use reel::service::ReelService;
use router::index::routes;
use serde_json::json;
use social::service::SocialService;
use subscription::service::{RazorpayConfig, SubscriptionService};
use user::service::UserService;
use wallet::service::KycService;

#[get("/")]
async fn default() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Influencer marketplace API",
        "httpStatusCode": StatusCode::OK.as_u16(),
        "service": std::env::var("SERVICE_NAME").unwrap_or_else(|_| "Unknown".to_string()),
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "localhost".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    info!("Starting server on http://{}:{}", host, port);

    let mongo_client = database::connect_to_mongo()
        .await
        .expect("Failed to connect to MongoDB");

    // Sessions, caching and rate limits degrade gracefully without Redis
    let redis_service = match database::connect_to_redis().await {
        Ok(client) => Some(web::Data::new(RedisService::new(&client))),
        Err(e) => {
            warn!("Redis unavailable, sessions fall back to JWT only: {}", e);
            None
        }
    };

    let otp_service = web::Data::new(OtpService::new(&mongo_client));
    let user_service = web::Data::new(UserService::new(&mongo_client));
    let campaign_service = web::Data::new(CampaignService::new(&mongo_client));
    let application_service = web::Data::new(ApplicationService::new(&mongo_client));
    let reel_service = web::Data::new(ReelService::new(&mongo_client));
    let social_service = web::Data::new(
        SocialService::new(&mongo_client).expect("Failed to initialize social service"),
    );
    let kyc_service = web::Data::new(KycService::new(&mongo_client));
    let razorpay_config = RazorpayConfig::from_env().expect("Razorpay configuration missing");
    let subscription_service = web::Data::new(SubscriptionService::new(
        &mongo_client,
        razorpay_config,
    ));

    // Daily analytics refresh
    let _scheduler = social::scheduler::start_scheduler(
        social_service.clone().into_inner(),
        reel_service.clone().into_inner(),
    )
    .await
    .expect("Failed to start scheduler");

    let redis_for_app = redis_service.clone();
    HttpServer::new(move || {
        let mut app = App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(mongo_client.clone()))
            .app_data(otp_service.clone())
            .app_data(user_service.clone())
            .app_data(campaign_service.clone())
            .app_data(application_service.clone())
            .app_data(reel_service.clone())
            .app_data(social_service.clone())
            .app_data(kyc_service.clone())
            .app_data(subscription_service.clone());

        if let Some(redis) = &redis_for_app {
            app = app.app_data(redis.clone());
        }

        app.configure(routes)
            .wrap(
                ErrorHandlers::new()
                    .handler(StatusCode::NOT_FOUND, not_found)
                    .default_handler(handle_error),
            )
            .service(default)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    info!("Server has stopped");

    Ok(())
}
