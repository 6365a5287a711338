use super::controller::{connect_platform, disconnect_platform, verify_platform};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn social_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/social")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/{platform}/connect", web::post().to(connect_platform))
            .route("/{platform}/verify", web::post().to(verify_platform))
            .route("/{platform}", web::delete().to(disconnect_platform)),
    );
}
