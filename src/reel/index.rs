use super::controller::my_reels;
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn reel_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reels")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::get().to(my_reels)),
    );
}
