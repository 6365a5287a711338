use super::controller::{get_balance, get_my_kyc, submit_kyc};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn wallet_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/wallet")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/kyc", web::post().to(submit_kyc))
            .route("/kyc", web::get().to(get_my_kyc))
            .route("/balance", web::get().to(get_balance)),
    );
}
