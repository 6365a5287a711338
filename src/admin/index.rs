use super::controller::{credit_wallet, decide_user_status, list_users, reject_kyc, verify_kyc};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/users", web::get().to(list_users))
            .route("/users/{id}/status", web::put().to(decide_user_status))
            .route("/users/{id}/kyc/verify", web::put().to(verify_kyc))
            .route("/users/{id}/kyc/reject", web::put().to(reject_kyc))
            .route("/users/{id}/wallet/credit", web::post().to(credit_wallet)),
    );
}
