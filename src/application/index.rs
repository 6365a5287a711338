use super::controller::{
    apply_to_campaign, campaign_applications, decide_application, update_payout_status,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn application_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/applications")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::post().to(apply_to_campaign))
            .route("/{id}/decision", web::put().to(decide_application))
            .route("/{id}/payout", web::put().to(update_payout_status))
            .route("/campaign/{id}", web::get().to(campaign_applications)),
    );
}
