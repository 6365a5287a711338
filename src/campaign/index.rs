use super::controller::{
    applied_campaigns, close_campaign, create_campaign, explore_campaigns, get_campaign,
    my_campaigns, update_campaign, update_phase,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn campaign_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/campaigns")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("", web::post().to(create_campaign))
            .route("/my", web::get().to(my_campaigns))
            .route("/explore", web::get().to(explore_campaigns))
            .route("/applied", web::get().to(applied_campaigns))
            .route("/{id}", web::get().to(get_campaign))
            .route("/{id}", web::put().to(update_campaign))
            .route("/{id}/close", web::post().to(close_campaign))
            .route(
                "/{id}/influencers/{influencer_id}/phase",
                web::put().to(update_phase),
            ),
    );
}
