use super::controller::{
    create_order, create_plan, list_plans, my_subscription, razorpay_webhook, verify_payment,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn subscription_routes(cfg: &mut web::ServiceConfig) {
    // Webhook stays outside bearer auth, Razorpay signs the body instead.
    cfg.route(
        "/subscriptions/webhook",
        web::post().to(razorpay_webhook),
    );

    cfg.service(
        web::scope("/subscriptions")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/plans", web::get().to(list_plans))
            .route("/plans", web::post().to(create_plan))
            .route("/order", web::post().to(create_order))
            .route("/verify", web::post().to(verify_payment))
            .route("/me", web::get().to(my_subscription)),
    );
}
