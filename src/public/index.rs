use super::controller::{public_media_kit, search_campaigns};
use crate::middleware::rate_limit::public_search_rate_limit;
use actix_web::{middleware::from_fn, web};

pub fn public_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/public")
            .route("/media-kit/{custom_url}", web::get().to(public_media_kit))
            .service(
                web::resource("/campaigns/search")
                    .wrap(from_fn(public_search_rate_limit))
                    .route(web::get().to(search_campaigns)),
            ),
    );
}
