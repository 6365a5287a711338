use super::controller::{
    forgot_password, get_me, get_media_kit, login_user, logout_user, register_user,
    reset_password, update_media_kit, update_profile,
};
use crate::middleware::auth::verify_token;
use actix_web::web;
use actix_web_httpauth::middleware::HttpAuthentication;

pub fn user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth/user")
            .route("/register", web::post().to(register_user))
            .route("/login", web::post().to(login_user))
            .route("/forgot-password", web::post().to(forgot_password))
            .route("/reset-password", web::post().to(reset_password))
            .service(
                web::scope("")
                    .wrap(HttpAuthentication::bearer(verify_token))
                    .route("/logout", web::post().to(logout_user)),
            ),
    );
    cfg.service(
        web::scope("/users")
            .wrap(HttpAuthentication::bearer(verify_token))
            .route("/me", web::get().to(get_me))
            .route("/profile", web::put().to(update_profile))
            .route("/media-kit", web::get().to(get_media_kit))
            .route("/media-kit", web::put().to(update_media_kit)),
    );
}
