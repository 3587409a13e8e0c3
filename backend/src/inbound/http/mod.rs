//! HTTP inbound adapter exposing the forum's REST endpoints.

pub mod admin;
pub(crate) mod auth;
pub mod error;
pub mod health;
pub mod profile;
pub mod replies;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub(crate) mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// Literal `/user/...` routes are registered before the numeric `/user/{id}`
/// patterns so they are matched first.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(users::login)
        .service(users::logout)
        .service(users::register)
        .service(users::take_notice)
        .service(profile::get_own_profile)
        .service(profile::update_profile)
        .service(profile::update_password)
        .service(profile::update_avatar)
        .service(profile::list_messages)
        .service(profile::list_user_content)
        .service(profile::list_user_content_by_kind)
        .service(replies::list_replies)
        .service(replies::create_reply)
        .service(replies::delete_reply)
        .service(admin::disable_user);
}
