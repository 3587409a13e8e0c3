//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects every `/api/v1` handler plus the health probes. Domain
//! payloads derive `ToSchema` directly, so response bodies are picked up from
//! the handler annotations; the list below only names schemas that no path
//! references on its own.
//!
//! The document is served by Swagger UI in debug builds and printed by
//! `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{ContentSort, Error, ErrorCode, Gender, NoticeKind, UserStatus};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the forum API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Focus forum API",
        description = "Accounts, profiles, replies and moderation for the Focus forum."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::register,
        crate::inbound::http::users::take_notice,
        crate::inbound::http::profile::get_own_profile,
        crate::inbound::http::profile::update_profile,
        crate::inbound::http::profile::update_password,
        crate::inbound::http::profile::update_avatar,
        crate::inbound::http::profile::list_messages,
        crate::inbound::http::profile::list_user_content,
        crate::inbound::http::profile::list_user_content_by_kind,
        crate::inbound::http::replies::list_replies,
        crate::inbound::http::replies::create_reply,
        crate::inbound::http::replies::delete_reply,
        crate::inbound::http::admin::disable_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(Error, ErrorCode, Gender, UserStatus, ContentSort, NoticeKind)),
    tags(
        (name = "users", description = "Sign-in, sign-out and registration"),
        (name = "profile", description = "Profiles, passwords, avatars and user listings"),
        (name = "replies", description = "Replies to forum content"),
        (name = "admin", description = "Moderation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
