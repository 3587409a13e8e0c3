//! Sign-in, sign-out and registration handlers.
//!
//! ```text
//! POST /api/v1/login    {"passport":"alice","password":"secret"}
//! POST /api/v1/logout
//! POST /api/v1/register {"passport":"alice","password":"secret","nickname":"Alice"}
//! GET  /api/v1/notice
//! ```

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, Notice, Registration, RequestContext, SessionUser};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::auth_error;

/// Where browsers are sent after signing out.
pub const LOGOUT_REDIRECT: &str = "/login";

/// Login form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "alice")]
    pub passport: String,
    #[schema(example = "secret")]
    pub password: String,
}

/// Signed-in user plus the page they were headed for before being asked to
/// log in.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// The now signed-in user.
    pub user: SessionUser,
    /// Path recorded by the last 401, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
}

/// Registration form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub passport: String,
    #[schema(example = "secret")]
    pub password: String,
    #[schema(example = "Alice")]
    pub nickname: String,
}

/// Authenticate and cache the user in the session.
///
/// Unknown accounts, wrong passwords and disabled accounts all produce the
/// same `401` body.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid account or password", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security(())
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let LoginRequest { passport, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&passport, &password).map_err(auth_error)?;
    let ctx = RequestContext::new(&session);
    let user = state.accounts.login(&ctx, &credentials).await?;

    let store = ctx.session();
    let referer = store.get_login_referer()?;
    store.remove_login_referer()?;
    Ok(web::Json(LoginResponse {
        user,
        referer: (!referer.is_empty()).then_some(referer),
    }))
}

/// Drop the session user and redirect to the login page.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses(
        (status = 303, description = "Signed out; redirect to the login page"),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    state.accounts.logout(&ctx).await?;
    Ok(HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LOGOUT_REDIRECT))
        .finish())
}

/// Create an account and leave a success notice for the next page view.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionUser),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Account or nickname taken", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security(())
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        passport,
        password,
        nickname,
    } = payload.into_inner();
    let registration =
        Registration::try_from_parts(&passport, &password, &nickname).map_err(auth_error)?;
    let user = state.accounts.register(registration).await?;

    let ctx = RequestContext::new(&session);
    ctx.session()
        .set_notice(&Notice::success("Registration succeeded, please log in"))?;
    Ok(HttpResponse::Created().json(user.to_session_user()))
}

/// Pop the pending one-shot notice.
#[utoipa::path(
    get,
    path = "/api/v1/notice",
    responses(
        (status = 200, description = "Pending notice", body = Notice),
        (status = 204, description = "No notice pending")
    ),
    tags = ["users"],
    operation_id = "takeNotice",
    security(())
)]
#[get("/notice")]
pub async fn take_notice(session: SessionContext) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    match ctx.session().take_notice()? {
        Some(notice) => Ok(HttpResponse::Ok().json(notice)),
        None => {
            debug!("no pending notice");
            Ok(HttpResponse::NoContent().finish())
        }
    }
}
