//! Administrative account actions.

use actix_web::{HttpRequest, HttpResponse, post, web};

use crate::domain::{Error, RequestContext};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_login;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_user_id;

/// Disable an account so it can no longer sign in.
#[utoipa::path(
    post,
    path = "/api/v1/admin/users/{id}/disable",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Account disabled"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Admins only", body = Error),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["admin"],
    operation_id = "disableUser"
)]
#[post("/admin/users/{id}/disable")]
pub async fn disable_user(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    let target = parse_user_id(path.into_inner())?;
    state.accounts.disable(&ctx, target).await?;
    Ok(HttpResponse::NoContent().finish())
}
