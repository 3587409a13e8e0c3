//! Login gate shared by handlers that need an authenticated caller.

use actix_web::HttpRequest;
use tracing::debug;

use crate::domain::{Error, RequestContext, SessionUser};

use super::ApiResult;

/// The session user, or `401` after remembering where the visitor was going.
///
/// The stored referer is first-write-wins, so bouncing between several
/// protected pages keeps the original destination.
pub(crate) fn require_login(req: &HttpRequest, ctx: &RequestContext<'_>) -> ApiResult<SessionUser> {
    if let Some(user) = ctx.user()? {
        return Ok(user);
    }
    let destination = match req.query_string() {
        "" => req.path().to_owned(),
        query => format!("{}?{query}", req.path()),
    };
    debug!(%destination, "anonymous request to protected route");
    ctx.session().set_login_referer(&destination)?;
    Err(Error::unauthorized("login required"))
}
