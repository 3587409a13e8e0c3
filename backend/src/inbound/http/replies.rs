//! Reply listing, posting and deletion.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Page, PageRequest, Reply, ReplyDraft, ReplyFilter, RequestContext};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_login;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Filters and paging for a reply listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReplyQuery {
    #[param(example = "article")]
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Reply submission body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    /// Reply being answered; 0 for a top-level reply.
    #[serde(default)]
    pub parent_id: i64,
    #[schema(example = "article")]
    pub target_type: String,
    /// Id of the content replied to.
    pub target_id: i64,
    pub title: String,
    pub content: String,
}

impl From<ReplyRequest> for ReplyDraft {
    fn from(value: ReplyRequest) -> Self {
        Self {
            parent_id: value.parent_id,
            target_type: value.target_type,
            target_id: value.target_id,
            title: value.title,
            content: value.content,
        }
    }
}

/// Replies attached to a piece of content.
#[utoipa::path(
    get,
    path = "/api/v1/replies",
    params(ReplyQuery),
    responses(
        (status = 200, description = "Replies, newest first", body = Page<Reply>),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["replies"],
    operation_id = "listReplies",
    security(())
)]
#[get("/replies")]
pub async fn list_replies(
    state: web::Data<HttpState>,
    query: web::Query<ReplyQuery>,
) -> ApiResult<web::Json<Page<Reply>>> {
    let query = query.into_inner();
    let filter = ReplyFilter {
        target_type: query.target_type,
        target_id: query.target_id,
        user_id: None,
        page: PageRequest::new(query.page, query.size),
    };
    Ok(web::Json(state.replies.list(filter).await?))
}

/// Post a reply as the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/replies",
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply stored", body = Reply),
        (status = 400, description = "Invalid reply", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["replies"],
    operation_id = "createReply"
)]
#[post("/replies")]
pub async fn create_reply(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReplyRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    let reply = state
        .replies
        .create(&ctx, payload.into_inner().into())
        .await?;
    Ok(HttpResponse::Created().json(reply))
}

/// Delete a reply. Only its author or an admin may do so.
#[utoipa::path(
    delete,
    path = "/api/v1/replies/{id}",
    params(("id" = i64, Path, description = "Reply id")),
    responses(
        (status = 204, description = "Reply deleted"),
        (status = 401, description = "Login required", body = Error),
        (status = 403, description = "Neither the author nor an admin", body = Error),
        (status = 404, description = "No such reply", body = Error)
    ),
    tags = ["replies"],
    operation_id = "deleteReply"
)]
#[delete("/replies/{id}")]
pub async fn delete_reply(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    state.replies.delete(&ctx, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
#[path = "replies_tests.rs"]
mod tests;
