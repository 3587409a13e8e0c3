//! Account pages: profile edits, password and avatar changes, content and
//! message listings.
//!
//! Routes under `/user/` that act on "me" require a session; `/user/{id}`
//! listings are public.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::{MessageListing, UserContentListing};
use crate::domain::{
    AvatarUrl, ContentFilter, ContentKind, ContentSort, Error, Nickname, PageRequest,
    PasswordChange, ProfileChanges, ReplyFilter, RequestContext, UserProfile,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::require_login;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    auth_error, parse_gender, parse_user_filter, parse_user_id, profile_error, user_error,
};

/// Partial profile edit. Omitted fields keep their stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub nickname: Option<String>,
    /// 0 = unknown, 1 = male, 2 = female.
    pub gender: Option<i16>,
    /// Free-form self description.
    pub remark: Option<String>,
}

impl ProfileRequest {
    fn into_changes(self) -> ApiResult<ProfileChanges> {
        let nickname = self
            .nickname
            .map(Nickname::new)
            .transpose()
            .map_err(user_error)?;
        let gender = parse_gender(self.gender)?;
        ProfileChanges::try_new(nickname, gender, self.remark).map_err(profile_error)
    }
}

/// Password change form.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// New avatar location.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    #[schema(example = "/upload/avatar/alice.jpg")]
    pub avatar: String,
}

/// Paging and ordering for a user's content list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ContentListQuery {
    pub category_id: Option<i64>,
    pub sort: Option<ContentSort>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl ContentListQuery {
    fn into_filter(self, kind: Option<ContentKind>) -> ContentFilter {
        ContentFilter {
            kind,
            category_id: self.category_id,
            user_id: None,
            sort: self.sort.unwrap_or_default(),
            page: PageRequest::new(self.page, self.size),
        }
    }
}

/// Filters for the signed-in user's message list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MessageQuery {
    pub target_type: Option<String>,
    pub target_id: Option<i64>,
    /// Only honoured for admins; everyone else always sees their own.
    pub user_id: Option<i64>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Profile and counters of the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/user/profile",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = UserProfile),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["profile"],
    operation_id = "getOwnProfile"
)]
#[get("/user/profile")]
pub async fn get_own_profile(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let ctx = RequestContext::new(&session);
    let me = require_login(&req, &ctx)?;
    Ok(web::Json(state.accounts.get_profile(&ctx, me.id).await?))
}

/// Change nickname, gender or remark.
#[utoipa::path(
    post,
    path = "/api/v1/user/profile",
    request_body = ProfileRequest,
    responses(
        (status = 204, description = "Profile updated"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Login required", body = Error),
        (status = 409, description = "Nickname taken", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updateProfile"
)]
#[post("/user/profile")]
pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    let changes = payload.into_inner().into_changes()?;
    state.accounts.update_profile(&ctx, changes).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change the password after checking the old one.
#[utoipa::path(
    post,
    path = "/api/v1/user/password",
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request or wrong old password", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updatePassword"
)]
#[post("/user/password")]
pub async fn update_password(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    let change = PasswordChange::try_from_parts(&payload.old_password, &payload.new_password)
        .map_err(auth_error)?;
    state.accounts.update_password(&ctx, change).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Point the avatar at a new URL.
#[utoipa::path(
    post,
    path = "/api/v1/user/avatar",
    request_body = AvatarRequest,
    responses(
        (status = 204, description = "Avatar changed"),
        (status = 400, description = "Invalid avatar URL", body = Error),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["profile"],
    operation_id = "updateAvatar"
)]
#[post("/user/avatar")]
pub async fn update_avatar(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AvatarRequest>,
) -> ApiResult<HttpResponse> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    let avatar = AvatarUrl::new(&payload.avatar).map_err(profile_error)?;
    state.accounts.update_avatar(&ctx, avatar).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Replies visible to the signed-in user, with their counters.
#[utoipa::path(
    get,
    path = "/api/v1/user/messages",
    params(MessageQuery),
    responses(
        (status = 200, description = "Message list", body = MessageListing),
        (status = 401, description = "Login required", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listMessages"
)]
#[get("/user/messages")]
pub async fn list_messages(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<MessageQuery>,
) -> ApiResult<web::Json<MessageListing>> {
    let ctx = RequestContext::new(&session);
    require_login(&req, &ctx)?;
    let query = query.into_inner();
    let filter = ReplyFilter {
        target_type: query.target_type,
        target_id: query.target_id,
        user_id: parse_user_filter(query.user_id)?,
        page: PageRequest::new(query.page, query.size),
    };
    Ok(web::Json(state.accounts.get_message_list(&ctx, filter).await?))
}

/// Everything a user has posted, with their profile and counters.
#[utoipa::path(
    get,
    path = "/api/v1/user/{id}",
    params(("id" = i64, Path, description = "User id"), ContentListQuery),
    responses(
        (status = 200, description = "Content list", body = UserContentListing),
        (status = 404, description = "No such user", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listUserContent",
    security(())
)]
#[get("/user/{id:\\d+}")]
pub async fn list_user_content(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<ContentListQuery>,
) -> ApiResult<web::Json<UserContentListing>> {
    content_page(&state, &session, path.into_inner(), None, query.into_inner()).await
}

/// The same listing restricted to one content kind.
#[utoipa::path(
    get,
    path = "/api/v1/user/{id}/{kind}",
    params(
        ("id" = i64, Path, description = "User id"),
        ("kind" = ContentKind, Path, description = "article, topic or ask"),
        ContentListQuery
    ),
    responses(
        (status = 200, description = "Content list", body = UserContentListing),
        (status = 404, description = "No such user or kind", body = Error)
    ),
    tags = ["profile"],
    operation_id = "listUserContentByKind",
    security(())
)]
#[get("/user/{id:\\d+}/{kind}")]
pub async fn list_user_content_by_kind(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(i64, String)>,
    query: web::Query<ContentListQuery>,
) -> ApiResult<web::Json<UserContentListing>> {
    let (id, kind) = path.into_inner();
    let kind = kind
        .parse::<ContentKind>()
        .map_err(|err| Error::not_found(err.to_string()))?;
    content_page(&state, &session, id, Some(kind), query.into_inner()).await
}

async fn content_page(
    state: &HttpState,
    session: &SessionContext,
    raw_id: i64,
    kind: Option<ContentKind>,
    query: ContentListQuery,
) -> ApiResult<web::Json<UserContentListing>> {
    let user_id = parse_user_id(raw_id)?;
    let ctx = RequestContext::new(session);
    let listing = state
        .accounts
        .get_content_and_profile_list(&ctx, user_id, query.into_filter(kind))
        .await?;
    Ok(web::Json(listing))
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
