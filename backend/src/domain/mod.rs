//! Domain primitives, ports and services.
//!
//! Purpose: hold the forum's account and reply rules independent of actix and
//! Diesel. Types validate on construction; services talk to the outside world
//! only through [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, SessionUser, Passport, Nickname: account model.
//! - SessionStore, RequestContext: typed session access for one request.
//! - UserAccountService, ReplyService: use-case implementations.

pub mod auth;
pub mod content;
pub mod credentials;
pub mod error;
pub mod notice;
pub mod ports;
pub mod profile;
pub mod reply;
pub mod reply_service;
pub mod request_context;
pub mod session;
pub mod stats;
pub mod trace_id;
pub mod user;
pub mod user_account_service;

pub use self::auth::{AuthValidationError, LoginCredentials, Password, PasswordChange, Registration};
pub use self::content::{
    ContentFilter, ContentKind, ContentSort, ContentSummary, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
    Page, PageRequest, UnknownContentKind,
};
pub use self::credentials::{Argon2CredentialHasher, CredentialHasher, PasswordDigest};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::notice::{Notice, NoticeKind};
pub use self::profile::{
    AVATAR_URL_PREFIX, AvatarUrl, ProfileChanges, ProfileValidationError, UserProfile,
    generated_avatar_url,
};
pub use self::reply::{NewReply, Reply, ReplyDraft, ReplyFilter, ReplyValidationError};
pub use self::reply_service::ReplyService;
pub use self::request_context::RequestContext;
pub use self::session::{InMemorySessionBackend, SessionBackend, SessionError, SessionStore};
pub use self::stats::{MESSAGE_STAT, UserStats};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Gender, Nickname, Passport, SessionUser, User, UserId, UserStatus, UserValidationError,
};
pub use self::user_account_service::{UserAccountPorts, UserAccountService};
