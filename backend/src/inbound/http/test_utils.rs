//! Helpers for handler tests: cookie sessions and an in-memory forum.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use tempfile::TempDir;

use crate::domain::ports::NewUserRecord;
use crate::domain::{
    Argon2CredentialHasher, CredentialHasher, Nickname, Passport, Password, ReplyService, User,
    UserAccountPorts, UserAccountService, generated_avatar_url,
};
use crate::outbound::avatar::FilesystemAvatarStore;
use crate::outbound::memory::MemoryForumStore;

use super::state::HttpState;

/// Cookie session middleware with a throwaway key and no `Secure` flag.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

/// App exposing every API route under `/api/v1` over `state`.
pub fn forum_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .wrap(test_session_middleware())
            .configure(super::configure_api),
    )
}

/// In-memory forum wired the way the server wires it.
pub struct TestForum {
    pub store: MemoryForumStore,
    pub state: HttpState,
    pub uploads: TempDir,
    hasher: Arc<dyn CredentialHasher>,
}

impl TestForum {
    pub fn new() -> Self {
        let store = MemoryForumStore::new();
        let shared = Arc::new(store.clone());
        let uploads = tempfile::tempdir().expect("upload dir");
        let hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2CredentialHasher::with_cost(8, 1, 1).expect("cheap argon2 cost"));
        let accounts = UserAccountService::new(UserAccountPorts {
            users: shared.clone(),
            unit_of_work: shared.clone(),
            stats: shared.clone(),
            content: shared.clone(),
            replies: shared.clone(),
            avatars: Arc::new(FilesystemAvatarStore::new(uploads.path().join("avatar"))),
            hasher: Arc::clone(&hasher),
        });
        let state = HttpState::new(Arc::new(accounts), Arc::new(ReplyService::new(shared)));
        Self {
            store,
            state,
            uploads,
            hasher,
        }
    }

    /// Insert an account whose password is `password`.
    pub async fn seed_user(&self, passport: &str, password: &str, is_admin: bool) -> User {
        let passport = Passport::new(passport).expect("passport");
        let digest = self
            .hasher
            .hash(passport.as_str(), &Password::new(password).expect("password"))
            .expect("hash");
        self.store
            .seed_user(
                NewUserRecord {
                    avatar: generated_avatar_url(&passport),
                    nickname: Nickname::new(passport.as_str()).expect("nickname"),
                    passport,
                    password: digest,
                },
                is_admin,
            )
            .await
            .expect("seed user")
    }
}
