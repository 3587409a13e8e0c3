//! Tests for the account service against the in-memory forum store.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{ContentQuery, MockAvatarStore, RenderedAvatar};
use crate::domain::{
    Argon2CredentialHasher, ContentKind, ErrorCode, Gender, InMemorySessionBackend, NewReply,
    Password, PageRequest, PasswordDigest, MESSAGE_STAT,
};
use crate::outbound::memory::{ContentSeed, MemoryForumStore};

struct Harness {
    store: MemoryForumStore,
    hasher: Arc<dyn CredentialHasher>,
    service: UserAccountService<MemoryForumStore>,
}

impl Harness {
    fn with_avatars(avatars: MockAvatarStore) -> Self {
        let store = MemoryForumStore::new();
        let shared = Arc::new(store.clone());
        let hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2CredentialHasher::with_cost(8, 1, 1).expect("cheap argon2 cost"));
        let service = UserAccountService::new(UserAccountPorts {
            users: shared.clone(),
            unit_of_work: shared.clone(),
            stats: shared.clone(),
            content: shared.clone(),
            replies: shared,
            avatars: Arc::new(avatars),
            hasher: Arc::clone(&hasher),
        });
        Self {
            store,
            hasher,
            service,
        }
    }

    fn digest(&self, passport: &str, password: &str) -> PasswordDigest {
        self.hasher
            .hash(passport, &Password::new(password).expect("password"))
            .expect("hash")
    }

    async fn seed(&self, passport: &str, nickname: &str, is_admin: bool) -> User {
        self.store
            .seed_user(
                NewUserRecord {
                    passport: Passport::new(passport).expect("passport"),
                    nickname: Nickname::new(nickname).expect("nickname"),
                    password: self.digest(passport, "secret"),
                    avatar: format!("/upload/avatar/{passport}.jpg"),
                },
                is_admin,
            )
            .await
            .expect("seed user")
    }

    async fn seed_content(&self, user: UserId, kind: ContentKind) {
        self.store
            .seed_content(ContentSeed {
                kind,
                category_id: 1,
                user_id: user,
                title: format!("{kind} by {user}"),
                view_count: 0,
            })
            .await;
    }

    async fn seed_reply(&self, user: UserId) {
        ReplyRepository::create(
            &self.store,
            &NewReply {
                parent_id: 0,
                target_type: "topic".into(),
                target_id: 1,
                user_id: user,
                title: "re".into(),
                content: "body".into(),
            },
        )
        .await
        .expect("seed reply");
    }
}

fn quiet_avatars() -> MockAvatarStore {
    let mut avatars = MockAvatarStore::new();
    avatars.expect_render().returning(|passport| {
        Ok(RenderedAvatar {
            passport: passport.clone(),
            bytes: vec![0xFF, 0xD8],
        })
    });
    avatars.expect_save().returning(|_| Ok(()));
    avatars
}

#[fixture]
fn harness() -> Harness {
    Harness::with_avatars(quiet_avatars())
}

fn sign_in(ctx: &RequestContext<'_>, user: &User) {
    let snapshot = user.to_session_user();
    ctx.session().set_user(&snapshot).expect("session write");
    ctx.set_user(Some(snapshot));
}

fn registration(passport: &str, nickname: &str) -> Registration {
    Registration::try_from_parts(passport, "secret", nickname).expect("registration")
}

fn field_code(err: &Error) -> (String, String) {
    let details = err.details().expect("details");
    (
        details["field"].as_str().unwrap_or_default().to_owned(),
        details["code"].as_str().unwrap_or_default().to_owned(),
    )
}

#[rstest]
#[tokio::test]
async fn register_creates_enabled_account_with_generated_avatar() {
    let mut avatars = MockAvatarStore::new();
    avatars.expect_render().times(1).returning(|passport| {
        Ok(RenderedAvatar {
            passport: passport.clone(),
            bytes: vec![1, 2, 3],
        })
    });
    avatars
        .expect_save()
        .withf(|avatar| avatar.passport.as_str() == "alice")
        .times(1)
        .returning(|_| Ok(()));
    let h = Harness::with_avatars(avatars);

    let user = h
        .service
        .register(registration("alice", "Alice"))
        .await
        .expect("registered");

    assert_eq!(user.passport.as_str(), "alice");
    assert_eq!(user.avatar, "/upload/avatar/alice.jpg");
    assert!(user.is_enabled());
    assert!(!user.is_admin);
    assert_eq!(
        h.store.password_of(user.id).await,
        Some(h.digest("alice", "secret"))
    );
}

#[rstest]
#[tokio::test]
async fn register_rejects_taken_passport_without_writing_avatar() {
    let mut avatars = MockAvatarStore::new();
    avatars.expect_render().returning(|passport| {
        Ok(RenderedAvatar {
            passport: passport.clone(),
            bytes: Vec::new(),
        })
    });
    avatars.expect_save().never();
    let h = Harness::with_avatars(avatars);
    h.seed("alice", "Alice", false).await;

    let err = h
        .service
        .register(registration("alice", "Someone Else"))
        .await
        .expect_err("duplicate passport");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        field_code(&err),
        ("passport".to_owned(), "account_taken".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn register_with_taken_nickname_leaves_no_row(harness: Harness) {
    harness.seed("bob", "Alice", false).await;

    let err = harness
        .service
        .register(registration("alice", "Alice"))
        .await
        .expect_err("duplicate nickname");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(
        field_code(&err),
        ("nickname".to_owned(), "nickname_taken".to_owned())
    );
    assert_eq!(harness.store.user_count().await, 1);
}

#[rstest]
#[tokio::test]
async fn avatar_render_failure_aborts_registration() {
    let mut avatars = MockAvatarStore::new();
    avatars
        .expect_render()
        .returning(|_| Err(AvatarError::render("encoder exploded")));
    avatars.expect_save().never();
    let h = Harness::with_avatars(avatars);

    let err = h
        .service
        .register(registration("alice", "Alice"))
        .await
        .expect_err("render failure");

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(h.store.user_count().await, 0);
}

#[rstest]
#[tokio::test]
async fn avatar_write_failure_keeps_the_committed_account() {
    let mut avatars = MockAvatarStore::new();
    avatars.expect_render().returning(|passport| {
        Ok(RenderedAvatar {
            passport: passport.clone(),
            bytes: vec![1],
        })
    });
    avatars
        .expect_save()
        .times(1)
        .returning(|_| Err(AvatarError::write("/upload/avatar/alice.jpg", "disk full")));
    let h = Harness::with_avatars(avatars);

    let user = h
        .service
        .register(registration("alice", "Alice"))
        .await
        .expect("account survives a failed avatar write");

    assert_eq!(user.passport.as_str(), "alice");
    assert_eq!(h.store.user_count().await, 1);

    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    let credentials = LoginCredentials::try_from_parts("alice", "secret").expect("creds");
    h.service
        .login(&ctx, &credentials)
        .await
        .expect("new account can sign in");
}

#[rstest]
#[tokio::test]
async fn login_stores_session_user(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);

    let credentials = LoginCredentials::try_from_parts(" alice ", "secret").expect("creds");
    let session_user = harness
        .service
        .login(&ctx, &credentials)
        .await
        .expect("login");

    assert_eq!(session_user.id, alice.id);
    assert!(backend.raw("user").is_some());
    assert_eq!(ctx.user().expect("ctx").map(|u| u.id), Some(alice.id));
}

#[rstest]
#[case("ghost", "secret")]
#[case("alice", "wrong")]
#[case("carol", "secret")]
#[tokio::test]
async fn failed_logins_are_indistinguishable(
    harness: Harness,
    #[case] passport: &str,
    #[case] password: &str,
) {
    harness.seed("alice", "Alice", false).await;
    let carol = harness.seed("carol", "Carol", false).await;
    harness
        .store
        .set_status(carol.id, UserStatus::Disabled)
        .await
        .expect("disable carol");
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);

    let credentials = LoginCredentials::try_from_parts(passport, password).expect("creds");
    let err = harness
        .service
        .login(&ctx, &credentials)
        .await
        .expect_err("rejected");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "invalid account or password");
    assert!(backend.raw("user").is_none());
}

#[rstest]
#[tokio::test]
async fn logout_clears_session_and_context(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    harness.service.logout(&ctx).await.expect("logout");

    assert!(backend.raw("user").is_none());
    assert_eq!(ctx.user().expect("ctx"), None);
}

#[rstest]
#[tokio::test]
async fn wrong_old_password_is_reported_on_the_field(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let change = PasswordChange::try_from_parts("nope", "next").expect("change");
    let err = harness
        .service
        .update_password(&ctx, change)
        .await
        .expect_err("wrong old password");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        field_code(&err),
        ("oldPassword".to_owned(), "wrong_old_password".to_owned())
    );
    assert_eq!(
        harness.store.password_of(alice.id).await,
        Some(harness.digest("alice", "secret"))
    );
}

#[rstest]
#[tokio::test]
async fn changed_password_is_used_by_the_next_login(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let change = PasswordChange::try_from_parts("secret", "next").expect("change");
    harness
        .service
        .update_password(&ctx, change)
        .await
        .expect("changed");

    let fresh = InMemorySessionBackend::default();
    let fresh_ctx = RequestContext::new(&fresh);
    let old = LoginCredentials::try_from_parts("alice", "secret").expect("creds");
    assert!(harness.service.login(&fresh_ctx, &old).await.is_err());
    let new = LoginCredentials::try_from_parts("alice", "next").expect("creds");
    assert!(harness.service.login(&fresh_ctx, &new).await.is_ok());
}

#[rstest]
#[tokio::test]
async fn avatar_change_resyncs_session(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let avatar = AvatarUrl::new("/upload/avatar/custom.png").expect("avatar");
    harness
        .service
        .update_avatar(&ctx, avatar)
        .await
        .expect("avatar updated");

    let stored = ctx.session().get_user().expect("session").expect("user");
    assert_eq!(stored.avatar, "/upload/avatar/custom.png");
    let row = UserRepository::find_by_id(&harness.store, alice.id)
        .await
        .expect("query")
        .expect("row");
    assert_eq!(row.avatar, "/upload/avatar/custom.png");
}

#[rstest]
#[tokio::test]
async fn profile_update_checks_nickname_against_others_only(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    harness.seed("bob", "Bob", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let same = ProfileChanges::try_new(
        Some(Nickname::new("Alice").expect("nickname")),
        Some(Gender::Female),
        None,
    )
    .expect("changes");
    harness
        .service
        .update_profile(&ctx, same)
        .await
        .expect("own nickname is not a conflict");

    let taken = ProfileChanges::try_new(Some(Nickname::new("Bob").expect("nickname")), None, None)
        .expect("changes");
    let err = harness
        .service
        .update_profile(&ctx, taken)
        .await
        .expect_err("nickname taken");
    assert_eq!(
        field_code(&err),
        ("nickname".to_owned(), "nickname_taken".to_owned())
    );
}

#[rstest]
#[tokio::test]
async fn profile_update_resyncs_session_nickname(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let changes = ProfileChanges::try_new(
        Some(Nickname::new("Alicia").expect("nickname")),
        None,
        Some("hello".into()),
    )
    .expect("changes");
    harness
        .service
        .update_profile(&ctx, changes)
        .await
        .expect("updated");

    let stored = ctx.session().get_user().expect("session").expect("user");
    assert_eq!(stored.nickname.as_str(), "Alicia");
    let profile = harness
        .service
        .get_profile(&ctx, alice.id)
        .await
        .expect("profile");
    assert_eq!(profile.remark, "hello");
}

#[rstest]
#[tokio::test]
async fn only_admins_may_disable_accounts(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let root = harness.seed("root", "Root", true).await;
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);

    sign_in(&ctx, &alice);
    let err = harness
        .service
        .disable(&ctx, root.id)
        .await
        .expect_err("not admin");
    assert_eq!(err.code(), ErrorCode::Forbidden);

    sign_in(&ctx, &root);
    harness
        .service
        .disable(&ctx, alice.id)
        .await
        .expect("disabled");
    let missing = UserId::new(999).expect("id");
    let err = harness
        .service
        .disable(&ctx, missing)
        .await
        .expect_err("unknown user");
    assert_eq!(err.code(), ErrorCode::NotFound);

    let fresh = InMemorySessionBackend::default();
    let fresh_ctx = RequestContext::new(&fresh);
    let creds = LoginCredentials::try_from_parts("alice", "secret").expect("creds");
    let err = harness
        .service
        .login(&fresh_ctx, &creds)
        .await
        .expect_err("disabled login");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn admin_on_own_page_sees_global_counts(harness: Harness) {
    let root = harness.seed("root", "Root", true).await;
    let bob = harness.seed("bob", "Bob", false).await;
    harness.seed_content(bob.id, ContentKind::Article).await;
    harness.seed_content(bob.id, ContentKind::Article).await;
    harness.seed_content(root.id, ContentKind::Topic).await;
    harness.seed_reply(bob.id).await;

    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &root);

    let own = harness
        .service
        .get_stats(&ctx, Some(root.id))
        .await
        .expect("stats");
    assert_eq!(own.count_for(ContentKind::Article), 2);
    assert_eq!(own.count_for(ContentKind::Topic), 1);
    assert_eq!(own.get(MESSAGE_STAT), Some(1));

    let bobs = harness
        .service
        .get_stats(&ctx, Some(bob.id))
        .await
        .expect("stats");
    assert_eq!(bobs.count_for(ContentKind::Article), 2);
    assert_eq!(bobs.count_for(ContentKind::Topic), 0);
}

#[rstest]
#[tokio::test]
async fn non_admin_sees_personal_counts(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let bob = harness.seed("bob", "Bob", false).await;
    harness.seed_content(alice.id, ContentKind::Ask).await;
    harness.seed_content(bob.id, ContentKind::Ask).await;

    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let own = harness
        .service
        .get_stats(&ctx, Some(alice.id))
        .await
        .expect("stats");
    assert_eq!(own.count_for(ContentKind::Ask), 1);
    assert_eq!(own.messages(), 0);

    let global = harness.service.get_stats(&ctx, None).await.expect("stats");
    assert_eq!(global.count_for(ContentKind::Ask), 2);
}

#[rstest]
#[tokio::test]
async fn message_list_is_forced_to_the_viewer(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let bob = harness.seed("bob", "Bob", false).await;
    harness.seed_reply(alice.id).await;
    harness.seed_reply(bob.id).await;
    harness.seed_reply(bob.id).await;

    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &alice);

    let listing = harness
        .service
        .get_message_list(
            &ctx,
            ReplyFilter {
                user_id: Some(bob.id),
                ..ReplyFilter::default()
            },
        )
        .await
        .expect("messages");

    assert_eq!(listing.messages.total, 1);
    assert!(listing.messages.items.iter().all(|r| r.user_id == alice.id));
    assert_eq!(listing.stats.messages(), 1);
}

#[rstest]
#[tokio::test]
async fn admin_message_list_is_unscoped(harness: Harness) {
    let root = harness.seed("root", "Root", true).await;
    let bob = harness.seed("bob", "Bob", false).await;
    harness.seed_reply(bob.id).await;
    harness.seed_reply(bob.id).await;

    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);
    sign_in(&ctx, &root);

    let listing = harness
        .service
        .get_message_list(&ctx, ReplyFilter::default())
        .await
        .expect("messages");
    assert_eq!(listing.messages.total, 2);
    assert_eq!(listing.stats.messages(), 2);
}

#[rstest]
#[tokio::test]
async fn message_list_requires_login(harness: Harness) {
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);

    let err = harness
        .service
        .get_message_list(&ctx, ReplyFilter::default())
        .await
        .expect_err("anonymous");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
#[tokio::test]
async fn content_listing_is_scoped_to_the_profile_owner(harness: Harness) {
    let alice = harness.seed("alice", "Alice", false).await;
    let bob = harness.seed("bob", "Bob", false).await;
    harness.seed_content(alice.id, ContentKind::Article).await;
    harness.seed_content(bob.id, ContentKind::Article).await;
    harness.seed_content(bob.id, ContentKind::Topic).await;

    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);

    let listing = harness
        .service
        .get_content_and_profile_list(
            &ctx,
            bob.id,
            ContentFilter {
                kind: Some(ContentKind::Article),
                page: PageRequest::new(Some(1), Some(5)),
                ..ContentFilter::default()
            },
        )
        .await
        .expect("listing");

    assert_eq!(listing.profile.id, bob.id);
    assert_eq!(listing.content.total, 1);
    assert_eq!(listing.stats, listing.profile.stats);
    assert_eq!(listing.stats.count_for(ContentKind::Topic), 1);

    let all = ContentQuery::list(&harness.store, &ContentFilter::default())
        .await
        .expect("all content");
    assert_eq!(all.total, 3);
}

#[rstest]
#[tokio::test]
async fn unknown_profile_is_not_found(harness: Harness) {
    let backend = InMemorySessionBackend::default();
    let ctx = RequestContext::new(&backend);

    let err = harness
        .service
        .get_content_and_profile_list(&ctx, UserId::new(77).expect("id"), ContentFilter::default())
        .await
        .expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}
