//! Builders for the HTTP state from configured adapters.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use focus::domain::ports::{
    ContentQuery, ForumStatsRepository, ReplyRepository, UserRepository, UserUnitOfWork,
};
use focus::domain::{
    Argon2CredentialHasher, CredentialHasher, ReplyService, UserAccountPorts, UserAccountService,
};
use focus::inbound::http::state::HttpState;
use focus::outbound::avatar::FilesystemAvatarStore;
use focus::outbound::memory::MemoryForumStore;
use focus::outbound::persistence::{
    DieselForumRepository, DieselUserRepository, DieselUserUnitOfWork,
};

use super::ServerConfig;

/// Wire the account and reply services over one set of storage adapters.
///
/// `forum` serves content, statistics and replies alike, which holds for
/// both the Diesel repository and the in-memory store.
fn assemble<W, F>(
    users: Arc<dyn UserRepository>,
    unit_of_work: Arc<W>,
    forum: Arc<F>,
    avatars: FilesystemAvatarStore,
    hasher: Arc<dyn CredentialHasher>,
) -> HttpState
where
    W: UserUnitOfWork + 'static,
    F: ForumStatsRepository + ContentQuery + ReplyRepository + 'static,
{
    let accounts = UserAccountService::new(UserAccountPorts {
        users,
        unit_of_work,
        stats: forum.clone(),
        content: forum.clone(),
        replies: forum.clone(),
        avatars: Arc::new(avatars),
        hasher,
    });
    HttpState::new(Arc::new(accounts), Arc::new(ReplyService::new(forum)))
}

fn build_http_state_with(config: &ServerConfig, hasher: Arc<dyn CredentialHasher>) -> HttpState {
    let avatars = FilesystemAvatarStore::new(config.avatar_root());
    match &config.db_pool {
        Some(pool) => {
            info!("using postgres-backed forum store");
            assemble(
                Arc::new(DieselUserRepository::new(pool.clone())),
                Arc::new(DieselUserUnitOfWork::new(pool.clone())),
                Arc::new(DieselForumRepository::new(pool.clone())),
                avatars,
                hasher,
            )
        }
        None => {
            info!("no database configured; using in-memory forum store");
            let store = Arc::new(MemoryForumStore::new());
            assemble(store.clone(), store.clone(), store, avatars, hasher)
        }
    }
}

/// Build the shared HTTP state, choosing Diesel adapters when a pool is
/// configured and the in-memory store otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    web::Data::new(build_http_state_with(
        config,
        Arc::new(Argon2CredentialHasher::default()),
    ))
}
