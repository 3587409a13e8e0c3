//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`UserUnitOfWork`], [`AvatarStore`]) are
//! implemented by outbound adapters. Driving ports ([`UserAccounts`],
//! [`ReplyBoard`]) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod avatar_store;
mod forum_queries;
mod reply_board;
mod user_accounts;
mod user_repository;
mod user_unit_of_work;

#[cfg(test)]
pub use avatar_store::MockAvatarStore;
pub use avatar_store::{AvatarError, AvatarStore, RenderedAvatar};
#[cfg(test)]
pub use forum_queries::{MockContentQuery, MockForumStatsRepository, MockReplyRepository};
pub use forum_queries::{
    ContentQuery, ForumPersistenceError, ForumStatsRepository, ReplyRepository,
};
pub use reply_board::ReplyBoard;
pub use user_accounts::{MessageListing, UserAccounts, UserContentListing};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
pub use user_unit_of_work::{NewUserRecord, TxFuture, UserTransaction, UserUnitOfWork};
