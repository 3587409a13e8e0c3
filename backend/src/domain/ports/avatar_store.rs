//! Port for generated placeholder avatars.
//!
//! Rendering is pure and happens before any database work; saving touches the
//! filesystem and happens only after the registering transaction commits.

use async_trait::async_trait;

use crate::domain::Passport;

use super::define_port_error;

define_port_error! {
    /// Failures while producing or storing an avatar image.
    pub enum AvatarError {
        Render { message: String } => "avatar rendering failed: {message}",
        Write { path: String, message: String } => "writing avatar {path} failed: {message}",
    }
}

/// Encoded image ready to be written under the owner's passport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAvatar {
    /// Owner; names the file.
    pub passport: Passport,
    /// Encoded JPEG.
    pub bytes: Vec<u8>,
}

/// Renders and stores generated avatars.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Deterministically render the placeholder avatar for `passport`.
    fn render(&self, passport: &Passport) -> Result<RenderedAvatar, AvatarError>;

    /// Persist a rendered avatar as `<passport>.jpg`.
    async fn save(&self, avatar: &RenderedAvatar) -> Result<(), AvatarError>;
}
