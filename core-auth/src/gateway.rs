//! Remote user-service seam.

use crate::types::{AuthResponse, AuthToken, LoginRequest, PlaylistToggle, RegisterRequest, User};
use async_trait::async_trait;
use bridge_traits::error::Result;
use core_catalog::SongId;

/// Calls against the remote user service. One attempt per call.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse>;

    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse>;

    /// Resolves a token to the user it belongs to.
    async fn me(&self, token: AuthToken) -> Result<User>;

    /// Toggles whether `song_id` is in the token owner's playlist.
    async fn toggle_song_in_playlist(
        &self,
        song_id: SongId,
        token: AuthToken,
    ) -> Result<PlaylistToggle>;
}
