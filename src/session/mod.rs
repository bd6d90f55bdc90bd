use async_trait::async_trait;

use crate::errors::Result;
use crate::types::AuthTokens;

mod storage;
mod token_session;

pub use storage::{
    ACCESS_TOKEN_KEY, FileStorage, MemoryStorage, REFRESH_TOKEN_KEY, SessionStorage,
};
pub use token_session::TokenSession;

/// What the request pipeline needs from whoever owns the tokens.
///
/// The pipeline never writes tokens itself: it reads the access token before
/// each call, asks for a refresh on 401, and calls `terminate_session` when
/// the session cannot be recovered.
#[async_trait]
pub trait SessionStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    /// In-memory refresh token, falling back to persisted storage.
    fn refresh_token(&self) -> Option<String>;

    /// Exchanges `refresh_token` for a new access token and records it.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens>;

    fn terminate_session(&self);
}
