use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::USER_AGENT;
use tracing::{info, warn};

use crate::errors::{Error, Result};
use crate::types::{AuthTokens, RawEnvelope, RefreshRequest, User};

use super::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SessionStorage, SessionStore};

#[derive(Default)]
struct SessionState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<User>,
}

/// Default session store: tokens in memory, mirrored into durable storage.
pub struct TokenSession {
    state: RwLock<SessionState>,
    storage: Arc<dyn SessionStorage>,
    http: Client,
    refresh_url: String,
    user_agent: String,
}

impl TokenSession {
    /// Restores whatever token pair the storage already holds.
    pub fn new(
        http: Client,
        refresh_url: impl Into<String>,
        user_agent: impl Into<String>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        let state = SessionState {
            access_token: storage.get(ACCESS_TOKEN_KEY),
            refresh_token: storage.get(REFRESH_TOKEN_KEY),
            user: None,
        };
        Self {
            state: RwLock::new(state),
            storage,
            http,
            refresh_url: refresh_url.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Records the pair returned by login.
    pub fn store_tokens(&self, tokens: &AuthTokens) -> Result<()> {
        {
            let mut state = self.write();
            state.access_token = Some(tokens.token.clone());
            if tokens.refresh_token.is_some() {
                state.refresh_token = tokens.refresh_token.clone();
            }
        }
        self.storage.set(ACCESS_TOKEN_KEY, &tokens.token)?;
        if let Some(refresh) = &tokens.refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh)?;
        }
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.read().access_token.is_some()
    }

    pub fn user(&self) -> Option<User> {
        self.read().user.clone()
    }

    pub fn set_user(&self, user: Option<User>) {
        self.write().user = user;
    }

    pub fn is_admin(&self) -> bool {
        self.read().user.as_ref().is_some_and(User::is_admin)
    }

    /// Drops tokens and the cached user, in memory and on disk.
    pub fn clear(&self) {
        *self.write() = SessionState::default();
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!(key, error = %err, "session.storage.clear_failed");
            }
        }
        info!("session cleared");
    }

    async fn request_refresh(&self, refresh_token: &str) -> Result<AuthTokens> {
        let resp = self
            .http
            .post(&self.refresh_url)
            .header(USER_AGENT, self.user_agent.as_str())
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await
            .map_err(Error::Network)?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(Error::Network)?;
        if !status.is_success() {
            return Err(Error::Transport {
                status,
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let envelope: RawEnvelope = serde_json::from_slice(&body)?;
        if envelope.code != 200 {
            return Err(Error::Application {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }
        Ok(serde_json::from_value(envelope.data)?)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for TokenSession {
    fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.read()
            .refresh_token
            .clone()
            .or_else(|| self.storage.get(REFRESH_TOKEN_KEY))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens> {
        let tokens = self.request_refresh(refresh_token).await?;
        {
            let mut state = self.write();
            state.access_token = Some(tokens.token.clone());
            if tokens.refresh_token.is_some() {
                state.refresh_token = tokens.refresh_token.clone();
            }
        }
        // The new pair is usable from memory even if it cannot be persisted.
        if let Err(err) = self.storage.set(ACCESS_TOKEN_KEY, &tokens.token) {
            warn!(error = %err, "session.storage.persist_failed");
        }
        if let Some(refresh) = &tokens.refresh_token
            && let Err(err) = self.storage.set(REFRESH_TOKEN_KEY, refresh)
        {
            warn!(error = %err, "session.storage.persist_failed");
        }
        info!(token_len = tokens.token.len(), "access token refreshed");
        Ok(tokens)
    }

    fn terminate_session(&self) {
        self.clear();
    }
}
