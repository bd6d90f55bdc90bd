use std::sync::Arc;

use tracing::info;

use crate::api::{AuthApi, CategoryApi, CommentApi, PostApi, TagApi, UserApi};
use crate::config::Config;
use crate::errors::Result;
use crate::notify::{Notifier, TracingNotifier};
use crate::pipeline::{RequestPipeline, http_client};
use crate::session::{FileStorage, MemoryStorage, SessionStorage, SessionStore, TokenSession};
use crate::types::{Envelope, RegisterRequest, User};

/// Entry point for applications: one pipeline, one session, typed resource APIs.
#[derive(Clone)]
pub struct BlogClient {
    pipeline: RequestPipeline,
    session: Arc<TokenSession>,
}

impl BlogClient {
    /// Create a new BlogClient that reports user-facing errors through `tracing`.
    /// # Arguments
    /// * `config` - typically loaded via `Config::from_file` or `Config::from_env`.
    ///   When `session_file` is set, tokens persist there between runs.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_notifier(config, Arc::new(TracingNotifier))
    }

    pub fn with_notifier(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage: Arc<dyn SessionStorage> = match &config.session_file {
            Some(path) => Arc::new(FileStorage::open(path)?),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, notifier, storage)
    }

    pub fn with_storage(
        config: Config,
        notifier: Arc<dyn Notifier>,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self> {
        let base_url = config.validated_base_url()?;
        let refresh_path = config.validated_refresh_path()?;
        let http = http_client(&config)?;
        let session = Arc::new(TokenSession::new(
            http.clone(),
            format!("{}{}", base_url, refresh_path),
            config.user_agent.clone(),
            storage,
        ));
        let store: Arc<dyn SessionStore> = session.clone();
        let pipeline = RequestPipeline::new(&config, http, store, notifier)?;
        info!(base_url = %pipeline.base_url(), "blog client ready");
        Ok(Self { pipeline, session })
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn session(&self) -> &TokenSession {
        &self.session
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(&self.pipeline)
    }

    pub fn posts(&self) -> PostApi<'_> {
        PostApi::new(&self.pipeline)
    }

    pub fn categories(&self) -> CategoryApi<'_> {
        CategoryApi::new(&self.pipeline)
    }

    pub fn tags(&self) -> TagApi<'_> {
        TagApi::new(&self.pipeline)
    }

    pub fn comments(&self) -> CommentApi<'_> {
        CommentApi::new(&self.pipeline)
    }

    pub fn users(&self) -> UserApi<'_> {
        UserApi::new(&self.pipeline)
    }

    /// Logs in, stores the token pair and loads the profile of the new user.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let tokens = self.auth().login(username, password).await?.into_data();
        self.session.store_tokens(&tokens)?;
        info!(username, "login ok");
        self.load_current_user().await
    }

    pub async fn register(&self, form: &RegisterRequest) -> Result<Envelope<Option<User>>> {
        self.auth().register(form).await
    }

    /// Fetches `/auth/me` and caches the result on the session.
    pub async fn load_current_user(&self) -> Result<User> {
        let user = self.auth().current_user().await?.into_data();
        self.session.set_user(Some(user.clone()));
        Ok(user)
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn logout(&self) {
        self.session.terminate_session();
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }
}
