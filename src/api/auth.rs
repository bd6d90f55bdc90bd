use crate::errors::Result;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpec;
use crate::types::{AuthTokens, Envelope, LoginRequest, RefreshRequest, RegisterRequest, User};

#[derive(Clone, Copy)]
pub struct AuthApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> AuthApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn login(self, username: &str, password: &str) -> Result<Envelope<AuthTokens>> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.pipeline
            .send(RequestSpec::post("/auth/login").json(&body)?)
            .await
    }

    pub async fn register(self, form: &RegisterRequest) -> Result<Envelope<Option<User>>> {
        self.pipeline
            .send(RequestSpec::post("/auth/register").json(form)?)
            .await
    }

    /// Calls the refresh endpoint directly. A 401 here never triggers another refresh.
    pub async fn refresh(self, refresh_token: &str) -> Result<Envelope<AuthTokens>> {
        let body = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        self.pipeline
            .send(RequestSpec::post("/auth/refresh").json(&body)?)
            .await
    }

    pub async fn current_user(self) -> Result<Envelope<User>> {
        self.pipeline.send(RequestSpec::get("/auth/me")).await
    }
}
