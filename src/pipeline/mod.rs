use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::SystemTime;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::{Error, Result};
use crate::notify::Notifier;
use crate::request::RequestSpec;
use crate::session::SessionStore;
use crate::telemetry::refresh::{self, RefreshTelemetry};
use crate::types::{Envelope, RawEnvelope};

mod gate;
pub mod outcome;

use gate::{Admission, RefreshGate};
use outcome::{
    MSG_NETWORK, MSG_REQUEST_FAILED, MSG_SESSION_EXPIRED, MSG_UNAUTHORIZED, RequestOutcome,
    envelope_message, status_message,
};

type Dispatch<'a> = Pin<Box<dyn Future<Output = Result<Envelope<serde_json::Value>>> + Send + 'a>>;

/// Builds the shared HTTP client with the configured per-call timeout.
pub fn http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
}

/// Every API call goes through here. Clones share one refresh gate, so a
/// burst of 401s across clones still produces a single refresh call.
#[derive(Clone)]
pub struct RequestPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    http: Client,
    base_url: String,
    refresh_path: String,
    user_agent: String,
    session: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    gate: RefreshGate,
}

impl RequestPipeline {
    pub fn new(
        config: &Config,
        http: Client,
        session: Arc<dyn SessionStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let base_url = config.validated_base_url()?;
        let refresh_path = config.validated_refresh_path()?;
        Ok(Self {
            inner: Arc::new(PipelineInner {
                http,
                base_url,
                refresh_path,
                user_agent: config.user_agent.clone(),
                session,
                notifier,
                gate: RefreshGate::default(),
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// True while some request is refreshing the access token.
    pub fn is_refreshing(&self) -> bool {
        self.inner.gate.is_refreshing()
    }

    /// Requests currently parked behind the in-flight refresh.
    pub fn pending_requests(&self) -> usize {
        self.inner.gate.pending_len()
    }

    /// Sends `spec` and returns the envelope with `data` decoded as `T`.
    pub async fn send<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<Envelope<T>> {
        let start = Instant::now();
        let method = spec.method.clone();
        let path = spec.path.clone();
        let result = self.dispatch(spec).await.and_then(|envelope| {
            let data = serde_json::from_value(envelope.data)
                .map_err(|err| self.malformed_body(&path, err))?;
            Ok(Envelope {
                code: envelope.code,
                message: envelope.message,
                data,
            })
        });
        RequestOutcome {
            method,
            path,
            success: result.is_ok(),
            elapsed: start.elapsed(),
        }
        .log();
        result
    }

    fn dispatch(&self, spec: RequestSpec) -> Dispatch<'_> {
        Box::pin(async move {
            let inner = &self.inner;
            let url = format!("{}{}", inner.base_url, spec.path);
            let mut req = inner
                .http
                .request(spec.method.clone(), &url)
                .header(USER_AGENT, inner.user_agent.as_str());
            if !spec.query.is_empty() {
                req = req.query(&spec.query);
            }
            if let Some(body) = &spec.body {
                req = req.json(body);
            }
            if let Some(token) = spec.bearer.clone().or_else(|| inner.session.access_token()) {
                req = req.bearer_auth(token);
            }

            debug!(
                method = %spec.method,
                path = %spec.path,
                retried = spec.retried,
                "request.send"
            );
            let resp = match req.send().await {
                Ok(resp) => resp,
                Err(err) => return Err(self.network_failure(&spec, err)),
            };

            let status = resp.status();
            if status.is_success() {
                let body = match resp.bytes().await {
                    Ok(body) => body,
                    Err(err) => return Err(self.network_failure(&spec, err)),
                };
                let raw: RawEnvelope = match serde_json::from_slice(&body) {
                    Ok(raw) => raw,
                    Err(err) => return Err(self.malformed_body(&spec.path, err)),
                };
                return self.accept_envelope(raw);
            }

            let body = resp.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED && !spec.retried && !self.is_refresh_call(&spec)
            {
                warn!(path = %spec.path, "received 401; token refresh required");
                return self.refresh_and_replay(spec).await;
            }

            warn!(
                method = %spec.method,
                path = %spec.path,
                status = %status,
                retried = spec.retried,
                "request failed"
            );
            let message = status_message(status, &body);
            inner.notifier.error(&message);
            Err(Error::Transport { status, message })
        })
    }

    async fn refresh_and_replay(&self, spec: RequestSpec) -> Result<Envelope<serde_json::Value>> {
        let inner = &self.inner;
        let Some(refresh_token) = inner.session.refresh_token() else {
            warn!(path = %spec.path, "no refresh token; terminating session");
            inner.session.terminate_session();
            inner.notifier.error(MSG_UNAUTHORIZED);
            return Err(Error::Auth("no refresh token available".into()));
        };

        match inner.gate.admit() {
            Admission::Leader(lease) => {
                let telemetry = RefreshTelemetry::new(spec.path.clone());
                telemetry.emit_start(SystemTime::now());
                match inner.session.refresh(&refresh_token).await {
                    Ok(tokens) => {
                        let resumed = lease.resolve(&tokens.token);
                        telemetry.emit_success(resumed, SystemTime::now());
                        self.dispatch(spec.retry_with(tokens.token)).await
                    }
                    Err(err) => {
                        let rejected = lease.reject();
                        telemetry.emit_failure(&err, rejected, SystemTime::now());
                        inner.session.terminate_session();
                        inner.notifier.error(MSG_SESSION_EXPIRED);
                        Err(Error::Auth(format!("token refresh failed: {err}")))
                    }
                }
            }
            Admission::Waiter { resume, depth } => {
                refresh::emit_queued(&spec.path, depth);
                match resume.await {
                    Ok(token) => self.dispatch(spec.retry_with(token)).await,
                    Err(_) => Err(Error::Auth(
                        "token refresh failed while the request was queued".into(),
                    )),
                }
            }
        }
    }

    fn accept_envelope(&self, raw: RawEnvelope) -> Result<Envelope<serde_json::Value>> {
        if raw.code == 200 {
            return Ok(Envelope {
                code: raw.code,
                message: raw.message.unwrap_or_default(),
                data: raw.data,
            });
        }
        let message = envelope_message(raw.message);
        warn!(code = raw.code, message = %message, "application error");
        self.inner.notifier.error(&message);
        Err(Error::Application {
            code: raw.code,
            message,
        })
    }

    /// A 2xx whose body is not an envelope, or whose `data` has the wrong shape.
    fn malformed_body(&self, path: &str, err: serde_json::Error) -> Error {
        warn!(path, error = %err, "malformed response body");
        self.inner.notifier.error(MSG_REQUEST_FAILED);
        Error::Json(err)
    }

    fn network_failure(&self, spec: &RequestSpec, err: reqwest::Error) -> Error {
        warn!(
            method = %spec.method,
            path = %spec.path,
            timeout = err.is_timeout(),
            error = %err,
            "network error"
        );
        self.inner.notifier.error(MSG_NETWORK);
        Error::Network(err)
    }

    // refresh_path is validated to start with '/', so this matches whole segments only.
    fn is_refresh_call(&self, spec: &RequestSpec) -> bool {
        let path = spec.path.trim_end_matches('/');
        let refresh_path = self.inner.refresh_path.as_str();
        path == refresh_path || path.ends_with(refresh_path)
    }
}
