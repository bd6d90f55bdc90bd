#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use blog_client::session::{ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, SessionStorage};
use blog_client::{BlogClient, BufferedNotifier, Config};
use tracing::subscriber::{DefaultGuard, set_default};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Registry, fmt};
use wiremock::MockServer;

struct VecWriter {
    lines: Arc<Mutex<Vec<String>>>,
}

impl std::io::Write for VecWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut guard = self.lines.lock().unwrap();
        guard.push(String::from_utf8_lossy(buf).into_owned());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn capture_logs() -> (Arc<Mutex<Vec<String>>>, DefaultGuard) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let writer_lines = lines.clone();
    let subscriber = Registry::default().with(
        fmt::Layer::default()
            .with_writer(move || VecWriter {
                lines: writer_lines.clone(),
            })
            .with_target(false)
            .with_level(true)
            .with_ansi(false),
    );
    let guard = set_default(subscriber);
    (lines, guard)
}

pub fn ok(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({"code": 200, "message": "ok", "data": data})
}

/// Client against `server` with an already-persisted (possibly stale) token pair.
pub fn client_with_tokens(
    server: &MockServer,
    access: Option<&str>,
    refresh: Option<&str>,
) -> (BlogClient, Arc<BufferedNotifier>, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    if let Some(access) = access {
        storage.set(ACCESS_TOKEN_KEY, access).unwrap();
    }
    if let Some(refresh) = refresh {
        storage.set(REFRESH_TOKEN_KEY, refresh).unwrap();
    }
    let notifier = Arc::new(BufferedNotifier::new());
    let client = BlogClient::with_storage(
        Config::new(server.uri()),
        notifier.clone(),
        storage.clone(),
    )
    .expect("client builds");
    (client, notifier, storage)
}

pub fn bearer(req: &wiremock::Request) -> Option<String> {
    req.headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}
