pub mod api;
mod client;
pub mod config;
pub mod errors;
pub mod notify;
pub mod pipeline;
mod request;
pub mod session;
pub mod telemetry;
pub mod types;

pub use client::BlogClient;
pub use config::Config;
pub use errors::{Error, Result};
pub use notify::{BufferedNotifier, Notifier, TracingNotifier};
pub use pipeline::RequestPipeline;
pub use request::RequestSpec;
pub use session::{SessionStore, TokenSession};
pub use types::{Envelope, PageResult};

#[cfg(test)]
mod tests;
