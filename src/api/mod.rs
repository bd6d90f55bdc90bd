//! Typed wrappers over [`crate::pipeline::RequestPipeline`], one per resource.

mod auth;
mod categories;
mod comments;
mod posts;
mod tags;
mod users;

pub use auth::AuthApi;
pub use categories::CategoryApi;
pub use comments::CommentApi;
pub use posts::PostApi;
pub use tags::TagApi;
pub use users::UserApi;
