use crate::errors::Result;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpec;
use crate::types::{Comment, CommentForm, CommentStatus, Envelope, PageResult};

#[derive(Clone, Copy)]
pub struct CommentApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> CommentApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// Moderation listing, optionally filtered by review status.
    pub async fn list_admin(
        self,
        page: Option<u32>,
        size: Option<u32>,
        status: Option<CommentStatus>,
    ) -> Result<Envelope<PageResult<Comment>>> {
        let spec = RequestSpec::get("/comments/admin")
            .query_opt("page", page)
            .query_opt("size", size)
            .query_opt("status", status.map(CommentStatus::code));
        self.pipeline.send(spec).await
    }

    pub async fn by_post(self, post_id: i64) -> Result<Envelope<Vec<Comment>>> {
        self.pipeline
            .send(RequestSpec::get(format!("/comments/post/{post_id}")))
            .await
    }

    pub async fn get(self, id: i64) -> Result<Envelope<Comment>> {
        self.pipeline
            .send(RequestSpec::get(format!("/comments/{id}")))
            .await
    }

    pub async fn create(self, form: &CommentForm) -> Result<Envelope<Comment>> {
        self.pipeline
            .send(RequestSpec::post("/comments").json(form)?)
            .await
    }

    pub async fn update(self, id: i64, form: &CommentForm) -> Result<Envelope<Comment>> {
        self.pipeline
            .send(RequestSpec::put(format!("/comments/{id}")).json(form)?)
            .await
    }

    pub async fn delete(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::delete(format!("/comments/{id}")))
            .await
    }

    pub async fn approve(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::post(format!("/comments/{id}/approve")))
            .await
    }

    pub async fn reject(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::post(format!("/comments/{id}/reject")))
            .await
    }
}
