use crate::errors::Result;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpec;
use crate::types::{Envelope, PageResult, Post, PostForm};

#[derive(Clone, Copy)]
pub struct PostApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> PostApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    /// Published posts, paginated.
    pub async fn list(
        self,
        page: Option<u32>,
        size: Option<u32>,
        keyword: Option<&str>,
    ) -> Result<Envelope<PageResult<Post>>> {
        self.pipeline
            .send(paged("/posts", page, size, keyword))
            .await
    }

    /// Every post including drafts.
    pub async fn list_admin(
        self,
        page: Option<u32>,
        size: Option<u32>,
        keyword: Option<&str>,
    ) -> Result<Envelope<PageResult<Post>>> {
        self.pipeline
            .send(paged("/posts/admin", page, size, keyword))
            .await
    }

    pub async fn get(self, id: i64) -> Result<Envelope<Post>> {
        self.pipeline.send(RequestSpec::get(format!("/posts/{id}"))).await
    }

    pub async fn by_category(self, category_id: i64) -> Result<Envelope<Vec<Post>>> {
        self.pipeline
            .send(RequestSpec::get(format!("/posts/category/{category_id}")))
            .await
    }

    pub async fn by_tag(self, tag_id: i64) -> Result<Envelope<Vec<Post>>> {
        self.pipeline
            .send(RequestSpec::get(format!("/posts/tag/{tag_id}")))
            .await
    }

    pub async fn create(self, form: &PostForm) -> Result<Envelope<Post>> {
        self.pipeline
            .send(RequestSpec::post("/posts").json(form)?)
            .await
    }

    pub async fn update(self, id: i64, form: &PostForm) -> Result<Envelope<Post>> {
        self.pipeline
            .send(RequestSpec::put(format!("/posts/{id}")).json(form)?)
            .await
    }

    pub async fn delete(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::delete(format!("/posts/{id}")))
            .await
    }

    pub async fn like(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::post(format!("/posts/{id}/like")))
            .await
    }
}

fn paged(path: &str, page: Option<u32>, size: Option<u32>, keyword: Option<&str>) -> RequestSpec {
    RequestSpec::get(path)
        .query_opt("page", page)
        .query_opt("size", size)
        .query_opt("keyword", keyword)
}
