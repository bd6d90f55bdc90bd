use crate::errors::Result;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpec;
use crate::types::{Envelope, Tag, TagForm};

#[derive(Clone, Copy)]
pub struct TagApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> TagApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(self) -> Result<Envelope<Vec<Tag>>> {
        self.pipeline.send(RequestSpec::get("/tags")).await
    }

    pub async fn get(self, id: i64) -> Result<Envelope<Tag>> {
        self.pipeline.send(RequestSpec::get(format!("/tags/{id}"))).await
    }

    pub async fn by_post(self, post_id: i64) -> Result<Envelope<Vec<Tag>>> {
        self.pipeline
            .send(RequestSpec::get(format!("/tags/post/{post_id}")))
            .await
    }

    pub async fn create(self, form: &TagForm) -> Result<Envelope<Tag>> {
        self.pipeline
            .send(RequestSpec::post("/tags").json(form)?)
            .await
    }

    pub async fn update(self, id: i64, form: &TagForm) -> Result<Envelope<Tag>> {
        self.pipeline
            .send(RequestSpec::put(format!("/tags/{id}")).json(form)?)
            .await
    }

    pub async fn delete(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::delete(format!("/tags/{id}")))
            .await
    }
}
