use crate::errors::Result;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpec;
use crate::types::{Category, CategoryForm, Envelope};

#[derive(Clone, Copy)]
pub struct CategoryApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> CategoryApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(self) -> Result<Envelope<Vec<Category>>> {
        self.pipeline.send(RequestSpec::get("/categories")).await
    }

    pub async fn get(self, id: i64) -> Result<Envelope<Category>> {
        self.pipeline
            .send(RequestSpec::get(format!("/categories/{id}")))
            .await
    }

    pub async fn create(self, form: &CategoryForm) -> Result<Envelope<Category>> {
        self.pipeline
            .send(RequestSpec::post("/categories").json(form)?)
            .await
    }

    pub async fn update(self, id: i64, form: &CategoryForm) -> Result<Envelope<Category>> {
        self.pipeline
            .send(RequestSpec::put(format!("/categories/{id}")).json(form)?)
            .await
    }

    pub async fn delete(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::delete(format!("/categories/{id}")))
            .await
    }
}
