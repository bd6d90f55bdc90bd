use crate::errors::Result;
use crate::pipeline::RequestPipeline;
use crate::request::RequestSpec;
use crate::types::{ChangePasswordForm, Envelope, User, UserUpdateForm};

#[derive(Clone, Copy)]
pub struct UserApi<'a> {
    pipeline: &'a RequestPipeline,
}

impl<'a> UserApi<'a> {
    pub fn new(pipeline: &'a RequestPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn list(self) -> Result<Envelope<Vec<User>>> {
        self.pipeline.send(RequestSpec::get("/users")).await
    }

    pub async fn get(self, id: i64) -> Result<Envelope<User>> {
        self.pipeline.send(RequestSpec::get(format!("/users/{id}"))).await
    }

    pub async fn update(self, id: i64, form: &UserUpdateForm) -> Result<Envelope<User>> {
        self.pipeline
            .send(RequestSpec::put(format!("/users/{id}")).json(form)?)
            .await
    }

    pub async fn delete(self, id: i64) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::delete(format!("/users/{id}")))
            .await
    }

    pub async fn change_password(
        self,
        id: i64,
        form: &ChangePasswordForm,
    ) -> Result<Envelope<()>> {
        self.pipeline
            .send(RequestSpec::post(format!("/users/{id}/change-password")).json(form)?)
            .await
    }
}
