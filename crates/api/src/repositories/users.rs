use super::EntityApi;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{ApiClient, ApiResult};
use async_trait::async_trait;
use cardio_core::models::{User, UserPayload};

/// `/users` as an [`EntityApi`]. Payloads arrive already validated by `UserForm`.
#[derive(Debug, Clone)]
pub struct UsersApi<T = ReqwestTransport> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> UsersApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<T: HttpTransport> EntityApi for UsersApi<T> {
    type Item = User;
    type Draft = UserPayload;

    fn entity_name(&self) -> &'static str {
        "user"
    }

    async fn list(&self) -> ApiResult<Vec<User>> {
        self.client.list_users().await
    }

    async fn create(&self, draft: &UserPayload) -> ApiResult<User> {
        self.client.create_user(draft).await
    }

    async fn update(&self, id: i64, draft: &UserPayload) -> ApiResult<User> {
        self.client.update_user(id, draft).await
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete_user(id).await
    }
}
