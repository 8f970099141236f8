use super::EntityApi;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::{ApiClient, ApiResult};
use async_trait::async_trait;
use cardio_core::{Revision, RevisionDraft};

/// `/revisions` as an [`EntityApi`].
#[derive(Debug, Clone)]
pub struct RevisionsApi<T = ReqwestTransport> {
    client: ApiClient<T>,
}

impl<T: HttpTransport> RevisionsApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<T: HttpTransport> EntityApi for RevisionsApi<T> {
    type Item = Revision;
    type Draft = RevisionDraft;

    fn entity_name(&self) -> &'static str {
        "revision"
    }

    fn validate(&self, draft: &RevisionDraft) -> ApiResult<()> {
        Ok(draft.validate()?)
    }

    async fn list(&self) -> ApiResult<Vec<Revision>> {
        self.client.list_revisions().await
    }

    async fn create(&self, draft: &RevisionDraft) -> ApiResult<Revision> {
        self.client.create_revision(draft).await
    }

    async fn update(&self, id: i64, draft: &RevisionDraft) -> ApiResult<Revision> {
        self.client.update_revision(id, draft).await
    }

    async fn delete(&self, id: i64) -> ApiResult<()> {
        self.client.delete_revision(id).await
    }
}
