//! Entity lists that stay in sync with the server.
//!
//! Every mutation is followed by a full re-fetch of the list, whether or not the mutation
//! succeeded. The server is the source of truth; the cached snapshot is only ever
//! replaced wholesale by the latest successful fetch.

mod revisions;
mod users;

pub use revisions::RevisionsApi;
pub use users::UsersApi;

use crate::ApiResult;
use async_trait::async_trait;

/// CRUD over one server-side collection.
#[async_trait]
pub trait EntityApi: Send + Sync {
    type Item: Clone + Send + Sync;
    type Draft: Send + Sync;

    /// Short name used in log lines.
    fn entity_name(&self) -> &'static str;

    /// Local checks run before a create or update is sent. Failing here sends nothing.
    fn validate(&self, _draft: &Self::Draft) -> ApiResult<()> {
        Ok(())
    }

    async fn list(&self) -> ApiResult<Vec<Self::Item>>;
    async fn create(&self, draft: &Self::Draft) -> ApiResult<Self::Item>;
    async fn update(&self, id: i64, draft: &Self::Draft) -> ApiResult<Self::Item>;
    async fn delete(&self, id: i64) -> ApiResult<()>;
}

/// A cached list plus the API it mirrors.
///
/// Mutations never patch the snapshot; they are always followed by
/// [`refresh`](Self::refresh), whether they succeeded or not.
pub struct ListRefresh<A: EntityApi> {
    api: A,
    items: Vec<A::Item>,
}

impl<A: EntityApi> ListRefresh<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Snapshot from the most recent successful fetch.
    pub fn items(&self) -> &[A::Item] {
        &self.items
    }

    /// Replaces the snapshot with the server's list. On failure the old snapshot is kept.
    pub async fn refresh(&mut self) -> ApiResult<&[A::Item]> {
        match self.api.list().await {
            Ok(items) => {
                self.items = items;
                Ok(&self.items)
            }
            Err(err) => {
                tracing::error!("Failed to fetch {} list: {}", self.api.entity_name(), err);
                Err(err)
            }
        }
    }

    /// Creates an entity, then re-fetches the list.
    ///
    /// # Arguments
    ///
    /// * `draft` - Payload checked by [`EntityApi::validate`] before anything is sent.
    ///
    /// # Returns
    ///
    /// The server's result for the create itself. A failed local validation returns early
    /// with no request and no re-fetch; a failed re-fetch is logged and does not change the
    /// result.
    pub async fn create(&mut self, draft: &A::Draft) -> ApiResult<A::Item> {
        self.api.validate(draft)?;
        let result = self.api.create(draft).await;
        self.after_mutation("create", &result).await;
        result
    }

    pub async fn update(&mut self, id: i64, draft: &A::Draft) -> ApiResult<A::Item> {
        self.api.validate(draft)?;
        let result = self.api.update(id, draft).await;
        self.after_mutation("update", &result).await;
        result
    }

    pub async fn delete(&mut self, id: i64) -> ApiResult<()> {
        let result = self.api.delete(id).await;
        self.after_mutation("delete", &result).await;
        result
    }

    async fn after_mutation<T>(&mut self, action: &str, result: &ApiResult<T>) {
        if let Err(err) = result {
            tracing::error!("Failed to {action} {}: {err}", self.api.entity_name());
        }
        // The refresh error is already logged; the mutation's outcome is what the caller gets.
        let _ = self.refresh().await;
    }
}
