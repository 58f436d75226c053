//! Priority CRUD. Priorities are addressed by their slug.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{null_as_default, path_segment, receive, receive_empty, ApiClient, ClientError};

/// A priority as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    /// Slug, e.g. `P1`.
    pub slug: String,
    /// Description.
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Whether this is the default priority for new incidents.
    #[serde(default, deserialize_with = "null_as_default")]
    pub default: bool,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a priority.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CreatePriorityRequest {
    /// Slug chosen by the caller.
    pub slug: String,
    /// Description.
    pub description: String,
    /// Default flag.
    pub default: bool,
}

/// Full-replacement payload for updating a priority.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UpdatePriorityRequest {
    /// Slug of the priority being updated.
    pub slug: String,
    /// Description.
    pub description: String,
    /// Default flag.
    pub default: bool,
}

/// CRUD access to priorities.
#[async_trait]
pub trait PrioritiesClient: Send + Sync {
    /// Fetch a priority by slug.
    async fn get(&self, slug: &str) -> Result<Priority, ClientError>;

    /// Create a priority.
    async fn create(&self, req: CreatePriorityRequest) -> Result<Priority, ClientError>;

    /// Replace a priority's description and default flag.
    async fn update(&self, slug: &str, req: UpdatePriorityRequest)
        -> Result<Priority, ClientError>;

    /// Delete a priority.
    async fn delete(&self, slug: &str) -> Result<(), ClientError>;
}

/// [`PrioritiesClient`] backed by the REST API.
#[derive(Debug, Clone)]
pub struct RestPrioritiesClient {
    api: ApiClient,
}

impl RestPrioritiesClient {
    /// Create a client sharing `api`'s HTTP handle.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn item_path(slug: &str) -> Result<String, ClientError> {
        Ok(format!("priorities/{}", path_segment("priority slug", slug)?))
    }
}

#[async_trait]
impl PrioritiesClient for RestPrioritiesClient {
    #[instrument(skip(self), name = "priorities.get")]
    async fn get(&self, slug: &str) -> Result<Priority, ClientError> {
        let request = self.api.request(Method::GET, &Self::item_path(slug)?)?;
        receive(request, "could not get priority").await
    }

    #[instrument(skip(self, req), fields(slug = %req.slug), name = "priorities.create")]
    async fn create(&self, req: CreatePriorityRequest) -> Result<Priority, ClientError> {
        if req.slug.is_empty() {
            return Err(ClientError::Validation(
                "priority slug must not be empty".to_string(),
            ));
        }
        let request = self.api.request(Method::POST, "priorities")?.json(&req);
        receive(request, "could not create priority").await
    }

    #[instrument(skip(self, req), name = "priorities.update")]
    async fn update(
        &self,
        slug: &str,
        req: UpdatePriorityRequest,
    ) -> Result<Priority, ClientError> {
        let request = self
            .api
            .request(Method::PUT, &Self::item_path(slug)?)?
            .json(&req);
        receive(request, "could not update priority").await
    }

    #[instrument(skip(self), name = "priorities.delete")]
    async fn delete(&self, slug: &str) -> Result<(), ClientError> {
        let request = self.api.request(Method::DELETE, &Self::item_path(slug)?)?;
        receive_empty(request, "could not delete priority").await
    }
}
