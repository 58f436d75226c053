//! Runbook action lookups.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{null_as_default, receive, ApiClient, ClientError};

/// Number of actions requested per listing.
pub const RUNBOOK_ACTIONS_PAGE_SIZE: u32 = 100;

/// An integration referenced by a runbook action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    /// Integration ID.
    pub id: String,
    /// Integration slug, e.g. `slack`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
}

/// A single step a runbook can execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunbookAction {
    /// Action ID.
    pub id: String,
    /// The integration that provides the action, if any.
    #[serde(default)]
    pub integration: Option<Integration>,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Slug, unique within the integration.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RunbookAction {
    /// Whether this action is `action_slug` provided by `integration_slug`.
    ///
    /// Actions without an integration never match.
    pub fn matches(&self, integration_slug: &str, action_slug: &str) -> bool {
        self.slug == action_slug
            && self
                .integration
                .as_ref()
                .is_some_and(|integration| integration.slug == integration_slug)
    }
}

#[derive(Debug, Deserialize)]
struct RunbookActionsResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: Vec<RunbookAction>,
}

#[derive(Debug, Serialize)]
struct RunbookActionsQuery<'a> {
    #[serde(rename = "type")]
    runbook_type: &'a str,
    per_page: u32,
}

/// Read access to runbook actions.
#[async_trait]
pub trait RunbookActionsClient: Send + Sync {
    /// Find the action `action_slug` of integration `integration_slug` among
    /// the actions available to runbooks of `runbook_type`.
    async fn get(
        &self,
        runbook_type: &str,
        integration_slug: &str,
        action_slug: &str,
    ) -> Result<RunbookAction, ClientError>;
}

/// [`RunbookActionsClient`] backed by the REST API.
#[derive(Debug, Clone)]
pub struct RestRunbookActionsClient {
    api: ApiClient,
}

impl RestRunbookActionsClient {
    /// Create a client sharing `api`'s HTTP handle.
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl RunbookActionsClient for RestRunbookActionsClient {
    #[instrument(skip(self), name = "runbook_actions.get")]
    async fn get(
        &self,
        runbook_type: &str,
        integration_slug: &str,
        action_slug: &str,
    ) -> Result<RunbookAction, ClientError> {
        let query = RunbookActionsQuery {
            runbook_type,
            per_page: RUNBOOK_ACTIONS_PAGE_SIZE,
        };
        let request = self.api.request(Method::GET, "runbooks/actions")?.query(&query);
        let response: RunbookActionsResponse =
            receive(request, "could not get runbook actions").await?;

        find_action(response.data, integration_slug, action_slug)
    }
}

/// Pick the first action matching both slugs, in the order given.
pub(crate) fn find_action(
    actions: Vec<RunbookAction>,
    integration_slug: &str,
    action_slug: &str,
) -> Result<RunbookAction, ClientError> {
    actions
        .into_iter()
        .find(|action| action.matches(integration_slug, action_slug))
        .ok_or_else(|| {
            ClientError::NotFound(format!(
                "could not find runbook action '{}' for integration '{}'",
                action_slug, integration_slug
            ))
        })
}
