//! `firehydrant_runbook_action` data source.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::RunbookActionsClient;
use crate::error::ProviderError;
use crate::resource::DataSource;
use crate::schema::{Attribute, Schema};
use crate::state::{ResourceData, ID_FIELD};

/// Host type name.
pub const RUNBOOK_ACTION_DATA_SOURCE: &str = "firehydrant_runbook_action";

/// Schema of [`RunbookActionDataSource`].
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("Looks up a runbook action by integration and slug.")
        // Required
        .with_attribute("integration_slug", Attribute::required_string())
        .with_attribute("slug", Attribute::required_string())
        .with_attribute(
            "type",
            Attribute::required_string().with_description("Runbook type, e.g. `incident`."),
        )
        // Computed
        .with_attribute(ID_FIELD, Attribute::computed_string())
        .with_attribute("name", Attribute::computed_string())
}

/// Resolves runbook actions.
pub struct RunbookActionDataSource {
    client: Arc<dyn RunbookActionsClient>,
}

impl RunbookActionDataSource {
    /// Create the adapter around `client`.
    pub fn new(client: Arc<dyn RunbookActionsClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DataSource for RunbookActionDataSource {
    fn type_name(&self) -> &'static str {
        RUNBOOK_ACTION_DATA_SOURCE
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn read(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        let runbook_type = data.get_string("type")?;
        let action_slug = data.get_string("slug")?;
        let integration_slug = data.get_string("integration_slug")?;

        let action = self
            .client
            .get(&runbook_type, &integration_slug, &action_slug)
            .await?;

        let mut fields: Vec<(&str, Value)> = vec![
            (ID_FIELD, json!(action.id)),
            ("name", json!(action.name)),
            ("slug", json!(action.slug)),
        ];
        if let Some(integration) = action.integration {
            fields.push(("integration_slug", json!(integration.slug)));
        }
        data.set_all(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Integration, RunbookAction};
    use crate::testing::InMemoryApi;

    fn action(id: &str, slug: &str, integration: &str) -> RunbookAction {
        RunbookAction {
            id: id.to_string(),
            integration: Some(Integration {
                id: format!("{}-id", integration),
                slug: integration.to_string(),
            }),
            name: format!("{} via {}", slug, integration),
            slug: slug.to_string(),
            created_at: None,
            updated_at: None,
        }
    }

    fn data_source() -> RunbookActionDataSource {
        let api = InMemoryApi::new().with_runbook_actions(
            "alert",
            vec![
                action("a1", "notify", "pagerduty"),
                action("a2", "escalate", "pagerduty"),
                action("a3", "notify", "slack"),
            ],
        );
        RunbookActionDataSource::new(api.clients().runbook_actions)
    }

    #[tokio::test]
    async fn test_read_sets_computed_fields() {
        let mut data = ResourceData::new(
            &schema(),
            json!({"type": "alert", "integration_slug": "pagerduty", "slug": "escalate"}),
        )
        .unwrap();

        data_source().read(&mut data).await.unwrap();

        assert_eq!(data.id(), "a2");
        assert_eq!(data.get_string("name").unwrap(), "escalate via pagerduty");
        assert_eq!(data.get_string("integration_slug").unwrap(), "pagerduty");
    }

    #[tokio::test]
    async fn test_read_missing_action() {
        let mut data = ResourceData::new(
            &schema(),
            json!({"type": "alert", "integration_slug": "pagerduty", "slug": "missing"}),
        )
        .unwrap();

        let err = data_source().read(&mut data).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(data.id(), "");
    }

    #[tokio::test]
    async fn test_read_filters_by_type() {
        let mut data = ResourceData::new(
            &schema(),
            json!({"type": "incident", "integration_slug": "slack", "slug": "notify"}),
        )
        .unwrap();

        assert!(data_source().read(&mut data).await.is_err());
    }
}
