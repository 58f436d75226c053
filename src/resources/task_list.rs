//! `firehydrant_task_list` resource.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::client::{CreateTaskListRequest, TaskListItem, TaskListsClient, UpdateTaskListRequest};
use crate::error::ProviderError;
use crate::resource::Resource;
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::state::{ResourceData, ID_FIELD};

/// Host type name.
pub const TASK_LIST_RESOURCE: &str = "firehydrant_task_list";

const ITEM_BLOCK: &str = "task_list_item";

/// Schema of [`TaskListResource`].
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A checklist that can be attached to incidents.")
        .with_attribute(ID_FIELD, Attribute::computed_string())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_block(
            ITEM_BLOCK,
            NestedBlock::list(
                Block::new()
                    .with_description("One entry of the checklist, in order.")
                    .with_attribute("summary", Attribute::required_string())
                    .with_attribute("description", Attribute::optional_string()),
            ),
        )
}

/// Manages task lists.
pub struct TaskListResource {
    client: Arc<dyn TaskListsClient>,
}

impl TaskListResource {
    /// Create the adapter around `client`.
    pub fn new(client: Arc<dyn TaskListsClient>) -> Self {
        Self { client }
    }
}

fn items_value(items: &[TaskListItem]) -> serde_json::Value {
    items
        .iter()
        .map(|item| json!({"summary": item.summary, "description": item.description}))
        .collect()
}

#[async_trait]
impl Resource for TaskListResource {
    fn type_name(&self) -> &'static str {
        TASK_LIST_RESOURCE
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        let req = CreateTaskListRequest {
            name: data.get_string("name")?,
            description: data.get_string("description")?,
            items: data.get_list(ITEM_BLOCK)?,
        };

        let task_list = self.client.create(req).await?;
        debug!(id = %task_list.id, items = task_list.items.len(), "task list created");

        data.set_id(task_list.id);
        Ok(())
    }

    async fn read(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        let task_list = self.client.get(data.id()).await?;

        data.set_all([
            ("name", json!(task_list.name)),
            ("description", json!(task_list.description)),
            (ITEM_BLOCK, items_value(&task_list.items)),
        ])
    }

    async fn update(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        let req = UpdateTaskListRequest {
            name: data.get_string("name")?,
            description: data.get_string("description")?,
            items: data.get_list(ITEM_BLOCK)?,
        };

        self.client.update(data.id(), req).await?;
        Ok(())
    }

    async fn delete(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        self.client.delete(data.id()).await?;
        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use crate::testing::InMemoryApi;

    fn resource(api: &InMemoryApi) -> TaskListResource {
        TaskListResource::new(api.clients().task_lists)
    }

    fn data(state: serde_json::Value) -> ResourceData {
        ResourceData::new(&schema(), state).unwrap()
    }

    fn config() -> serde_json::Value {
        json!({
            "name": "Triage",
            "description": "first ten minutes",
            "task_list_item": [
                {"summary": "Page on-call", "description": "use the escalation policy"},
                {"summary": "Open a channel", "description": null}
            ]
        })
    }

    #[tokio::test]
    async fn test_create_then_read_round_trips() {
        let api = InMemoryApi::new();
        let resource = resource(&api);

        let mut created = data(config());
        resource.create(&mut created).await.unwrap();
        assert!(!created.id().is_empty());

        let mut read = data(json!({"id": created.id()}));
        resource.read(&mut read).await.unwrap();

        let state = read.into_state();
        assert_eq!(state["name"], "Triage");
        assert_eq!(state["description"], "first ten minutes");
        assert_eq!(
            state["task_list_item"],
            json!([
                {"summary": "Page on-call", "description": "use the escalation policy"},
                {"summary": "Open a channel", "description": ""}
            ])
        );
    }

    #[tokio::test]
    async fn test_update_replaces_items() {
        let api = InMemoryApi::new();
        let resource = resource(&api);

        let mut state = data(config());
        resource.create(&mut state).await.unwrap();

        state
            .set_all([
                ("name", json!("Triage v2")),
                ("task_list_item", json!([{"summary": "Only step"}])),
            ])
            .unwrap();
        resource.update(&mut state).await.unwrap();

        let stored = api.task_list(state.id()).unwrap();
        assert_eq!(stored.name, "Triage v2");
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items[0].summary, "Only step");
    }

    #[tokio::test]
    async fn test_create_reports_missing_items() {
        let api = InMemoryApi::new();
        api.fail_task_list_updates(true);
        let resource = resource(&api);

        let mut state = data(config());
        let err = resource.create(&mut state).await.unwrap_err();

        match err {
            ProviderError::Api(ref client_err @ ClientError::CreatedWithoutItems { .. }) => {
                let id = client_err.created_id().unwrap();
                assert!(api.task_list(id).unwrap().items.is_empty());
            },
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(state.id(), "");
    }

    #[tokio::test]
    async fn test_delete_then_read_fails() {
        let api = InMemoryApi::new();
        let resource = resource(&api);

        let mut state = data(config());
        resource.create(&mut state).await.unwrap();
        let id = state.id().to_string();

        resource.delete(&mut state).await.unwrap();
        assert_eq!(state.id(), "");

        let mut gone = data(json!({"id": id}));
        assert!(resource.read(&mut gone).await.unwrap_err().is_not_found());
    }
}
