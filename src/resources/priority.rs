//! `firehydrant_priority` resource.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::client::{CreatePriorityRequest, PrioritiesClient, UpdatePriorityRequest};
use crate::error::ProviderError;
use crate::resource::Resource;
use crate::schema::{Attribute, Schema};
use crate::state::{ResourceData, ID_FIELD};

/// Host type name.
pub const PRIORITY_RESOURCE: &str = "firehydrant_priority";

/// Schema of [`PriorityResource`].
pub fn schema() -> Schema {
    Schema::v0()
        .with_description("A priority incidents can be triaged with.")
        .with_attribute(
            ID_FIELD,
            Attribute::computed_string().with_description("Same as the slug."),
        )
        .with_attribute(
            "slug",
            Attribute::required_string()
                .with_description("Unique slug, e.g. `P1`.")
                .with_force_new(),
        )
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "default",
            Attribute::optional_bool()
                .with_description("Whether new incidents get this priority.")
                .with_default(json!(false)),
        )
}

/// Manages priorities. The slug doubles as the resource identity.
pub struct PriorityResource {
    client: Arc<dyn PrioritiesClient>,
}

impl PriorityResource {
    /// Create the adapter around `client`.
    pub fn new(client: Arc<dyn PrioritiesClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Resource for PriorityResource {
    fn type_name(&self) -> &'static str {
        PRIORITY_RESOURCE
    }

    fn schema(&self) -> Schema {
        schema()
    }

    async fn create(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        let req = CreatePriorityRequest {
            slug: data.get_string("slug")?,
            description: data.get_string("description")?,
            default: data.get_bool("default")?,
        };

        let priority = self.client.create(req).await?;
        debug!(slug = %priority.slug, "priority created");

        data.set_all([
            (ID_FIELD, json!(priority.slug)),
            ("description", json!(priority.description)),
        ])
    }

    async fn read(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        // imports only carry the id
        let slug = match data.id() {
            "" => data.get_string("slug")?,
            id => id.to_string(),
        };

        let priority = self.client.get(&slug).await?;

        data.set_all([
            ("slug", json!(priority.slug)),
            ("description", json!(priority.description)),
            ("default", json!(priority.default)),
        ])?;
        if data.id().is_empty() {
            data.set_id(priority.slug);
        }
        Ok(())
    }

    async fn update(&self, data: &mut ResourceData) -> Result<(), ProviderError> {
        let slug = data.id().to_string();
        let req = UpdatePriorityRequest {
            slug: slug.clone(),
            description: data.get_string("description")?,
            default: data.get_bool("default")?,
        };

        self.client.update(&slug, req).await?;
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
    use crate::testing::InMemoryApi;

    fn resource(api: &InMemoryApi) -> PriorityResource {
        PriorityResource::new(api.clients().priorities)
    }

    fn data(state: serde_json::Value) -> ResourceData {
        ResourceData::new(&schema(), state).unwrap()
    }

    #[tokio::test]
    async fn test_create_uses_slug_as_id() {
        let api = InMemoryApi::new();
        let resource = resource(&api);

        let mut data = data(json!({"slug": "P1", "description": "d"}));
        resource.create(&mut data).await.unwrap();

        assert_eq!(data.id(), "P1");
        let stored = api.priority("P1").unwrap();
        assert_eq!(stored.description, "d");
        assert!(!stored.default);
    }

    #[tokio::test]
    async fn test_create_update_read() {
        let api = InMemoryApi::new();
        let resource = resource(&api);

        let mut data = data(json!({"slug": "p1", "description": "d", "default": false}));
        resource.create(&mut data).await.unwrap();

        data.set_all([("description", json!("d2")), ("default", json!(true))])
            .unwrap();
        resource.update(&mut data).await.unwrap();

        let mut fresh = self::data(json!({"id": "p1"}));
        resource.read(&mut fresh).await.unwrap();
        assert_eq!(fresh.get_string("slug").unwrap(), "p1");
        assert_eq!(fresh.get_string("description").unwrap(), "d2");
        assert!(fresh.get_bool("default").unwrap());
        assert_eq!(fresh.id(), "p1");
    }

    #[tokio::test]
    async fn test_read_without_id_uses_slug() {
        let api = InMemoryApi::new();
        let resource = resource(&api);
        let mut data = data(json!({"slug": "P2", "description": "minor"}));
        resource.create(&mut data).await.unwrap();

        let mut by_slug = self::data(json!({"slug": "P2"}));
        resource.read(&mut by_slug).await.unwrap();
        assert_eq!(by_slug.id(), "P2");
        assert_eq!(by_slug.get_string("description").unwrap(), "minor");
    }

    #[tokio::test]
    async fn test_delete_clears_id() {
        let api = InMemoryApi::new();
        let resource = resource(&api);

        let mut data = data(json!({"slug": "P1"}));
        resource.create(&mut data).await.unwrap();
        resource.delete(&mut data).await.unwrap();

        assert_eq!(data.id(), "");
        assert!(api.priority("P1").is_none());

        let mut gone = self::data(json!({"id": "P1"}));
        let err = resource.read(&mut gone).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
