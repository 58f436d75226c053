//! The FireHydrant provider.
//!
//! [`FireHydrantProvider`] owns a registry of resource and data source
//! adapters. The registry is built by `configure` from the REST clients (or
//! up front from injected clients) and swapped in behind a lock; callbacks
//! clone the `Arc` out and release the lock before doing any I/O.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::client::{ApiClient, Clients};
use crate::config::{self, ProviderConfig};
use crate::error::ProviderError;
use crate::plan;
use crate::resource::{DataSource, Resource};
use crate::resources::{
    priority, runbook_action, task_list, PriorityResource, RunbookActionDataSource,
    TaskListResource, PRIORITY_RESOURCE, RUNBOOK_ACTION_DATA_SOURCE, TASK_LIST_RESOURCE,
};
use crate::schema::{Diagnostic, ProviderSchema, Schema};
use crate::service::ProviderService;
use crate::state::ResourceData;
use crate::types::{ImportedResource, PlanResult};
use crate::validation;

/// Adapters keyed by host type name.
struct Registry {
    resources: BTreeMap<&'static str, Arc<dyn Resource>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSource>>,
}

impl Registry {
    fn new(clients: &Clients) -> Self {
        let resources: Vec<Arc<dyn Resource>> = vec![
            Arc::new(TaskListResource::new(clients.task_lists.clone())),
            Arc::new(PriorityResource::new(clients.priorities.clone())),
        ];
        let data_sources: Vec<Arc<dyn DataSource>> = vec![Arc::new(
            RunbookActionDataSource::new(clients.runbook_actions.clone()),
        )];

        Self {
            resources: resources.into_iter().map(|r| (r.type_name(), r)).collect(),
            data_sources: data_sources
                .into_iter()
                .map(|d| (d.type_name(), d))
                .collect(),
        }
    }
}

/// Provider for FireHydrant runbook actions, task lists and priorities.
pub struct FireHydrantProvider {
    registry: RwLock<Option<Arc<Registry>>>,
}

impl Default for FireHydrantProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FireHydrantProvider {
    /// An unconfigured provider; `configure` must run before any resource call.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(None),
        }
    }

    /// A provider already wired to `clients`.
    ///
    /// A later `configure` replaces them with REST clients.
    pub fn with_clients(clients: Clients) -> Self {
        Self {
            registry: RwLock::new(Some(Arc::new(Registry::new(&clients)))),
        }
    }

    fn install(&self, clients: Clients) -> Result<(), ProviderError> {
        let registry = Arc::new(Registry::new(&clients));
        let mut guard = self
            .registry
            .write()
            .map_err(|_| ProviderError::Sdk("provider registry lock poisoned".to_string()))?;
        *guard = Some(registry);
        Ok(())
    }

    fn registry(&self) -> Result<Arc<Registry>, ProviderError> {
        let guard = self
            .registry
            .read()
            .map_err(|_| ProviderError::Sdk("provider registry lock poisoned".to_string()))?;
        (*guard).clone().ok_or_else(|| {
            ProviderError::Configuration("provider has not been configured".to_string())
        })
    }

    fn resource(&self, resource_type: &str) -> Result<Arc<dyn Resource>, ProviderError> {
        self.registry()?
            .resources
            .get(resource_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    fn data_source(&self, data_source_type: &str) -> Result<Arc<dyn DataSource>, ProviderError> {
        self.registry()?
            .data_sources
            .get(data_source_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }
}

fn resource_schema(resource_type: &str) -> Result<Schema, ProviderError> {
    match resource_type {
        TASK_LIST_RESOURCE => Ok(task_list::schema()),
        PRIORITY_RESOURCE => Ok(priority::schema()),
        other => Err(ProviderError::UnknownResource(other.to_string())),
    }
}

fn data_source_schema(data_source_type: &str) -> Result<Schema, ProviderError> {
    match data_source_type {
        RUNBOOK_ACTION_DATA_SOURCE => Ok(runbook_action::schema()),
        other => Err(ProviderError::UnknownResource(other.to_string())),
    }
}

#[async_trait::async_trait]
impl ProviderService for FireHydrantProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new()
            .with_provider_config(config::schema())
            .with_resource(TASK_LIST_RESOURCE, task_list::schema())
            .with_resource(PRIORITY_RESOURCE, priority::schema())
            .with_data_source(RUNBOOK_ACTION_DATA_SOURCE, runbook_action::schema())
    }

    async fn validate_provider_config(
        &self,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&config::schema(), &config))
    }

    #[instrument(skip(self, config))]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        debug!("Configure called");
        let diagnostics = validation::validate(&config::schema(), &config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            warn!(diagnostics = diagnostics.len(), "Configure completed with errors");
            return Ok(diagnostics);
        }

        let settings = ProviderConfig::from_value(&config)?;
        let api = ApiClient::new(&settings.base_url, settings.api_key)
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;
        info!(base_url = %api.base_url(), "Configure completed successfully");

        self.install(Clients::rest(&api))?;
        Ok(diagnostics)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = resource_schema(resource_type)?;
        Ok(validation::validate(&schema, &config))
    }

    #[instrument(skip(self, prior_state, proposed_state, _config))]
    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = resource_schema(resource_type)?;
        let result = plan::plan(&schema, prior_state.as_ref(), &proposed_state);
        info!(
            changes = result.changes.len(),
            requires_replace = result.requires_replace,
            "Plan completed"
        );
        Ok(result)
    }

    #[instrument(skip(self, planned_state))]
    async fn create(
        &self,
        resource_type: &str,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let mut data = ResourceData::new(&resource.schema(), planned_state)?;

        if let Err(e) = resource.create(&mut data).await {
            error!(error = %e, "Create failed");
            return Err(e);
        }

        info!(id = %data.id(), "Create completed");
        Ok(data.into_state())
    }

    #[instrument(skip(self, current_state))]
    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let mut data = ResourceData::new(&resource.schema(), current_state)?;

        if let Err(e) = resource.read(&mut data).await {
            error!(id = %data.id(), error = %e, "Read failed");
            return Err(e);
        }

        debug!(id = %data.id(), "Read completed");
        Ok(data.into_state())
    }

    #[instrument(skip(self, prior_state, planned_state))]
    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        let schema = resource.schema();
        let mut data = ResourceData::new(&schema, planned_state)?;
        if data.id().is_empty() {
            let prior = ResourceData::new(&schema, prior_state)?;
            data.set_id(prior.id());
        }

        if let Err(e) = resource.update(&mut data).await {
            error!(id = %data.id(), error = %e, "Update failed");
            return Err(e);
        }

        info!(id = %data.id(), "Update completed");
        Ok(data.into_state())
    }

    #[instrument(skip(self, current_state))]
    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        let mut data = ResourceData::new(&resource.schema(), current_state)?;
        let id = data.id().to_string();

        if let Err(e) = resource.delete(&mut data).await {
            error!(%id, error = %e, "Delete failed");
            return Err(e);
        }

        info!(%id, "Delete completed");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        Ok(vec![ImportedResource::new(
            resource_type,
            resource.import_state(id),
        )])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = data_source_schema(data_source_type)?;
        Ok(validation::validate(&schema, &config))
    }

    #[instrument(skip(self, config))]
    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        let mut data = ResourceData::new(&data_source.schema(), config)?;

        if let Err(e) = data_source.read(&mut data).await {
            error!(error = %e, "ReadDataSource failed");
            return Err(e);
        }

        info!(id = %data.id(), "ReadDataSource completed");
        Ok(data.into_state())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryApi;
    use serde_json::json;

    #[test]
    fn test_schema_lists_everything() {
        let schema = FireHydrantProvider::new().schema();
        assert!(schema.resources.contains_key(TASK_LIST_RESOURCE));
        assert!(schema.resources.contains_key(PRIORITY_RESOURCE));
        assert!(schema.data_sources.contains_key(RUNBOOK_ACTION_DATA_SOURCE));
        assert!(schema.provider.block.attributes["api_key"].flags.sensitive);
    }

    #[tokio::test]
    async fn test_unconfigured_provider_rejects_calls() {
        let provider = FireHydrantProvider::new();
        let err = provider
            .read(PRIORITY_RESOURCE, json!({"id": "P1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let provider = FireHydrantProvider::with_clients(InMemoryApi::new().clients());
        let err = provider
            .create("firehydrant_service", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownResource(_)));

        assert!(provider
            .plan("firehydrant_service", None, json!({}), json!({}))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_update_takes_id_from_prior() {
        let api = InMemoryApi::new();
        let provider = FireHydrantProvider::with_clients(api.clients());

        let created = provider
            .create(PRIORITY_RESOURCE, json!({"slug": "P3"}))
            .await
            .unwrap();
        let updated = provider
            .update(
                PRIORITY_RESOURCE,
                created,
                json!({"slug": "P3", "description": "low"}),
            )
            .await
            .unwrap();

        assert_eq!(updated["id"], "P3");
        assert_eq!(api.priority("P3").unwrap().description, "low");
    }

    #[tokio::test]
    async fn test_configure_installs_rest_clients() {
        let provider = FireHydrantProvider::new();
        let diagnostics = provider
            .configure(json!({
                "api_key": "k",
                "firehydrant_base_url": "http://127.0.0.1:1/v1"
            }))
            .await
            .unwrap();
        assert!(diagnostics.is_empty());

        let imported = provider
            .import_resource(TASK_LIST_RESOURCE, "tl-1")
            .await
            .unwrap();
        assert_eq!(imported[0].state, json!({"id": "tl-1"}));
    }

    #[tokio::test]
    async fn test_configure_reports_type_errors() {
        let provider = FireHydrantProvider::new();
        let diagnostics = provider
            .configure(json!({"api_key": 7}))
            .await
            .unwrap();
        assert!(diagnostics.iter().any(Diagnostic::is_error));
    }

    #[tokio::test]
    async fn test_configure_rejects_bad_base_url() {
        let provider = FireHydrantProvider::new();
        let err = provider
            .configure(json!({"api_key": "k", "firehydrant_base_url": "not a url"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }
}
