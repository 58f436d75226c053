//! The adapter traits resources and data sources implement.
//!
//! Each adapter declares its schema and translates between [`ResourceData`]
//! and the request/response structs of one REST client, which it receives at
//! construction time.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::ProviderError;
use crate::schema::Schema;
use crate::state::{ResourceData, ID_FIELD};

/// A resource managed through create, read, update and delete callbacks.
#[async_trait]
pub trait Resource: Send + Sync {
    /// The type name the host uses for this resource.
    fn type_name(&self) -> &'static str;

    /// The resource schema.
    fn schema(&self) -> Schema;

    /// Create the remote entity and record its identity in `data`.
    async fn create(&self, data: &mut ResourceData) -> Result<(), ProviderError>;

    /// Refresh `data` from the remote entity.
    async fn read(&self, data: &mut ResourceData) -> Result<(), ProviderError>;

    /// Push the current field values to the remote entity.
    async fn update(&self, data: &mut ResourceData) -> Result<(), ProviderError>;

    /// Delete the remote entity and clear the identity in `data`.
    async fn delete(&self, data: &mut ResourceData) -> Result<(), ProviderError>;

    /// State seeded by an import; the following read fills in the rest.
    fn import_state(&self, id: &str) -> Value {
        let mut state = Map::new();
        state.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
        Value::Object(state)
    }
}

/// A read-only data source.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// The type name the host uses for this data source.
    fn type_name(&self) -> &'static str;

    /// The data source schema.
    fn schema(&self) -> Schema;

    /// Look up the entity described by `data` and fill in its fields.
    async fn read(&self, data: &mut ResourceData) -> Result<(), ProviderError>;
}
