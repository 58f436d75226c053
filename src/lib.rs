//! FireHydrant provider
//!
//! A declarative-infrastructure provider for [FireHydrant](https://firehydrant.com)
//! incident-management objects, built on typed REST clients.
//!
//! # Overview
//!
//! - **REST clients** ([`client`]): runbook action lookup, task list and
//!   priority CRUD, each behind a trait so adapters can be given any
//!   implementation
//! - **Adapters** ([`resources`]): the `firehydrant_runbook_action` data source
//!   and the `firehydrant_task_list` and `firehydrant_priority` resources
//! - **Provider** ([`FireHydrantProvider`]): schema, configuration, validation,
//!   planning and CRUD dispatch through [`ProviderService`]
//! - **Testing** ([`testing`]): a lifecycle harness and an in-memory API
//!
//! # Quick Start
//!
//! ```no_run
//! use firehydrant_provider::{init_logging, FireHydrantProvider, ProviderService};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging();
//!
//!     let provider = FireHydrantProvider::new();
//!     provider.configure(json!({"api_key": "fhb-..."})).await?;
//!
//!     let state = provider
//!         .read_data_source(
//!             "firehydrant_runbook_action",
//!             json!({"type": "incident", "integration_slug": "slack", "slug": "create_incident_channel"}),
//!         )
//!         .await?;
//!     println!("{}", state["id"]);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod resources;
pub mod schema;
pub mod service;
pub mod state;
pub mod testing;
pub mod types;
pub mod validation;

// Re-export main types at crate root
pub use client::{ApiClient, ClientError, Clients, ErrorKind};
pub use config::ProviderConfig;
pub use error::ProviderError;
pub use logging::{init_logging, try_init_logging};
pub use provider::FireHydrantProvider;
pub use resource::{DataSource, Resource};
pub use schema::ProviderSchema;
pub use service::ProviderService;
pub use state::ResourceData;
pub use types::{AttributeChange, ImportedResource, PlanResult, ProviderMetadata};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tracing;
