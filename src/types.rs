//! Plan, import and metadata values returned to the host.
//!
//! State travels as [`serde_json::Value`] keyed by attribute name, the same
//! shape the resource adapters read and write.

use serde::{Deserialize, Serialize};

/// One attribute or list block that differs between prior state and the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    /// Attribute or block name, e.g. `description` or `task_list_item`.
    pub path: String,
    /// Value in prior state; `None` when the field was unset.
    pub before: Option<serde_json::Value>,
    /// Planned value; `None` when the field is being cleared.
    pub after: Option<serde_json::Value>,
}

impl AttributeChange {
    /// Build a change from its before and after values.
    pub fn new(
        path: impl Into<String>,
        before: Option<serde_json::Value>,
        after: Option<serde_json::Value>,
    ) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    /// A field set for the first time.
    pub fn added(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, None, Some(value))
    }

    /// A field being cleared.
    pub fn removed(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self::new(path, Some(value), None)
    }

    /// A field whose value differs.
    pub fn modified(
        path: impl Into<String>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> Self {
        Self::new(path, Some(before), Some(after))
    }
}

/// What applying a configuration would do to one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the resource will have after apply, or `null` for a delete.
    pub planned_state: serde_json::Value,
    /// Differences from prior state, in schema order.
    pub changes: Vec<AttributeChange>,
    /// A force-new attribute changed (e.g. a priority slug), so the
    /// object is deleted and created again.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Nothing to apply; `state` is echoed back as the planned state.
    pub fn no_change(state: serde_json::Value) -> Self {
        Self {
            planned_state: state,
            changes: Vec::new(),
            requires_replace: false,
        }
    }

    /// A plan with at least one change.
    pub fn with_changes(
        planned_state: serde_json::Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }
}

/// State seeded by an import, before the first read fills it in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    /// Resource type name, e.g. `firehydrant_priority`.
    pub resource_type: String,
    /// Usually just `{"id": ...}`.
    pub state: serde_json::Value,
}

impl ImportedResource {
    /// Pair a resource type with its imported state.
    pub fn new(resource_type: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Names of the resources and data sources a provider serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// Resource type names, sorted.
    pub resources: Vec<String>,
    /// Data source type names, sorted.
    pub data_sources: Vec<String>,
}
