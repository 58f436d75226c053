//! Resource and data source adapters for the FireHydrant API.

pub mod priority;
pub mod runbook_action;
pub mod task_list;

pub use priority::{PriorityResource, PRIORITY_RESOURCE};
pub use runbook_action::{RunbookActionDataSource, RUNBOOK_ACTION_DATA_SOURCE};
pub use task_list::{TaskListResource, TASK_LIST_RESOURCE};
