//! An in-memory stand-in for the FireHydrant API.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use crate::client::runbook_actions::find_action;
use crate::client::{
    ClientError, Clients, CreatePriorityRequest, CreateTaskListRequest, PrioritiesClient,
    Priority, RunbookAction, RunbookActionsClient, TaskList, TaskListsClient,
    UpdatePriorityRequest, UpdateTaskListRequest,
};

#[derive(Default)]
struct Store {
    runbook_actions: BTreeMap<String, Vec<RunbookAction>>,
    task_lists: BTreeMap<String, TaskList>,
    priorities: BTreeMap<String, Priority>,
    next_task_list: u64,
    fail_task_list_updates: bool,
}

/// Implements every client trait over shared in-memory maps.
///
/// Clones share the same store, so a test can keep one handle for
/// inspection while the provider works through [`InMemoryApi::clients`].
///
/// ```
/// use firehydrant_provider::testing::InMemoryApi;
/// use firehydrant_provider::FireHydrantProvider;
///
/// let api = InMemoryApi::new();
/// let provider = FireHydrantProvider::with_clients(api.clients());
/// assert!(api.priority("P1").is_none());
/// ```
#[derive(Clone, Default)]
pub struct InMemoryApi {
    store: Arc<Mutex<Store>>,
}

impl InMemoryApi {
    /// An empty API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the actions listed for `runbook_type`, in listing order.
    pub fn with_runbook_actions(self, runbook_type: &str, actions: Vec<RunbookAction>) -> Self {
        self.lock()
            .runbook_actions
            .insert(runbook_type.to_string(), actions);
        self
    }

    /// Client handles backed by this store.
    pub fn clients(&self) -> Clients {
        Clients {
            runbook_actions: Arc::new(self.clone()),
            task_lists: Arc::new(self.clone()),
            priorities: Arc::new(self.clone()),
        }
    }

    /// The stored task list, if any.
    pub fn task_list(&self, id: &str) -> Option<TaskList> {
        self.lock().task_lists.get(id).cloned()
    }

    /// The stored priority, if any.
    pub fn priority(&self, slug: &str) -> Option<Priority> {
        self.lock().priorities.get(slug).cloned()
    }

    /// Make every task list update answer with a 500.
    pub fn fail_task_list_updates(&self, fail: bool) {
        self.lock().fail_task_list_updates = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(what: &str, id: &str) -> ClientError {
    ClientError::NotFound(format!("{} '{}' not found", what, id))
}

#[async_trait]
impl RunbookActionsClient for InMemoryApi {
    async fn get(
        &self,
        runbook_type: &str,
        integration_slug: &str,
        action_slug: &str,
    ) -> Result<RunbookAction, ClientError> {
        let actions = self
            .lock()
            .runbook_actions
            .get(runbook_type)
            .cloned()
            .unwrap_or_default();
        find_action(actions, integration_slug, action_slug)
    }
}

#[async_trait]
impl TaskListsClient for InMemoryApi {
    async fn get(&self, id: &str) -> Result<TaskList, ClientError> {
        self.task_list(id).ok_or_else(|| not_found("task list", id))
    }

    async fn create(&self, req: CreateTaskListRequest) -> Result<TaskList, ClientError> {
        let id = {
            let mut store = self.lock();
            store.next_task_list += 1;
            let id = format!("tl-{}", store.next_task_list);
            let now = Utc::now();
            store.task_lists.insert(
                id.clone(),
                TaskList {
                    id: id.clone(),
                    name: req.name.clone(),
                    description: req.description.clone(),
                    items: Vec::new(),
                    created_by: Vec::new(),
                    created_at: Some(now),
                    updated_at: Some(now),
                },
            );
            id
        };

        TaskListsClient::update(self, &id, req.into())
            .await
            .map_err(|source| ClientError::CreatedWithoutItems {
                id,
                source: Box::new(source),
            })
    }

    async fn update(&self, id: &str, req: UpdateTaskListRequest) -> Result<TaskList, ClientError> {
        let mut store = self.lock();
        if store.fail_task_list_updates {
            return Err(ClientError::Status {
                context: "could not update task list".to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: String::new(),
            });
        }

        let task_list = store
            .task_lists
            .get_mut(id)
            .ok_or_else(|| not_found("task list", id))?;
        task_list.name = req.name;
        task_list.description = req.description;
        // an empty list is left off the wire, so the items stay as they were
        if !req.items.is_empty() {
            task_list.items = req.items;
        }
        task_list.updated_at = Some(Utc::now());
        Ok(task_list.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.lock()
            .task_lists
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| not_found("task list", id))
    }
}

#[async_trait]
impl PrioritiesClient for InMemoryApi {
    async fn get(&self, slug: &str) -> Result<Priority, ClientError> {
        self.priority(slug).ok_or_else(|| not_found("priority", slug))
    }

    async fn create(&self, req: CreatePriorityRequest) -> Result<Priority, ClientError> {
        if req.slug.is_empty() {
            return Err(ClientError::Validation("priority slug is empty".to_string()));
        }

        let mut store = self.lock();
        if store.priorities.contains_key(&req.slug) {
            return Err(ClientError::Status {
                context: "could not create priority".to_string(),
                status: StatusCode::UNPROCESSABLE_ENTITY,
                body: format!("slug '{}' is taken", req.slug),
            });
        }

        let now = Utc::now();
        let priority = Priority {
            slug: req.slug,
            description: req.description,
            default: req.default,
            created_at: Some(now),
            updated_at: Some(now),
        };
        store
            .priorities
            .insert(priority.slug.clone(), priority.clone());
        Ok(priority)
    }

    async fn update(&self, slug: &str, req: UpdatePriorityRequest) -> Result<Priority, ClientError> {
        let mut store = self.lock();
        let priority = store
            .priorities
            .get_mut(slug)
            .ok_or_else(|| not_found("priority", slug))?;
        priority.description = req.description;
        priority.default = req.default;
        priority.updated_at = Some(Utc::now());
        Ok(priority.clone())
    }

    async fn delete(&self, slug: &str) -> Result<(), ClientError> {
        self.lock()
            .priorities
            .remove(slug)
            .map(|_| ())
            .ok_or_else(|| not_found("priority", slug))
    }
}
