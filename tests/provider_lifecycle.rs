//! End-to-end resource lifecycles through the provider against a stateful
//! mock of the FireHydrant API.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use firehydrant_provider::testing::{
    assert_no_errors, assert_plan_changes_attribute, assert_plan_no_changes, ProviderTester,
};
use firehydrant_provider::{ClientError, FireHydrantProvider, ProviderError, ProviderService};
use serde_json::{json, Value};
use wiremock::matchers::{any, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const PRIORITY: &str = "firehydrant_priority";
const TASK_LIST: &str = "firehydrant_task_list";
const RUNBOOK_ACTION: &str = "firehydrant_runbook_action";

#[derive(Default)]
struct Objects {
    priorities: BTreeMap<String, Value>,
    task_lists: BTreeMap<String, Value>,
    next_task_list: u32,
}

/// Answers priority and task list calls from shared in-memory state.
#[derive(Clone, Default)]
struct FakeFireHydrant {
    objects: Arc<Mutex<Objects>>,
}

impl FakeFireHydrant {
    fn priorities(&self, request: &Request, slug: Option<&str>) -> ResponseTemplate {
        let mut objects = self.objects.lock().unwrap();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        match (request.method.as_str(), slug) {
            ("POST", None) => {
                let slug = body["slug"].as_str().unwrap_or_default().to_string();
                objects.priorities.insert(slug, body.clone());
                ResponseTemplate::new(201).set_body_json(body)
            },
            ("GET", Some(slug)) => match objects.priorities.get(slug) {
                Some(priority) => ResponseTemplate::new(200).set_body_json(priority),
                None => ResponseTemplate::new(404),
            },
            ("PUT", Some(slug)) => match objects.priorities.get_mut(slug) {
                Some(priority) => {
                    priority["description"] = body["description"].clone();
                    priority["default"] = body["default"].clone();
                    ResponseTemplate::new(200).set_body_json(priority.clone())
                },
                None => ResponseTemplate::new(404),
            },
            ("DELETE", Some(slug)) => match objects.priorities.remove(slug) {
                Some(_) => ResponseTemplate::new(204),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }

    fn task_lists(&self, request: &Request, id: Option<&str>) -> ResponseTemplate {
        let mut objects = self.objects.lock().unwrap();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        match (request.method.as_str(), id) {
            ("POST", None) => {
                objects.next_task_list += 1;
                let id = format!("tl-{}", objects.next_task_list);
                // the create call ignores items
                let task_list = json!({
                    "id": id,
                    "name": body["name"],
                    "description": body["description"],
                    "task_list_items": [],
                    "created_by": null
                });
                objects.task_lists.insert(id, task_list.clone());
                ResponseTemplate::new(201).set_body_json(task_list)
            },
            ("GET", Some(id)) => match objects.task_lists.get(id) {
                Some(task_list) => ResponseTemplate::new(200).set_body_json(task_list),
                None => ResponseTemplate::new(404),
            },
            ("PUT", Some(id)) => match objects.task_lists.get_mut(id) {
                Some(task_list) => {
                    task_list["name"] = body["name"].clone();
                    task_list["description"] = body["description"].clone();
                    if let Some(items) = body.get("task_list_items") {
                        task_list["task_list_items"] = items.clone();
                    }
                    ResponseTemplate::new(200).set_body_json(task_list.clone())
                },
                None => ResponseTemplate::new(404),
            },
            ("DELETE", Some(id)) => match objects.task_lists.remove(id) {
                Some(_) => ResponseTemplate::new(204),
                None => ResponseTemplate::new(404),
            },
            _ => ResponseTemplate::new(405),
        }
    }
}

impl Respond for FakeFireHydrant {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let segments: Vec<&str> = request
            .url
            .path()
            .trim_start_matches("/v1/")
            .split('/')
            .collect();

        match segments.as_slice() {
            ["priorities"] => self.priorities(request, None),
            ["priorities", slug] => self.priorities(request, Some(*slug)),
            ["task_lists"] => self.task_lists(request, None),
            ["task_lists", id] => self.task_lists(request, Some(*id)),
            _ => ResponseTemplate::new(404),
        }
    }
}

async fn configured(server: &MockServer) -> ProviderTester<FireHydrantProvider> {
    let tester = ProviderTester::new(FireHydrantProvider::new());
    tester
        .configure(json!({
            "api_key": "test-key",
            "firehydrant_base_url": format!("{}/v1", server.uri())
        }))
        .await
        .unwrap();
    tester
}

async fn fake_api() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(FakeFireHydrant::default())
        .mount(&server)
        .await;
    server
}

mod priorities {
    use super::*;

    #[tokio::test]
    async fn test_create_update_read() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        let created = tester
            .lifecycle_create(PRIORITY, json!({"slug": "p1", "description": "d", "default": false}))
            .await
            .unwrap();
        assert_eq!(created["id"], "p1");

        let plan = tester
            .plan_update(PRIORITY, created.clone(), json!({"slug": "p1", "description": "d2", "default": true}))
            .await
            .unwrap();
        assert_plan_changes_attribute(&plan, "description");
        assert_plan_changes_attribute(&plan, "default");

        let updated = tester
            .lifecycle_update(PRIORITY, created, json!({"slug": "p1", "description": "d2", "default": true}))
            .await
            .unwrap();

        assert_eq!(updated["slug"], "p1");
        assert_eq!(updated["description"], "d2");
        assert_eq!(updated["default"], true);
        assert_eq!(updated["id"], "p1");
    }

    #[tokio::test]
    async fn test_unchanged_config_plans_no_changes() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        let state = tester
            .lifecycle_create(PRIORITY, json!({"slug": "P3"}))
            .await
            .unwrap();
        assert_eq!(state["description"], "");

        let plan = tester
            .plan_update(PRIORITY, state, json!({"slug": "P3"}))
            .await
            .unwrap();
        assert_plan_no_changes(&plan);
    }

    #[tokio::test]
    async fn test_import_then_read() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        let created = tester
            .lifecycle_create(PRIORITY, json!({"slug": "SEV2", "description": "degraded"}))
            .await
            .unwrap();

        let imported = tester.import_resource(PRIORITY, "SEV2").await.unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].state, json!({"id": "SEV2"}));

        let read = tester.lifecycle_import(PRIORITY, "SEV2").await.unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_delete_then_read_fails() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        let created = tester
            .lifecycle_create(PRIORITY, json!({"slug": "P4"}))
            .await
            .unwrap();
        tester
            .lifecycle_delete(PRIORITY, created.clone())
            .await
            .unwrap();

        let err = tester.read(PRIORITY, created).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_diagnostic().is_error());
    }
}

mod task_lists {
    use super::*;

    fn config() -> Value {
        json!({
            "name": "Triage",
            "description": "first ten minutes",
            "task_list_item": [
                {"summary": "Page on-call", "description": "use the escalation policy"},
                {"summary": "Open a channel", "description": ""}
            ]
        })
    }

    #[tokio::test]
    async fn test_create_then_read_reproduces_fields() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        tester
            .validate_resource_config(TASK_LIST, config())
            .await
            .unwrap();
        let state = tester.lifecycle_create(TASK_LIST, config()).await.unwrap();

        assert_eq!(state["id"], "tl-1");
        assert_eq!(state["name"], "Triage");
        assert_eq!(state["description"], "first ten minutes");
        assert_eq!(state["task_list_item"], config()["task_list_item"]);
    }

    #[tokio::test]
    async fn test_unchanged_config_without_items_plans_no_changes() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        let state = tester
            .lifecycle_create(TASK_LIST, json!({"name": "Triage"}))
            .await
            .unwrap();
        assert_eq!(state["task_list_item"], json!([]));

        let plan = tester
            .plan_update(TASK_LIST, state.clone(), json!({"name": "Triage"}))
            .await
            .unwrap();
        assert_plan_no_changes(&plan);

        let plan = tester
            .plan_update(TASK_LIST, state, json!({"name": "Triage", "description": "now with text"}))
            .await
            .unwrap();
        assert_plan_changes_attribute(&plan, "description");
    }

    #[tokio::test]
    async fn test_update_renames_and_replaces_items() {
        let server = fake_api().await;
        let tester = configured(&server).await;

        let created = tester.lifecycle_create(TASK_LIST, config()).await.unwrap();
        let updated = tester
            .lifecycle_update(
                TASK_LIST,
                created,
                json!({
                    "name": "Triage v2",
                    "task_list_item": [{"summary": "Only step", "description": ""}]
                }),
            )
            .await
            .unwrap();

        assert_eq!(updated["name"], "Triage v2");
        assert_eq!(updated["description"], "");
        assert_eq!(updated["task_list_item"], json!([{"summary": "Only step", "description": ""}]));
    }

    #[tokio::test]
    async fn test_failed_item_update_surfaces_created_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/task_lists"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "tl-7",
                "name": "Triage",
                "description": "",
                "task_list_items": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/v1/task_lists/tl-7"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        let tester = configured(&server).await;

        let err = tester.create(TASK_LIST, config()).await.unwrap_err();

        match &err {
            ProviderError::Api(client_err @ ClientError::CreatedWithoutItems { .. }) => {
                assert_eq!(client_err.created_id(), Some("tl-7"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
        let diagnostic = err.to_diagnostic();
        assert!(diagnostic.detail.unwrap().contains("tl-7"));
    }
}

mod runbook_actions {
    use super::*;
    use wiremock::matchers::query_param;

    #[tokio::test]
    async fn test_read_data_source() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/runbooks/actions"))
            .and(query_param("type", "incident"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    {"id": "ra-1", "name": "Create Slack channel", "slug": "create_incident_channel",
                     "integration": {"id": "i-1", "slug": "slack"}},
                    {"id": "ra-2", "name": "Orphan", "slug": "create_incident_channel",
                     "integration": null}
                ]
            })))
            .mount(&server)
            .await;
        let tester = configured(&server).await;

        let config = json!({
            "type": "incident",
            "integration_slug": "slack",
            "slug": "create_incident_channel"
        });
        tester
            .validate_data_source_config(RUNBOOK_ACTION, config.clone())
            .await
            .unwrap();

        let state = tester.read_data_source(RUNBOOK_ACTION, config).await.unwrap();
        assert_eq!(state["id"], "ra-1");
        assert_eq!(state["name"], "Create Slack channel");
    }
}

mod configuration {
    use super::*;

    #[tokio::test]
    async fn test_schema_and_metadata() {
        let provider = FireHydrantProvider::new();
        let metadata = provider.metadata();
        assert_eq!(metadata.resources, vec![PRIORITY, TASK_LIST]);
        assert_eq!(metadata.data_sources, vec![RUNBOOK_ACTION]);

        let diagnostics = provider
            .validate_provider_config(json!({"api_key": "k", "firehydrant_base_url": "http://x"}))
            .await
            .unwrap();
        assert_no_errors(&diagnostics);
    }

    #[tokio::test]
    async fn test_resource_calls_before_configure_fail() {
        let provider = FireHydrantProvider::new();
        let err = provider
            .create(PRIORITY, json!({"slug": "P1"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }
}
