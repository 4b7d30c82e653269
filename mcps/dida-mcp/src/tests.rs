//! End-to-end tool flows against an in-process upstream

use mcp_common::{parse_envelope, Envelope};
use reqwest::Method;
use serde_json::{json, Value};

use crate::client::DidaClient;
use crate::handlers::{self, Reply};
use crate::params::*;
use crate::testing::{client, creds, FakeTransport, V1, V2};
use crate::types::TaskMove;

fn env(reply: Reply) -> Envelope {
    parse_envelope(&reply.unwrap()).unwrap()
}

fn assert_failed_without_requests(reply: Reply, transport: &FakeTransport) -> Envelope {
    let env = env(reply);
    assert!(!env.success, "expected failure, got {env:?}");
    assert_eq!(transport.request_count(), 0);
    env
}

fn move_params() -> TaskMove {
    TaskMove {
        task_id: "t1".into(),
        from_project_id: "inbox1".into(),
        to_project_id: "p1".into(),
    }
}

// ============================================================================
// Missing credentials never reach the network
// ============================================================================

#[tokio::test]
async fn test_v1_tools_without_v1_token() {
    let transport = FakeTransport::new();
    let client = client(transport.clone(), creds(None, Some("v2"), Some("inbox1")));

    assert_failed_without_requests(handlers::list_projects(&client).await, &transport);
    assert_failed_without_requests(
        handlers::list_tasks(&client, ListTasksParams { project_id: None }).await,
        &transport,
    );
    assert_failed_without_requests(
        handlers::create_task(
            &client,
            CreateTaskParams {
                title: "Buy milk".into(),
                content: None,
                priority: None,
                due_date: None,
                project_id: None,
                tags: None,
            },
        )
        .await,
        &transport,
    );
    assert_failed_without_requests(
        handlers::complete_task(&client, CompleteTaskParams { id: "t1".into() }).await,
        &transport,
    );
    assert_failed_without_requests(
        handlers::batch_delete_tasks(
            &client,
            BatchDeleteTasksParams {
                tasks: vec![TaskRef {
                    id: "t1".into(),
                    project_id: "p1".into(),
                }],
            },
        )
        .await,
        &transport,
    );
    let env = assert_failed_without_requests(
        handlers::refresh_project_cache(&client).await,
        &transport,
    );
    assert!(env.message.unwrap().contains("Not authenticated with v1 API"));
}

#[tokio::test]
async fn test_moves_require_v2_even_with_v1() {
    let transport = FakeTransport::new();
    let client = client(transport.clone(), creds(Some("v1"), None, Some("inbox1")));

    let env = assert_failed_without_requests(
        handlers::move_task(&client, move_params()).await,
        &transport,
    );
    assert!(env.message.unwrap().contains("v2"));

    assert_failed_without_requests(
        handlers::batch_move_tasks(
            &client,
            BatchMoveTasksParams {
                moves: vec![move_params()],
            },
        )
        .await,
        &transport,
    );
}

#[tokio::test]
async fn test_authenticate_without_tokens() {
    let transport = FakeTransport::new();
    let client = client(transport.clone(), creds(None, None, None));

    assert_failed_without_requests(handlers::authenticate(&client).await, &transport);
    assert_failed_without_requests(handlers::list_cached_data(&client).await, &transport);
}

// ============================================================================
// Inbox defaulting
// ============================================================================

#[tokio::test]
async fn test_no_project_and_no_inbox() {
    let transport = FakeTransport::new();
    let client = client(transport.clone(), creds(Some("v1"), None, None));

    let replies = vec![
        handlers::list_tasks(&client, ListTasksParams { project_id: None }).await,
        handlers::get_task(
            &client,
            GetTaskParams {
                id: "t1".into(),
                project_id: None,
            },
        )
        .await,
        handlers::create_task(
            &client,
            CreateTaskParams {
                title: "Buy milk".into(),
                content: None,
                priority: None,
                due_date: None,
                project_id: None,
                tags: None,
            },
        )
        .await,
        handlers::delete_task(
            &client,
            DeleteTaskParams {
                id: "t1".into(),
                project_id: None,
            },
        )
        .await,
    ];

    for reply in replies {
        let env = env(reply);
        assert!(!env.success);
        let message = env.message.unwrap();
        assert!(message.contains("authenticate"), "{message}");
        assert!(message.contains("project ID"), "{message}");
    }
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_list_tasks_defaults_to_inbox() {
    let transport = FakeTransport::new();
    transport.on(
        Method::GET,
        format!("{V1}/project/inbox1/data"),
        200,
        json!({"project": {"id": "inbox1"}, "tasks": [{"id": "t1"}, {"id": "t2"}]}),
    );
    let client = client(transport, creds(Some("v1"), None, Some("inbox1")));

    let env = env(handlers::list_tasks(&client, ListTasksParams { project_id: None }).await);

    assert!(env.success);
    assert_eq!(env.data.unwrap(), json!([{"id": "t1"}, {"id": "t2"}]));
    assert_eq!(env.message.as_deref(), Some("Found 2 tasks"));
}

#[tokio::test]
async fn test_list_tasks_without_tasks_field() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V1}/project/p1/data"), 200, json!({"project": {}}));
    let client = client(transport, creds(Some("v1"), None, None));

    let env = env(
        handlers::list_tasks(
            &client,
            ListTasksParams {
                project_id: Some("p1".into()),
            },
        )
        .await,
    );
    assert_eq!(env.data.unwrap(), json!([]));
}

// ============================================================================
// Create task end to end
// ============================================================================

#[tokio::test]
async fn test_create_task_in_inbox() {
    let transport = FakeTransport::new();
    transport.on(
        Method::POST,
        format!("{V1}/task"),
        200,
        json!({"id": "t1", "title": "Buy milk", "projectId": "inbox1"}),
    );
    let client = client(transport.clone(), creds(Some("v1"), None, Some("inbox1")));

    let reply = handlers::create_task(
        &client,
        CreateTaskParams {
            title: "Buy milk".into(),
            content: None,
            priority: None,
            due_date: None,
            project_id: None,
            tags: None,
        },
    )
    .await;

    let sent = transport.requests_to(Method::POST, &format!("{V1}/task"));
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body,
        Some(json!({
            "title": "Buy milk",
            "content": "",
            "priority": 0,
            "projectId": "inbox1",
            "timeZone": "Asia/Shanghai",
            "isAllDay": false
        }))
    );

    let env = env(reply);
    assert!(env.success);
    assert_eq!(env.data.unwrap()["id"], "t1");
    assert_eq!(env.message.as_deref(), Some("Task created successfully"));
    assert!(env.error.is_none());
}

#[tokio::test]
async fn test_create_task_normalizes_tags() {
    let transport = FakeTransport::new();
    transport.on(Method::POST, format!("{V1}/task"), 200, json!({"id": "t1"}));
    let client = client(transport.clone(), creds(Some("v1"), None, None));

    handlers::create_task(
        &client,
        CreateTaskParams {
            title: "Plan trip".into(),
            content: Some("flights".into()),
            priority: Some(3),
            due_date: Some("2024-06-01T09:00:00Z".into()),
            project_id: Some("p1".into()),
            tags: Some("work, Important ,#urgent".into()),
        },
    )
    .await
    .unwrap();

    let body = transport.requests()[0].body.clone().unwrap();
    assert_eq!(body["tags"], json!(["work", "Important", "urgent"]));
    assert_eq!(body["dueDate"], "2024-06-01T09:00:00Z");
    assert_eq!(body["projectId"], "p1");
    assert_eq!(body["priority"], 3);
}

#[tokio::test]
async fn test_create_task_http_failure() {
    let transport = FakeTransport::new();
    transport.on(Method::POST, format!("{V1}/task"), 500, Value::Null);
    let client = client(transport, creds(Some("v1"), None, Some("inbox1")));

    let env = env(
        handlers::create_task(
            &client,
            CreateTaskParams {
                title: "Buy milk".into(),
                content: None,
                priority: None,
                due_date: None,
                project_id: None,
                tags: None,
            },
        )
        .await,
    );
    assert!(!env.success);
    assert_eq!(
        env.message.as_deref(),
        Some("Failed to create task: HTTP 500: Internal Server Error")
    );
}

// ============================================================================
// Complete task lookup
// ============================================================================

fn lookup_body() -> Value {
    json!({
        "inboxId": "inbox1",
        "projectProfiles": [],
        "tags": [],
        "syncTaskBean": {
            "update": [{"id": "t1", "projectId": "P"}],
            "add": [{"id": "t2", "projectId": "Q"}],
            "delete": [],
            "empty": false
        }
    })
}

#[tokio::test]
async fn test_complete_task_uses_discovered_project() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V2}/batch/check/0"), 200, lookup_body());
    transport.on(Method::POST, format!("{V1}/project/P/task/t1/complete"), 200, Value::Null);
    let client = client(transport.clone(), creds(Some("v1"), Some("v2"), Some("inbox1")));

    let env = env(handlers::complete_task(&client, CompleteTaskParams { id: "t1".into() }).await);

    assert!(env.success);
    assert_eq!(env.data.unwrap()["projectId"], "P");
    assert_eq!(
        transport
            .requests_to(Method::POST, &format!("{V1}/project/P/task/t1/complete"))
            .len(),
        1
    );
}

#[tokio::test]
async fn test_complete_task_searches_add_list() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V2}/batch/check/0"), 200, lookup_body());
    transport.on(Method::POST, format!("{V1}/project/Q/task/t2/complete"), 200, json!({}));
    let client = client(transport, creds(Some("v1"), None, None));

    let env = env(handlers::complete_task(&client, CompleteTaskParams { id: "t2".into() }).await);
    assert!(env.success);
}

#[tokio::test]
async fn test_complete_unknown_task() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V2}/batch/check/0"), 200, lookup_body());
    let client = client(transport.clone(), creds(Some("v1"), Some("v2"), None));

    let env = env(handlers::complete_task(&client, CompleteTaskParams { id: "zz".into() }).await);

    assert!(!env.success);
    assert_eq!(
        env.message.as_deref(),
        Some("Task with ID zz not found in any project")
    );
    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_complete_task_id2error() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V2}/batch/check/0"), 200, lookup_body());
    transport.on(
        Method::POST,
        format!("{V1}/project/P/task/t1/complete"),
        200,
        json!({"id2error": {"t1": "TASK_NOT_FOUND"}}),
    );
    let client = client(transport, creds(Some("v1"), Some("v2"), None));

    let env = env(handlers::complete_task(&client, CompleteTaskParams { id: "t1".into() }).await);
    assert!(!env.success);
    assert_eq!(env.data.unwrap()["t1"], "TASK_NOT_FOUND");
}

#[tokio::test]
async fn test_complete_task_garbled_body_is_an_error() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V2}/batch/check/0"), 200, lookup_body());
    transport.on_raw(
        Method::POST,
        format!("{V1}/project/P/task/t1/complete"),
        200,
        "<html>gateway error</html>",
    );
    let client = client(transport, creds(Some("v1"), Some("v2"), None));

    let env = env(handlers::complete_task(&client, CompleteTaskParams { id: "t1".into() }).await);

    assert!(!env.success);
    assert!(env
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("Failed to complete task")));
}

// ============================================================================
// Project mutations keep the cache fresh
// ============================================================================

async fn authenticated_v1(transport: &std::sync::Arc<FakeTransport>) -> DidaClient {
    let client = client(transport.clone(), creds(Some("v1"), None, Some("inbox1")));
    transport.on(Method::GET, format!("{V1}/project"), 200, json!([{"id": "p1", "name": "Work"}]));
    assert!(env(handlers::authenticate(&client).await).success);
    client
}

#[tokio::test]
async fn test_create_project_then_list_includes_it() {
    let transport = FakeTransport::new();
    let client = authenticated_v1(&transport).await;
    assert_eq!(client.session().project_count(), 2);

    transport.on(Method::POST, format!("{V1}/project"), 200, json!({"id": "p2", "name": "Garden"}));
    transport.on(
        Method::GET,
        format!("{V1}/project"),
        200,
        json!([{"id": "p1", "name": "Work"}, {"id": "p2", "name": "Garden"}]),
    );

    let created = env(
        handlers::create_project(
            &client,
            CreateProjectParams {
                name: "Garden".into(),
                color: None,
            },
        )
        .await,
    );
    assert!(created.success);
    // refreshed without an explicit refresh call
    assert_eq!(client.session().project_count(), 3);

    let listed = env(handlers::list_projects(&client).await);
    assert!(listed.success);
    assert!(client.session().project("p2").is_some());
    assert!(client.session().project("inbox1").is_some());
}

#[tokio::test]
async fn test_delete_project_shrinks_cache() {
    let transport = FakeTransport::new();
    let client = authenticated_v1(&transport).await;

    transport.on(Method::DELETE, format!("{V1}/project/p1"), 200, Value::Null);
    transport.on(Method::GET, format!("{V1}/project"), 200, json!([]));

    let env = env(handlers::delete_project(&client, DeleteProjectParams { id: "p1".into() }).await);

    assert!(env.success);
    assert!(client.session().project("p1").is_none());
    assert_eq!(client.session().project_count(), 1);
}

#[tokio::test]
async fn test_update_project_refreshes_names() {
    let transport = FakeTransport::new();
    let client = authenticated_v1(&transport).await;

    transport.on(Method::POST, format!("{V1}/project/p1"), 200, json!({"id": "p1", "name": "Office"}));
    transport.on(Method::GET, format!("{V1}/project"), 200, json!([{"id": "p1", "name": "Office"}]));

    handlers::update_project(
        &client,
        UpdateProjectParams {
            id: "p1".into(),
            name: Some("Office".into()),
            color: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(client.session().project("p1").unwrap().name, "Office");
}

// ============================================================================
// Authenticate and cached data
// ============================================================================

#[tokio::test]
async fn test_authenticate_reports_both_failures() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V2}/batch/check/0"), 401, Value::Null);
    transport.on(Method::GET, format!("{V1}/project"), 403, Value::Null);
    let client = client(transport, creds(Some("v1"), Some("v2"), None));

    let env = env(handlers::authenticate(&client).await);

    assert!(!env.success);
    let message = env.message.unwrap();
    assert!(message.contains("V1 API authentication failed: HTTP 403: Forbidden"));
    assert!(message.contains("V2 API authentication failed: HTTP 401: Unauthorized"));
}

#[tokio::test]
async fn test_authenticate_then_cached_data() {
    let transport = FakeTransport::new();
    transport.on(
        Method::GET,
        format!("{V2}/batch/check/0"),
        200,
        json!({
            "inboxId": "inbox9",
            "projectProfiles": [{"id": "p1", "name": "Work", "color": "#FF0000"}],
            "tags": [{"name": "urgent", "label": "Urgent"}]
        }),
    );
    let client = client(transport, creds(None, Some("v2"), None));

    let auth = env(handlers::authenticate(&client).await);
    assert!(auth.success);
    let data = auth.data.unwrap();
    assert_eq!(data["v2Api"]["authenticated"], true);
    assert_eq!(data["v1Api"]["authenticated"], false);
    assert_eq!(data["cachedData"]["projects"], 2);
    assert_eq!(data["cachedData"]["inboxId"], "inbox9");

    let cached = env(handlers::list_cached_data(&client).await);
    assert!(cached.success);
    let data = cached.data.unwrap();
    assert_eq!(data["inboxId"], "inbox9");
    assert_eq!(data["tags"][0]["label"], "Urgent");
    assert_eq!(data["tags"][0]["rawName"], "urgent");
}

#[tokio::test]
async fn test_check_auth_status_is_local() {
    let transport = FakeTransport::new();
    let client = client(transport.clone(), creds(Some("v1"), None, Some("inbox1")));

    let env = env(handlers::check_auth_status(&client).await);

    assert!(env.success);
    let data = env.data.unwrap();
    assert_eq!(data["v1Api"]["configured"], true);
    assert_eq!(data["v1Api"]["oauth"], true);
    assert_eq!(data["v2Api"]["configured"], false);
    assert_eq!(transport.request_count(), 0);
}

// ============================================================================
// Update and batch operations
// ============================================================================

#[tokio::test]
async fn test_update_task_merges_over_existing() {
    let transport = FakeTransport::new();
    transport.on(
        Method::GET,
        format!("{V1}/project/p1/task/t1"),
        200,
        json!({"id": "t1", "projectId": "p1", "title": "Old", "tags": ["a"], "priority": 1}),
    );
    transport.on(Method::POST, format!("{V1}/task/t1"), 200, json!({"id": "t1", "title": "New"}));
    let client = client(transport.clone(), creds(Some("v1"), None, None));

    let params: UpdateTaskParams = serde_json::from_value(json!({
        "id": "t1",
        "projectId": "p1",
        "title": "New",
        "tags": ""
    }))
    .unwrap();
    let env = env(handlers::update_task(&client, params).await);

    assert!(env.success);
    let body = transport.requests_to(Method::POST, &format!("{V1}/task/t1"))[0]
        .body
        .clone()
        .unwrap();
    assert_eq!(body["title"], "New");
    assert_eq!(body["priority"], 1);
    assert_eq!(body["tags"], json!([]));
    assert_eq!(body["timeZone"], "Asia/Shanghai");
}

#[tokio::test]
async fn test_batch_update_reports_each_item() {
    let transport = FakeTransport::new();
    transport.on(Method::GET, format!("{V1}/project/p1/task/t1"), 200, json!({"id": "t1"}));
    transport.on(Method::POST, format!("{V1}/task/t1"), 200, json!({"id": "t1", "title": "A"}));
    transport.on(Method::GET, format!("{V1}/project/p1/task/t2"), 404, Value::Null);
    let client = client(transport, creds(Some("v1"), None, None));

    let params: BatchUpdateTasksParams = serde_json::from_value(json!({
        "tasks": [
            {"id": "t1", "projectId": "p1", "title": "A"},
            {"id": "t2", "projectId": "p1", "title": "B"}
        ]
    }))
    .unwrap();
    let env = env(handlers::batch_update_tasks(&client, params).await);

    assert!(!env.success);
    let data = env.data.unwrap();
    assert_eq!(data["total"], 2);
    assert_eq!(data["succeeded"], 1);
    assert_eq!(data["failed"], 1);
    let results = data["results"].as_array().unwrap();
    let t1 = results.iter().find(|r| r["id"] == "t1").unwrap();
    let t2 = results.iter().find(|r| r["id"] == "t2").unwrap();
    assert_eq!(t1["task"]["title"], "A");
    assert_eq!(t2["error"], "HTTP 404: Not Found");
}

#[tokio::test]
async fn test_batch_delete_all_succeed() {
    let transport = FakeTransport::new();
    transport.on(Method::DELETE, format!("{V1}/project/p1/task/t1"), 200, Value::Null);
    transport.on(Method::DELETE, format!("{V1}/project/p2/task/t2"), 200, Value::Null);
    let client = client(transport.clone(), creds(Some("v1"), None, None));

    let env = env(
        handlers::batch_delete_tasks(
            &client,
            BatchDeleteTasksParams {
                tasks: vec![
                    TaskRef {
                        id: "t1".into(),
                        project_id: "p1".into(),
                    },
                    TaskRef {
                        id: "t2".into(),
                        project_id: "p2".into(),
                    },
                ],
            },
        )
        .await,
    );

    assert!(env.success);
    assert_eq!(env.data.unwrap()["succeeded"], 2);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn test_batch_delete_blank_project_sends_nothing() {
    let transport = FakeTransport::new();
    let client = client(transport.clone(), creds(Some("v1"), None, Some("inbox1")));

    let env = env(
        handlers::batch_delete_tasks(
            &client,
            BatchDeleteTasksParams {
                tasks: vec![
                    TaskRef {
                        id: "t1".into(),
                        project_id: "p1".into(),
                    },
                    TaskRef {
                        id: "t2".into(),
                        project_id: String::new(),
                    },
                ],
            },
        )
        .await,
    );

    assert!(!env.success);
    assert_eq!(
        env.message.as_deref(),
        Some("Invalid parameters: projectId must not be empty")
    );
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_batch_move_single_call() {
    let transport = FakeTransport::new();
    transport.on(
        Method::POST,
        format!("{V2}/batch/taskProject"),
        200,
        json!({"id2etag": {"t1": "e1", "t2": "e2"}, "id2error": {}}),
    );
    let client = client(transport.clone(), creds(None, Some("v2"), None));

    let mut second = move_params();
    second.task_id = "t2".into();
    let env = env(
        handlers::batch_move_tasks(
            &client,
            BatchMoveTasksParams {
                moves: vec![move_params(), second],
            },
        )
        .await,
    );

    assert!(env.success);
    assert_eq!(env.data.unwrap()["id2etag"]["t2"], "e2");
    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].body.as_ref().unwrap()[0],
        json!({"taskId": "t1", "fromProjectId": "inbox1", "toProjectId": "p1"})
    );
}
