use axum::http::StatusCode;
use domains::{Collection, DocumentStore, Query};
use integration_tests::{location, text, TestApp, ORIGIN};
use tokio_test::assert_ok;

async fn task_ids(app: &TestApp) -> Vec<String> {
    let docs = assert_ok!(app.store.query(&Query::collection(Collection::Tasks)).await);
    docs.into_iter().map(|d| d.id.to_string()).collect()
}

#[tokio::test]
async fn anonymous_dashboard_redirects_home() {
    let app = TestApp::new();
    let response = app.get("/dashboard", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/");

    let response = app.post("/dashboard/tasks", None, "task=Sneaky").await;
    assert_eq!(location(&response), "/");
    assert!(task_ids(&app).await.is_empty());
}

#[tokio::test]
async fn public_task_is_listed_with_a_share_link_and_readable_by_others() {
    let app = TestApp::new();
    let alice = app.sign_in("a@x.com", "Alice").await;

    let response = app.post("/dashboard/tasks", Some(&alice), "task=Study+X&public=on").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/dashboard");

    let ids = task_ids(&app).await;
    assert_eq!(ids.len(), 1);
    let id = &ids[0];

    let dashboard = text(app.get("/dashboard", Some(&alice)).await).await;
    assert!(dashboard.contains("Study X"));
    assert!(dashboard.contains("<span class=\"badge\">PUBLIC</span>"));
    assert!(dashboard.contains(&format!("{ORIGIN}/task/{id}")));

    let bob = app.sign_in("b@x.com", "Bob").await;
    let page = app.post(&format!("/task/{id}/comments"), Some(&bob), "comment=Good+luck").await;
    assert_eq!(page.status(), StatusCode::OK);
    let html = text(page).await;
    assert!(html.contains("Study X"));
    assert!(html.contains("Good luck"));
    assert!(html.contains("<strong>Bob</strong>"));
    assert!(html.contains("/delete\""));

    // Alice sees the comment but may not delete it.
    let html = text(app.get(&format!("/task/{id}"), Some(&alice)).await).await;
    assert!(html.contains("Good luck"));
    assert!(!html.contains("/delete\""));
}

#[tokio::test]
async fn dashboards_only_list_their_owners_tasks_newest_first() {
    let app = TestApp::new();
    let alice = app.sign_in("a@x.com", "Alice").await;
    let bob = app.sign_in("b@x.com", "Bob").await;

    app.post("/dashboard/tasks", Some(&alice), "task=First").await;
    app.post("/dashboard/tasks", Some(&alice), "task=Second").await;
    app.post("/dashboard/tasks", Some(&bob), "task=Bobs+task").await;

    let html = text(app.get("/dashboard", Some(&alice)).await).await;
    let second = html.find("Second").expect("second listed");
    let first = html.find("First").expect("first listed");
    assert!(second < first);
    assert!(!html.contains("Bobs task"));
    assert!(!html.contains("<span class=\"badge\">"));
}

#[tokio::test]
async fn empty_task_is_not_written() {
    let app = TestApp::new();
    let alice = app.sign_in("a@x.com", "Alice").await;

    let response = app.post("/dashboard/tasks", Some(&alice), "task=&public=on").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(task_ids(&app).await.is_empty());
}

#[tokio::test]
async fn only_the_owner_can_delete_a_task() {
    let app = TestApp::new();
    let alice = app.sign_in("a@x.com", "Alice").await;
    let bob = app.sign_in("b@x.com", "Bob").await;
    app.post("/dashboard/tasks", Some(&alice), "task=Keep+me").await;
    let id = task_ids(&app).await.remove(0);

    let response = app.post(&format!("/dashboard/tasks/{id}/delete"), Some(&bob), "").await;
    assert_eq!(location(&response), "/dashboard");
    assert_eq!(task_ids(&app).await, vec![id.clone()]);

    app.post(&format!("/dashboard/tasks/{id}/delete"), Some(&alice), "").await;
    assert!(task_ids(&app).await.is_empty());
    let html = text(app.get("/dashboard", Some(&alice)).await).await;
    assert!(!html.contains("Keep me"));
}
