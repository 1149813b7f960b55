use std::time::Duration;

use axum::http::StatusCode;
use integration_tests::{text, TestApp};

#[tokio::test]
async fn healthz_answers_ok() {
    let app = TestApp::new();
    let response = app.get("/healthz", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn metrics_count_page_outcomes_and_writes() {
    let app = TestApp::new();
    let alice = app.sign_in("a@x.com", "Alice").await;
    app.get("/dashboard", None).await;
    app.post("/dashboard/tasks", Some(&alice), "task=Counted").await;

    let response = app.get("/metrics", None).await;
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/openmetrics-text"));
    let body = text(response).await;
    assert!(body.contains(r#"board_page_views_total{page="Dashboard",outcome="Redirect"} 1"#));
    assert!(body.contains(r#"board_store_writes_total{collection="Tasks",outcome="Created"} 1"#));
}

#[tokio::test(start_paused = true)]
async fn home_counts_refresh_after_the_revalidation_window() {
    let app = TestApp::new();
    let alice = app.sign_in("a@x.com", "Alice").await;

    let html = text(app.get("/", None).await).await;
    assert!(html.contains("<strong>0</strong> tasks created"));

    app.post("/dashboard/tasks", Some(&alice), "task=One").await;
    let html = text(app.get("/", None).await).await;
    assert!(html.contains("<strong>0</strong> tasks created"));

    tokio::time::advance(Duration::from_secs(61)).await;
    let html = text(app.get("/", None).await).await;
    assert!(html.contains("<strong>1</strong> tasks created"));
}
