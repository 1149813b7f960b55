//! Shared harness for the end-to-end tests: a router over the in-memory
//! store with real signed session cookies.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api_adapters::{router, AppState, WebSettings};
use auth_adapters::JwtSessionProvider;
use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use storage_adapters::MemoryDocumentStore;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const ORIGIN: &str = "http://board.test";
const SECRET: &[u8] = b"integration-test-secret-of-32-bytes!";

pub struct TestApp {
    pub store: Arc<MemoryDocumentStore>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryDocumentStore::default());
        let state = AppState::new(
            store.clone(),
            Arc::new(JwtSessionProvider::new(SECRET, Duration::from_secs(3600))),
            WebSettings {
                public_origin: ORIGIN.into(),
                cookie_name: "board_session".into(),
                session_ttl: Duration::from_secs(3600),
                dev_login: true,
            },
            Duration::from_secs(60),
        );
        Self {
            store,
            router: router(Arc::new(state)),
        }
    }

    /// Serves the router on an ephemeral local port and returns its address.
    pub async fn serve(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server");
        });
        addr
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Signs in through the dev form and returns the `Cookie` header value.
    pub async fn sign_in(&self, email: &str, name: &str) -> String {
        let body = format!("email={}&name={}", email.replace('@', "%40"), name);
        let response = self.send(form("/auth/signin", None, body)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let set_cookie = response.headers()[SET_COOKIE]
            .to_str()
            .expect("ascii cookie");
        set_cookie
            .split(';')
            .next()
            .expect("cookie pair")
            .to_string()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::get(uri);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        self.send(request.body(Body::empty()).expect("request")).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: impl Into<String>) -> Response<Body> {
        self.send(form(uri, cookie, body.into())).await
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn form(uri: &str, cookie: Option<&str>, body: String) -> Request<Body> {
    let mut request = Request::post(uri).header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    request.body(Body::from(body)).expect("request")
}

pub async fn text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8_lossy(&bytes).into_owned()
}

pub fn location(response: &Response<Body>) -> &str {
    response.headers()["location"].to_str().expect("ascii location")
}
