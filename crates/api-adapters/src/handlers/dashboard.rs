//! # Dashboard
//!
//! The signed-in user's own tasks. Writes follow post/redirect/get; the page
//! itself is refreshed in place through the `/dashboard/live` socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use domains::{Session, TaskId};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use services::{CreateOutcome, DeleteOutcome, LiveTaskList, TaskDraft};

use crate::error::ApiError;
use crate::metrics::{Page, PageResult, WriteCollection, WriteResult};
use crate::session::MaybeSession;
use crate::state::AppState;
use crate::views::{DashboardPage, LiveMessage, TaskView};

const DASHBOARD: &str = "/dashboard";

#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub task: String,
    /// Present only when the checkbox is ticked.
    pub public: Option<String>,
}

async fn open_list(state: &AppState, session: &Session) -> LiveTaskList {
    let mut list = LiveTaskList::new(state.store.clone());
    // Failure is already logged; the page renders without tasks.
    if list.set_owner(Some(session.user_id.as_str())).await.is_ok() {
        list.next_update().await;
    }
    list
}

fn render_list(state: &AppState, session: &Session, list: &LiveTaskList) -> Result<Response, ApiError> {
    state.metrics.page_view(Page::Dashboard, PageResult::Render);
    super::render(&DashboardPage::new(
        state.header(Some(session)),
        list.tasks(),
        &list.draft,
        &state.web.public_origin,
    ))
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, ApiError> {
    let session = match super::signed_in(&state.metrics, Page::Dashboard, session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };
    let list = open_list(&state, &session).await;
    render_list(&state, &session, &list)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    Form(form): Form<TaskForm>,
) -> Result<Response, ApiError> {
    let session = match super::signed_in(&state.metrics, Page::Dashboard, session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };

    let mut list = LiveTaskList::new(state.store.clone());
    if let Err(err) = list.set_owner(Some(session.user_id.as_str())).await {
        tracing::warn!(error = %err, "creating without a live list");
    }
    list.draft = TaskDraft {
        body: form.task,
        public: form.public.is_some(),
    };

    let result = match list.create().await {
        CreateOutcome::Created(_) => {
            state.metrics.write(WriteCollection::Tasks, WriteResult::Created);
            return Ok(Redirect::to(DASHBOARD).into_response());
        }
        CreateOutcome::Ignored => WriteResult::Ignored,
        CreateOutcome::Failed => WriteResult::Failed,
    };
    state.metrics.write(WriteCollection::Tasks, result);

    // Keep what the user typed.
    list.next_update().await;
    render_list(&state, &session, &list)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let session = match super::signed_in(&state.metrics, Page::Dashboard, session) {
        Ok(session) => session,
        Err(redirect) => return Ok(redirect),
    };

    let mut list = LiveTaskList::new(state.store.clone());
    if let Err(err) = list.set_owner(Some(session.user_id.as_str())).await {
        tracing::warn!(error = %err, "deleting without a live list");
    }
    let result = match list.delete(&TaskId::new(id)).await {
        DeleteOutcome::Deleted => WriteResult::Deleted,
        DeleteOutcome::Missing => WriteResult::Missing,
        DeleteOutcome::Forbidden => WriteResult::Forbidden,
        DeleteOutcome::Failed => WriteResult::Failed,
    };
    state.metrics.write(WriteCollection::Tasks, result);

    Ok(Redirect::to(DASHBOARD).into_response())
}

/// Upgrades to a socket that pushes the full task list on every change.
pub async fn live(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    ws: WebSocketUpgrade,
) -> Response {
    let session = match super::signed_in(&state.metrics, Page::Dashboard, session) {
        Ok(session) => session,
        Err(redirect) => return redirect,
    };
    ws.on_upgrade(move |socket| feed(socket, state, session))
}

async fn feed(socket: WebSocket, state: Arc<AppState>, session: Session) {
    let (mut sender, mut receiver) = socket.split();
    let mut list = LiveTaskList::new(state.store.clone());
    if list.set_owner(Some(session.user_id.as_str())).await.is_err() {
        return;
    }
    tracing::debug!(user = %session.user_id, "live feed opened");

    loop {
        tokio::select! {
            update = list.next_update() => {
                let Some(tasks) = update else { break };
                let views = tasks
                    .iter()
                    .map(|task| TaskView::new(task, &state.web.public_origin))
                    .collect();
                let text = match serde_json::to_string(&LiveMessage::Tasks(views)) {
                    Ok(text) => text,
                    Err(err) => {
                        tracing::error!(error = %err, "live frame encoding failed");
                        break;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }

    tracing::debug!(user = %session.user_id, "live feed closed");
}
