//! # Task detail
//!
//! Public task pages and their comment threads. Comment writes render the
//! thread as edited locally rather than reloading it.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::Response;
use axum::Form;
use domains::{CommentId, Session, TaskId};
use serde::Deserialize;
use services::{load_task_page, PageOutcome, RemoveOutcome, SubmitOutcome, TaskPage};

use crate::error::ApiError;
use crate::metrics::{Page, WriteCollection, WriteResult};
use crate::session::MaybeSession;
use crate::state::AppState;
use crate::views::TaskDetailPage;

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub comment: String,
}

fn render_page(state: &AppState, session: Option<&Session>, outcome: PageOutcome<TaskPage>) -> Result<Response, ApiError> {
    super::respond(&state.metrics, Page::Task, outcome, |page| {
        super::render(&TaskDetailPage::new(state.header(session), &page, session))
    })
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let outcome = load_task_page(state.store.clone(), &TaskId::new(id)).await;
    render_page(&state, session.as_ref(), outcome)
}

pub async fn comment(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    Path(id): Path<String>,
    Form(form): Form<CommentForm>,
) -> Result<Response, ApiError> {
    let mut outcome = load_task_page(state.store.clone(), &TaskId::new(id)).await;
    if let PageOutcome::Render(page) = &mut outcome {
        page.thread.input = form.comment;
        let result = match page.thread.submit(session.as_ref()).await {
            SubmitOutcome::Posted(_) => WriteResult::Created,
            SubmitOutcome::Ignored => WriteResult::Ignored,
            SubmitOutcome::Failed => WriteResult::Failed,
        };
        state.metrics.write(WriteCollection::Comments, result);
    }
    render_page(&state, session.as_ref(), outcome)
}

pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
    Path((id, comment_id)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let mut outcome = load_task_page(state.store.clone(), &TaskId::new(id)).await;
    if let PageOutcome::Render(page) = &mut outcome {
        let result = match page
            .thread
            .remove(session.as_ref(), &CommentId::new(comment_id))
            .await
        {
            RemoveOutcome::Removed => WriteResult::Deleted,
            RemoveOutcome::Missing => WriteResult::Missing,
            RemoveOutcome::Forbidden => WriteResult::Forbidden,
            RemoveOutcome::Failed => WriteResult::Failed,
        };
        state.metrics.write(WriteCollection::Comments, result);
    }
    render_page(&state, session.as_ref(), outcome)
}
