//! Task detail page loader.

use std::sync::Arc;

use domains::{Collection, DocumentStore, Task, TaskId};

use crate::comments::CommentThread;
use crate::page::PageOutcome;

/// Everything the detail page renders.
pub struct TaskPage {
    pub task: Task,
    pub thread: CommentThread,
}

/// Looks up `id` once and, if it is a public task, its comments once.
///
/// Absent and private tasks redirect home for every viewer, the owner
/// included. Store failures are logged and redirect home as well.
pub async fn load_task_page(store: Arc<dyn DocumentStore>, id: &TaskId) -> PageOutcome<TaskPage> {
    let doc = match store.get(Collection::Tasks, id).await {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            tracing::debug!(task = %id, "task not found");
            return PageOutcome::home();
        }
        Err(err) => {
            tracing::error!(task = %id, error = %err, "task lookup failed");
            return PageOutcome::home();
        }
    };

    let task = match Task::try_from(&doc) {
        Ok(task) if task.public => task,
        Ok(_) => {
            tracing::debug!(task = %id, "task is private");
            return PageOutcome::home();
        }
        Err(err) => {
            tracing::warn!(error = %err, "malformed task");
            return PageOutcome::home();
        }
    };

    match CommentThread::load(store, id.clone()).await {
        Ok(thread) => PageOutcome::Render(TaskPage { task, thread }),
        Err(err) => {
            tracing::error!(task = %id, error = %err, "comment query failed");
            PageOutcome::home()
        }
    }
}
