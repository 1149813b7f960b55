//! Page templates and the view models they render.

use askama::Template;
use chrono::{DateTime, Utc};
use domains::{Comment, Session, Task};
use serde::Serialize;
use services::{share_url, CommentThread, Counts, TaskDraft, TaskPage};

fn date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// Header shown on every page.
pub struct HeaderView {
    pub signed_in: bool,
    pub name: String,
    pub dev_login: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskView {
    pub id: String,
    pub body: String,
    pub public: bool,
    pub created: String,
    pub share_url: String,
}

impl TaskView {
    pub fn new(task: &Task, origin: &str) -> Self {
        Self {
            id: task.id.to_string(),
            body: task.body.clone(),
            public: task.public,
            created: date(&task.created_at),
            share_url: share_url(origin, &task.id),
        }
    }
}

pub struct CommentView {
    pub id: String,
    pub name: String,
    pub body: String,
    pub can_delete: bool,
}

impl CommentView {
    fn new(comment: &Comment, viewer: Option<&Session>) -> Self {
        Self {
            id: comment.id.to_string(),
            name: comment.author_name.clone(),
            body: comment.body.clone(),
            can_delete: CommentThread::can_delete(viewer, comment),
        }
    }
}

/// Frame pushed over the live dashboard socket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum LiveMessage {
    Tasks(Vec<TaskView>),
}

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage {
    pub header: HeaderView,
    pub counts: Counts,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub header: HeaderView,
    pub tasks: Vec<TaskView>,
    pub draft_body: String,
    pub draft_public: bool,
}

impl DashboardPage {
    pub fn new(header: HeaderView, tasks: &[Task], draft: &TaskDraft, origin: &str) -> Self {
        Self {
            header,
            tasks: tasks.iter().map(|t| TaskView::new(t, origin)).collect(),
            draft_body: draft.body.clone(),
            draft_public: draft.public,
        }
    }
}

#[derive(Template)]
#[template(path = "task.html")]
pub struct TaskDetailPage {
    pub header: HeaderView,
    pub task_id: String,
    pub body: String,
    pub created: String,
    pub comments: Vec<CommentView>,
    pub input: String,
    pub can_comment: bool,
}

impl TaskDetailPage {
    pub fn new(header: HeaderView, page: &TaskPage, viewer: Option<&Session>) -> Self {
        Self {
            header,
            task_id: page.task.id.to_string(),
            body: page.task.body.clone(),
            created: date(&page.task.created_at),
            comments: page
                .thread
                .comments()
                .iter()
                .map(|c| CommentView::new(c, viewer))
                .collect(),
            input: page.thread.input.clone(),
            can_comment: viewer.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::TaskId;

    fn header() -> HeaderView {
        HeaderView {
            signed_in: true,
            name: "Alice".into(),
            dev_login: false,
        }
    }

    #[test]
    fn dashboard_escapes_task_bodies_and_marks_public_ones() {
        let tasks = vec![Task {
            id: TaskId::new("T1"),
            owner: "a@x.com".into(),
            body: "<b>Study X</b>".into(),
            public: true,
            created_at: Utc::now(),
        }];
        let html = DashboardPage::new(header(), &tasks, &TaskDraft::default(), "http://h")
            .render()
            .unwrap();

        assert!(html.contains("&#60;b&#62;Study X&#60;/b&#62;") || html.contains("&lt;b&gt;Study X&lt;/b&gt;"));
        assert!(html.contains("href=\"/task/T1\""));
        assert!(html.contains("http://h/task/T1"));
        assert!(html.contains("Hello Alice"));
    }

    #[test]
    fn only_public_tasks_link_to_their_detail_page() {
        let tasks = vec![Task {
            id: TaskId::new("P1"),
            owner: "a@x.com".into(),
            body: "Private plan".into(),
            public: false,
            created_at: Utc::now(),
        }];
        let html = DashboardPage::new(header(), &tasks, &TaskDraft::default(), "http://h")
            .render()
            .unwrap();

        assert!(html.contains("<span>Private plan</span>"));
        assert!(!html.contains("href=\"/task/P1\""));
        assert!(!html.contains("http://h/task/P1"));
    }

    #[test]
    fn live_message_is_tagged() {
        let msg = LiveMessage::Tasks(vec![]);
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"tasks","data":[]}"#
        );
    }
}
