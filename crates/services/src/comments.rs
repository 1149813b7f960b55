//! # Comment thread
//!
//! The comments of one task as loaded for a page, plus the input box. After
//! a confirmed write the local list is edited in place instead of being
//! fetched again, so it can drift from the store until the next load.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    fields, Collection, Comment, CommentId, DocumentStore, NewComment, Query, Session, StoreError,
    TaskId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Posted(CommentId),
    /// Empty input or incomplete session; nothing was written.
    Ignored,
    /// The write failed and was logged; input and list are unchanged.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// Not in this thread; nothing to do.
    Missing,
    /// Only the author may delete a comment.
    Forbidden,
    Failed,
}

pub struct CommentThread {
    store: Arc<dyn DocumentStore>,
    task_id: TaskId,
    comments: Vec<Comment>,
    pub input: String,
}

impl CommentThread {
    /// Fetches every comment of `task_id` in store order.
    pub async fn load(store: Arc<dyn DocumentStore>, task_id: TaskId) -> Result<Self, StoreError> {
        let query = Query::collection(Collection::Comments).where_eq(fields::TASK_ID, task_id.as_str());
        let comments = store
            .query(&query)
            .await?
            .iter()
            .filter_map(|doc| match Comment::try_from(doc) {
                Ok(comment) => Some(comment),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed comment");
                    None
                }
            })
            .collect();

        Ok(Self {
            store,
            task_id,
            comments,
            input: String::new(),
        })
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Whether `session` may delete `comment`.
    pub fn can_delete(session: Option<&Session>, comment: &Comment) -> bool {
        session.is_some_and(|s| s.user_id == comment.author)
    }

    /// Posts the current input as `session`'s comment.
    pub async fn submit(&mut self, session: Option<&Session>) -> SubmitOutcome {
        if self.input.is_empty() {
            return SubmitOutcome::Ignored;
        }
        let Some(session) = session.filter(|s| !s.user_id.is_empty() && !s.name.is_empty()) else {
            return SubmitOutcome::Ignored;
        };

        let new = NewComment {
            task_id: self.task_id.clone(),
            author: session.user_id.clone(),
            author_name: session.name.clone(),
            body: self.input.clone(),
        };
        match self.store.create(Collection::Comments, new.to_data()).await {
            Ok(id) => {
                tracing::info!(comment = %id, task = %self.task_id, author = %session.user_id, "comment posted");
                self.comments.push(new.confirmed(id.clone(), Utc::now()));
                self.input.clear();
                SubmitOutcome::Posted(id)
            }
            Err(err) => {
                tracing::error!(task = %self.task_id, error = %err, "comment write failed");
                SubmitOutcome::Failed
            }
        }
    }

    /// Deletes one of `session`'s own comments and drops it from the list.
    pub async fn remove(&mut self, session: Option<&Session>, id: &CommentId) -> RemoveOutcome {
        let Some(comment) = self.comments.iter().find(|c| &c.id == id) else {
            return RemoveOutcome::Missing;
        };
        if !Self::can_delete(session, comment) {
            tracing::warn!(comment = %id, author = %comment.author, "refused to delete another user's comment");
            return RemoveOutcome::Forbidden;
        }

        match self.store.delete(Collection::Comments, id).await {
            Ok(()) => {
                self.comments.retain(|c| &c.id != id);
                tracing::info!(comment = %id, task = %self.task_id, "comment deleted");
                RemoveOutcome::Removed
            }
            Err(err) => {
                tracing::error!(comment = %id, error = %err, "comment delete failed");
                RemoveOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockDocumentStore;
    use mockall::predicate::eq;
    use storage_adapters::MemoryDocumentStore;

    fn user(id: &str, name: &str) -> Session {
        Session {
            user_id: id.into(),
            name: name.into(),
        }
    }

    async fn thread(store: &Arc<MemoryDocumentStore>, task: &str) -> CommentThread {
        CommentThread::load(store.clone(), TaskId::new(task)).await.unwrap()
    }

    #[tokio::test]
    async fn load_returns_only_this_tasks_comments() {
        let store = Arc::new(MemoryDocumentStore::new());
        for (task, body) in [("T1", "one"), ("T2", "other"), ("T1", "two")] {
            let new = NewComment {
                task_id: TaskId::new(task),
                author: "b@x.com".into(),
                author_name: "B".into(),
                body: body.into(),
            };
            store.create(Collection::Comments, new.to_data()).await.unwrap();
        }

        let t = thread(&store, "T1").await;
        let bodies: Vec<_> = t.comments().iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, ["one", "two"]);
    }

    #[tokio::test]
    async fn submit_appends_locally_and_clears_the_input() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut t = thread(&store, "T1").await;
        let b = user("b@x.com", "Bea");

        t.input = "Good luck".into();
        let SubmitOutcome::Posted(id) = t.submit(Some(&b)).await else {
            panic!("comment was not posted");
        };
        assert!(t.input.is_empty());
        assert_eq!(t.comments().len(), 1);
        assert_eq!(t.comments()[0].id, id);
        assert_eq!(t.comments()[0].author_name, "Bea");

        let stored = store.get(Collection::Comments, &id).await.unwrap().unwrap();
        assert_eq!(Comment::try_from(&stored).unwrap().body, "Good luck");
    }

    #[tokio::test]
    async fn submit_without_input_or_complete_session_is_ignored() {
        let mut store = MockDocumentStore::new();
        store.expect_create().times(0);
        let mut t = CommentThread {
            store: Arc::new(store),
            task_id: TaskId::new("T1"),
            comments: vec![],
            input: String::new(),
        };

        assert_eq!(t.submit(Some(&user("b@x.com", "B"))).await, SubmitOutcome::Ignored);

        t.input = "hi".into();
        assert_eq!(t.submit(None).await, SubmitOutcome::Ignored);
        assert_eq!(t.submit(Some(&user("b@x.com", ""))).await, SubmitOutcome::Ignored);
        assert_eq!(t.input, "hi");
    }

    #[tokio::test]
    async fn failed_submit_leaves_list_and_input_alone() {
        let mut store = MockDocumentStore::new();
        store
            .expect_create()
            .times(1)
            .returning(|_, _| Err(StoreError::PermissionDenied("rules".into())));
        let mut t = CommentThread {
            store: Arc::new(store),
            task_id: TaskId::new("T1"),
            comments: vec![],
            input: "hi".into(),
        };

        assert_eq!(t.submit(Some(&user("b@x.com", "B"))).await, SubmitOutcome::Failed);
        assert!(t.comments().is_empty());
        assert_eq!(t.input, "hi");
    }

    #[tokio::test]
    async fn remove_deletes_exactly_one_comment_with_one_call() {
        let b = user("b@x.com", "B");
        let comments: Vec<Comment> = ["C1", "C2"]
            .into_iter()
            .map(|id| Comment {
                id: CommentId::new(id),
                task_id: TaskId::new("T1"),
                author: b.user_id.clone(),
                author_name: b.name.clone(),
                body: id.to_lowercase(),
                created_at: Utc::now(),
            })
            .collect();

        let mut store = MockDocumentStore::new();
        store
            .expect_delete()
            .with(eq(Collection::Comments), eq(CommentId::new("C1")))
            .times(1)
            .returning(|_, _| Ok(()));
        let mut t = CommentThread {
            store: Arc::new(store),
            task_id: TaskId::new("T1"),
            comments,
            input: String::new(),
        };

        assert_eq!(t.remove(Some(&b), &CommentId::new("C1")).await, RemoveOutcome::Removed);
        let left: Vec<_> = t.comments().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(left, ["C2"]);
    }

    #[tokio::test]
    async fn only_the_author_may_remove() {
        let store = Arc::new(MemoryDocumentStore::new());
        let mut t = thread(&store, "T1").await;
        let b = user("b@x.com", "B");
        t.input = "mine".into();
        let SubmitOutcome::Posted(id) = t.submit(Some(&b)).await else {
            panic!("comment was not posted");
        };

        assert_eq!(t.remove(None, &id).await, RemoveOutcome::Forbidden);
        assert_eq!(t.remove(Some(&user("a@x.com", "A")), &id).await, RemoveOutcome::Forbidden);
        assert_eq!(t.comments().len(), 1);

        assert_eq!(t.remove(Some(&b), &id).await, RemoveOutcome::Removed);
        assert!(t.comments().is_empty());
        assert_eq!(t.remove(Some(&b), &id).await, RemoveOutcome::Missing);
        assert_eq!(store.count(Collection::Comments).await.unwrap(), 0);
    }
}
