//! # Live task list
//!
//! Mirrors "tasks owned by the current user, newest first" through one
//! standing store subscription. Every delivery replaces the whole mirror;
//! local writes never touch it directly, so a task created here shows up
//! only once the store redelivers.

use std::sync::Arc;

use domains::{
    fields, Collection, Direction, DocumentStore, NewTask, Query, StoreError, Subscription, Task,
    TaskId,
};

/// Pending input of the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub body: String,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(TaskId),
    /// Empty body or no owner; nothing was written.
    Ignored,
    /// The write failed and was logged; the draft is kept.
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// No such task; nothing to do.
    Missing,
    /// The task belongs to someone else, or no one is signed in.
    Forbidden,
    Failed,
}

pub struct LiveTaskList {
    store: Arc<dyn DocumentStore>,
    owner: Option<String>,
    subscription: Option<Subscription>,
    tasks: Vec<Task>,
    loaded: bool,
    pub draft: TaskDraft,
}

/// Link under which a public task can be shared.
pub fn share_url(origin: &str, id: &TaskId) -> String {
    format!("{}/task/{}", origin.trim_end_matches('/'), id)
}

fn owned_by(owner: &str) -> Query {
    Query::collection(Collection::Tasks)
        .where_eq(fields::OWNER, owner)
        .order_by_created(Direction::Descending)
}

impl LiveTaskList {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            owner: None,
            subscription: None,
            tasks: Vec::new(),
            loaded: false,
            draft: TaskDraft::default(),
        }
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// The mirror as of the last delivery.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Whether at least one delivery has arrived for the current owner.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Points the list at `owner`, releasing any previous subscription.
    ///
    /// Re-setting the same owner keeps the open subscription.
    pub async fn set_owner(&mut self, owner: Option<&str>) -> Result<(), StoreError> {
        if self.owner.as_deref() == owner && (owner.is_none() || self.subscription.is_some()) {
            return Ok(());
        }

        self.close();
        let Some(owner) = owner else {
            return Ok(());
        };
        self.owner = Some(owner.to_string());

        match self.store.subscribe(owned_by(owner)).await {
            Ok(subscription) => {
                tracing::debug!(owner, "task list subscribed");
                self.subscription = Some(subscription);
                Ok(())
            }
            Err(err) => {
                tracing::error!(owner, error = %err, "task list subscription failed");
                Err(err)
            }
        }
    }

    /// Releases the subscription and forgets the owner and mirror.
    pub fn close(&mut self) {
        self.subscription = None;
        self.owner = None;
        self.tasks.clear();
        self.loaded = false;
    }

    /// Waits for the next delivery and replaces the mirror with it.
    ///
    /// Returns `None` when there is no subscription or the store closed it.
    pub async fn next_update(&mut self) -> Option<&[Task]> {
        let subscription = self.subscription.as_mut()?;
        let Some(snapshot) = subscription.next().await else {
            tracing::warn!(owner = ?self.owner, "task list feed closed");
            self.subscription = None;
            return None;
        };

        self.tasks = snapshot
            .iter()
            .filter_map(|doc| match Task::try_from(doc) {
                Ok(task) => Some(task),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed task");
                    None
                }
            })
            .collect();
        self.loaded = true;
        Some(self.tasks.as_slice())
    }

    /// Writes the draft as a new task owned by the current user.
    pub async fn create(&mut self) -> CreateOutcome {
        if self.draft.body.is_empty() {
            return CreateOutcome::Ignored;
        }
        let Some(owner) = self.owner.clone() else {
            return CreateOutcome::Ignored;
        };

        let new = NewTask {
            owner,
            body: self.draft.body.clone(),
            public: self.draft.public,
        };
        match self.store.create(Collection::Tasks, new.to_data()).await {
            Ok(id) => {
                tracing::info!(task = %id, owner = %new.owner, public = new.public, "task created");
                self.draft = TaskDraft::default();
                CreateOutcome::Created(id)
            }
            Err(err) => {
                tracing::error!(owner = %new.owner, error = %err, "task create failed");
                CreateOutcome::Failed
            }
        }
    }

    /// Deletes a task the current user owns.
    pub async fn delete(&self, id: &TaskId) -> DeleteOutcome {
        let Some(owner) = self.owner.as_deref() else {
            return DeleteOutcome::Forbidden;
        };

        let doc = match self.store.get(Collection::Tasks, id).await {
            Ok(Some(doc)) => doc,
            Ok(None) => return DeleteOutcome::Missing,
            Err(err) => {
                tracing::error!(task = %id, error = %err, "task lookup before delete failed");
                return DeleteOutcome::Failed;
            }
        };
        match Task::try_from(&doc) {
            Ok(task) if task.owner == owner => {}
            Ok(task) => {
                tracing::warn!(task = %id, owner = %task.owner, requester = owner, "refused to delete another user's task");
                return DeleteOutcome::Forbidden;
            }
            Err(err) => {
                tracing::warn!(error = %err, "refused to delete malformed task");
                return DeleteOutcome::Forbidden;
            }
        }

        match self.store.delete(Collection::Tasks, id).await {
            Ok(()) => {
                tracing::info!(task = %id, owner, "task deleted");
                DeleteOutcome::Deleted
            }
            Err(err) => {
                tracing::error!(task = %id, error = %err, "task delete failed");
                DeleteOutcome::Failed
            }
        }
    }
}
