//! # Domain Models
//!
//! Tasks and comments are stored as JSON documents; these structs are the
//! typed view the rest of the application works with.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Collection, Document, DocumentId};
use crate::errors::DecodeError;

pub type TaskId = DocumentId;
pub type CommentId = DocumentId;

/// Document field names, shared by the codecs and the queries built on them.
pub mod fields {
    pub const OWNER: &str = "owner";
    pub const BODY: &str = "body";
    pub const PUBLIC: &str = "public";
    pub const TASK_ID: &str = "task_id";
    pub const AUTHOR: &str = "author";
    pub const AUTHOR_NAME: &str = "author_name";
}

/// Proof of authentication supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The user's email address; the identifier every ownership check uses.
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Set once at creation.
    pub owner: String,
    pub body: String,
    pub public: bool,
    pub created_at: DateTime<Utc>,
}

/// The caller-supplied part of a task; id and timestamp come from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub owner: String,
    pub body: String,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    /// Parent task; set once at creation.
    pub task_id: TaskId,
    pub author: String,
    pub author_name: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub task_id: TaskId,
    pub author: String,
    pub author_name: String,
    pub body: String,
}

impl NewTask {
    pub fn to_data(&self) -> Value {
        let mut data = Map::new();
        data.insert(fields::OWNER.into(), self.owner.clone().into());
        data.insert(fields::BODY.into(), self.body.clone().into());
        data.insert(fields::PUBLIC.into(), self.public.into());
        Value::Object(data)
    }

    /// The task the store will deliver once the write is confirmed.
    pub fn confirmed(self, id: TaskId, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            owner: self.owner,
            body: self.body,
            public: self.public,
            created_at,
        }
    }
}

impl NewComment {
    pub fn to_data(&self) -> Value {
        let mut data = Map::new();
        data.insert(fields::TASK_ID.into(), self.task_id.as_str().into());
        data.insert(fields::AUTHOR.into(), self.author.clone().into());
        data.insert(fields::AUTHOR_NAME.into(), self.author_name.clone().into());
        data.insert(fields::BODY.into(), self.body.clone().into());
        Value::Object(data)
    }

    /// The comment the store would deliver once the write is confirmed.
    pub fn confirmed(self, id: CommentId, created_at: DateTime<Utc>) -> Comment {
        Comment {
            id,
            task_id: self.task_id,
            author: self.author,
            author_name: self.author_name,
            body: self.body,
            created_at,
        }
    }
}

#[derive(Deserialize)]
struct TaskFields {
    owner: String,
    body: String,
    #[serde(default)]
    public: bool,
}

#[derive(Deserialize)]
struct CommentFields {
    task_id: TaskId,
    author: String,
    author_name: String,
    body: String,
}

fn decode<T: for<'de> Deserialize<'de>>(
    doc: &Document,
    expected: Collection,
) -> Result<T, DecodeError> {
    let err = |reason: String| DecodeError {
        collection: expected.as_str(),
        id: doc.id.to_string(),
        reason,
    };
    if doc.collection != expected {
        return Err(err(format!("found in `{}`", doc.collection)));
    }
    T::deserialize(&doc.data).map_err(|e| err(e.to_string()))
}

impl TryFrom<&Document> for Task {
    type Error = DecodeError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let f: TaskFields = decode(doc, Collection::Tasks)?;
        Ok(Task {
            id: doc.id.clone(),
            owner: f.owner,
            body: f.body,
            public: f.public,
            created_at: doc.created_at,
        })
    }
}

impl TryFrom<&Document> for Comment {
    type Error = DecodeError;

    fn try_from(doc: &Document) -> Result<Self, Self::Error> {
        let f: CommentFields = decode(doc, Collection::Comments)?;
        Ok(Comment {
            id: doc.id.clone(),
            task_id: f.task_id,
            author: f.author,
            author_name: f.author_name,
            body: f.body,
            created_at: doc.created_at,
        })
    }
}
