//! # services
//!
//! Application components sitting between the HTTP layer and the ports:
//!
//! - [`live::LiveTaskList`]: a user's task list kept in sync through a store subscription
//! - [`detail`] and [`comments::CommentThread`]: one public task and its comments
//! - [`home::HomeStats`]: cached document counts for the landing page
//! - [`page`]: the render-or-redirect outcome every page loader returns
//!
//! Store failures never escape a component: they are logged where they
//! happen and reported as a `Failed` outcome.

pub mod comments;
pub mod detail;
pub mod home;
pub mod live;
pub mod page;

pub use comments::{CommentThread, RemoveOutcome, SubmitOutcome};
pub use detail::{load_task_page, TaskPage};
pub use home::{Counts, HomeStats};
pub use live::{share_url, CreateOutcome, DeleteOutcome, LiveTaskList, TaskDraft};
pub use page::{require_session, PageOutcome, HOME};
