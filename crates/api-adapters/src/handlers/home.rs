use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use services::PageOutcome;

use crate::error::ApiError;
use crate::metrics::Page;
use crate::session::MaybeSession;
use crate::state::AppState;
use crate::views::HomePage;

/// Landing page with site-wide counts, revalidated at most once a minute.
pub async fn index(
    State(state): State<Arc<AppState>>,
    MaybeSession(session): MaybeSession,
) -> Result<Response, ApiError> {
    let counts = state.home.counts().await;
    super::respond(&state.metrics, Page::Home, PageOutcome::Render(counts), |counts| {
        super::render(&HomePage {
            header: state.header(session.as_ref()),
            counts,
        })
    })
}
