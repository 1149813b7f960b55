//! # Handlers
//!
//! Thin adapters between HTTP and the page services. Services decide what
//! happens; handlers pick the response and count the outcome.

pub mod auth;
pub mod dashboard;
pub mod home;
pub mod ops;
pub mod task;

use askama::Template;
use axum::response::{Html, IntoResponse, Redirect, Response};
use domains::Session;
use services::{require_session, PageOutcome};

use crate::error::ApiError;
use crate::metrics::{Metrics, Page, PageResult};

pub(crate) fn render(template: &impl Template) -> Result<Response, ApiError> {
    Ok(Html(template.render()?).into_response())
}

pub(crate) fn redirect(destination: &str, permanent: bool) -> Response {
    if permanent {
        Redirect::permanent(destination).into_response()
    } else {
        Redirect::temporary(destination).into_response()
    }
}

/// Resolves a page outcome: renders `Render` props, follows `Redirect`.
pub(crate) fn respond<T>(
    metrics: &Metrics,
    page: Page,
    outcome: PageOutcome<T>,
    view: impl FnOnce(T) -> Result<Response, ApiError>,
) -> Result<Response, ApiError> {
    match outcome {
        PageOutcome::Render(props) => {
            metrics.page_view(page, PageResult::Render);
            view(props)
        }
        PageOutcome::Redirect {
            destination,
            permanent,
        } => {
            metrics.page_view(page, PageResult::Redirect);
            Ok(redirect(&destination, permanent))
        }
    }
}

/// Signed-in session, or the redirect for anonymous callers.
pub(crate) fn signed_in(
    metrics: &Metrics,
    page: Page,
    session: Option<Session>,
) -> Result<Session, Response> {
    match require_session(session) {
        PageOutcome::Render(session) => Ok(session),
        PageOutcome::Redirect {
            destination,
            permanent,
        } => {
            metrics.page_view(page, PageResult::Redirect);
            Err(redirect(&destination, permanent))
        }
    }
}
