//! Development sign-in and sign-out.

use std::sync::Arc;

use auth_adapters::dev_sign_in;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use services::HOME;

use crate::error::ApiError;
use crate::session::{clear_cookie, session_cookie};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Signs in with a self-declared profile. Only mounted in effect when
/// development login is enabled; otherwise the route answers 404.
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignInForm>,
) -> Result<Response, ApiError> {
    if !state.web.dev_login {
        return Err(ApiError::NotFound);
    }

    let session = match dev_sign_in(&form.email, &form.name) {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(error = %err, "sign-in rejected");
            return Ok(Redirect::to(HOME).into_response());
        }
    };
    let token = state.sessions.issue(&session)?;

    Ok((
        [(SET_COOKIE, session_cookie(&state.web, &token))],
        Redirect::to("/dashboard"),
    )
        .into_response())
}

pub async fn sign_out(State(state): State<Arc<AppState>>) -> Response {
    ([(SET_COOKIE, clear_cookie(&state.web))], Redirect::to(HOME)).into_response()
}
