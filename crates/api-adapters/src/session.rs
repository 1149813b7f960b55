//! Session cookie extraction and construction.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use domains::Session;

use crate::state::{AppState, WebSettings};

/// The request's session, if its cookie carries a valid token.
pub struct MaybeSession(pub Option<Session>);

impl FromRequestParts<Arc<AppState>> for MaybeSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let session = cookie_value(&parts.headers, &state.web.cookie_name)
            .and_then(|token| state.sessions.verify(token));
        Ok(MaybeSession(session))
    }
}

/// First value of cookie `name` across every `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

fn attributes(web: &WebSettings) -> &'static str {
    if web.public_origin.starts_with("https://") {
        "Path=/; HttpOnly; SameSite=Lax; Secure"
    } else {
        "Path=/; HttpOnly; SameSite=Lax"
    }
}

/// `Set-Cookie` value carrying `token`.
pub fn session_cookie(web: &WebSettings, token: &str) -> String {
    format!(
        "{}={}; {}; Max-Age={}",
        web.cookie_name,
        token,
        attributes(web),
        web.session_ttl.as_secs()
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(web: &WebSettings) -> String {
    format!("{}=; {}; Max-Age=0", web.cookie_name, attributes(web))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn web(origin: &str) -> WebSettings {
        WebSettings {
            public_origin: origin.into(),
            cookie_name: "board_session".into(),
            session_ttl: Duration::from_secs(3600),
            dev_login: true,
        }
    }

    #[test]
    fn finds_the_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; board_session=abc.def"));
        headers.append(COOKIE, HeaderValue::from_static("other=1"));
        assert_eq!(cookie_value(&headers, "board_session"), Some("abc.def"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn cookies_are_secure_only_behind_https() {
        assert!(session_cookie(&web("https://board.example"), "t").contains("Secure"));
        let plain = session_cookie(&web("http://localhost:8080"), "t");
        assert_eq!(plain, "board_session=t; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600");
        assert!(clear_cookie(&web("http://localhost:8080")).ends_with("Max-Age=0"));
    }
}
