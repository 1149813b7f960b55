//! Render-or-redirect outcome of a page loader.

use domains::Session;

/// Where denied or unknown requests are sent.
pub const HOME: &str = "/";

#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    Render(T),
    Redirect { destination: String, permanent: bool },
}

impl<T> PageOutcome<T> {
    /// Temporary redirect to [`HOME`].
    pub fn home() -> Self {
        PageOutcome::Redirect {
            destination: HOME.to_string(),
            permanent: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PageOutcome<U> {
        match self {
            PageOutcome::Render(props) => PageOutcome::Render(f(props)),
            PageOutcome::Redirect {
                destination,
                permanent,
            } => PageOutcome::Redirect {
                destination,
                permanent,
            },
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, PageOutcome::Redirect { .. })
    }
}

/// Gate for pages that need a signed-in user.
pub fn require_session(session: Option<Session>) -> PageOutcome<Session> {
    match session {
        Some(session) => PageOutcome::Render(session),
        None => PageOutcome::home(),
    }
}
