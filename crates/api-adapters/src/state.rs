//! Shared state handed to every handler.

use std::sync::Arc;
use std::time::Duration;

use domains::{DocumentStore, Session, SessionProvider};
use services::HomeStats;

use crate::metrics::Metrics;
use crate::views::HeaderView;

/// Web-facing settings, mapped from the binary's configuration.
#[derive(Debug, Clone)]
pub struct WebSettings {
    /// Scheme and authority used in share links.
    pub public_origin: String,
    pub cookie_name: String,
    pub session_ttl: Duration,
    pub dev_login: bool,
}

pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub sessions: Arc<dyn SessionProvider>,
    pub home: HomeStats,
    pub metrics: Metrics,
    pub web: WebSettings,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        sessions: Arc<dyn SessionProvider>,
        web: WebSettings,
        home_revalidate: Duration,
    ) -> Self {
        Self {
            home: HomeStats::new(store.clone(), home_revalidate),
            store,
            sessions,
            metrics: Metrics::new(),
            web,
        }
    }

    pub fn header(&self, session: Option<&Session>) -> HeaderView {
        HeaderView {
            signed_in: session.is_some(),
            name: session.map(|s| s.name.clone()).unwrap_or_default(),
            dev_login: self.web.dev_login,
        }
    }
}
