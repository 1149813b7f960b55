//! Prometheus counters for page outcomes and store writes.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabelSet, EncodeLabelValue};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Page {
    Home,
    Dashboard,
    Task,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum PageResult {
    Render,
    Redirect,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum WriteCollection {
    Tasks,
    Comments,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum WriteResult {
    Created,
    Deleted,
    Ignored,
    Missing,
    Forbidden,
    Failed,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PageLabels {
    pub page: Page,
    pub outcome: PageResult,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct WriteLabels {
    pub collection: WriteCollection,
    pub outcome: WriteResult,
}

pub struct Metrics {
    registry: Registry,
    page_views: Family<PageLabels, Counter>,
    writes: Family<WriteLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("board");
        let page_views = Family::<PageLabels, Counter>::default();
        let writes = Family::<WriteLabels, Counter>::default();
        registry.register("page_views", "Page requests by outcome", page_views.clone());
        registry.register("store_writes", "Task and comment writes by outcome", writes.clone());
        Self {
            registry,
            page_views,
            writes,
        }
    }

    pub fn page_view(&self, page: Page, outcome: PageResult) {
        self.page_views.get_or_create(&PageLabels { page, outcome }).inc();
    }

    pub fn write(&self, collection: WriteCollection, outcome: WriteResult) {
        self.writes
            .get_or_create(&WriteLabels { collection, outcome })
            .inc();
    }

    /// OpenMetrics text exposition of every registered family.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}
