//! Scenarios and run reporting
//!
//! A scenario is one named unit of scraping work: a target category (URL or
//! free-text query) plus optional filter criteria. Scenarios are owned by
//! the caller and read-only to the executor; the executor reports back one
//! terminal [`ScenarioOutcome`] per input scenario.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::product::ProductRecord;
use crate::domain::supplier::SupplierIdentity;

/// Target of a scenario: either a concrete category URL or a search query
/// the strategy turns into one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryRef {
    Url(String),
    Query(String),
}

impl From<String> for CategoryRef {
    fn from(raw: String) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Self::Url(raw)
        } else {
            Self::Query(raw)
        }
    }
}

impl From<CategoryRef> for String {
    fn from(category: CategoryRef) -> Self {
        match category {
            CategoryRef::Url(s) | CategoryRef::Query(s) => s,
        }
    }
}

impl CategoryRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::Query(s) => s,
        }
    }
}

/// Optional criteria a record must satisfy to be persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFilters {
    /// Keywords that must all appear in the record title (case-insensitive).
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(default, rename = "maxPrice")]
    pub max_price: Option<f64>,
}

impl ScenarioFilters {
    /// Whether a record passes every configured criterion.
    ///
    /// A price bound with no parseable price on the record rejects it; the
    /// filter cannot be judged, so the record is not persisted.
    pub fn accepts(&self, record: &ProductRecord) -> bool {
        if !self.keywords.is_empty() {
            let Some(title) = record.title() else {
                return false;
            };
            let title = title.to_lowercase();
            if !self
                .keywords
                .iter()
                .all(|keyword| title.contains(&keyword.to_lowercase()))
            {
                return false;
            }
        }

        if self.min_price.is_some() || self.max_price.is_some() {
            let Some(price) = record.price() else {
                return false;
            };
            if self.min_price.is_some_and(|min| price < min) {
                return false;
            }
            if self.max_price.is_some_and(|max| price > max) {
                return false;
            }
        }

        true
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.min_price.is_none() && self.max_price.is_none()
    }
}

/// One named unit of scraping work. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub category: CategoryRef,
    /// Explicit supplier override for query-style categories, where no
    /// identity can be derived from the category itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<SupplierIdentity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<ScenarioFilters>,
}

impl Scenario {
    pub fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: CategoryRef::from(category.to_string()),
            supplier: None,
            filters: None,
        }
    }

    pub fn with_supplier(mut self, supplier: SupplierIdentity) -> Self {
        self.supplier = Some(supplier);
        self
    }

    pub fn with_filters(mut self, filters: ScenarioFilters) -> Self {
        self.filters = Some(filters);
        self
    }
}

/// Execution state of one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioState {
    Pending,
    FetchingCategory,
    FetchingProducts,
    Done,
    Failed,
}

impl ScenarioState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Terminal report for one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub state: ScenarioState,
    #[serde(rename = "recordsPersisted")]
    pub records_persisted: usize,
    /// Per-item fetch/parse/store failures that were logged and skipped.
    #[serde(rename = "itemsFailed")]
    pub items_failed: usize,
    /// Records rejected by the scenario's filters.
    #[serde(rename = "itemsFiltered")]
    pub items_filtered: usize,
    /// Pagination aborted early; the URLs enumerated so far were processed.
    #[serde(rename = "listingTruncated")]
    pub listing_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ScenarioOutcome {
    pub fn failed(scenario: &str, error: String) -> Self {
        Self {
            scenario: scenario.to_string(),
            state: ScenarioState::Failed,
            records_persisted: 0,
            items_failed: 0,
            items_filtered: 0,
            listing_truncated: false,
            error: Some(error),
        }
    }
}

/// Summary of one executor run over an ordered scenario list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(rename = "runId")]
    pub run_id: Uuid,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "finishedAt")]
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunSummary {
    pub fn scenarios_done(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == ScenarioState::Done)
            .count()
    }

    pub fn scenarios_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.state == ScenarioState::Failed)
            .count()
    }

    pub fn records_persisted(&self) -> usize {
        self.outcomes.iter().map(|o| o.records_persisted).sum()
    }

    pub fn items_failed(&self) -> usize {
        self.outcomes.iter().map(|o| o.items_failed).sum()
    }
}
