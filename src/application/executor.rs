//! Scenario execution
//!
//! Runs an ordered list of scenarios sequentially, one state machine per
//! scenario:
//!
//! ```text
//! Pending -> FetchingCategory -> FetchingProducts -> Done | Failed
//! ```
//!
//! Strategy resolution or a first-page category failure fails the scenario
//! and the executor moves on to the next one; per-product failures are
//! logged, counted, and skipped. Successful records are persisted before
//! the next URL is fetched, so an interrupted run loses at most the item
//! in flight.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::RegistryError;
use crate::domain::scenario::{
    CategoryRef, RunSummary, Scenario, ScenarioOutcome, ScenarioState,
};
use crate::domain::services::ScrapingStrategy;
use crate::infrastructure::registry::StrategyRegistry;
use crate::infrastructure::storage::RecordStore;

/// Sequential executor over a caller-supplied scenario list.
pub struct ScenarioExecutor {
    registry: StrategyRegistry,
    store: RecordStore,
}

impl ScenarioExecutor {
    pub fn new(registry: StrategyRegistry, store: RecordStore) -> Self {
        Self { registry, store }
    }

    /// Run every scenario in order. Each input scenario produces exactly
    /// one terminal outcome; a failure never aborts the batch.
    pub async fn run(&self, scenarios: &[Scenario]) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!("Run {} starting with {} scenarios", run_id, scenarios.len());

        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let outcome = self.run_scenario(scenario).await;
            match outcome.state {
                ScenarioState::Done => info!(
                    "Scenario '{}' done: {} persisted, {} failed, {} filtered",
                    outcome.scenario,
                    outcome.records_persisted,
                    outcome.items_failed,
                    outcome.items_filtered
                ),
                _ => warn!(
                    "Scenario '{}' failed: {}",
                    outcome.scenario,
                    outcome.error.as_deref().unwrap_or("unknown error")
                ),
            }
            outcomes.push(outcome);
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        info!(
            "Run {} finished: {} done, {} failed, {} records persisted, {} items skipped",
            run_id,
            summary.scenarios_done(),
            summary.scenarios_failed(),
            summary.records_persisted(),
            summary.items_failed()
        );
        summary
    }

    async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let mut state = ScenarioState::Pending;
        debug!("Scenario '{}' state: {:?}", scenario.name, state);

        // Pending -> FetchingCategory happens by acquiring a strategy.
        let strategy = match self.resolve_strategy(scenario) {
            Ok(strategy) => strategy,
            Err(e) => {
                return ScenarioOutcome::failed(&scenario.name, e.to_string());
            }
        };
        state = ScenarioState::FetchingCategory;
        debug!("Scenario '{}' state: {:?}", scenario.name, state);

        let listing = match strategy.list_category_products(&scenario.category).await {
            Ok(listing) => listing,
            Err(e) => {
                return ScenarioOutcome::failed(&scenario.name, e.to_string());
            }
        };

        if let Some(cause) = &listing.truncated_by {
            warn!(
                "Scenario '{}': listing truncated after {} pages: {}",
                scenario.name, listing.pages_fetched, cause
            );
        }

        state = ScenarioState::FetchingProducts;
        debug!(
            "Scenario '{}' state: {:?} ({} product URLs)",
            scenario.name,
            state,
            listing.len()
        );

        let mut records_persisted = 0;
        let mut items_failed = 0;
        let mut items_filtered = 0;

        for url in &listing.product_urls {
            let record = match strategy.fetch_product(url).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping {}: {}", url, e);
                    items_failed += 1;
                    continue;
                }
            };

            if let Some(filters) = &scenario.filters {
                if !filters.accepts(&record) {
                    debug!("Filtered out {}", url);
                    items_filtered += 1;
                    continue;
                }
            }

            match self.store.persist(&record).await {
                Ok(_) => records_persisted += 1,
                Err(e) => {
                    warn!("Failed to persist record from {}: {}", url, e);
                    items_failed += 1;
                }
            }
        }

        state = ScenarioState::Done;
        debug!("Scenario '{}' state: {:?}", scenario.name, state);

        ScenarioOutcome {
            scenario: scenario.name.clone(),
            state,
            records_persisted,
            items_failed,
            items_filtered,
            listing_truncated: listing.is_truncated(),
            error: None,
        }
    }

    fn resolve_strategy(
        &self,
        scenario: &Scenario,
    ) -> Result<Arc<dyn ScrapingStrategy>, RegistryError> {
        if let Some(supplier) = &scenario.supplier {
            return self.registry.resolve_identity(supplier);
        }

        match &scenario.category {
            CategoryRef::Url(url) => self.registry.resolve(url),
            CategoryRef::Query(query) => Err(RegistryError::invalid_url(
                query,
                "query category requires an explicit supplier",
            )),
        }
    }
}
