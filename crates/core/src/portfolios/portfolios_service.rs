//! Portfolio service - the owned, authoritative snapshot.
//!
//! All mutations go through [`PortfolioService::dispatch`], which serializes
//! them on one lock and initiates the durable write before returning.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info};
use tickerfolio_market_data::Quote;
use tokio::sync::{Mutex, RwLock};

use super::portfolios_commands::PortfolioCommand;
use super::portfolios_model::{Portfolio, Snapshot};
use crate::errors::{Error, Result};
use crate::events::{DomainEvent, DomainEventSink};
use crate::persistence::{PersistenceGateway, PersistenceStatus};

pub struct PortfolioService {
    gateway: PersistenceGateway,
    event_sink: Arc<dyn DomainEventSink>,
    /// Held across apply and save so commits reach storage in order.
    commit_lock: Mutex<()>,
    snapshot: RwLock<Arc<Snapshot>>,
    status: RwLock<PersistenceStatus>,
}

impl PortfolioService {
    /// A service starting from an empty snapshot.
    pub fn create(gateway: PersistenceGateway, event_sink: Arc<dyn DomainEventSink>) -> Self {
        Self::with_snapshot(gateway, event_sink, Snapshot::default())
    }

    /// A service starting from the last persisted snapshot.
    pub fn load(gateway: PersistenceGateway, event_sink: Arc<dyn DomainEventSink>) -> Result<Self> {
        let snapshot = gateway.load()?;
        info!("Loaded {} portfolios", snapshot.len());
        Ok(Self::with_snapshot(gateway, event_sink, snapshot))
    }

    fn with_snapshot(
        gateway: PersistenceGateway,
        event_sink: Arc<dyn DomainEventSink>,
        snapshot: Snapshot,
    ) -> Self {
        Self {
            gateway,
            event_sink,
            commit_lock: Mutex::new(()),
            snapshot: RwLock::new(Arc::new(snapshot)),
            status: RwLock::new(PersistenceStatus::Healthy),
        }
    }

    /// Final flush of the current snapshot.
    pub async fn teardown(&self) -> Result<()> {
        let _commit = self.commit_lock.lock().await;
        let snapshot = self.snapshot().await;
        info!("Flushing {} portfolios before shutdown", snapshot.len());
        self.persist(&snapshot).await
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    pub async fn portfolio(&self, portfolio_id: &str) -> Option<Portfolio> {
        self.snapshot.read().await.portfolio(portfolio_id).cloned()
    }

    pub async fn persistence_status(&self) -> PersistenceStatus {
        self.status.read().await.clone()
    }

    /// Applies one command and persists the result.
    ///
    /// A rejected command leaves the snapshot untouched. A failed save does
    /// not undo the commit: it is reported through [`PersistenceStatus`] and
    /// a `PersistenceFailed` event, and the next successful save catches up.
    pub async fn dispatch(&self, command: PortfolioCommand) -> Result<Arc<Snapshot>> {
        let _commit = self.commit_lock.lock().await;

        let before = self.snapshot().await;
        let after = Arc::new(command.apply(&before, Utc::now())?);
        *self.snapshot.write().await = after.clone();
        debug!("Committed {:?}", command);

        // Status and events are already reported inside persist
        let _ = self.persist(&after).await;

        self.event_sink.emit_batch(command.events(&before, &after));
        Ok(after)
    }

    /// Saves the current snapshot again, e.g. at the end of a refresh.
    pub async fn flush(&self) -> Result<()> {
        let _commit = self.commit_lock.lock().await;
        let snapshot = self.snapshot().await;
        self.persist(&snapshot).await
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let result = self.gateway.save(snapshot).await;
        let mut status = self.status.write().await;

        match &result {
            Ok(()) => {
                if status.is_degraded() {
                    info!("Persistence restored");
                    *status = PersistenceStatus::Healthy;
                    self.event_sink.emit(DomainEvent::PersistenceRestored);
                }
            }
            Err(e) => {
                error!("Failed to persist snapshot: {}", e);
                *status = PersistenceStatus::Degraded {
                    last_error: e.to_string(),
                };
                self.event_sink.emit(DomainEvent::persistence_failed(e.to_string()));
            }
        }
        result
    }

    // ----------------------------------------------------------------------
    // Typed wrappers
    // ----------------------------------------------------------------------

    pub async fn add_portfolio(&self, name: &str) -> Result<Portfolio> {
        let snapshot = self
            .dispatch(PortfolioCommand::AddPortfolio {
                name: name.to_string(),
            })
            .await?;
        snapshot
            .portfolios()
            .last()
            .cloned()
            .ok_or_else(|| Error::NotFound("new portfolio".to_string()))
    }

    pub async fn remove_portfolio(&self, portfolio_id: &str) -> Result<Arc<Snapshot>> {
        self.dispatch(PortfolioCommand::RemovePortfolio {
            portfolio_id: portfolio_id.to_string(),
        })
        .await
    }

    pub async fn add_holding(
        &self,
        portfolio_id: &str,
        symbol: &str,
        quantity: u32,
        quote: Quote,
    ) -> Result<Arc<Snapshot>> {
        self.dispatch(PortfolioCommand::AddHolding {
            portfolio_id: portfolio_id.to_string(),
            symbol: symbol.to_string(),
            quantity,
            quote,
        })
        .await
    }

    pub async fn remove_selected_holdings(&self, portfolio_id: &str) -> Result<Arc<Snapshot>> {
        self.dispatch(PortfolioCommand::RemoveSelectedHoldings {
            portfolio_id: portfolio_id.to_string(),
        })
        .await
    }

    pub async fn toggle_holding_selection(
        &self,
        portfolio_id: &str,
        holding_id: &str,
    ) -> Result<Arc<Snapshot>> {
        self.dispatch(PortfolioCommand::ToggleHoldingSelection {
            portfolio_id: portfolio_id.to_string(),
            holding_id: holding_id.to_string(),
        })
        .await
    }

    pub async fn apply_quote(
        &self,
        portfolio_id: &str,
        holding_id: &str,
        quote: Quote,
    ) -> Result<Arc<Snapshot>> {
        self.dispatch(PortfolioCommand::ApplyQuote {
            portfolio_id: portfolio_id.to_string(),
            holding_id: holding_id.to_string(),
            quote,
        })
        .await
    }
}
