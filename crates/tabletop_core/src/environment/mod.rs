//! Table environments: lock owner, event worker and object factory.
//!
//! Every component, container and table belongs to exactly one environment
//! and shares its lock. Environments are independent of each other; mixing
//! objects from two environments in one graph is rejected.

mod lock;
mod notifier;

pub use lock::TableEnvironmentGuard;

use crate::component::{Component, ComponentFactory, Container};
use crate::config::Config;
use crate::error::TableError;
use crate::memento::Memento;
use crate::strategy::{ComponentStrategy, StrategyRegistry};
use crate::table::Table;
use lock::TableEnvironmentLock;
use notifier::EventNotifier;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

pub(crate) use notifier::panic_message;

struct TableEnvironmentInner {
    id: u64,
    config: Config,
    strategies: StrategyRegistry,
    lock: TableEnvironmentLock,
}

impl Drop for TableEnvironmentInner {
    fn drop(&mut self) {
        self.lock.shutdown();
    }
}

/// Handle to a table environment; clones share the same environment.
#[derive(Clone)]
pub struct TableEnvironment {
    inner: Arc<TableEnvironmentInner>,
}

impl TableEnvironment {
    /// Create an environment with default configuration.
    ///
    /// # Panics
    /// Panics if the event worker thread cannot be spawned.
    pub fn new(strategies: StrategyRegistry) -> Self {
        Self::with_config(Config::default(), strategies)
    }

    /// Create an environment and start its event worker.
    ///
    /// # Panics
    /// Panics if the event worker thread cannot be spawned.
    pub fn with_config(config: Config, strategies: StrategyRegistry) -> Self {
        static NEXT_ENVIRONMENT_ID: AtomicU64 = AtomicU64::new(1);
        let id = NEXT_ENVIRONMENT_ID.fetch_add(1, Ordering::Relaxed);
        let notifier = EventNotifier::spawn(&config);
        debug!(
            environment = id,
            thread = config.event_thread_name.as_str(),
            "table environment started"
        );
        Self {
            inner: Arc::new(TableEnvironmentInner {
                id,
                config,
                strategies,
                lock: TableEnvironmentLock::new(notifier),
            }),
        }
    }

    /// Acquire the environment lock.
    ///
    /// The lock is re-entrant. Holding the guard across several calls makes
    /// them atomic with respect to other threads; their notifications are
    /// delivered after the guard is dropped.
    pub fn lock(&self) -> TableEnvironmentGuard<'_> {
        self.inner.lock.lock()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.inner.strategies
    }

    /// `true` when both handles refer to the same environment.
    pub fn same(&self, other: &TableEnvironment) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Create a table with an empty tabletop.
    ///
    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] when the registry has no
    /// tabletop strategy.
    pub fn create_table(&self) -> Result<Table, TableError> {
        let strategy = self
            .strategies()
            .require(crate::constants::TABLETOP_STRATEGY_ID)?;
        Table::new(self, strategy)
    }

    /// Create a component with the strategy's defaults.
    ///
    /// Container strategies produce a container; see [`Component::as_container`].
    pub fn create_component(&self, strategy: Arc<ComponentStrategy>) -> Component {
        Component::new(self, strategy)
    }

    /// Create a container with the strategy's defaults.
    ///
    /// # Errors
    /// Returns [`TableError::ArgumentInvalid`] for non-container strategies.
    pub fn create_container(&self, strategy: Arc<ComponentStrategy>) -> Result<Container, TableError> {
        if !strategy.is_container() {
            return Err(TableError::argument(format!(
                "strategy '{}' is not a container strategy",
                strategy.id()
            )));
        }
        Component::new(self, strategy)
            .as_container()
            .ok_or_else(|| TableError::state("container strategy produced a plain component"))
    }

    /// Create a component by strategy id.
    pub fn create_component_by_id(&self, strategy_id: &str) -> Result<Component, TableError> {
        Ok(self.create_component(self.strategies().require(strategy_id)?))
    }

    /// Reconstruct a component or container of whatever kind `memento` describes.
    pub fn create_component_from_memento(&self, memento: &Memento) -> Result<Component, TableError> {
        ComponentFactory::create_component(self, memento)
    }

    /// Block until every notification committed so far has been delivered.
    ///
    /// Do not call this while holding the environment lock: notifications
    /// buffered by the held lock are not queued yet.
    pub fn await_pending_events(&self) {
        self.inner.lock.notifier().await_idle();
    }

    /// Stop the event worker; later notifications are discarded.
    ///
    /// Safe to call while holding the environment lock: the worker is then
    /// detached instead of joined.
    pub fn dispose(&self) {
        self.inner.lock.shutdown();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock.notifier().is_cancelled()
    }
}

impl PartialEq for TableEnvironment {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for TableEnvironment {}

impl fmt::Debug for TableEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableEnvironment")
            .field("id", &self.inner.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
