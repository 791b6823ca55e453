//! Mount/unmount wiring for the listing page.
//!
//! `mount` paints the skeleton shell, then enqueues the mount sequence on
//! the runtime so listeners bind against markup that is already on the
//! page. Every subscription, listener and the scroll handle the sequence
//! creates lands in a registry that `unmount` drains. Registrations are
//! tagged with the mount epoch; one arriving after its mount was torn down
//! is released on the spot.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    collaborators::{CatalogApi, EventHost, Navigator, PageView, ScrollTrigger},
    config::StorefrontSettings,
    error::PageError,
    event_binder::EventBinder,
    loader::{DataLoader, LoadOutcome},
    pagination::PaginationCoordinator,
    render_sync,
    state::{FilterState, FilterStore, Filters, ProductListState, ProductStore},
    store::Subscription,
};

pub struct PageDeps {
    pub filters: FilterStore,
    pub products: ProductStore,
    pub catalog: Arc<dyn CatalogApi>,
    pub view: Arc<dyn PageView>,
    pub navigator: Arc<dyn Navigator>,
    pub scroll: Arc<dyn ScrollTrigger>,
    pub events: Arc<dyn EventHost>,
}

#[derive(Default)]
struct Registry {
    epoch: u64,
    mounted: bool,
    listeners: Vec<Subscription>,
    subscriptions: Vec<Subscription>,
    scroll: Option<Subscription>,
}

impl Registry {
    fn is_current(&self, epoch: u64) -> bool {
        self.mounted && self.epoch == epoch
    }

    fn drain(&mut self) -> Vec<Subscription> {
        let mut drained: Vec<Subscription> = self.listeners.drain(..).collect();
        drained.extend(self.subscriptions.drain(..));
        drained.extend(self.scroll.take());
        drained
    }
}

enum Slot {
    Listener,
    Subscription,
    Scroll,
}

pub struct HomePage {
    filters: FilterStore,
    products: ProductStore,
    view: Arc<dyn PageView>,
    scroll: Arc<dyn ScrollTrigger>,
    events: Arc<dyn EventHost>,
    loader: Arc<DataLoader>,
    binder: Arc<EventBinder>,
    defaults: Filters,
    skeleton_count: usize,
    registry: Mutex<Registry>,
}

impl HomePage {
    pub fn new(deps: PageDeps, settings: &StorefrontSettings) -> Arc<Self> {
        let PageDeps {
            filters,
            products,
            catalog,
            view,
            navigator,
            scroll,
            events,
        } = deps;

        let loader = Arc::new(DataLoader::new(
            filters.clone(),
            products.clone(),
            catalog,
            Arc::clone(&view),
        ));
        let binder = Arc::new(EventBinder::new(
            filters.clone(),
            Arc::clone(&loader),
            navigator,
        ));

        Arc::new(Self {
            filters,
            products,
            view,
            scroll,
            events,
            loader,
            binder,
            defaults: settings.default_filters(),
            skeleton_count: settings.skeleton_count,
            registry: Mutex::new(Registry::default()),
        })
    }

    pub fn binder(&self) -> &Arc<EventBinder> {
        &self.binder
    }

    pub fn loader(&self) -> &Arc<DataLoader> {
        &self.loader
    }

    pub fn is_mounted(&self) -> bool {
        self.registry().mounted
    }

    /// Store subscriptions, listeners and the scroll handle currently held.
    pub fn active_subscriptions(&self) -> usize {
        let registry = self.registry();
        registry.listeners.len()
            + registry.subscriptions.len()
            + usize::from(registry.scroll.is_some())
    }

    /// Paints the shell and enqueues the mount sequence. Must be called from
    /// within a tokio runtime.
    pub fn mount(self: &Arc<Self>) -> JoinHandle<Result<(), PageError>> {
        let (epoch, stale) = {
            let mut registry = self.registry();
            let stale = if registry.mounted {
                warn!("mounting a page that is already mounted; tearing down first");
                registry.drain()
            } else {
                Vec::new()
            };
            registry.epoch += 1;
            registry.mounted = true;
            (registry.epoch, stale)
        };
        self.loader.reset_session();
        for subscription in stale {
            subscription.unsubscribe();
        }

        info!(epoch, "home page mounted");
        self.view.render_shell(self.skeleton_count);

        let page = Arc::clone(self);
        tokio::spawn(async move { page.run_mount_sequence(epoch).await })
    }

    async fn run_mount_sequence(self: Arc<Self>, epoch: u64) -> Result<(), PageError> {
        self.ensure_current(epoch)?;

        self.filters.replace(FilterState::initial(&self.defaults));
        self.products.replace(ProductListState::default());

        for listener in self.binder.bind(self.events.as_ref()) {
            self.register(epoch, Slot::Listener, listener)?;
        }

        self.register(
            epoch,
            Slot::Subscription,
            render_sync::bind_filter_panel(&self.view, &self.filters),
        )?;
        if let Err(err) = self.loader.load_categories().await {
            warn!(error = %err, "continuing without categories");
        }
        self.ensure_current(epoch)?;

        self.register(
            epoch,
            Slot::Subscription,
            render_sync::bind_product_grid(&self.view, &self.products),
        )?;
        match self.loader.load_products(None, false).await {
            Ok(LoadOutcome::Applied { received, total }) => {
                debug!(received, total, "first page loaded");
            }
            Ok(LoadOutcome::Stale) => debug!("first page superseded"),
            Err(err) => warn!(error = %err, "first page failed to load"),
        }
        self.ensure_current(epoch)?;

        let coordinator = Arc::new(PaginationCoordinator::new(
            self.filters.clone(),
            self.products.clone(),
            Arc::clone(&self.loader),
        ));
        self.register(epoch, Slot::Scroll, self.scroll.arm(coordinator.callback()))?;

        info!(epoch, "mount sequence finished");
        Ok(())
    }

    /// Releases every listener and subscription and disarms the scroll
    /// trigger. Safe to call at any point, including mid-mount or twice.
    pub fn unmount(&self) {
        let drained = {
            let mut registry = self.registry();
            if !registry.mounted {
                debug!("unmount called on a page that is not mounted");
            }
            registry.mounted = false;
            registry.epoch += 1;
            registry.drain()
        };
        self.loader.reset_session();

        let released = drained.len();
        for subscription in drained {
            subscription.unsubscribe();
        }
        info!(released, "home page unmounted");
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_current(&self, epoch: u64) -> Result<(), PageError> {
        if self.registry().is_current(epoch) {
            Ok(())
        } else {
            Err(PageError::Unmounted)
        }
    }

    fn register(&self, epoch: u64, slot: Slot, subscription: Subscription) -> Result<(), PageError> {
        let rejected = {
            let mut registry = self.registry();
            if registry.is_current(epoch) {
                match slot {
                    Slot::Listener => registry.listeners.push(subscription),
                    Slot::Subscription => registry.subscriptions.push(subscription),
                    Slot::Scroll => {
                        if let Some(previous) = registry.scroll.replace(subscription) {
                            previous.unsubscribe();
                        }
                    }
                }
                None
            } else {
                Some(subscription)
            }
        };

        match rejected {
            Some(subscription) => {
                subscription.unsubscribe();
                Err(PageError::Unmounted)
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
