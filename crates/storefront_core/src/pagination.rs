//! Scroll-driven incremental loading.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use futures::{future::BoxFuture, FutureExt};
use tracing::{debug, warn};

use crate::{
    collaborators::AsyncCallback,
    loader::{DataLoader, LoadOutcome},
    state::{FilterPatch, FilterStore, ProductStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDecision {
    /// Another scroll-triggered page, or a filter reload, is still loading.
    InFlight,
    /// Every matching product is already loaded.
    Exhausted,
    Requested { page: u32 },
}

pub struct PaginationCoordinator {
    filters: FilterStore,
    products: ProductStore,
    loader: Arc<DataLoader>,
    in_flight: Arc<AtomicBool>,
}

impl PaginationCoordinator {
    pub fn new(filters: FilterStore, products: ProductStore, loader: Arc<DataLoader>) -> Self {
        Self {
            filters,
            products,
            loader,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Decides synchronously whether to fetch the next page; the returned
    /// future performs the append load and settles the in-flight flag.
    pub fn on_near_bottom(&self) -> BoxFuture<'static, ScrollDecision> {
        if self.is_loading() || self.loader.replace_pending() {
            return futures::future::ready(ScrollDecision::InFlight).boxed();
        }
        if !self.products.with(|state| state.has_more()) {
            return futures::future::ready(ScrollDecision::Exhausted).boxed();
        }
        let Some(flight) = InFlight::begin(&self.in_flight) else {
            return futures::future::ready(ScrollDecision::InFlight).boxed();
        };

        let next = self.filters.with(|state| state.filters.page) + 1;
        self.filters
            .set(|state| state.filters.apply(FilterPatch::page(next)));

        let loader = Arc::clone(&self.loader);
        let filters = self.filters.clone();
        async move {
            let _flight = flight;
            debug!(page = next, "loading next page");
            let applied = match loader.load_products(Some(next), true).await {
                Ok(LoadOutcome::Applied { .. }) => true,
                Ok(LoadOutcome::Stale) => false,
                Err(err) => {
                    warn!(page = next, error = %err, "next page load failed");
                    false
                }
            };
            // Point the cursor back at the last loaded page so the next
            // trigger asks for the same page again.
            if !applied && filters.with(|state| state.filters.page == next) {
                filters.set(|state| state.filters.page = next - 1);
            }
            ScrollDecision::Requested { page: next }
        }
        .boxed()
    }

    pub fn callback(self: &Arc<Self>) -> AsyncCallback {
        let coordinator = Arc::clone(self);
        Arc::new(move || coordinator.on_near_bottom().map(|_| ()).boxed())
    }
}

/// Owns the in-flight flag; dropping it settles the flag on every path.
struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    fn begin(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "tests/pagination_tests.rs"]
mod tests;
