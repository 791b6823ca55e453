//! Fetches a page of products (or the category tree) and publishes it.

use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use shared::{categories::normalize_categories, domain::DEFAULT_PAGE};
use tracing::{debug, warn};

use crate::{
    collaborators::{CatalogApi, PageView},
    error::CatalogFetchError,
    state::{FilterStore, ProductStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { received: usize, total: u64 },
    /// The filters changed (or the page unmounted) while the request was out.
    Stale,
}

pub struct DataLoader {
    filters: FilterStore,
    products: ProductStore,
    catalog: Arc<dyn CatalogApi>,
    view: Arc<dyn PageView>,
    generation: AtomicU64,
    session: AtomicU64,
    pending_loads: AtomicUsize,
    pending_replaces: AtomicUsize,
}

impl DataLoader {
    pub fn new(
        filters: FilterStore,
        products: ProductStore,
        catalog: Arc<dyn CatalogApi>,
        view: Arc<dyn PageView>,
    ) -> Self {
        Self {
            filters,
            products,
            catalog,
            view,
            generation: AtomicU64::new(0),
            session: AtomicU64::new(0),
            pending_loads: AtomicUsize::new(0),
            pending_replaces: AtomicUsize::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Marks every request issued so far as stale.
    pub fn invalidate(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Ends the current mounted lifetime. Every outstanding product and
    /// category request is discarded when it settles.
    pub fn reset_session(&self) {
        self.session.fetch_add(1, Ordering::SeqCst);
        self.invalidate();
    }

    /// True while a replace load has not settled yet. The loaded list still
    /// belongs to the previous filters during that window.
    pub fn replace_pending(&self) -> bool {
        self.pending_replaces.load(Ordering::SeqCst) > 0
    }

    /// Loads `page` (default 1) for the current filters. `append` concatenates
    /// onto the loaded list; otherwise the list is replaced. A replace load
    /// supersedes every earlier request.
    pub async fn load_products(
        &self,
        page: Option<u32>,
        append: bool,
    ) -> Result<LoadOutcome, CatalogFetchError> {
        let generation = if append {
            self.generation()
        } else {
            self.invalidate()
        };
        let _replacing = (!append).then(|| PendingGuard::enter(&self.pending_replaces));
        let _loading = LoadingIndicator::show(&self.pending_loads, self.view.as_ref());

        let query = self
            .filters
            .with(|state| state.filters.to_query(page.unwrap_or(DEFAULT_PAGE)));
        debug!(
            page = query.page,
            limit = query.limit,
            append,
            generation,
            "requesting products"
        );

        let result = self.catalog.fetch_products(&query).await;

        if self.generation() != generation {
            debug!(page = query.page, generation, "discarding stale product response");
            return Ok(LoadOutcome::Stale);
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(page = query.page, append, error = %err, "product load failed");
                self.view.show_error(Some(&err.user_message()));
                return Err(err);
            }
        };

        let received = response.products.len();
        let total = response.pagination.total;
        self.products.set(move |state| {
            if append {
                state.products.extend(response.products);
            } else {
                state.products = response.products;
            }
            state.total = total;
        });
        self.view.show_error(None);

        Ok(LoadOutcome::Applied { received, total })
    }

    /// Loads and normalizes the category tree into the filter store.
    /// `loadingCategories` is cleared whether or not the request succeeds.
    /// Returns `Ok(None)` when the session ended before the response came
    /// back; the filter store is left untouched in that case.
    pub async fn load_categories(&self) -> Result<Option<usize>, CatalogFetchError> {
        let session = self.session.load(Ordering::SeqCst);
        let result = self.catalog.fetch_categories().await;

        if self.session.load(Ordering::SeqCst) != session {
            debug!(session, "discarding stale category response");
            return Ok(None);
        }

        match result {
            Ok(raw) => {
                let categories = normalize_categories(&raw);
                let count = categories.len();
                self.filters.set(move |state| {
                    state.categories = categories;
                    state.loading_categories = false;
                });
                debug!(count, "categories loaded");
                Ok(Some(count))
            }
            Err(err) => {
                warn!(error = %err, "category load failed");
                self.filters.set(|state| state.loading_categories = false);
                self.view.show_error(Some(&err.user_message()));
                Err(err)
            }
        }
    }
}

struct PendingGuard<'a> {
    count: &'a AtomicUsize,
}

impl<'a> PendingGuard<'a> {
    fn enter(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self { count }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Keeps the loading indicator up while any load is outstanding.
struct LoadingIndicator<'a> {
    pending: &'a AtomicUsize,
    view: &'a dyn PageView,
}

impl<'a> LoadingIndicator<'a> {
    fn show(pending: &'a AtomicUsize, view: &'a dyn PageView) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        view.set_loading(true);
        Self { pending, view }
    }
}

impl Drop for LoadingIndicator<'_> {
    fn drop(&mut self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.view.set_loading(false);
        }
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
