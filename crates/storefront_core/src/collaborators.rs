//! Narrow contracts for everything the page controller does not own:
//! the catalog API, the rendered page, routing, scroll detection and
//! event delivery.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::future::BoxFuture;
use shared::{
    categories::CategoryTree,
    protocol::{Product, ProductQuery, ProductsResponse},
};

use crate::{
    error::CatalogFetchError,
    event_binder::{DomEvent, Region},
    state::FilterState,
    store::Subscription,
};

/// Callback that starts asynchronous work; the caller decides how to drive it.
pub type AsyncCallback = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Delegated listener attached to a page region.
pub type DomHandler = Arc<dyn Fn(DomEvent) -> BoxFuture<'static, ()> + Send + Sync>;

#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ProductsResponse, CatalogFetchError>;
    async fn fetch_categories(&self) -> Result<CategoryTree, CatalogFetchError>;
}


/// Target regions of the listing page.
pub trait PageView: Send + Sync {
    /// Header, footer, empty filter panel and `skeleton_count` placeholder cards.
    fn render_shell(&self, skeleton_count: usize);
    fn render_filter_panel(&self, state: &FilterState);
    /// Repaints the whole grid from `products`.
    fn render_products(&self, products: &[Product]);
    /// Updates and reveals the total line.
    fn show_summary(&self, text: &str);
    fn set_loading(&self, visible: bool);
    /// `None` clears a previously shown message.
    fn show_error(&self, message: Option<&str>);
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub trait ScrollTrigger: Send + Sync {
    /// Invokes `on_near_bottom` whenever the viewport nears the end of the
    /// page until the returned handle is unsubscribed.
    fn arm(&self, on_near_bottom: AsyncCallback) -> Subscription;
}

pub trait EventHost: Send + Sync {
    fn listen(&self, region: Region, handler: DomHandler) -> Subscription;
}

type Registrations<K, V> = Arc<Mutex<(u64, Vec<(u64, K, V)>)>>;

fn register<K, V>(table: &Registrations<K, V>, key: K, value: V) -> Subscription
where
    K: Send + 'static,
    V: Send + 'static,
{
    let id = {
        let mut guard = table.lock().unwrap_or_else(PoisonError::into_inner);
        let id = guard.0;
        guard.0 = guard.0.wrapping_add(1);
        guard.1.push((id, key, value));
        id
    };

    let table = Arc::downgrade(table);
    Subscription::new(move || {
        if let Some(table) = table.upgrade() {
            let mut guard = table.lock().unwrap_or_else(PoisonError::into_inner);
            guard.1.retain(|(entry_id, _, _)| *entry_id != id);
        }
    })
}

/// Scroll trigger driven explicitly through [`ManualScrollTrigger::fire`].
#[derive(Default)]
pub struct ManualScrollTrigger {
    callbacks: Registrations<(), AsyncCallback>,
}

impl ManualScrollTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every armed callback and waits for the work they started.
    pub async fn fire(&self) {
        let callbacks: Vec<AsyncCallback> = {
            let guard = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
            guard.1.iter().map(|(_, _, cb)| Arc::clone(cb)).collect()
        };
        let pending: Vec<_> = callbacks.iter().map(|cb| cb()).collect();
        futures::future::join_all(pending).await;
    }

    pub fn armed_count(&self) -> usize {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .1
            .len()
    }
}

impl ScrollTrigger for ManualScrollTrigger {
    fn arm(&self, on_near_bottom: AsyncCallback) -> Subscription {
        register(&self.callbacks, (), on_near_bottom)
    }
}

/// Region → listener table; events are delivered with [`DelegatingEventHost::emit`].
#[derive(Default)]
pub struct DelegatingEventHost {
    handlers: Registrations<Region, DomHandler>,
}

impl DelegatingEventHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn emit(&self, region: Region, event: DomEvent) {
        let handlers: Vec<DomHandler> = {
            let guard = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
            guard
                .1
                .iter()
                .filter(|(_, r, _)| *r == region)
                .map(|(_, _, handler)| Arc::clone(handler))
                .collect()
        };

        for handler in handlers {
            handler(event.clone()).await;
        }
    }

    pub fn listener_count(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .1
            .len()
    }
}

impl EventHost for DelegatingEventHost {
    fn listen(&self, region: Region, handler: DomHandler) -> Subscription {
        register(&self.handlers, region, handler)
    }
}
