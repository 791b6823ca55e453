//! Fake collaborators shared by the unit tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use shared::{
    categories::CategoryTree,
    protocol::{PaginationInfo, Product, ProductQuery, ProductsResponse},
};
use tokio::sync::Notify;

use crate::{
    collaborators::{CatalogApi, Navigator, PageView},
    error::CatalogFetchError,
    state::{FilterState, Filters},
};

pub fn product(n: usize) -> Product {
    let mut product = Product::new(format!("p{n}"), format!("상품 {n}"));
    product.lprice = format!("{}", 1000 + n);
    product
}

/// `count` products numbered from `first`, with the server-reported `total`.
pub fn page_of(first: usize, count: usize, total: u64) -> ProductsResponse {
    ProductsResponse {
        products: (first..first + count).map(product).collect(),
        pagination: PaginationInfo {
            total,
            ..PaginationInfo::default()
        },
    }
}

pub fn ids(products: &[Product]) -> Vec<String> {
    products.iter().map(|p| p.product_id.0.clone()).collect()
}

struct Scripted<T> {
    result: Result<T, CatalogFetchError>,
    gate: Option<Arc<Notify>>,
}

/// Catalog answering from scripted queues; unscripted calls fail.
#[derive(Default)]
pub struct FakeCatalog {
    products: Mutex<VecDeque<Scripted<ProductsResponse>>>,
    categories: Mutex<VecDeque<Scripted<CategoryTree>>>,
    queries: Mutex<Vec<ProductQuery>>,
    category_calls: Mutex<usize>,
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeCatalog {
    pub fn push_products(&self, response: ProductsResponse) {
        self.push_products_result(Ok(response), None);
    }

    pub fn push_gated_products(&self, response: ProductsResponse, gate: Arc<Notify>) {
        self.push_products_result(Ok(response), Some(gate));
    }

    pub fn push_products_error(&self, err: CatalogFetchError) {
        self.push_products_result(Err(err), None);
    }

    pub fn push_products_result(
        &self,
        result: Result<ProductsResponse, CatalogFetchError>,
        gate: Option<Arc<Notify>>,
    ) {
        lock(&self.products).push_back(Scripted { result, gate });
    }

    pub fn push_categories(&self, raw: CategoryTree) {
        lock(&self.categories).push_back(Scripted {
            result: Ok(raw),
            gate: None,
        });
    }

    pub fn push_gated_categories(&self, raw: CategoryTree, gate: Arc<Notify>) {
        lock(&self.categories).push_back(Scripted {
            result: Ok(raw),
            gate: Some(gate),
        });
    }

    pub fn push_categories_error(&self, err: CatalogFetchError) {
        lock(&self.categories).push_back(Scripted {
            result: Err(err),
            gate: None,
        });
    }

    pub fn queries(&self) -> Vec<ProductQuery> {
        lock(&self.queries).clone()
    }

    pub fn category_calls(&self) -> usize {
        *lock(&self.category_calls)
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ProductsResponse, CatalogFetchError> {
        lock(&self.queries).push(query.clone());
        let scripted = lock(&self.products).pop_front();
        let Some(Scripted { result, gate }) = scripted else {
            return Err(CatalogFetchError::Unavailable);
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        result
    }

    async fn fetch_categories(&self) -> Result<CategoryTree, CatalogFetchError> {
        *lock(&self.category_calls) += 1;
        let scripted = lock(&self.categories).pop_front();
        match scripted {
            Some(Scripted { result, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                result
            }
            None => Ok(CategoryTree::default()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewLog {
    pub shells: Vec<usize>,
    pub filter_panels: Vec<Filters>,
    pub category_counts: Vec<usize>,
    pub grids: Vec<Vec<String>>,
    pub summaries: Vec<String>,
    pub loading: Vec<bool>,
    pub errors: Vec<Option<String>>,
}

#[derive(Default)]
pub struct RecordingView {
    log: Mutex<ViewLog>,
}

impl RecordingView {
    pub fn log(&self) -> ViewLog {
        lock(&self.log).clone()
    }

    pub fn loading_visible(&self) -> bool {
        lock(&self.log).loading.last().copied().unwrap_or(false)
    }

    pub fn last_error(&self) -> Option<String> {
        lock(&self.log).errors.last().cloned().flatten()
    }
}

impl PageView for RecordingView {
    fn render_shell(&self, skeleton_count: usize) {
        lock(&self.log).shells.push(skeleton_count);
    }

    fn render_filter_panel(&self, state: &FilterState) {
        let mut log = lock(&self.log);
        log.filter_panels.push(state.filters.clone());
        log.category_counts.push(state.categories.len());
    }

    fn render_products(&self, products: &[Product]) {
        lock(&self.log).grids.push(ids(products));
    }

    fn show_summary(&self, text: &str) {
        lock(&self.log).summaries.push(text.to_string());
    }

    fn set_loading(&self, visible: bool) {
        lock(&self.log).loading.push(visible);
    }

    fn show_error(&self, message: Option<&str>) {
        lock(&self.log).errors.push(message.map(str::to_string));
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn paths(&self) -> Vec<String> {
        lock(&self.paths).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        lock(&self.paths).push(path.to_string());
    }
}

/// Lets spawned tasks run until `done` holds (bounded).
pub async fn settle(done: impl Fn() -> bool) {
    for _ in 0..1000 {
        if done() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
