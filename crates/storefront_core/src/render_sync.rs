//! Store → view projections. Nothing here fetches or mutates state.

use std::sync::Arc;

use crate::{
    collaborators::PageView,
    state::{FilterState, FilterStore, ProductListState, ProductStore},
    store::Subscription,
};

pub fn summary_line(total: u64) -> String {
    format!("총 {total}개의 상품")
}

pub fn project_filter_panel(view: &dyn PageView, state: &FilterState) {
    view.render_filter_panel(state);
}

pub fn project_product_grid(view: &dyn PageView, state: &ProductListState) {
    view.render_products(&state.products);
    view.show_summary(&summary_line(state.total));
}

pub fn bind_filter_panel(view: &Arc<dyn PageView>, store: &FilterStore) -> Subscription {
    let view = Arc::clone(view);
    store.subscribe(move |state| project_filter_panel(view.as_ref(), state))
}

pub fn bind_product_grid(view: &Arc<dyn PageView>, store: &ProductStore) -> Subscription {
    let view = Arc::clone(view);
    store.subscribe(move |state| project_product_grid(view.as_ref(), state))
}
