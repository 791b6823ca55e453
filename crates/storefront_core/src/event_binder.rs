//! Delegated UI events → filter mutations, reloads and navigation.
//!
//! Raw events are matched against the page's element markers once, in
//! [`translate`], and turned into a [`UiAction`]. Everything past that point
//! works on actions only, so a front end without a DOM can dispatch actions
//! directly through [`EventBinder::dispatch`].

use std::{collections::BTreeMap, sync::Arc};

use futures::FutureExt;
use shared::domain::{product_detail_path, ProductId};
use tracing::{debug, warn};

use crate::{
    collaborators::{DomHandler, EventHost, Navigator},
    error::CatalogFetchError,
    loader::{DataLoader, LoadOutcome},
    state::{FilterPatch, FilterStore},
    store::Subscription,
};

pub mod markers {
    pub const FILTER_PANEL_ID: &str = "filter-panel";
    pub const PRODUCTS_GRID_ID: &str = "products-grid";
    pub const LOADING_INDICATOR_ID: &str = "loading-indicator";
    pub const TOTAL_INFO_ID: &str = "total-info";
    pub const SEARCH_INPUT_ID: &str = "search-input";
    pub const LIMIT_SELECT_ID: &str = "limit-select";
    pub const SORT_SELECT_ID: &str = "sort-select";
    pub const CATEGORY1_FILTER_CLASS: &str = "category1-filter-btn";
    pub const CATEGORY2_FILTER_CLASS: &str = "category2-filter-btn";
    pub const PRODUCT_CARD_CLASS: &str = "product-card";
    pub const DATA_CATEGORY1: &str = "category1";
    pub const DATA_CATEGORY2: &str = "category2";
    pub const DATA_PRODUCT_ID: &str = "product-id";
    pub const ENTER_KEY: &str = "Enter";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    FilterPanel,
    ProductsGrid,
}

impl Region {
    pub fn element_id(self) -> &'static str {
        match self {
            Self::FilterPanel => markers::FILTER_PANEL_ID,
            Self::ProductsGrid => markers::PRODUCTS_GRID_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Click,
    Change,
    KeyDown { key: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub data: BTreeMap<String, String>,
    pub value: Option<String>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    pub kind: EventKind,
    pub target: Element,
    /// Parents of `target`, nearest first.
    pub ancestors: Vec<Element>,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: Element) -> Self {
        Self {
            kind,
            target,
            ancestors: Vec::new(),
        }
    }

    pub fn click(target: Element) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn change(target: Element) -> Self {
        Self::new(EventKind::Change, target)
    }

    pub fn key_down(target: Element, key: impl Into<String>) -> Self {
        Self::new(EventKind::KeyDown { key: key.into() }, target)
    }

    pub fn with_ancestors(mut self, ancestors: Vec<Element>) -> Self {
        self.ancestors = ancestors;
        self
    }

    /// Target or nearest ancestor carrying `class`.
    pub fn closest(&self, class: &str) -> Option<&Element> {
        std::iter::once(&self.target)
            .chain(self.ancestors.iter())
            .find(|element| element.has_class(class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    SelectCategory1 { category1: String },
    SelectCategory2 { category1: String, category2: String },
    ChangeLimit(u32),
    ChangeSort(String),
    SubmitSearch(String),
    OpenProduct(ProductId),
}

impl UiAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SelectCategory1 { .. } => "select_category1",
            Self::SelectCategory2 { .. } => "select_category2",
            Self::ChangeLimit(_) => "change_limit",
            Self::ChangeSort(_) => "change_sort",
            Self::SubmitSearch(_) => "submit_search",
            Self::OpenProduct(_) => "open_product",
        }
    }

    /// Filter mutation for this action. Every filter change restarts at page 1.
    pub fn patch(&self) -> Option<FilterPatch> {
        let patch = match self {
            Self::SelectCategory1 { category1 } => FilterPatch {
                category1: Some(category1.clone()),
                category2: Some(String::new()),
                ..FilterPatch::default()
            },
            Self::SelectCategory2 {
                category1,
                category2,
            } => FilterPatch {
                category1: Some(category1.clone()),
                category2: Some(category2.clone()),
                ..FilterPatch::default()
            },
            Self::ChangeLimit(limit) => FilterPatch {
                limit: Some(*limit),
                ..FilterPatch::default()
            },
            Self::ChangeSort(sort) => FilterPatch {
                sort: Some(sort.clone()),
                ..FilterPatch::default()
            },
            Self::SubmitSearch(search) => FilterPatch {
                search: Some(search.trim().to_string()),
                ..FilterPatch::default()
            },
            Self::OpenProduct(_) => return None,
        };

        Some(FilterPatch {
            page: Some(1),
            ..patch
        })
    }
}

pub fn translate(region: Region, event: &DomEvent) -> Option<UiAction> {
    match region {
        Region::FilterPanel => translate_filter_event(event),
        Region::ProductsGrid => translate_grid_event(event),
    }
}

fn translate_filter_event(event: &DomEvent) -> Option<UiAction> {
    let target = &event.target;
    let data = |key: &str| target.data(key).unwrap_or_default().to_string();

    match &event.kind {
        EventKind::Click if target.has_class(markers::CATEGORY1_FILTER_CLASS) => {
            Some(UiAction::SelectCategory1 {
                category1: data(markers::DATA_CATEGORY1),
            })
        }
        EventKind::Click if target.has_class(markers::CATEGORY2_FILTER_CLASS) => {
            Some(UiAction::SelectCategory2 {
                category1: data(markers::DATA_CATEGORY1),
                category2: data(markers::DATA_CATEGORY2),
            })
        }
        EventKind::Change if target.has_id(markers::LIMIT_SELECT_ID) => {
            let raw = target.value.as_deref().unwrap_or_default();
            match raw.trim().parse::<u32>() {
                Ok(limit) if limit > 0 => Some(UiAction::ChangeLimit(limit)),
                _ => {
                    warn!(value = raw, "ignoring unusable page size");
                    None
                }
            }
        }
        EventKind::Change if target.has_id(markers::SORT_SELECT_ID) => Some(UiAction::ChangeSort(
            target.value.clone().unwrap_or_default(),
        )),
        EventKind::KeyDown { key }
            if key == markers::ENTER_KEY && target.has_id(markers::SEARCH_INPUT_ID) =>
        {
            Some(UiAction::SubmitSearch(
                target.value.as_deref().unwrap_or_default().trim().to_string(),
            ))
        }
        _ => None,
    }
}

fn translate_grid_event(event: &DomEvent) -> Option<UiAction> {
    if event.kind != EventKind::Click {
        return None;
    }
    let card = event.closest(markers::PRODUCT_CARD_CLASS)?;
    let product_id = card.data(markers::DATA_PRODUCT_ID)?;
    if product_id.is_empty() {
        return None;
    }
    Some(UiAction::OpenProduct(ProductId::new(product_id)))
}

pub struct EventBinder {
    filters: FilterStore,
    loader: Arc<DataLoader>,
    navigator: Arc<dyn Navigator>,
}

impl EventBinder {
    pub fn new(filters: FilterStore, loader: Arc<DataLoader>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            filters,
            loader,
            navigator,
        }
    }

    /// Applies one action. Filter actions reload the first page (replace);
    /// product actions navigate and leave state alone.
    pub async fn dispatch(&self, action: UiAction) -> Result<Option<LoadOutcome>, CatalogFetchError> {
        debug!(action = action.name(), "dispatching ui action");

        if let UiAction::OpenProduct(product_id) = &action {
            self.navigator.navigate(&product_detail_path(product_id));
            return Ok(None);
        }

        if let Some(patch) = action.patch() {
            self.filters.set(|state| state.filters.apply(patch));
            return self.loader.load_products(None, false).await.map(Some);
        }

        Ok(None)
    }

    /// Attaches one delegated listener per region.
    pub fn bind(self: &Arc<Self>, host: &dyn EventHost) -> Vec<Subscription> {
        [Region::FilterPanel, Region::ProductsGrid]
            .into_iter()
            .map(|region| host.listen(region, self.handler(region)))
            .collect()
    }

    fn handler(self: &Arc<Self>, region: Region) -> DomHandler {
        let binder = Arc::clone(self);
        Arc::new(move |event: DomEvent| {
            let Some(action) = translate(region, &event) else {
                return futures::future::ready(()).boxed();
            };
            let binder = Arc::clone(&binder);
            async move {
                let name = action.name();
                if let Err(err) = binder.dispatch(action).await {
                    warn!(action = name, error = %err, "ui action reload failed");
                }
            }
            .boxed()
        })
    }
}

#[cfg(test)]
#[path = "tests/event_binder_tests.rs"]
mod tests;
