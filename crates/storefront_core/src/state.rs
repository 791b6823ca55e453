//! Contents of the two shared stores and their partial-update model.

use shared::{
    domain::{CategoryDescriptor, DEFAULT_LIMIT, DEFAULT_PAGE, DEFAULT_SORT},
    protocol::{Product, ProductQuery},
};

use crate::store::Store;

pub type FilterStore = Store<FilterState>;
pub type ProductStore = Store<ProductListState>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filters {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub category1: String,
    pub category2: String,
    pub sort: String,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            search: String::new(),
            category1: String::new(),
            category2: String::new(),
            sort: DEFAULT_SORT.to_string(),
        }
    }
}

impl Filters {
    pub fn apply(&mut self, patch: FilterPatch) {
        let FilterPatch {
            page,
            limit,
            search,
            category1,
            category2,
            sort,
        } = patch;

        if let Some(page) = page {
            self.page = page.max(1);
        }
        if let Some(limit) = limit {
            self.limit = limit.max(1);
        }
        if let Some(search) = search {
            self.search = search;
        }
        if let Some(category1) = category1 {
            self.category1 = category1;
        }
        if let Some(category2) = category2 {
            self.category2 = category2;
        }
        // category2 only narrows a selected category1.
        if self.category1.is_empty() {
            self.category2.clear();
        }
        if let Some(sort) = sort {
            self.sort = sort;
        }
    }

    /// Query for the catalog; only `page` may differ from the current filters.
    pub fn to_query(&self, page: u32) -> ProductQuery {
        ProductQuery {
            page,
            limit: self.limit,
            search: self.search.clone(),
            category1: self.category1.clone(),
            category2: self.category2.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// Partial update of [`Filters`]; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub category1: Option<String>,
    pub category2: Option<String>,
    pub sort: Option<String>,
}

impl FilterPatch {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub filters: Filters,
    pub categories: Vec<CategoryDescriptor>,
    pub loading_categories: bool,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::initial(&Filters::default())
    }
}

impl FilterState {
    /// Fresh state installed on every mount.
    pub fn initial(defaults: &Filters) -> Self {
        Self {
            filters: Filters {
                page: DEFAULT_PAGE,
                ..defaults.clone()
            },
            categories: Vec::new(),
            loading_categories: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductListState {
    pub products: Vec<Product>,
    pub total: u64,
}

impl ProductListState {
    pub fn loaded(&self) -> u64 {
        self.products.len() as u64
    }

    pub fn has_more(&self) -> bool {
        self.loaded() < self.total
    }
}
