use super::*;

use shared::categories::CategoryTree;
use tokio::sync::Notify;

use crate::{
    state::{FilterState, ProductListState},
    test_support::{ids, page_of, FakeCatalog, RecordingView},
};

struct Fixture {
    filters: FilterStore,
    products: ProductStore,
    catalog: Arc<FakeCatalog>,
    view: Arc<RecordingView>,
    loader: Arc<DataLoader>,
}

fn fixture() -> Fixture {
    let filters = FilterStore::new(FilterState::default());
    let products = ProductStore::new(ProductListState::default());
    let catalog = Arc::new(FakeCatalog::default());
    let view = Arc::new(RecordingView::default());
    let loader = Arc::new(DataLoader::new(
        filters.clone(),
        products.clone(),
        Arc::clone(&catalog) as Arc<dyn CatalogApi>,
        Arc::clone(&view) as Arc<dyn PageView>,
    ));
    Fixture {
        filters,
        products,
        catalog,
        view,
        loader,
    }
}

#[tokio::test]
async fn replace_load_publishes_exactly_the_response() {
    let fx = fixture();
    fx.products.set(|state| {
        state.products = page_of(100, 3, 3).products;
        state.total = 3;
    });
    fx.catalog.push_products(page_of(0, 20, 57));

    let outcome = fx.loader.load_products(None, false).await.expect("load");

    assert_eq!(
        outcome,
        LoadOutcome::Applied {
            received: 20,
            total: 57
        }
    );
    let state = fx.products.get();
    assert_eq!(ids(&state.products), ids(&page_of(0, 20, 57).products));
    assert_eq!(state.total, 57);
    assert_eq!(fx.view.log().loading, vec![true, false]);
}

#[tokio::test]
async fn append_load_concatenates_in_server_order() {
    let fx = fixture();
    fx.catalog.push_products(page_of(0, 20, 57));
    fx.catalog.push_products(page_of(20, 20, 58));

    fx.loader.load_products(None, false).await.expect("first");
    fx.loader.load_products(Some(2), true).await.expect("second");

    let state = fx.products.get();
    assert_eq!(ids(&state.products), ids(&page_of(0, 40, 0).products));
    assert_eq!(state.total, 58);
}

#[tokio::test]
async fn query_uses_current_filters_with_explicit_page_override() {
    let fx = fixture();
    fx.filters.set(|state| {
        state.filters.page = 1;
        state.filters.limit = 10;
        state.filters.search = "컵".into();
        state.filters.category1 = "생활/건강".into();
        state.filters.sort = "name_asc".into();
    });
    fx.catalog.push_products(page_of(0, 10, 30));

    fx.loader.load_products(Some(3), true).await.expect("load");

    let queries = fx.catalog.queries();
    let query = &queries[0];
    assert_eq!(query.page, 3);
    assert_eq!(query.limit, 10);
    assert_eq!(query.search, "컵");
    assert_eq!(query.category1, "생활/건강");
    assert_eq!(query.category2, "");
    assert_eq!(query.sort, "name_asc");
}

#[tokio::test]
async fn failure_keeps_store_clears_indicator_and_shows_error() {
    let fx = fixture();
    fx.catalog.push_products(page_of(0, 2, 2));
    fx.loader.load_products(None, false).await.expect("first");
    fx.catalog.push_products_error(CatalogFetchError::Status {
        status: 503,
        message: "maintenance".into(),
    });

    let err = fx
        .loader
        .load_products(None, false)
        .await
        .expect_err("should fail");

    assert!(matches!(err, CatalogFetchError::Status { status: 503, .. }));
    assert_eq!(fx.products.get().products.len(), 2);
    assert!(!fx.view.loading_visible());
    assert_eq!(fx.view.last_error(), Some(err.user_message()));

    fx.catalog.push_products(page_of(0, 1, 1));
    fx.loader.load_products(None, false).await.expect("recovered");
    assert_eq!(fx.view.last_error(), None);
}

#[tokio::test]
async fn replace_load_discards_in_flight_append_response() {
    let fx = fixture();
    let gate = Arc::new(Notify::new());
    fx.catalog.push_products(page_of(0, 20, 57));
    fx.loader.load_products(None, false).await.expect("first");

    fx.catalog
        .push_gated_products(page_of(20, 20, 57), Arc::clone(&gate));
    fx.catalog.push_products(page_of(900, 5, 5));

    let append = {
        let loader = Arc::clone(&fx.loader);
        tokio::spawn(async move { loader.load_products(Some(2), true).await })
    };
    crate::test_support::settle(|| fx.catalog.queries().len() == 2).await;

    let replaced = fx.loader.load_products(None, false).await.expect("replace");
    assert!(fx.view.loading_visible());
    gate.notify_one();
    let appended = append.await.expect("join").expect("append");

    assert_eq!(
        replaced,
        LoadOutcome::Applied {
            received: 5,
            total: 5
        }
    );
    assert_eq!(appended, LoadOutcome::Stale);
    let state = fx.products.get();
    assert_eq!(ids(&state.products), ids(&page_of(900, 5, 5).products));
    assert_eq!(state.total, 5);
    assert!(!fx.view.loading_visible());
}

#[tokio::test]
async fn invalidate_discards_pending_replace() {
    let fx = fixture();
    let gate = Arc::new(Notify::new());
    fx.catalog
        .push_gated_products(page_of(0, 3, 3), Arc::clone(&gate));

    let pending = {
        let loader = Arc::clone(&fx.loader);
        tokio::spawn(async move { loader.load_products(None, false).await })
    };
    crate::test_support::settle(|| fx.catalog.queries().len() == 1).await;
    fx.loader.invalidate();
    gate.notify_one();

    assert_eq!(
        pending.await.expect("join").expect("load"),
        LoadOutcome::Stale
    );
    assert!(fx.products.get().products.is_empty());
}

#[tokio::test]
async fn categories_are_normalized_into_filter_store() {
    let fx = fixture();
    let raw: CategoryTree = serde_json::from_str(
        r#"{"생활/건강": {"생활용품": {}, "주방용품": {}}, "디지털/가전": {"노트북": {}}}"#,
    )
    .expect("raw");
    fx.catalog.push_categories(raw);

    let count = fx.loader.load_categories().await.expect("categories");

    assert_eq!(count, Some(2));
    let state = fx.filters.get();
    assert!(!state.loading_categories);
    assert_eq!(state.categories[0].name, "생활/건강");
    assert_eq!(state.categories[0].children, vec!["생활용품", "주방용품"]);
    assert_eq!(state.categories[1].name, "디지털/가전");
}

#[tokio::test]
async fn category_failure_still_clears_loading_flag() {
    let fx = fixture();
    fx.catalog
        .push_categories_error(CatalogFetchError::Transport("connection refused".into()));

    let err = fx.loader.load_categories().await.expect_err("should fail");

    assert!(matches!(err, CatalogFetchError::Transport(_)));
    assert!(!fx.filters.get().loading_categories);
    assert!(fx.view.last_error().is_some());
}

#[tokio::test]
async fn category_response_after_session_reset_is_dropped() {
    let fx = fixture();
    fx.filters.set(|state| state.loading_categories = true);
    let gate = Arc::new(Notify::new());
    let raw: CategoryTree = serde_json::from_str(r#"{"도서": {"소설": {}}}"#).expect("raw");
    fx.catalog.push_gated_categories(raw, Arc::clone(&gate));

    let pending = {
        let loader = Arc::clone(&fx.loader);
        tokio::spawn(async move { loader.load_categories().await })
    };
    crate::test_support::settle(|| fx.catalog.category_calls() == 1).await;
    fx.loader.reset_session();
    gate.notify_one();

    assert_eq!(pending.await.expect("join").expect("categories"), None);
    let state = fx.filters.get();
    assert!(state.loading_categories);
    assert!(state.categories.is_empty());
}

#[tokio::test]
async fn product_reload_does_not_drop_pending_categories() {
    let fx = fixture();
    let gate = Arc::new(Notify::new());
    let raw: CategoryTree = serde_json::from_str(r#"{"도서": {"소설": {}}}"#).expect("raw");
    fx.catalog.push_gated_categories(raw, Arc::clone(&gate));
    fx.catalog.push_products(page_of(0, 3, 3));

    let pending = {
        let loader = Arc::clone(&fx.loader);
        tokio::spawn(async move { loader.load_categories().await })
    };
    crate::test_support::settle(|| fx.catalog.category_calls() == 1).await;
    fx.loader.load_products(None, false).await.expect("reload");
    gate.notify_one();

    assert_eq!(pending.await.expect("join").expect("categories"), Some(1));
    assert_eq!(fx.filters.get().categories[0].name, "도서");
}

#[tokio::test]
async fn replace_pending_tracks_outstanding_replace_loads() {
    let fx = fixture();
    let gate = Arc::new(Notify::new());
    fx.catalog
        .push_gated_products(page_of(0, 3, 3), Arc::clone(&gate));
    assert!(!fx.loader.replace_pending());

    let pending = {
        let loader = Arc::clone(&fx.loader);
        tokio::spawn(async move { loader.load_products(None, false).await })
    };
    crate::test_support::settle(|| fx.catalog.queries().len() == 1).await;
    assert!(fx.loader.replace_pending());

    gate.notify_one();
    pending.await.expect("join").expect("load");
    assert!(!fx.loader.replace_pending());
}
