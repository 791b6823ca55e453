use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use shared::domain::ProductId;
use storefront_core::{
    load_settings, CatalogApi, DelegatingEventHost, FilterState, FilterStore, HomePage,
    HttpCatalogClient, ManualScrollTrigger, PageDeps, ProductListState, ProductStore, UiAction,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::{TerminalNavigator, TerminalView};

/// Renders the storefront listing page in the terminal.
#[derive(Parser, Debug)]
struct Args {
    /// Catalog server base URL; overrides storefront.toml and the environment.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    category1: Option<String>,
    #[arg(long, requires = "category1")]
    category2: Option<String>,
    /// Number of "scrolled to bottom" triggers to simulate after the first page.
    #[arg(long, default_value_t = 0)]
    scrolls: u32,
    /// Product to open once loading is done.
    #[arg(long)]
    open: Option<String>,
}

impl Args {
    /// Filter actions in the order a user would apply them.
    fn actions(&self) -> Vec<UiAction> {
        let mut actions = Vec::new();
        if let Some(limit) = self.limit {
            actions.push(UiAction::ChangeLimit(limit));
        }
        if let Some(sort) = &self.sort {
            actions.push(UiAction::ChangeSort(sort.clone()));
        }
        match (&self.category1, &self.category2) {
            (Some(category1), Some(category2)) => actions.push(UiAction::SelectCategory2 {
                category1: category1.clone(),
                category2: category2.clone(),
            }),
            (Some(category1), None) => actions.push(UiAction::SelectCategory1 {
                category1: category1.clone(),
            }),
            _ => {}
        }
        if let Some(search) = &self.search {
            actions.push(UiAction::SubmitSearch(search.clone()));
        }
        actions
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load storefront settings")?;
    if let Some(url) = &args.server_url {
        settings.api_base_url = url.clone();
    }
    settings.validate().context("invalid storefront settings")?;

    let base_url = settings.api_base_url()?;
    info!(%base_url, "using catalog server");
    let catalog: Arc<dyn CatalogApi> = Arc::new(
        HttpCatalogClient::new(base_url, settings.request_timeout())
            .context("failed to build catalog client")?,
    );

    let scroll = Arc::new(ManualScrollTrigger::new());
    let events = Arc::new(DelegatingEventHost::new());
    let page = HomePage::new(
        PageDeps {
            filters: FilterStore::new(FilterState::default()),
            products: ProductStore::new(ProductListState::default()),
            catalog,
            view: Arc::new(TerminalView),
            navigator: Arc::new(TerminalNavigator),
            scroll: scroll.clone(),
            events,
        },
        &settings,
    );

    page.mount()
        .await
        .context("mount task panicked")?
        .context("failed to mount listing page")?;

    for action in args.actions() {
        let name = action.name();
        page.binder()
            .dispatch(action)
            .await
            .with_context(|| format!("{name} failed"))?;
    }

    for _ in 0..args.scrolls {
        scroll.fire().await;
    }

    if let Some(product_id) = args.open {
        page.binder()
            .dispatch(UiAction::OpenProduct(ProductId::new(product_id)))
            .await?;
    }

    page.unmount();
    Ok(())
}
