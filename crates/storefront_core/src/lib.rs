//! Page controller for the storefront product listing.
//!
//! The controller keeps two observable stores ([`FilterStore`] and
//! [`ProductStore`]) consistent with user input and catalog responses,
//! drives scroll-based pagination, and binds/unbinds every listener it owns
//! across a mount/unmount lifecycle. Rendering, navigation, scroll detection
//! and event delivery are reached through the traits in [`collaborators`].

pub mod catalog_client;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod event_binder;
pub mod lifecycle;
pub mod loader;
pub mod pagination;
pub mod render_sync;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog_client::HttpCatalogClient;
pub use collaborators::{
    AsyncCallback, CatalogApi, DelegatingEventHost, DomHandler, EventHost, ManualScrollTrigger,
    Navigator, PageView, ScrollTrigger,
};
pub use config::{load_settings, StorefrontSettings};
pub use error::{CatalogFetchError, ConfigError, PageError};
pub use event_binder::{DomEvent, Element, EventBinder, EventKind, Region, UiAction};
pub use lifecycle::{HomePage, PageDeps};
pub use loader::{DataLoader, LoadOutcome};
pub use pagination::{PaginationCoordinator, ScrollDecision};
pub use state::{FilterPatch, FilterState, FilterStore, Filters, ProductListState, ProductStore};
pub use store::{Store, Subscription};
