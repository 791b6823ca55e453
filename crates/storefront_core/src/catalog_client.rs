use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    categories::CategoryTree,
    error::ApiError,
    protocol::{ProductQuery, ProductsResponse},
};
use url::Url;

use crate::{collaborators::CatalogApi, error::CatalogFetchError};

/// [`CatalogApi`] over HTTP: `GET {base}/api/products` and `GET {base}/api/categories`.
pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: Url, timeout: Option<Duration>) -> Result<Self, CatalogFetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| CatalogFetchError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, CatalogFetchError> {
        self.base_url
            .join(path)
            .map_err(|e| CatalogFetchError::Transport(format!("invalid endpoint '{path}': {e}")))
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn map_transport(err: reqwest::Error) -> CatalogFetchError {
    if err.is_timeout() {
        CatalogFetchError::Timeout
    } else {
        CatalogFetchError::Transport(err.to_string())
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, CatalogFetchError> {
    let status = res.status();
    let body = res.bytes().await.map_err(map_transport)?;

    if !status.is_success() {
        let message = match serde_json::from_slice::<ApiError>(&body) {
            Ok(api_error) => api_error.message,
            Err(_) => String::from_utf8_lossy(&body).trim().to_string(),
        };
        return Err(CatalogFetchError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|e| CatalogFetchError::Decode(e.to_string()))
}

#[async_trait]
impl CatalogApi for HttpCatalogClient {
    async fn fetch_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ProductsResponse, CatalogFetchError> {
        let res = self
            .http
            .get(self.endpoint("api/products")?)
            .query(query)
            .send()
            .await
            .map_err(map_transport)?;
        decode(res).await
    }

    async fn fetch_categories(&self) -> Result<CategoryTree, CatalogFetchError> {
        let res = self
            .http
            .get(self.endpoint("api/categories")?)
            .send()
            .await
            .map_err(map_transport)?;
        decode(res).await
    }
}

#[cfg(test)]
#[path = "tests/catalog_client_tests.rs"]
mod tests;
