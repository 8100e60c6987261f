//! Thin PostgREST client: table reads and writes plus stored procedure calls.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::backend::storage::traits::Table;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("unexpected store response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Filter, sort and limit parameters for one request.
#[derive(Debug, Clone)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl Query {
    pub fn new() -> Self {
        Self {
            params: vec![("select".to_string(), "*".to_string())],
        }
    }

    /// Restrict the returned columns
    pub fn select(mut self, columns: &str) -> Self {
        self.params.retain(|(key, _)| key != "select");
        self.params.push(("select".to_string(), columns.to_string()));
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.params.push((column.to_string(), format!("eq.{value}")));
        self
    }

    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.params
            .push(("order".to_string(), format!("{column}.{}", order.as_str())));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

impl RestClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Arc::from(base_url.trim_end_matches('/')),
            api_key: Arc::from(api_key),
        }
    }

    pub async fn select<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        let request = self
            .request(Method::GET, self.table_url(table))
            .query(query.params());
        Self::send(request).await
    }

    pub async fn insert<B, T>(&self, table: Table, rows: &B) -> Result<Vec<T>, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST, self.table_url(table))
            .header("Prefer", "return=representation")
            .json(rows);
        Self::send(request).await
    }

    pub async fn update<B, T>(&self, table: Table, query: &Query, body: &B) -> Result<Vec<T>, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::PATCH, self.table_url(table))
            .query(query.params())
            .header("Prefer", "return=representation")
            .json(body);
        Self::send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: Table,
        query: &Query,
    ) -> Result<Vec<T>, StoreError> {
        let request = self
            .request(Method::DELETE, self.table_url(table))
            .query(query.params())
            .header("Prefer", "return=representation");
        Self::send(request).await
    }

    /// Call a stored procedure exposed under `/rest/v1/rpc/<function>`
    pub async fn rpc<T: DeserializeOwned>(
        &self,
        function: &str,
        args: &serde_json::Value,
    ) -> Result<T, StoreError> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let request = self.request(Method::POST, url).json(args);
        Self::send(request).await
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", self.api_key.as_ref())
            .bearer_auth(self.api_key.as_ref())
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
