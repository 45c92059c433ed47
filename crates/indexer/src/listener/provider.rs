//! Read service seam and the JSON-RPC provider behind it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::raw::{EventFilter, Order, RawEvent, RawObject, RawTransaction, TransactionFilter};
use crate::error::LookupError;

/// Read-only access to ledger state.
///
/// Every engine entry point is handed an implementation of this trait; none
/// of them open their own connection.
#[async_trait]
pub trait ReadService: Send + Sync {
    /// Objects currently owned by `owner`, with type and content.
    async fn get_owned_objects(&self, owner: &str) -> Result<Vec<RawObject>, LookupError>;

    /// Point lookup of one object. `Ok(None)` when it does not exist.
    async fn get_object(&self, id: &str) -> Result<Option<RawObject>, LookupError>;

    /// One page of the event log.
    async fn query_events(
        &self,
        filter: &EventFilter,
        limit: usize,
        order: Order,
    ) -> Result<Vec<RawEvent>, LookupError>;

    /// One page of transaction history, optionally with emitted events.
    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        order: Order,
        include_events: bool,
    ) -> Result<Vec<RawTransaction>, LookupError>;
}

#[async_trait]
impl<T: ReadService + ?Sized> ReadService for Arc<T> {
    async fn get_owned_objects(&self, owner: &str) -> Result<Vec<RawObject>, LookupError> {
        (**self).get_owned_objects(owner).await
    }

    async fn get_object(&self, id: &str) -> Result<Option<RawObject>, LookupError> {
        (**self).get_object(id).await
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        limit: usize,
        order: Order,
    ) -> Result<Vec<RawEvent>, LookupError> {
        (**self).query_events(filter, limit, order).await
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        order: Order,
        include_events: bool,
    ) -> Result<Vec<RawTransaction>, LookupError> {
        (**self)
            .query_transactions(filter, limit, order, include_events)
            .await
    }
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page<T> {
    data: Vec<T>,
    next_cursor: Option<Value>,
    #[serde(default)]
    has_next_page: bool,
}

#[derive(Deserialize)]
struct ObjectEnvelope {
    data: Option<RawObject>,
}

/// HTTP JSON-RPC provider for a Sui-style full node.
#[derive(Clone)]
pub struct SuiRpcProvider {
    client: Client,
    rpc_url: String,
    max_owned_pages: usize,
    next_id: Arc<AtomicU64>,
}

impl SuiRpcProvider {
    /// Create a provider against `rpc_url`.
    ///
    /// `max_owned_pages` bounds how many pages of owned objects are followed
    /// for a single address.
    pub fn new(rpc_url: &str, timeout: Duration, max_owned_pages: usize) -> Result<Self> {
        reqwest::Url::parse(rpc_url).with_context(|| format!("Invalid RPC URL: {}", rpc_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent("certchain-indexer/rpc")
            .build()
            .context("Failed to build RPC HTTP client")?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            max_owned_pages: max_owned_pages.max(1),
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LookupError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(method, id, "RPC request");

        let response = self.client.post(&self.rpc_url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!(
                "{} returned HTTP {}",
                method, status
            )));
        }

        let envelope: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(format!("{}: {}", method, e)))?;

        if let Some(error) = envelope.error {
            return Err(LookupError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| LookupError::Malformed(format!("{}: missing result", method)))
    }
}

#[async_trait]
impl ReadService for SuiRpcProvider {
    async fn get_owned_objects(&self, owner: &str) -> Result<Vec<RawObject>, LookupError> {
        let query = json!({
            "options": {"showType": true, "showContent": true, "showOwner": true}
        });

        let mut objects = Vec::new();
        let mut cursor = Value::Null;
        for _ in 0..self.max_owned_pages {
            let page: Page<ObjectEnvelope> = self
                .call("suix_getOwnedObjects", json!([owner, query, cursor, Value::Null]))
                .await?;

            objects.extend(page.data.into_iter().filter_map(|entry| entry.data));

            match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_null() => cursor = next,
                _ => return Ok(objects),
            }
        }

        tracing::warn!(
            owner,
            pages = self.max_owned_pages,
            "Owned-object listing truncated at page limit"
        );
        Ok(objects)
    }

    async fn get_object(&self, id: &str) -> Result<Option<RawObject>, LookupError> {
        let options = json!({"showType": true, "showContent": true, "showOwner": true});
        let envelope: ObjectEnvelope = self.call("sui_getObject", json!([id, options])).await?;
        Ok(envelope.data)
    }

    async fn query_events(
        &self,
        filter: &EventFilter,
        limit: usize,
        order: Order,
    ) -> Result<Vec<RawEvent>, LookupError> {
        let page: Page<RawEvent> = self
            .call(
                "suix_queryEvents",
                json!([filter, Value::Null, limit, order.is_descending()]),
            )
            .await?;
        Ok(page.data)
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
        limit: usize,
        order: Order,
        include_events: bool,
    ) -> Result<Vec<RawTransaction>, LookupError> {
        let query = json!({
            "filter": filter,
            "options": {"showEvents": include_events},
        });
        let page: Page<RawTransaction> = self
            .call(
                "suix_queryTransactionBlocks",
                json!([query, Value::Null, limit, order.is_descending()]),
            )
            .await?;
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(SuiRpcProvider::new("not a url", Duration::from_secs(1), 1).is_err());
    }

    #[test]
    fn test_page_shape() {
        let page: Page<RawTransaction> = serde_json::from_value(json!({
            "data": [{"digest": "T1"}],
            "nextCursor": "T1",
            "hasNextPage": false
        }))
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert!(!page.has_next_page);
    }
}
