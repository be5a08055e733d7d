//! JSON-over-HTTP record store adapter for the deployable
//!
//! Wire shape: `POST {base}/query` and `POST {base}/aggregate` with the
//! request serialized as-is; the store answers within the deadline or the
//! call maps to `StoreError::Timeout`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;
use wayfinder_core::Record;

use crate::store::{
    AggregateOp, AggregateValue, Collection, Filter, OrderBy, RecordStore, StoreError,
};

#[derive(Debug, Serialize)]
struct QueryBody<'a> {
    collection: Collection,
    filters: &'a [Filter],
    order_by: &'a [OrderBy],
    limit: usize,
}

#[derive(Debug, Deserialize)]
struct QueryReply {
    records: Vec<Record>,
}

#[derive(Debug, Serialize)]
struct AggregateBody<'a> {
    collection: Collection,
    filters: &'a [Filter],
    op: &'a AggregateOp,
}

#[derive(Debug, Deserialize)]
struct AggregateReply {
    value: AggregateValue,
}

/// Record store reached over HTTP
pub struct HttpRecordStore {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRecordStore {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    async fn post<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
        deadline: Duration,
    ) -> Result<R, StoreError> {
        let response = self
            .client
            .post(self.endpoint(path))
            .timeout(deadline)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreError::Timeout
                } else {
                    StoreError::Other(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(StoreError::Other(format!("store returned {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Other(format!("unparseable store response: {e}")))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn query(
        &self,
        collection: Collection,
        filters: &[Filter],
        order_by: &[OrderBy],
        limit: usize,
        deadline: Duration,
    ) -> Result<Vec<Record>, StoreError> {
        let body = QueryBody {
            collection,
            filters,
            order_by,
            limit,
        };
        let reply: QueryReply = self.post("query", &body, deadline).await?;
        Ok(reply.records)
    }

    async fn aggregate(
        &self,
        collection: Collection,
        filters: &[Filter],
        op: &AggregateOp,
        deadline: Duration,
    ) -> Result<AggregateValue, StoreError> {
        let body = AggregateBody {
            collection,
            filters,
            op,
        };
        let reply: AggregateReply = self.post("aggregate", &body, deadline).await?;
        Ok(reply.value)
    }
}
