use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use shared_types::SourceRecord;
use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::config::ApiJobConfig;
use crate::error::SyncError;
use crate::source::{SourceBatch, SourceReader};

/// Body of a listing endpoint: either a bare array or an object holding
/// the array under `data` or `releases`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing {
    Bare(Vec<Value>),
    Wrapped {
        #[serde(default)]
        data: Option<Vec<Value>>,
        #[serde(default)]
        releases: Option<Vec<Value>>,
    },
}

impl Listing {
    fn into_entries(self) -> Vec<Value> {
        match self {
            Listing::Bare(entries) => entries,
            Listing::Wrapped { data, releases } => data.or(releases).unwrap_or_default(),
        }
    }
}

/// Decodes a listing body. Entries that do not match the record shape are
/// logged and counted, not fatal.
pub fn parse_listing<T: DeserializeOwned>(body: &str) -> Result<SourceBatch<T>, SyncError> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| SyncError::Source(format!("unexpected response body: {}", e)))?;

    let mut batch = SourceBatch::new(Vec::new());
    for (index, entry) in listing.into_entries().into_iter().enumerate() {
        match serde_json::from_value::<T>(entry) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                tracing::warn!("Skipping malformed entry #{}: {}", index, e);
                batch.malformed += 1;
            }
        }
    }
    Ok(batch)
}

/// Reads records of type `T` from a JSON listing endpoint with one GET.
pub struct ApiSource<T> {
    client: reqwest::Client,
    url: String,
    headers: BTreeMap<String, String>,
    _record: PhantomData<T>,
}

impl<T> ApiSource<T> {
    pub fn new(config: &ApiJobConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: config.url.clone(),
            headers: config.headers.clone(),
            _record: PhantomData,
        }
    }
}

impl<T> SourceReader for ApiSource<T>
where
    T: SourceRecord + DeserializeOwned,
{
    type Record = T;

    fn describe(&self) -> String {
        format!("GET {}", self.url)
    }

    async fn read(&self) -> Result<SourceBatch<T>, SyncError> {
        let mut request = self.client.get(&self.url);
        for (name, value) in &self.headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SyncError::Source(format!("GET {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("GET {} returned {}: {}", self.url, status, body);
            return Err(SyncError::Source(format!(
                "GET {} returned {}",
                self.url, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Source(format!("failed to read response body: {}", e)))?;

        let batch = parse_listing(&body)?;
        tracing::info!("Fetched {} entries from {}", batch.total(), self.url);
        Ok(batch)
    }
}
