// Source Adapters
//
// One adapter per supported explorer. Each performs two retrievals (utxo
// listing, transaction detail) concurrently through a Transport, joins them by
// transaction id and emits StandardUtxo records. Any failure fails the call.

pub mod bch;
pub mod btc;
pub mod http;

#[cfg(test)]
pub mod fixtures;

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use bitcoin::Amount;
use serde::de::DeserializeOwned;

use crate::config::SourcesConfig;
use crate::error::{FetchStage, SourceError, SourceFailure, TransportError, UnsupportedSourceError};
use crate::metrics;
use crate::types::StandardUtxo;

pub use bch::BchAdapter;
pub use btc::BtcAdapter;
pub use http::HttpTransport;

/// Supported explorer sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Bitcoin Cash via a rest.bitcoin.com style API
    Bch,
    /// Bitcoin via a BlockCypher style API
    Btc,
}

impl Source {
    pub const ALL: [Source; 2] = [Source::Bch, Source::Btc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Bch => "bch",
            Source::Btc => "btc",
        }
    }

    /// Build the adapter for this source from configured endpoints.
    pub fn adapter(&self, config: &SourcesConfig) -> Box<dyn SourceAdapter> {
        match self {
            Source::Bch => Box::new(BchAdapter::new(config.bch.clone())),
            Source::Btc => Box::new(BtcAdapter::new(config.btc.clone())),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = UnsupportedSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bch" | "bitcoincash" => Ok(Source::Bch),
            "btc" | "bitcoin" => Ok(Source::Btc),
            _ => Err(UnsupportedSourceError(s.to_string())),
        }
    }
}

/// Outbound retrieval. Implementations must send a client identifier header
/// and report non-2xx responses as `TransportError::Status` with the body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<String, TransportError>;
}

#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> Source;

    async fn fetch_and_normalize(
        &self,
        transport: &dyn Transport,
        address: &str,
    ) -> Result<Vec<StandardUtxo>, SourceError>;
}

/// GET `url` and decode the body as `T`, attributing any failure to `stage`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    source: Source,
    address: &str,
    stage: FetchStage,
    url: &str,
) -> Result<T, SourceError> {
    let started = Instant::now();
    let body = transport.get(url).await;
    metrics::record_fetch_duration(source.as_str(), stage.as_str(), started.elapsed().as_secs_f64());

    let body = body.map_err(|e| SourceError::new(source, address, stage, e))?;
    serde_json::from_str(&body).map_err(|e| SourceError::new(source, address, stage, e))
}

/// Fail the join when the records' amounts cannot be summed into one balance.
pub(crate) fn ensure_summable(
    source: Source,
    address: &str,
    records: &[StandardUtxo],
) -> Result<(), SourceError> {
    let mut total = Amount::from_sat(0);
    for record in records {
        total = total.checked_add(record.amount).ok_or_else(|| {
            SourceError::new(
                source,
                address,
                FetchStage::Join,
                SourceFailure::InvalidAmount {
                    tx_id: record.tx_id.clone(),
                    reason: "balance overflows".to_string(),
                },
            )
        })?;
    }
    Ok(())
}

/// Keep the first occurrence of each item, preserving order.
pub(crate) fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
