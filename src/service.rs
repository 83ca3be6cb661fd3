// Address statistics lookup: adapter fetch + normalize, then summarize.

use std::time::Instant;

use crate::config::SourcesConfig;
use crate::error::{Error, Result};
use crate::metrics;
use crate::sources::{Source, Transport};
use crate::stats::{resolve_sending_addresses, summarize};
use crate::types::AddressStats;

/// Fetch, normalize and summarize `address` using `source`.
pub async fn get_address_statistics(
    transport: &dyn Transport,
    sources: &SourcesConfig,
    address: &str,
    source: Source,
) -> Result<AddressStats> {
    let started = Instant::now();
    let result = lookup(transport, sources, address, source).await;
    metrics::record_lookup_duration(source.as_str(), started.elapsed().as_secs_f64());

    match &result {
        Ok(stats) => {
            metrics::increment_lookups(source.as_str(), "ok");
            tracing::info!(
                address = %address,
                source = %source,
                utxos = stats.utxos.len(),
                total_txs = stats.total_txs,
                "Address statistics computed"
            );
        }
        Err(e) => {
            metrics::increment_lookups(source.as_str(), "error");
            metrics::increment_lookup_errors(e.kind());
            let stage = match e {
                Error::Source(source_error) => source_error.stage.as_str(),
                Error::Decode { .. } => "summarize",
                Error::UnsupportedSource(_) => "select_source",
            };
            tracing::warn!(
                address = %address,
                source = %source,
                stage = stage,
                error = %e,
                "Address statistics lookup failed"
            );
        }
    }

    result
}

/// Same as `get_address_statistics` but takes the source identifier as given
/// by the caller. Unknown identifiers fail before any retrieval.
pub async fn get_address_statistics_by_name(
    transport: &dyn Transport,
    sources: &SourcesConfig,
    address: &str,
    source_name: &str,
) -> Result<AddressStats> {
    let source: Source = source_name.parse().map_err(|e| {
        metrics::increment_lookup_errors("unsupported_source");
        tracing::warn!(address = %address, source = %source_name, "Unsupported source requested");
        Error::from(e)
    })?;
    get_address_statistics(transport, sources, address, source).await
}

async fn lookup(
    transport: &dyn Transport,
    sources: &SourcesConfig,
    address: &str,
    source: Source,
) -> Result<AddressStats> {
    let adapter = source.adapter(sources);
    let records = adapter.fetch_and_normalize(transport, address).await?;
    summarize(&records).map_err(|reason| {
        let tx_id = records
            .iter()
            .find(|record| resolve_sending_addresses(&record.spend_path).is_err())
            .map(|record| record.tx_id.clone())
            .unwrap_or_default();
        Error::Decode {
            explorer: source,
            address: address.to_string(),
            tx_id,
            reason,
        }
    })
}
