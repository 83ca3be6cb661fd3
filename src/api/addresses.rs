// Address Statistics Endpoints
//
// Not cached: every request fetches fresh explorer data.

use std::sync::Arc;

use axum::{extract::Path as AxumPath, Extension, Json};

use super::helpers::{internal_error, lookup_error, ApiResult};
use super::AppState;
use crate::error::UnsupportedSourceError;
use crate::service::get_address_statistics_by_name;
use crate::sources::Source;
use crate::types::AddressStats;

/// GET /{address}
/// Statistics from the configured default source.
pub async fn address_default(
    AxumPath(address): AxumPath<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<AddressStats> {
    // load_config validates this; a bad value here is a server fault
    let source: Source = state
        .config
        .sources
        .default
        .parse()
        .map_err(|e: UnsupportedSourceError| internal_error(format!("misconfigured default source: {}", e)))?;
    compute(&state, &address, source.as_str()).await
}

/// GET /{address}/{currency}
/// Statistics from the named source (`bch`, `btc`).
pub async fn address_with_currency(
    AxumPath((address, currency)): AxumPath<(String, String)>,
    Extension(state): Extension<Arc<AppState>>,
) -> ApiResult<AddressStats> {
    compute(&state, &address, &currency).await
}

async fn compute(state: &AppState, address: &str, source: &str) -> ApiResult<AddressStats> {
    get_address_statistics_by_name(state.transport.as_ref(), &state.config.sources, address, source)
        .await
        .map(Json)
        .map_err(|e| lookup_error(&e))
}
