//! Address balance statistics over public blockchain explorers.
//!
//! Explorer responses are normalized into [`types::StandardUtxo`] records by a
//! per-source adapter, then summarized into [`types::AddressStats`].

pub mod address;
pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod script_utils;
pub mod service;
pub mod sources;
pub mod stats;
pub mod telemetry;
pub mod types;

pub use error::{DecodeError, Error, Result, SourceError, UnsupportedSourceError};
pub use service::{get_address_statistics, get_address_statistics_by_name};
pub use sources::Source;
pub use stats::summarize;
pub use types::{AddressStats, OutputClass, SpendPath, StandardUtxo, UtxoView};
