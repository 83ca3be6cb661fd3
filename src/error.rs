// Error Types
//
// Every failure aborts the whole lookup. Nothing here is retried by the crate.

use std::fmt;
use thiserror::Error;

use crate::sources::Source;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A signature script returned by the explorer could not be decoded
    /// while summarizing. `tx_id` is empty if the record cannot be located.
    #[error("{explorer} lookup for {address} failed during summarize of transaction {tx_id}: {reason}")]
    Decode {
        explorer: Source,
        address: String,
        tx_id: String,
        #[source]
        reason: DecodeError,
    },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    UnsupportedSource(#[from] UnsupportedSourceError),
}

impl Error {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Decode { .. } => "decode",
            Error::Source(_) => "source",
            Error::UnsupportedSource(_) => "unsupported_source",
        }
    }
}

/// Malformed signature script handed to address derivation.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("signature script has {tokens} token(s), expected a public key in the second")]
    MissingPublicKey { tokens: usize },

    #[error("public key is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

#[derive(Error, Debug)]
#[error("unsupported source '{0}'")]
pub struct UnsupportedSourceError(pub String);

/// Which part of an adapter call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    UtxoListing,
    TransactionDetail,
    Join,
}

impl FetchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchStage::UtxoListing => "utxo_listing",
            FetchStage::TransactionDetail => "transaction_detail",
            FetchStage::Join => "join",
        }
    }
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::UtxoListing => write!(f, "utxo listing"),
            FetchStage::TransactionDetail => write!(f, "transaction detail"),
            FetchStage::Join => write!(f, "join"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum SourceFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("transaction {0} referenced by a utxo is missing from the transaction detail")]
    MissingTransaction(String),

    #[error("transaction {tx_id} has no output {vout}")]
    MissingOutput { tx_id: String, vout: u32 },

    #[error("input {input} of transaction {tx_id} has no signature script")]
    MissingScriptSig { tx_id: String, input: usize },

    #[error("invalid amount for {tx_id}: {reason}")]
    InvalidAmount { tx_id: String, reason: String },
}

#[derive(Error, Debug)]
#[error("{explorer} lookup for {address} failed during {stage}: {reason}")]
pub struct SourceError {
    pub explorer: Source,
    pub address: String,
    pub stage: FetchStage,
    #[source]
    pub reason: SourceFailure,
}

impl SourceError {
    pub fn new(
        explorer: Source,
        address: impl Into<String>,
        stage: FetchStage,
        reason: impl Into<SourceFailure>,
    ) -> Self {
        SourceError {
            explorer,
            address: address.into(),
            stage,
            reason: reason.into(),
        }
    }
}
