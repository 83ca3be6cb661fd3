// UTXO Type Definitions
//
// StandardUtxo is what every source adapter emits. UtxoView and AddressStats
// are what the aggregation engine produces and what the HTTP layer serializes.

use bitcoin::Amount;
use serde::{Serialize, Serializer};

/// Outputs with more confirmations than this are considered spendable.
pub const SPENDABLE_CONFIRMATIONS: u64 = 6;

/// Who funded an output, in whichever form the source can provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpendPath {
    /// Textual signature scripts of the funding inputs, decoded later
    SignatureScripts(Vec<String>),
    /// Addresses already resolved by the source
    Addresses(Vec<String>),
}

/// What kind of output this is, in whichever form the source can provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputClass {
    /// Textual output script, classified later
    Script(String),
    /// Template label already resolved by the source
    Label(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardUtxo {
    pub amount: Amount,
    pub tx_id: String,
    pub confirmations: u64,
    pub spend_path: SpendPath,
    pub output_class: OutputClass,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UtxoView {
    #[serde(serialize_with = "serialize_whole_units")]
    pub amount: Amount,
    pub tx_id: String,
    #[serde(skip)]
    pub confirmations: u64,
    pub spendable: bool,
    #[serde(rename = "sending_addrs")]
    pub sending_addresses: Vec<String>,
    pub script_type: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AddressStats {
    pub utxos: Vec<UtxoView>,
    #[serde(serialize_with = "serialize_whole_units")]
    pub balance: Amount,
    pub all_spendable: bool,
    pub total_txs: usize,
}

pub fn is_spendable(confirmations: u64) -> bool {
    confirmations > SPENDABLE_CONFIRMATIONS
}

/// Amounts leave the crate as JSON numbers in whole coins (BCH, BTC), not satoshis.
fn serialize_whole_units<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(amount.as_btc())
}
