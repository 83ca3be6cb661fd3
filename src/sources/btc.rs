// Bitcoin adapter (BlockCypher v1 response shape)
//
// BlockCypher reports values in satoshis, lists mempool outputs separately
// under `unconfirmed_txrefs`, and already resolves input addresses and output
// script types. Records therefore carry the pre-resolved variants.

use std::collections::HashMap;

use async_trait::async_trait;
use bitcoin::Amount;
use serde::Deserialize;

use super::{dedup_preserving_order, ensure_summable, fetch_json, Source, SourceAdapter, Transport};
use crate::config::EndpointConfig;
use crate::error::{FetchStage, SourceError, SourceFailure};
use crate::script_utils::UNKNOWN_SCRIPT_TYPE;
use crate::types::{OutputClass, SpendPath, StandardUtxo};

const UTXO_QUERY: &str = "?unspentOnly=true&includeScript=true";
/// `/full` pages 10 transactions with 20 inputs and outputs each unless told
/// otherwise. 50 is the largest page the explorer serves.
const FULL_SUFFIX: &str = "/full?limit=50&txlimit=10000";

#[derive(Deserialize, Debug)]
struct AddressRefs {
    #[serde(default)]
    txrefs: Vec<TxRef>,
    #[serde(default)]
    unconfirmed_txrefs: Vec<TxRef>,
}

#[derive(Deserialize, Debug)]
struct TxRef {
    tx_hash: String,
    tx_output_n: u32,
    /// Satoshis
    value: u64,
    #[serde(default)]
    confirmations: u64,
}

#[derive(Deserialize, Debug)]
struct FullAddress {
    txs: Vec<FullTx>,
}

#[derive(Deserialize, Debug)]
struct FullTx {
    hash: String,
    #[serde(default)]
    inputs: Vec<FullInput>,
    #[serde(default)]
    outputs: Vec<FullOutput>,
}

#[derive(Deserialize, Debug)]
struct FullInput {
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct FullOutput {
    script_type: Option<String>,
}

/// BlockCypher script type names mapped onto the classifier's template names.
fn canonical_script_type(label: &str) -> &str {
    match label {
        "pay-to-pubkey-hash" => "Pay to Public Key Hash",
        "pay-to-script-hash" => "Pay to Script Hash",
        "pay-to-pubkey" => "Pay to Public Key",
        "null-data" => "Null Data",
        "pay-to-witness-pubkey-hash" => "Pay to Witness Public Key Hash",
        "pay-to-witness-script-hash" => "Pay to Witness Script Hash",
        other => other,
    }
}

#[derive(Debug, Clone)]
pub struct BtcAdapter {
    endpoints: EndpointConfig,
}

impl BtcAdapter {
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self { endpoints }
    }

    fn utxo_url(&self, address: &str) -> String {
        format!("{}{}{}", self.endpoints.utxo_url, address, UTXO_QUERY)
    }

    fn tx_url(&self, address: &str) -> String {
        format!("{}{}{}", self.endpoints.tx_url, address, FULL_SUFFIX)
    }
}

#[async_trait]
impl SourceAdapter for BtcAdapter {
    fn source(&self) -> Source {
        Source::Btc
    }

    async fn fetch_and_normalize(
        &self,
        transport: &dyn Transport,
        address: &str,
    ) -> Result<Vec<StandardUtxo>, SourceError> {
        let utxo_url = self.utxo_url(address);
        let tx_url = self.tx_url(address);

        let (refs, full) = tokio::try_join!(
            fetch_json::<AddressRefs>(transport, Source::Btc, address, FetchStage::UtxoListing, &utxo_url),
            fetch_json::<FullAddress>(transport, Source::Btc, address, FetchStage::TransactionDetail, &tx_url),
        )?;

        tracing::debug!(
            address = %address,
            confirmed = refs.txrefs.len(),
            unconfirmed = refs.unconfirmed_txrefs.len(),
            txs = full.txs.len(),
            "Fetched BTC explorer data"
        );

        let records = normalize(address, refs, full)?;
        ensure_summable(Source::Btc, address, &records)?;
        Ok(records)
    }
}

fn normalize(address: &str, refs: AddressRefs, full: FullAddress) -> Result<Vec<StandardUtxo>, SourceError> {
    let join_error = |reason: SourceFailure| SourceError::new(Source::Btc, address, FetchStage::Join, reason);

    let mut txs: HashMap<&str, &FullTx> = HashMap::with_capacity(full.txs.len());
    for tx in &full.txs {
        txs.entry(tx.hash.as_str()).or_insert(tx);
    }

    refs.txrefs
        .iter()
        .chain(refs.unconfirmed_txrefs.iter())
        .map(|txref| {
            let tx = txs
                .get(txref.tx_hash.as_str())
                .ok_or_else(|| join_error(SourceFailure::MissingTransaction(txref.tx_hash.clone())))?;

            let output = tx.outputs.get(txref.tx_output_n as usize).ok_or_else(|| {
                join_error(SourceFailure::MissingOutput {
                    tx_id: txref.tx_hash.clone(),
                    vout: txref.tx_output_n,
                })
            })?;

            let senders = dedup_preserving_order(
                tx.inputs
                    .iter()
                    .flat_map(|input| input.addresses.iter().cloned()),
            );

            let label = output
                .script_type
                .as_deref()
                .map_or(UNKNOWN_SCRIPT_TYPE, canonical_script_type);

            Ok(StandardUtxo {
                amount: Amount::from_sat(txref.value),
                tx_id: txref.tx_hash.clone(),
                confirmations: txref.confirmations,
                spend_path: SpendPath::Addresses(senders),
                output_class: OutputClass::Label(label.to_string()),
            })
        })
        .collect()
}
