// Bitcoin Cash adapter (rest.bitcoin.com v2 response shape)
//
// This API exposes raw scriptSig / scriptPubKey ASM but no resolved input
// addresses, so records carry the raw variants and are decoded downstream.

use std::collections::HashMap;

use async_trait::async_trait;
use bitcoin::Amount;
use serde::Deserialize;

use super::{dedup_preserving_order, ensure_summable, fetch_json, Source, SourceAdapter, Transport};
use crate::config::EndpointConfig;
use crate::error::{FetchStage, SourceError, SourceFailure};
use crate::types::{OutputClass, SpendPath, StandardUtxo};

#[derive(Deserialize, Debug)]
struct UtxoListing {
    utxos: Vec<ListedUtxo>,
}

#[derive(Deserialize, Debug)]
struct ListedUtxo {
    txid: String,
    vout: u32,
    /// Whole BCH
    amount: f64,
    confirmations: u64,
}

#[derive(Deserialize, Debug)]
struct TxListing {
    txs: Vec<Tx>,
}

#[derive(Deserialize, Debug)]
struct Tx {
    txid: String,
    vin: Vec<TxIn>,
    vout: Vec<TxOut>,
}

#[derive(Deserialize, Debug)]
struct TxIn {
    #[serde(rename = "scriptSig")]
    script_sig: Option<ScriptAsm>,
    coinbase: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TxOut {
    #[serde(rename = "scriptPubKey")]
    script_pub_key: ScriptAsm,
}

#[derive(Deserialize, Debug)]
struct ScriptAsm {
    asm: String,
}

#[derive(Debug, Clone)]
pub struct BchAdapter {
    endpoints: EndpointConfig,
}

impl BchAdapter {
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self { endpoints }
    }

    fn utxo_url(&self, address: &str) -> String {
        format!("{}{}", self.endpoints.utxo_url, address)
    }

    fn tx_url(&self, address: &str) -> String {
        format!("{}{}", self.endpoints.tx_url, address)
    }
}

#[async_trait]
impl SourceAdapter for BchAdapter {
    fn source(&self) -> Source {
        Source::Bch
    }

    async fn fetch_and_normalize(
        &self,
        transport: &dyn Transport,
        address: &str,
    ) -> Result<Vec<StandardUtxo>, SourceError> {
        let utxo_url = self.utxo_url(address);
        let tx_url = self.tx_url(address);

        let (listing, detail) = tokio::try_join!(
            fetch_json::<UtxoListing>(transport, Source::Bch, address, FetchStage::UtxoListing, &utxo_url),
            fetch_json::<TxListing>(transport, Source::Bch, address, FetchStage::TransactionDetail, &tx_url),
        )?;

        tracing::debug!(
            address = %address,
            utxos = listing.utxos.len(),
            txs = detail.txs.len(),
            "Fetched BCH explorer data"
        );

        let records = normalize(address, listing, detail)?;
        ensure_summable(Source::Bch, address, &records)?;
        Ok(records)
    }
}

fn normalize(address: &str, listing: UtxoListing, detail: TxListing) -> Result<Vec<StandardUtxo>, SourceError> {
    let join_error = |reason: SourceFailure| SourceError::new(Source::Bch, address, FetchStage::Join, reason);

    let mut txs: HashMap<&str, &Tx> = HashMap::with_capacity(detail.txs.len());
    for tx in &detail.txs {
        txs.entry(tx.txid.as_str()).or_insert(tx);
    }

    listing
        .utxos
        .iter()
        .map(|utxo| {
            let tx = txs
                .get(utxo.txid.as_str())
                .ok_or_else(|| join_error(SourceFailure::MissingTransaction(utxo.txid.clone())))?;

            let output = tx.vout.get(utxo.vout as usize).ok_or_else(|| {
                join_error(SourceFailure::MissingOutput {
                    tx_id: utxo.txid.clone(),
                    vout: utxo.vout,
                })
            })?;

            let amount = Amount::from_btc(utxo.amount).map_err(|e| {
                join_error(SourceFailure::InvalidAmount {
                    tx_id: utxo.txid.clone(),
                    reason: e.to_string(),
                })
            })?;

            Ok(StandardUtxo {
                amount,
                tx_id: utxo.txid.clone(),
                confirmations: utxo.confirmations,
                spend_path: SpendPath::SignatureScripts(sending_scripts(tx).map_err(join_error)?),
                output_class: OutputClass::Script(output.script_pub_key.asm.clone()),
            })
        })
        .collect()
}

/// Distinct scriptSig ASM strings of a transaction's inputs. Coinbase inputs
/// have no payer and are skipped.
fn sending_scripts(tx: &Tx) -> Result<Vec<String>, SourceFailure> {
    let mut scripts = Vec::with_capacity(tx.vin.len());
    for (index, input) in tx.vin.iter().enumerate() {
        match (&input.script_sig, &input.coinbase) {
            (Some(script_sig), _) => scripts.push(script_sig.asm.clone()),
            (None, Some(_)) => continue,
            (None, None) => {
                return Err(SourceFailure::MissingScriptSig {
                    tx_id: tx.txid.clone(),
                    input: index,
                })
            }
        }
    }
    Ok(dedup_preserving_order(scripts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::fixtures::FixtureTransport;
    use crate::stats::summarize;
    use serde_json::json;

    const ADDRESS: &str = "bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";
    const UTXO_URL: &str = "https://bch.test/utxo/bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";
    const TX_URL: &str = "https://bch.test/tx/bitcoincash:qpm2qsznhks23z7629mms6s4cwef74vcwvy22gdx6a";

    const SIG_A: &str = "30440220aa[ALL|FORKID] 0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const SIG_B: &str = "30440220bb[ALL|FORKID] 0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798483ada7726a3c4655da4fbfc0e1108a8fd17b448a68554199c47d08ffb10d4b8";
    const P2PKH: &str = "OP_DUP OP_HASH160 751e76e8199196d454941c45d1b3a323f1433bd6 OP_EQUALVERIFY OP_CHECKSIG";

    fn adapter() -> BchAdapter {
        BchAdapter::new(EndpointConfig {
            utxo_url: "https://bch.test/utxo/".to_string(),
            tx_url: "https://bch.test/tx/".to_string(),
        })
    }

    fn utxo_listing() -> serde_json::Value {
        json!({
            "utxos": [
                { "txid": "tx1", "vout": 1, "amount": 0.0001, "satoshis": 10000, "height": 600000, "confirmations": 12 },
                { "txid": "tx2", "vout": 0, "amount": 1.5, "satoshis": 150000000, "height": 600100, "confirmations": 2 },
                { "txid": "tx1", "vout": 0, "amount": 0.00000546, "satoshis": 546, "height": 600000, "confirmations": 12 }
            ],
            "legacyAddress": "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH",
            "cashAddress": ADDRESS
        })
    }

    fn tx_listing() -> serde_json::Value {
        json!({
            "pagesTotal": 1,
            "txs": [
                {
                    "txid": "tx1",
                    "vin": [
                        { "txid": "prev1", "vout": 0, "scriptSig": { "hex": "", "asm": SIG_A } },
                        { "txid": "prev2", "vout": 3, "scriptSig": { "hex": "", "asm": SIG_B } },
                        { "txid": "prev3", "vout": 1, "scriptSig": { "hex": "", "asm": SIG_A } }
                    ],
                    "vout": [
                        { "value": "0.00000546", "n": 0, "scriptPubKey": { "asm": "OP_RETURN 68656c6c6f" } },
                        { "value": "0.00010000", "n": 1, "scriptPubKey": { "asm": P2PKH } }
                    ]
                },
                {
                    "txid": "tx2",
                    "vin": [
                        { "coinbase": "03a0270a", "sequence": 4294967295u64 }
                    ],
                    "vout": [
                        { "value": "1.50000000", "n": 0, "scriptPubKey": { "asm": P2PKH } }
                    ]
                }
            ]
        })
    }

    fn transport() -> FixtureTransport {
        FixtureTransport::new()
            .with_json(UTXO_URL, utxo_listing())
            .with_json(TX_URL, tx_listing())
    }

    #[tokio::test]
    async fn test_normalize_raw_variants() {
        let transport = transport();
        let records = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tx_id, "tx1");
        assert_eq!(records[0].amount, Amount::from_sat(10_000));
        assert_eq!(records[0].confirmations, 12);
        // Duplicate scriptSigs collapse, first-seen order kept
        assert_eq!(
            records[0].spend_path,
            SpendPath::SignatureScripts(vec![SIG_A.to_string(), SIG_B.to_string()])
        );
        assert_eq!(records[0].output_class, OutputClass::Script(P2PKH.to_string()));
        assert_eq!(records[2].output_class, OutputClass::Script("OP_RETURN 68656c6c6f".to_string()));

        // Coinbase inputs contribute no scripts
        assert_eq!(records[1].spend_path, SpendPath::SignatureScripts(vec![]));

        let mut requested = transport.requested();
        requested.sort();
        assert_eq!(requested, vec![TX_URL.to_string(), UTXO_URL.to_string()]);
    }

    #[tokio::test]
    async fn test_round_trip_through_summarize() {
        let records = adapter().fetch_and_normalize(&transport(), ADDRESS).await.unwrap();
        let stats = summarize(&records).unwrap();

        assert_eq!(stats.utxos.len(), 3);
        assert_eq!(stats.balance, Amount::from_sat(10_000 + 150_000_000 + 546));
        assert_eq!(stats.total_txs, 2);
        assert!(!stats.all_spendable);
        assert_eq!(
            stats.utxos[0].sending_addresses,
            vec!["1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH", "1EHNa6Q4Jz2uvNExL497mE43ikXhwF6kZm"]
        );
        assert_eq!(stats.utxos[0].script_type, "Pay to Public Key Hash");
        assert_eq!(stats.utxos[2].script_type, "Null Data");
    }

    #[tokio::test]
    async fn test_missing_transaction_fails() {
        let mut listing = utxo_listing();
        listing["utxos"][1]["txid"] = json!("tx-not-in-detail");
        let transport = FixtureTransport::new()
            .with_json(UTXO_URL, listing)
            .with_json(TX_URL, tx_listing());

        let err = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap_err();
        assert_eq!(err.stage, FetchStage::Join);
        assert_eq!(err.explorer, Source::Bch);
        assert_eq!(err.address, ADDRESS);
        assert!(matches!(err.reason, SourceFailure::MissingTransaction(ref id) if id == "tx-not-in-detail"));
    }

    #[tokio::test]
    async fn test_out_of_range_vout_fails() {
        let mut listing = utxo_listing();
        listing["utxos"][0]["vout"] = json!(7);
        let transport = FixtureTransport::new()
            .with_json(UTXO_URL, listing)
            .with_json(TX_URL, tx_listing());

        let err = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap_err();
        assert!(matches!(err.reason, SourceFailure::MissingOutput { vout: 7, .. }));
    }

    #[tokio::test]
    async fn test_input_without_script_sig_fails() {
        let mut detail = tx_listing();
        detail["txs"][0]["vin"][1] = json!({ "txid": "prev2", "vout": 3 });
        let transport = FixtureTransport::new()
            .with_json(UTXO_URL, utxo_listing())
            .with_json(TX_URL, detail);

        let err = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap_err();
        assert!(matches!(err.reason, SourceFailure::MissingScriptSig { input: 1, .. }));
    }

    #[tokio::test]
    async fn test_negative_amount_fails() {
        let mut listing = utxo_listing();
        listing["utxos"][0]["amount"] = json!(-0.5);
        let transport = FixtureTransport::new()
            .with_json(UTXO_URL, listing)
            .with_json(TX_URL, tx_listing());

        let err = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap_err();
        assert!(matches!(err.reason, SourceFailure::InvalidAmount { .. }));
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let transport = FixtureTransport::new()
            .with_json(UTXO_URL, utxo_listing())
            .with_status(TX_URL, 429, "rate limited");

        let err = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap_err();
        assert_eq!(err.stage, FetchStage::TransactionDetail);
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_malformed_payload_fails() {
        let transport = FixtureTransport::new()
            .with_body(UTXO_URL, "<html>maintenance</html>")
            .with_json(TX_URL, tx_listing());

        let err = adapter().fetch_and_normalize(&transport, ADDRESS).await.unwrap_err();
        assert_eq!(err.stage, FetchStage::UtxoListing);
        assert!(matches!(err.reason, SourceFailure::Payload(_)));
    }
}
