/// Address Statistics - Aggregation Engine
///
/// Resolves each StandardUtxo into a UtxoView (decoding signature scripts and
/// classifying output scripts where the source left them raw) and folds the
/// views into balance, spendability and distinct transaction count.

use std::collections::HashSet;

use bitcoin::Amount;

use crate::error::DecodeError;
use crate::script_utils::{address_from_signature_script, classify_output_script};
use crate::types::{is_spendable, AddressStats, OutputClass, SpendPath, StandardUtxo, UtxoView};

pub fn resolve_sending_addresses(spend_path: &SpendPath) -> Result<Vec<String>, DecodeError> {
    match spend_path {
        SpendPath::SignatureScripts(scripts) => scripts
            .iter()
            .map(|script| address_from_signature_script(script))
            .collect(),
        SpendPath::Addresses(addresses) => Ok(addresses.clone()),
    }
}

pub fn resolve_script_type(output_class: &OutputClass) -> String {
    match output_class {
        OutputClass::Script(script) => classify_output_script(script),
        OutputClass::Label(label) => label.clone(),
    }
}

pub fn derive_view(record: &StandardUtxo) -> Result<UtxoView, DecodeError> {
    Ok(UtxoView {
        amount: record.amount,
        tx_id: record.tx_id.clone(),
        confirmations: record.confirmations,
        spendable: is_spendable(record.confirmations),
        sending_addresses: resolve_sending_addresses(&record.spend_path)?,
        script_type: resolve_script_type(&record.output_class),
    })
}

/// Summarize one address. Any undecodable signature script fails the whole
/// call; no partial statistics are produced.
pub fn summarize(records: &[StandardUtxo]) -> Result<AddressStats, DecodeError> {
    let utxos = records
        .iter()
        .map(derive_view)
        .collect::<Result<Vec<_>, _>>()?;

    // Adapters reject listings whose total overflows, see ensure_summable
    let balance_sat = utxos
        .iter()
        .fold(0u64, |total, utxo| total.saturating_add(utxo.amount.as_sat()));
    let all_spendable = utxos.iter().all(|utxo| utxo.spendable);
    let total_txs = utxos
        .iter()
        .map(|utxo| utxo.tx_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    Ok(AddressStats {
        utxos,
        balance: Amount::from_sat(balance_sat),
        all_spendable,
        total_txs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIG: &str = "304402203a[ALL] 0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
    const P2PKH: &str = "OP_DUP OP_HASH160 751e76e8199196d454941c45d1b3a323f1433bd6 OP_EQUALVERIFY OP_CHECKSIG";

    fn raw_utxo(tx_id: &str, sat: u64, confirmations: u64) -> StandardUtxo {
        StandardUtxo {
            amount: Amount::from_sat(sat),
            tx_id: tx_id.to_string(),
            confirmations,
            spend_path: SpendPath::SignatureScripts(vec![SIG.to_string()]),
            output_class: OutputClass::Script(P2PKH.to_string()),
        }
    }

    fn resolved_utxo(tx_id: &str, sat: u64, confirmations: u64) -> StandardUtxo {
        StandardUtxo {
            amount: Amount::from_sat(sat),
            tx_id: tx_id.to_string(),
            confirmations,
            spend_path: SpendPath::Addresses(vec!["1addr".to_string(), "1other".to_string()]),
            output_class: OutputClass::Label("Pay to Script Hash".to_string()),
        }
    }

    #[test]
    fn test_empty_input() {
        let stats = summarize(&[]).unwrap();
        assert!(stats.utxos.is_empty());
        assert_eq!(stats.balance, Amount::from_sat(0));
        assert!(stats.all_spendable);
        assert_eq!(stats.total_txs, 0);
    }

    #[test]
    fn test_raw_variants_are_resolved() {
        let stats = summarize(&[raw_utxo("aa", 1_000, 10)]).unwrap();
        let view = &stats.utxos[0];
        assert_eq!(view.sending_addresses, vec!["1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH"]);
        assert_eq!(view.script_type, "Pay to Public Key Hash");
        assert!(view.spendable);
    }

    #[test]
    fn test_resolved_variants_pass_through() {
        let stats = summarize(&[resolved_utxo("aa", 1_000, 2)]).unwrap();
        let view = &stats.utxos[0];
        assert_eq!(view.sending_addresses, vec!["1addr", "1other"]);
        assert_eq!(view.script_type, "Pay to Script Hash");
        assert!(!view.spendable);
    }

    #[test]
    fn test_unmatched_script_is_unknown() {
        let mut utxo = raw_utxo("aa", 1, 100);
        utxo.output_class = OutputClass::Script("OP_TRUE".to_string());
        let stats = summarize(&[utxo]).unwrap();
        assert_eq!(stats.utxos[0].script_type, "unknown");
    }

    #[test]
    fn test_all_spendable_requires_every_utxo() {
        let stats = summarize(&[raw_utxo("aa", 1, 7), raw_utxo("bb", 1, 100)]).unwrap();
        assert!(stats.all_spendable);

        let stats = summarize(&[raw_utxo("aa", 1, 7), raw_utxo("bb", 1, 6)]).unwrap();
        assert!(!stats.all_spendable);
    }

    #[test]
    fn test_total_txs_counts_distinct_ids() {
        let records = vec![
            raw_utxo("aa", 1, 10),
            raw_utxo("aa", 2, 10),
            raw_utxo("bb", 3, 10),
            resolved_utxo("aa", 4, 10),
        ];
        let stats = summarize(&records).unwrap();
        assert_eq!(stats.utxos.len(), 4);
        assert_eq!(stats.total_txs, 2);
    }

    #[test]
    fn test_balance_is_order_independent_sum() {
        let mut records = vec![
            raw_utxo("aa", 10_000, 10),
            resolved_utxo("bb", 1, 10),
            raw_utxo("cc", 123_456_789, 0),
        ];
        let forward = summarize(&records).unwrap();
        records.reverse();
        let backward = summarize(&records).unwrap();

        assert_eq!(forward.balance, Amount::from_sat(123_466_790));
        assert_eq!(forward.balance, backward.balance);
        assert_eq!(forward.utxos[0].tx_id, "aa");
        assert_eq!(backward.utxos[0].tx_id, "cc");
    }

    #[test]
    fn test_malformed_signature_script_fails_whole_call() {
        let mut bad = raw_utxo("bb", 1, 10);
        bad.spend_path = SpendPath::SignatureScripts(vec!["3044022011".to_string()]);

        let result = summarize(&[raw_utxo("aa", 1, 10), bad]);
        assert!(matches!(result, Err(DecodeError::MissingPublicKey { tokens: 1 })));
    }
}
