use async_trait::async_trait;
use serde_json::{json, Value};
use stampforge_common::config::GatewaySettings;
use stampforge_common::error::TxBuildError;
use stampforge_common::gateway::{
    DataSourceGateway, ProviderEndpoint, ProviderKind, ProviderTransport,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

const WPKH_SCRIPT: &str = "0014751e76e8199196d454941c45d1b3a323f1433bd6";
const WPKH_ADDRESS: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

fn settings(providers: Vec<ProviderEndpoint>) -> GatewaySettings {
    GatewaySettings {
        providers,
        max_retries: 3,
        retry_delay_ms: 0,
        request_timeout_secs: 8,
    }
}

fn single(kind: ProviderKind) -> Vec<ProviderEndpoint> {
    vec![ProviderEndpoint::new(kind)]
}

/// Always fails; counts how often the gateway knocks.
struct FailingTransport {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl ProviderTransport for FailingTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TxBuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TxBuildError::Provider(format!("unreachable: {}", url)))
    }
}

/// Fails for every provider except blockstream.
struct SecondProviderTransport {
    calls: Arc<AtomicU32>,
    body: Value,
}

#[async_trait]
impl ProviderTransport for SecondProviderTransport {
    async fn get_json(&self, url: &str) -> Result<Value, TxBuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("blockstream.info") {
            Ok(self.body.clone())
        } else {
            Err(TxBuildError::Provider("primary is down".to_string()))
        }
    }
}

/// Answers every request with the same canned body.
struct CannedTransport {
    body: Value,
}

#[async_trait]
impl ProviderTransport for CannedTransport {
    async fn get_json(&self, _url: &str) -> Result<Value, TxBuildError> {
        Ok(self.body.clone())
    }
}

#[tokio::test]
async fn test_exhausting_the_chain_counts_every_attempt() {
    let calls = Arc::new(AtomicU32::new(0));
    let transport = FailingTransport {
        calls: Arc::clone(&calls),
    };
    let gateway =
        DataSourceGateway::with_transport(settings(ProviderEndpoint::default_chain()), transport);

    let err = gateway.get_utxos(WPKH_ADDRESS).await.unwrap_err();

    // 4 providers x 3 passes over the chain
    match err {
        TxBuildError::AllProvidersFailed { attempts } => assert_eq!(attempts, 12),
        other => panic!("expected AllProvidersFailed, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 12);
}

#[tokio::test]
async fn test_first_success_short_circuits_the_chain() {
    let calls = Arc::new(AtomicU32::new(0));
    let transport = SecondProviderTransport {
        calls: Arc::clone(&calls),
        body: json!([
            { "txid": "aa".repeat(32), "vout": 0, "value": 10_000,
              "status": { "confirmed": true } }
        ]),
    };
    let gateway =
        DataSourceGateway::with_transport(settings(ProviderEndpoint::default_chain()), transport);

    let utxos = gateway.get_utxos(WPKH_ADDRESS).await.unwrap();

    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].value, 10_000);
    assert_eq!(
        calls.load(Ordering::SeqCst),
        2,
        "mempool.space then blockstream"
    );
}

#[tokio::test]
async fn test_esplora_rows_rebuild_the_script_from_the_address() {
    let transport = CannedTransport {
        body: json!([
            { "txid": "ab".repeat(32), "vout": 1, "value": 50_000,
              "status": { "confirmed": true } }
        ]),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::MempoolSpace)),
        transport,
    );

    let utxos = gateway.get_utxos(WPKH_ADDRESS).await.unwrap();

    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].script, WPKH_SCRIPT);
    assert_eq!(utxos[0].size, 68);
    assert!(utxos[0].confirmed);
}

#[tokio::test]
async fn test_blockchain_info_txids_come_out_in_display_order() {
    let wire = format!("{}ab", "00".repeat(31));
    let display = format!("ab{}", "00".repeat(31));
    let transport = CannedTransport {
        body: json!({
            "unspent_outputs": [
                { "tx_hash": wire, "tx_output_n": 2, "value_sat": 7_500,
                  "script": WPKH_SCRIPT, "confirmations": 6 }
            ]
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::BlockchainInfo)),
        transport,
    );

    let utxos = gateway.get_utxos(WPKH_ADDRESS).await.unwrap();

    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].txid, display);
    assert_eq!(utxos[0].vout, 2);
    assert_eq!(utxos[0].value, 7_500, "value_sat maps onto value");
    assert!(utxos[0].confirmed);
}

#[tokio::test]
async fn test_rows_with_bad_scripts_are_rebuilt_from_the_address() {
    let transport = CannedTransport {
        body: json!({
            "unspent_outputs": [
                { "tx_hash": "11".repeat(32), "tx_output_n": 0, "value": 1_000,
                  "script": WPKH_SCRIPT, "confirmations": 1 },
                { "tx_hash": "22".repeat(32), "tx_output_n": 0, "value": 2_000,
                  "script": "deadbeef", "confirmations": 1 }
            ]
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::BlockchainInfo)),
        transport,
    );

    let utxos = gateway.get_utxos(WPKH_ADDRESS).await.unwrap();

    // The bad script is replaced with the one the queried address
    // determines; the row survives.
    assert_eq!(utxos.len(), 2);
    assert_eq!(utxos[0].script, WPKH_SCRIPT);
    assert_eq!(utxos[1].script, WPKH_SCRIPT);
    assert_eq!(utxos[1].value, 2_000);
}

#[tokio::test]
async fn test_unrecoverable_rows_are_dropped_not_fatal() {
    // Bad checksum: the script cannot be rebuilt from this address, so
    // the "deadbeef" row has no recovery path and is dropped. The row
    // carrying a valid script never needs the address and survives.
    let bad_checksum = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t5";
    let transport = CannedTransport {
        body: json!({
            "unspent_outputs": [
                { "tx_hash": "11".repeat(32), "tx_output_n": 0, "value": 1_000,
                  "script": WPKH_SCRIPT, "confirmations": 1 },
                { "tx_hash": "22".repeat(32), "tx_output_n": 0, "value": 2_000,
                  "script": "deadbeef", "confirmations": 1 }
            ]
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::BlockchainInfo)),
        transport,
    );

    let utxos = gateway.get_utxos(bad_checksum).await.unwrap();

    assert_eq!(utxos.len(), 1);
    assert_eq!(utxos[0].value, 1_000);
}

#[tokio::test]
async fn test_empty_provider_result_counts_as_a_failure() {
    let transport = CannedTransport { body: json!([]) };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::MempoolSpace)),
        transport,
    );

    let err = gateway.get_utxos(WPKH_ADDRESS).await.unwrap_err();

    // One provider, three passes
    match err {
        TxBuildError::AllProvidersFailed { attempts } => assert_eq!(attempts, 3),
        other => panic!("expected AllProvidersFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_get_tx_output_carries_mempool_ancestry() {
    let transport = CannedTransport {
        body: json!({
            "vout": [
                { "scriptpubkey": WPKH_SCRIPT, "value": 42_000 }
            ],
            "status": { "confirmed": false },
            "ancestor_fees": 1_234,
            "ancestor_size": 400,
            "effective_fee_rate": 3.1
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::MempoolSpace)),
        transport,
    );

    let lookup = gateway
        .get_tx_output(&"cd".repeat(32), 0, true)
        .await
        .unwrap();

    assert_eq!(lookup.utxo.value, 42_000);
    assert_eq!(lookup.utxo.script, WPKH_SCRIPT);
    assert!(!lookup.utxo.confirmed);
    let ancestor = lookup.ancestor.unwrap();
    assert_eq!(ancestor.fees, 1_234);
    assert_eq!(ancestor.vsize, 400);
    assert!((ancestor.effective_rate - 3.1).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_get_tx_output_without_ancestors_skips_the_lookup() {
    let transport = CannedTransport {
        body: json!({
            "vout": [ { "scriptpubkey": WPKH_SCRIPT, "value": 42_000 } ],
            "status": { "confirmed": true }
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::MempoolSpace)),
        transport,
    );

    let lookup = gateway
        .get_tx_output(&"cd".repeat(32), 0, false)
        .await
        .unwrap();

    assert!(lookup.ancestor.is_none());
}

#[tokio::test]
async fn test_missing_vout_is_a_provider_error_for_that_endpoint() {
    let transport = CannedTransport {
        body: json!({
            "vout": [ { "scriptpubkey": WPKH_SCRIPT, "value": 42_000 } ],
            "status": { "confirmed": true }
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::MempoolSpace)),
        transport,
    );

    let err = gateway.get_tx_output(&"cd".repeat(32), 5, true).await.unwrap_err();
    assert!(matches!(err, TxBuildError::AllProvidersFailed { .. }));
}

#[tokio::test]
async fn test_blockstream_ancestry_is_derived_from_fee_and_weight() {
    let transport = CannedTransport {
        body: json!({
            "vout": [],
            "status": { "confirmed": false },
            "fee": 1_000,
            "weight": 800
        }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::Blockstream)),
        transport,
    );

    let ancestor = gateway.get_ancestor_info(&"ef".repeat(32)).await.unwrap();

    assert_eq!(ancestor.fees, 1_000);
    assert_eq!(ancestor.vsize, 200);
    assert!((ancestor.effective_rate - 5.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_legacy_apis_cannot_answer_ancestor_queries() {
    let transport = CannedTransport {
        body: json!({ "out": [], "block_height": 1 }),
    };
    let gateway = DataSourceGateway::with_transport(
        settings(single(ProviderKind::BlockchainInfo)),
        transport,
    );

    let err = gateway.get_ancestor_info(&"ef".repeat(32)).await.unwrap_err();
    assert!(matches!(err, TxBuildError::AllProvidersFailed { .. }));
}
