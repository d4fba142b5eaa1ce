//! Provider endpoints and response normalization
//!
//! Each upstream indexer speaks its own JSON dialect. Everything is
//! normalized into the common [`Utxo`]/[`AncestorInfo`] shape at this
//! boundary so no provider-specific format ever leaks downstream:
//! txids come out in display order, field names are reconciled
//! (`txid`/`tx_hash`, `vout`/`tx_output_n`, `value`/`value_sat`), and
//! missing scripts are reconstructed from the queried address.

use crate::error::TxBuildError;
use crate::script;
use crate::types::{AncestorInfo, Utxo};
use serde::Deserialize;
use serde_json::Value;

/// The upstream indexers the gateway knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// mempool.space esplora API
    MempoolSpace,
    /// blockstream.info esplora API
    Blockstream,
    /// blockchain.info legacy API
    BlockchainInfo,
    /// blockcypher REST API
    Blockcypher,
}

impl ProviderKind {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::MempoolSpace => "mempool.space",
            ProviderKind::Blockstream => "blockstream.info",
            ProviderKind::BlockchainInfo => "blockchain.info",
            ProviderKind::Blockcypher => "blockcypher",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::MempoolSpace => "https://mempool.space/api",
            ProviderKind::Blockstream => "https://blockstream.info/api",
            ProviderKind::BlockchainInfo => "https://blockchain.info",
            ProviderKind::Blockcypher => "https://api.blockcypher.com",
        }
    }
}

/// One entry in the gateway's ordered fallback list. The base URL is
/// injected through configuration so tests and regional deployments can
/// swap endpoints without touching code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// Which dialect this endpoint speaks
    pub kind: ProviderKind,
    /// Base URL, no trailing slash
    pub base_url: String,
}

impl ProviderEndpoint {
    /// Endpoint for a provider at its public base URL.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            base_url: kind.default_base_url().to_string(),
            kind,
        }
    }

    /// The default ordered fallback chain: fastest indexer first, the
    /// legacy APIs last.
    pub fn default_chain() -> Vec<ProviderEndpoint> {
        vec![
            ProviderEndpoint::new(ProviderKind::MempoolSpace),
            ProviderEndpoint::new(ProviderKind::Blockstream),
            ProviderEndpoint::new(ProviderKind::BlockchainInfo),
            ProviderEndpoint::new(ProviderKind::Blockcypher),
        ]
    }

    /// URL listing unspent outputs for an address.
    pub fn utxo_url(&self, address: &str) -> String {
        match self.kind {
            ProviderKind::MempoolSpace | ProviderKind::Blockstream => {
                format!("{}/address/{}/utxo", self.base_url, address)
            }
            ProviderKind::BlockchainInfo => {
                format!("{}/unspent?active={}", self.base_url, address)
            }
            ProviderKind::Blockcypher => format!(
                "{}/v1/btc/main/addrs/{}?unspentOnly=true&includeScript=true",
                self.base_url, address
            ),
        }
    }

    /// URL fetching a single transaction.
    pub fn tx_url(&self, txid: &str) -> String {
        match self.kind {
            ProviderKind::MempoolSpace | ProviderKind::Blockstream => {
                format!("{}/tx/{}", self.base_url, txid)
            }
            ProviderKind::BlockchainInfo => format!("{}/rawtx/{}", self.base_url, txid),
            ProviderKind::Blockcypher => format!(
                "{}/v1/btc/main/txs/{}?includeHex=true&includeScript=true",
                self.base_url, txid
            ),
        }
    }
}

// Esplora address/{addr}/utxo rows (mempool.space, blockstream.info).
// These endpoints carry no script; it is rebuilt from the address.
#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    value: u64,
    #[serde(default)]
    status: EsploraStatus,
}

#[derive(Debug, Default, Deserialize)]
struct EsploraStatus {
    #[serde(default)]
    confirmed: bool,
}

#[derive(Debug, Deserialize)]
struct EsploraTx {
    vout: Vec<EsploraTxOut>,
    #[serde(default)]
    status: EsploraStatus,
    #[serde(default)]
    fee: Option<u64>,
    #[serde(default)]
    weight: Option<u64>,
    #[serde(default)]
    ancestor_fees: Option<u64>,
    #[serde(default)]
    ancestor_size: Option<u64>,
    #[serde(default)]
    effective_fee_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct EsploraTxOut {
    scriptpubkey: String,
    value: u64,
}

// blockchain.info /unspent rows; tx_hash is wire order and needs a
// byte reversal, value_sat/confirmations names differ from esplora.
#[derive(Debug, Deserialize)]
struct BlockchainInfoUnspentList {
    unspent_outputs: Vec<BlockchainInfoUnspent>,
}

#[derive(Debug, Deserialize)]
struct BlockchainInfoUnspent {
    tx_hash: String,
    tx_output_n: u32,
    #[serde(alias = "value_sat")]
    value: u64,
    script: String,
    #[serde(default)]
    confirmations: u64,
}

#[derive(Debug, Deserialize)]
struct BlockchainInfoTx {
    out: Vec<BlockchainInfoTxOut>,
    #[serde(default)]
    block_height: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BlockchainInfoTxOut {
    value: u64,
    script: String,
}

// blockcypher address rows.
#[derive(Debug, Deserialize)]
struct BlockcypherAddress {
    #[serde(default)]
    txrefs: Vec<BlockcypherTxref>,
}

#[derive(Debug, Deserialize)]
struct BlockcypherTxref {
    tx_hash: String,
    tx_output_n: u32,
    value: u64,
    #[serde(default)]
    script: Option<String>,
    #[serde(default)]
    confirmations: u64,
}

#[derive(Debug, Deserialize)]
struct BlockcypherTx {
    outputs: Vec<BlockcypherTxOut>,
    #[serde(default)]
    confirmations: u64,
}

#[derive(Debug, Deserialize)]
struct BlockcypherTxOut {
    value: u64,
    #[serde(default)]
    script: Option<String>,
}

/// Normalize a provider's UTXO-list response.
///
/// Rows missing required fields or carrying an unclassifiable script
/// are dropped with a warning; one bad row must not fail the batch.
pub fn parse_utxos(
    kind: ProviderKind,
    body: &Value,
    address: &str,
) -> Result<Vec<Utxo>, TxBuildError> {
    let rows: Vec<(String, u32, u64, Option<String>, bool)> = match kind {
        ProviderKind::MempoolSpace | ProviderKind::Blockstream => {
            let utxos: Vec<EsploraUtxo> = deserialize(kind, body)?;
            utxos
                .into_iter()
                .map(|u| (u.txid, u.vout, u.value, None, u.status.confirmed))
                .collect()
        }
        ProviderKind::BlockchainInfo => {
            let list: BlockchainInfoUnspentList = deserialize(kind, body)?;
            list.unspent_outputs
                .into_iter()
                .map(|u| {
                    (
                        script::reverse_endian(&u.tx_hash),
                        u.tx_output_n,
                        u.value,
                        Some(u.script),
                        u.confirmations > 0,
                    )
                })
                .collect()
        }
        ProviderKind::Blockcypher => {
            let addr: BlockcypherAddress = deserialize(kind, body)?;
            addr.txrefs
                .into_iter()
                .map(|u| {
                    (
                        script::reverse_endian(&u.tx_hash),
                        u.tx_output_n,
                        u.value,
                        u.script,
                        u.confirmations > 0,
                    )
                })
                .collect()
        }
    };

    let mut utxos = Vec::with_capacity(rows.len());
    for (txid, vout, value, raw_script, confirmed) in rows {
        match normalize_row(&txid, vout, value, raw_script.as_deref(), address) {
            Ok(utxo) => utxos.push(utxo.with_confirmed(confirmed)),
            Err(e) => {
                log::warn!("{}: dropping UTXO {}:{}: {}", kind.name(), txid, vout, e);
            }
        }
    }
    Ok(utxos)
}

/// Normalize a provider's transaction response into the UTXO at `vout`,
/// with ancestor info when requested and the provider can supply it.
pub fn parse_tx_output(
    kind: ProviderKind,
    body: &Value,
    txid: &str,
    vout: u32,
    include_ancestors: bool,
) -> Result<(Utxo, Option<AncestorInfo>), TxBuildError> {
    match kind {
        ProviderKind::MempoolSpace | ProviderKind::Blockstream => {
            let tx: EsploraTx = deserialize(kind, body)?;
            let out = tx
                .vout
                .get(vout as usize)
                .ok_or_else(|| missing_output(kind, txid, vout))?;
            let utxo = normalize_row(txid, vout, out.value, Some(&out.scriptpubkey), "")?
                .with_confirmed(tx.status.confirmed);
            let ancestor = if include_ancestors {
                Some(esplora_ancestor(kind, &tx))
            } else {
                None
            };
            Ok((utxo, ancestor))
        }
        ProviderKind::BlockchainInfo => {
            let tx: BlockchainInfoTx = deserialize(kind, body)?;
            let out = tx
                .out
                .get(vout as usize)
                .ok_or_else(|| missing_output(kind, txid, vout))?;
            let utxo = normalize_row(txid, vout, out.value, Some(&out.script), "")?
                .with_confirmed(tx.block_height.unwrap_or(0) > 0);
            Ok((utxo, None))
        }
        ProviderKind::Blockcypher => {
            let tx: BlockcypherTx = deserialize(kind, body)?;
            let out = tx
                .outputs
                .get(vout as usize)
                .ok_or_else(|| missing_output(kind, txid, vout))?;
            let utxo = normalize_row(txid, vout, out.value, out.script.as_deref(), "")?
                .with_confirmed(tx.confirmations > 0);
            Ok((utxo, None))
        }
    }
}

/// Extract ancestor info from a provider's transaction response.
///
/// Only the esplora dialects expose mempool ancestry; the legacy APIs
/// fail here and the gateway moves down the chain.
pub fn parse_ancestor(kind: ProviderKind, body: &Value) -> Result<AncestorInfo, TxBuildError> {
    match kind {
        ProviderKind::MempoolSpace | ProviderKind::Blockstream => {
            let tx: EsploraTx = deserialize(kind, body)?;
            Ok(esplora_ancestor(kind, &tx))
        }
        ProviderKind::BlockchainInfo | ProviderKind::Blockcypher => Err(TxBuildError::Provider(
            format!("{} does not expose ancestor data", kind.name()),
        )),
    }
}

fn esplora_ancestor(kind: ProviderKind, tx: &EsploraTx) -> AncestorInfo {
    match kind {
        // mempool.space reports package figures directly.
        ProviderKind::MempoolSpace => AncestorInfo {
            fees: tx.ancestor_fees.unwrap_or(0),
            vsize: tx.ancestor_size.unwrap_or(0),
            effective_rate: tx.effective_fee_rate.unwrap_or(0.0),
        },
        // blockstream only reports the transaction itself; derive
        // vsize from weight and the rate from fee over vsize.
        _ => {
            let fees = tx.fee.unwrap_or(0);
            let vsize = tx.weight.map(|w| (w + 3) / 4).unwrap_or(0);
            let effective_rate = if vsize > 0 {
                fees as f64 / vsize as f64
            } else {
                0.0
            };
            AncestorInfo {
                fees,
                vsize,
                effective_rate,
            }
        }
    }
}

fn normalize_row(
    txid: &str,
    vout: u32,
    value: u64,
    raw_script: Option<&str>,
    address: &str,
) -> Result<Utxo, TxBuildError> {
    let script_hex = match raw_script {
        Some(s) if script::is_valid_script_hex(s) => s.to_lowercase(),
        _ => script::script_from_address(address)?,
    };
    let kind = script::classify_script(&script_hex)?;
    Ok(Utxo::new(
        txid.to_lowercase(),
        vout,
        value,
        script_hex,
        kind.input_vbytes() as u32,
    ))
}

fn deserialize<T: serde::de::DeserializeOwned>(
    kind: ProviderKind,
    body: &Value,
) -> Result<T, TxBuildError> {
    serde_json::from_value(body.clone())
        .map_err(|e| TxBuildError::Provider(format!("{}: unexpected response shape: {}", kind.name(), e)))
}

fn missing_output(kind: ProviderKind, txid: &str, vout: u32) -> TxBuildError {
    TxBuildError::Provider(format!(
        "{}: transaction {} has no output {}",
        kind.name(),
        txid,
        vout
    ))
}
