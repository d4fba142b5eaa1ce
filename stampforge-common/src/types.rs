//! Core domain types for transaction construction
//!
//! This module defines the value types shared by every component: script
//! kinds with their fixed byte tables, input/output specifications,
//! ancestor (CPFP) metadata, UTXOs as normalized by the data-source
//! gateway, and the result types for sizing, dust planning and selection.
//!
//! All of these are plain value types. Nothing here holds shared mutable
//! state; callers own what they pass in and own what they get back.

use serde::{Deserialize, Serialize};

/// Generic dust floor in satoshis for stamp outputs.
pub const DUST_FLOOR: u64 = 333;

/// Dust floor used on the SRC-20 token-protocol path.
///
/// The floor in force is always an explicit parameter; this constant is a
/// named default, never inferred from a call site.
pub const SRC20_DUST_FLOOR: u64 = 420;

/// Below this per-output value, relay nodes may treat outputs as
/// non-standard. Outputs are still accepted, but callers must surface the
/// reduced-dust mode to the user.
pub const REDUCED_DUST_THRESHOLD: u64 = 330;

/// Minimum accepted per-output dust value in satoshis.
pub const MIN_DUST_VALUE: u64 = 1;

/// Maximum accepted per-output dust value in satoshis.
pub const MAX_DUST_VALUE: u64 = 5000;

/// CIP33 embeds payload data at 32 bytes per output (one hash-sized
/// witness-program item each).
pub const CIP33_CHUNK_SIZE: u32 = 32;

/// Default fee headroom multiplier applied during coin selection so the
/// transaction stays replaceable (RBF) without re-selecting inputs.
pub const DEFAULT_RBF_BUFFER: f64 = 1.5;

/// Default sigops rate factor before the selection fixed point runs.
pub const DEFAULT_SIGOPS_RATE: f64 = 1.0;

/// Cap on sigops fixed-point iterations during coin selection.
pub const MAX_SIGOPS_ITERATIONS: u32 = 5;

/// Non-witness transaction overhead: 4-byte version + 4-byte locktime.
pub const TX_BASE_OVERHEAD_BYTES: u64 = 8;

/// SegWit marker + flag bytes, carried once if any input is witness.
pub const SEGWIT_MARKER_FLAG_BYTES: u64 = 2;

/// Closed set of supported script kinds.
///
/// Each kind carries immutable byte-size constants used by the size model.
/// Unrecognized scripts or addresses never map to a kind; classification
/// fails explicitly instead of defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptKind {
    /// Legacy pay-to-pubkey-hash
    P2pkh,
    /// Pay-to-script-hash (including wrapped SegWit)
    P2sh,
    /// Native SegWit v0 pubkey-hash
    P2wpkh,
    /// Native SegWit v0 script-hash
    P2wsh,
    /// Taproot (SegWit v1)
    P2tr,
}

impl ScriptKind {
    /// Non-witness bytes a spending input of this kind contributes.
    pub fn input_base_size(&self) -> u64 {
        match self {
            ScriptKind::P2pkh => 148,
            ScriptKind::P2sh => 91,
            ScriptKind::P2wpkh => 41,
            ScriptKind::P2wsh => 41,
            ScriptKind::P2tr => 41,
        }
    }

    /// Witness-stack bytes a spending input of this kind contributes.
    pub fn input_witness_size(&self) -> u64 {
        match self {
            ScriptKind::P2pkh => 0,
            ScriptKind::P2sh => 0,
            ScriptKind::P2wpkh => 107,
            ScriptKind::P2wsh => 252,
            ScriptKind::P2tr => 66,
        }
    }

    /// Virtual size of a spending input of this kind, rounded up.
    pub fn input_vbytes(&self) -> u64 {
        (self.input_base_size() * 4 + self.input_witness_size() + 3) / 4
    }

    /// Serialized size in bytes of an output paying to this kind.
    /// Outputs carry no witness data and are never discounted.
    pub fn output_size(&self) -> u64 {
        match self {
            ScriptKind::P2pkh => 34,
            ScriptKind::P2sh => 32,
            ScriptKind::P2wpkh => 31,
            ScriptKind::P2wsh => 43,
            ScriptKind::P2tr => 43,
        }
    }

    /// Whether spending this kind places data on the witness stack.
    pub fn is_witness(&self) -> bool {
        matches!(self, ScriptKind::P2wpkh | ScriptKind::P2wsh | ScriptKind::P2tr)
    }

    /// Lowercase conventional name ("p2pkh", "p2wsh", ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::P2pkh => "p2pkh",
            ScriptKind::P2sh => "p2sh",
            ScriptKind::P2wpkh => "p2wpkh",
            ScriptKind::P2wsh => "p2wsh",
            ScriptKind::P2tr => "p2tr",
        }
    }
}

impl std::fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mempool ancestry of an unconfirmed parent transaction.
///
/// A child spending an unconfirmed output must absorb the parent's fee
/// pressure (CPFP); the fee calculator blends these figures into the
/// child's effective rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AncestorInfo {
    /// Total ancestor fees in satoshis
    pub fees: u64,
    /// Total ancestor virtual size in vbytes
    pub vsize: u64,
    /// Effective package fee rate in sat/vB as reported upstream
    pub effective_rate: f64,
}

/// An input as specified before selection. Carries no amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInputSpec {
    /// Script kind being spent
    pub kind: ScriptKind,
    /// Whether this input contributes witness data
    pub is_witness: bool,
    /// Ancestor info if the funding transaction is unconfirmed
    pub ancestor: Option<AncestorInfo>,
}

impl TxInputSpec {
    /// Create an input spec for the given kind, deriving the witness flag.
    pub fn new(kind: ScriptKind) -> Self {
        Self {
            kind,
            is_witness: kind.is_witness(),
            ancestor: None,
        }
    }

    /// Attach ancestor info to this input spec.
    pub fn with_ancestor(mut self, ancestor: AncestorInfo) -> Self {
        self.ancestor = Some(ancestor);
        self
    }
}

/// An output as specified by the caller building the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TxOutputSpec {
    /// Script kind being paid
    pub kind: ScriptKind,
    /// Whether the paid script is a witness program
    pub is_witness: bool,
    /// Output value in satoshis
    pub value: u64,
}

impl TxOutputSpec {
    /// Create an output spec for the given kind and value.
    pub fn new(kind: ScriptKind, value: u64) -> Self {
        Self {
            kind,
            is_witness: kind.is_witness(),
            value,
        }
    }
}

/// Unspent transaction output as normalized by the data-source gateway.
///
/// Created by the gateway from a provider response; this library only
/// reads and ranks UTXOs, it never marks them spent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    /// Transaction id, 64 lowercase hex chars, display (big-endian) order
    pub txid: String,
    /// Output index within the transaction
    pub vout: u32,
    /// Value in satoshis
    pub value: u64,
    /// scriptPubKey hex
    pub script: String,
    /// Estimated spend-input size in vbytes
    pub size: u32,
    /// Whether the funding transaction is confirmed
    pub confirmed: bool,
    /// Ancestor info if the funding transaction is unconfirmed
    pub ancestor: Option<AncestorInfo>,
}

impl Utxo {
    /// Create a UTXO with the given identity and script.
    pub fn new(txid: String, vout: u32, value: u64, script: String, size: u32) -> Self {
        Self {
            txid,
            vout,
            value,
            script,
            size,
            confirmed: false,
            ancestor: None,
        }
    }

    /// Mark this UTXO confirmed or unconfirmed.
    pub fn with_confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Attach ancestor info to this UTXO.
    pub fn with_ancestor(mut self, ancestor: AncestorInfo) -> Self {
        self.ancestor = Some(ancestor);
        self
    }

    /// Unique identifier in "txid:vout" form.
    pub fn id(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

/// Estimated size of an unsigned transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeEstimate {
    /// Virtual size in vbytes, always `ceil(weight / 4)`
    pub vbytes: u64,
    /// Consensus weight in weight units
    pub weight: u64,
}

impl SizeEstimate {
    /// Build an estimate from a weight, deriving vbytes by rounding up.
    pub fn from_weight(weight: u64) -> Self {
        Self {
            vbytes: (weight + 3) / 4,
            weight,
        }
    }
}

/// Plan for embedding a byte payload as priced dust outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DustPlan {
    /// Number of 32-byte chunks the payload splits into
    pub chunk_count: u32,
    /// Per-chunk output value in satoshis
    pub dust_per_chunk: u64,
    /// Total satoshis locked into dust outputs
    pub total_dust: u64,
}
