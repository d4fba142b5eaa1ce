//! Transaction size model
//!
//! Weight-unit accounting for unsigned transactions, mirroring consensus
//! rules: non-witness bytes count 4 weight units each, witness bytes 1,
//! and virtual size is `ceil(weight / 4)`. Per-kind byte sizes are fixed
//! constants on [`ScriptKind`]; they are never recomputed from live
//! script parsing, because a wrong table silently breaks fee accuracy.

use crate::types::{
    ScriptKind, SizeEstimate, TxInputSpec, TxOutputSpec, SEGWIT_MARKER_FLAG_BYTES,
    TX_BASE_OVERHEAD_BYTES,
};

/// Estimate the size of a transaction spending `inputs` into `outputs`,
/// optionally with one extra change output of `change_kind`.
///
/// A pure function: identical inputs always yield identical estimates.
pub fn estimate_size(
    inputs: &[TxInputSpec],
    outputs: &[TxOutputSpec],
    include_change: bool,
    change_kind: ScriptKind,
) -> SizeEstimate {
    let mut weight = TX_BASE_OVERHEAD_BYTES * 4;

    // Marker and flag are carried once per transaction, not per input.
    if inputs.iter().any(|i| i.is_witness) {
        weight += SEGWIT_MARKER_FLAG_BYTES * 4;
    }

    for input in inputs {
        weight += input.kind.input_base_size() * 4;
        if input.is_witness {
            weight += input.kind.input_witness_size();
        }
    }

    for output in outputs {
        weight += output.kind.output_size() * 4;
    }

    if include_change {
        weight += change_kind.output_size() * 4;
    }

    SizeEstimate::from_weight(weight)
}

/// Estimate the size contribution of a single spending input, in vbytes.
///
/// Used by the gateway to fill `Utxo.size` when a provider reports none.
pub fn input_vbytes(kind: ScriptKind) -> u64 {
    kind.input_vbytes()
}

/// Convert a weight in weight units to virtual size, rounding up.
pub fn weight_to_vsize(weight: u64) -> u64 {
    (weight + 3) / 4
}
