//! Result types for coin selection

use crate::types::Utxo;
use serde::{Deserialize, Serialize};

/// Result of a successful coin selection.
///
/// Invariants: `sum(inputs.value) == sum(outputs.value) + change + fee`
/// to the satoshi, and `change == 0 || change >= dust_floor` for the
/// floor the selection ran with. Sub-dust change is folded into the fee
/// rather than creating an unspendable output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Selected inputs, largest first
    pub inputs: Vec<Utxo>,
    /// Change in satoshis, zero when folded into the fee
    pub change: u64,
    /// Final miner fee in satoshis
    pub fee: u64,
    /// False when the sigops fixed point hit its iteration cap; the
    /// selection is the best available, not a converged one
    pub converged: bool,
}

impl SelectionResult {
    /// Total value of the selected inputs in satoshis.
    pub fn total_input_value(&self) -> u64 {
        self.inputs.iter().map(|u| u.value).sum()
    }
}
