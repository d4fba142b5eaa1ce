//! Coin selection
//!
//! Greedy largest-first selection with a bounded sigops-rate fixed point.
//! The selector borrows the caller's UTXO slice and returns a new owned
//! result; the caller's ordering is never touched.

mod selector;
mod types;

pub use selector::CoinSelector;
pub use types::SelectionResult;
