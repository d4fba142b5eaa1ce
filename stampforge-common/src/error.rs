//! Standardized error handling for transaction construction
//!
//! This module defines the error taxonomy shared by every component.
//! Classification and dust-bound errors are caller-input errors and fail
//! fast with no retry; provider errors are retried inside the gateway up
//! to its fixed bound before `AllProvidersFailed` surfaces; selection
//! insufficiency is always surfaced and never silently produces an
//! under-funded transaction.

use thiserror::Error;

/// The main error type for transaction construction.
#[derive(Debug, Error)]
pub enum TxBuildError {
    /// No script or address template matched. Callers must not proceed
    /// with a default kind; fee math on a guessed kind is wrong math.
    #[error("Unrecognized script or address: {0}")]
    UnrecognizedScript(String),

    /// Dust parameter outside protocol bounds
    #[error("Invalid dust value: {0}")]
    InvalidDustValue(String),

    /// Selection cannot meet the target outputs plus fee
    #[error(
        "Insufficient funds: {available} sats available, {required} sats required (short {shortfall} sats)"
    )]
    InsufficientFunds {
        /// Total value of the candidate UTXOs in satoshis
        available: u64,
        /// Target outputs plus fee in satoshis
        required: u64,
        /// Exact amount missing, for user messaging
        shortfall: u64,
    },

    /// Every upstream data source was exhausted after the retry bound
    #[error("All providers failed after {attempts} attempts")]
    AllProvidersFailed {
        /// Total individual provider attempts made
        attempts: u32,
    },

    /// A single provider attempt failed. Caught and logged inside the
    /// gateway's fallback chain, surfaced only from direct provider calls.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Caller-supplied parameters are malformed (empty outputs,
    /// non-finite fee rate, unparseable configuration)
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Broad category of an error, for logging and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad caller input; fail fast, never retry
    InvalidInput,
    /// Upstream data-source trouble; retryable
    Network,
    /// Wallet cannot fund the transaction; surface to the user
    Funds,
}

impl TxBuildError {
    /// Category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            TxBuildError::UnrecognizedScript(_)
            | TxBuildError::InvalidDustValue(_)
            | TxBuildError::InvalidParameters(_) => ErrorCategory::InvalidInput,
            TxBuildError::AllProvidersFailed { .. } | TxBuildError::Provider(_) => {
                ErrorCategory::Network
            }
            TxBuildError::InsufficientFunds { .. } => ErrorCategory::Funds,
        }
    }

    /// Whether a caller may reasonably retry the same call later.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    /// Short message suitable for direct display, including the numeric
    /// detail a UI needs to suggest a fix.
    pub fn user_message(&self) -> String {
        match self {
            TxBuildError::UnrecognizedScript(_) => {
                "The address or script is not a recognized Bitcoin format".to_string()
            }
            TxBuildError::InvalidDustValue(msg) => msg.clone(),
            TxBuildError::InsufficientFunds { shortfall, .. } => format!(
                "Not enough funds: {} more sats are needed. Top up, lower the fee rate, or reduce the payload size.",
                shortfall
            ),
            TxBuildError::AllProvidersFailed { .. } => {
                "Could not reach any UTXO data source. Check connectivity and try again.".to_string()
            }
            TxBuildError::Provider(msg) => format!("Data source error: {}", msg),
            TxBuildError::InvalidParameters(msg) => format!("Invalid request: {}", msg),
        }
    }
}
