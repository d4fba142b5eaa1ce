//! Stampforge Common Library
//!
//! Transaction-construction arithmetic for a Bitcoin stamp/token
//! marketplace: everything needed to size an unsigned transaction,
//! price it at a target fee rate, split a data payload into priced dust
//! outputs, select which coins to spend and compute change, plus a
//! resilient gateway that fetches UTXOs and mempool ancestor info from
//! public indexers.
//!
//! # Modules
//!
//! - `types`: Core domain types and protocol constants
//! - `error`: Error taxonomy shared by all components
//! - `script`: Script and address classification
//! - `tx_size`: Transaction weight/vsize model
//! - `dust`: CIP33 payload chunking and dust pricing
//! - `fee`: Fee calculation with ancestor (CPFP) blending
//! - `selection`: Coin selection
//! - `gateway`: Multi-provider UTXO data-source gateway
//! - `config`: Configuration management
//! - `logging`: Logging initialization
//!
//! Signing, broadcasting, address derivation and consensus validation
//! are out of scope; results are plain data for PSBT-building callers.

/// Core domain types and protocol constants
pub mod types;

/// Error taxonomy shared by all components
pub mod error;

/// Script and address classification
pub mod script;

/// Transaction weight/vsize model
pub mod tx_size;

/// CIP33 payload chunking and dust pricing
pub mod dust;

/// Fee calculation with ancestor (CPFP) blending
pub mod fee;

/// Coin selection
pub mod selection;

/// Multi-provider UTXO data-source gateway
pub mod gateway;

/// Configuration management
pub mod config;

/// Logging initialization
pub mod logging;

/// Re-export core types for convenience
pub use types::{
    AncestorInfo, DustPlan, ScriptKind, SizeEstimate, TxInputSpec, TxOutputSpec, Utxo,
    CIP33_CHUNK_SIZE, DUST_FLOOR, MAX_DUST_VALUE, MIN_DUST_VALUE, REDUCED_DUST_THRESHOLD,
    SRC20_DUST_FLOOR,
};

/// Re-export the error type and categories
pub use error::{ErrorCategory, TxBuildError};

/// Re-export selection types
pub use selection::{CoinSelector, SelectionResult};

/// Re-export gateway types
pub use gateway::{DataSourceGateway, HttpTransport, ProviderEndpoint, ProviderKind, ProviderTransport, TxOutputLookup};

/// Re-export configuration types
pub use config::{Config, FeeSettings, GatewaySettings, SelectionSettings};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::sync::Once;

static INIT: Once = Once::new();

/// Library initialization.
///
/// Installs the default logging configuration. Safe to call multiple
/// times; only the first call does anything.
pub fn init() {
    INIT.call_once(|| {
        let config = logging::LogConfig::default();
        if let Err(e) = logging::init(&config) {
            eprintln!("failed to initialize logging: {}", e);
        }
    });
}
