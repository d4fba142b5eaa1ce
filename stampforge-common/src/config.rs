//! Configuration management
//!
//! Settings structs for fee bounds, selection behavior and the gateway
//! provider chain, loadable from TOML. Every value here is a default;
//! the corresponding functions also accept explicit parameters so
//! callers can override per call.

use crate::error::TxBuildError;
use crate::gateway::ProviderEndpoint;
use crate::selection::CoinSelector;
use crate::types::{
    ScriptKind, DEFAULT_RBF_BUFFER, DEFAULT_SIGOPS_RATE, DUST_FLOOR, MAX_SIGOPS_ITERATIONS,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fee-rate bounds and default
    pub fees: FeeSettings,
    /// Coin-selection behavior
    pub selection: SelectionSettings,
    /// Provider chain and retry policy
    pub gateway: GatewaySettings,
}

impl Config {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, TxBuildError> {
        toml::from_str(raw)
            .map_err(|e| TxBuildError::InvalidParameters(format!("bad configuration: {}", e)))
    }

    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, TxBuildError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TxBuildError::InvalidParameters(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }
}

/// Fee-rate defaults and sanity bounds in sat/vB.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeeSettings {
    /// Rate used when the caller supplies none
    pub default_rate: f64,
    /// Smallest rate accepted without clamping
    pub min_rate: f64,
    /// Largest rate accepted without clamping
    pub max_rate: f64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            default_rate: 1.0,
            min_rate: 1.0,
            max_rate: 2000.0,
        }
    }
}

impl FeeSettings {
    /// Clamp a caller-supplied rate into the configured bounds.
    pub fn sanitize_rate(&self, rate: f64) -> f64 {
        if !rate.is_finite() {
            log::warn!("non-finite fee rate, using default {}", self.default_rate);
            return self.default_rate;
        }
        if rate < self.min_rate {
            log::warn!("fee rate {} too low, using minimum {}", rate, self.min_rate);
            return self.min_rate;
        }
        if rate > self.max_rate {
            log::warn!("fee rate {} too high, capping at {}", rate, self.max_rate);
            return self.max_rate;
        }
        rate
    }
}

/// Coin-selection defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Dust floor in satoshis applied to outputs and change
    pub dust_floor: u64,
    /// Fee headroom multiplier for replaceability
    pub rbf_buffer: f64,
    /// Initial sigops rate factor
    pub sigops_rate: f64,
    /// Fixed-point iteration cap
    pub max_iterations: u32,
    /// Script kind change pays to
    pub change_kind: ScriptKind,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            dust_floor: DUST_FLOOR,
            rbf_buffer: DEFAULT_RBF_BUFFER,
            sigops_rate: DEFAULT_SIGOPS_RATE,
            max_iterations: MAX_SIGOPS_ITERATIONS,
            change_kind: ScriptKind::P2wpkh,
        }
    }
}

impl SelectionSettings {
    /// Build a selector from these settings at the given fee rate.
    pub fn selector(&self, fee_rate: f64) -> CoinSelector {
        CoinSelector::new(fee_rate, self.dust_floor)
            .with_rbf_buffer(self.rbf_buffer)
            .with_sigops_rate(self.sigops_rate)
            .with_max_iterations(self.max_iterations)
            .with_change_kind(self.change_kind)
    }
}

/// Gateway provider chain and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySettings {
    /// Full passes over the chain before giving up
    pub max_retries: u32,
    /// Delay between passes in milliseconds
    pub retry_delay_ms: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Ordered fallback chain, tried first to last
    pub providers: Vec<ProviderEndpoint>,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            request_timeout_secs: 8,
            providers: ProviderEndpoint::default_chain(),
        }
    }
}
