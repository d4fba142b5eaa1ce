//! Multi-provider data-source gateway
//!
//! Fetches UTXOs and mempool ancestor info from an ordered list of
//! public indexers. Providers are tried in sequence (never raced, to
//! keep per-provider rate-limit pressure down); any single failure is
//! caught and logged, and the next provider is tried. When a full pass
//! over the chain fails, the pass is retried up to a fixed bound with a
//! fixed delay before `AllProvidersFailed` surfaces. The provider list,
//! retry bound, delay and request timeout all come from
//! [`GatewaySettings`](crate::config::GatewaySettings); nothing is
//! ambient.

mod providers;
mod transport;

pub use providers::{ProviderEndpoint, ProviderKind};
pub use transport::{HttpTransport, ProviderTransport};

use crate::config::GatewaySettings;
use crate::error::TxBuildError;
use crate::types::{AncestorInfo, Utxo};
use std::future::Future;
use std::time::Duration;

/// A transaction output looked up through the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct TxOutputLookup {
    /// The normalized output
    pub utxo: Utxo,
    /// Ancestor info, when requested and available upstream
    pub ancestor: Option<AncestorInfo>,
}

/// Resilient UTXO and ancestor-info fetcher over an ordered provider
/// fallback chain.
pub struct DataSourceGateway<T: ProviderTransport> {
    settings: GatewaySettings,
    transport: T,
}

impl DataSourceGateway<HttpTransport> {
    /// Build a gateway over HTTP with the configured request timeout.
    pub fn new(settings: GatewaySettings) -> Result<Self, TxBuildError> {
        let transport = HttpTransport::new(Duration::from_secs(settings.request_timeout_secs))?;
        Ok(Self {
            settings,
            transport,
        })
    }
}

impl<T: ProviderTransport> DataSourceGateway<T> {
    /// Build a gateway over an injected transport. Used by tests to
    /// drive the fallback chain with doubles.
    pub fn with_transport(settings: GatewaySettings, transport: T) -> Self {
        Self {
            settings,
            transport,
        }
    }

    /// Fetch all unspent outputs for an address.
    ///
    /// An empty provider result counts as a failure: every provider in
    /// the chain indexes mainnet, so an empty answer is more likely a
    /// lagging indexer than a truly empty address.
    pub async fn get_utxos(&self, address: &str) -> Result<Vec<Utxo>, TxBuildError> {
        self.run_with_fallback("get_utxos", |endpoint| async move {
            let body = self.transport.get_json(&endpoint.utxo_url(address)).await?;
            let utxos = providers::parse_utxos(endpoint.kind, &body, address)?;
            if utxos.is_empty() {
                return Err(TxBuildError::Provider(format!(
                    "{}: empty result for {}",
                    endpoint.kind.name(),
                    address
                )));
            }
            Ok(utxos)
        })
        .await
    }

    /// Fetch mempool ancestor info for a transaction.
    pub async fn get_ancestor_info(&self, txid: &str) -> Result<AncestorInfo, TxBuildError> {
        self.run_with_fallback("get_ancestor_info", |endpoint| async move {
            let body = self.transport.get_json(&endpoint.tx_url(txid)).await?;
            providers::parse_ancestor(endpoint.kind, &body)
        })
        .await
    }

    /// Fetch one specific transaction output, optionally with ancestor
    /// info for CPFP-aware fee math.
    pub async fn get_tx_output(
        &self,
        txid: &str,
        vout: u32,
        include_ancestors: bool,
    ) -> Result<TxOutputLookup, TxBuildError> {
        self.run_with_fallback("get_tx_output", |endpoint| async move {
            let body = self.transport.get_json(&endpoint.tx_url(txid)).await?;
            let (utxo, ancestor) =
                providers::parse_tx_output(endpoint.kind, &body, txid, vout, include_ancestors)?;
            Ok(TxOutputLookup { utxo, ancestor })
        })
        .await
    }

    /// Sequential fallback over the provider chain with bounded retry.
    /// First success short-circuits; per-provider errors are logged and
    /// swallowed until the whole chain has been exhausted
    /// `max_retries` times.
    async fn run_with_fallback<'a, R, F, Fut>(
        &'a self,
        what: &str,
        call: F,
    ) -> Result<R, TxBuildError>
    where
        F: Fn(&'a ProviderEndpoint) -> Fut,
        Fut: Future<Output = Result<R, TxBuildError>> + 'a,
    {
        let mut attempts: u32 = 0;
        let cycles = self.settings.max_retries.max(1);
        for cycle in 0..cycles {
            for endpoint in &self.settings.providers {
                attempts += 1;
                log::debug!(
                    "{}: attempt {} via {}",
                    what,
                    attempts,
                    endpoint.kind.name()
                );
                match call(endpoint).await {
                    Ok(result) => return Ok(result),
                    Err(e) => {
                        log::warn!("{}: {} failed: {}", what, endpoint.kind.name(), e);
                    }
                }
            }
            if cycle + 1 < cycles {
                tokio::time::sleep(Duration::from_millis(self.settings.retry_delay_ms)).await;
            }
        }
        log::error!("{}: all providers failed after {} attempts", what, attempts);
        Err(TxBuildError::AllProvidersFailed { attempts })
    }
}
