//! Coin selector implementation

use crate::error::TxBuildError;
use crate::fee;
use crate::script;
use crate::selection::types::SelectionResult;
use crate::types::{
    ScriptKind, TxInputSpec, TxOutputSpec, Utxo, DEFAULT_RBF_BUFFER, DEFAULT_SIGOPS_RATE,
    MAX_SIGOPS_ITERATIONS,
};

/// Greedy largest-first coin selector.
///
/// Favors fewer, predictable inputs over minimal-waste selection. The
/// effective fee rate is scaled by a sigops factor recomputed from the
/// selected input/output mix until it stabilizes, with a hard iteration
/// cap instead of unbounded recursion.
#[derive(Debug, Clone)]
pub struct CoinSelector {
    fee_rate: f64,
    dust_floor: u64,
    rbf_buffer: f64,
    sigops_rate: f64,
    max_iterations: u32,
    change_kind: ScriptKind,
}

impl CoinSelector {
    /// Create a selector for a fee rate and dust floor.
    ///
    /// The dust floor is deliberately a required parameter; which floor
    /// applies (generic or token-protocol) is the caller's decision.
    /// Change pays to P2WPKH unless overridden.
    pub fn new(fee_rate: f64, dust_floor: u64) -> Self {
        Self {
            fee_rate,
            dust_floor,
            rbf_buffer: DEFAULT_RBF_BUFFER,
            sigops_rate: DEFAULT_SIGOPS_RATE,
            max_iterations: MAX_SIGOPS_ITERATIONS,
            change_kind: ScriptKind::P2wpkh,
        }
    }

    /// Override the RBF fee headroom multiplier.
    pub fn with_rbf_buffer(mut self, rbf_buffer: f64) -> Self {
        self.rbf_buffer = rbf_buffer;
        self
    }

    /// Override the initial sigops rate factor.
    pub fn with_sigops_rate(mut self, sigops_rate: f64) -> Self {
        self.sigops_rate = sigops_rate;
        self
    }

    /// Override the fixed-point iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Override the script kind change pays to.
    pub fn with_change_kind(mut self, change_kind: ScriptKind) -> Self {
        self.change_kind = change_kind;
        self
    }

    /// Select inputs to fund `outputs`, returning inputs, change and fee.
    ///
    /// The caller's slice is cloned and ranked internally; its ordering
    /// is never mutated. Output values below the dust floor are raised
    /// to it before the target is computed. Fails with
    /// `InsufficientFunds` (carrying the exact shortfall) when the
    /// candidates cannot cover target plus fee.
    pub fn select(
        &self,
        utxos: &[Utxo],
        outputs: &[TxOutputSpec],
    ) -> Result<SelectionResult, TxBuildError> {
        if outputs.is_empty() {
            return Err(TxBuildError::InvalidParameters(
                "no outputs to fund".to_string(),
            ));
        }
        if !self.fee_rate.is_finite() || self.fee_rate <= 0.0 {
            return Err(TxBuildError::InvalidParameters(format!(
                "fee rate must be a positive finite number, got {}",
                self.fee_rate
            )));
        }
        if !self.rbf_buffer.is_finite() || self.rbf_buffer < 1.0 {
            return Err(TxBuildError::InvalidParameters(format!(
                "rbf buffer must be at least 1.0, got {}",
                self.rbf_buffer
            )));
        }

        // Classify every candidate script up front; an unrecognized
        // script refuses the whole selection rather than guessing a kind.
        let mut candidates: Vec<(Utxo, TxInputSpec)> = Vec::with_capacity(utxos.len());
        for utxo in utxos {
            let kind = script::classify_script(&utxo.script)?;
            let mut spec = TxInputSpec::new(kind);
            spec.ancestor = utxo.ancestor;
            candidates.push((utxo.clone(), spec));
        }
        candidates.sort_by(|a, b| b.0.value.cmp(&a.0.value));

        let raised: Vec<TxOutputSpec> = outputs
            .iter()
            .map(|o| TxOutputSpec {
                value: o.value.max(self.dust_floor),
                ..*o
            })
            .collect();
        let target: u64 = raised.iter().map(|o| o.value).sum();
        let available: u64 = candidates.iter().map(|(u, _)| u.value).sum();

        let plain_outputs = raised
            .iter()
            .filter(|o| !counts_as_multisig(o.kind))
            .count();
        let multisig_outputs = raised.len() - plain_outputs;

        let mut r = self.sigops_rate;
        let mut converged = false;
        let mut best: Option<(usize, u64, f64)> = None; // (selected count, total, effective rate)

        for _ in 0..self.max_iterations.max(1) {
            let effective_rate = (self.fee_rate * r).floor();

            let mut total: u64 = 0;
            let mut specs: Vec<TxInputSpec> = Vec::new();
            let mut covered = None;
            for (i, (utxo, spec)) in candidates.iter().enumerate() {
                specs.push(spec.clone());
                total += utxo.value;
                let estimated = fee::estimate_mining_fee(
                    &specs,
                    &raised,
                    effective_rate,
                    true,
                    self.change_kind,
                );
                let buffered = (estimated as f64 * self.rbf_buffer).ceil() as u64;
                if total >= target + buffered + self.dust_floor {
                    covered = Some((i + 1, total));
                    break;
                }
            }

            let (count, total) = match covered {
                Some(selected) => selected,
                None => {
                    let all_specs: Vec<TxInputSpec> =
                        candidates.iter().map(|(_, s)| s.clone()).collect();
                    let final_fee = fee::estimate_mining_fee(
                        &all_specs,
                        &raised,
                        effective_rate,
                        true,
                        self.change_kind,
                    );
                    let required = target + final_fee;
                    if available < required {
                        return Err(TxBuildError::InsufficientFunds {
                            available,
                            required,
                            shortfall: required - available,
                        });
                    }
                    // The buffered headroom is out of reach but the funds
                    // do cover target plus fee: spend the full candidate
                    // set and let finalization fold the slim change into
                    // the fee.
                    (candidates.len(), available)
                }
            };

            best = Some((count, total, effective_rate));

            let next_r = (count + plain_outputs + 3 * multisig_outputs) as f64
                / (count + plain_outputs + multisig_outputs) as f64;
            if (next_r - r).abs() <= 0.01 {
                converged = true;
                break;
            }
            r = next_r;
        }

        // The loop runs at least once, so a covering selection exists here.
        let Some((count, total, effective_rate)) = best else {
            return Err(TxBuildError::InsufficientFunds {
                available,
                required: target,
                shortfall: target.saturating_sub(available),
            });
        };
        if !converged {
            log::warn!(
                "sigops rate did not converge within {} iterations, using last selection",
                self.max_iterations
            );
        }

        let specs: Vec<TxInputSpec> = candidates[..count].iter().map(|(_, s)| s.clone()).collect();
        let mut final_fee =
            fee::estimate_mining_fee(&specs, &raised, effective_rate, true, self.change_kind);
        let mut change = total.saturating_sub(target).saturating_sub(final_fee);
        if change > 0 && change < self.dust_floor {
            // Never create sub-dust change; it becomes fee.
            final_fee += change;
            change = 0;
        }

        Ok(SelectionResult {
            inputs: candidates[..count].iter().map(|(u, _)| u.clone()).collect(),
            change,
            fee: final_fee,
            converged,
        })
    }
}

fn counts_as_multisig(kind: ScriptKind) -> bool {
    matches!(kind, ScriptKind::P2sh | ScriptKind::P2wsh)
}
