//! Fee calculation
//!
//! Turns an estimated size and a sat/vB rate into an absolute fee, with
//! optional ancestor (CPFP) blending. All rate arithmetic runs on
//! `Decimal` and every conversion to satoshis rounds up; underpaying is
//! the failure mode to avoid.

use crate::types::{AncestorInfo, ScriptKind, SizeEstimate, TxInputSpec, TxOutputSpec};
use crate::tx_size;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// Base fee for a size at a rate: `ceil(vbytes * rate)` in satoshis.
pub fn fee_for_size(size: &SizeEstimate, rate_sat_per_vb: f64) -> u64 {
    let rate = sanitize_rate(rate_sat_per_vb);
    (rate * Decimal::from(size.vbytes))
        .ceil()
        .to_u64()
        .unwrap_or(0)
}

/// Fee for a size at a rate, blended with ancestor fee pressure.
///
/// With ancestors present, the blended package rate is
/// `(sum(fees) + vbytes * rate) / (sum(vsize) + vbytes)` and the rate
/// actually charged is `max(blended, rate)`: a child must never
/// advertise a lower effective package rate than its parents, or relay
/// and mining policy will delay it.
pub fn fee(size: &SizeEstimate, rate_sat_per_vb: f64, ancestors: &[AncestorInfo]) -> u64 {
    if ancestors.is_empty() {
        return fee_for_size(size, rate_sat_per_vb);
    }

    let rate = sanitize_rate(rate_sat_per_vb);
    let vbytes = Decimal::from(size.vbytes);
    let ancestor_fees: Decimal = ancestors.iter().map(|a| Decimal::from(a.fees)).sum();
    let ancestor_vsize: Decimal = ancestors.iter().map(|a| Decimal::from(a.vsize)).sum();

    let denominator = ancestor_vsize + vbytes;
    if denominator.is_zero() {
        return 0;
    }

    let blended = (ancestor_fees + vbytes * rate) / denominator;
    let effective = blended.max(rate);
    (effective * vbytes).ceil().to_u64().unwrap_or(0)
}

/// Estimate the mining fee for a full input/output specification.
///
/// Sizes the transaction, gathers ancestor info off the inputs and
/// applies the blending rule. Convenience over [`fee`] for callers that
/// have specs rather than a precomputed estimate.
pub fn estimate_mining_fee(
    inputs: &[TxInputSpec],
    outputs: &[TxOutputSpec],
    rate_sat_per_vb: f64,
    include_change: bool,
    change_kind: ScriptKind,
) -> u64 {
    let size = tx_size::estimate_size(inputs, outputs, include_change, change_kind);
    let ancestors: Vec<AncestorInfo> = inputs.iter().filter_map(|i| i.ancestor).collect();
    fee(&size, rate_sat_per_vb, &ancestors)
}

fn sanitize_rate(rate: f64) -> Decimal {
    if !rate.is_finite() || rate < 0.0 {
        log::warn!("non-finite or negative fee rate {}, treating as 0", rate);
        return Decimal::ZERO;
    }
    Decimal::from_f64(rate).unwrap_or(Decimal::ZERO)
}
