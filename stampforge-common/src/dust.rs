//! CIP33 dust chunking
//!
//! Splits a byte payload into 32-byte chunks, each embedded in one
//! P2WSH-style output, and prices the set at a caller-chosen per-output
//! dust value. Invoked by callers building the output list before coin
//! selection ever runs.

use crate::error::TxBuildError;
use crate::types::{
    DustPlan, CIP33_CHUNK_SIZE, MAX_DUST_VALUE, MIN_DUST_VALUE, REDUCED_DUST_THRESHOLD,
};

/// Protocol bounds for per-output dust values.
///
/// Relay-node dust policy can change, so the bounds are configurable
/// rather than hard-coded into the validation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DustLimits {
    /// Smallest accepted per-output value in satoshis
    pub min: u64,
    /// Largest accepted per-output value in satoshis
    pub max: u64,
    /// Values below this are flagged as reduced-dust / relay-risk
    pub reduced_threshold: u64,
}

impl Default for DustLimits {
    fn default() -> Self {
        Self {
            min: MIN_DUST_VALUE,
            max: MAX_DUST_VALUE,
            reduced_threshold: REDUCED_DUST_THRESHOLD,
        }
    }
}

/// Outcome of validating a per-output dust value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DustAssessment {
    /// The validated per-output value in satoshis
    pub value: u64,
    /// True when the value sits below the reduced-dust threshold.
    /// Callers must surface this to the user; such outputs risk
    /// non-standard treatment by relay nodes.
    pub reduced_dust: bool,
}

/// Number of 32-byte chunks needed to carry `payload_bytes` of data.
///
/// Zero bytes need zero chunks.
pub fn chunk_count(payload_bytes: u32) -> u32 {
    payload_bytes.div_ceil(CIP33_CHUNK_SIZE)
}

/// Total satoshis locked when `chunks` outputs each carry `dust_per_chunk`.
pub fn total_dust(chunks: u32, dust_per_chunk: u64) -> u64 {
    chunks as u64 * dust_per_chunk
}

/// Validate a per-output dust value against the default protocol bounds.
pub fn validate_dust(value: u64) -> Result<DustAssessment, TxBuildError> {
    validate_dust_with_limits(value, &DustLimits::default())
}

/// Validate a per-output dust value against explicit bounds.
pub fn validate_dust_with_limits(
    value: u64,
    limits: &DustLimits,
) -> Result<DustAssessment, TxBuildError> {
    if value < limits.min {
        return Err(TxBuildError::InvalidDustValue(format!(
            "dust value must be at least {} satoshi",
            limits.min
        )));
    }
    if value > limits.max {
        return Err(TxBuildError::InvalidDustValue(format!(
            "dust value cannot exceed {} satoshis",
            limits.max
        )));
    }
    Ok(DustAssessment {
        value,
        reduced_dust: value < limits.reduced_threshold,
    })
}

/// Plan the dust outputs for a payload using default bounds.
pub fn plan(payload_bytes: u32, dust_per_output: u64) -> Result<DustPlan, TxBuildError> {
    plan_with_limits(payload_bytes, dust_per_output, &DustLimits::default())
}

/// Plan the dust outputs for a payload using explicit bounds.
///
/// An empty payload yields a zero-chunk, zero-dust plan; the dust value
/// is still validated so a bad parameter never passes silently.
pub fn plan_with_limits(
    payload_bytes: u32,
    dust_per_output: u64,
    limits: &DustLimits,
) -> Result<DustPlan, TxBuildError> {
    let assessment = validate_dust_with_limits(dust_per_output, limits)?;
    if assessment.reduced_dust {
        log::warn!(
            "dust value {} is below the reduced-dust threshold {}; outputs may be treated as non-standard",
            dust_per_output,
            limits.reduced_threshold
        );
    }
    let chunks = chunk_count(payload_bytes);
    Ok(DustPlan {
        chunk_count: chunks,
        dust_per_chunk: dust_per_output,
        total_dust: total_dust(chunks, dust_per_output),
    })
}
