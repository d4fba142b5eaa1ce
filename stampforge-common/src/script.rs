//! Script and address classification
//!
//! Maps a scriptPubKey hex string or an address string to one of the
//! supported [`ScriptKind`]s. Matching is structural: script templates
//! are recognized by prefix and length, addresses by encoding prefix and
//! length band. Bech32 checksums are not verified here; this module
//! decides which byte table applies, it does not validate payability.
//!
//! Classification never defaults. An unrecognized input is an error the
//! caller must handle, because fee math on a guessed script kind is a
//! correctness bug, not a fallback.

use crate::error::TxBuildError;
use crate::types::ScriptKind;
use bitcoin::address::NetworkUnchecked;
use bitcoin::{Address, Network};
use std::str::FromStr;

/// Classify an address or a scriptPubKey hex string.
///
/// Even-length strings of pure hex are treated as scripts; everything
/// else is treated as an address.
pub fn classify(input: &str) -> Result<ScriptKind, TxBuildError> {
    if looks_like_hex(input) {
        classify_script(input)
    } else {
        classify_address(input)
    }
}

/// Classify a scriptPubKey given as a hex string.
pub fn classify_script(script: &str) -> Result<ScriptKind, TxBuildError> {
    let script = script.to_lowercase();
    if !looks_like_hex(&script) {
        return Err(TxBuildError::UnrecognizedScript(script));
    }

    // Canonical templates: OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG,
    // OP_HASH160 <20> OP_EQUAL, OP_0 <20>, OP_0 <32>, OP_1 <32>.
    if script.len() == 50 && script.starts_with("76a914") && script.ends_with("88ac") {
        return Ok(ScriptKind::P2pkh);
    }
    if script.len() == 46 && script.starts_with("a914") && script.ends_with("87") {
        return Ok(ScriptKind::P2sh);
    }
    if script.len() == 44 && script.starts_with("0014") {
        return Ok(ScriptKind::P2wpkh);
    }
    if script.len() == 68 && script.starts_with("0020") {
        return Ok(ScriptKind::P2wsh);
    }
    if script.len() == 68 && script.starts_with("5120") {
        return Ok(ScriptKind::P2tr);
    }

    Err(TxBuildError::UnrecognizedScript(script))
}

/// Classify a mainnet address by its structural encoding.
pub fn classify_address(address: &str) -> Result<ScriptKind, TxBuildError> {
    if address.starts_with('1') && is_base58_body(address) && (26..=35).contains(&address.len()) {
        return Ok(ScriptKind::P2pkh);
    }
    if address.starts_with('3') && is_base58_body(address) && (26..=35).contains(&address.len()) {
        return Ok(ScriptKind::P2sh);
    }
    if address.starts_with("bc1q") && is_bech32_body(&address[4..]) {
        if (42..=61).contains(&address.len()) {
            return Ok(ScriptKind::P2wpkh);
        }
        if address.len() == 62 {
            return Ok(ScriptKind::P2wsh);
        }
    }
    if address.starts_with("bc1p") && is_bech32_body(&address[4..]) && address.len() == 62 {
        return Ok(ScriptKind::P2tr);
    }

    Err(TxBuildError::UnrecognizedScript(address.to_string()))
}

/// Check whether a hex string looks like one of the supported
/// scriptPubKey templates. Used by the gateway to decide whether a
/// provider-supplied script can be trusted.
pub fn is_valid_script_hex(script: &str) -> bool {
    classify_script(script).is_ok()
}

/// Construct the scriptPubKey hex for an address.
///
/// Providers that list UTXOs without scripts (the esplora address
/// endpoints) still identify the owning address; the script is fully
/// determined by it. This goes through `bitcoin::Address`, so unlike
/// [`classify_address`] it does verify the checksum.
pub fn script_from_address(address: &str) -> Result<String, TxBuildError> {
    let unchecked = Address::<NetworkUnchecked>::from_str(address)
        .map_err(|e| TxBuildError::UnrecognizedScript(format!("{}: {}", address, e)))?;
    if unchecked.network != Network::Bitcoin {
        return Err(TxBuildError::UnrecognizedScript(format!(
            "{}: not a mainnet address",
            address
        )));
    }
    let script = unchecked.assume_checked().script_pubkey();
    Ok(hex::encode(script.as_bytes()))
}

/// Reverse the byte order of a hex string.
///
/// Some legacy providers report txids in wire (little-endian) order;
/// display order is byte-reversed. Odd-length input is zero-padded first.
pub fn reverse_endian(hex_str: &str) -> String {
    let padded;
    let s = if hex_str.len() % 2 != 0 {
        padded = format!("0{}", hex_str);
        &padded
    } else {
        hex_str
    };
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    for i in (0..bytes.len()).step_by(2).rev() {
        out.push(bytes[i] as char);
        out.push(bytes[i + 1] as char);
    }
    out
}

fn looks_like_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_base58_body(s: &str) -> bool {
    // Base58 excludes 0, O, I and l
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() && !matches!(c, '0' | 'O' | 'I' | 'l'))
}

fn is_bech32_body(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
