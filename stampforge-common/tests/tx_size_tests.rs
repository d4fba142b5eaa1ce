use stampforge_common::tx_size::{estimate_size, input_vbytes, weight_to_vsize};
use stampforge_common::types::{ScriptKind, TxInputSpec, TxOutputSpec};

#[test]
fn test_input_vbyte_table() {
    assert_eq!(input_vbytes(ScriptKind::P2pkh), 148);
    assert_eq!(input_vbytes(ScriptKind::P2sh), 91);
    assert_eq!(input_vbytes(ScriptKind::P2wpkh), 68);
    assert_eq!(input_vbytes(ScriptKind::P2wsh), 104);
    assert_eq!(input_vbytes(ScriptKind::P2tr), 58);
}

#[test]
fn test_output_size_table() {
    assert_eq!(ScriptKind::P2pkh.output_size(), 34);
    assert_eq!(ScriptKind::P2sh.output_size(), 32);
    assert_eq!(ScriptKind::P2wpkh.output_size(), 31);
    assert_eq!(ScriptKind::P2wsh.output_size(), 43);
    assert_eq!(ScriptKind::P2tr.output_size(), 43);
}

#[test]
fn test_legacy_transaction_has_no_marker_flag() {
    let inputs = [TxInputSpec::new(ScriptKind::P2pkh)];
    let outputs = [TxOutputSpec::new(ScriptKind::P2pkh, 10_000)];
    let estimate = estimate_size(&inputs, &outputs, false, ScriptKind::P2wpkh);

    // 8 bytes overhead + 148-byte input + 34-byte output, all x4
    assert_eq!(estimate.weight, (8 + 148 + 34) * 4);
    assert_eq!(estimate.vbytes, 190);
}

#[test]
fn test_segwit_transaction_carries_marker_flag_once() {
    let one_input = [TxInputSpec::new(ScriptKind::P2wpkh)];
    let two_inputs = [
        TxInputSpec::new(ScriptKind::P2wpkh),
        TxInputSpec::new(ScriptKind::P2wpkh),
    ];
    let outputs = [TxOutputSpec::new(ScriptKind::P2wpkh, 10_000)];

    let single = estimate_size(&one_input, &outputs, false, ScriptKind::P2wpkh);
    let double = estimate_size(&two_inputs, &outputs, false, ScriptKind::P2wpkh);

    // (8 + 2) bytes overhead x4, input base 41 x4 plus 107 witness, output 31 x4
    assert_eq!(single.weight, 40 + 271 + 124);
    // Adding a second witness input adds only that input's weight
    assert_eq!(double.weight, single.weight + 271);
}

#[test]
fn test_witness_discount_applies_to_inputs_not_outputs() {
    let wpkh_in = [TxInputSpec::new(ScriptKind::P2wpkh)];
    let pkh_in = [TxInputSpec::new(ScriptKind::P2pkh)];
    let outputs = [TxOutputSpec::new(ScriptKind::P2wsh, 333)];

    let segwit = estimate_size(&wpkh_in, &outputs, false, ScriptKind::P2wpkh);
    let legacy = estimate_size(&pkh_in, &outputs, false, ScriptKind::P2wpkh);

    // A p2wpkh spend is far lighter than a p2pkh spend despite the marker
    assert!(segwit.vbytes < legacy.vbytes);

    // The p2wsh output costs its full 43 bytes x4 in both
    let no_out_segwit = estimate_size(&wpkh_in, &[], false, ScriptKind::P2wpkh);
    assert_eq!(segwit.weight - no_out_segwit.weight, 43 * 4);
}

#[test]
fn test_change_output_adds_its_kind_weight() {
    let inputs = [TxInputSpec::new(ScriptKind::P2wpkh)];
    let outputs = [TxOutputSpec::new(ScriptKind::P2wpkh, 5_000)];

    let without = estimate_size(&inputs, &outputs, false, ScriptKind::P2wpkh);
    let with_wpkh = estimate_size(&inputs, &outputs, true, ScriptKind::P2wpkh);
    let with_tr = estimate_size(&inputs, &outputs, true, ScriptKind::P2tr);

    assert_eq!(with_wpkh.weight - without.weight, 31 * 4);
    assert_eq!(with_tr.weight - without.weight, 43 * 4);
}

#[test]
fn test_vbytes_is_weight_rounded_up() {
    let inputs = [TxInputSpec::new(ScriptKind::P2tr)];
    let outputs = [TxOutputSpec::new(ScriptKind::P2tr, 546)];
    let estimate = estimate_size(&inputs, &outputs, false, ScriptKind::P2wpkh);

    assert_eq!(estimate.vbytes, (estimate.weight + 3) / 4);

    assert_eq!(weight_to_vsize(559), 140);
    assert_eq!(weight_to_vsize(560), 140);
    assert_eq!(weight_to_vsize(561), 141);
    assert_eq!(weight_to_vsize(0), 0);
}

#[test]
fn test_estimate_is_pure() {
    let inputs = [
        TxInputSpec::new(ScriptKind::P2wpkh),
        TxInputSpec::new(ScriptKind::P2pkh),
    ];
    let outputs = [
        TxOutputSpec::new(ScriptKind::P2wsh, 333),
        TxOutputSpec::new(ScriptKind::P2wpkh, 9_000),
    ];
    let first = estimate_size(&inputs, &outputs, true, ScriptKind::P2wpkh);
    let second = estimate_size(&inputs, &outputs, true, ScriptKind::P2wpkh);
    assert_eq!(first, second);
}

#[test]
fn test_empty_transaction_is_overhead_only() {
    let estimate = estimate_size(&[], &[], false, ScriptKind::P2wpkh);
    assert_eq!(estimate.weight, 32);
    assert_eq!(estimate.vbytes, 8);
}
