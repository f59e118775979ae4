//! Builds the truth table to synthesize from an S-box lookup table
//!
//! Grounded on the teacher's small, pure generator functions in
//! `network/generators.rs`.

use crate::truth_table::TruthTable;

/// The target truth table for output bit `bit` of `sbox`, or (if `sbox` is
/// `false`) simply the truth table of input variable `bit` — useful as a
/// reference when testing the synthesizer in isolation from any real S-box.
pub fn generate_target(table: &[u8; 256], bit: usize, sbox: bool) -> TruthTable {
    assert!(bit < 8, "output bit {bit} out of range");
    if sbox {
        TruthTable::from_fn(|i| (table[i as usize] >> bit) & 1 != 0)
    } else {
        TruthTable::from_fn(|i| (i >> bit) & 1 != 0)
    }
}
