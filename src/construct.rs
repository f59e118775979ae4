//! Typed gate constructors
//!
//! Each constructor derives the child truth table from its parents' tables and
//! calls [`State::append`](crate::state::State). [`GateIndex::NIL`] on any input
//! propagates to a `NIL` result without appending anything, so composite
//! constructors can be built out of simpler ones without checking every step
//! (see SPEC_FULL.md §9, "Null propagation vs result types").

use crate::gate::{GateIndex, GateKind};
use crate::state::State;

/// ¬a
pub fn not(state: &mut State, a: GateIndex) -> GateIndex {
    if a.is_nil() {
        return GateIndex::NIL;
    }
    let t = !state.gate_table(a);
    state.append(GateKind::Not, t, a, GateIndex::NIL)
}

/// a ∧ b
pub fn and(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    if a.is_nil() || b.is_nil() {
        return GateIndex::NIL;
    }
    let t = state.gate_table(a) & state.gate_table(b);
    state.append(GateKind::And, t, a, b)
}

/// a ∨ b
pub fn or(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    if a.is_nil() || b.is_nil() {
        return GateIndex::NIL;
    }
    let t = state.gate_table(a) | state.gate_table(b);
    state.append(GateKind::Or, t, a, b)
}

/// a ⊕ b
pub fn xor(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    if a.is_nil() || b.is_nil() {
        return GateIndex::NIL;
    }
    let t = state.gate_table(a) ^ state.gate_table(b);
    state.append(GateKind::Xor, t, a, b)
}

/// ¬(a ∧ b)
pub fn nand(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    let g = and(state, a, b);
    not(state, g)
}

/// ¬(a ∨ b)
pub fn nor(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    let g = or(state, a, b);
    not(state, g)
}

/// ¬(a ⊕ b)
pub fn xnor(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    let g = xor(state, a, b);
    not(state, g)
}

/// (¬a) ∧ b
pub fn and_not(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    let na = not(state, a);
    and(state, na, b)
}

/// (¬a) ∨ b
pub fn or_not(state: &mut State, a: GateIndex, b: GateIndex) -> GateIndex {
    let na = not(state, a);
    or(state, na, b)
}

/// a ∧ b ∧ c
pub fn and_3(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = and(state, a, b);
    and(state, ab, c)
}

/// a ∨ b ∨ c
pub fn or_3(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = or(state, a, b);
    or(state, ab, c)
}

/// a ⊕ b ⊕ c
pub fn xor_3(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = xor(state, a, b);
    xor(state, ab, c)
}

/// (a ∧ b) ∨ c
pub fn and_or(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = and(state, a, b);
    or(state, ab, c)
}

/// (a ∧ b) ⊕ c
pub fn and_xor(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = and(state, a, b);
    xor(state, ab, c)
}

/// (a ∨ b) ∧ c
pub fn or_and(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = or(state, a, b);
    and(state, ab, c)
}

/// (a ∨ b) ⊕ c
pub fn or_xor(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = or(state, a, b);
    xor(state, ab, c)
}

/// (a ⊕ b) ∧ c
pub fn xor_and(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = xor(state, a, b);
    and(state, ab, c)
}

/// (a ⊕ b) ∨ c
pub fn xor_or(state: &mut State, a: GateIndex, b: GateIndex, c: GateIndex) -> GateIndex {
    let ab = xor(state, a, b);
    or(state, ab, c)
}
