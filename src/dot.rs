//! Graphviz rendering of a gate network
//!
//! Grounded on the teacher's `Display` impl for `Network` (`network/network.rs`):
//! a straight index-order walk emitting one line per node.

use std::fmt::Write as _;

use crate::gate::GateKind;
use crate::state::State;

/// Render `state` as a Graphviz `digraph` source
///
/// Input gates are ellipses, every other gate a box labelled with its kind.
/// Realized output slots get an extra edge from their gate to an "out"
/// pseudo-node, labelled with the output index. Nil outputs are omitted.
pub fn to_dot(state: &State) -> String {
    let mut out = String::new();
    writeln!(out, "digraph state {{").unwrap();

    for i in 0..state.num_gates() {
        let g = state.gate(crate::gate::GateIndex::from_raw(i as u32));
        let shape = if g.kind == GateKind::Input { "ellipse" } else { "box" };
        writeln!(out, "  g{i} [label=\"{}\", shape={shape}];", g.kind).unwrap();
        if !g.in1.is_nil() {
            writeln!(out, "  g{} -> g{i};", g.in1.index()).unwrap();
        }
        if !g.in2.is_nil() {
            writeln!(out, "  g{} -> g{i};", g.in2.index()).unwrap();
        }
    }

    for (slot, g) in state.outputs().iter().enumerate() {
        if !g.is_nil() {
            writeln!(out, "  g{} -> out{slot} [label=\"{slot}\"];", g.index()).unwrap();
            writeln!(out, "  out{slot} [shape=plaintext];").unwrap();
        }
    }

    writeln!(out, "}}").unwrap();
    out
}
