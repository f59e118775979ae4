//! Heuristic synthesis of small boolean-gate networks for 8-bit S-boxes.
//!
//! Given an 8-bit S-box, searches for a small network of And/Or/Xor/Not gates
//! computing each output bit, reusing gates across outputs and falling back to
//! a Shannon expansion when nothing already built can be combined into the
//! target. The approach follows Kwan's "sboxgates": depth-first reuse search
//! first, recursive multiplexer-based splitting only when reuse fails.

pub mod construct;
pub mod dot;
pub mod driver;
pub mod gate;
pub mod io;
pub mod sbox;
pub mod state;
pub mod synth;
pub mod target;
pub mod truth_table;
