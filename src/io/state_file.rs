//! Binary persistence for a [`State`](crate::state::State) (§6)
//!
//! A fixed-size record: `max_gates`, `num_gates`, the eight `outputs`, then
//! exactly [`MAX_GATES`] gate records (kind, 256-bit table, two input
//! indices), all little-endian. Unused trailing gate slots are zero-filled.
//! Ordinary filesystem problems surface as [`io::Error`]; a record whose
//! indices don't fit the topological invariants of §3 is a programming
//! defect and panics once read, mirroring the split in SPEC_FULL.md §7.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::gate::{Gate, GateIndex, GateKind};
use crate::state::State;
use crate::truth_table::TruthTable;

/// Number of gate record slots reserved in the on-disk format
pub const MAX_GATES: usize = 500;

const SENTINEL: u64 = u64::MAX;
const GATE_RECORD_LEN: usize = 8 + 32 + 8 + 8;

fn index_to_disk(i: GateIndex) -> u64 {
    if i.is_nil() {
        SENTINEL
    } else {
        i.index() as u64
    }
}

fn index_from_disk(raw: u64) -> GateIndex {
    if raw == SENTINEL {
        GateIndex::NIL
    } else {
        GateIndex::from_raw(raw.try_into().expect("gate index does not fit in 32 bits"))
    }
}

/// Write `state` to `path` in the format described in SPEC_FULL.md §6
pub fn save(path: &Path, state: &State) -> io::Result<()> {
    assert!(
        state.num_gates() <= MAX_GATES,
        "state has more gates than the persisted format can hold"
    );

    let f = File::create(path)?;
    let mut w = BufWriter::new(f);

    w.write_all(&state.max_gates().to_le_bytes())?;
    w.write_all(&(state.num_gates() as u64).to_le_bytes())?;
    for slot in 0..8 {
        w.write_all(&index_to_disk(state.output(slot)).to_le_bytes())?;
    }

    for i in 0..MAX_GATES {
        if i < state.num_gates() {
            write_gate(&mut w, state.gate(GateIndex::from_raw(i as u32)))?;
        } else {
            w.write_all(&[0u8; GATE_RECORD_LEN])?;
        }
    }

    w.flush()
}

fn write_gate(w: &mut impl Write, gate: &Gate) -> io::Result<()> {
    w.write_all(&(gate.kind.code() as u64).to_le_bytes())?;
    for word in gate.table.words() {
        w.write_all(&word.to_le_bytes())?;
    }
    w.write_all(&index_to_disk(gate.in1).to_le_bytes())?;
    w.write_all(&index_to_disk(gate.in2).to_le_bytes())?;
    Ok(())
}

/// Read a [`State`] from `path`, validating the structural invariants of §3
pub fn load(path: &Path) -> io::Result<State> {
    let f = File::open(path)?;
    let mut r = BufReader::new(f);

    let max_gates = read_u64(&mut r)?;
    let num_gates = read_u64(&mut r)? as usize;
    let mut raw_outputs = [0u64; 8];
    for slot in raw_outputs.iter_mut() {
        *slot = read_u64(&mut r)?;
    }

    assert!(
        num_gates <= MAX_GATES,
        "corrupt record: num_gates {num_gates} exceeds the persisted capacity"
    );

    let mut gates = Vec::with_capacity(num_gates);
    for i in 0..MAX_GATES {
        let gate = read_gate(&mut r)?;
        if i < num_gates {
            gates.push(gate);
        }
    }

    let mut state = State::from_parts(max_gates, gates);
    for (slot, raw) in raw_outputs.iter().enumerate() {
        let idx = index_from_disk(*raw);
        if !idx.is_nil() {
            state.set_output(slot, idx);
        }
    }
    state.check();
    Ok(state)
}

fn read_u64(r: &mut impl Read) -> io::Result<u64> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_gate(r: &mut impl Read) -> io::Result<Gate> {
    let kind_code = read_u64(r)?;
    let kind = GateKind::from_code(kind_code.try_into().expect("corrupt record: gate kind code out of range"));
    let mut words = [0u64; 4];
    for word in words.iter_mut() {
        *word = read_u64(r)?;
    }
    let in1 = index_from_disk(read_u64(r)?);
    let in2 = index_from_disk(read_u64(r)?);
    Ok(Gate {
        kind,
        table: TruthTable::from_words(words),
        in1,
        in2,
    })
}
