//! Drives per-output synthesis against an S-box, sequentially or in parallel
//!
//! Grounded on the teacher's `OptArgs::run` effort loop (`cmd.rs`): repeated
//! passes over the same mutable network until nothing more can be improved.
//! The parallel path has no direct teacher precedent in this crate; its
//! `rayon` usage follows the pattern used across the wider example pack for
//! racing independent candidate computations against a shared, shrinking
//! budget.

use std::path::Path;
use std::sync::Mutex;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::io::state_file;
use crate::state::{State, NB_INPUTS};
use crate::synth::synthesize;
use crate::target::generate_target;
use crate::truth_table::TruthTable;

/// Stack reserved for each synthesis task (§5): phase-5 recursion combined with
/// phase-4's O(n^3) scans on long gate lists can run deep.
const SYNTHESIS_STACK_SIZE: usize = 2 * 1024 * 1024;

fn unsolved_slots(state: &State) -> Vec<usize> {
    (0..NB_INPUTS).filter(|&s| state.output(s).is_nil()).collect()
}

/// `<output>-<gates>-<outs>.state`, per SPEC_FULL.md §6: one snapshot file per
/// solved output, never overwriting an earlier one.
fn snapshot_filename(slot: usize, state: &State) -> String {
    let outs = NB_INPUTS - state.num_unsolved_outputs();
    format!("{slot}-{}-{outs}.state", state.num_gates())
}

/// Persist `state` into `dir` (if given) as a new, uniquely named snapshot for
/// the output just solved at `slot`.
fn persist(dir: Option<&Path>, slot: usize, state: &State) {
    if let Some(dir) = dir {
        let path = dir.join(snapshot_filename(slot, state));
        if let Err(e) = state_file::save(&path, state) {
            warn!("failed to persist state to {}: {e}", path.display());
        }
    }
}

/// Try to realize a single output slot, on its own thread with the stack §5 requires
fn synthesize_slot(seed: &State, sbox: &[u8; 256], slot: usize) -> Option<State> {
    let mut trial = seed.snapshot();
    let target = generate_target(sbox, slot, true);
    let mask = TruthTable::one();

    let handle = std::thread::Builder::new()
        .stack_size(SYNTHESIS_STACK_SIZE)
        .spawn(move || {
            let g = synthesize(&mut trial, target, mask, &[]);
            (trial, g)
        })
        .expect("failed to spawn synthesis thread");
    let (mut trial, g) = handle.join().expect("synthesis thread panicked");

    if g.is_nil() {
        return None;
    }
    trial.set_output(slot, g);
    Some(trial)
}

/// Solve every unsolved output of `seed` one at a time, lowering `max_gates`
/// after each success and, if `persist_dir` is given, writing a new
/// `<output>-<gates>-<outs>.state` snapshot into it after each one (§4.F, §6)
///
/// `on_output`, if given, is called once per output slot attempted (whether or
/// not it was solved) so a caller can drive a progress indicator.
pub fn run_sequential(
    seed: State,
    sbox: &[u8; 256],
    persist_dir: Option<&Path>,
    mut on_output: Option<&mut dyn FnMut()>,
) -> State {
    let mut state = seed;
    for slot in unsolved_slots(&state) {
        info!("output {slot}: starting synthesis ({} gates so far)", state.num_gates());
        match synthesize_slot(&state, sbox, slot) {
            None => info!("output {slot}: no solution within {} gates", state.max_gates()),
            Some(trial) => {
                state = trial;
                if (state.num_gates() as u64) < state.max_gates() {
                    state.set_max_gates(state.num_gates() as u64);
                }
                info!("output {slot}: solved with {} total gates", state.num_gates());
                persist(persist_dir, slot, &state);
            }
        }
        if let Some(cb) = on_output.as_mut() {
            cb();
        }
    }
    state
}

/// Race every unsolved output concurrently on a `rayon` pool, keeping only the
/// cheapest winner of each wave (§5)
///
/// `jobs`, if given, sizes the pool explicitly; otherwise `rayon` sizes it to
/// the number of logical CPUs. `on_output`, if given, is called once per wave
/// (whether or not it produced a winner) so a caller can drive a progress
/// indicator. If `persist_dir` is given, each wave's winner is written as a new
/// `<output>-<gates>-<outs>.state` snapshot into it (§6).
pub fn run_parallel(
    seed: State,
    sbox: &[u8; 256],
    jobs: Option<usize>,
    persist_dir: Option<&Path>,
    mut on_output: Option<&mut dyn FnMut()>,
) -> State {
    let mut builder = rayon::ThreadPoolBuilder::new().stack_size(SYNTHESIS_STACK_SIZE);
    if let Some(n) = jobs {
        builder = builder.num_threads(n);
    }
    let pool = builder.build().expect("failed to build rayon thread pool");

    let mut state = seed;
    loop {
        let slots = unsolved_slots(&state);
        if slots.is_empty() {
            break;
        }

        let ceiling = Mutex::new(state.max_gates());
        let winner = pool.install(|| {
            slots
                .par_iter()
                .filter_map(|&slot| {
                    let budget = *ceiling.lock().unwrap();
                    let mut candidate_seed = state.snapshot();
                    candidate_seed.set_max_gates(budget);
                    debug!("output {slot}: dispatched with ceiling {budget}");
                    let trial = synthesize_slot(&candidate_seed, sbox, slot)?;
                    let total = trial.num_gates() as u64;

                    let mut ceil = ceiling.lock().unwrap();
                    if total >= *ceil {
                        debug!("output {slot}: discarded, {total} gates no longer beats ceiling {}", *ceil);
                        return None;
                    }
                    *ceil = total;
                    Some((slot, total, trial))
                })
                .min_by_key(|(_, total, _)| *total)
        });

        match winner {
            None => {
                info!("no output improved this wave; stopping");
                break;
            }
            Some((slot, total, trial)) => {
                state = trial;
                if total < state.max_gates() {
                    state.set_max_gates(total);
                }
                info!("output {slot}: solved with {total} total gates");
                persist(persist_dir, slot, &state);
            }
        }
        if let Some(cb) = on_output.as_mut() {
            cb();
        }
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbox::identity;

    #[test]
    fn test_sequential_solves_identity() {
        let state = State::new(500);
        let mut ticks = 0;
        let solved = run_sequential(state, &identity(), None, Some(&mut || ticks += 1));
        assert_eq!(solved.num_unsolved_outputs(), 0);
        assert_eq!(ticks, 8);
        for slot in 0..8 {
            let target = generate_target(&identity(), slot, true);
            assert!(solved.gate_table(solved.output(slot)).equals(&target));
        }
    }

    #[test]
    fn test_parallel_solves_identity() {
        let state = State::new(500);
        let solved = run_parallel(state, &identity(), Some(2), None, None);
        assert_eq!(solved.num_unsolved_outputs(), 0);
        for slot in 0..8 {
            let target = generate_target(&identity(), slot, true);
            assert!(solved.gate_table(solved.output(slot)).equals(&target));
        }
    }

    #[test]
    fn test_sequential_persists_one_named_snapshot_per_output() {
        let dir = tempfile::tempdir().unwrap();
        let state = State::new(500);
        let solved = run_sequential(state, &identity(), Some(dir.path()), None);
        assert_eq!(solved.num_unsolved_outputs(), 0);

        let mut entries: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        entries.sort();
        assert_eq!(entries.len(), 8, "one snapshot per solved output, none overwritten");
        for (slot, name) in entries.iter().enumerate() {
            assert!(
                name.starts_with(&format!("{slot}-")),
                "{name} should be named <output>-<gates>-<outs>.state"
            );
            assert!(name.ends_with(".state"));
        }
    }

    #[test]
    fn test_sequential_resumes_partial_state() {
        let mut state = State::new(500);
        let target0 = generate_target(&identity(), 0, true);
        let g = crate::synth::synthesize(&mut state, target0, TruthTable::one(), &[]);
        state.set_output(0, g);

        let solved = run_sequential(state, &identity(), None, None);
        assert_eq!(solved.num_unsolved_outputs(), 0);
    }
}
