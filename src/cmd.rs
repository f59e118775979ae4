//! Command line interface

use std::fs;
use std::path::PathBuf;
use std::process::exit;

use clap::{Args, Parser, Subcommand};
use kdam::{Bar, BarExt};

use sboxgates::dot::to_dot;
use sboxgates::driver;
use sboxgates::io;
use sboxgates::sbox;
use sboxgates::state::State;

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize a gate network for an S-box from scratch
    Synthesize(SynthesizeArgs),

    /// Resume synthesis from a previously saved state
    Resume(ResumeArgs),

    /// Print gate-count statistics for a saved state
    Show(ShowArgs),

    /// Render a saved state as a Graphviz graph description
    Dot(DotArgs),
}

/// Command arguments for synthesizing from scratch
#[derive(Args)]
pub struct SynthesizeArgs {
    /// Maximum number of gates to allow in the network
    #[arg(long, default_value_t = 500)]
    max_gates: u64,

    /// Named S-box ("identity", "aes") or a path to a file of 256 byte values
    #[arg(long, default_value = "aes")]
    sbox: String,

    /// Number of parallel synthesis jobs; runs sequentially if unset
    #[arg(long)]
    jobs: Option<usize>,

    /// Directory to persist per-output snapshots into, named
    /// "<output>-<gates>-<outs>.state"; defaults to the current directory
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

impl SynthesizeArgs {
    /// Run the `synthesize` subcommand
    pub fn run(&self) {
        let table = resolve_sbox(&self.sbox).unwrap_or_else(|e| fail(&e));
        let state = State::new(self.max_gates);
        let dir = self.output.clone().unwrap_or_else(|| PathBuf::from("."));
        run_and_report(state, &table, self.jobs, &dir);
    }
}

/// Command arguments for resuming synthesis from a saved state
#[derive(Args)]
pub struct ResumeArgs {
    /// Saved state file to resume from
    state_file: PathBuf,

    /// Named S-box ("identity", "aes") or a path to a file of 256 byte values
    #[arg(long, default_value = "aes")]
    sbox: String,

    /// Number of parallel synthesis jobs; runs sequentially if unset
    #[arg(long)]
    jobs: Option<usize>,
}

impl ResumeArgs {
    /// Run the `resume` subcommand
    pub fn run(&self) {
        let table = resolve_sbox(&self.sbox).unwrap_or_else(|e| fail(&e));
        let state = io::load(&self.state_file)
            .unwrap_or_else(|e| fail(&format!("failed to load {}: {e}", self.state_file.display())));
        let dir = match self.state_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        run_and_report(state, &table, self.jobs, &dir);
    }
}

/// Command arguments for printing statistics about a saved state
#[derive(Args)]
pub struct ShowArgs {
    /// Saved state file to inspect
    state_file: PathBuf,
}

impl ShowArgs {
    /// Run the `show` subcommand
    pub fn run(&self) {
        let state = io::load(&self.state_file)
            .unwrap_or_else(|e| fail(&format!("failed to load {}: {e}", self.state_file.display())));
        println!(
            "{} gates total, {} unsolved outputs",
            state.num_gates(),
            state.num_unsolved_outputs()
        );
        for slot in 0..8 {
            let g = state.output(slot);
            if g.is_nil() {
                println!("  output {slot}: unsolved");
            } else {
                println!("  output {slot}: gate {g}");
            }
        }
    }
}

/// Command arguments for rendering a saved state as a graph
#[derive(Args)]
pub struct DotArgs {
    /// Saved state file to render
    state_file: PathBuf,
}

impl DotArgs {
    /// Run the `dot` subcommand
    pub fn run(&self) {
        let state = io::load(&self.state_file)
            .unwrap_or_else(|e| fail(&format!("failed to load {}: {e}", self.state_file.display())));
        print!("{}", to_dot(&state));
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{message}");
    exit(1);
}

/// Resolve the `--sbox` argument: a catalogue name, or a path to a file to parse
fn resolve_sbox(name: &str) -> Result<[u8; 256], String> {
    match name {
        "identity" => Ok(sbox::identity()),
        "aes" => Ok(sbox::aes()),
        path => {
            let contents = fs::read_to_string(path).map_err(|e| format!("failed to read {path}: {e}"))?;
            sbox::parse(&contents)
        }
    }
}

/// Synthesize (or resume) against `table`, persisting a named snapshot per
/// solved output into `dir` (§6), and print the final tally.
fn run_and_report(state: State, table: &[u8; 256], jobs: Option<usize>, dir: &PathBuf) {
    let before_unsolved = state.num_unsolved_outputs();
    let mut pb = Bar::builder()
        .total(before_unsolved)
        .desc("synthesizing outputs")
        .build()
        .expect("failed to build progress bar");

    let mut tick = || {
        let _ = pb.update(1);
    };
    let solved = match jobs {
        Some(n) => driver::run_parallel(state, table, Some(n), Some(dir), Some(&mut tick)),
        None => driver::run_sequential(state, table, Some(dir), Some(&mut tick)),
    };
    eprintln!();
    println!(
        "{} gates total, {} unsolved outputs",
        solved.num_gates(),
        solved.num_unsolved_outputs()
    );
}
