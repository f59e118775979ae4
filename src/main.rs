//! Binary front end for the S-box gate-network synthesizer

mod cmd;

use clap::Parser;

#[doc(hidden)]
fn main() {
    env_logger::init();
    let cli = cmd::Cli::parse();

    match cli.command {
        cmd::Commands::Synthesize(a) => a.run(),
        cmd::Commands::Resume(a) => a.run(),
        cmd::Commands::Show(a) => a.run(),
        cmd::Commands::Dot(a) => a.run(),
    }
}
