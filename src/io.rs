//! Reading and writing [`State`](crate::state::State) snapshots to disk

mod state_file;

pub use state_file::{load, save, MAX_GATES};
