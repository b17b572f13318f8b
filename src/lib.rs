//! Roster sweep: find workers who have gone unpaid past their hire window,
//! revoke their Drive file access, and relocate their roster rows to the
//! archive section of the sheet.

pub mod config;
pub mod error;
pub mod google_api;
pub mod mutate;
pub mod revoke;
pub mod roster;
pub mod sweep;

#[cfg(test)]
mod testing;

pub use config::SweepConfig;
pub use error::SweepError;
pub use sweep::{run_sweep, Sweep, SweepPhase, SweepSummary};
