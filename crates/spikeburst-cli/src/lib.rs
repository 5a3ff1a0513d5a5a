//! spikeburst CLI crate
//!
//! Purpose:
//! - Provide the command-line front end to `spikeburst-core`: reading recordings,
//!   resolving configuration, and rendering JSON reports.
//! - Expose command modules as a library so integration tests and downstream
//!   automation can drive them without spawning a process.
//!
//! Major commands (see [commands]):
//! - encode: `time,amplitude` signal CSVs → up/down spike trains (JSON), optionally a
//!   merged `time,channel` events CSV ready for burst detection.
//! - bursts: `time,channel` events CSV (or a directory of them) → channel and/or
//!   network bursts (JSON).
//! - sweep: grid-search burst parameters against expected burst times.
//! - init: write a default spikeburst.toml.
//! - completions: shell completion scripts.
//!
//! Notes:
//! - The binary (src/main.rs) wires up logging and argument parsing, calling
//!   SpikeburstCli::execute().
//! - Logs go to stderr so reports written to stdout stay machine-readable.

pub mod commands;
pub mod config;
pub mod error;
pub mod io;

pub use commands::SpikeburstCli;
