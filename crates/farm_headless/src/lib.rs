//! # Farm Headless
//!
//! Headless farm runner. Runs the simulation without graphics, controlled
//! via JSON commands on stdin or a RON script, with responses on stdout.
//! This enables:
//! - Automated playtesting of data files
//! - Determinism verification in CI
//! - Reproducing bug reports as scripts
//!
//! ## Protocol
//!
//! - **stdin**: Commands from the controller (wait, move, interact, etc.)
//! - **stdout**: Responses and state (JSON lines)
//! - **stderr**: Logs
//!
//! See [`protocol`] for the message formats.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod loader;
pub mod protocol;
pub mod runner;
pub mod script;

pub use loader::{LoadError, World, WorldPaths};
pub use protocol::{Command, EntityRef, Response};
pub use runner::HeadlessRunner;
pub use script::Script;
