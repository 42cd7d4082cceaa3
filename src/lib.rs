//! clihost: a host for command-line applications
//!
//! Resolves the active environment, loads layered settings, dispatches the
//! verb on the command line to a registered handler, and turns the way that
//! handler ended into the process exit code.

pub mod application;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
