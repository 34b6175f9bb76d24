//! # trellis
//!
//! Command-line runner for Trellis graph pipelines.
//!
//! - `config`: TOML pipeline description and the binary's error type
//! - `cli`: clap command tree and command implementations

pub mod cli;
pub mod config;
