//! Chainlink round fixture generator.
//!
//! Configuration and output handling for the `chainlink-fixtures` binary.
//! Round collection itself lives in [`chainlink_rounds`].

pub mod config;
pub mod output;
