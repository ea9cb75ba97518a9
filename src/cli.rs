//! Command line interface for the spamsift binary.

pub mod args;
pub mod commands;
pub mod output;
