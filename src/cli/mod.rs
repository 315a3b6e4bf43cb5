//! Command-line surface of the `snapcat` binary

pub mod args;
pub mod output;
