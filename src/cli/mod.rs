//! CLI module for chainrestore
//!
//! Provides command-line interface for:
//! - list: Archives of the chain
//! - resolve: Decision for one path
//! - plan: Decisions for every path
//! - restore: Write a plan into a target directory

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{list, plan, resolve, restore, run, run_command, Config, SourceFormat};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
