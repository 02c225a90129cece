//! chainrestore - restore files from a chain of full and differential backups
//!
//! A chain is one full archive followed by differential archives. For each
//! path, the newest archive that saved it wins; `Unchanged` records point
//! further back, and a removal always stops the search: it is reported, or
//! treated as not found.

pub mod catalog;
pub mod chain;
pub mod cli;
pub mod observability;
pub mod resolver;
pub mod restore;
