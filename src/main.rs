//! chainrestore CLI entry point
//!
//! Parses arguments and dispatches through `cli::run`. The JSON response
//! (success or error) is already on stdout; the error is repeated on stderr
//! and the process exits non-zero.

use chainrestore::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
