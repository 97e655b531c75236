//! tabload CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Installs the log subscriber
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Reports errors as a JSON error response
//! 4. Exits 1 on error, 2 on a negative outcome (findings, rollback,
//!    inconsistency)

use tabload::{cli, observability};

fn main() {
    observability::init();

    match cli::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            if cli::write_error(e.code(), e.message()).is_err() {
                eprintln!("{}", e);
            }
            std::process::exit(1);
        }
    }
}
