//! Credit Summary CLI
//!
//! Reads a JSON account document and prints the account summary.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- account.json
//! cat account.json | cargo run -- -
//! ```
//!
//! # Exit Codes
//!
//! - `0`: summary printed to stdout
//! - `1`: missing argument or unreadable input (message on stderr)
//! - `2`: the events could not be summarized (`Error: <message>` on stdout)
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use credit_summary::{build_summary, AccountDocument, Result, SummaryError};
use std::env;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::process;

fn main() {
    env_logger::init();

    let reader = match open_input() {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match AccountDocument::from_reader(reader).and_then(build_summary) {
        Ok(summary) => println!("{}", summary),
        Err(e) => {
            println!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn open_input() -> Result<Box<dyn Read>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(SummaryError::MissingArgument);
    }

    let input_path = &args[1];
    if input_path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(input_path)?;
    Ok(Box::new(BufReader::new(file)))
}
