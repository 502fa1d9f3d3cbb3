//! `json-canvas-check` — parse a JSON document, run the structural
//! validator and the editor-safety size audit, and print a report.
//!
//! Usage:
//!   json-canvas-check
//!
//! The document is read from stdin. Exits non-zero on parse failure or
//! structural violations.

use std::io::{self, Read};

use json_canvas::codec::{audit, parse};
use json_canvas::tree::validate_structure;

fn main() {
    tracing_subscriber::fmt::init();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let value = match serde_json::from_str(buf.trim()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("invalid JSON: {e}");
            std::process::exit(1);
        }
    };
    let collection = match parse(buf.trim()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let violations = validate_structure(&collection);
    let warnings = audit(&value);

    println!("nodes: {}", collection.len());
    println!("violations: {}", violations.len());
    for violation in &violations {
        println!("  {violation}");
    }
    println!("warnings: {}", warnings.len());
    for warning in &warnings {
        println!("  {warning}");
    }

    if !violations.is_empty() {
        std::process::exit(1);
    }
}
