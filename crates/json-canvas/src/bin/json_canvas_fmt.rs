//! `json-canvas-fmt` — round-trip a JSON document through the node-tree
//! codec and print it back, pretty (default) or compact.
//!
//! Usage:
//!   json-canvas-fmt [--compact]
//!
//! The document is read from stdin.

use std::io::{self, Read, Write};

use json_canvas::codec::{parse, serialize_with, SerializeOptions};

fn main() {
    tracing_subscriber::fmt::init();

    let compact = std::env::args().any(|a| a == "--compact");

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let collection = match parse(buf.trim()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match serialize_with(&collection, &SerializeOptions { compact }) {
        Ok(text) => {
            io::stdout().write_all(text.as_bytes()).unwrap();
            io::stdout().write_all(b"\n").unwrap();
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
