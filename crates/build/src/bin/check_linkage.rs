//! Program linkage checker
//!
//! This binary compiles every program of a manifest, checking that each vertex
//! stage links with its fragment stage through an interchange record, and dumps
//! the compiled programs as JSON to stdout.

use std::env;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <programs.yaml>", args[0]);
        eprintln!("Checks stage linkage of every program and dumps the compiled result to stdout");
        process::exit(1);
    }

    let manifest_path = &args[1];

    // Check if the manifest file exists
    if !Path::new(manifest_path).exists() {
        eprintln!("Error: Manifest file '{manifest_path}' does not exist");
        process::exit(1);
    }

    match vertex_interchange_build::compile_manifest_file(manifest_path, false) {
        Ok(programs) => match serde_json::to_string_pretty(&programs) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing programs: {e}");
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Error compiling manifest '{manifest_path}': {e}");
            process::exit(1);
        }
    }
}
