use std::env;
use std::fs;
use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: rhythm-tree <input.txt> [output]");
        eprintln!("       rhythm-tree --yaml <input.txt> [output]");
        process::exit(1);
    }

    let mut yaml = false;
    let mut input_path = &args[1];
    let mut output_path: Option<&String> = args.get(2);

    // Parse flags
    if args[1] == "--yaml" {
        yaml = true;
        if args.len() < 3 {
            eprintln!("Usage: rhythm-tree --yaml <input.txt> [output]");
            process::exit(1);
        }
        input_path = &args[2];
        output_path = args.get(3);
    }

    // Read input file
    let source = match fs::read_to_string(input_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", input_path, e);
            process::exit(1);
        }
    };

    let tree = match rhythm_tree::quantize(&source) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Quantization error: {}", e);
            process::exit(1);
        }
    };

    let rendered = if yaml {
        match serde_yaml::to_string(&tree) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error serializing tree: {}", e);
                process::exit(1);
            }
        }
    } else {
        tree.to_pretty_string()
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &rendered) {
                eprintln!("Error writing to '{}': {}", path, e);
                process::exit(1);
            }
            eprintln!("Wrote rhythm tree to {}", path);
        }
        None => {
            print!("{}", rendered);
        }
    }
}
