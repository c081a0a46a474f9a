//! # Stencil CLI
//!
//! Usage:
//!   stencil template.json -o output.pdf
//!   stencil template.json --values filled.json -o output.pdf
//!   stencil --example > starter.json

use std::env;
use std::fs;
use std::io::{self, Read};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_template_json());
        return;
    }

    // Read the template from the first non-flag argument, or stdin.
    let template_json = if args.len() > 1 && !args[1].starts_with('-') {
        match fs::read_to_string(&args[1]) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("✗ Failed to read template file {}: {}", args[1], e);
                std::process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("✗ Failed to read stdin: {}", e);
            std::process::exit(1);
        }
        buf
    };

    let values_json = args
        .windows(2)
        .find(|w| w[0] == "--values")
        .map(|w| match fs::read_to_string(&w[1]) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("✗ Failed to read values file {}: {}", w[1], e);
                std::process::exit(1);
            }
        });

    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    match stencil::fill_and_export(&template_json, values_json.as_deref()) {
        Ok(pdf_bytes) => {
            if let Err(e) = fs::write(&output_path, &pdf_bytes) {
                eprintln!("✗ Failed to write {}: {}", output_path, e);
                std::process::exit(1);
            }
            eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
        }
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn example_template_json() -> &'static str {
    r##"{
  "name": "Project Report",
  "textAreas": [
    {
      "id": "title",
      "x": 60, "y": 48, "width": 480, "height": 40,
      "variableName": "name",
      "type": "variable",
      "page": 1,
      "fontSize": 24,
      "fontWeight": "bold"
    },
    {
      "id": "issued",
      "x": 60, "y": 96, "width": 200, "height": 24,
      "variableName": "variable_2",
      "type": "date",
      "page": 1,
      "fontSize": 14,
      "fontWeight": "normal"
    },
    {
      "id": "summary",
      "x": 60, "y": 140, "width": 480, "height": 120,
      "variableName": "remark",
      "type": "variable",
      "page": 1,
      "fontSize": 12,
      "fontWeight": "normal"
    },
    {
      "id": "site-photo",
      "x": 60, "y": 300, "width": 220, "height": 160,
      "variableName": "variable_4",
      "type": "image",
      "page": 1,
      "fontSize": 16,
      "fontWeight": "normal",
      "imageFit": "auto-resize"
    }
  ],
  "pdfPages": 1,
  "currentPage": 1
}"##
}
