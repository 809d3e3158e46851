//! Build a small sample PDF from the command line.
//!
//! Usage:
//!   cargo run --bin make_sample -- out.pdf
//!   cargo run --bin make_sample -- --compress --invariant out.pdf

use std::process::ExitCode;

use pdfscribe::structure::Destination;
use pdfscribe::{Document, DocumentConfig, Page};

struct SampleConfig {
    output: String,
    compress: bool,
    invariant: bool,
}

impl SampleConfig {
    fn from_args() -> Option<Self> {
        let mut output = None;
        let mut compress = false;
        let mut invariant = false;
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--compress" => compress = true,
                "--invariant" => invariant = true,
                "--help" | "-h" => return None,
                other if !other.starts_with('-') => output = Some(other.to_string()),
                other => {
                    eprintln!("unknown option: {}", other);
                    return None;
                },
            }
        }
        Some(Self {
            output: output.unwrap_or_else(|| "sample.pdf".to_string()),
            compress,
            invariant,
        })
    }
}

fn page_content(lines: &[&str]) -> Vec<u8> {
    let mut content = String::new();
    let mut y = 720;
    for line in lines {
        content.push_str(&format!("BT /F1 14 Tf 72 {} Td ({}) Tj ET\n", y, line));
        y -= 24;
    }
    content.into_bytes()
}

fn build(config: &SampleConfig) -> pdfscribe::Result<Vec<u8>> {
    let mut doc = Document::new(
        DocumentConfig::default()
            .with_compression(config.compress)
            .with_invariant(config.invariant),
    );
    doc.set_title("pdfscribe sample");
    doc.set_author("make_sample");

    let first = Destination::Fit.to_object(doc.this_page_ref());
    doc.add_named_destination("first", first);
    doc.add_page(Page::new(page_content(&[
        "pdfscribe sample document",
        "page one of two",
    ])))?;

    let second = Destination::FitH(792.0).to_object(doc.this_page_ref());
    doc.add_named_destination("second", second);
    doc.add_page(Page::new(page_content(&["page two of two"])))?;

    doc.add_outline_entry("first", 0, "Sample", false)?;
    doc.add_outline_entry("first", 1, "Page one", false)?;
    doc.add_outline_entry("second", 1, "Page two", false)?;
    doc.show_outline();

    doc.save_to_bytes()
}

fn main() -> ExitCode {
    env_logger::init();
    let config = match SampleConfig::from_args() {
        Some(config) => config,
        None => {
            eprintln!("usage: make_sample [--compress] [--invariant] [OUTPUT]");
            return ExitCode::FAILURE;
        },
    };
    match build(&config) {
        Ok(bytes) => {
            if let Err(e) = std::fs::write(&config.output, &bytes) {
                eprintln!("cannot write {}: {}", config.output, e);
                return ExitCode::FAILURE;
            }
            println!("wrote {} ({} bytes)", config.output, bytes.len());
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("failed to build document: {}", e);
            ExitCode::FAILURE
        },
    }
}
