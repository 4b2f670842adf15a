use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use linegrep::Matcher;

/// Report every (possibly overlapping) match of PATTERN in the input.
///
/// Each match prints one tab-separated line: line number (0-based), start
/// byte offset within the line, and the matching substring.
#[derive(Parser)]
#[command(name = "linegrep", version)]
struct Args {
    /// Pattern: literals, \ escapes, [...] classes, ., ?, |, *, +, (...)
    pattern: String,
    /// File to scan; reads stdin when omitted
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let matcher = Matcher::compile(&args.pattern)
        .with_context(|| format!("invalid pattern {:?}", args.pattern))?;

    let stdin = io::stdin();
    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(stdin.lock()),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.context("read failed")?;
        let bytes = line.as_bytes();
        for (start, end) in matcher.matches(bytes) {
            let matched = String::from_utf8_lossy(&bytes[start..end]);
            writeln!(out, "{line_number}\t{start}\t{matched}")?;
        }
    }

    Ok(())
}
