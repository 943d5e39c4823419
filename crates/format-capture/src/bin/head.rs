//! Export the first rows of a capture.
//!
//! Copies `num_rows` data rows to the destination, optionally skipping
//! ahead until `Time(s)` exceeds a time offset first. Useful for carving a
//! workable slice out of a multi-gigabyte dump.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process;

fn print_usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: head <num_rows> <time_offset> <input.csv> <output.csv>");
    process::exit(code);
}

fn run(n: u64, offset: f64, input: &str, output: &str) -> std::io::Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let mut time_col: Option<usize> = None;
    let mut written = 0u64;
    for line in reader.lines() {
        if written >= n {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let Some(col) = time_col else {
            let col = trimmed
                .split(',')
                .position(|c| c.trim().eq_ignore_ascii_case("Time(s)"))
                .unwrap_or(0);
            time_col = Some(col);
            writeln!(writer, "{trimmed}")?;
            continue;
        };
        let time = trimmed
            .split(',')
            .nth(col)
            .and_then(|t| t.trim().parse::<f64>().ok());
        if time.is_some_and(|t| t > offset) {
            writeln!(writer, "{trimmed}")?;
            written += 1;
        }
    }
    writer.flush()?;
    if written < n {
        eprintln!("Could only extract {written} rows after the time offset.");
    } else {
        eprintln!("Wrote {written} rows.");
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        print_usage_and_exit(1);
    }
    let n: u64 = args[1].parse().unwrap_or_else(|_| {
        eprintln!("Bad row count {:?}", args[1]);
        print_usage_and_exit(1);
    });
    let offset: f64 = args[2].parse().unwrap_or_else(|_| {
        eprintln!("Bad time offset {:?}", args[2]);
        print_usage_and_exit(1);
    });
    if let Err(e) = run(n, offset, &args[3], &args[4]) {
        eprintln!("head failed: {e}");
        process::exit(2);
    }
}
