//! Trim an analyzer dump to a time range.
//!
//! Exports only the rows whose `Time(s)` falls within [min, max]. A max of
//! 0 means "to the end of the capture". Rows pass through untouched, so the
//! output keeps whatever extra columns the capture had.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process;

fn print_usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: trim <min_time> <max_time> <input.csv> <output.csv>");
    eprintln!();
    eprintln!("A max_time of 0 keeps everything after min_time.");
    process::exit(code);
}

fn run(min: f64, max: f64, input: &str, output: &str) -> std::io::Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let mut time_col: Option<usize> = None;
    let mut kept = 0u64;
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let Some(col) = time_col else {
            // Header row: locate Time(s) and pass it through.
            let col = trimmed
                .split(',')
                .position(|c| c.trim().eq_ignore_ascii_case("Time(s)"))
                .unwrap_or(0);
            time_col = Some(col);
            writeln!(writer, "{trimmed}")?;
            continue;
        };
        let Some(time) = trimmed
            .split(',')
            .nth(col)
            .and_then(|t| t.trim().parse::<f64>().ok())
        else {
            continue;
        };
        if time >= min && (max <= 0.0 || time <= max) {
            writeln!(writer, "{trimmed}")?;
            kept += 1;
        } else if max > 0.0 && time > max {
            break;
        }
    }
    writer.flush()?;
    eprintln!("Kept {kept} rows.");
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 5 {
        print_usage_and_exit(1);
    }
    let min: f64 = args[1].parse().unwrap_or_else(|_| {
        eprintln!("Bad min_time {:?}", args[1]);
        print_usage_and_exit(1);
    });
    let max: f64 = args[2].parse().unwrap_or_else(|_| {
        eprintln!("Bad max_time {:?}", args[2]);
        print_usage_and_exit(1);
    });
    if max > 0.0 && max < min {
        eprintln!("max_time must be >= min_time, or 0");
        print_usage_and_exit(1);
    }
    if let Err(e) = run(min, max, &args[3], &args[4]) {
        eprintln!("trim failed: {e}");
        process::exit(2);
    }
}
