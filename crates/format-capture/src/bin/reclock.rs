//! Re-synthesize falling clock edges.
//!
//! Captures processed down to one row per rising edge have no usable CLK
//! waveform left. This tool restores one: each row is written with CLK high,
//! followed by a copy `offset` seconds later with CLK low. The offset should
//! be one half-cycle (0.000000105 for a 4.77 MHz clock).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::process;

fn print_usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: reclock <input.csv> <offset_s> <output.csv>");
    eprintln!();
    eprintln!("Use an offset of 0.000000105 for a 4.77 MHz clock.");
    process::exit(code);
}

fn run(input: &str, offset: f64, output: &str) -> std::io::Result<()> {
    let reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);

    let mut cols: Option<(usize, Option<usize>)> = None; // (time, clk)
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let Some((time_col, clk_col)) = cols else {
            let headers: Vec<&str> = trimmed.split(',').map(str::trim).collect();
            let time_col = headers
                .iter()
                .position(|c| c.eq_ignore_ascii_case("Time(s)"))
                .unwrap_or(0);
            let clk_col = headers.iter().position(|c| c.eq_ignore_ascii_case("CLK"));
            cols = Some((time_col, clk_col));
            if clk_col.is_none() {
                writeln!(writer, "{trimmed},CLK")?;
            } else {
                writeln!(writer, "{trimmed}")?;
            }
            continue;
        };

        let mut fields: Vec<String> = trimmed.split(',').map(|f| f.trim().to_string()).collect();
        let Some(time) = fields
            .get(time_col)
            .and_then(|t| t.parse::<f64>().ok())
        else {
            continue;
        };

        // Rising-edge row.
        match clk_col {
            Some(c) if c < fields.len() => fields[c] = "1".to_string(),
            _ => fields.push("1".to_string()),
        }
        writeln!(writer, "{}", fields.join(","))?;

        // Synthesized falling edge half a cycle later.
        fields[time_col] = format!("{:.9}", time + offset);
        match clk_col {
            Some(c) if c < fields.len() => fields[c] = "0".to_string(),
            _ => {
                let last = fields.len() - 1;
                fields[last] = "0".to_string();
            }
        }
        writeln!(writer, "{}", fields.join(","))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        print_usage_and_exit(1);
    }
    let offset: f64 = args[2].parse().unwrap_or_else(|_| {
        eprintln!("Bad offset {:?}", args[2]);
        print_usage_and_exit(1);
    });
    if let Err(e) = run(&args[1], offset, &args[3]) {
        eprintln!("reclock failed: {e}");
        process::exit(2);
    }
}
