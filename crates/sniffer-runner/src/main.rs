//! Batch decoder front-end.
//!
//! Reads a logic-analyzer capture CSV, runs the 8088 cycle decoder over
//! every rising clock edge, and writes the cycle log. Optionally renders
//! the spreadsheet-flavored log with its I/O and instruction indexes, and
//! beam-space PNG images when the capture carries CRTC sync probes.

use std::error::Error;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use cycle_log::{CycleLogWriter, HexStyle, PortMap, render_raster};
use format_capture::{CaptureReader, CaptureRow};
use intel_8088::{AuxPins, CycleRecord, Decoder, EdgeFilter, Snapshot};
use motorola_6845::DEFAULT_CLOCK_DIVISOR;

struct CliArgs {
    input: PathBuf,
    output: PathBuf,
    divisor: u32,
    sheet: bool,
    png_path: Option<PathBuf>,
    half_cycle_ns: Option<f64>,
}

fn print_usage_and_exit(code: i32) -> ! {
    eprintln!("Usage: sniffer-runner <input.csv> <output.csv> [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --divisor <n>        Hdots per CPU clock for raster tracking [default: 3]");
    eprintln!("  --sheet              Spreadsheet-flavored output plus IO/instruction indexes");
    eprintln!("  --png <file.png>     Render beam-space images (needs HS/VS in the capture)");
    eprintln!("  --half-cycle-ns <n>  Clock half-cycle for edge filtering [default: 105]");
    eprintln!("  -h, --help           Show this help");
    process::exit(code);
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut divisor = DEFAULT_CLOCK_DIVISOR;
    let mut sheet = false;
    let mut png_path = None;
    let mut half_cycle_ns = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => print_usage_and_exit(0),
            "--sheet" => {
                sheet = true;
            }
            "--divisor" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --divisor");
                    print_usage_and_exit(1);
                };
                divisor = value.parse().unwrap_or_else(|_| {
                    eprintln!("Bad divisor {value:?}");
                    print_usage_and_exit(1);
                });
            }
            "--png" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --png");
                    print_usage_and_exit(1);
                };
                png_path = Some(PathBuf::from(value));
            }
            "--half-cycle-ns" => {
                i += 1;
                let Some(value) = args.get(i) else {
                    eprintln!("Missing value for --half-cycle-ns");
                    print_usage_and_exit(1);
                };
                let ns: f64 = value.parse().unwrap_or_else(|_| {
                    eprintln!("Bad half-cycle time {value:?}");
                    print_usage_and_exit(1);
                });
                half_cycle_ns = Some(ns);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown option {other}");
                print_usage_and_exit(1);
            }
            other => positional.push(PathBuf::from(other)),
        }
        i += 1;
    }

    let [input, output]: [PathBuf; 2] = positional.try_into().unwrap_or_else(|_| {
        eprintln!("Expected exactly an input and an output file");
        print_usage_and_exit(1);
    });

    CliArgs {
        input,
        output,
        divisor,
        sheet,
        png_path,
        half_cycle_ns,
    }
}

fn to_snapshot(row: &CaptureRow) -> Snapshot {
    Snapshot {
        sample: row.sample,
        ad: row.ad,
        a: row.a,
        status: row.status,
        queue_status: row.queue_status,
        ready: row.ready,
        aux: AuxPins {
            hs: row.aux.hs,
            vs: row.aux.vs,
            den: row.aux.den,
            intr: row.aux.intr,
            dr0: row.aux.dr0,
        },
    }
}

/// Companion file path: `log.csv` -> `log_io.csv`.
fn companion(path: &Path, tag: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("log");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    path.with_file_name(format!("{stem}_{tag}.{ext}"))
}

fn run(args: &CliArgs) -> Result<(), Box<dyn Error>> {
    let input = File::open(&args.input)?;
    let capture = CaptureReader::new(BufReader::new(input))?;
    let has_clock = capture.has_clock();

    let style = if args.sheet {
        HexStyle::Spreadsheet
    } else {
        HexStyle::Plain
    };
    let output = File::create(&args.output)?;
    let mut log = CycleLogWriter::new(BufWriter::new(output), style);
    log.write_header()?;

    let mut filter = args
        .half_cycle_ns
        .map_or_else(EdgeFilter::new, EdgeFilter::with_half_cycle_ns);
    let mut decoder = Decoder::with_raster(args.divisor);

    // The raster and index passes need the whole log; plain batch decoding
    // streams straight to disk.
    let keep_records = args.sheet || args.png_path.is_some();
    let mut records: Vec<CycleRecord> = Vec::new();

    let mut samples = 0u64;
    let mut faults = 0u64;
    for row in capture {
        let row = row?;
        samples += 1;
        if has_clock && !filter.accept(row.time, row.clk.unwrap_or(true)) {
            continue;
        }
        let record = decoder.step(&to_snapshot(&row));
        if record.error.is_some() {
            faults += 1;
        }
        log.write_record(&record)?;
        if keep_records {
            records.push(record);
        }
    }
    log.finish()?;

    eprintln!(
        "Read {samples} samples, decoded {} cycles.",
        decoder.cycles()
    );
    if faults > 0 {
        eprintln!("{faults} cycles had decode faults (see the DISASM column).");
    }

    if args.sheet {
        let ports = PortMap::load(Path::new("ports.json"))?;
        let io_path = companion(&args.output, "io");
        let mut io = BufWriter::new(File::create(&io_path)?);
        cycle_log::write_io_index(&mut io, &records, &ports)?;

        let instr_path = companion(&args.output, "instr");
        let mut instr = BufWriter::new(File::create(&instr_path)?);
        cycle_log::write_instruction_index(&mut instr, &records)?;
        eprintln!(
            "Indexes written to {} and {}.",
            io_path.display(),
            instr_path.display()
        );
    }

    if let Some(png_path) = &args.png_path {
        match render_raster(&records) {
            Some(images) => {
                images.save(png_path)?;
                eprintln!("Raster images written next to {}.", png_path.display());
            }
            None => eprintln!("Capture has no HS/VS probes; skipping raster images."),
        }
    }

    Ok(())
}

fn main() {
    let args = parse_args();
    if let Err(e) = run(&args) {
        eprintln!("sniffer-runner: {e}");
        process::exit(2);
    }
}
