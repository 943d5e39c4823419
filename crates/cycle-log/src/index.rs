//! Spreadsheet companion indexes.
//!
//! The spreadsheet export is accompanied by two small CSVs that a workbook
//! would carry as extra sheets: every I/O access with its port label, and
//! every decoded instruction with its cycle count.

use std::io::{self, Write};

use intel_8088::{BusStatus, CycleRecord};

use crate::ports::PortMap;

/// Write the I/O access index: one row per IOR/IOW data transfer.
pub fn write_io_index<W: Write>(
    out: &mut W,
    records: &[CycleRecord],
    ports: &PortMap,
) -> io::Result<()> {
    writeln!(out, "ADDR,OP,DATA,DESC")?;
    for rec in records {
        let (Some(data), Some(addr)) = (rec.data, rec.addr_latch) else {
            continue;
        };
        let write = match rec.bus_latch {
            BusStatus::Ior => false,
            BusStatus::Iow => true,
            _ => continue,
        };
        // I/O addresses are 16 bits; A16-A19 are driven low.
        let port = addr as u16;
        let desc = ports.lookup(port, write).unwrap_or("");
        writeln!(
            out,
            "{port:04X},{op},{data:02X},{desc}",
            op = if write { 'W' } else { 'R' },
        )?;
    }
    Ok(())
}

/// Write the instruction index: each mnemonic with the number of cycles
/// from the previous boundary.
pub fn write_instruction_index<W: Write>(out: &mut W, records: &[CycleRecord]) -> io::Result<()> {
    writeln!(out, "N,DISASM,CYCLES")?;
    let mut last_boundary: Option<u64> = None;
    for rec in records {
        let Some(disasm) = rec.disasm.as_deref() else {
            continue;
        };
        let cycles = last_boundary.map_or_else(String::new, |n| (rec.n - n).to_string());
        writeln!(out, "{},{disasm},{cycles}", rec.n)?;
        last_boundary = Some(rec.n);
    }
    Ok(())
}
