//! Header mapping and row parsing.

use crate::CaptureError;

const AD_NAMES: [&str; 8] = ["AD0", "AD1", "AD2", "AD3", "AD4", "AD5", "AD6", "AD7"];
const A_NAMES: [&str; 12] = [
    "A8", "A9", "A10", "A11", "A12", "A13", "A14", "A15", "A16", "A17", "A18", "A19",
];
const S_NAMES: [&str; 3] = ["S0", "S1", "S2"];
const QS_NAMES: [&str; 2] = ["QS0", "QS1"];

/// Optional peripheral probe values on one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuxSignals {
    pub hs: Option<bool>,
    pub vs: Option<bool>,
    pub den: Option<bool>,
    pub intr: Option<bool>,
    pub dr0: Option<bool>,
}

/// One parsed capture row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRow {
    /// 0-based data row index (the sampler index).
    pub sample: u64,
    /// Timestamp in seconds.
    pub time: f64,
    /// AD0-AD7, packed little-endian.
    pub ad: u8,
    /// A8-A19, bit 0 = A8.
    pub a: u16,
    /// S0-S2.
    pub status: u8,
    /// QS0-QS1.
    pub queue_status: u8,
    pub ready: bool,
    /// Clock level, if the capture has a clock channel.
    pub clk: Option<bool>,
    /// The ALE probe, if present. The decoder derives ALE from S0-S2; this
    /// is carried for cross-checking only.
    pub ale: Option<bool>,
    pub aux: AuxSignals,
}

impl CaptureRow {
    /// The 20-bit value on the address pins this row.
    #[must_use]
    pub fn address(&self) -> u32 {
        u32::from(self.ad) | (u32::from(self.a) << 8)
    }
}

/// Column indices resolved from the header row.
#[derive(Debug, Clone)]
pub struct SignalColumns {
    time: usize,
    ad: [usize; 8],
    a: [usize; 12],
    s: [usize; 3],
    qs: [usize; 2],
    ready: usize,
    clk: Option<usize>,
    ale: Option<usize>,
    hs: Option<usize>,
    vs: Option<usize>,
    den: Option<usize>,
    intr: Option<usize>,
    dr0: Option<usize>,
}

fn find(cells: &[&str], name: &'static str) -> Result<usize, CaptureError> {
    cells
        .iter()
        .position(|c| c.eq_ignore_ascii_case(name))
        .ok_or(CaptureError::MissingColumn(name))
}

fn find_opt(cells: &[&str], name: &str) -> Option<usize> {
    cells.iter().position(|c| c.eq_ignore_ascii_case(name))
}

impl SignalColumns {
    pub(crate) fn from_header(header: &str) -> Result<Self, CaptureError> {
        let cells: Vec<&str> = header.split(',').map(str::trim).collect();

        let mut ad = [0; 8];
        for (slot, name) in ad.iter_mut().zip(AD_NAMES) {
            *slot = find(&cells, name)?;
        }
        let mut a = [0; 12];
        for (slot, name) in a.iter_mut().zip(A_NAMES) {
            *slot = find(&cells, name)?;
        }
        let mut s = [0; 3];
        for (slot, name) in s.iter_mut().zip(S_NAMES) {
            *slot = find(&cells, name)?;
        }
        let mut qs = [0; 2];
        for (slot, name) in qs.iter_mut().zip(QS_NAMES) {
            *slot = find(&cells, name)?;
        }

        Ok(Self {
            time: find(&cells, "Time(s)")?,
            ad,
            a,
            s,
            qs,
            ready: find(&cells, "READY")?,
            clk: find_opt(&cells, "CLK").or_else(|| find_opt(&cells, "CLK0")),
            ale: find_opt(&cells, "ALE"),
            hs: find_opt(&cells, "HS"),
            vs: find_opt(&cells, "VS"),
            den: find_opt(&cells, "DEN"),
            intr: find_opt(&cells, "INTR"),
            dr0: find_opt(&cells, "DR0"),
        })
    }

    pub(crate) fn has_clock(&self) -> bool {
        self.clk.is_some()
    }

    pub(crate) fn parse_row(
        &self,
        row: &str,
        line: u64,
        sample: u64,
    ) -> Result<CaptureRow, CaptureError> {
        let cells: Vec<&str> = row.split(',').map(str::trim).collect();

        let time_text = field(&cells, self.time, line)?;
        let time: f64 = time_text.parse().map_err(|_| CaptureError::BadValue {
            line,
            column: "Time(s)".to_string(),
            value: time_text.to_string(),
        })?;

        let mut ad = 0u8;
        for (i, (&idx, name)) in self.ad.iter().zip(AD_NAMES).enumerate() {
            ad |= u8::from(bit(&cells, idx, name, line)?) << i;
        }
        let mut a = 0u16;
        for (i, (&idx, name)) in self.a.iter().zip(A_NAMES).enumerate() {
            a |= u16::from(bit(&cells, idx, name, line)?) << i;
        }
        let mut status = 0u8;
        for (i, (&idx, name)) in self.s.iter().zip(S_NAMES).enumerate() {
            status |= u8::from(bit(&cells, idx, name, line)?) << i;
        }
        let mut queue_status = 0u8;
        for (i, (&idx, name)) in self.qs.iter().zip(QS_NAMES).enumerate() {
            queue_status |= u8::from(bit(&cells, idx, name, line)?) << i;
        }

        Ok(CaptureRow {
            sample,
            time,
            ad,
            a,
            status,
            queue_status,
            ready: bit(&cells, self.ready, "READY", line)?,
            clk: opt_bit(&cells, self.clk, "CLK", line)?,
            ale: opt_bit(&cells, self.ale, "ALE", line)?,
            aux: AuxSignals {
                hs: opt_bit(&cells, self.hs, "HS", line)?,
                vs: opt_bit(&cells, self.vs, "VS", line)?,
                den: opt_bit(&cells, self.den, "DEN", line)?,
                intr: opt_bit(&cells, self.intr, "INTR", line)?,
                dr0: opt_bit(&cells, self.dr0, "DR0", line)?,
            },
        })
    }
}

fn field<'c>(cells: &[&'c str], idx: usize, line: u64) -> Result<&'c str, CaptureError> {
    cells.get(idx).copied().ok_or(CaptureError::ShortRow { line })
}

fn bit(cells: &[&str], idx: usize, name: &str, line: u64) -> Result<bool, CaptureError> {
    match field(cells, idx, line)? {
        "0" => Ok(false),
        "1" => Ok(true),
        other => Err(CaptureError::BadValue {
            line,
            column: name.to_string(),
            value: other.to_string(),
        }),
    }
}

fn opt_bit(
    cells: &[&str],
    idx: Option<usize>,
    name: &str,
    line: u64,
) -> Result<Option<bool>, CaptureError> {
    idx.map(|i| bit(cells, i, name, line)).transpose()
}
