//! Logic-analyzer capture CSV parser.
//!
//! PulseView/DSView export captures as CSV: a header row naming each probed
//! channel, then one row per sample with a `Time(s)` timestamp and 0/1
//! signal values. Lines starting with `;` are comments. Columns are located
//! by header name, not position, so captures with extra probes or reordered
//! channels parse the same.
//!
//! Required channels: `Time(s)`, `AD0`-`AD7`, `A8`-`A19`, `S0`-`S2`,
//! `QS0`/`QS1`, `READY`. Optional: `CLK` (or `CLK0`), `ALE`, `HS`, `VS`,
//! `DEN`, `INTR`, `DR0`. A capture without a clock column is taken to be
//! pre-extracted, one row per rising edge.
//!
//! A missing required column or a signal value other than 0/1 is fatal:
//! downstream state machines cannot recover from a capture whose shape is
//! wrong, so the error carries the offending line for the operator.

use std::fmt;
use std::io::{self, BufRead};

mod row;

pub use row::{AuxSignals, CaptureRow, SignalColumns};

/// Fatal capture-shape error.
#[derive(Debug)]
pub enum CaptureError {
    Io(io::Error),
    /// The header row is missing or has no recognizable columns.
    MissingHeader,
    /// A required channel is absent from the header.
    MissingColumn(&'static str),
    /// A malformed value, identified by file line and column name.
    BadValue {
        line: u64,
        column: String,
        value: String,
    },
    /// A data row with fewer fields than the header.
    ShortRow { line: u64 },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "capture read failed: {e}"),
            Self::MissingHeader => write!(f, "capture has no header row"),
            Self::MissingColumn(name) => write!(f, "capture is missing the {name} column"),
            Self::BadValue {
                line,
                column,
                value,
            } => write!(f, "line {line}: bad value {value:?} in column {column}"),
            Self::ShortRow { line } => write!(f, "line {line}: row has too few fields"),
        }
    }
}

impl std::error::Error for CaptureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CaptureError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Streaming reader over capture rows.
#[derive(Debug)]
pub struct CaptureReader<R: BufRead> {
    input: R,
    columns: SignalColumns,
    /// 1-based line number in the file, for diagnostics.
    line: u64,
    /// 0-based index of the next data row (the sampler index).
    sample: u64,
    buf: String,
}

impl<R: BufRead> CaptureReader<R> {
    /// Read and validate the header row.
    pub fn new(mut input: R) -> Result<Self, CaptureError> {
        let mut line = 0;
        let mut buf = String::new();
        loop {
            buf.clear();
            line += 1;
            if input.read_line(&mut buf)? == 0 {
                return Err(CaptureError::MissingHeader);
            }
            let trimmed = buf.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            let columns = SignalColumns::from_header(trimmed)?;
            return Ok(Self {
                input,
                columns,
                line,
                sample: 0,
                buf: String::new(),
            });
        }
    }

    /// Whether the capture has a clock channel. Without one, every row is
    /// one rising edge.
    #[must_use]
    pub fn has_clock(&self) -> bool {
        self.columns.has_clock()
    }

    #[must_use]
    pub fn columns(&self) -> &SignalColumns {
        &self.columns
    }

    fn read_row(&mut self) -> Result<Option<CaptureRow>, CaptureError> {
        loop {
            self.buf.clear();
            self.line += 1;
            if self.input.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            let trimmed = self.buf.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }
            let row = self.columns.parse_row(trimmed, self.line, self.sample)?;
            self.sample += 1;
            return Ok(Some(row));
        }
    }
}

impl<R: BufRead> Iterator for CaptureReader<R> {
    type Item = Result<CaptureRow, CaptureError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_row().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "Time(s),AD0,AD1,AD2,AD3,AD4,AD5,AD6,AD7,\
A8,A9,A10,A11,A12,A13,A14,A15,A16,A17,A18,A19,\
ALE,S0,S1,S2,QS0,QS1,READY";

    fn reader(text: &str) -> CaptureReader<Cursor<&str>> {
        CaptureReader::new(Cursor::new(text)).expect("valid capture")
    }

    fn all_zero_row(time: &str) -> String {
        let zeros = vec!["0"; 27].join(",");
        format!("{time},{zeros}")
    }

    #[test]
    fn parses_header_and_rows() {
        let text = format!(
            "; analyzer dump\n{HEADER}\n{}\n{}\n",
            all_zero_row("0.0"),
            all_zero_row("0.000000105")
        );
        let rows: Vec<CaptureRow> = reader(&text).map(|r| r.expect("row parses")).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sample, 0);
        assert_eq!(rows[1].sample, 1);
        assert!((rows[1].time - 105e-9).abs() < 1e-12);
        assert!(rows[0].clk.is_none(), "no CLK column in this capture");
    }

    #[test]
    fn missing_column_is_fatal() {
        let text = "Time(s),AD0,AD1\n0.0,0,0\n";
        match CaptureReader::new(Cursor::new(text)) {
            Err(CaptureError::MissingColumn(name)) => assert_eq!(name, "AD2"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_binary_signal_is_fatal() {
        let mut values = vec!["0"; 27];
        values[0] = "2"; // AD0
        let text = format!("{HEADER}\n0.0,{}\n", values.join(","));
        let err = reader(&text)
            .next()
            .expect("one row")
            .expect_err("2 is not a valid signal level");
        match err {
            CaptureError::BadValue { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column, "AD0");
            }
            other => panic!("expected BadValue, got {other:?}"),
        }
    }

    #[test]
    fn comments_and_blanks_are_skipped() {
        let text = format!(
            "\n; comment\n{HEADER}\n; mid comment\n{}\n\n",
            all_zero_row("1.5")
        );
        let rows: Vec<_> = reader(&text).collect();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn clk_column_is_recognized() {
        let header = format!("{HEADER},HS,VS,CLK");
        let mut row = all_zero_row("0.0");
        row.push_str(",0,1,1");
        let text = format!("{header}\n{row}\n");
        let mut r = reader(&text);
        assert!(r.has_clock());
        let parsed = r.next().expect("row").expect("parses");
        assert_eq!(parsed.clk, Some(true));
        assert_eq!(parsed.aux.hs, Some(false));
        assert_eq!(parsed.aux.vs, Some(true));
    }

    #[test]
    fn packs_address_bits() {
        // Set AD2 and A19 in an otherwise zero row: address 0x80004.
        let header = HEADER;
        let mut values = vec!["0"; 27];
        values[2] = "1"; // AD2
        values[19] = "1"; // A19
        let text = format!("{header}\n0.0,{}\n", values.join(","));
        let row = reader(text.as_str())
            .next()
            .expect("row")
            .expect("parses");
        assert_eq!(row.ad, 0b100);
        assert_eq!(row.a, 0x800);
        assert_eq!(row.address(), 0x8_0004);
    }
}
