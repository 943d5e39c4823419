//! Bus status and segment decode.
//!
//! S0-S2 announce the type of the bus transaction at the start of each
//! m-cycle and return to PASV once the transaction is underway. S3/S4 share
//! pins with A16/A17 and carry the active segment register while the address
//! is not being driven.

use std::fmt;

/// Decoded S0-S2 bus status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    /// Interrupt acknowledge.
    Inta,
    /// I/O read.
    Ior,
    /// I/O write.
    Iow,
    /// Halt acknowledge.
    Halt,
    /// Code fetch (destined for the prefetch queue).
    Code,
    /// Memory read.
    MemR,
    /// Memory write.
    MemW,
    /// Passive: no transaction in progress.
    Pasv,
}

impl BusStatus {
    /// Decode the three status pins (bit 0 = S0).
    #[must_use]
    pub fn decode(status: u8) -> Self {
        match status & 0b111 {
            0 => Self::Inta,
            1 => Self::Ior,
            2 => Self::Iow,
            3 => Self::Halt,
            4 => Self::Code,
            5 => Self::MemR,
            6 => Self::MemW,
            _ => Self::Pasv,
        }
    }

    /// Bus operations during which S3/S4 carry a meaningful segment.
    #[must_use]
    pub fn carries_segment(self) -> bool {
        matches!(self, Self::Code | Self::MemR | Self::MemW)
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Inta => "INTA",
            Self::Ior => "IOR",
            Self::Iow => "IOW",
            Self::Halt => "HALT",
            Self::Code => "CODE",
            Self::MemR => "MEMR",
            Self::MemW => "MEMW",
            Self::Pasv => "PASV",
        }
    }
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Segment register decoded from S3/S4 (pins A16/A17).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Es,
    Ss,
    Cs,
    Ds,
}

impl Segment {
    /// Decode from the packed high address lines (bit 8 = A16, bit 9 = A17).
    #[must_use]
    pub fn decode(a: u16) -> Self {
        let s3 = (a >> 8) & 1;
        let s4 = (a >> 9) & 1;
        match (s4 << 1) | s3 {
            0 => Self::Es,
            1 => Self::Ss,
            2 => Self::Cs,
            _ => Self::Ds,
        }
    }

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::Es => "ES",
            Self::Ss => "SS",
            Self::Cs => "CS",
            Self::Ds => "DS",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decode_table() {
        let expect = [
            BusStatus::Inta,
            BusStatus::Ior,
            BusStatus::Iow,
            BusStatus::Halt,
            BusStatus::Code,
            BusStatus::MemR,
            BusStatus::MemW,
            BusStatus::Pasv,
        ];
        for (bits, status) in expect.into_iter().enumerate() {
            assert_eq!(BusStatus::decode(bits as u8), status);
        }
    }

    #[test]
    fn segment_decode_from_a16_a17() {
        // CS = S4:S3 == 10, i.e. A17 high, A16 low.
        assert_eq!(Segment::decode(0b10 << 8), Segment::Cs);
        assert_eq!(Segment::decode(0b01 << 8), Segment::Ss);
        assert_eq!(Segment::decode(0), Segment::Es);
        assert_eq!(Segment::decode(0b11 << 8), Segment::Ds);
    }
}
