//! Per-cycle output records.

use std::fmt;

use motorola_6845::RasterPos;

use crate::bus::{BusStatus, Segment};
use crate::disasm::DisasmError;
use crate::queue::{QUEUE_DEPTH, QueueOp};
use crate::tstate::TState;
use crate::{AuxPins, Snapshot};

/// Recoverable decode faults. Reported on the affected cycle; the decoder
/// carries on, tolerating capture gaps by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleError {
    /// Code fetch observed with four bytes already in the queue mirror.
    QueueOverflow,
    /// Queue pop signaled with the queue mirror empty.
    QueueUnderflow,
    /// The closed instruction did not disassemble.
    Disasm(DisasmError),
    /// A third INTA bus cycle without an intervening instruction boundary.
    IntaOverflow,
}

impl CycleError {
    /// Short marker shown in the cycle log's DISASM column.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::QueueOverflow => "q_err_of",
            Self::QueueUnderflow => "q_err_uf",
            Self::Disasm(_) => "inval",
            Self::IntaOverflow => "inta_of",
        }
    }
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueOverflow => write!(f, "prefetch queue overflow"),
            Self::QueueUnderflow => write!(f, "prefetch queue underflow"),
            Self::Disasm(e) => write!(f, "disassembly failed: {e}"),
            Self::IntaOverflow => write!(f, "unexpected third INTA cycle"),
        }
    }
}

impl std::error::Error for CycleError {}

/// Everything the decoder knows about one accepted clock edge.
#[derive(Debug, Clone)]
pub struct CycleRecord {
    /// Monotone cycle index, from 0.
    pub n: u64,
    /// Sampler row index of this edge.
    pub sample: u64,
    /// ALE asserted this cycle (one cycle per bus cycle, at T1).
    pub ale: bool,
    /// Address latched at the most recent ALE.
    pub addr_latch: Option<u32>,
    /// Segment register driving this bus cycle, when meaningful.
    pub seg: Option<Segment>,
    /// Instantaneous S0-S2 decode.
    pub bus: BusStatus,
    /// Bus status latched at T1; PASV during Ti.
    pub bus_latch: BusStatus,
    /// T-state of this cycle.
    pub t: TState,
    /// READY pin.
    pub ready: bool,
    /// Data bus value, on data-valid cycles only.
    pub data: Option<u8>,
    /// Queue operation executed this cycle (see [`crate::Decoder`]).
    pub qop: QueueOp,
    /// Byte popped from the queue this cycle.
    pub qbyte: Option<u8>,
    /// Queue depth after this cycle.
    pub queue_len: u8,
    /// Queue contents after this cycle.
    pub queue: [Option<u8>; QUEUE_DEPTH],
    /// In-progress instruction bytes after this cycle.
    pub instr_bytes: Vec<u8>,
    /// Set on the cycle an instruction boundary is recognized.
    pub instr_final: Option<Vec<u8>>,
    /// Mnemonic, on the same cycle as `instr_final`.
    pub disasm: Option<String>,
    /// Recoverable fault on this cycle, if any.
    pub error: Option<CycleError>,
    /// Debug marker (queue flush, INTA phase).
    pub debug: Option<&'static str>,
    /// CRTC raster position, when sync pins are tracked.
    pub raster: Option<RasterPos>,
    /// Peripheral probes echoed from the snapshot.
    pub aux: AuxPins,
}

impl CycleRecord {
    pub(crate) fn new(n: u64, snap: &Snapshot) -> Self {
        Self {
            n,
            sample: snap.sample,
            ale: false,
            addr_latch: None,
            seg: None,
            bus: BusStatus::Pasv,
            bus_latch: BusStatus::Pasv,
            t: TState::Ti,
            ready: snap.ready,
            data: None,
            qop: QueueOp::Idle,
            qbyte: None,
            queue_len: 0,
            queue: [None; QUEUE_DEPTH],
            instr_bytes: Vec::new(),
            instr_final: None,
            disasm: None,
            error: None,
            debug: None,
            raster: None,
            aux: snap.aux,
        }
    }

    /// Record a fault. The first fault on a cycle wins; later ones would
    /// only ever be knock-on effects of the same capture gap.
    pub(crate) fn note_error(&mut self, error: CycleError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// What the DISASM column shows: the mnemonic, or a fault marker.
    #[must_use]
    pub fn disasm_column(&self) -> Option<&str> {
        self.disasm
            .as_deref()
            .or_else(|| self.error.map(CycleError::marker))
    }
}
