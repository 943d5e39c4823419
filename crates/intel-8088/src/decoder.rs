//! The cycle decoder.
//!
//! A single forward pass over accepted clock edges. Every derived field is
//! computed from the current pin snapshot plus one cycle of history; nothing
//! is rewound, so the decoder survives capture gaps and mid-stream starts.
//!
//! # Queue status phase offset
//!
//! QS0/QS1 announce "the next queue read is the first byte of a new
//! instruction" one clock before the byte is actually consumed. The decoder
//! therefore executes the *previous* edge's queue op on the current cycle:
//! the pop, the instruction-boundary close, and the popped byte all land on
//! one record, which is also how the annotations read against a scope
//! trace. Moving the close to the announcing edge instead would split every
//! instruction boundary across two cycles.

use motorola_6845::RasterTracker;

use crate::bus::{BusStatus, Segment};
use crate::disasm;
use crate::queue::{PrefetchQueue, QueueOp};
use crate::record::{CycleError, CycleRecord};
use crate::tstate::TState;
use crate::{Snapshot, is_prefix};

/// Instruction reassembly buffer. Eight bytes covers the longest encoding
/// the queue can deliver; anything past that is a capture artifact and is
/// dropped rather than grown.
const INSTR_MAX: usize = 8;

#[derive(Debug, Default)]
struct Assembler {
    bytes: Vec<u8>,
}

impl Assembler {
    fn push(&mut self, byte: u8) {
        if self.bytes.len() < INSTR_MAX {
            self.bytes.push(byte);
        }
    }

    fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    /// A buffer of nothing but prefixes is still waiting for its opcode.
    fn all_prefixes(&self) -> bool {
        self.bytes.iter().all(|&b| is_prefix(b))
    }
}

/// 8088 bus-cycle decoder. One [`step`](Self::step) per accepted rising
/// clock edge; all state is per-instance.
pub struct Decoder {
    n: u64,
    prev_bus: Option<BusStatus>,
    prev_ready: bool,
    prev_qop: QueueOp,
    bus_latch: BusStatus,
    addr_latch: Option<u32>,
    seg: Option<Segment>,
    have_seg: bool,
    t: TState,
    queue: PrefetchQueue,
    instr: Assembler,
    /// Interrupt-acknowledge progress: 0 = none, 1 = first INTA cycle
    /// seen, 2 = vector read, close pending.
    inta: u8,
    vector: u8,
    raster: Option<RasterTracker>,
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            n: 0,
            prev_bus: None,
            prev_ready: false,
            prev_qop: QueueOp::Idle,
            bus_latch: BusStatus::Pasv,
            addr_latch: None,
            seg: None,
            have_seg: false,
            t: TState::Ti,
            queue: PrefetchQueue::new(),
            instr: Assembler::default(),
            inta: 0,
            vector: 0,
            raster: None,
        }
    }

    /// Track CRTC raster counters from the HS/VS probes, `divisor` hdots
    /// per CPU clock.
    #[must_use]
    pub fn with_raster(divisor: u32) -> Self {
        let mut decoder = Self::new();
        decoder.raster = Some(RasterTracker::new(divisor));
        decoder
    }

    /// Number of cycles decoded so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.n
    }

    /// Decode one accepted rising clock edge.
    pub fn step(&mut self, snap: &Snapshot) -> CycleRecord {
        let mut rec = CycleRecord::new(self.n, snap);

        // Bus status and m-cycle start. ALE rises on the PASV -> active
        // transition; a capture that begins mid-cycle produces no edge and
        // the tracker stays idle until the next real one.
        let bus = BusStatus::decode(snap.status);
        rec.bus = bus;
        let ale = self.prev_bus == Some(BusStatus::Pasv) && bus != BusStatus::Pasv;
        if ale {
            self.bus_latch = bus;
            self.addr_latch = Some(snap.address());
            self.have_seg = false;
            self.seg = None;
            if bus == BusStatus::Inta {
                self.begin_inta(&mut rec);
            }
        }
        rec.ale = ale;

        // T-state; data-valid is decided by the READY rules of the state
        // entered on this edge.
        let (t, data_valid) = self.t.advance(ale, snap.ready, self.prev_ready);
        self.t = t;
        rec.t = t;
        if t == TState::Ti {
            self.bus_latch = BusStatus::Pasv;
        }
        rec.bus_latch = self.bus_latch;
        rec.addr_latch = self.addr_latch;

        // S3/S4 ride on A16/A17 once the address has been latched; grab the
        // segment on the first non-ALE cycle of the m-cycle.
        if !ale && !self.have_seg {
            self.seg = Some(Segment::decode(snap.a));
            self.have_seg = true;
        }
        if self.have_seg && self.bus_latch.carries_segment() {
            rec.seg = self.seg;
        }

        // Data latch and the code-fetch path into the queue.
        if data_valid {
            rec.data = Some(snap.ad);
            match self.bus_latch {
                BusStatus::Code => {
                    if !self.queue.push(snap.ad) {
                        rec.note_error(CycleError::QueueOverflow);
                    }
                }
                BusStatus::Inta if self.inta == 2 => {
                    // Vector arrives on the second INTA cycle of the pair.
                    self.vector = snap.ad;
                }
                _ => {}
            }
        }

        // Execute the queue op announced on the previous edge.
        rec.qop = self.prev_qop;
        match self.prev_qop {
            QueueOp::Empty => {
                self.queue.clear();
                rec.debug = Some("q_e");
            }
            QueueOp::First | QueueOp::Subsequent => match self.queue.pop() {
                Some(byte) => {
                    rec.qbyte = Some(byte);
                    if self.prev_qop == QueueOp::First {
                        self.close_instruction(&mut rec);
                    }
                    self.instr.push(byte);
                }
                None => rec.note_error(CycleError::QueueUnderflow),
            },
            QueueOp::Idle => {}
        }
        rec.queue = self.queue.slots();
        rec.queue_len = self.queue.len() as u8;
        rec.instr_bytes = self.instr.bytes.clone();

        if let Some(tracker) = &mut self.raster
            && let (Some(hs), Some(vs)) = (snap.aux.hs, snap.aux.vs)
        {
            rec.raster = Some(tracker.tick(hs, vs));
        }

        self.prev_bus = Some(bus);
        self.prev_ready = snap.ready;
        self.prev_qop = QueueOp::decode(snap.queue_status);
        self.n += 1;
        rec
    }

    /// First cycle of an interrupt-acknowledge pair: whatever instruction
    /// was executing is over, and the next two INTA bus cycles belong to
    /// the acknowledge sequence.
    fn begin_inta(&mut self, rec: &mut CycleRecord) {
        match self.inta {
            0 => {
                self.emit_boundary(rec);
                self.inta = 1;
                rec.debug = Some("inta1");
            }
            1 => {
                self.inta = 2;
                rec.debug = Some("inta2");
            }
            _ => rec.note_error(CycleError::IntaOverflow),
        }
    }

    /// A byte was popped as First: the buffer, if it holds a complete
    /// instruction, is done. A buffer of only prefixes keeps accumulating;
    /// the First belongs to the opcode the prefixes modify.
    fn close_instruction(&mut self, rec: &mut CycleRecord) {
        if self.inta == 2 {
            // The acknowledge pseudo-instruction ends at the first
            // instruction boundary after the vector was read.
            let bytes = self.instr.take();
            rec.disasm = Some(format!("INT:{:02X}", self.vector));
            rec.instr_final = Some(bytes);
            self.inta = 0;
            return;
        }
        if self.instr.bytes.is_empty() || self.instr.all_prefixes() {
            return;
        }
        self.emit_boundary(rec);
    }

    fn emit_boundary(&mut self, rec: &mut CycleRecord) {
        if self.instr.bytes.is_empty() {
            return;
        }
        let bytes = self.instr.take();
        match disasm::disassemble(&bytes) {
            Ok(mnemonic) => {
                rec.disasm = Some(format!("{:02X}:{mnemonic}", bytes[0]));
            }
            Err(e) => {
                rec.disasm = Some("inval".to_string());
                rec.note_error(CycleError::Disasm(e));
            }
        }
        rec.instr_final = Some(bytes);
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
