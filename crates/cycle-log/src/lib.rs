//! Cycle-log rendering.
//!
//! Consumers of the decoder's per-cycle records: the cycle-log CSV writer
//! (one row per clock edge), the spreadsheet-flavored variant with its I/O
//! and instruction index files, and a raster PNG renderer that paints bus
//! activity against the video beam position.

mod index;
mod ports;
mod raster;
mod writer;

pub use index::{write_instruction_index, write_io_index};
pub use ports::PortMap;
pub use raster::{RasterImages, render_raster};
pub use writer::{CycleLogWriter, HexStyle};
