//! Raster PNG renderer.
//!
//! Paints a decoded log as two images in beam coordinates, one pixel per
//! CPU clock, 304 pixels per scanline (one CGA scanline at 4.77 MHz):
//!
//! - the *sync* layer shows HS/VS/DEN directly, making the frame structure
//!   visible at a glance;
//! - the *bus* layer marks interesting bus activity (INTR edges, CRTC and
//!   timer port writes, CGA status reads) at the beam position where it
//!   happened, which is how CRT effects are debugged.
//!
//! Output is written with the same `png` encoder setup used for
//! framebuffer screenshots, RGB, 8 bits per channel.

use std::error::Error;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use intel_8088::{BusStatus, CycleRecord};

/// Pixels per scanline: 912 hdots / 3 hdots per CPU clock.
pub const LINE_WIDTH: u32 = 304;

/// CRTC register-select port.
const PORT_CRTC_SELECT: u32 = 0x3D4;
/// CGA status register.
const PORT_CGA_STATUS: u32 = 0x3DA;
/// PIT channel 0.
const PORT_TIMER_0: u32 = 0x40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Black,
    White,
    Red,
    Magenta,
    Cyan,
    Yellow,
    Green,
    Blue,
    Gray,
}

impl Color {
    fn rgb(self) -> [u8; 3] {
        match self {
            Self::Black => [0, 0, 0],
            Self::White => [255, 255, 255],
            Self::Red => [255, 0, 0],
            Self::Magenta => [255, 0, 255],
            Self::Cyan => [0, 255, 255],
            Self::Yellow => [255, 255, 0],
            Self::Green => [0, 170, 0],
            Self::Blue => [0, 0, 170],
            Self::Gray => [50, 50, 50],
        }
    }
}

struct Layer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Layer {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::Black; (width * height) as usize],
        }
    }

    fn set(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = color;
        }
    }

    fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        let file = fs::File::create(path)?;
        let w = BufWriter::new(file);
        let mut encoder = png::Encoder::new(w, self.width, self.height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for &pixel in &self.pixels {
            rgb.extend_from_slice(&pixel.rgb());
        }
        writer.write_image_data(&rgb)?;
        Ok(())
    }
}

/// The two rendered layers.
pub struct RasterImages {
    sync: Layer,
    bus: Layer,
}

impl RasterImages {
    /// Write both layers next to `base`: `trace.png` becomes `tracea.png`
    /// (sync) and `traceb.png` (bus).
    pub fn save(&self, base: &Path) -> Result<(), Box<dyn Error>> {
        self.sync.save(&suffixed(base, "a"))?;
        self.bus.save(&suffixed(base, "b"))?;
        Ok(())
    }
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("raster");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("png");
    path.with_file_name(format!("{stem}{suffix}.{ext}"))
}

fn hs(rec: &CycleRecord) -> bool {
    rec.aux.hs == Some(true)
}

fn vs(rec: &CycleRecord) -> bool {
    rec.aux.vs == Some(true)
}

/// Color one cycle's bus activity.
fn bus_color(prev: Option<&CycleRecord>, rec: &CycleRecord) -> Color {
    let intr_rising =
        rec.aux.intr == Some(true) && prev.is_some_and(|p| p.aux.intr == Some(false));
    if intr_rising {
        return Color::Red;
    }
    if let (Some(data), Some(addr)) = (rec.data, rec.addr_latch) {
        match rec.bus_latch {
            BusStatus::Iow => match addr {
                PORT_CRTC_SELECT => {
                    // Register 7 is the vsync position, the one CRT
                    // effects retune mid-frame.
                    return if data == 7 { Color::Cyan } else { Color::Magenta };
                }
                PORT_TIMER_0 => return Color::Blue,
                _ => {}
            },
            BusStatus::Ior => {
                if addr == PORT_CGA_STATUS {
                    return Color::White;
                }
            }
            _ => {}
        }
    }
    Color::Black
}

/// Color one cycle's sync state.
fn sync_color(rec: &CycleRecord) -> Color {
    if rec.aux.den == Some(true) {
        Color::Gray
    } else if hs(rec) && vs(rec) {
        Color::White
    } else if hs(rec) {
        Color::Yellow
    } else if vs(rec) {
        Color::Black
    } else {
        Color::Green
    }
}

/// Render a decoded log into beam-space images. Returns None when the
/// records carry no HS probe (nothing to align the beam to).
#[must_use]
pub fn render_raster(records: &[CycleRecord]) -> Option<RasterImages> {
    // One output row per observed scanline.
    let mut scanlines = 0u32;
    for pair in records.windows(2) {
        if hs(&pair[0]) && !hs(&pair[1]) {
            scanlines += 1;
        }
    }
    if scanlines == 0 {
        return None;
    }

    let mut sync = Layer::new(LINE_WIDTH, scanlines);
    let mut bus = Layer::new(LINE_WIDTH, scanlines);

    let mut x = 0u32;
    let mut y = 0u32;
    let mut emitting = false;
    let mut scanline_len = 0u32;

    for (i, rec) in records.iter().enumerate() {
        let prev = i.checked_sub(1).map(|p| &records[p]);
        if !emitting {
            // Wait for a falling HS edge so rows start at a known phase.
            if hs(rec) || !prev.is_some_and(|p| hs(p)) {
                continue;
            }
            emitting = true;
        }

        if hs(rec) {
            scanline_len = 0;
        } else {
            scanline_len += 1;
            if scanline_len > LINE_WIDTH * 2 {
                // Lost sync (bad capture span): restart alignment.
                x = 0;
                y += 1;
                emitting = false;
                scanline_len = 0;
                continue;
            }
        }

        sync.set(x, y, sync_color(rec));
        bus.set(x, y, bus_color(prev, rec));

        x += 1;
        if x >= LINE_WIDTH {
            x = 0;
            y += 1;
            if y >= scanlines {
                break;
            }
        }
    }

    Some(RasterImages { sync, bus })
}

#[cfg(test)]
mod tests {
    use super::*;
    use intel_8088::{AuxPins, Decoder, Snapshot};

    fn snap(sample: u64, hs: bool, vs: bool) -> Snapshot {
        Snapshot {
            sample,
            ad: 0,
            a: 0,
            status: 7,
            queue_status: 0,
            ready: true,
            aux: AuxPins {
                hs: Some(hs),
                vs: Some(vs),
                ..AuxPins::default()
            },
        }
    }

    #[test]
    fn no_sync_probe_renders_nothing() {
        let mut decoder = Decoder::new();
        let plain = Snapshot {
            sample: 0,
            ad: 0,
            a: 0,
            status: 7,
            queue_status: 0,
            ready: true,
            aux: AuxPins::default(),
        };
        let records = vec![decoder.step(&plain)];
        assert!(render_raster(&records).is_none());
    }

    #[test]
    fn scanlines_counted_from_hs_edges() {
        let mut decoder = Decoder::new();
        let mut records = Vec::new();
        let mut sample = 0;
        for _ in 0..3 {
            for _ in 0..4 {
                records.push(decoder.step(&snap(sample, true, false)));
                sample += 1;
            }
            for _ in 0..20 {
                records.push(decoder.step(&snap(sample, false, false)));
                sample += 1;
            }
        }
        let images = render_raster(&records).expect("has sync");
        assert_eq!(images.sync.height, 3);
        assert_eq!(images.sync.width, LINE_WIDTH);
    }

    #[test]
    fn suffix_insertion() {
        assert_eq!(
            suffixed(Path::new("out/trace.png"), "b"),
            PathBuf::from("out/traceb.png")
        );
    }
}
