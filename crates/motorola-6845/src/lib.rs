//! Motorola 6845 CRTC raster tracker.
//!
//! The 6845 does not expose its internal counters, but its HSYNC and VSYNC
//! outputs are enough to reconstruct where the beam is: a falling VS edge
//! marks a new frame, a falling HS edge a new scanline, and the horizontal
//! position advances by a fixed number of character clocks per CPU clock.
//!
//! This crate tracks those three counters from per-cycle sync-pin samples.
//! It is driven at the CPU clock rate, not the CRTC character clock; the
//! divisor converts between the two (3 hdots per CPU clock on a CGA).

/// Default hdots per CPU clock (CGA: 14.318 MHz dot clock / 4.77 MHz CPU).
pub const DEFAULT_CLOCK_DIVISOR: u32 = 3;

/// Raster position on one CPU-clock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterPos {
    /// Frame counter, incremented on each VS falling edge.
    pub frame: u64,
    /// Scanline within the frame, reset on VS, incremented on HS.
    pub scanline: u32,
    /// Horizontal position in hdots, reset on HS.
    pub r_x: u32,
}

/// Reconstructs frame/scanline/raster-x counters from HS and VS samples.
pub struct RasterTracker {
    divisor: u32,
    frame: u64,
    scanline: u32,
    r_x: u32,
    prev_hs: bool,
    prev_vs: bool,
    primed: bool,
}

impl RasterTracker {
    #[must_use]
    pub fn new(divisor: u32) -> Self {
        Self {
            divisor,
            frame: 0,
            scanline: 0,
            r_x: 0,
            prev_hs: false,
            prev_vs: false,
            primed: false,
        }
    }

    /// Advance one CPU clock with the sync pin values sampled on that edge.
    ///
    /// Returns the raster position of this cycle. The horizontal counter
    /// advances after the position is reported, so the first cycle of a
    /// scanline reads back as `r_x == 0`.
    pub fn tick(&mut self, hs: bool, vs: bool) -> RasterPos {
        if self.primed {
            if self.prev_vs && !vs {
                // VSYNC ending: new frame.
                self.frame += 1;
                self.scanline = 0;
            }
            if self.prev_hs && !hs {
                // HSYNC ending: new scanline.
                self.scanline += 1;
                self.r_x = 0;
            }
        }

        let pos = RasterPos {
            frame: self.frame,
            scanline: self.scanline,
            r_x: self.r_x,
        };

        self.r_x += self.divisor;
        self.prev_hs = hs;
        self.prev_vs = vs;
        self.primed = true;
        pos
    }
}

impl Default for RasterTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CLOCK_DIVISOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_advances_by_divisor() {
        let mut t = RasterTracker::new(3);
        assert_eq!(t.tick(false, false).r_x, 0);
        assert_eq!(t.tick(false, false).r_x, 3);
        assert_eq!(t.tick(false, false).r_x, 6);
    }

    #[test]
    fn hs_falling_edge_starts_scanline() {
        let mut t = RasterTracker::new(3);
        t.tick(false, false);
        t.tick(true, false); // HS pulse
        let pos = t.tick(false, false); // falling edge
        assert_eq!(pos.scanline, 1);
        assert_eq!(pos.r_x, 0);
        assert_eq!(t.tick(false, false).r_x, 3);
    }

    #[test]
    fn vs_falling_edge_starts_frame() {
        let mut t = RasterTracker::new(3);
        t.tick(false, false);
        for _ in 0..3 {
            t.tick(true, false);
            t.tick(false, false);
        }
        assert_eq!(t.tick(false, true).scanline, 3);
        let pos = t.tick(false, false); // VS falling edge
        assert_eq!(pos.frame, 1);
        assert_eq!(pos.scanline, 0);
    }

    #[test]
    fn coincident_sync_edges_count_frame_then_line() {
        // Both syncs ending on the same edge: frame advances and the
        // scanline reset happens before the HS increment.
        let mut t = RasterTracker::new(3);
        t.tick(false, false);
        t.tick(true, true);
        let pos = t.tick(false, false);
        assert_eq!(pos.frame, 1);
        assert_eq!(pos.scanline, 1);
        assert_eq!(pos.r_x, 0);
    }

    #[test]
    fn first_cycle_detects_no_edges() {
        // A capture can begin mid-pulse; the first sample only seeds history.
        let mut t = RasterTracker::new(3);
        let pos = t.tick(false, false);
        assert_eq!(pos.frame, 0);
        assert_eq!(pos.scanline, 0);
    }
}
