//! Binary scanline container (ScanlineBin).
//!
//! Port of `agg_scanline_bin.h`: simplest scanline type with no coverage
//! data. Each span just records X and length; cover arguments are accepted
//! and ignored. Used when anti-aliasing is disabled.

use crate::basics::{CoverType, COVER_FULL};
use crate::scanline::{Scanline, ScanlineRead, Span, SpanCoord};

// ============================================================================
// BinSpan: a span in a binary scanline
// ============================================================================

/// A horizontal span in a binary scanline (no coverage data).
#[derive(Debug, Clone, Copy, Default)]
pub struct BinSpan<C> {
    pub x: C,
    pub len: C,
}

// ============================================================================
// ScanlineBinary: binary scanline (no coverage data)
// ============================================================================

/// Binary scanline container: no per-pixel coverage, just on/off spans.
///
/// Port of C++ `scanline_bin` / `scanline32_bin`. Read back through
/// [`ScanlineRead`], every span is solid with full coverage.
#[derive(Debug, Clone)]
pub struct ScanlineBinary<C: SpanCoord> {
    last_x: i32,
    y_val: i32,
    spans: Vec<BinSpan<C>>,
    cur_span: usize,
}

/// Binary scanline with 16-bit span coordinates.
pub type ScanlineBin = ScanlineBinary<i16>;
/// Binary scanline with 32-bit span coordinates.
pub type Scanline32Bin = ScanlineBinary<i32>;

impl<C: SpanCoord> ScanlineBinary<C> {
    pub fn new() -> Self {
        Self {
            last_x: 0x7FFF_FFF0,
            y_val: 0,
            spans: Vec::new(),
            cur_span: 0,
        }
    }

    /// Get the slice of active spans (for renderer iteration).
    pub fn begin(&self) -> &[BinSpan<C>] {
        &self.spans[1..=self.cur_span]
    }

    fn push_run(&mut self, x: i32, len: i32) {
        if x == self.last_x + 1 {
            let sp = &mut self.spans[self.cur_span];
            sp.len = C::from_i32(sp.len.to_i32() + len);
        } else {
            self.cur_span += 1;
            let sp = &mut self.spans[self.cur_span];
            sp.x = C::from_i32(x);
            sp.len = C::from_i32(len);
        }
        self.last_x = x + len - 1;
    }
}

impl<C: SpanCoord> Default for ScanlineBinary<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Span iterator of a binary scanline.
pub struct BinSpans<'a, C> {
    spans: core::slice::Iter<'a, BinSpan<C>>,
}

impl<'a, C: SpanCoord> Iterator for BinSpans<'a, C> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        self.spans.next().map(|sp| Span::Solid {
            x: sp.x.to_i32(),
            len: sp.len.to_i32() as u32,
            cover: COVER_FULL,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl<C: SpanCoord> ScanlineRead for ScanlineBinary<C> {
    type Cover = CoverType;
    type Spans<'a> = BinSpans<'a, C> where Self: 'a;

    fn y(&self) -> i32 {
        self.y_val
    }

    fn num_spans(&self) -> u32 {
        self.cur_span as u32
    }

    fn spans(&self) -> BinSpans<'_, C> {
        BinSpans {
            spans: self.begin().iter(),
        }
    }
}

impl<C: SpanCoord> Scanline for ScanlineBinary<C> {
    fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (i64::from(max_x) - i64::from(min_x) + 3).max(3) as usize;
        if max_len > self.spans.len() {
            self.spans.resize(max_len, BinSpan::default());
        }
        self.last_x = 0x7FFF_FFF0;
        self.cur_span = 0;
    }

    fn reset_spans(&mut self) {
        self.last_x = 0x7FFF_FFF0;
        self.cur_span = 0;
    }

    fn add_cell(&mut self, x: i32, _cover: u32) {
        self.push_run(x, 1);
    }

    fn add_cells(&mut self, x: i32, covers: &[CoverType]) {
        self.push_run(x, covers.len() as i32);
    }

    fn add_span(&mut self, x: i32, len: u32, _cover: u32) {
        self.push_run(x, len as i32);
    }

    fn finalize(&mut self, y: i32) {
        self.y_val = y;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let sl = ScanlineBin::new();
        assert_eq!(sl.num_spans(), 0);
    }

    #[test]
    fn test_add_cell() {
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_cell(10, 255);
        assert_eq!(sl.num_spans(), 1);
        let spans = sl.begin();
        assert_eq!(spans[0].x, 10);
        assert_eq!(spans[0].len, 1);
    }

    #[test]
    fn test_adjacent_cells_merge_ignoring_cover() {
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_cell(10, 255);
        sl.add_cell(11, 128);
        sl.add_cell(12, 64);
        assert_eq!(sl.num_spans(), 1);
        let spans = sl.begin();
        assert_eq!(spans[0].x, 10);
        assert_eq!(spans[0].len, 3);
    }

    #[test]
    fn test_add_span() {
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_span(5, 10, 17);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(
            sl.spans().next(),
            Some(Span::Solid {
                x: 5,
                len: 10,
                cover: COVER_FULL
            })
        );
    }

    #[test]
    fn test_add_cells_counts_length_only() {
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_cells(5, &[0, 1, 2, 3]);
        sl.add_span(9, 2, 0);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, 6);
    }

    #[test]
    fn test_separate_spans() {
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_cell(10, 255);
        sl.add_cell(20, 255);
        assert_eq!(sl.num_spans(), 2);
    }

    #[test]
    fn test_reset_spans() {
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_cell(10, 255);
        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
    }

    #[test]
    fn test_32bit_variant() {
        let mut sl = Scanline32Bin::new();
        sl.reset(-50_000, 50_000);
        sl.add_span(-50_000, 100_001, 255);
        sl.finalize(9);
        assert_eq!(sl.begin()[0].len, 100_001);
        assert_eq!(sl.spans().next().map(|s| s.x_last()), Some(50_000));
    }
}
