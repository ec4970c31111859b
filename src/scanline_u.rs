//! Unpacked scanline container (ScanlineU8).
//!
//! Port of `agg_scanline_u.h`: stores per-pixel coverage values in a flat
//! array, with spans referencing into it. Every span carries one cover per
//! pixel, including the ones added through `add_span`.

use crate::basics::CoverType;
use crate::scanline::{Scanline, ScanlineRead, Span, SpanCoord};

// ============================================================================
// ScanlineSpan: a horizontal run within a scanline
// ============================================================================

/// A horizontal span within an unpacked scanline.
///
/// `len` is always positive, `cover_offset` indexes into the covers array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanlineSpan<C> {
    pub x: C,
    pub len: C,
    pub cover_offset: usize,
}

// ============================================================================
// ScanlineUnpacked: unpacked scanline with per-pixel coverage
// ============================================================================

/// Unpacked scanline container with per-pixel u8 coverage values.
///
/// Port of C++ `scanline_u8` / `scanline32_u8`. Each pixel in a span has its
/// own coverage byte, stored in a flat array indexed by `x - min_x`.
#[derive(Debug, Clone)]
pub struct ScanlineUnpacked<C: SpanCoord> {
    min_x: i32,
    last_x: i32,
    y_val: i32,
    covers: Vec<CoverType>,
    spans: Vec<ScanlineSpan<C>>,
    cur_span: usize, // index of current span (0 = sentinel, spans start at 1)
}

/// Unpacked scanline with 16-bit span coordinates.
pub type ScanlineU8 = ScanlineUnpacked<i16>;
/// Unpacked scanline with 32-bit span coordinates.
pub type Scanline32U8 = ScanlineUnpacked<i32>;

impl<C: SpanCoord> ScanlineUnpacked<C> {
    pub fn new() -> Self {
        Self {
            min_x: 0,
            last_x: 0x7FFF_FFF0,
            y_val: 0,
            covers: Vec::new(),
            spans: Vec::new(),
            cur_span: 0,
        }
    }

    /// Get the slice of active spans (for renderer iteration).
    /// Spans are 1-indexed; index 0 is a sentinel.
    pub fn begin(&self) -> &[ScanlineSpan<C>] {
        &self.spans[1..=self.cur_span]
    }

    /// Get the full covers array (spans reference into this via `cover_offset`).
    pub fn covers(&self) -> &[CoverType] {
        &self.covers
    }

    fn extend_or_start(&mut self, x: i32, xi: usize, len: usize) {
        if xi as i32 == self.last_x + 1 {
            let sp = &mut self.spans[self.cur_span];
            sp.len = C::from_i32(sp.len.to_i32() + len as i32);
        } else {
            self.cur_span += 1;
            let sp = &mut self.spans[self.cur_span];
            sp.x = C::from_i32(x);
            sp.len = C::from_i32(len as i32);
            sp.cover_offset = xi;
        }
        self.last_x = xi as i32 + len as i32 - 1;
    }
}

impl<C: SpanCoord> Default for ScanlineUnpacked<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Span iterator of an unpacked scanline.
pub struct UnpackedSpans<'a, C> {
    spans: core::slice::Iter<'a, ScanlineSpan<C>>,
    covers: &'a [CoverType],
}

impl<'a, C: SpanCoord> Iterator for UnpackedSpans<'a, C> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        let sp = self.spans.next()?;
        let start = sp.cover_offset;
        Some(Span::Cells {
            x: sp.x.to_i32(),
            covers: &self.covers[start..start + sp.len.to_i32() as usize],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl<C: SpanCoord> ScanlineRead for ScanlineUnpacked<C> {
    type Cover = CoverType;
    type Spans<'a> = UnpackedSpans<'a, C> where Self: 'a;

    fn y(&self) -> i32 {
        self.y_val
    }

    fn num_spans(&self) -> u32 {
        self.cur_span as u32
    }

    fn spans(&self) -> UnpackedSpans<'_, C> {
        UnpackedSpans {
            spans: self.begin().iter(),
            covers: &self.covers,
        }
    }
}

impl<C: SpanCoord> Scanline for ScanlineUnpacked<C> {
    fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (i64::from(max_x) - i64::from(min_x) + 2).max(2) as usize;
        if max_len > self.spans.len() {
            self.spans.resize(max_len, ScanlineSpan::default());
            self.covers.resize(max_len, 0);
        }
        self.last_x = 0x7FFF_FFF0;
        self.min_x = min_x;
        self.cur_span = 0;
    }

    fn reset_spans(&mut self) {
        self.last_x = 0x7FFF_FFF0;
        self.cur_span = 0;
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        let xi = (x - self.min_x) as usize;
        self.covers[xi] = cover as CoverType;
        self.extend_or_start(x, xi, 1);
    }

    fn add_cells(&mut self, x: i32, covers: &[CoverType]) {
        let xi = (x - self.min_x) as usize;
        self.covers[xi..xi + covers.len()].copy_from_slice(covers);
        self.extend_or_start(x, xi, covers.len());
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let xi = (x - self.min_x) as usize;
        self.covers[xi..xi + len as usize].fill(cover as CoverType);
        self.extend_or_start(x, xi, len as usize);
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
        let sl = ScanlineU8::new();
        assert_eq!(sl.num_spans(), 0);
        assert_eq!(sl.y(), 0);
    }

    #[test]
    fn test_reset_and_add_cell() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 128);
        assert_eq!(sl.num_spans(), 1);
        let spans = sl.begin();
        assert_eq!(spans[0].x, 10);
        assert_eq!(spans[0].len, 1);
        assert_eq!(sl.covers()[spans[0].cover_offset], 128);
    }

    #[test]
    fn test_adjacent_cells_merge() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 100);
        sl.add_cell(11, 200);
        sl.add_cell(12, 150);
        assert_eq!(sl.num_spans(), 1);
        let sp = sl.spans().next().unwrap();
        assert_eq!(
            sp,
            Span::Cells {
                x: 10,
                covers: &[100u8, 200, 150][..]
            }
        );
    }

    #[test]
    fn test_non_adjacent_cells_separate_spans() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 100);
        sl.add_cell(20, 200);
        assert_eq!(sl.num_spans(), 2);
        let xs: Vec<i32> = sl.spans().map(|s| s.x()).collect();
        assert_eq!(xs, vec![10, 20]);
    }

    #[test]
    fn test_add_span_expands_covers() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_span(5, 10, 255);
        assert_eq!(sl.num_spans(), 1);
        let sp = sl.spans().next().unwrap();
        assert!(!sp.is_solid());
        assert_eq!(sp.x(), 5);
        assert_eq!(sp.len(), 10);
        assert!((0..10).all(|i| sp.cover_at(i) == 255));
    }

    #[test]
    fn test_add_cells() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cells(3, &[1, 2, 3]);
        sl.add_cells(6, &[4, 5]);
        assert_eq!(sl.num_spans(), 1);
        let sp = sl.spans().next().unwrap();
        assert_eq!(sp.covers_from(3), Some(&[1u8, 2, 3, 4, 5][..]));
    }

    #[test]
    fn test_finalize() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 128);
        sl.finalize(42);
        assert_eq!(sl.y(), 42);
    }

    #[test]
    fn test_reset_spans() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 128);
        assert_eq!(sl.num_spans(), 1);
        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
        assert_eq!(sl.spans().count(), 0);
    }

    #[test]
    fn test_reset_keeps_buffers() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 1000);
        let cap = sl.covers.len();
        sl.reset(0, 10);
        assert_eq!(sl.covers.len(), cap);
        sl.add_cell(5, 1);
        sl.reset_spans();
        assert_eq!(sl.covers.len(), cap);
    }

    #[test]
    fn test_span_then_adjacent_cell() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_span(5, 3, 200);
        sl.add_cell(8, 100); // adjacent to span end (5+3-1=7, next=8)
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, 4);
    }

    #[test]
    fn test_with_min_x_offset() {
        let mut sl = ScanlineU8::new();
        sl.reset(50, 150);
        sl.add_cell(60, 128);
        sl.add_cell(61, 64);
        assert_eq!(sl.num_spans(), 1);
        let spans = sl.begin();
        assert_eq!(spans[0].x, 60);
        assert_eq!(spans[0].len, 2);
        assert_eq!(sl.covers()[spans[0].cover_offset], 128);
        assert_eq!(sl.covers()[spans[0].cover_offset + 1], 64);
    }

    #[test]
    fn test_negative_range() {
        let mut sl = ScanlineU8::new();
        sl.reset(-20, -5);
        sl.add_span(-20, 4, 77);
        sl.finalize(-3);
        let sp = sl.spans().next().unwrap();
        assert_eq!(sp.x(), -20);
        assert_eq!(sp.x_last(), -17);
        assert_eq!(sl.y(), -3);
    }

    #[test]
    fn test_32bit_coordinates() {
        let mut sl = Scanline32U8::new();
        sl.reset(100_000, 100_100);
        sl.add_span(100_010, 40, 9);
        sl.add_cell(100_050, 3);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].x, 100_010);
        assert_eq!(sl.begin()[0].len, 41);
    }

    #[test]
    #[should_panic]
    fn test_add_before_reset_panics() {
        let mut sl = ScanlineU8::new();
        sl.add_cell(0, 255);
    }
}
