//! Packed scanline container (ScanlineP8).
//!
//! Port of `agg_scanline_p.h`: stores coverage data in a packed/RLE format.
//! Solid spans (uniform coverage) use negative `len` with a single cover value,
//! saving memory for large filled areas.

use crate::basics::CoverType;
use crate::scanline::{Scanline, ScanlineRead, Span, SpanCoord};

// ============================================================================
// PackedSpan: a span in a packed scanline
// ============================================================================

/// A span in a packed scanline.
///
/// - `len > 0`: per-pixel covers, `cover_offset` indexes into covers array
///   for `len` values
/// - `len < 0`: solid span of `-len` pixels, all with the single cover value
///   at `cover_offset`
#[derive(Debug, Clone, Copy, Default)]
pub struct PackedSpan<C> {
    pub x: C,
    pub len: C,
    pub cover_offset: usize,
}

// ============================================================================
// ScanlinePacked: packed scanline with RLE for solid spans
// ============================================================================

/// Packed scanline container with RLE compression for solid (uniform-cover) spans.
///
/// Port of C++ `scanline_p8` / `scanline32_p8`. `add_span` is O(1) no
/// matter how long the run is: it stores a negative `len` and one cover.
#[derive(Debug, Clone)]
pub struct ScanlinePacked<C: SpanCoord> {
    last_x: i32,
    y_val: i32,
    covers: Vec<CoverType>,
    cover_ptr: usize,
    spans: Vec<PackedSpan<C>>,
    cur_span: usize,
}

/// Packed scanline with 16-bit span coordinates.
pub type ScanlineP8 = ScanlinePacked<i16>;
/// Packed scanline with 32-bit span coordinates.
pub type Scanline32P8 = ScanlinePacked<i32>;

impl<C: SpanCoord> ScanlinePacked<C> {
    pub fn new() -> Self {
        Self {
            last_x: 0x7FFF_FFF0,
            y_val: 0,
            covers: Vec::new(),
            cover_ptr: 0,
            spans: Vec::new(),
            cur_span: 0,
        }
    }

    /// Get the slice of active spans (for renderer iteration).
    pub fn begin(&self) -> &[PackedSpan<C>] {
        &self.spans[1..=self.cur_span]
    }

    /// Get the full covers array (spans reference into this via `cover_offset`).
    pub fn covers(&self) -> &[CoverType] {
        &self.covers
    }

    fn cur_len(&self) -> i32 {
        self.spans[self.cur_span].len.to_i32()
    }

    fn start_span(&mut self, x: i32, len: i32) {
        self.cur_span += 1;
        let sp = &mut self.spans[self.cur_span];
        sp.cover_offset = self.cover_ptr;
        sp.x = C::from_i32(x);
        sp.len = C::from_i32(len);
    }
}

impl<C: SpanCoord> Default for ScanlinePacked<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Span iterator of a packed scanline.
pub struct PackedSpans<'a, C> {
    spans: core::slice::Iter<'a, PackedSpan<C>>,
    covers: &'a [CoverType],
}

impl<'a, C: SpanCoord> Iterator for PackedSpans<'a, C> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        let sp = self.spans.next()?;
        let x = sp.x.to_i32();
        let len = sp.len.to_i32();
        Some(if len < 0 {
            Span::Solid {
                x,
                len: len.unsigned_abs(),
                cover: self.covers[sp.cover_offset],
            }
        } else {
            Span::Cells {
                x,
                covers: &self.covers[sp.cover_offset..sp.cover_offset + len as usize],
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl<C: SpanCoord> ScanlineRead for ScanlinePacked<C> {
    type Cover = CoverType;
    type Spans<'a> = PackedSpans<'a, C> where Self: 'a;

    fn y(&self) -> i32 {
        self.y_val
    }

    fn num_spans(&self) -> u32 {
        self.cur_span as u32
    }

    fn spans(&self) -> PackedSpans<'_, C> {
        PackedSpans {
            spans: self.begin().iter(),
            covers: &self.covers,
        }
    }
}

impl<C: SpanCoord> Scanline for ScanlinePacked<C> {
    fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (i64::from(max_x) - i64::from(min_x) + 3).max(3) as usize;
        if max_len > self.spans.len() {
            self.spans.resize(max_len, PackedSpan::default());
            self.covers.resize(max_len, 0);
        }
        self.last_x = 0x7FFF_FFF0;
        self.cover_ptr = 0;
        self.cur_span = 0;
        self.spans[0].len = C::default();
    }

    fn reset_spans(&mut self) {
        self.last_x = 0x7FFF_FFF0;
        self.cover_ptr = 0;
        self.cur_span = 0;
        self.spans[0].len = C::default();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        self.covers[self.cover_ptr] = cover as CoverType;
        if x == self.last_x + 1 && self.cur_len() > 0 {
            let sp = &mut self.spans[self.cur_span];
            sp.len = C::from_i32(sp.len.to_i32() + 1);
        } else {
            self.start_span(x, 1);
        }
        self.last_x = x;
        self.cover_ptr += 1;
    }

    fn add_cells(&mut self, x: i32, covers: &[CoverType]) {
        let len = covers.len();
        self.covers[self.cover_ptr..self.cover_ptr + len].copy_from_slice(covers);
        if x == self.last_x + 1 && self.cur_len() > 0 {
            let sp = &mut self.spans[self.cur_span];
            sp.len = C::from_i32(sp.len.to_i32() + len as i32);
        } else {
            self.start_span(x, len as i32);
        }
        self.cover_ptr += len;
        self.last_x = x + len as i32 - 1;
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        if x == self.last_x + 1
            && self.cur_len() < 0
            && cover as CoverType == self.covers[self.spans[self.cur_span].cover_offset]
        {
            // Extend the existing solid span
            let sp = &mut self.spans[self.cur_span];
            sp.len = C::from_i32(sp.len.to_i32() - len as i32);
        } else {
            self.covers[self.cover_ptr] = cover as CoverType;
            self.start_span(x, -(len as i32));
            self.cover_ptr += 1;
        }
        self.last_x = x + len as i32 - 1;
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
        let sl = ScanlineP8::new();
        assert_eq!(sl.num_spans(), 0);
    }

    #[test]
    fn test_add_cell() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 128);
        assert_eq!(sl.num_spans(), 1);
        let spans = sl.begin();
        assert_eq!(spans[0].x, 10);
        assert_eq!(spans[0].len, 1); // positive = per-pixel
        assert_eq!(sl.covers()[spans[0].cover_offset], 128);
    }

    #[test]
    fn test_adjacent_cells_form_per_pixel_span() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 100);
        sl.add_cell(11, 200);
        sl.add_cell(12, 150);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, 3);
        let sp = sl.spans().next().unwrap();
        assert_eq!(sp.covers_from(10), Some(&[100u8, 200, 150][..]));
    }

    #[test]
    fn test_add_span_creates_solid_span() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_span(5, 10, 255);
        assert_eq!(sl.num_spans(), 1);
        let spans = sl.begin();
        assert_eq!(spans[0].x, 5);
        assert_eq!(spans[0].len, -10); // negative = solid span
        assert_eq!(sl.covers()[spans[0].cover_offset], 255);
        assert_eq!(
            sl.spans().next(),
            Some(Span::Solid {
                x: 5,
                len: 10,
                cover: 255
            })
        );
    }

    #[test]
    fn test_adjacent_solid_spans_merge() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_span(5, 10, 255);
        sl.add_span(15, 5, 255); // adjacent, same cover → merge
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, -15);
    }

    #[test]
    fn test_adjacent_solid_spans_different_cover_no_merge() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_span(5, 10, 255);
        sl.add_span(15, 5, 128); // adjacent but different cover
        assert_eq!(sl.num_spans(), 2);
    }

    #[test]
    fn test_cell_after_solid_span_new_span() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_span(5, 3, 200);
        sl.add_cell(8, 100); // adjacent to solid span end, but cell creates per-pixel span
        assert_eq!(sl.num_spans(), 2);
    }

    #[test]
    fn test_solid_after_cells_new_span() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_cell(4, 200);
        sl.add_span(5, 3, 200);
        assert_eq!(sl.num_spans(), 2);
        let kinds: Vec<bool> = sl.spans().map(|s| s.is_solid()).collect();
        assert_eq!(kinds, vec![false, true]);
    }

    #[test]
    fn test_add_cells_merges_with_cells() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_cell(9, 1);
        sl.add_cells(10, &[2, 3, 4]);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, 4);

        sl.add_span(14, 2, 9);
        sl.add_cells(16, &[5, 6]);
        assert_eq!(sl.num_spans(), 3);
        let lens: Vec<i32> = sl.spans().map(|s| s.signed_len()).collect();
        assert_eq!(lens, vec![4, -2, 2]);
    }

    #[test]
    fn test_min_x_offset_sizing() {
        let mut sl = ScanlineP8::new();
        sl.reset(1000, 1010);
        for x in 1000..=1010 {
            sl.add_cell(x, (x - 1000) as u32);
        }
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, 11);
    }

    #[test]
    fn test_reset_spans() {
        let mut sl = ScanlineP8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 128);
        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
        // The sentinel must not let a fresh solid span merge with stale data.
        sl.add_span(11, 2, 128);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].x, 11);
    }

    #[test]
    fn test_32bit_long_solid_span() {
        let mut sl = Scanline32P8::new();
        sl.reset(0, 10);
        sl.add_span(0, 70_000, 255);
        sl.add_span(70_000, 30_000, 255);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(sl.begin()[0].len, -100_000);
    }
}
