//! Binary (non-AA) scanline storage.
//!
//! Port of `agg_scanline_storage_bin.h`.
//! Stores rasterized scanlines without coverage data, for boolean
//! operations on binary (non-anti-aliased) shapes.

use crate::basics::{CoverType, COVER_FULL};
use crate::scanline::{
    CoverValue, Scanline, ScanlineGenerator, ScanlineRead, ScanlineRenderer, Span,
};
use crate::scanline_serialization::{check_capacity, ByteWriter, SerializeError, HEADER_SIZE};

/// Stored span data: x and len only (no coverage).
#[derive(Debug, Clone, Copy, Default)]
struct SpanData {
    x: i32,
    len: i32,
}

/// Per-scanline metadata.
#[derive(Debug, Clone, Copy, Default)]
struct ScanlineData {
    y: i32,
    num_spans: u32,
    start_span: usize,
}

/// Binary (non-AA) scanline storage.
///
/// Port of C++ `scanline_storage_bin`.
/// Like `ScanlineStorageAa` but stores only span extents; whatever
/// coverage the rendered rows carried is dropped.
#[derive(Debug, Clone)]
pub struct ScanlineStorageBin {
    spans: Vec<SpanData>,
    scanlines: Vec<ScanlineData>,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    cur_scanline: usize,
}

impl ScanlineStorageBin {
    pub fn new() -> Self {
        Self {
            spans: Vec::new(),
            scanlines: Vec::new(),
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            cur_scanline: 0,
        }
    }

    /// Prepare for new rendering (clear all stored data).
    pub fn prepare(&mut self) {
        self.spans.clear();
        self.scanlines.clear();
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.cur_scanline = 0;
    }

    /// Store the span extents of a finalized scanline of any kind.
    pub fn render<SL: ScanlineRead>(&mut self, sl: &SL) {
        let y = sl.y();
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);

        let start_span = self.spans.len();
        for sp in sl.spans() {
            self.min_x = self.min_x.min(sp.x());
            self.max_x = self.max_x.max(sp.x_last());
            self.spans.push(SpanData {
                x: sp.x(),
                len: sp.len() as i32,
            });
        }

        self.scanlines.push(ScanlineData {
            y,
            num_spans: (self.spans.len() - start_span) as u32,
            start_span,
        });
    }

    pub fn num_scanlines(&self) -> usize {
        self.scanlines.len()
    }

    pub fn scanline(&self, idx: usize) -> Option<StoredBinScanline<'_>> {
        self.scanlines.get(idx).map(|&row| self.view(row))
    }

    /// All non-empty rows in render order. Doesn't touch the sweep cursor.
    pub fn scanlines(&self) -> impl Iterator<Item = StoredBinScanline<'_>> + '_ {
        self.scanlines
            .iter()
            .filter(|row| row.num_spans > 0)
            .map(move |&row| self.view(row))
    }

    pub fn sweep_embedded(&mut self) -> Option<StoredBinScanline<'_>> {
        let row = self.next_row()?;
        Some(self.view(row))
    }

    /// Exact number of bytes [`serialize`](Self::serialize) writes.
    pub fn byte_size(&self) -> usize {
        HEADER_SIZE + self.scanlines.len() * 4 * 2 + self.spans.len() * 4 * 2
    }

    /// Write the storage into `data` and return the number of bytes written.
    pub fn serialize(&self, data: &mut [u8]) -> Result<usize, SerializeError> {
        check_capacity(self.byte_size(), data.len())?;

        // Writer indexes unchecked; `data` holds at least byte_size() bytes.
        let mut w = ByteWriter::new(data);
        w.write_i32(self.min_x);
        w.write_i32(self.min_y);
        w.write_i32(self.max_x);
        w.write_i32(self.max_y);

        for row in &self.scanlines {
            w.write_i32(row.y);
            w.write_i32(row.num_spans as i32);
            for sp in &self.spans[row.start_span..row.start_span + row.num_spans as usize] {
                w.write_i32(sp.x);
                w.write_i32(sp.len);
            }
        }
        Ok(w.position())
    }

    pub fn serialize_to_vec(&self) -> Vec<u8> {
        let mut data = vec![0u8; self.byte_size()];
        let written = self.serialize(&mut data).unwrap_or(0);
        data.truncate(written);
        data
    }

    fn view(&self, row: ScanlineData) -> StoredBinScanline<'_> {
        StoredBinScanline {
            spans: &self.spans[row.start_span..row.start_span + row.num_spans as usize],
            y: row.y,
        }
    }

    fn next_row(&mut self) -> Option<ScanlineData> {
        while let Some(&row) = self.scanlines.get(self.cur_scanline) {
            self.cur_scanline += 1;
            if row.num_spans > 0 {
                return Some(row);
            }
        }
        None
    }
}

impl Default for ScanlineStorageBin {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanlineGenerator for ScanlineStorageBin {
    fn rewind_scanlines(&mut self) -> bool {
        self.cur_scanline = 0;
        !self.scanlines.is_empty()
    }

    fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        sl.reset_spans();
        let Some(row) = self.next_row() else {
            return false;
        };
        for sp in self.view(row).spans {
            sl.add_span(sp.x, sp.len as u32, COVER_FULL as u32);
        }
        sl.finalize(row.y);
        true
    }

    fn min_x(&self) -> i32 {
        self.min_x
    }
    fn min_y(&self) -> i32 {
        self.min_y
    }
    fn max_x(&self) -> i32 {
        self.max_x
    }
    fn max_y(&self) -> i32 {
        self.max_y
    }
}

impl ScanlineRenderer for ScanlineStorageBin {
    fn prepare(&mut self) {
        ScanlineStorageBin::prepare(self);
    }

    fn render<SL: ScanlineRead>(&mut self, sl: &SL)
    where
        SL::Cover: CoverValue,
    {
        ScanlineStorageBin::render(self, sl);
    }
}

// ============================================================================
// StoredBinScanline: zero-copy view of one stored row
// ============================================================================

/// A stored binary row, read in place. Spans read back as solid full-cover
/// runs.
#[derive(Debug, Clone, Copy)]
pub struct StoredBinScanline<'a> {
    spans: &'a [SpanData],
    y: i32,
}

impl<'a> StoredBinScanline<'a> {
    /// Spans of this row, borrowing the storage rather than the view.
    pub fn spans(&self) -> StoredBinSpans<'a> {
        StoredBinSpans {
            spans: self.spans.iter(),
        }
    }
}

pub struct StoredBinSpans<'a> {
    spans: core::slice::Iter<'a, SpanData>,
}

impl<'a> Iterator for StoredBinSpans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Span<'a>> {
        self.spans.next().map(|sp| Span::Solid {
            x: sp.x,
            len: sp.len as u32,
            cover: COVER_FULL,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl<'a> ScanlineRead for StoredBinScanline<'a> {
    type Cover = CoverType;
    type Spans<'b> = StoredBinSpans<'b> where Self: 'b;

    fn y(&self) -> i32 {
        self.y
    }

    fn num_spans(&self) -> u32 {
        self.spans.len() as u32
    }

    fn spans(&self) -> StoredBinSpans<'a> {
        StoredBinScanline::spans(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanline_bin::ScanlineBin;
    use crate::scanline_p::ScanlineP8;
    use crate::scanline_serialization::SerializedScanlinesAdaptorBin;
    use crate::scanline_u::ScanlineU8;

    fn extents<SL: ScanlineRead>(sl: &SL) -> Vec<(i32, u32)> {
        sl.spans().map(|s| (s.x(), s.len())).collect()
    }

    fn sample_storage() -> ScanlineStorageBin {
        let mut storage = ScanlineStorageBin::new();
        let mut sl = ScanlineBin::new();
        sl.reset(0, 100);
        sl.add_span(10, 5, 255);
        sl.add_cell(30, 255);
        sl.finalize(2);
        storage.render(&sl);
        sl.reset_spans();
        sl.finalize(3);
        storage.render(&sl);
        sl.add_span(-4, 8, 0);
        sl.finalize(4);
        storage.render(&sl);
        storage
    }

    #[test]
    fn test_empty_storage() {
        let mut storage = ScanlineStorageBin::new();
        assert_eq!(storage.num_scanlines(), 0);
        assert!(!storage.rewind_scanlines());
        assert_eq!(storage.byte_size(), HEADER_SIZE);
    }

    #[test]
    fn test_store_and_replay() {
        let mut storage = sample_storage();
        assert_eq!(storage.num_scanlines(), 3);
        assert_eq!(storage.bounding_rect(), crate::basics::RectI::new(-4, 2, 30, 4));

        assert!(storage.rewind_scanlines());
        let mut sl = ScanlineBin::new();
        sl.reset(storage.min_x(), storage.max_x());
        assert!(storage.sweep_scanline(&mut sl));
        assert_eq!(sl.y(), 2);
        assert_eq!(extents(&sl), vec![(10, 5), (30, 1)]);
        assert!(storage.sweep_scanline(&mut sl));
        assert_eq!(sl.y(), 4);
        assert_eq!(extents(&sl), vec![(-4, 8)]);
        assert!(!storage.sweep_scanline(&mut sl));
        assert!(!storage.sweep_scanline(&mut sl));
    }

    #[test]
    fn test_stored_spans_outlive_row_view() {
        let storage = sample_storage();
        let extents: Vec<(i32, u32)> = storage
            .scanline(0)
            .unwrap()
            .spans()
            .map(|s| (s.x(), s.len()))
            .collect();
        assert_eq!(extents, vec![(10, 5), (30, 1)]);
    }

    #[test]
    fn test_render_drops_coverage() {
        let mut storage = ScanlineStorageBin::new();
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cells(10, &[1, 2, 3]);
        sl.add_cell(20, 9);
        sl.finalize(0);
        storage.render(&sl);

        assert!(storage.rewind_scanlines());
        let mut out = ScanlineP8::new();
        out.reset(0, 100);
        assert!(storage.sweep_scanline(&mut out));
        let spans: Vec<Span<'_>> = out.spans().collect();
        assert_eq!(
            spans,
            vec![
                Span::Solid { x: 10, len: 3, cover: 255 },
                Span::Solid { x: 20, len: 1, cover: 255 },
            ]
        );
    }

    #[test]
    fn test_embedded_views() {
        let mut storage = sample_storage();
        assert_eq!(storage.scanline(1).map(|r| r.num_spans()), Some(0));
        let ys: Vec<i32> = storage.scanlines().map(|r| r.y()).collect();
        assert_eq!(ys, vec![2, 4]);

        storage.rewind_scanlines();
        let row = storage.sweep_embedded().unwrap();
        assert_eq!(extents(&row), vec![(10, 5), (30, 1)]);
        assert_eq!(storage.sweep_embedded().map(|r| r.y()), Some(4));
        assert!(storage.sweep_embedded().is_none());
    }

    #[test]
    fn test_serialize_layout() {
        let storage = sample_storage();
        assert_eq!(storage.byte_size(), 16 + 3 * 8 + 3 * 8);
        let data = storage.serialize_to_vec();
        assert_eq!(data.len(), storage.byte_size());
        let words: Vec<i32> = data
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        assert_eq!(
            words,
            vec![-4, 2, 30, 4, 2, 2, 10, 5, 30, 1, 3, 0, 4, 1, -4, 8]
        );

        let mut short = vec![0u8; 10];
        assert!(matches!(
            storage.serialize(&mut short),
            Err(SerializeError::BufferTooSmall { needed: 64, available: 10 })
        ));
    }

    #[test]
    fn test_serialize_round_trip() {
        let storage = sample_storage();
        let data = storage.serialize_to_vec();
        let mut ad = SerializedScanlinesAdaptorBin::new(&data, data.len(), 0, 10);
        assert!(ad.rewind_scanlines());
        assert_eq!(ad.min_y(), 12);
        let mut sl = ScanlineBin::new();
        sl.reset(ad.min_x(), ad.max_x());
        assert!(ad.sweep_scanline(&mut sl));
        assert_eq!((sl.y(), extents(&sl)), (12, vec![(10, 5), (30, 1)]));
        assert!(ad.sweep_scanline(&mut sl));
        assert_eq!((sl.y(), extents(&sl)), (14, vec![(-4, 8)]));
        assert!(!ad.sweep_scanline(&mut sl));
    }
}
