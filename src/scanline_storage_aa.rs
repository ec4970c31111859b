//! Anti-aliased scanline storage.
//!
//! Port of `agg_scanline_storage_aa.h`.
//! Stores rendered scanlines in memory for later boolean operations
//! or serialized replay. Coverage runs live in a [`ScanlineCellStorage`];
//! spans keep only a [`CellRef`] to them.
//!
//! Stored rows can be read back three ways, all through the same
//! [`StoredScanline`] view:
//! - materializing: [`ScanlineGenerator::sweep_scanline`] copies the next
//!   row into a caller's container;
//! - embedded: [`ScanlineStorageAa::sweep_embedded`] hands out the view
//!   itself, advancing the same cursor;
//! - random access: [`ScanlineStorageAa::scanline`] and
//!   [`ScanlineStorageAa::scanlines`], which leave the cursor alone.

use crate::scanline::{
    CoverValue, Scanline, ScanlineGenerator, ScanlineRead, ScanlineRenderer, Span,
};
use crate::scanline_cell_storage::{CellRef, ScanlineCellStorage};
use crate::scanline_serialization::{check_capacity, ByteWriter, SerializeError, HEADER_SIZE};

/// Stored span: x, len (positive=per-pixel, negative=solid), covers reference.
#[derive(Debug, Clone, Copy)]
struct SpanData {
    x: i32,
    len: i32,
    covers: CellRef,
}

/// Per-scanline metadata.
#[derive(Debug, Clone, Copy, Default)]
struct ScanlineData {
    y: i32,
    num_spans: u32,
    start_span: usize,
}

/// Anti-aliased scanline storage.
///
/// Port of C++ `scanline_storage_aa<T>`. `T` is the width of a stored
/// coverage value (see the `ScanlineStorageAa8/16/32` aliases); it only
/// matters for memory use and for the serialized layout.
///
/// `Clone` is a deep copy.
#[derive(Debug, Clone)]
pub struct ScanlineStorageAa<T: CoverValue> {
    covers: ScanlineCellStorage<T>,
    spans: Vec<SpanData>,
    scanlines: Vec<ScanlineData>,
    scratch: Vec<T>,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    cur_scanline: usize,
}

pub type ScanlineStorageAa8 = ScanlineStorageAa<u8>;
pub type ScanlineStorageAa16 = ScanlineStorageAa<u16>;
pub type ScanlineStorageAa32 = ScanlineStorageAa<u32>;

impl<T: CoverValue> ScanlineStorageAa<T> {
    pub fn new() -> Self {
        Self {
            covers: ScanlineCellStorage::new(),
            spans: Vec::new(),
            scanlines: Vec::new(),
            scratch: Vec::new(),
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            cur_scanline: 0,
        }
    }

    /// Prepare for new rendering (clear all stored data, re-arm bounds).
    pub fn prepare(&mut self) {
        self.covers.remove_all();
        self.spans.clear();
        self.scanlines.clear();
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.cur_scanline = 0;
    }

    /// Store a finalized scanline.
    ///
    /// Accepts any container, or a row of another storage. Rows with no
    /// spans are recorded (and extend the Y bounds) but are skipped on replay.
    pub fn render<SL: ScanlineRead>(&mut self, sl: &SL)
    where
        SL::Cover: CoverValue,
    {
        let y = sl.y();
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);

        let start_span = self.spans.len();
        for sp in sl.spans() {
            let x = sp.x();
            let covers = match sp {
                Span::Solid { cover, .. } => {
                    self.covers.add_cells(&[T::from_cover(cover.to_cover())])
                }
                Span::Cells { covers, .. } => {
                    self.scratch.clear();
                    self.scratch
                        .extend(covers.iter().map(|c| T::from_cover(c.to_cover())));
                    self.covers.add_cells(&self.scratch)
                }
            };
            self.min_x = self.min_x.min(x);
            self.max_x = self.max_x.max(sp.x_last());
            self.spans.push(SpanData {
                x,
                len: sp.signed_len(),
                covers,
            });
        }

        self.scanlines.push(ScanlineData {
            y,
            num_spans: (self.spans.len() - start_span) as u32,
            start_span,
        });
    }

    /// Number of stored rows, including rows with no spans.
    pub fn num_scanlines(&self) -> usize {
        self.scanlines.len()
    }

    /// View of the stored row `idx` (in render order).
    pub fn scanline(&self, idx: usize) -> Option<StoredScanline<'_, T>> {
        self.scanlines.get(idx).map(|&row| self.view(row))
    }

    /// All non-empty rows in render order. Doesn't touch the sweep cursor.
    pub fn scanlines(&self) -> impl Iterator<Item = StoredScanline<'_, T>> + '_ {
        self.scanlines
            .iter()
            .filter(|row| row.num_spans > 0)
            .map(move |&row| self.view(row))
    }

    /// Embedded (zero-copy) sweep: the next non-empty row as a view into
    /// the storage, advancing the same cursor as `sweep_scanline`.
    pub fn sweep_embedded(&mut self) -> Option<StoredScanline<'_, T>> {
        let row = self.next_row()?;
        Some(self.view(row))
    }

    /// Exact number of bytes [`serialize`](Self::serialize) writes.
    pub fn byte_size(&self) -> usize {
        let spans: usize = self
            .spans
            .iter()
            .map(|sp| {
                let covers = if sp.len < 0 { 1 } else { sp.len as usize };
                4 * 2 + covers * T::BYTES
            })
            .sum();
        HEADER_SIZE + self.scanlines.len() * 4 * 2 + spans
    }

    /// Write the storage into `data` and return the number of bytes written.
    ///
    /// Fails without writing anything if `data` is shorter than
    /// [`byte_size`](Self::byte_size).
    pub fn serialize(&self, data: &mut [u8]) -> Result<usize, SerializeError> {
        check_capacity(self.byte_size(), data.len())?;

        // Writer indexes unchecked; `data` holds at least byte_size() bytes.
        let mut w = ByteWriter::new(data);
        w.write_i32(self.min_x);
        w.write_i32(self.min_y);
        w.write_i32(self.max_x);
        w.write_i32(self.max_y);

        for &row in &self.scanlines {
            w.write_i32(row.y);
            w.write_i32(row.num_spans as i32);
            for sp in self.view(row).spans() {
                w.write_i32(sp.x());
                w.write_i32(sp.signed_len());
                match sp {
                    Span::Solid { cover, .. } => w.write_cover(cover),
                    Span::Cells { covers, .. } => {
                        for &c in covers {
                            w.write_cover(c);
                        }
                    }
                }
            }
        }
        Ok(w.position())
    }

    pub fn serialize_to_vec(&self) -> Vec<u8> {
        let mut data = vec![0u8; self.byte_size()];
        // The buffer is sized by byte_size, so this can't fail.
        let written = self.serialize(&mut data).unwrap_or(0);
        data.truncate(written);
        data
    }

    fn view(&self, row: ScanlineData) -> StoredScanline<'_, T> {
        StoredScanline {
            covers: &self.covers,
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

impl<T: CoverValue> Default for ScanlineStorageAa<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: CoverValue> ScanlineGenerator for ScanlineStorageAa<T> {
    fn rewind_scanlines(&mut self) -> bool {
        self.cur_scanline = 0;
        !self.scanlines.is_empty()
    }

    fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        sl.reset_spans();
        let Some(row) = self.next_row() else {
            return false;
        };
        let view = self.view(row);
        for sp in view.spans() {
            match sp {
                Span::Solid { x, len, cover } => sl.add_span(x, len, cover.to_cover()),
                Span::Cells { x, covers } => T::add_cells_to(x, covers, sl),
            }
        }
        sl.finalize(view.y);
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

impl<T: CoverValue> ScanlineRenderer for ScanlineStorageAa<T> {
    fn prepare(&mut self) {
        ScanlineStorageAa::prepare(self);
    }

    fn render<SL: ScanlineRead>(&mut self, sl: &SL)
    where
        SL::Cover: CoverValue,
    {
        ScanlineStorageAa::render(self, sl);
    }
}

// ============================================================================
// StoredScanline: zero-copy view of one stored row
// ============================================================================

/// A stored row, read in place (C++ `embedded_scanline`).
#[derive(Debug, Clone, Copy)]
pub struct StoredScanline<'a, T: CoverValue> {
    covers: &'a ScanlineCellStorage<T>,
    spans: &'a [SpanData],
    y: i32,
}

impl<'a, T: CoverValue> StoredScanline<'a, T> {
    /// Spans of this row, borrowing the storage rather than the view.
    pub fn spans(&self) -> StoredSpans<'a, T> {
        StoredSpans {
            covers: self.covers,
            spans: self.spans.iter(),
        }
    }
}

/// Span iterator of a [`StoredScanline`].
pub struct StoredSpans<'a, T: CoverValue> {
    covers: &'a ScanlineCellStorage<T>,
    spans: core::slice::Iter<'a, SpanData>,
}

impl<'a, T: CoverValue> Iterator for StoredSpans<'a, T> {
    type Item = Span<'a, T>;

    fn next(&mut self) -> Option<Span<'a, T>> {
        let sp = self.spans.next()?;
        Some(if sp.len < 0 {
            Span::Solid {
                x: sp.x,
                len: sp.len.unsigned_abs(),
                cover: self
                    .covers
                    .get(sp.covers, 1)
                    .map_or_else(T::default, |c| c[0]),
            }
        } else {
            Span::Cells {
                x: sp.x,
                covers: self
                    .covers
                    .get(sp.covers, sp.len as usize)
                    .unwrap_or_default(),
            }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl<'a, T: CoverValue> ScanlineRead for StoredScanline<'a, T> {
    type Cover = T;
    type Spans<'b> = StoredSpans<'b, T> where Self: 'b;

    fn y(&self) -> i32 {
        self.y
    }

    fn num_spans(&self) -> u32 {
        self.spans.len() as u32
    }

    fn spans(&self) -> StoredSpans<'a, T> {
        StoredScanline::spans(self)
    }
}

// ============================================================================
// Tests
// ============================================================================
