//! Serialized scanline streams.
//!
//! Port of the serialization half of `agg_scanline_storage_aa.h` and
//! `agg_scanline_storage_bin.h`. Storages write themselves with
//! `serialize()`; the adaptors here replay such a byte buffer as a
//! [`ScanlineGenerator`], translating every coordinate by `(dx, dy)`.
//!
//! Layout (little-endian `i32` unless noted):
//!
//! ```text
//! min_x, min_y, max_x, max_y
//! per row:   y, num_spans
//! per span:  x, len            (len < 0: solid span of -len pixels)
//!            AA only: one cover if len < 0, else len covers
//!                     (1, 2 or 4 bytes each, see CoverValue::BYTES)
//! ```
//!
//! The buffer is never modified by an adaptor, so any number of adaptors
//! may read the same bytes, each with its own cursor.

use core::marker::PhantomData;

use thiserror::Error;

use crate::basics::COVER_FULL;
use crate::scanline::{CoverValue, Scanline, ScanlineGenerator};

/// Size of the bounds header at the start of every stream.
pub const HEADER_SIZE: usize = 4 * 4;

// ============================================================================
// Errors
// ============================================================================

/// Error returned when a storage can't be written into the given buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializeError {
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Reason a serialized stream ended early.
///
/// Adaptors never return this from a sweep; the sweep just reports "no more
/// rows" and the error stays available through `error()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("stream of {len} bytes is shorter than the {HEADER_SIZE}-byte bounds header")]
    TruncatedHeader { len: usize },
    #[error("row at byte offset {offset} runs past the end of the stream")]
    TruncatedRow { offset: usize },
    #[error("row at byte offset {offset} declares {num_spans} spans")]
    InvalidSpanCount { offset: usize, num_spans: i32 },
    #[error("row at byte offset {offset} has a span outside the stream bounds")]
    SpanOutOfBounds { offset: usize },
}

/// Why a single span couldn't be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanFault {
    Truncated,
    OutOfBounds,
}

// ============================================================================
// Byte helpers
// ============================================================================

/// Sequential little-endian writer over a pre-sized buffer.
pub(crate) struct ByteWriter<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl<'a> ByteWriter<'a> {
    pub(crate) fn new(data: &'a mut [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn write_i32(&mut self, v: i32) {
        self.data[self.pos..self.pos + 4].copy_from_slice(&v.to_le_bytes());
        self.pos += 4;
    }

    pub(crate) fn write_cover<T: CoverValue>(&mut self, c: T) {
        c.write_le(&mut self.data[self.pos..self.pos + T::BYTES]);
        self.pos += T::BYTES;
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }
}

/// Bounds-checked little-endian reader.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    fn read_i32(&mut self) -> Option<i32> {
        let b = self.take(4)?;
        Some(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Check the buffer size before a `serialize` call writes anything.
pub(crate) fn check_capacity(needed: usize, available: usize) -> Result<(), SerializeError> {
    if available < needed {
        return Err(SerializeError::BufferTooSmall { needed, available });
    }
    Ok(())
}

/// Bounds header shared by both adaptor kinds.
#[derive(Debug, Clone, Copy)]
struct StreamBounds {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl StreamBounds {
    const EMPTY: Self = Self {
        min_x: i32::MAX,
        min_y: i32::MAX,
        max_x: i32::MIN,
        max_y: i32::MIN,
    };

    /// Whether `len` pixels starting at `x` lie inside `min_x..=max_x`.
    fn contains_span(&self, x: i32, len: u32) -> bool {
        let x = i64::from(x);
        x >= i64::from(self.min_x) && x + i64::from(len) - 1 <= i64::from(self.max_x)
    }

    fn read(data: &[u8], dx: i32, dy: i32) -> Result<Self, DecodeError> {
        let mut rd = ByteReader::new(data, 0);
        let mut next = || {
            rd.read_i32()
                .ok_or(DecodeError::TruncatedHeader { len: data.len() })
        };
        Ok(Self {
            min_x: next()?.wrapping_add(dx),
            min_y: next()?.wrapping_add(dy),
            max_x: next()?.wrapping_add(dx),
            max_y: next()?.wrapping_add(dy),
        })
    }
}

// ============================================================================
// Shared cursor logic
// ============================================================================

/// Cursor over a serialized stream; the span decoding is supplied per format.
#[derive(Debug, Clone)]
struct StreamCursor<'a> {
    data: &'a [u8],
    ptr: usize,
    dx: i32,
    dy: i32,
    bounds: StreamBounds,
    error: Option<DecodeError>,
}

impl<'a> StreamCursor<'a> {
    fn new(data: &'a [u8], size: usize, dx: i32, dy: i32) -> Self {
        Self {
            data: &data[..size.min(data.len())],
            ptr: 0,
            dx,
            dy,
            bounds: StreamBounds::EMPTY,
            error: None,
        }
    }

    fn rewind(&mut self) -> bool {
        self.ptr = 0;
        self.error = None;
        if self.data.is_empty() {
            return false;
        }
        match StreamBounds::read(self.data, self.dx, self.dy) {
            Ok(b) => {
                self.bounds = b;
                self.ptr = HEADER_SIZE;
                self.ptr < self.data.len()
            }
            Err(e) => {
                self.fail(e);
                false
            }
        }
    }

    fn fail(&mut self, e: DecodeError) {
        log::warn!("serialized scanline stream ended early: {e}");
        self.ptr = self.data.len();
        self.error = Some(e);
    }

    /// Decode rows until a non-empty one is finalized into `sl`.
    ///
    /// Spans must lie inside the header bounds, since consumers size their
    /// containers from them.
    fn sweep<SL, F>(&mut self, sl: &mut SL, mut read_span: F) -> bool
    where
        SL: Scanline,
        F: FnMut(&mut ByteReader<'a>, i32, &StreamBounds, &mut SL) -> Result<(), SpanFault>,
    {
        sl.reset_spans();
        while self.ptr < self.data.len() {
            let offset = self.ptr;
            let mut rd = ByteReader::new(self.data, offset);
            let truncated = DecodeError::TruncatedRow { offset };

            let (Some(y), Some(num_spans)) = (rd.read_i32(), rd.read_i32()) else {
                sl.reset_spans();
                self.fail(truncated);
                return false;
            };
            if num_spans < 0 {
                sl.reset_spans();
                self.fail(DecodeError::InvalidSpanCount { offset, num_spans });
                return false;
            }
            for _ in 0..num_spans {
                if let Err(fault) = read_span(&mut rd, self.dx, &self.bounds, sl) {
                    sl.reset_spans();
                    self.fail(match fault {
                        SpanFault::Truncated => truncated,
                        SpanFault::OutOfBounds => DecodeError::SpanOutOfBounds { offset },
                    });
                    return false;
                }
            }
            self.ptr = rd.pos;

            if sl.num_spans() > 0 {
                sl.finalize(y.wrapping_add(self.dy));
                return true;
            }
        }
        false
    }
}

// ============================================================================
// SerializedScanlinesAdaptorAa
// ============================================================================

/// Replays a stream written by
/// [`ScanlineStorageAa::serialize`](crate::scanline_storage_aa::ScanlineStorageAa::serialize).
///
/// Port of C++ `serialized_scanlines_adaptor_aa<T>`. A truncated or
/// malformed stream ends the sweep early (the partially decoded row is
/// discarded) and the reason is kept in [`error`](Self::error).
#[derive(Debug, Clone)]
pub struct SerializedScanlinesAdaptorAa<'a, T: CoverValue> {
    cursor: StreamCursor<'a>,
    _cover: PhantomData<T>,
}

pub type SerializedScanlinesAdaptorAa8<'a> = SerializedScanlinesAdaptorAa<'a, u8>;
pub type SerializedScanlinesAdaptorAa16<'a> = SerializedScanlinesAdaptorAa<'a, u16>;
pub type SerializedScanlinesAdaptorAa32<'a> = SerializedScanlinesAdaptorAa<'a, u32>;

impl<'a, T: CoverValue> SerializedScanlinesAdaptorAa<'a, T> {
    /// Read the first `size` bytes of `data` (clamped to `data.len()`),
    /// shifting every coordinate by `(dx, dy)`.
    pub fn new(data: &'a [u8], size: usize, dx: i32, dy: i32) -> Self {
        Self {
            cursor: StreamCursor::new(data, size, dx, dy),
            _cover: PhantomData,
        }
    }

    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(data, data.len(), 0, 0)
    }

    /// Why the last sweep stopped early, if it did.
    pub fn error(&self) -> Option<&DecodeError> {
        self.cursor.error.as_ref()
    }

    fn read_span<SL: Scanline>(
        rd: &mut ByteReader<'_>,
        dx: i32,
        bounds: &StreamBounds,
        sl: &mut SL,
    ) -> Result<(), SpanFault> {
        let x = rd.read_i32().ok_or(SpanFault::Truncated)?.wrapping_add(dx);
        let len = rd.read_i32().ok_or(SpanFault::Truncated)?;
        if len == 0 {
            return Ok(());
        }
        if !bounds.contains_span(x, len.unsigned_abs()) {
            return Err(SpanFault::OutOfBounds);
        }
        if len < 0 {
            let cover = T::read_le(rd.take(T::BYTES).ok_or(SpanFault::Truncated)?);
            sl.add_span(x, len.unsigned_abs(), cover.to_cover());
        } else {
            let bytes = (len as usize)
                .checked_mul(T::BYTES)
                .and_then(|n| rd.take(n))
                .ok_or(SpanFault::Truncated)?;
            T::add_le_cells_to(x, bytes, sl);
        }
        Ok(())
    }
}

impl<'a, T: CoverValue> ScanlineGenerator for SerializedScanlinesAdaptorAa<'a, T> {
    fn rewind_scanlines(&mut self) -> bool {
        self.cursor.rewind()
    }

    fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        self.cursor.sweep(sl, Self::read_span)
    }

    fn min_x(&self) -> i32 {
        self.cursor.bounds.min_x
    }
    fn min_y(&self) -> i32 {
        self.cursor.bounds.min_y
    }
    fn max_x(&self) -> i32 {
        self.cursor.bounds.max_x
    }
    fn max_y(&self) -> i32 {
        self.cursor.bounds.max_y
    }
}

// ============================================================================
// SerializedScanlinesAdaptorBin
// ============================================================================

/// Replays a stream written by
/// [`ScanlineStorageBin::serialize`](crate::scanline_storage_bin::ScanlineStorageBin::serialize).
///
/// Port of C++ `serialized_scanlines_adaptor_bin`. Spans are replayed with
/// full coverage.
#[derive(Debug, Clone)]
pub struct SerializedScanlinesAdaptorBin<'a> {
    cursor: StreamCursor<'a>,
}

impl<'a> SerializedScanlinesAdaptorBin<'a> {
    pub fn new(data: &'a [u8], size: usize, dx: i32, dy: i32) -> Self {
        Self {
            cursor: StreamCursor::new(data, size, dx, dy),
        }
    }

    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self::new(data, data.len(), 0, 0)
    }

    pub fn error(&self) -> Option<&DecodeError> {
        self.cursor.error.as_ref()
    }

    fn read_span<SL: Scanline>(
        rd: &mut ByteReader<'_>,
        dx: i32,
        bounds: &StreamBounds,
        sl: &mut SL,
    ) -> Result<(), SpanFault> {
        let x = rd.read_i32().ok_or(SpanFault::Truncated)?.wrapping_add(dx);
        let len = rd.read_i32().ok_or(SpanFault::Truncated)?;
        if len == 0 {
            return Ok(());
        }
        if !bounds.contains_span(x, len.unsigned_abs()) {
            return Err(SpanFault::OutOfBounds);
        }
        sl.add_span(x, len.unsigned_abs(), COVER_FULL as u32);
        Ok(())
    }
}

impl<'a> ScanlineGenerator for SerializedScanlinesAdaptorBin<'a> {
    fn rewind_scanlines(&mut self) -> bool {
        self.cursor.rewind()
    }

    fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        self.cursor.sweep(sl, Self::read_span)
    }

    fn min_x(&self) -> i32 {
        self.cursor.bounds.min_x
    }
    fn min_y(&self) -> i32 {
        self.cursor.bounds.min_y
    }
    fn max_x(&self) -> i32 {
        self.cursor.bounds.max_x
    }
    fn max_y(&self) -> i32 {
        self.cursor.bounds.max_y
    }
}

// ============================================================================
// Tests
// ============================================================================
