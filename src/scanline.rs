//! Scanline interfaces shared by containers, storages and boolean algebra.
//!
//! AGG expresses these as template concepts (`Scanline`, "scanline
//! generator", "renderer"); here they are traits:
//!
//! - [`ScanlineRead`]: a finalized row as seen by a compositor: Y, span
//!   count, and the spans themselves.
//! - [`Scanline`]: a mutable container that a rasterizer or a storage
//!   sweeps coverage into.
//! - [`ScanlineGenerator`]: anything that can replay rows in order
//!   (storages, serialized adaptors, live rasterizers).
//! - [`ScanlineRenderer`]: anything that consumes finalized rows.

use crate::basics::{CoverType, RectI};

// ============================================================================
// SpanCoord: 16-bit vs 32-bit coordinate domain
// ============================================================================

/// Integer type used to store span X and length inside a container.
///
/// `i16` matches C++ `scanline_u8`/`scanline_p8`/`scanline_bin`; `i32`
/// matches the `scanline32_*` variants. Encoding rules are identical, only
/// the addressable range differs.
pub trait SpanCoord: Copy + Default + core::fmt::Debug + PartialEq {
    fn from_i32(v: i32) -> Self;
    fn to_i32(self) -> i32;
}

impl SpanCoord for i16 {
    #[inline]
    fn from_i32(v: i32) -> Self {
        debug_assert!(
            (i16::MIN as i32..=i16::MAX as i32).contains(&v),
            "coordinate {v} out of 16-bit range"
        );
        v as i16
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self as i32
    }
}

impl SpanCoord for i32 {
    #[inline]
    fn from_i32(v: i32) -> Self {
        v
    }

    #[inline]
    fn to_i32(self) -> i32 {
        self
    }
}

// ============================================================================
// CoverValue: width of a stored coverage value
// ============================================================================

/// Coverage element stored by [`ScanlineStorageAa`](crate::scanline_storage_aa::ScanlineStorageAa)
/// and written to serialized streams (C++ `scanline_storage_aa<T>`).
pub trait CoverValue: Copy + Default + PartialEq + core::fmt::Debug + 'static {
    /// Number of bytes one value occupies in a serialized stream.
    const BYTES: usize;

    /// Convert from an 8-bit scanline cover (C-style narrowing cast).
    fn from_cover(cover: u32) -> Self;

    fn to_cover(self) -> u32;

    /// Write `Self::BYTES` little-endian bytes into `out`.
    fn write_le(self, out: &mut [u8]);

    /// Read `Self::BYTES` little-endian bytes from `bytes`.
    fn read_le(bytes: &[u8]) -> Self;

    /// Replay explicit covers into a scanline container.
    fn add_cells_to<SL: Scanline>(x: i32, covers: &[Self], sl: &mut SL) {
        for (i, c) in covers.iter().enumerate() {
            sl.add_cell(x + i as i32, c.to_cover());
        }
    }

    /// Replay explicit covers still in serialized (little-endian) form.
    /// `bytes.len()` must be a multiple of `Self::BYTES`.
    fn add_le_cells_to<SL: Scanline>(x: i32, bytes: &[u8], sl: &mut SL) {
        for (i, c) in bytes.chunks_exact(Self::BYTES).enumerate() {
            sl.add_cell(x + i as i32, Self::read_le(c).to_cover());
        }
    }
}

impl CoverValue for u8 {
    const BYTES: usize = 1;

    #[inline]
    fn from_cover(cover: u32) -> Self {
        cover as u8
    }

    #[inline]
    fn to_cover(self) -> u32 {
        self as u32
    }

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[0] = self;
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    fn add_cells_to<SL: Scanline>(x: i32, covers: &[Self], sl: &mut SL) {
        sl.add_cells(x, covers);
    }

    fn add_le_cells_to<SL: Scanline>(x: i32, bytes: &[u8], sl: &mut SL) {
        sl.add_cells(x, bytes);
    }
}

macro_rules! impl_wide_cover_value {
    ($t:ty, $n:expr) => {
        impl CoverValue for $t {
            const BYTES: usize = $n;

            #[inline]
            fn from_cover(cover: u32) -> Self {
                cover as $t
            }

            #[inline]
            fn to_cover(self) -> u32 {
                self as u32
            }

            #[inline]
            fn write_le(self, out: &mut [u8]) {
                out[..$n].copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut b = [0u8; $n];
                b.copy_from_slice(&bytes[..$n]);
                <$t>::from_le_bytes(b)
            }
        }
    };
}

impl_wide_cover_value!(u16, 2);
impl_wide_cover_value!(u32, 4);

// ============================================================================
// Span: one horizontal run of a row
// ============================================================================

/// A horizontal run of pixels within one row.
///
/// Serialized streams and stored span records use AGG's signed-length
/// convention (positive = one cover per pixel, negative = solid run sharing
/// one cover); in memory the two cases are distinct variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a, T = CoverType> {
    /// Explicit per-pixel coverage, one value per pixel starting at `x`.
    Cells { x: i32, covers: &'a [T] },
    /// `len` pixels starting at `x`, all sharing `cover`.
    Solid { x: i32, len: u32, cover: T },
}

impl<'a, T: Copy> Span<'a, T> {
    #[inline]
    pub fn x(&self) -> i32 {
        match *self {
            Span::Cells { x, .. } | Span::Solid { x, .. } => x,
        }
    }

    /// Number of pixels covered by the span.
    #[inline]
    pub fn len(&self) -> u32 {
        match *self {
            Span::Cells { covers, .. } => covers.len() as u32,
            Span::Solid { len, .. } => len,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Length in the signed on-disk convention: negative for solid spans.
    #[inline]
    pub fn signed_len(&self) -> i32 {
        match *self {
            Span::Cells { covers, .. } => covers.len() as i32,
            Span::Solid { len, .. } => -(len as i32),
        }
    }

    /// Last X covered by the span (inclusive).
    #[inline]
    pub fn x_last(&self) -> i32 {
        self.x() + self.len() as i32 - 1
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Span::Solid { .. })
    }

    /// Coverage at pixel offset `i` from the span start.
    #[inline]
    pub fn cover_at(&self, i: usize) -> T {
        match *self {
            Span::Cells { covers, .. } => covers[i],
            Span::Solid { cover, .. } => cover,
        }
    }

    /// Explicit covers starting at absolute position `x`; `None` for solid spans.
    #[inline]
    pub fn covers_from(&self, x: i32) -> Option<&'a [T]> {
        match *self {
            Span::Cells { x: sx, covers } => Some(&covers[(x - sx) as usize..]),
            Span::Solid { .. } => None,
        }
    }
}

// ============================================================================
// ScanlineRead: read-only view of a finalized row
// ============================================================================

/// A finalized row: its Y, the number of spans and the spans themselves.
///
/// This is the interface compositors consume. It's implemented by every
/// container as well as by the zero-copy views handed out by storages.
pub trait ScanlineRead {
    /// Coverage element type of the spans.
    type Cover: Copy + 'static;

    /// Iterator over the row's spans in increasing X.
    type Spans<'a>: Iterator<Item = Span<'a, Self::Cover>>
    where
        Self: 'a;

    /// The Y coordinate of this scanline.
    fn y(&self) -> i32;

    /// Number of spans in this scanline (0 means empty).
    fn num_spans(&self) -> u32;

    fn spans(&self) -> Self::Spans<'_>;
}

// ============================================================================
// Scanline: mutable coverage container
// ============================================================================

/// Trait for scanline containers that accumulate coverage data.
///
/// Usage protocol:
/// 1. `reset(min_x, max_x)`: size the working buffers for the X range
/// 2. `add_cell()` / `add_cells()` / `add_span()`: X must increase monotonically
/// 3. `finalize(y)`: stamp the row's Y
/// 4. read through [`ScanlineRead`]
/// 5. `reset_spans()`: start the next row without reallocating
///
/// Calling any add method before `reset` is a contract violation and panics.
pub trait Scanline: ScanlineRead<Cover = CoverType> {
    /// Prepare for rows spanning `min_x..=max_x`, discarding all spans.
    fn reset(&mut self, min_x: i32, max_x: i32);

    /// Prepare for a new scanline, clearing all span data.
    fn reset_spans(&mut self);

    /// Add a single cell at position `x` with coverage `cover`.
    fn add_cell(&mut self, x: i32, cover: u32);

    /// Add `covers.len()` cells starting at `x`, one cover per pixel.
    fn add_cells(&mut self, x: i32, covers: &[CoverType]);

    /// Add a horizontal span of `len` pixels starting at `x`, all with `cover`.
    fn add_span(&mut self, x: i32, len: u32, cover: u32);

    /// Finalize the scanline at the given Y coordinate.
    fn finalize(&mut self, y: i32);
}

// ============================================================================
// ScanlineGenerator: a replayable source of rows
// ============================================================================

/// A source of rows that can be rewound and swept in increasing Y.
///
/// Implemented by the storages and serialized adaptors in this crate; a
/// polygon rasterizer presents the same interface.
pub trait ScanlineGenerator {
    /// Reset the replay cursor. Returns `false` if there is nothing to replay.
    fn rewind_scanlines(&mut self) -> bool;

    /// Fill `sl` with the next non-empty row. Returns `false` once exhausted.
    fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool;

    fn min_x(&self) -> i32;
    fn min_y(&self) -> i32;
    fn max_x(&self) -> i32;
    fn max_y(&self) -> i32;

    /// Bounding box of everything the generator will replay.
    fn bounding_rect(&self) -> RectI {
        RectI::new(self.min_x(), self.min_y(), self.max_x(), self.max_y())
    }
}

// ============================================================================
// ScanlineRenderer: a consumer of finalized rows
// ============================================================================

/// A consumer of finalized rows (C++ "renderer" concept as used by
/// `render_scanlines` and the boolean algebra).
pub trait ScanlineRenderer {
    /// Called once before a batch of rows.
    fn prepare(&mut self);

    /// Consume one finalized row.
    fn render<SL: ScanlineRead>(&mut self, sl: &SL)
    where
        SL::Cover: CoverValue;
}

// ============================================================================
// Tests
// ============================================================================
