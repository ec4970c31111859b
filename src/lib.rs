//! # agg-scanline
//!
//! The scanline coverage engine of Anti-Grain Geometry (AGG) 2.6, in pure
//! Rust: the part of the pipeline between the rasterizer and the pixel
//! renderers.
//!
//! A rasterizer emits coverage one row at a time into a **scanline
//! container**. From there rows can be
//!
//! - stored in a **scanline storage** and replayed later,
//! - serialized into a flat little-endian byte stream and replayed from it
//!   (optionally translated) through a **serialized adaptor**,
//! - combined with the rows of another shape by the **boolean algebra**
//!   (union, intersection, three XOR flavors, subtraction), keeping
//!   anti-aliased coverage.
//!
//! ## Architecture
//!
//! Everything is wired through four traits in [`scanline`]:
//!
//! 1. **`ScanlineRead`**: a finalized row: Y and its spans
//! 2. **`Scanline`**: a container that rows are swept into
//! 3. **`ScanlineGenerator`**: a rewindable source of rows (storages,
//!    serialized adaptors, rasterizers)
//! 4. **`ScanlineRenderer`**: a sink for rows (storages, pixel renderers)
//!
//! Spans are either explicit per-pixel coverage or solid runs sharing one
//! cover value ([`scanline::Span`]); on the wire a solid run is a negative
//! length.
//!
//! ```
//! use agg_scanline::scanline::{Scanline, ScanlineGenerator};
//! use agg_scanline::scanline_boolean_algebra::{sbool_combine_storages_aa, SBoolOp};
//! use agg_scanline::scanline_p::ScanlineP8;
//! use agg_scanline::scanline_storage_aa::ScanlineStorageAa8;
//!
//! let mut sl = ScanlineP8::new();
//! sl.reset(0, 100);
//!
//! let mut a = ScanlineStorageAa8::new();
//! sl.add_span(10, 5, 255);
//! sl.finalize(0);
//! a.render(&sl);
//!
//! let mut b = ScanlineStorageAa8::new();
//! sl.reset_spans();
//! sl.add_span(12, 5, 255);
//! sl.finalize(0);
//! b.render(&sl);
//!
//! let mut result = ScanlineStorageAa8::new();
//! sbool_combine_storages_aa(SBoolOp::And, &mut a, &mut b, &mut result);
//! assert_eq!((result.min_x(), result.max_x()), (12, 14));
//! ```

// Foundation
pub mod basics;
pub mod scanline;

// Scanline containers
pub mod scanline_bin;
pub mod scanline_p;
pub mod scanline_u;

// Storage & serialization
pub mod scanline_cell_storage;
pub mod scanline_serialization;
pub mod scanline_storage_aa;
pub mod scanline_storage_bin;

// Boolean algebra
pub mod scanline_boolean_algebra;
