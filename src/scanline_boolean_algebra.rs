//! Scanline boolean algebra.
//!
//! Port of `agg_scanline_boolean_algebra.h`.
//! Boolean operations (union, intersection, XOR, subtraction) on two
//! scanline generators, keeping anti-aliased coverage.
//!
//! The algorithms are built from three layers, each parameterized the same
//! way as in C++:
//!
//! 1. span functors: what to emit for a span part that only one operand
//!    covers ([`AddSpanFunctor`]) and how to combine the part both cover
//!    ([`CombineSpansFunctor`]);
//! 2. scanline-level walks over two rows with the same Y
//!    ([`sbool_intersect_scanlines`], [`sbool_unite_scanlines`]);
//! 3. shape-level sweeps that keep two generators in Y sync
//!    ([`sbool_intersect_shapes`], [`sbool_unite_shapes`],
//!    [`sbool_subtract_shapes`]).
//!
//! XOR and subtraction reuse the union walk with different functors.

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::basics::{
    intersect_rectangles, unite_rectangles, CoverType, COVER_FULL, COVER_MASK, COVER_SHIFT,
};
use crate::scanline::{Scanline, ScanlineGenerator, ScanlineRead, ScanlineRenderer, Span};
use crate::scanline_bin::Scanline32Bin;
use crate::scanline_p::Scanline32P8;

const COVER_FULL_SQ: u32 = COVER_MASK * COVER_MASK;

/// Scale a product of two covers back to cover range, saturating the
/// full*full product to exactly full.
#[inline]
fn scale_cover(cover: u32) -> u32 {
    if cover == COVER_FULL_SQ {
        COVER_MASK
    } else {
        cover >> COVER_SHIFT
    }
}

#[inline]
fn intersect_covers(c1: u32, c2: u32) -> u32 {
    scale_cover(c1 * c2)
}

#[inline]
fn unite_covers(c1: u32, c2: u32) -> u32 {
    scale_cover(COVER_FULL_SQ - (COVER_MASK - c1) * (COVER_MASK - c2))
}

#[inline]
fn subtract_covers(c1: u32, c2: u32) -> u32 {
    scale_cover(c1 * (COVER_MASK - c2))
}

/// Covers of a cell span for the pixels `x..x + len`.
#[inline]
fn window(sx: i32, covers: &[CoverType], x: i32, len: u32) -> &[CoverType] {
    let start = (x - sx) as usize;
    &covers[start..start + len as usize]
}

// ============================================================================
// XOR formulas
// ============================================================================

/// Coverage formula for the XOR operation.
pub trait XorFormula {
    fn calculate(a: u32, b: u32) -> u32;
}

/// `a + b`, reflected back below full: `2*full - (a + b)` on overflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorFormulaLinear;

impl XorFormula for XorFormulaLinear {
    #[inline]
    fn calculate(a: u32, b: u32) -> u32 {
        let cover = a + b;
        if cover > COVER_MASK {
            COVER_MASK + COVER_MASK - cover
        } else {
            cover
        }
    }
}

/// Saddle blend `1 - (1 - a + ab)(1 - b + ab)` in cover fixed point.
///
/// Returns `a` when `b == 0`, `b` when `a == 0` and nothing when both are
/// full.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorFormulaSaddle;

impl XorFormula for XorFormulaSaddle {
    #[inline]
    fn calculate(a: u32, b: u32) -> u32 {
        let k = a * b;
        if k == COVER_FULL_SQ {
            return 0;
        }
        let m = COVER_MASK as u64;
        let a = (COVER_FULL_SQ - COVER_MASK * a + k) as u64;
        let b = (COVER_FULL_SQ - COVER_MASK * b + k) as u64;
        (m - a * b / (m * m * m)) as u32
    }
}

/// `|a - b|`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorFormulaAbsDiff;

impl XorFormula for XorFormulaAbsDiff {
    #[inline]
    fn calculate(a: u32, b: u32) -> u32 {
        a.abs_diff(b)
    }
}

// ============================================================================
// Span functors
// ============================================================================

/// Emits the part `x..x + len` of a span that the other operand doesn't cover.
pub trait AddSpanFunctor {
    fn add_span<SL: Scanline>(&self, span: &Span<'_>, x: i32, len: u32, sl: &mut SL);
}

/// Combines two spans over their common part `x..x + len`.
pub trait CombineSpansFunctor {
    fn combine<SL: Scanline>(
        &self,
        span1: &Span<'_>,
        span2: &Span<'_>,
        x: i32,
        len: u32,
        sl: &mut SL,
    );
}

/// Drops the span.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddSpanEmpty;

impl AddSpanFunctor for AddSpanEmpty {
    #[inline]
    fn add_span<SL: Scanline>(&self, _span: &Span<'_>, _x: i32, _len: u32, _sl: &mut SL) {}
}

/// Copies the span's coverage.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddSpanAa;

impl AddSpanFunctor for AddSpanAa {
    #[inline]
    fn add_span<SL: Scanline>(&self, span: &Span<'_>, x: i32, len: u32, sl: &mut SL) {
        match *span {
            Span::Solid { cover, .. } => sl.add_span(x, len, cover as u32),
            Span::Cells { x: sx, covers } => sl.add_cells(x, window(sx, covers, x, len)),
        }
    }
}

/// Emits a full-coverage span regardless of the source coverage.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddSpanBin;

impl AddSpanFunctor for AddSpanBin {
    #[inline]
    fn add_span<SL: Scanline>(&self, _span: &Span<'_>, x: i32, len: u32, sl: &mut SL) {
        sl.add_span(x, len, COVER_FULL as u32);
    }
}

/// Emits nothing for the common part.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineSpansEmpty;

impl CombineSpansFunctor for CombineSpansEmpty {
    #[inline]
    fn combine<SL: Scanline>(
        &self,
        _span1: &Span<'_>,
        _span2: &Span<'_>,
        _x: i32,
        _len: u32,
        _sl: &mut SL,
    ) {
    }
}

/// Emits the common part with full coverage (binary intersection and union).
#[derive(Debug, Clone, Copy, Default)]
pub struct CombineSpansBin;

impl CombineSpansFunctor for CombineSpansBin {
    #[inline]
    fn combine<SL: Scanline>(
        &self,
        _span1: &Span<'_>,
        _span2: &Span<'_>,
        x: i32,
        len: u32,
        sl: &mut SL,
    ) {
        sl.add_span(x, len, COVER_FULL as u32);
    }
}

/// `c1 * c2`. A full solid span passes the other span's covers through.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectSpansAa;

impl CombineSpansFunctor for IntersectSpansAa {
    fn combine<SL: Scanline>(
        &self,
        span1: &Span<'_>,
        span2: &Span<'_>,
        x: i32,
        len: u32,
        sl: &mut SL,
    ) {
        match (*span1, *span2) {
            (Span::Cells { x: x1, covers: c1 }, Span::Cells { x: x2, covers: c2 }) => {
                let c1 = window(x1, c1, x, len);
                let c2 = window(x2, c2, x, len);
                for (i, (&a, &b)) in c1.iter().zip(c2).enumerate() {
                    sl.add_cell(x + i as i32, intersect_covers(a as u32, b as u32));
                }
            }
            (Span::Solid { cover, .. }, Span::Cells { x: sx, covers })
            | (Span::Cells { x: sx, covers }, Span::Solid { cover, .. }) => {
                let covers = window(sx, covers, x, len);
                if cover == COVER_FULL {
                    sl.add_cells(x, covers);
                } else {
                    for (i, &c) in covers.iter().enumerate() {
                        sl.add_cell(x + i as i32, intersect_covers(cover as u32, c as u32));
                    }
                }
            }
            (Span::Solid { cover: a, .. }, Span::Solid { cover: b, .. }) => {
                sl.add_span(x, len, intersect_covers(a as u32, b as u32));
            }
        }
    }
}

/// `full - (full - c1) * (full - c2)`. A full solid span wins outright.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniteSpansAa;

impl CombineSpansFunctor for UniteSpansAa {
    fn combine<SL: Scanline>(
        &self,
        span1: &Span<'_>,
        span2: &Span<'_>,
        x: i32,
        len: u32,
        sl: &mut SL,
    ) {
        match (*span1, *span2) {
            (Span::Cells { x: x1, covers: c1 }, Span::Cells { x: x2, covers: c2 }) => {
                let c1 = window(x1, c1, x, len);
                let c2 = window(x2, c2, x, len);
                for (i, (&a, &b)) in c1.iter().zip(c2).enumerate() {
                    sl.add_cell(x + i as i32, unite_covers(a as u32, b as u32));
                }
            }
            (Span::Solid { cover, .. }, Span::Cells { x: sx, covers })
            | (Span::Cells { x: sx, covers }, Span::Solid { cover, .. }) => {
                if cover == COVER_FULL {
                    sl.add_span(x, len, COVER_FULL as u32);
                } else {
                    for (i, &c) in window(sx, covers, x, len).iter().enumerate() {
                        sl.add_cell(x + i as i32, unite_covers(cover as u32, c as u32));
                    }
                }
            }
            (Span::Solid { cover: a, .. }, Span::Solid { cover: b, .. }) => {
                sl.add_span(x, len, unite_covers(a as u32, b as u32));
            }
        }
    }
}

/// XOR under formula `F`. Pixels that come out uncovered are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorSpansAa<F: XorFormula> {
    _formula: core::marker::PhantomData<F>,
}

impl<F: XorFormula> XorSpansAa<F> {
    pub fn new() -> Self {
        Self {
            _formula: core::marker::PhantomData,
        }
    }
}

impl<F: XorFormula> CombineSpansFunctor for XorSpansAa<F> {
    fn combine<SL: Scanline>(
        &self,
        span1: &Span<'_>,
        span2: &Span<'_>,
        x: i32,
        len: u32,
        sl: &mut SL,
    ) {
        let mut add = |px: i32, cover: u32| {
            if cover != 0 {
                sl.add_cell(px, cover);
            }
        };
        match (*span1, *span2) {
            (Span::Cells { x: x1, covers: c1 }, Span::Cells { x: x2, covers: c2 }) => {
                let c1 = window(x1, c1, x, len);
                let c2 = window(x2, c2, x, len);
                for (i, (&a, &b)) in c1.iter().zip(c2).enumerate() {
                    add(x + i as i32, F::calculate(a as u32, b as u32));
                }
            }
            (Span::Solid { cover: a, .. }, Span::Cells { x: sx, covers }) => {
                for (i, &b) in window(sx, covers, x, len).iter().enumerate() {
                    add(x + i as i32, F::calculate(a as u32, b as u32));
                }
            }
            (Span::Cells { x: sx, covers }, Span::Solid { cover: b, .. }) => {
                for (i, &a) in window(sx, covers, x, len).iter().enumerate() {
                    add(x + i as i32, F::calculate(a as u32, b as u32));
                }
            }
            (Span::Solid { cover: a, .. }, Span::Solid { cover: b, .. }) => {
                let cover = F::calculate(a as u32, b as u32);
                if cover != 0 {
                    sl.add_span(x, len, cover);
                }
            }
        }
    }
}

/// `c1 * (full - c2)`. Pixels that come out uncovered are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubtractSpansAa;

impl CombineSpansFunctor for SubtractSpansAa {
    fn combine<SL: Scanline>(
        &self,
        span1: &Span<'_>,
        span2: &Span<'_>,
        x: i32,
        len: u32,
        sl: &mut SL,
    ) {
        let mut add = |px: i32, a: u32, b: u32| {
            let cover = a * (COVER_MASK - b);
            if cover != 0 {
                sl.add_cell(px, scale_cover(cover));
            }
        };
        match (*span1, *span2) {
            (Span::Cells { x: x1, covers: c1 }, Span::Cells { x: x2, covers: c2 }) => {
                let c1 = window(x1, c1, x, len);
                let c2 = window(x2, c2, x, len);
                for (i, (&a, &b)) in c1.iter().zip(c2).enumerate() {
                    add(x + i as i32, a as u32, b as u32);
                }
            }
            (Span::Solid { cover: a, .. }, Span::Cells { x: sx, covers }) => {
                for (i, &b) in window(sx, covers, x, len).iter().enumerate() {
                    add(x + i as i32, a as u32, b as u32);
                }
            }
            (Span::Cells { x: sx, covers }, Span::Solid { cover: b, .. }) => {
                if b != COVER_FULL {
                    for (i, &a) in window(sx, covers, x, len).iter().enumerate() {
                        add(x + i as i32, a as u32, b as u32);
                    }
                }
            }
            (Span::Solid { cover: a, .. }, Span::Solid { cover: b, .. }) => {
                if a as u32 * (COVER_MASK - b as u32) != 0 {
                    sl.add_span(x, len, subtract_covers(a as u32, b as u32));
                }
            }
        }
    }
}

// ============================================================================
// Scanline-level operations
// ============================================================================

/// Intersect the spans of two rows into `sl`.
///
/// `sl` is reset (spans only) first; the caller finalizes it. Only the parts
/// covered by both rows are passed to `combine`.
pub fn sbool_intersect_scanlines<SL1, SL2, SL, C>(sl1: &SL1, sl2: &SL2, sl: &mut SL, combine: &C)
where
    SL1: ScanlineRead<Cover = CoverType>,
    SL2: ScanlineRead<Cover = CoverType>,
    SL: Scanline,
    C: CombineSpansFunctor,
{
    sl.reset_spans();

    let mut spans1 = sl1.spans();
    let mut spans2 = sl2.spans();
    let (Some(mut span1), Some(mut span2)) = (spans1.next(), spans2.next()) else {
        return;
    };

    loop {
        let xb1 = span1.x();
        let xb2 = span2.x();
        let xe1 = span1.x_last();
        let xe2 = span2.x_last();

        let xb = xb1.max(xb2);
        let xe = xe1.min(xe2);
        if xb <= xe {
            combine.combine(&span1, &span2, xb, (xe - xb + 1) as u32, sl);
        }

        // Advance whichever span ends first (both on a tie).
        if xe1 <= xe2 {
            match spans1.next() {
                Some(s) => span1 = s,
                None => break,
            }
        }
        if xe2 <= xe1 {
            match spans2.next() {
                Some(s) => span2 = s,
                None => break,
            }
        }
    }
}

/// Sentinel X range of a consumed span: begin > end.
const INVALID_B: i32 = 0x0FFF_FFFF;
const INVALID_E: i32 = INVALID_B - 1;

/// Cursor over one row's spans for [`sbool_unite_scanlines`]: the current
/// span and the part `xb..=xe` of it not yet emitted.
struct UniteCursor<'a, I: Iterator<Item = Span<'a>>> {
    spans: I,
    span: Option<Span<'a>>,
    xb: i32,
    xe: i32,
}

impl<'a, I: Iterator<Item = Span<'a>>> UniteCursor<'a, I> {
    fn new(spans: I) -> Self {
        let mut c = Self {
            spans,
            span: None,
            xb: INVALID_B,
            xe: INVALID_E,
        };
        c.load();
        c
    }

    fn is_valid(&self) -> bool {
        self.xb <= self.xe
    }

    fn invalidate(&mut self) {
        self.xb = INVALID_B;
        self.xe = INVALID_E;
    }

    /// Load the next span, if any. Leaves the cursor invalid at the end.
    fn load(&mut self) {
        if let Some(s) = self.spans.next() {
            self.xb = s.x();
            self.xe = s.x_last();
            self.span = Some(s);
        }
    }

    /// Emit the remaining part of the current span through `add`.
    fn flush<SL: Scanline, A: AddSpanFunctor>(&mut self, add: &A, sl: &mut SL) {
        if let (true, Some(s)) = (self.is_valid(), self.span) {
            add.add_span(&s, self.xb, (self.xe - self.xb + 1) as u32, sl);
        }
        self.invalidate();
    }
}

/// Unite the spans of two rows into `sl`.
///
/// Parts covered by only one row go through that row's add functor, parts
/// covered by both through `combine`. With an empty `add_span2` and a
/// subtracting `combine` this is the row-level subtraction; with a XOR
/// `combine` it's the row-level XOR.
pub fn sbool_unite_scanlines<SL1, SL2, SL, A1, A2, C>(
    sl1: &SL1,
    sl2: &SL2,
    sl: &mut SL,
    add_span1: &A1,
    add_span2: &A2,
    combine: &C,
) where
    SL1: ScanlineRead<Cover = CoverType>,
    SL2: ScanlineRead<Cover = CoverType>,
    SL: Scanline,
    A1: AddSpanFunctor,
    A2: AddSpanFunctor,
    C: CombineSpansFunctor,
{
    sl.reset_spans();

    let mut c1 = UniteCursor::new(sl1.spans());
    let mut c2 = UniteCursor::new(sl2.spans());

    loop {
        if !c1.is_valid() {
            c1.load();
        }
        if !c2.is_valid() {
            c2.load();
        }
        if !c1.is_valid() && !c2.is_valid() {
            break;
        }

        let xb = c1.xb.max(c2.xb);
        let xe = c1.xe.min(c2.xe);
        let len = i64::from(xe) - i64::from(xb) + 1;

        if let (true, Some(s1), Some(s2)) = (len > 0, c1.span, c2.span) {
            // The spans overlap: emit the leading part of whichever starts
            // first, then the common part.
            if c1.xb < c2.xb {
                add_span1.add_span(&s1, c1.xb, (c2.xb - c1.xb) as u32, sl);
                c1.xb = c2.xb;
            } else if c2.xb < c1.xb {
                add_span2.add_span(&s2, c2.xb, (c1.xb - c2.xb) as u32, sl);
                c2.xb = c1.xb;
            }
            combine.combine(&s1, &s2, xb, len as u32, sl);

            // Keep the tail of the longer span for the next round.
            if c1.xe < c2.xe {
                c1.invalidate();
                c2.xb += len as i32;
            } else if c2.xe < c1.xe {
                c2.invalidate();
                c1.xb += len as i32;
            } else {
                c1.invalidate();
                c2.invalidate();
            }
        } else if c1.xb < c2.xb {
            c1.flush(add_span1, sl);
        } else {
            c2.flush(add_span2, sl);
        }
    }
}

/// Copy one row into `sl` through `add_span` and render it if anything
/// was emitted.
pub fn sbool_add_spans_and_render<SL1, SL, R, A>(sl1: &SL1, sl: &mut SL, ren: &mut R, add_span: &A)
where
    SL1: ScanlineRead<Cover = CoverType>,
    SL: Scanline,
    R: ScanlineRenderer,
    A: AddSpanFunctor,
{
    sl.reset_spans();
    for span in sl1.spans() {
        add_span.add_span(&span, span.x(), span.len(), sl);
    }
    if sl.num_spans() > 0 {
        sl.finalize(sl1.y());
        ren.render(&*sl);
    }
}

// ============================================================================
// Shape-level operations
// ============================================================================

/// Rewind a generator, treating one with no valid bounds as empty.
fn rewind_nonempty<G: ScanlineGenerator>(sg: &mut G) -> bool {
    sg.rewind_scanlines() && sg.bounding_rect().is_valid()
}

/// Intersect two shapes.
///
/// Rows are matched by Y; rows present in only one shape produce nothing.
/// The renderer is prepared first, so an empty input leaves it empty.
pub fn sbool_intersect_shapes<G1, G2, SL1, SL2, SL, R, C>(
    sg1: &mut G1,
    sg2: &mut G2,
    sl1: &mut SL1,
    sl2: &mut SL2,
    sl: &mut SL,
    ren: &mut R,
    combine: &C,
) where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    SL1: Scanline,
    SL2: Scanline,
    SL: Scanline,
    R: ScanlineRenderer,
    C: CombineSpansFunctor,
{
    ren.prepare();
    if !rewind_nonempty(sg1) || !rewind_nonempty(sg2) {
        return;
    }

    let ir = intersect_rectangles(&sg1.bounding_rect(), &sg2.bounding_rect());
    if !ir.is_valid() {
        return;
    }

    sl.reset(ir.x1, ir.x2);
    sl1.reset(sg1.min_x(), sg1.max_x());
    sl2.reset(sg2.min_x(), sg2.max_x());
    if !sg1.sweep_scanline(sl1) || !sg2.sweep_scanline(sl2) {
        return;
    }

    loop {
        while sl1.y() < sl2.y() {
            if !sg1.sweep_scanline(sl1) {
                return;
            }
        }
        while sl2.y() < sl1.y() {
            if !sg2.sweep_scanline(sl2) {
                return;
            }
        }

        if sl1.y() == sl2.y() {
            sbool_intersect_scanlines(&*sl1, &*sl2, sl, combine);
            if sl.num_spans() > 0 {
                sl.finalize(sl1.y());
                ren.render(&*sl);
            }
            if !sg1.sweep_scanline(sl1) || !sg2.sweep_scanline(sl2) {
                return;
            }
        }
    }
}

/// Unite two shapes.
///
/// Rows present in only one shape are copied through that shape's add
/// functor; rows present in both are walked by [`sbool_unite_scanlines`].
/// Also drives XOR with an XOR `combine`.
#[allow(clippy::too_many_arguments)]
pub fn sbool_unite_shapes<G1, G2, SL1, SL2, SL, R, A1, A2, C>(
    sg1: &mut G1,
    sg2: &mut G2,
    sl1: &mut SL1,
    sl2: &mut SL2,
    sl: &mut SL,
    ren: &mut R,
    add_span1: &A1,
    add_span2: &A2,
    combine: &C,
) where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    SL1: Scanline,
    SL2: Scanline,
    SL: Scanline,
    R: ScanlineRenderer,
    A1: AddSpanFunctor,
    A2: AddSpanFunctor,
    C: CombineSpansFunctor,
{
    ren.prepare();
    let mut flag1 = rewind_nonempty(sg1);
    let mut flag2 = rewind_nonempty(sg2);

    let ur = match (flag1, flag2) {
        (true, true) => unite_rectangles(&sg1.bounding_rect(), &sg2.bounding_rect()),
        (true, false) => sg1.bounding_rect(),
        (false, true) => sg2.bounding_rect(),
        (false, false) => return,
    };
    if !ur.is_valid() {
        return;
    }

    sl.reset(ur.x1, ur.x2);
    if flag1 {
        sl1.reset(sg1.min_x(), sg1.max_x());
        flag1 = sg1.sweep_scanline(sl1);
    }
    if flag2 {
        sl2.reset(sg2.min_x(), sg2.max_x());
        flag2 = sg2.sweep_scanline(sl2);
    }

    while flag1 || flag2 {
        if flag1 && flag2 {
            if sl1.y() == sl2.y() {
                sbool_unite_scanlines(&*sl1, &*sl2, sl, add_span1, add_span2, combine);
                if sl.num_spans() > 0 {
                    sl.finalize(sl1.y());
                    ren.render(&*sl);
                }
                flag1 = sg1.sweep_scanline(sl1);
                flag2 = sg2.sweep_scanline(sl2);
            } else if sl1.y() < sl2.y() {
                sbool_add_spans_and_render(&*sl1, sl, ren, add_span1);
                flag1 = sg1.sweep_scanline(sl1);
            } else {
                sbool_add_spans_and_render(&*sl2, sl, ren, add_span2);
                flag2 = sg2.sweep_scanline(sl2);
            }
        } else if flag1 {
            sbool_add_spans_and_render(&*sl1, sl, ren, add_span1);
            flag1 = sg1.sweep_scanline(sl1);
        } else {
            sbool_add_spans_and_render(&*sl2, sl, ren, add_span2);
            flag2 = sg2.sweep_scanline(sl2);
        }
    }
}

/// Subtract `sg2` from `sg1`.
///
/// `sg1` drives the sweep; `sg2` is only advanced up to the current row of
/// `sg1`. An empty `sg1` produces nothing, an empty `sg2` copies `sg1`.
#[allow(clippy::too_many_arguments)]
pub fn sbool_subtract_shapes<G1, G2, SL1, SL2, SL, R, A1, C>(
    sg1: &mut G1,
    sg2: &mut G2,
    sl1: &mut SL1,
    sl2: &mut SL2,
    sl: &mut SL,
    ren: &mut R,
    add_span1: &A1,
    combine: &C,
) where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    SL1: Scanline,
    SL2: Scanline,
    SL: Scanline,
    R: ScanlineRenderer,
    A1: AddSpanFunctor,
    C: CombineSpansFunctor,
{
    ren.prepare();
    if !rewind_nonempty(sg1) {
        return;
    }
    let mut flag2 = rewind_nonempty(sg2);

    sl.reset(sg1.min_x(), sg1.max_x());
    sl1.reset(sg1.min_x(), sg1.max_x());
    if flag2 {
        sl2.reset(sg2.min_x(), sg2.max_x());
    }

    if !sg1.sweep_scanline(sl1) {
        return;
    }
    if flag2 {
        flag2 = sg2.sweep_scanline(sl2);
    }

    loop {
        while flag2 && sl2.y() < sl1.y() {
            flag2 = sg2.sweep_scanline(sl2);
        }

        if flag2 && sl2.y() == sl1.y() {
            sbool_unite_scanlines(&*sl1, &*sl2, sl, add_span1, &AddSpanEmpty, combine);
            if sl.num_spans() > 0 {
                sl.finalize(sl1.y());
                ren.render(&*sl);
            }
        } else {
            sbool_add_spans_and_render(&*sl1, sl, ren, add_span1);
        }

        if !sg1.sweep_scanline(sl1) {
            break;
        }
    }
}

// ============================================================================
// Presets
// ============================================================================

macro_rules! sbool_presets {
    ($(
        $(#[$doc:meta])*
        $name:ident => $body:ident($($arg:expr),*);
    )*) => {$(
        $(#[$doc])*
        pub fn $name<G1, G2, SL1, SL2, SL, R>(
            sg1: &mut G1,
            sg2: &mut G2,
            sl1: &mut SL1,
            sl2: &mut SL2,
            sl: &mut SL,
            ren: &mut R,
        ) where
            G1: ScanlineGenerator,
            G2: ScanlineGenerator,
            SL1: Scanline,
            SL2: Scanline,
            SL: Scanline,
            R: ScanlineRenderer,
        {
            $body(sg1, sg2, sl1, sl2, sl, ren, $(&$arg),*);
        }
    )*};
}

sbool_presets! {
    /// Anti-aliased intersection.
    sbool_intersect_shapes_aa => sbool_intersect_shapes(IntersectSpansAa);
    /// Binary intersection.
    sbool_intersect_shapes_bin => sbool_intersect_shapes(CombineSpansBin);
    /// Anti-aliased union.
    sbool_unite_shapes_aa => sbool_unite_shapes(AddSpanAa, AddSpanAa, UniteSpansAa);
    /// Binary union.
    sbool_unite_shapes_bin => sbool_unite_shapes(AddSpanBin, AddSpanBin, CombineSpansBin);
    /// Anti-aliased XOR, linear formula.
    sbool_xor_shapes_aa =>
        sbool_unite_shapes(AddSpanAa, AddSpanAa, XorSpansAa::<XorFormulaLinear>::new());
    /// Anti-aliased XOR, saddle formula.
    sbool_xor_shapes_saddle_aa =>
        sbool_unite_shapes(AddSpanAa, AddSpanAa, XorSpansAa::<XorFormulaSaddle>::new());
    /// Anti-aliased XOR, absolute difference.
    sbool_xor_shapes_abs_diff_aa =>
        sbool_unite_shapes(AddSpanAa, AddSpanAa, XorSpansAa::<XorFormulaAbsDiff>::new());
    /// Binary XOR: the common part of two rows is dropped.
    sbool_xor_shapes_bin => sbool_unite_shapes(AddSpanBin, AddSpanBin, CombineSpansEmpty);
    /// Anti-aliased `sg1 - sg2`.
    sbool_subtract_shapes_aa => sbool_subtract_shapes(AddSpanAa, SubtractSpansAa);
    /// Binary `sg1 - sg2`.
    sbool_subtract_shapes_bin => sbool_subtract_shapes(AddSpanBin, CombineSpansEmpty);
}

// ============================================================================
// Dispatch
// ============================================================================

/// Boolean operation type.
///
/// Parses from and displays as its snake_case name (`"or"`, `"xor_saddle"`,
/// `"a_minus_b"`, ...); `"union"` and `"intersection"` are accepted too.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SBoolOp {
    #[strum(to_string = "or", serialize = "union")]
    Or,
    #[strum(to_string = "and", serialize = "intersection")]
    And,
    Xor,
    XorSaddle,
    XorAbsDiff,
    #[strum(to_string = "a_minus_b")]
    AMinusB,
    #[strum(to_string = "b_minus_a")]
    BMinusA,
}

/// Combine two anti-aliased shapes with `op`.
pub fn sbool_combine_shapes_aa<G1, G2, SL1, SL2, SL, R>(
    op: SBoolOp,
    sg1: &mut G1,
    sg2: &mut G2,
    sl1: &mut SL1,
    sl2: &mut SL2,
    sl: &mut SL,
    ren: &mut R,
) where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    SL1: Scanline,
    SL2: Scanline,
    SL: Scanline,
    R: ScanlineRenderer,
{
    log::trace!("sbool {op} (aa)");
    match op {
        SBoolOp::Or => sbool_unite_shapes_aa(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::And => sbool_intersect_shapes_aa(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::Xor => sbool_xor_shapes_aa(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::XorSaddle => sbool_xor_shapes_saddle_aa(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::XorAbsDiff => sbool_xor_shapes_abs_diff_aa(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::AMinusB => sbool_subtract_shapes_aa(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::BMinusA => sbool_subtract_shapes_aa(sg2, sg1, sl2, sl1, sl, ren),
    }
}

/// Combine two binary shapes with `op`. All XOR variants are the same
/// operation without coverage.
pub fn sbool_combine_shapes_bin<G1, G2, SL1, SL2, SL, R>(
    op: SBoolOp,
    sg1: &mut G1,
    sg2: &mut G2,
    sl1: &mut SL1,
    sl2: &mut SL2,
    sl: &mut SL,
    ren: &mut R,
) where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    SL1: Scanline,
    SL2: Scanline,
    SL: Scanline,
    R: ScanlineRenderer,
{
    log::trace!("sbool {op} (bin)");
    match op {
        SBoolOp::Or => sbool_unite_shapes_bin(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::And => sbool_intersect_shapes_bin(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::Xor | SBoolOp::XorSaddle | SBoolOp::XorAbsDiff => {
            sbool_xor_shapes_bin(sg1, sg2, sl1, sl2, sl, ren)
        }
        SBoolOp::AMinusB => sbool_subtract_shapes_bin(sg1, sg2, sl1, sl2, sl, ren),
        SBoolOp::BMinusA => sbool_subtract_shapes_bin(sg2, sg1, sl2, sl1, sl, ren),
    }
}

/// Combine two stored anti-aliased shapes (storages or serialized
/// adaptors) into `ren`, using packed 32-bit scanlines internally.
pub fn sbool_combine_storages_aa<G1, G2, R>(op: SBoolOp, sg1: &mut G1, sg2: &mut G2, ren: &mut R)
where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    R: ScanlineRenderer,
{
    let mut sl1 = Scanline32P8::new();
    let mut sl2 = Scanline32P8::new();
    let mut sl = Scanline32P8::new();
    sbool_combine_shapes_aa(op, sg1, sg2, &mut sl1, &mut sl2, &mut sl, ren);
}

/// Binary counterpart of [`sbool_combine_storages_aa`].
pub fn sbool_combine_storages_bin<G1, G2, R>(op: SBoolOp, sg1: &mut G1, sg2: &mut G2, ren: &mut R)
where
    G1: ScanlineGenerator,
    G2: ScanlineGenerator,
    R: ScanlineRenderer,
{
    let mut sl1 = Scanline32Bin::new();
    let mut sl2 = Scanline32Bin::new();
    let mut sl = Scanline32Bin::new();
    sbool_combine_shapes_bin(op, sg1, sg2, &mut sl1, &mut sl2, &mut sl, ren);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanline_p::ScanlineP8;
    use crate::scanline_storage_aa::ScanlineStorageAa8;
    use crate::scanline_storage_bin::ScanlineStorageBin;
    use crate::scanline_u::ScanlineU8;
    use strum::IntoEnumIterator;

    type Rows = Vec<(i32, Vec<(i32, i32, Vec<u8>)>)>;

    /// Storage with solid spans `(x, len, cover)` per row.
    fn solid_storage(rows: &[(i32, &[(i32, u32, u32)])]) -> ScanlineStorageAa8 {
        let mut st = ScanlineStorageAa8::new();
        let mut sl = ScanlineP8::new();
        sl.reset(-100, 100);
        for &(y, spans) in rows {
            sl.reset_spans();
            for &(x, len, cover) in spans {
                sl.add_span(x, len, cover);
            }
            sl.finalize(y);
            st.render(&sl);
        }
        st
    }

    fn rows(st: &ScanlineStorageAa8) -> Rows {
        st.scanlines()
            .map(|row| {
                let spans = row
                    .spans()
                    .map(|s| {
                        let covers = match s {
                            Span::Solid { cover, .. } => vec![cover],
                            Span::Cells { covers, .. } => covers.to_vec(),
                        };
                        (s.x(), s.signed_len(), covers)
                    })
                    .collect();
                (row.y(), spans)
            })
            .collect()
    }

    fn combine(op: SBoolOp, a: &mut ScanlineStorageAa8, b: &mut ScanlineStorageAa8) -> Rows {
        let mut out = ScanlineStorageAa8::new();
        sbool_combine_storages_aa(op, a, b, &mut out);
        rows(&out)
    }

    fn overlap_pair(c1: u32, c2: u32) -> (ScanlineStorageAa8, ScanlineStorageAa8) {
        (
            solid_storage(&[(5, &[(10, 5, c1)])]),
            solid_storage(&[(5, &[(12, 5, c2)])]),
        )
    }

    #[test]
    fn test_cover_math_intersect() {
        assert_eq!(intersect_covers(255, 255), 255);
        assert_eq!(intersect_covers(128, 128), 64);
        assert_eq!(intersect_covers(0, 200), 0);
        assert_eq!(intersect_covers(255, 100), 99);
    }

    #[test]
    fn test_cover_math_unite() {
        assert_eq!(unite_covers(255, 0), 255);
        assert_eq!(unite_covers(0, 0), 0);
        assert_eq!(unite_covers(128, 128), 191);
    }

    #[test]
    fn test_cover_math_subtract() {
        assert_eq!(subtract_covers(255, 0), 255);
        assert_eq!(subtract_covers(255, 255), 0);
        assert_eq!(subtract_covers(200, 100), 121);
    }

    #[test]
    fn test_xor_formulas() {
        assert_eq!(XorFormulaLinear::calculate(100, 200), 210);
        assert_eq!(XorFormulaLinear::calculate(100, 50), 150);
        assert_eq!(XorFormulaLinear::calculate(255, 255), 0);

        assert_eq!(XorFormulaAbsDiff::calculate(100, 30), 70);
        assert_eq!(XorFormulaAbsDiff::calculate(30, 100), 70);

        for a in [0, 1, 77, 128, 254, 255] {
            assert_eq!(XorFormulaSaddle::calculate(a, 0), a);
            assert_eq!(XorFormulaSaddle::calculate(0, a), a);
        }
        assert_eq!(XorFormulaSaddle::calculate(255, 255), 0);
        // 1 - 0.75 * 0.75 at half coverage.
        assert_eq!(XorFormulaSaddle::calculate(128, 128), 112);
    }

    #[test]
    fn test_intersect_scanlines_solid() {
        let mut sl1 = ScanlineP8::new();
        let mut sl2 = ScanlineP8::new();
        let mut out = ScanlineP8::new();
        for sl in [&mut sl1, &mut sl2, &mut out] {
            sl.reset(0, 50);
        }
        sl1.add_span(10, 5, 255);
        sl2.add_span(12, 5, 255);
        sbool_intersect_scanlines(&sl1, &sl2, &mut out, &IntersectSpansAa);
        let spans: Vec<Span<'_>> = out.spans().collect();
        assert_eq!(spans, vec![Span::Solid { x: 12, len: 3, cover: 255 }]);
    }

    #[test]
    fn test_intersect_scanlines_multiple_spans() {
        let mut sl1 = ScanlineP8::new();
        let mut sl2 = ScanlineP8::new();
        let mut out = ScanlineP8::new();
        for sl in [&mut sl1, &mut sl2, &mut out] {
            sl.reset(0, 50);
        }
        sl1.add_span(0, 10, 255);
        sl1.add_span(20, 10, 255);
        sl2.add_span(5, 20, 255);
        sl2.add_span(28, 10, 255);
        sbool_intersect_scanlines(&sl1, &sl2, &mut out, &IntersectSpansAa);
        let ext: Vec<(i32, u32)> = out.spans().map(|s| (s.x(), s.len())).collect();
        assert_eq!(ext, vec![(5, 5), (20, 5), (28, 2)]);
    }

    #[test]
    fn test_intersect_full_solid_passes_cells_through() {
        let mut sl1 = ScanlineP8::new();
        let mut sl2 = ScanlineU8::new();
        let mut out = ScanlineP8::new();
        sl1.reset(0, 50);
        sl2.reset(0, 50);
        out.reset(0, 50);
        sl1.add_span(0, 20, 255);
        sl2.add_cells(3, &[10, 20, 30]);
        sbool_intersect_scanlines(&sl1, &sl2, &mut out, &IntersectSpansAa);
        let spans: Vec<Span<'_>> = out.spans().collect();
        assert_eq!(spans, vec![Span::Cells { x: 3, covers: &[10u8, 20, 30][..] }]);
    }

    #[test]
    fn test_unite_scanlines_solid() {
        let mut sl1 = ScanlineP8::new();
        let mut sl2 = ScanlineP8::new();
        let mut out = ScanlineP8::new();
        for sl in [&mut sl1, &mut sl2, &mut out] {
            sl.reset(0, 50);
        }
        sl1.add_span(10, 5, 255);
        sl2.add_span(12, 5, 255);
        sbool_unite_scanlines(&sl1, &sl2, &mut out, &AddSpanAa, &AddSpanAa, &UniteSpansAa);
        let spans: Vec<Span<'_>> = out.spans().collect();
        assert_eq!(spans, vec![Span::Solid { x: 10, len: 7, cover: 255 }]);
    }

    #[test]
    fn test_unite_scanlines_disjoint_and_nested() {
        let mut sl1 = ScanlineP8::new();
        let mut sl2 = ScanlineP8::new();
        let mut out = ScanlineP8::new();
        for sl in [&mut sl1, &mut sl2, &mut out] {
            sl.reset(0, 100);
        }
        sl1.add_span(0, 3, 100);
        sl1.add_span(40, 20, 100);
        sl2.add_span(10, 3, 50);
        sl2.add_span(45, 5, 255);
        sbool_unite_scanlines(&sl1, &sl2, &mut out, &AddSpanAa, &AddSpanAa, &UniteSpansAa);
        let spans: Vec<(i32, i32, u8)> = out
            .spans()
            .map(|s| (s.x(), s.signed_len(), s.cover_at(0)))
            .collect();
        assert_eq!(
            spans,
            vec![
                (0, -3, 100),
                (10, -3, 50),
                (40, -5, 100),
                (45, -5, 255),
                (50, -10, 100),
            ]
        );
    }

    #[test]
    fn test_shapes_intersection_scenario() {
        let (mut a, mut b) = overlap_pair(255, 255);
        assert_eq!(
            combine(SBoolOp::And, &mut a, &mut b),
            vec![(5, vec![(12, -3, vec![255])])]
        );
    }

    #[test]
    fn test_shapes_union_scenario() {
        let (mut a, mut b) = overlap_pair(255, 255);
        assert_eq!(
            combine(SBoolOp::Or, &mut a, &mut b),
            vec![(5, vec![(10, -7, vec![255])])]
        );
    }

    #[test]
    fn test_shapes_xor_linear() {
        let (mut a, mut b) = overlap_pair(100, 200);
        assert_eq!(
            combine(SBoolOp::Xor, &mut a, &mut b),
            vec![(
                5,
                vec![(10, -2, vec![100]), (12, -3, vec![210]), (15, -2, vec![200])]
            )]
        );
    }

    #[test]
    fn test_shapes_xor_full_coverage_drops_overlap() {
        let (mut a, mut b) = overlap_pair(255, 255);
        for op in [SBoolOp::Xor, SBoolOp::XorSaddle, SBoolOp::XorAbsDiff] {
            assert_eq!(
                combine(op, &mut a, &mut b),
                vec![(5, vec![(10, -2, vec![255]), (15, -2, vec![255])])],
                "{op}"
            );
        }
    }

    #[test]
    fn test_shapes_subtract() {
        let (mut a, mut b) = overlap_pair(255, 255);
        assert_eq!(
            combine(SBoolOp::AMinusB, &mut a, &mut b),
            vec![(5, vec![(10, -2, vec![255])])]
        );
        assert_eq!(
            combine(SBoolOp::BMinusA, &mut a, &mut b),
            vec![(5, vec![(15, -2, vec![255])])]
        );
    }

    #[test]
    fn test_shapes_subtract_partial_coverage() {
        let (mut a, mut b) = overlap_pair(200, 100);
        assert_eq!(
            combine(SBoolOp::AMinusB, &mut a, &mut b),
            vec![(5, vec![(10, -2, vec![200]), (12, -3, vec![121])])]
        );
    }

    #[test]
    fn test_rows_synchronized_by_y() {
        let mut a = solid_storage(&[
            (1, &[(0, 4, 255)]),
            (2, &[(0, 4, 255)]),
            (3, &[(0, 4, 255)]),
        ]);
        let mut b = solid_storage(&[(2, &[(2, 4, 255)]), (4, &[(2, 4, 255)])]);

        let ys = |r: Rows| r.into_iter().map(|(y, _)| y).collect::<Vec<_>>();
        assert_eq!(ys(combine(SBoolOp::Or, &mut a, &mut b)), vec![1, 2, 3, 4]);
        assert_eq!(ys(combine(SBoolOp::And, &mut a, &mut b)), vec![2]);
        assert_eq!(ys(combine(SBoolOp::AMinusB, &mut a, &mut b)), vec![1, 2, 3]);
        assert_eq!(ys(combine(SBoolOp::BMinusA, &mut a, &mut b)), vec![2, 4]);
        assert_eq!(ys(combine(SBoolOp::Xor, &mut a, &mut b)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_empty_inputs() {
        let mut a = solid_storage(&[(5, &[(10, 5, 255)]), (6, &[(0, 2, 9)])]);
        let mut empty = ScanlineStorageAa8::new();
        let expected = rows(&a);

        assert_eq!(combine(SBoolOp::Or, &mut a, &mut empty), expected);
        assert_eq!(combine(SBoolOp::Or, &mut empty, &mut a), expected);
        assert_eq!(combine(SBoolOp::AMinusB, &mut a, &mut empty), expected);
        assert!(combine(SBoolOp::And, &mut a, &mut empty).is_empty());
        assert!(combine(SBoolOp::AMinusB, &mut empty, &mut a).is_empty());
        assert!(combine(SBoolOp::Or, &mut empty, &mut ScanlineStorageAa8::new()).is_empty());
    }

    #[test]
    fn test_result_is_cleared_first() {
        let (mut a, mut b) = overlap_pair(255, 255);
        let mut out = solid_storage(&[(50, &[(0, 1, 255)])]);
        sbool_combine_storages_aa(SBoolOp::And, &mut a, &mut ScanlineStorageAa8::new(), &mut out);
        assert_eq!(out.num_scanlines(), 0);
        sbool_combine_storages_aa(SBoolOp::And, &mut a, &mut b, &mut out);
        assert_eq!(out.num_scanlines(), 1);
    }

    #[test]
    fn test_identity_laws_full_coverage() {
        let mut a = solid_storage(&[(0, &[(0, 5, 255), (10, 3, 255)]), (1, &[(4, 4, 255)])]);
        let mut a2 = a.clone();
        let expected = rows(&a);
        assert_eq!(combine(SBoolOp::And, &mut a, &mut a2), expected);
        assert_eq!(combine(SBoolOp::Or, &mut a, &mut a2), expected);
        assert!(combine(SBoolOp::AMinusB, &mut a, &mut a2).is_empty());
    }

    #[test]
    fn test_aa_cells_intersection() {
        let mut a = ScanlineStorageAa8::new();
        let mut sl = ScanlineU8::new();
        sl.reset(0, 10);
        sl.add_cells(0, &[100, 200]);
        sl.finalize(0);
        a.render(&sl);
        let mut b = solid_storage(&[(0, &[(0, 2, 128)])]);
        assert_eq!(
            combine(SBoolOp::And, &mut a, &mut b),
            vec![(0, vec![(0, 2, vec![50, 100])])]
        );
    }

    fn bin_storage(rows: &[(i32, &[(i32, u32)])]) -> ScanlineStorageBin {
        let mut st = ScanlineStorageBin::new();
        let mut sl = ScanlineP8::new();
        sl.reset(-100, 100);
        for &(y, spans) in rows {
            sl.reset_spans();
            for &(x, len) in spans {
                sl.add_span(x, len, 255);
            }
            sl.finalize(y);
            st.render(&sl);
        }
        st
    }

    fn bin_combine(
        op: SBoolOp,
        a: &mut ScanlineStorageBin,
        b: &mut ScanlineStorageBin,
    ) -> Vec<(i32, Vec<(i32, u32)>)> {
        let mut out = ScanlineStorageBin::new();
        sbool_combine_storages_bin(op, a, b, &mut out);
        out.scanlines()
            .map(|r| (r.y(), r.spans().map(|s| (s.x(), s.len())).collect()))
            .collect()
    }

    #[test]
    fn test_bin_operations() {
        let mut a = bin_storage(&[(0, &[(10, 5)])]);
        let mut b = bin_storage(&[(0, &[(12, 5)])]);
        assert_eq!(bin_combine(SBoolOp::And, &mut a, &mut b), vec![(0, vec![(12, 3)])]);
        assert_eq!(bin_combine(SBoolOp::Or, &mut a, &mut b), vec![(0, vec![(10, 7)])]);
        assert_eq!(
            bin_combine(SBoolOp::Xor, &mut a, &mut b),
            vec![(0, vec![(10, 2), (15, 2)])]
        );
        assert_eq!(
            bin_combine(SBoolOp::XorSaddle, &mut a, &mut b),
            bin_combine(SBoolOp::XorAbsDiff, &mut a, &mut b)
        );
        assert_eq!(bin_combine(SBoolOp::AMinusB, &mut a, &mut b), vec![(0, vec![(10, 2)])]);
        assert_eq!(bin_combine(SBoolOp::BMinusA, &mut a, &mut b), vec![(0, vec![(15, 2)])]);
    }

    #[test]
    fn test_sbool_op_names() {
        assert_eq!("or".parse::<SBoolOp>(), Ok(SBoolOp::Or));
        assert_eq!("union".parse::<SBoolOp>(), Ok(SBoolOp::Or));
        assert_eq!("intersection".parse::<SBoolOp>(), Ok(SBoolOp::And));
        assert_eq!("XOR_SADDLE".parse::<SBoolOp>(), Ok(SBoolOp::XorSaddle));
        assert!("nand".parse::<SBoolOp>().is_err());

        let names: Vec<String> = SBoolOp::iter().map(|op| op.to_string()).collect();
        assert_eq!(
            names,
            vec!["or", "and", "xor", "xor_saddle", "xor_abs_diff", "a_minus_b", "b_minus_a"]
        );
        for op in SBoolOp::iter() {
            assert_eq!(op.to_string().parse::<SBoolOp>(), Ok(op));
            let name: &'static str = op.into();
            assert_eq!(name, op.to_string());
        }
    }
}
