//! Cell storage for anti-aliased scanline storage.
//!
//! Port of C++ `scanline_cell_storage<T>` from `agg_scanline_storage_aa.h`.
//!
//! Coverage runs are appended into fixed-size blocks so that most runs live
//! in a handful of cache-friendly allocations. A run that doesn't fit in a
//! block at all is kept in its own allocation ("extra" storage in AGG). Each
//! run is addressed by a [`CellRef`]; the C++ code packs both cases into one
//! signed index (`-(i + 1)` for overflow entry `i`), which
//! [`CellRef::index`] and [`CellRef::from_index`] reproduce.

// ============================================================================
// CellRef: address of a stored coverage run
// ============================================================================

/// Address of a coverage run inside a [`ScanlineCellStorage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellRef {
    /// Offset of the first cell in the block array.
    Block(usize),
    /// Index into the overflow list.
    Overflow(usize),
}

impl CellRef {
    /// Signed index convention: non-negative for blocks, `-(i + 1)` for overflow.
    pub fn index(self) -> i32 {
        match self {
            CellRef::Block(i) => i as i32,
            CellRef::Overflow(i) => -(i as i32 + 1),
        }
    }

    pub fn from_index(idx: i32) -> Self {
        if idx >= 0 {
            CellRef::Block(idx as usize)
        } else {
            CellRef::Overflow((-(idx + 1)) as usize)
        }
    }
}

// ============================================================================
// ScanlineCellStorage
// ============================================================================

/// Append-only storage for coverage runs.
///
/// `BLOCK_SHIFT` sets the block size (`1 << BLOCK_SHIFT` cells, 4096 by
/// default as in C++). `Clone` is a deep copy: blocks and overflow runs are
/// never shared between storages.
#[derive(Debug, Clone)]
pub struct ScanlineCellStorage<T, const BLOCK_SHIFT: u32 = 12> {
    blocks: Vec<Box<[T]>>,
    size: usize,
    extra: Vec<Box<[T]>>,
}

impl<T: Copy + Default, const BLOCK_SHIFT: u32> ScanlineCellStorage<T, BLOCK_SHIFT> {
    pub const BLOCK_SIZE: usize = 1 << BLOCK_SHIFT;
    const BLOCK_MASK: usize = Self::BLOCK_SIZE - 1;

    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            size: 0,
            extra: Vec::new(),
        }
    }

    /// Drop all runs. Allocated blocks are kept for reuse.
    pub fn remove_all(&mut self) {
        self.size = 0;
        self.extra.clear();
    }

    /// Number of cells used in the block array (including skipped block tails).
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0 && self.extra.is_empty()
    }

    /// Number of runs kept in overflow storage.
    pub fn num_overflow(&self) -> usize {
        self.extra.len()
    }

    /// Store a run of cells and return its address.
    ///
    /// Runs of up to one block are stored contiguously inside a block
    /// (starting a new block when the current one has no room left);
    /// longer runs get their own allocation.
    pub fn add_cells(&mut self, cells: &[T]) -> CellRef {
        match self.allocate_continuous_block(cells.len()) {
            Some(idx) => {
                let (nb, off) = (idx >> BLOCK_SHIFT, idx & Self::BLOCK_MASK);
                self.blocks[nb][off..off + cells.len()].copy_from_slice(cells);
                CellRef::Block(idx)
            }
            None => {
                log::trace!(
                    "cell run of {} exceeds block size {}, using overflow storage",
                    cells.len(),
                    Self::BLOCK_SIZE
                );
                self.extra.push(cells.into());
                CellRef::Overflow(self.extra.len() - 1)
            }
        }
    }

    /// Resolve a run address. Returns `None` if `r` doesn't refer to a run
    /// of at least `len` cells.
    pub fn get(&self, r: CellRef, len: usize) -> Option<&[T]> {
        match r {
            CellRef::Block(idx) => {
                if idx + len > self.size {
                    return None;
                }
                let (nb, off) = (idx >> BLOCK_SHIFT, idx & Self::BLOCK_MASK);
                self.blocks.get(nb)?.get(off..off + len)
            }
            CellRef::Overflow(i) => self.extra.get(i)?.get(..len),
        }
    }

    /// Resolve a run by its signed index.
    pub fn get_index(&self, idx: i32, len: usize) -> Option<&[T]> {
        self.get(CellRef::from_index(idx), len)
    }

    fn allocate_continuous_block(&mut self, num: usize) -> Option<usize> {
        if num > Self::BLOCK_SIZE {
            return None;
        }
        let rest = Self::BLOCK_SIZE - (self.size & Self::BLOCK_MASK);
        if num > rest {
            // Skip the tail of the current block.
            self.size += rest;
        }
        self.ensure_block(self.size >> BLOCK_SHIFT);
        let idx = self.size;
        self.size += num;
        Some(idx)
    }

    fn ensure_block(&mut self, nb: usize) {
        while self.blocks.len() <= nb {
            self.blocks
                .push(vec![T::default(); Self::BLOCK_SIZE].into_boxed_slice());
        }
    }
}

impl<T: Copy + Default, const BLOCK_SHIFT: u32> Default for ScanlineCellStorage<T, BLOCK_SHIFT> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
