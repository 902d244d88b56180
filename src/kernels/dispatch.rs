// SPDX-License-Identifier: GPL-3.0-only

//! Grid dispatch for data-parallel kernels
//!
//! Every kernel in this crate is written as the body of one invocation
//! over a 1D or 2D index space. This module runs those bodies in parallel
//! on the rayon pool while keeping each invocation's write set disjoint:
//!
//! - [`dispatch_rows`] hands each worker whole output rows
//! - [`dispatch_columns`] hands each worker a band of columns, every row
//!   split so the band is owned mutably by exactly one worker
//! - [`Workgroup`] models a cooperative group with shared scratch and a
//!   barrier between a load phase and a store phase

use rayon::prelude::*;
use tracing::trace;

/// 2D dispatch extent, counted in invocations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridSize {
    pub x: u32,
    pub y: u32,
}

impl GridSize {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether an invocation index lies inside the grid
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.x && y < self.y
    }

    /// Number of workgroups needed to cover this grid
    pub fn workgroups(&self, workgroup: WorkgroupSize) -> GridSize {
        GridSize {
            x: compute_dispatch_size(self.x, workgroup.x),
            y: compute_dispatch_size(self.y, workgroup.y),
        }
    }
}

/// Invocations per workgroup along each axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupSize {
    pub x: u32,
    pub y: u32,
}

impl WorkgroupSize {
    pub const fn square(edge: u32) -> Self {
        Self { x: edge, y: edge }
    }
}

/// Index of an invocation inside its workgroup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalId {
    pub x: usize,
    pub y: usize,
}

/// Cached resource dimensions - avoids reallocation when dimensions match
#[derive(Default, Clone, Copy, PartialEq, Debug)]
pub struct CachedDimensions {
    pub width: u32,
    pub height: u32,
}

impl CachedDimensions {
    /// Check if dimensions have changed and need update
    pub fn needs_update(&self, width: u32, height: u32) -> bool {
        self.width != width || self.height != height
    }

    pub fn update(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// Calculate dispatch size (workgroups needed)
///
/// Given a dimension and workgroup size, returns the number of workgroups
/// needed to cover the entire dimension.
#[inline]
pub fn compute_dispatch_size(dimension: u32, workgroup_size: u32) -> u32 {
    dimension.div_ceil(workgroup_size)
}

/// Run `kernel` once per output row, rows in parallel
///
/// `kernel` receives the row index and the row slice (`stride` elements,
/// shorter for a truncated final row). Rows past `rows` are left untouched.
pub fn dispatch_rows<T, F>(output: &mut [T], stride: usize, rows: usize, kernel: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync + Send,
{
    if stride == 0 || rows == 0 {
        return;
    }
    trace!(stride, rows, "dispatch rows");

    output
        .par_chunks_mut(stride)
        .take(rows)
        .enumerate()
        .for_each(|(y, row)| kernel(y, row));
}

/// Mutable view of one image column, borrowed from a column band
pub struct ColumnMut<'a, 'b, T> {
    rows: &'a mut [&'b mut [T]],
    column: usize,
}

impl<T: Copy> ColumnMut<'_, '_, T> {
    /// Number of rows in the column
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[inline]
    pub fn get(&self, y: usize) -> T {
        self.rows[y][self.column]
    }

    #[inline]
    pub fn set(&mut self, y: usize, value: T) {
        self.rows[y][self.column] = value;
    }
}

/// Run `kernel` once per column `x < width`, column bands in parallel
///
/// `output` is a row-major image with `width` elements per row and at
/// least `height` rows. Each row is split into bands of `band_width`
/// columns; a worker owns every row's piece of its band, so a column can
/// be walked top to bottom and back without sharing mutable state.
pub fn dispatch_columns<T, F>(
    output: &mut [T],
    width: usize,
    height: usize,
    band_width: usize,
    kernel: F,
) where
    T: Copy + Send,
    F: Fn(usize, &mut ColumnMut<'_, '_, T>) + Sync + Send,
{
    if width == 0 || height == 0 || band_width == 0 {
        return;
    }
    let bands = width.div_ceil(band_width);
    trace!(width, height, bands, "dispatch columns");

    let mut band_rows: Vec<Vec<&mut [T]>> =
        (0..bands).map(|_| Vec::with_capacity(height)).collect();
    for row in output.chunks_mut(width).take(height) {
        for (band, piece) in row.chunks_mut(band_width).enumerate() {
            band_rows[band].push(piece);
        }
    }

    band_rows
        .into_par_iter()
        .enumerate()
        .for_each(|(band, mut rows)| {
            if rows.len() < height {
                return;
            }
            let band_start = band * band_width;
            let band_columns = rows[0].len();
            for column in 0..band_columns {
                let mut view = ColumnMut {
                    rows: rows.as_mut_slice(),
                    column,
                };
                kernel(band_start + column, &mut view);
            }
        });
}

/// A cooperative group of invocations sharing scratch memory
///
/// All invocations first run the load phase with write access to the
/// shared scratch. [`Workgroup::barrier`] ends that phase; the store
/// phase only gets shared read access, so no invocation can observe a
/// half-filled scratch buffer or write to it after the barrier.
pub struct Workgroup<'s, S> {
    size: WorkgroupSize,
    shared: &'s mut S,
}

/// A workgroup past its barrier
pub struct BarrierPassed<'s, S> {
    size: WorkgroupSize,
    shared: &'s S,
}

impl<'s, S> Workgroup<'s, S> {
    pub fn new(size: WorkgroupSize, shared: &'s mut S) -> Self {
        Self { size, shared }
    }

    /// Run the load phase for every local invocation
    pub fn load<F>(self, mut body: F) -> Self
    where
        F: FnMut(LocalId, &mut S),
    {
        for y in 0..self.size.y as usize {
            for x in 0..self.size.x as usize {
                body(LocalId { x, y }, &mut *self.shared);
            }
        }
        self
    }

    /// Synchronisation point: every load has completed
    pub fn barrier(self) -> BarrierPassed<'s, S> {
        BarrierPassed {
            size: self.size,
            shared: self.shared,
        }
    }
}

impl<S> BarrierPassed<'_, S> {
    /// Run the store phase for every local invocation
    pub fn store<F>(self, mut body: F)
    where
        F: FnMut(LocalId, &S),
    {
        for y in 0..self.size.y as usize {
            for x in 0..self.size.x as usize {
                body(LocalId { x, y }, self.shared);
            }
        }
    }
}
