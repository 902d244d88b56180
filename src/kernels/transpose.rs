// SPDX-License-Identifier: GPL-3.0-only

//! Tiled matrix transpose
//!
//! `dst[x][y] = src[y][x]` for a `height x width` source. The grid is cut
//! into `TILE_DIM x TILE_DIM` tiles; each tile is one workgroup that loads
//! its block into shared scratch row-wise, meets at a barrier, then writes
//! the block back column-wise at the transposed tile position. Both the
//! reads and the writes walk memory along rows.
//!
//! The scratch rows are one element wider than the tile so that reading a
//! column of scratch does not hit the same bank on every step.
//!
//! Generic over the element: `u8` planes and packed `u32` pixels use the
//! same kernel.

use super::dispatch::{GridSize, LocalId, Workgroup, WorkgroupSize};
use crate::constants::TILE_DIM;
use rayon::prelude::*;
use tracing::trace;

/// Shared scratch for one tile
type TileScratch<T> = [[T; TILE_DIM + 1]; TILE_DIM];

const TILE_WORKGROUP: WorkgroupSize = WorkgroupSize::square(TILE_DIM as u32);

/// Transpose a row-major `height x width` buffer into `width x height`
///
/// `src` needs `width * height` elements, `dst` the same. Edge tiles are
/// partial; out-of-range invocations neither load nor store.
pub fn transpose<T>(src: &[T], dst: &mut [T], width: usize, height: usize)
where
    T: Copy + Default + Send + Sync,
{
    if width == 0 || height == 0 {
        return;
    }
    debug_assert!(src.len() >= width * height, "transpose source too small");
    debug_assert!(dst.len() >= width * height, "transpose destination too small");

    let tiles = GridSize::new(width as u32, height as u32).workgroups(TILE_WORKGROUP);
    trace!(width, height, tiles_x = tiles.x, tiles_y = tiles.y, "transpose");

    // Destination rows [tile_x * TILE_DIM, +TILE_DIM) are written only by
    // the tiles of source column band `tile_x`.
    dst[..width * height]
        .par_chunks_mut(TILE_DIM * height)
        .enumerate()
        .for_each(|(tile_x, band)| {
            let mut scratch: TileScratch<T> = [[T::default(); TILE_DIM + 1]; TILE_DIM];
            for tile_y in 0..tiles.y as usize {
                Workgroup::new(TILE_WORKGROUP, &mut scratch)
                    .load(|local, scratch| {
                        load_element(src, width, height, tile_x, tile_y, local, scratch)
                    })
                    .barrier()
                    .store(|local, scratch| {
                        store_element(band, width, height, tile_x, tile_y, local, scratch)
                    });
            }
        });
}

/// Load phase: one source element into scratch, row-major
#[inline]
fn load_element<T: Copy>(
    src: &[T],
    width: usize,
    height: usize,
    tile_x: usize,
    tile_y: usize,
    local: LocalId,
    scratch: &mut TileScratch<T>,
) {
    let x = tile_x * TILE_DIM + local.x;
    let y = tile_y * TILE_DIM + local.y;
    if x < width && y < height {
        scratch[local.y][local.x] = src[y * width + x];
    }
}

/// Store phase: one scratch element to the transposed tile position
///
/// `band` is the destination row band owned by source column band
/// `tile_x`; it starts at destination row `tile_x * TILE_DIM`.
#[inline]
fn store_element<T: Copy>(
    band: &mut [T],
    width: usize,
    height: usize,
    tile_x: usize,
    tile_y: usize,
    local: LocalId,
    scratch: &TileScratch<T>,
) {
    // Destination x runs along the source rows, destination y along columns
    let x = tile_y * TILE_DIM + local.x;
    let y = tile_x * TILE_DIM + local.y;
    if x < height && y < width {
        band[local.y * height + x] = scratch[local.x][local.y];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_transpose<T: Copy + Default>(src: &[T], width: usize, height: usize) -> Vec<T> {
        let mut out = vec![T::default(); width * height];
        for y in 0..height {
            for x in 0..width {
                out[x * height + y] = src[y * width + x];
            }
        }
        out
    }

    #[test]
    fn test_transpose_small() {
        // 2 rows x 3 columns
        let src = [1u8, 2, 3, 4, 5, 6];
        let mut dst = [0u8; 6];
        transpose(&src, &mut dst, 3, 2);
        assert_eq!(dst, [1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_transpose_partial_tiles() {
        for &(width, height) in &[(1, 1), (17, 3), (37, 21), (16, 16), (5, 40)] {
            let src: Vec<u8> = (0..width * height).map(|i| (i * 7 % 251) as u8).collect();
            let mut dst = vec![0u8; width * height];
            transpose(&src, &mut dst, width, height);
            assert_eq!(
                dst,
                naive_transpose(&src, width, height),
                "mismatch for {}x{}",
                width,
                height
            );
        }
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let (width, height) = (45, 19);
        let src: Vec<u32> = (0..(width * height) as u32)
            .map(|i| i.wrapping_mul(2_654_435_761))
            .collect();
        let mut once = vec![0u32; width * height];
        let mut twice = vec![0u32; width * height];
        transpose(&src, &mut once, width, height);
        transpose(&once, &mut twice, height, width);
        assert_eq!(twice, src);
    }

    #[test]
    fn test_transpose_leaves_tail_untouched() {
        let src = [1u8, 2, 3, 4];
        let mut dst = [9u8; 6];
        transpose(&src, &mut dst, 2, 2);
        assert_eq!(dst, [1, 3, 2, 4, 9, 9]);
    }
}
