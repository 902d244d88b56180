// SPDX-License-Identifier: GPL-3.0-only

//! Bilinear resize of a single 8-bit plane
//!
//! Pixel centres are aligned: destination pixel `d` samples source
//! position `(d + 0.5) / f - 0.5`. Positions left of or above the first
//! sample clamp to it with a zero weight, positions past the last sample
//! clamp to the last one, and the `+1` neighbour is clamped again to the
//! plane edge. The result is rounded by adding 0.5 before truncation.

use super::dispatch::dispatch_rows;
use super::image::{Plane, PlaneMut};
use tracing::trace;

/// Scale factor taking `src` samples to `dst` samples along one axis
pub fn scale_factor(src: u32, dst: u32) -> f32 {
    dst as f32 / src as f32
}

/// Resize `src` into `dst` with scale factors `fx`, `fy`
///
/// `fx = dst_width / src_width` for a plain resize, but any positive
/// factor is accepted; destination pixels map back through it.
pub fn bilinear_resize(src: &Plane<'_>, dst: &mut PlaneMut<'_>, fx: f32, fy: f32) {
    let dst_width = dst.width as usize;
    trace!(
        src_width = src.width,
        src_height = src.height,
        dst_width = dst.width,
        dst_height = dst.height,
        "bilinear resize"
    );

    dispatch_rows(
        &mut dst.data[..],
        dst.stride as usize,
        dst.height as usize,
        |dy, row| {
            let (y0, y1, v) = source_axis(dy, fy, src.height as usize);
            for (dx, out) in row.iter_mut().enumerate().take(dst_width) {
                let (x0, x1, u) = source_axis(dx, fx, src.width as usize);
                let value = (1.0 - u) * (1.0 - v) * src.at(x0, y0) as f32
                    + u * (1.0 - v) * src.at(x1, y0) as f32
                    + (1.0 - u) * v * src.at(x0, y1) as f32
                    + u * v * src.at(x1, y1) as f32;
                *out = (value + 0.5).clamp(0.0, 255.0) as u8;
            }
        },
    );
}

/// Map destination index `d` to the two source taps and the weight of
/// the second one
#[inline]
fn source_axis(d: usize, factor: f32, len: usize) -> (usize, usize, f32) {
    let s = (d as f32 + 0.5) / factor - 0.5;
    let floor = s.floor();
    let mut weight = s - floor;
    let mut i = floor as i64;
    if i < 0 {
        i = 0;
        weight = 0.0;
    }
    if i >= len as i64 {
        i = len as i64 - 1;
        weight = 0.0;
    }
    let i = i as usize;
    (i, (i + 1).min(len - 1), weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::image::PlaneLayout;

    #[test]
    fn test_same_size_is_exact() {
        let data: Vec<u8> = (0..35u8).map(|i| i.wrapping_mul(37)).collect();
        let layout = PlaneLayout::tight(7, 5).unwrap();
        let src = Plane::new(&data, layout).unwrap();
        let mut out = vec![0u8; 35];
        let mut dst = PlaneMut::new(&mut out, layout).unwrap();
        bilinear_resize(&src, &mut dst, 1.0, 1.0);
        assert_eq!(out, data);
    }

    #[test]
    fn test_upsample_constant() {
        let data = [77u8];
        let src = Plane::new(&data, PlaneLayout::tight(1, 1).unwrap()).unwrap();
        let mut out = [0u8; 4];
        let mut dst = PlaneMut::new(&mut out, PlaneLayout::tight(2, 2).unwrap()).unwrap();
        bilinear_resize(&src, &mut dst, 2.0, 2.0);
        assert_eq!(out, [77; 4]);
    }

    #[test]
    fn test_half_size_averages_blocks() {
        // value = 10x + 40y
        let data: Vec<u8> = (0..16).map(|i| (10 * (i % 4) + 40 * (i / 4)) as u8).collect();
        let src = Plane::new(&data, PlaneLayout::tight(4, 4).unwrap()).unwrap();
        let mut out = [0u8; 4];
        let mut dst = PlaneMut::new(&mut out, PlaneLayout::tight(2, 2).unwrap()).unwrap();
        bilinear_resize(&src, &mut dst, 0.5, 0.5);
        assert_eq!(out, [25, 45, 105, 125]);
    }

    #[test]
    fn test_strides_are_respected() {
        let data = [5u8, 5, 9, 9, 5, 5, 9, 9];
        let src = Plane::new(&data, PlaneLayout::new(2, 2, 4).unwrap()).unwrap();
        let mut out = [0xAAu8; 12];
        let mut dst = PlaneMut::new(&mut out, PlaneLayout::new(2, 2, 6).unwrap()).unwrap();
        bilinear_resize(&src, &mut dst, 1.0, 1.0);
        assert_eq!(out, [5, 5, 0xAA, 0xAA, 0xAA, 0xAA, 5, 5, 0xAA, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_source_axis_clamps() {
        assert_eq!(source_axis(0, 2.0, 1), (0, 0, 0.0));
        let (i0, i1, w) = source_axis(1, 2.0, 4);
        assert_eq!((i0, i1), (0, 1));
        assert!((w - 0.25).abs() < 1e-6);
        // Past the last sample
        assert_eq!(source_axis(9, 2.0, 4), (3, 3, 0.0));
    }

    #[test]
    fn test_scale_factor() {
        assert_eq!(scale_factor(320, 640), 2.0);
        assert_eq!(scale_factor(640, 320), 0.5);
    }
}
