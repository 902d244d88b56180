// SPDX-License-Identifier: GPL-3.0-only

//! NV12 to I420
//!
//! Two variants over the same addressing:
//! - [`scale_convert_nv12_i420`] blends luma bilinearly across the
//!   geometric transform, vertical then horizontal
//! - [`nv12_i420`] copies the nearest luma sample
//!
//! Chroma is never interpolated.

use super::{CoordinateMap, I420PlanesMut, RectConfig, RegionConfig, YuvSample, write_i420};
use tracing::trace;

/// Convert with bilinear luma
pub fn scale_convert_nv12_i420(
    src: &[u8],
    src_config: &RegionConfig,
    dst: I420PlanesMut<'_>,
    dst_config: &RegionConfig,
    rect: &RectConfig,
) {
    trace!(
        src_width = src_config.width,
        src_height = src_config.height,
        dst_width = dst_config.width,
        dst_height = dst_config.height,
        kx = rect.kx,
        ky = rect.ky,
        "scale convert NV12 to I420"
    );
    let map = CoordinateMap::new(src_config, dst_config, rect);
    write_i420(dst, dst_config, |x, y| scale_convert_pixel(src, &map, x, y));
}

/// Convert with nearest-neighbour luma
pub fn nv12_i420(
    src: &[u8],
    src_config: &RegionConfig,
    dst: I420PlanesMut<'_>,
    dst_config: &RegionConfig,
    rect: &RectConfig,
) {
    trace!(
        src_width = src_config.width,
        src_height = src_config.height,
        dst_width = dst_config.width,
        dst_height = dst_config.height,
        "convert NV12 to I420"
    );
    let map = CoordinateMap::new(src_config, dst_config, rect);
    write_i420(dst, dst_config, |x, y| nearest_pixel(src, &map, x, y));
}

fn scale_convert_pixel(src: &[u8], map: &CoordinateMap, x: usize, y: usize) -> Option<YuvSample> {
    if !map.dst.contains(x, y) {
        return None;
    }
    let position = map.position(x, y);
    let (x0, y0) = map.nearest(position);
    let x1 = (x0 + 1).min((map.src.x + map.src.width - 1) as usize);
    let y1 = (y0 + 1).min((map.src.y + map.src.height - 1) as usize);
    let wx = (position.0 - x0 as f32).clamp(0.0, 1.0);
    let wy = (position.1 - y0 as f32).clamp(0.0, 1.0);

    let pitch = map.src.pitch();
    let luma = |lx: usize, ly: usize| src[ly * pitch + lx] as f32;
    let left = luma(x0, y0) * (1.0 - wy) + luma(x0, y1) * wy;
    let right = luma(x1, y0) * (1.0 - wy) + luma(x1, y1) * wy;
    let value = left * (1.0 - wx) + right * wx;

    Some(YuvSample {
        luma: (value + 0.5) as u8,
        chroma: chroma_sample(src, map, x, y, position),
    })
}

fn nearest_pixel(src: &[u8], map: &CoordinateMap, x: usize, y: usize) -> Option<YuvSample> {
    if !map.dst.contains(x, y) {
        return None;
    }
    let position = map.position(x, y);
    let (sx, sy) = map.nearest(position);
    Some(YuvSample {
        luma: src[sy * map.src.pitch() + sx],
        chroma: chroma_sample(src, map, x, y, position),
    })
}

/// Interleaved U,V pair for even/even destination pixels
#[inline]
fn chroma_sample(
    src: &[u8],
    map: &CoordinateMap,
    x: usize,
    y: usize,
    position: (f32, f32),
) -> Option<[u8; 2]> {
    if x % 2 != 0 || y % 2 != 0 {
        return None;
    }
    let (cx, cy) = map.chroma_origin(position);
    let offset = map.src.chroma_offset as usize + (cy / 2) * map.src.pitch() + cx;
    Some([src[offset], src[offset + 1]])
}
