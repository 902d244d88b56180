// SPDX-License-Identifier: GPL-3.0-only

//! I420 to NV12, nearest-neighbour

use super::{CoordinateMap, I420Planes, RectConfig, RegionConfig, YuvSample, write_nv12};
use tracing::trace;

/// Convert separate Y/U/V planes into one NV12 buffer
///
/// Luma lands at `y * pitch + x`; each U,V pair lands as adjacent bytes
/// at `chroma_offset + half_width * y + x` for even `x`, `y`.
pub fn i420_nv12(
    src: I420Planes<'_>,
    src_config: &RegionConfig,
    dst: &mut [u8],
    dst_config: &RegionConfig,
    rect: &RectConfig,
) {
    trace!(
        src_width = src_config.width,
        src_height = src_config.height,
        dst_width = dst_config.width,
        dst_height = dst_config.height,
        "convert I420 to NV12"
    );
    let map = CoordinateMap::new(src_config, dst_config, rect);
    write_nv12(dst, dst_config, |x, y| i420_nv12_pixel(&src, &map, x, y));
}

fn i420_nv12_pixel(src: &I420Planes<'_>, map: &CoordinateMap, x: usize, y: usize) -> Option<YuvSample> {
    if !map.dst.contains(x, y) {
        return None;
    }
    let position = map.position(x, y);
    let (sx, sy) = map.nearest(position);
    let luma = src.y[sy * map.src.pitch() + sx];

    let chroma = if x % 2 == 0 && y % 2 == 0 {
        let (cx, cy) = map.chroma_origin(position);
        let index = (cy / 2) * map.src.half_width as usize + cx / 2;
        Some([src.u[index], src.v[index]])
    } else {
        None
    };
    Some(YuvSample { luma, chroma })
}
