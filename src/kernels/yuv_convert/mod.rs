// SPDX-License-Identifier: GPL-3.0-only

//! NV12 / I420 format conversion
//!
//! All converters share one coordinate model. The grid runs over the
//! destination region; a destination pixel `(x, y)` maps to the source
//! position
//!
//! ```text
//! src = src_origin + (dst - dst_origin) * k
//! ```
//!
//! with `k` taken from a [`RectConfig`]. Luma is produced for every
//! pixel. Chroma is produced only when both destination coordinates are
//! even, from the source chroma sample at the even-aligned source luma
//! position.
//!
//! Buffer layout, per [`RegionConfig`]:
//! - luma rows are `2 * half_width` bytes apart in every format
//! - I420 U and V planes are `half_width` bytes per row
//! - NV12 chroma starts at `chroma_offset`, one interleaved U,V row per
//!   two luma rows, same row pitch as luma

mod i420_to_nv12;
mod nv12_to_i420;

pub use i420_to_nv12::i420_nv12;
pub use nv12_to_i420::{nv12_i420, scale_convert_nv12_i420};

use crate::constants::{rect_index, region_index};
use crate::errors::ConfigError;
use rayon::prelude::*;
use tracing::trace;

/// Sub-rectangle and plane layout inside a YUV buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionConfig {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
    /// Half the luma row pitch; the chroma row pitch
    pub half_width: u32,
    /// Byte offset of the NV12 chroma plane (unused for I420)
    pub chroma_offset: u32,
}

impl RegionConfig {
    pub fn new(
        width: u32,
        height: u32,
        x: u32,
        y: u32,
        half_width: u32,
        chroma_offset: u32,
    ) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "region width",
                value: 0,
            });
        }
        if height == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "region height",
                value: 0,
            });
        }
        let pitch = half_width.saturating_mul(2);
        if x.saturating_add(width) > pitch {
            return Err(ConfigError::StrideTooSmall {
                stride: pitch,
                width: x.saturating_add(width),
            });
        }
        Ok(Self {
            width,
            height,
            x,
            y,
            half_width,
            chroma_offset,
        })
    }

    /// Whole-image region of a tightly packed NV12 buffer
    pub fn nv12(width: u32, height: u32) -> Result<Self, ConfigError> {
        Self::nv12_with_stride(width, height, width, height)
    }

    /// Whole-image region of an NV12 buffer with `stride` bytes per row and
    /// the chroma plane after `luma_rows` luma rows
    pub fn nv12_with_stride(
        width: u32,
        height: u32,
        stride: u32,
        luma_rows: u32,
    ) -> Result<Self, ConfigError> {
        if stride % 2 != 0 {
            return Err(ConfigError::OddDimension {
                name: "stride",
                value: stride,
            });
        }
        Self::new(width, height, 0, 0, stride / 2, stride * luma_rows)
    }

    /// Whole-image region of a tightly packed I420 frame
    pub fn i420(width: u32, height: u32) -> Result<Self, ConfigError> {
        if width % 2 != 0 {
            return Err(ConfigError::OddDimension {
                name: "width",
                value: width,
            });
        }
        Self::new(width, height, 0, 0, width / 2, 0)
    }

    /// Build from a fixed-index array (`CONFIG_WIDTH`, `CONFIG_HEIGHT`, ...)
    pub fn from_array(config: [i32; region_index::CONFIG_LEN]) -> Result<Self, ConfigError> {
        let field = |name: &'static str, index: usize| -> Result<u32, ConfigError> {
            u32::try_from(config[index]).map_err(|_| ConfigError::InvalidDimension {
                name,
                value: config[index] as i64,
            })
        };
        Self::new(
            field("width", region_index::CONFIG_WIDTH)?,
            field("height", region_index::CONFIG_HEIGHT)?,
            field("x", region_index::CONFIG_X)?,
            field("y", region_index::CONFIG_Y)?,
            field("half width", region_index::CONFIG_HALF_WIDTH)?,
            field("chroma offset", region_index::CONFIG_CHROMA_OFFSET)?,
        )
    }

    pub fn to_array(&self) -> [i32; region_index::CONFIG_LEN] {
        let mut config = [0; region_index::CONFIG_LEN];
        config[region_index::CONFIG_WIDTH] = self.width as i32;
        config[region_index::CONFIG_HEIGHT] = self.height as i32;
        config[region_index::CONFIG_X] = self.x as i32;
        config[region_index::CONFIG_Y] = self.y as i32;
        config[region_index::CONFIG_HALF_WIDTH] = self.half_width as i32;
        config[region_index::CONFIG_CHROMA_OFFSET] = self.chroma_offset as i32;
        config
    }

    /// Luma row pitch in bytes
    #[inline]
    pub fn pitch(&self) -> usize {
        self.half_width as usize * 2
    }

    /// Whether absolute coordinate `(x, y)` lies in the region
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        let x0 = self.x as usize;
        let y0 = self.y as usize;
        x >= x0 && x < x0 + self.width as usize && y >= y0 && y < y0 + self.height as usize
    }

    /// One past the last luma row of the region
    #[inline]
    pub fn end_row(&self) -> usize {
        (self.y + self.height) as usize
    }

    /// Bytes of a luma plane covering the region
    pub fn luma_len(&self) -> usize {
        self.pitch() * self.end_row()
    }

    /// Bytes of one I420 chroma plane covering the region
    pub fn i420_chroma_len(&self) -> usize {
        self.half_width as usize * self.end_row().div_ceil(2)
    }

    /// Bytes of an NV12 buffer covering the region
    pub fn nv12_len(&self) -> usize {
        self.chroma_offset as usize + self.pitch() * self.end_row().div_ceil(2)
    }
}

/// Destination-to-source scale factors, with derived products
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectConfig {
    pub kx: f32,
    pub ky: f32,
    pub kx2: f32,
    pub ky2: f32,
    pub kxy: f32,
}

impl RectConfig {
    pub fn new(kx: f32, ky: f32) -> Result<Self, ConfigError> {
        for (name, value) in [("kx", kx), ("ky", ky)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidScale { name, value });
            }
        }
        Ok(Self {
            kx,
            ky,
            kx2: kx * kx,
            ky2: ky * ky,
            kxy: kx * ky,
        })
    }

    /// One source pixel per destination pixel
    pub fn identity() -> Self {
        Self {
            kx: 1.0,
            ky: 1.0,
            kx2: 1.0,
            ky2: 1.0,
            kxy: 1.0,
        }
    }

    /// Scale factors mapping `dst` onto `src`
    pub fn between(src: &RegionConfig, dst: &RegionConfig) -> Result<Self, ConfigError> {
        Self::new(
            src.width as f32 / dst.width as f32,
            src.height as f32 / dst.height as f32,
        )
    }

    /// Build from a fixed-index array; the derived products are taken as given
    pub fn from_array(rect: [f32; rect_index::RECT_LEN]) -> Result<Self, ConfigError> {
        let checked = Self::new(rect[rect_index::RECT_KX], rect[rect_index::RECT_KY])?;
        Ok(Self {
            kx2: rect[rect_index::RECT_KX2],
            ky2: rect[rect_index::RECT_KY2],
            kxy: rect[rect_index::RECT_KXY],
            ..checked
        })
    }
}

/// Read-only I420 planes
#[derive(Debug, Clone, Copy)]
pub struct I420Planes<'a> {
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
}

/// Writable I420 planes
#[derive(Debug)]
pub struct I420PlanesMut<'a> {
    pub y: &'a mut [u8],
    pub u: &'a mut [u8],
    pub v: &'a mut [u8],
}

/// What one invocation writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct YuvSample {
    luma: u8,
    /// U, V; only on even/even destination pixels
    chroma: Option<[u8; 2]>,
}

/// Source position of a destination pixel
#[derive(Debug, Clone, Copy)]
struct CoordinateMap {
    src: RegionConfig,
    dst: RegionConfig,
    rect: RectConfig,
}

impl CoordinateMap {
    fn new(src: &RegionConfig, dst: &RegionConfig, rect: &RectConfig) -> Self {
        Self {
            src: *src,
            dst: *dst,
            rect: *rect,
        }
    }

    /// Continuous source position of destination `(x, y)`
    #[inline]
    fn position(&self, x: usize, y: usize) -> (f32, f32) {
        let local_x = (x - self.dst.x as usize) as f32;
        let local_y = (y - self.dst.y as usize) as f32;
        (
            self.src.x as f32 + local_x * self.rect.kx,
            self.src.y as f32 + local_y * self.rect.ky,
        )
    }

    /// Floor of a source position, clamped into the source region
    #[inline]
    fn nearest(&self, (sx, sy): (f32, f32)) -> (usize, usize) {
        (
            clamp_axis(sx, self.src.x, self.src.width),
            clamp_axis(sy, self.src.y, self.src.height),
        )
    }

    /// Even-aligned luma position whose chroma sample covers `position`
    #[inline]
    fn chroma_origin(&self, position: (f32, f32)) -> (usize, usize) {
        let (x, y) = self.nearest(position);
        (x & !1, y & !1)
    }
}

#[inline]
fn clamp_axis(s: f32, origin: u32, len: u32) -> usize {
    let last = (origin + len - 1) as i64;
    (s.floor() as i64).clamp(origin as i64, last) as usize
}

/// Run `kernel` over the destination region, writing I420 planes
///
/// Destination rows are handed out in pairs together with the chroma row
/// they share, so every worker owns its writes outright.
fn write_i420<K>(dst: I420PlanesMut<'_>, region: &RegionConfig, kernel: K)
where
    K: Fn(usize, usize) -> Option<YuvSample> + Sync + Send,
{
    let pitch = region.pitch();
    let chroma_pitch = region.half_width as usize;
    if pitch == 0 {
        return;
    }
    let first_pair = region.y as usize / 2;
    let pairs = region.end_row().div_ceil(2);
    trace!(width = region.width, height = region.height, pairs, "write i420");

    dst.y
        .par_chunks_mut(2 * pitch)
        .zip(dst.u.par_chunks_mut(chroma_pitch))
        .zip(dst.v.par_chunks_mut(chroma_pitch))
        .enumerate()
        .take(pairs)
        .skip(first_pair)
        .for_each(|(pair, ((luma_rows, u_row), v_row))| {
            for (r, luma_row) in luma_rows.chunks_mut(pitch).enumerate() {
                let y = pair * 2 + r;
                for (x, luma) in luma_row.iter_mut().enumerate() {
                    let Some(sample) = kernel(x, y) else {
                        continue;
                    };
                    *luma = sample.luma;
                    if let Some([u, v]) = sample.chroma {
                        u_row[x / 2] = u;
                        v_row[x / 2] = v;
                    }
                }
            }
        });
}

/// Run `kernel` over the destination region, writing an NV12 buffer
fn write_nv12<K>(dst: &mut [u8], region: &RegionConfig, kernel: K)
where
    K: Fn(usize, usize) -> Option<YuvSample> + Sync + Send,
{
    let pitch = region.pitch();
    if pitch == 0 {
        return;
    }
    let first_pair = region.y as usize / 2;
    let pairs = region.end_row().div_ceil(2);
    let chroma_offset = (region.chroma_offset as usize).min(dst.len());
    let (luma_plane, chroma_plane) = dst.split_at_mut(chroma_offset);
    trace!(width = region.width, height = region.height, pairs, "write nv12");

    luma_plane
        .par_chunks_mut(2 * pitch)
        .zip(chroma_plane.par_chunks_mut(pitch))
        .enumerate()
        .take(pairs)
        .skip(first_pair)
        .for_each(|(pair, (luma_rows, uv_row))| {
            for (r, luma_row) in luma_rows.chunks_mut(pitch).enumerate() {
                let y = pair * 2 + r;
                for (x, luma) in luma_row.iter_mut().enumerate() {
                    let Some(sample) = kernel(x, y) else {
                        continue;
                    };
                    *luma = sample.luma;
                    if let Some([u, v]) = sample.chroma {
                        // half_width * y + x with y even is row y / 2, column x
                        uv_row[x] = u;
                        uv_row[x + 1] = v;
                    }
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_array() {
        let region = RegionConfig::from_array([4, 2, 0, 0, 2, 8]).unwrap();
        assert_eq!(region.pitch(), 4);
        assert_eq!(region.nv12_len(), 12);
        assert_eq!(region.to_array(), [4, 2, 0, 0, 2, 8]);
    }

    #[test]
    fn test_region_rejects_bad_values() {
        assert!(RegionConfig::from_array([-4, 2, 0, 0, 2, 8]).is_err());
        assert!(RegionConfig::from_array([0, 2, 0, 0, 2, 8]).is_err());
        // Region wider than the row pitch
        assert!(RegionConfig::new(6, 2, 0, 0, 2, 8).is_err());
        assert!(RegionConfig::nv12_with_stride(4, 4, 5, 4).is_err());
    }

    #[test]
    fn test_region_lengths() {
        let region = RegionConfig::nv12_with_stride(6, 4, 8, 6).unwrap();
        assert_eq!(region.chroma_offset, 48);
        assert_eq!(region.luma_len(), 32);
        assert_eq!(region.nv12_len(), 48 + 16);
        let i420 = RegionConfig::i420(6, 4).unwrap();
        assert_eq!(i420.i420_chroma_len(), 6);
        assert!(RegionConfig::i420(5, 4).is_err());
    }

    #[test]
    fn test_rect_config() {
        let rect = RectConfig::new(2.0, 0.5).unwrap();
        assert_eq!((rect.kx2, rect.ky2, rect.kxy), (4.0, 0.25, 1.0));
        assert!(RectConfig::new(0.0, 1.0).is_err());
        assert!(RectConfig::new(1.0, f32::INFINITY).is_err());
        assert!(RectConfig::from_array([-1.0, 1.0, 1.0, 1.0, -1.0]).is_err());
        assert_eq!(RectConfig::from_array([1.0; 5]).unwrap(), RectConfig::identity());
    }

    #[test]
    fn test_coordinate_map_offsets_and_clamps() {
        let src = RegionConfig::new(4, 4, 2, 2, 4, 0).unwrap();
        let dst = RegionConfig::new(2, 2, 0, 0, 1, 0).unwrap();
        let map = CoordinateMap::new(&src, &dst, &RectConfig::new(2.0, 2.0).unwrap());
        assert_eq!(map.position(1, 1), (4.0, 4.0));
        assert_eq!(map.nearest((100.0, -3.0)), (5, 2));
        assert_eq!(map.chroma_origin((5.5, 3.9)), (4, 2));
    }
}
