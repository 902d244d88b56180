// SPDX-License-Identifier: GPL-3.0-only

//! Owned frame buffers
//!
//! Frames allocate; kernels only borrow. Each frame hands out the
//! [`RegionConfig`], [`PlaneLayout`] or [`RowLayout`] the kernels need to
//! address it.

use crate::errors::{BufferError, ConfigError, ensure_len};
use crate::kernels::image::{Plane, PlaneLayout, PlaneMut};
use crate::kernels::padding::RowLayout;
use crate::kernels::yuv_convert::{I420Planes, I420PlanesMut, RegionConfig};

fn check_even(name: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidDimension { name, value: 0 });
    }
    if value % 2 != 0 {
        return Err(ConfigError::OddDimension { name, value });
    }
    Ok(())
}

/// NV12 frame, possibly padded
///
/// Layout: `luma_rows` rows of `stride` bytes holding the luma plane
/// (the first `height` rows active), then `luma_rows / 2` rows of
/// interleaved U,V at the same stride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nv12Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub luma_rows: u32,
}

impl Nv12Frame {
    /// Zeroed, tightly packed frame
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        Self::padded(width, height, width, height)
    }

    /// Zeroed frame with row and luma-height padding
    pub fn padded(width: u32, height: u32, stride: u32, luma_rows: u32) -> Result<Self, ConfigError> {
        Self::validate_geometry(width, height, stride, luma_rows)?;
        let len = stride as usize * luma_rows as usize * 3 / 2;
        Ok(Self {
            data: vec![0; len],
            width,
            height,
            stride,
            luma_rows,
        })
    }

    /// Wrap existing bytes
    pub fn from_data(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        luma_rows: u32,
    ) -> Result<Self, crate::errors::PreprocessError> {
        Self::validate_geometry(width, height, stride, luma_rows)?;
        let frame = Self {
            data,
            width,
            height,
            stride,
            luma_rows,
        };
        ensure_len("nv12", &frame.data, frame.row_layout().len())?;
        Ok(frame)
    }

    fn validate_geometry(width: u32, height: u32, stride: u32, luma_rows: u32) -> Result<(), ConfigError> {
        check_even("width", width)?;
        check_even("height", height)?;
        check_even("stride", stride)?;
        check_even("luma rows", luma_rows)?;
        if stride < width {
            return Err(ConfigError::StrideTooSmall { stride, width });
        }
        if luma_rows < height {
            return Err(ConfigError::PaddingTooSmall {
                padded: luma_rows,
                active: height,
            });
        }
        Ok(())
    }

    /// Whether the buffer carries row or height padding
    pub fn is_padded(&self) -> bool {
        self.stride != self.width || self.luma_rows != self.height
    }

    /// Geometry seen by the padding kernels
    pub fn row_layout(&self) -> RowLayout {
        RowLayout::new(self.stride as usize, self.luma_rows as usize * 3 / 2)
    }

    /// Geometry of the same image with padding removed
    pub fn active_row_layout(&self) -> RowLayout {
        RowLayout::new(self.width as usize, self.height as usize * 3 / 2)
    }

    /// Whole-image region for the format converters
    pub fn region(&self) -> Result<RegionConfig, ConfigError> {
        RegionConfig::nv12_with_stride(self.width, self.height, self.stride, self.luma_rows)
    }
}

/// Tightly packed I420 frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I420Frame {
    pub y: Vec<u8>,
    pub u: Vec<u8>,
    pub v: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl I420Frame {
    pub fn new(width: u32, height: u32) -> Result<Self, ConfigError> {
        check_even("width", width)?;
        check_even("height", height)?;
        let luma = width as usize * height as usize;
        Ok(Self {
            y: vec![0; luma],
            u: vec![0; luma / 4],
            v: vec![0; luma / 4],
            width,
            height,
        })
    }

    pub fn region(&self) -> Result<RegionConfig, ConfigError> {
        RegionConfig::i420(self.width, self.height)
    }

    pub fn luma_layout(&self) -> Result<PlaneLayout, ConfigError> {
        PlaneLayout::tight(self.width, self.height)
    }

    pub fn chroma_layout(&self) -> Result<PlaneLayout, ConfigError> {
        PlaneLayout::tight(self.width / 2, self.height / 2)
    }

    pub fn planes(&self) -> I420Planes<'_> {
        I420Planes {
            y: &self.y,
            u: &self.u,
            v: &self.v,
        }
    }

    pub fn planes_mut(&mut self) -> I420PlanesMut<'_> {
        I420PlanesMut {
            y: &mut self.y,
            u: &mut self.u,
            v: &mut self.v,
        }
    }

    /// Y, U and V as plane views, in that order
    pub fn plane_views(&self) -> Result<[Plane<'_>; 3], crate::errors::PreprocessError> {
        let luma = self.luma_layout()?;
        let chroma = self.chroma_layout()?;
        Ok([
            Plane::new(&self.y, luma)?,
            Plane::new(&self.u, chroma)?,
            Plane::new(&self.v, chroma)?,
        ])
    }

    /// Y, U and V as writable plane views, in that order
    pub fn plane_views_mut(&mut self) -> Result<[PlaneMut<'_>; 3], crate::errors::PreprocessError> {
        let luma = self.luma_layout()?;
        let chroma = self.chroma_layout()?;
        Ok([
            PlaneMut::new(&mut self.y, luma)?,
            PlaneMut::new(&mut self.u, chroma)?,
            PlaneMut::new(&mut self.v, chroma)?,
        ])
    }
}

/// Packed 4-channel image, one `u32` per pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    pub pixels: Vec<u32>,
    pub width: u32,
    pub height: u32,
}

impl PackedImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0; width as usize * height as usize],
            width,
            height,
        }
    }

    pub fn from_pixels(pixels: Vec<u32>, width: u32, height: u32) -> Result<Self, BufferError> {
        ensure_len("packed image", &pixels, width as usize * height as usize)?;
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}
