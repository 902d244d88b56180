// SPDX-License-Identifier: GPL-3.0-only

//! Borrowed 8-bit plane views
//!
//! Kernels never allocate. They read and write caller-owned buffers
//! described by a [`PlaneLayout`]: row-major, origin top-left, `stride`
//! bytes per row (at least `width`).

use crate::errors::{BufferError, ConfigError, ensure_len};

/// Validated width/height/stride of an 8-bit plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout {
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl PlaneLayout {
    pub fn new(width: u32, height: u32, stride: u32) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "width",
                value: 0,
            });
        }
        if height == 0 {
            return Err(ConfigError::InvalidDimension {
                name: "height",
                value: 0,
            });
        }
        if stride < width {
            return Err(ConfigError::StrideTooSmall { stride, width });
        }
        Ok(Self {
            width,
            height,
            stride,
        })
    }

    /// Layout with no row padding
    pub fn tight(width: u32, height: u32) -> Result<Self, ConfigError> {
        Self::new(width, height, width)
    }

    /// Bytes a buffer must hold for this layout
    pub fn len(&self) -> usize {
        self.stride as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only plane
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl<'a> Plane<'a> {
    /// Wrap a buffer, checking it covers the layout
    pub fn new(data: &'a [u8], layout: PlaneLayout) -> Result<Self, BufferError> {
        ensure_len("plane", data, layout.len())?;
        Ok(Self {
            data,
            width: layout.width,
            height: layout.height,
            stride: layout.stride,
        })
    }

    /// Sample at (x, y); caller keeps the coordinate in bounds
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.stride as usize + x]
    }
}

/// Writable plane
#[derive(Debug)]
pub struct PlaneMut<'a> {
    pub data: &'a mut [u8],
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

impl<'a> PlaneMut<'a> {
    pub fn new(data: &'a mut [u8], layout: PlaneLayout) -> Result<Self, BufferError> {
        ensure_len("plane", data, layout.len())?;
        Ok(Self {
            data,
            width: layout.width,
            height: layout.height,
            stride: layout.stride,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_validation() {
        assert!(PlaneLayout::new(4, 4, 8).is_ok());
        assert_eq!(
            PlaneLayout::new(8, 4, 4),
            Err(ConfigError::StrideTooSmall {
                stride: 4,
                width: 8
            })
        );
        assert!(PlaneLayout::tight(0, 4).is_err());
        assert_eq!(PlaneLayout::new(3, 2, 4).map(|l| l.len()), Ok(8));
    }

    #[test]
    fn test_plane_rows_skip_padding() {
        let data = [1u8, 2, 0, 0, 3, 4, 0, 0];
        let layout = PlaneLayout::new(2, 2, 4).unwrap();
        let plane = Plane::new(&data, layout).unwrap();
        assert_eq!((plane.at(0, 1), plane.at(1, 1)), (3, 4));
        assert_eq!(plane.at(1, 0), 2);
    }

    #[test]
    fn test_plane_rejects_short_buffer() {
        let data = [0u8; 7];
        let layout = PlaneLayout::new(2, 2, 4).unwrap();
        assert!(Plane::new(&data, layout).is_err());
    }
}
