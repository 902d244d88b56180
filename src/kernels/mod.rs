// SPDX-License-Identifier: GPL-3.0-only

//! Data-parallel image kernels
//!
//! Each kernel is written as the body of one invocation over a grid and
//! dispatched on the rayon pool. Kernels read and write caller-owned
//! buffers only and never fail; invocations outside the image do nothing.
//!
//! - `transpose`: tiled transpose through shared workgroup scratch
//! - `gaussian`: recursive Gaussian blur, one axis per pass
//! - `fusion`: mask-driven blend of background and live frame
//! - `resize`: bilinear resize of one 8-bit plane
//! - `yuv_convert`: NV12 / I420 conversion with a rectangle transform
//! - `padding`: NV12 stride and row padding removal and insertion

pub mod dispatch;
pub mod fusion;
pub mod gaussian;
pub mod image;
pub mod padding;
pub mod pixel;
pub mod resize;
pub mod transpose;
pub mod yuv_convert;

pub use dispatch::{CachedDimensions, GridSize, WorkgroupSize, compute_dispatch_size};
pub use fusion::{FusionThresholds, segmentation_fusion};
pub use gaussian::{GaussianCoefficients, GaussianOrder, blur_2d, recursive_gaussian_columns};
pub use image::{Plane, PlaneLayout, PlaneMut};
pub use padding::{RowLayout, add_padding, remove_padding, validate_padding};
pub use pixel::{Rgba, mask_from_probability, pack, pack_bytes, unpack, unpack_bytes};
pub use resize::bilinear_resize;
pub use transpose::transpose;
pub use yuv_convert::{
    I420Planes, I420PlanesMut, RectConfig, RegionConfig, i420_nv12, nv12_i420,
    scale_convert_nv12_i420,
};
