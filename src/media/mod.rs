// SPDX-License-Identifier: GPL-3.0-only

//! Frame buffers and layout glue between pipeline stages
//!
//! Camera frames arrive as NV12, possibly with hardware padding. The
//! converters produce I420, and the blur and fusion stages need packed
//! 4-channel pixels.
//!
//! # Modules
//!
//! - [`frame`]: owned NV12, I420 and packed frames
//! - [`yuva`]: I420 to packed YUVA and back

pub mod frame;
pub mod yuva;

pub use frame::{I420Frame, Nv12Frame, PackedImage};
pub use yuva::{deinterleave_yuva, interleave_yuva};
