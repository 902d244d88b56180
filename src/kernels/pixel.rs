// SPDX-License-Identifier: GPL-3.0-only

//! Packed pixel conversions
//!
//! A packed pixel is one `u32` holding four 8-bit channels, R in bits
//! 0..8, G in 8..16, B in 16..24 and A in 24..32.
//!
//! Narrowing from float truncates: each lane is cast with `as u32`
//! (negative values saturate to zero) and masked to its low 8 bits.
//! A lane of 256.0 therefore packs to 0, not 255. The blur and fusion
//! kernels depend on this exact behaviour for reproducible output.

use std::ops::{Add, Mul, Sub};

/// Four float lanes in R, G, B, A order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba(pub [f32; 4]);

impl Rgba {
    pub const ZERO: Rgba = Rgba([0.0; 4]);

    #[inline]
    pub fn splat(value: f32) -> Self {
        Rgba([value; 4])
    }

    #[inline]
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Rgba(self.0.map(f))
    }
}

impl Add for Rgba {
    type Output = Rgba;

    #[inline]
    fn add(self, rhs: Rgba) -> Rgba {
        Rgba(std::array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl Sub for Rgba {
    type Output = Rgba;

    #[inline]
    fn sub(self, rhs: Rgba) -> Rgba {
        Rgba(std::array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl Mul<Rgba> for f32 {
    type Output = Rgba;

    #[inline]
    fn mul(self, rhs: Rgba) -> Rgba {
        rhs.map(|lane| self * lane)
    }
}

/// Unpack a packed pixel into float lanes (0.0..=255.0)
#[inline]
pub fn unpack(pixel: u32) -> Rgba {
    Rgba([
        (pixel & 0xff) as f32,
        ((pixel >> 8) & 0xff) as f32,
        ((pixel >> 16) & 0xff) as f32,
        ((pixel >> 24) & 0xff) as f32,
    ])
}

/// Pack float lanes into a pixel, truncating each lane to its low 8 bits
#[inline]
pub fn pack(rgba: Rgba) -> u32 {
    let [r, g, b, a] = rgba.0;
    ((r as u32) & 0xff)
        | (((g as u32) & 0xff) << 8)
        | (((b as u32) & 0xff) << 16)
        | (((a as u32) & 0xff) << 24)
}

/// Pack four byte channels (R, G, B, A)
#[inline]
pub fn pack_bytes(channels: [u8; 4]) -> u32 {
    u32::from_le_bytes(channels)
}

/// Split a packed pixel into its byte channels (R, G, B, A)
#[inline]
pub fn unpack_bytes(pixel: u32) -> [u8; 4] {
    pixel.to_le_bytes()
}

/// Build a packed mask from per-pixel foreground probabilities
///
/// Each probability (clamped to 0..=1) is scaled to 0..=255 and broadcast
/// to all four channels.
pub fn mask_from_probability(probabilities: &[f32]) -> Vec<u32> {
    probabilities
        .iter()
        .map(|&p| {
            let value = (p.clamp(0.0, 1.0) * 255.0) as u8;
            pack_bytes([value; 4])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_order() {
        let pixel = pack_bytes([1, 2, 3, 4]);
        assert_eq!(pixel, 0x0403_0201);
        assert_eq!(unpack(pixel), Rgba([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(unpack_bytes(pixel), [1, 2, 3, 4]);
    }

    #[test]
    fn test_pack_truncates() {
        // Fractions are dropped, not rounded
        assert_eq!(pack(Rgba([10.9, 0.5, 254.99, 255.0])), pack_bytes([10, 0, 254, 255]));
    }

    #[test]
    fn test_pack_masks_overflow() {
        // 256 wraps to 0 and 300 to 44; negatives saturate to 0
        assert_eq!(pack(Rgba([256.0, 300.0, -5.0, 511.0])), pack_bytes([0, 44, 0, 255]));
    }

    #[test]
    fn test_rgba_arithmetic() {
        let a = Rgba([1.0, 2.0, 3.0, 4.0]);
        let b = Rgba::splat(1.0);
        assert_eq!(a + b, Rgba([2.0, 3.0, 4.0, 5.0]));
        assert_eq!(a - b, Rgba([0.0, 1.0, 2.0, 3.0]));
        assert_eq!(2.0 * a, Rgba([2.0, 4.0, 6.0, 8.0]));
    }

    #[test]
    fn test_mask_from_probability() {
        let mask = mask_from_probability(&[0.0, 1.0, 2.0]);
        assert_eq!(mask, vec![0, u32::MAX, u32::MAX]);
    }
}
