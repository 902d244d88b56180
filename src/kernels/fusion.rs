// SPDX-License-Identifier: GPL-3.0-only

//! Segmentation fusion: blend a blurred background with the live frame
//!
//! Each channel is decided on its own from the matching mask channel
//! (mask byte / 255 is the foreground probability `fg`):
//!
//! | fg                 | output                          |
//! |--------------------|---------------------------------|
//! | `fg < min`         | blurred                         |
//! | `min <= fg < max`  | `frame * fg + blurred * (1-fg)` |
//! | `fg >= max`        | frame                           |
//!
//! Channels of one pixel may fall in different regimes.

use super::dispatch::dispatch_rows;
use super::pixel::{Rgba, pack, unpack, unpack_bytes};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Mask thresholds, `0 <= min < max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FusionThresholds {
    pub min: f32,
    pub max: f32,
}

impl FusionThresholds {
    pub fn new(min: f32, max: f32) -> Result<Self, ConfigError> {
        let thresholds = Self { min, max };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min < 0.0 || self.min >= self.max
        {
            return Err(ConfigError::InvalidThresholds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl Default for FusionThresholds {
    fn default() -> Self {
        Self {
            min: crate::constants::defaults::MIN_THRESHOLD,
            max: crate::constants::defaults::MAX_THRESHOLD,
        }
    }
}

/// Fuse a `width x height` image
///
/// - `blurred`: packed background, `width * height` pixels
/// - `frame`: packed live frame, `width * height` pixels
/// - `mask`: packed mask, `width * height` pixels
/// - `output`: packed result, `width * height` pixels
pub fn segmentation_fusion(
    blurred: &[u32],
    frame: &[u32],
    mask: &[u32],
    output: &mut [u32],
    width: usize,
    height: usize,
    thresholds: FusionThresholds,
) {
    debug_assert!(blurred.len() >= width * height, "blurred buffer too small");
    debug_assert!(frame.len() >= width * height, "frame buffer too small");
    debug_assert!(mask.len() >= width * height, "mask buffer too small");
    trace!(width, height, min = thresholds.min, max = thresholds.max, "segmentation fusion");

    dispatch_rows(output, width, height, |y, row| {
        for (x, out) in row.iter_mut().enumerate().take(width) {
            let i = y * width + x;
            *out = fuse_pixel(blurred[i], unpack_bytes(frame[i]), mask[i], thresholds);
        }
    });
}

/// One invocation
#[inline]
pub fn fuse_pixel(blurred: u32, frame: [u8; 4], mask: u32, thresholds: FusionThresholds) -> u32 {
    let background = unpack(blurred);
    let foreground = unpack(mask).map(|m| m / 255.0);

    let fused = std::array::from_fn(|c| {
        let fg = foreground.0[c];
        let live = frame[c] as f32;
        let bg = background.0[c];
        if fg < thresholds.min {
            bg
        } else if fg < thresholds.max {
            live * fg + bg * (1.0 - fg)
        } else {
            live
        }
    });
    pack(Rgba(fused))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::pixel::pack_bytes;

    fn thresholds() -> FusionThresholds {
        FusionThresholds::new(0.25, 0.75).unwrap()
    }

    #[test]
    fn test_background_wins_for_zero_mask() {
        let blurred = pack_bytes([10, 20, 30, 40]);
        let out = fuse_pixel(blurred, [200, 201, 202, 203], 0, thresholds());
        assert_eq!(out, blurred);
    }

    #[test]
    fn test_frame_wins_for_full_mask() {
        let out = fuse_pixel(pack_bytes([10, 20, 30, 40]), [200, 201, 202, 203], u32::MAX, thresholds());
        assert_eq!(out, pack_bytes([200, 201, 202, 203]));
    }

    #[test]
    fn test_zero_mask_with_zero_min_threshold() {
        // fg = 0 falls in the blend regime and still reproduces the background
        let t = FusionThresholds::new(0.0, 0.5).unwrap();
        let blurred = pack_bytes([17, 99, 250, 1]);
        assert_eq!(fuse_pixel(blurred, [0, 255, 3, 90], 0, t), blurred);
    }

    #[test]
    fn test_channels_decide_independently() {
        // R fully foreground, G fully background, B blended at 0.5
        let mask = pack_bytes([255, 0, 128, 0]);
        let out = fuse_pixel(pack_bytes([0, 0, 0, 7]), [100, 100, 100, 100], mask, thresholds());
        let [r, g, b, a] = out.to_le_bytes();
        assert_eq!(r, 100);
        assert_eq!(g, 0);
        assert_eq!(b, 50);
        assert_eq!(a, 7);
    }

    #[test]
    fn test_blend_is_monotonic() {
        let t = thresholds();
        let mut previous = 0u8;
        for m in 64u8..=191 {
            let out = fuse_pixel(pack_bytes([0; 4]), [200; 4], pack_bytes([m; 4]), t);
            let r = out.to_le_bytes()[0];
            assert!(r >= previous, "mask {} gave {} after {}", m, r, previous);
            previous = r;
        }
    }

    #[test]
    fn test_fusion_image() {
        let blurred = vec![pack_bytes([1, 1, 1, 1]); 6];
        let frame = vec![pack_bytes([9, 9, 9, 9]); 6];
        let mut mask = vec![0u32; 6];
        mask[4] = u32::MAX;
        let mut out = vec![0u32; 6];
        segmentation_fusion(&blurred, &frame, &mask, &mut out, 3, 2, thresholds());
        assert_eq!(out[4], pack_bytes([9; 4]));
        assert_eq!(out[0], pack_bytes([1; 4]));
        assert_eq!(out[5], pack_bytes([1; 4]));
    }

    #[test]
    fn test_fusion_keeps_channel_order() {
        let blurred = [0u32];
        let frame = [pack_bytes([10, 20, 30, 40])];
        let mask = [pack_bytes([255, 0, 0, 255])];
        let mut out = [0u32];
        segmentation_fusion(&blurred, &frame, &mask, &mut out, 1, 1, thresholds());
        assert_eq!(unpack_bytes(out[0]), [10, 0, 0, 40]);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(FusionThresholds::new(0.5, 0.5).is_err());
        assert!(FusionThresholds::new(-0.1, 0.5).is_err());
        assert!(FusionThresholds::new(0.0, 1.0).is_ok());
    }
}
