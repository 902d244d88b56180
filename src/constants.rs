// SPDX-License-Identifier: GPL-3.0-only

//! Crate-wide constants

/// Edge length of a transpose tile
pub const TILE_DIM: usize = 16;

/// Bytes moved per invocation by the padding kernels
pub const PADDING_COPY_BYTES: usize = 4;

/// Index of each field in a fixed-layout region configuration array
pub mod region_index {
    pub const CONFIG_WIDTH: usize = 0;
    pub const CONFIG_HEIGHT: usize = 1;
    pub const CONFIG_X: usize = 2;
    pub const CONFIG_Y: usize = 3;
    pub const CONFIG_HALF_WIDTH: usize = 4;
    pub const CONFIG_CHROMA_OFFSET: usize = 5;
    /// Number of fields
    pub const CONFIG_LEN: usize = 6;
}

/// Index of each field in a fixed-layout rectangle transform array
pub mod rect_index {
    pub const RECT_KX: usize = 0;
    pub const RECT_KY: usize = 1;
    pub const RECT_KX2: usize = 2;
    pub const RECT_KY2: usize = 3;
    pub const RECT_KXY: usize = 4;
    /// Number of fields
    pub const RECT_LEN: usize = 5;
}

/// Default pipeline settings
pub mod defaults {
    /// Processing width the frame is resized to before blurring
    pub const PROCESSING_WIDTH: u32 = 640;
    /// Processing height the frame is resized to before blurring
    pub const PROCESSING_HEIGHT: u32 = 360;
    /// Gaussian sigma in pixels at processing resolution
    pub const BLUR_SIGMA: f32 = 8.0;
    /// Below this foreground probability the blurred background wins
    pub const MIN_THRESHOLD: f32 = 0.3;
    /// At or above this foreground probability the live frame wins
    pub const MAX_THRESHOLD: f32 = 0.7;
}

/// Smallest sigma the recursive Gaussian accepts before clamping
pub const MIN_GAUSSIAN_SIGMA: f32 = 0.1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_ordered() {
        assert!(defaults::MIN_THRESHOLD < defaults::MAX_THRESHOLD);
        assert!(defaults::MAX_THRESHOLD <= 1.0);
    }

    #[test]
    fn test_processing_size_is_even() {
        assert_eq!(defaults::PROCESSING_WIDTH % 2, 0);
        assert_eq!(defaults::PROCESSING_HEIGHT % 2, 0);
    }
}
