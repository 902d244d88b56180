// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline configuration
//!
//! Loaded from JSON; every field has a default so partial documents are
//! accepted. [`PipelineConfig::validate`] runs on every load.

use crate::constants::defaults;
use crate::errors::ConfigError;
use crate::kernels::fusion::FusionThresholds;
use crate::kernels::gaussian::{GaussianCoefficients, GaussianOrder};
use serde::{Deserialize, Serialize};

/// Padding applied to output frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPadding {
    /// Bytes per row
    pub stride: u32,
    /// Luma rows allocated (chroma gets half as many)
    pub luma_rows: u32,
}

/// Background blur pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Width the frame is resized to before blurring
    pub processing_width: u32,
    /// Height the frame is resized to before blurring
    pub processing_height: u32,
    /// Gaussian sigma in processing pixels
    pub blur_sigma: f32,
    /// Seed the recursive filter from the edge pixels instead of zero
    pub clamp_to_edge: bool,
    /// Mask thresholds for fusion
    pub thresholds: FusionThresholds,
    /// Pad output frames to this geometry (tight when unset)
    pub output_padding: Option<OutputPadding>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            processing_width: defaults::PROCESSING_WIDTH,
            processing_height: defaults::PROCESSING_HEIGHT,
            blur_sigma: defaults::BLUR_SIGMA,
            clamp_to_edge: true,
            thresholds: FusionThresholds::default(),
            output_padding: None,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("processing width", self.processing_width),
            ("processing height", self.processing_height),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidDimension { name, value: 0 });
            }
            if value % 2 != 0 {
                return Err(ConfigError::OddDimension { name, value });
            }
        }
        self.thresholds.validate()?;
        self.coefficients()?;

        if let Some(padding) = self.output_padding {
            if padding.stride % 4 != 0 {
                return Err(ConfigError::WidthNotMultipleOfFour(padding.stride));
            }
            if padding.luma_rows == 0 || padding.luma_rows % 2 != 0 {
                return Err(ConfigError::OddDimension {
                    name: "output luma rows",
                    value: padding.luma_rows,
                });
            }
        }
        Ok(())
    }

    /// Smoothing coefficients for the configured sigma
    pub fn coefficients(&self) -> Result<GaussianCoefficients, ConfigError> {
        GaussianCoefficients::from_sigma(self.blur_sigma, GaussianOrder::Smooth)
    }
}
