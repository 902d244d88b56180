// SPDX-License-Identifier: GPL-3.0-only

//! Background blur pipeline
//!
//! Runs the kernels in order on one NV12 camera frame:
//!
//! 1. Remove hardware padding
//! 2. NV12 to I420 (bilinear luma)
//! 3. Resize each plane to the processing size
//! 4. Pack planes into YUVA pixels
//! 5. Blur a copy along both axes
//! 6. Fuse the blurred copy with the sharp one through the mask
//! 7. Unpack to I420
//! 8. I420 to NV12 at the frame size
//! 9. Add output padding
//!
//! Every stage finishes before the next one starts. Buffers for the
//! processing size live as long as the pipeline; buffers for the frame
//! size are reallocated only when the frame size changes.

use crate::config::PipelineConfig;
use crate::errors::{BufferError, PreprocessResult, ensure_len};
use crate::kernels::dispatch::CachedDimensions;
use crate::kernels::fusion::segmentation_fusion;
use crate::kernels::gaussian::{GaussianCoefficients, blur_2d};
use crate::kernels::padding::{add_padding, remove_padding, validate_padding};
use crate::kernels::resize::{bilinear_resize, scale_factor};
use crate::kernels::yuv_convert::{RectConfig, i420_nv12, scale_convert_nv12_i420};
use crate::media::frame::{I420Frame, Nv12Frame, PackedImage};
use crate::media::yuva::{deinterleave_yuva, interleave_yuva};
use std::sync::Arc;
use tracing::{debug, info};

/// Buffers at the camera frame size
struct FrameBuffers {
    /// Unpadded NV12, used both for input and output
    tight: Nv12Frame,
    /// Full-size planar copy of the input
    full: I420Frame,
}

impl FrameBuffers {
    fn new(width: u32, height: u32) -> PreprocessResult<Self> {
        Ok(Self {
            tight: Nv12Frame::new(width, height)?,
            full: I420Frame::new(width, height)?,
        })
    }
}

/// Buffers at the processing size
struct ProcessingBuffers {
    planar: I420Frame,
    live: PackedImage,
    blurred: PackedImage,
    fused: PackedImage,
    transpose_scratch: Vec<u32>,
}

impl ProcessingBuffers {
    fn new(width: u32, height: u32) -> PreprocessResult<Self> {
        Ok(Self {
            planar: I420Frame::new(width, height)?,
            live: PackedImage::new(width, height),
            blurred: PackedImage::new(width, height),
            fused: PackedImage::new(width, height),
            transpose_scratch: vec![0; width as usize * height as usize],
        })
    }
}

/// Blurs the background of camera frames using a segmentation mask
pub struct BackgroundBlurPipeline {
    config: PipelineConfig,
    coefficients: GaussianCoefficients,
    frame_dims: CachedDimensions,
    frame_buffers: Option<FrameBuffers>,
    processing: ProcessingBuffers,
}

impl BackgroundBlurPipeline {
    pub fn new(config: PipelineConfig) -> PreprocessResult<Self> {
        config.validate()?;
        let coefficients = config.coefficients()?;
        info!(
            processing_width = config.processing_width,
            processing_height = config.processing_height,
            sigma = config.blur_sigma,
            min_threshold = config.thresholds.min,
            max_threshold = config.thresholds.max,
            "Background blur pipeline created"
        );
        debug!(coefficients = ?coefficients.to_array(), "Blur coefficients");
        Ok(Self {
            processing: ProcessingBuffers::new(config.processing_width, config.processing_height)?,
            config,
            coefficients,
            frame_dims: CachedDimensions::default(),
            frame_buffers: None,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of mask pixels `process` expects
    pub fn mask_len(&self) -> usize {
        self.config.processing_width as usize * self.config.processing_height as usize
    }

    /// Process one frame
    ///
    /// `mask` holds one packed pixel per processing pixel; each channel is
    /// the foreground probability of that channel scaled to 0..=255 (see
    /// [`crate::kernels::pixel::mask_from_probability`]). The output has
    /// the frame's active size, padded per the configuration.
    pub fn process(&mut self, frame: &Nv12Frame, mask: &[u32]) -> PreprocessResult<Nv12Frame> {
        ensure_len("nv12", &frame.data, frame.row_layout().len())?;
        if mask.len() != self.mask_len() {
            return Err(BufferError::LengthMismatch {
                name: "mask",
                expected: self.mask_len(),
                actual: mask.len(),
            }
            .into());
        }
        if frame.is_padded() {
            validate_padding(frame.active_row_layout(), frame.row_layout())?;
        }

        let (width, height) = (frame.width, frame.height);
        if self.frame_dims.needs_update(width, height) || self.frame_buffers.is_none() {
            debug!(width, height, "Allocating frame buffers");
            self.frame_buffers = Some(FrameBuffers::new(width, height)?);
            self.frame_dims.update(width, height);
        }
        let Some(buffers) = self.frame_buffers.as_mut() else {
            return Err(BufferError::DimensionMismatch {
                name: "frame buffers",
                expected: (width, height),
                actual: (0, 0),
            }
            .into());
        };
        let processing = &mut self.processing;
        let (pw, ph) = (self.config.processing_width, self.config.processing_height);

        // 1
        let source = if frame.is_padded() {
            debug!(stride = frame.stride, luma_rows = frame.luma_rows, "Removing padding");
            remove_padding(
                &frame.data,
                frame.row_layout(),
                &mut buffers.tight.data,
                frame.active_row_layout(),
            );
            &buffers.tight
        } else {
            frame
        };

        // 2
        let full_region = buffers.full.region()?;
        scale_convert_nv12_i420(
            &source.data,
            &source.region()?,
            buffers.full.planes_mut(),
            &full_region,
            &RectConfig::identity(),
        );

        // 3
        debug!(from_width = width, from_height = height, pw, ph, "Resizing planes");
        let sources = buffers.full.plane_views()?;
        let targets = processing.planar.plane_views_mut()?;
        for (src, mut dst) in sources.iter().zip(targets) {
            let fx = scale_factor(src.width, dst.width);
            let fy = scale_factor(src.height, dst.height);
            bilinear_resize(src, &mut dst, fx, fy);
        }

        // 4, 5
        interleave_yuva(&processing.planar, &mut processing.live)?;
        processing
            .blurred
            .pixels
            .copy_from_slice(&processing.live.pixels);
        debug!(sigma = self.config.blur_sigma, "Blurring");
        blur_2d(
            &mut processing.blurred.pixels,
            &mut processing.transpose_scratch,
            pw as usize,
            ph as usize,
            &self.coefficients,
            self.config.clamp_to_edge,
        );

        // 6
        segmentation_fusion(
            &processing.blurred.pixels,
            &processing.live.pixels,
            mask,
            &mut processing.fused.pixels,
            pw as usize,
            ph as usize,
            self.config.thresholds,
        );

        // 7, 8
        deinterleave_yuva(&processing.fused, &mut processing.planar)?;
        let planar_region = processing.planar.region()?;
        let tight_region = buffers.tight.region()?;
        i420_nv12(
            processing.planar.planes(),
            &planar_region,
            &mut buffers.tight.data,
            &tight_region,
            &RectConfig::between(&planar_region, &tight_region)?,
        );

        // 9
        let output = match self.config.output_padding {
            Some(padding) => {
                let mut padded = Nv12Frame::padded(width, height, padding.stride, padding.luma_rows)?;
                validate_padding(padded.active_row_layout(), padded.row_layout())?;
                debug!(stride = padding.stride, luma_rows = padding.luma_rows, "Adding padding");
                let padded_layout = padded.row_layout();
                add_padding(
                    &buffers.tight.data,
                    buffers.tight.row_layout(),
                    &mut padded.data,
                    padded_layout,
                );
                padded
            }
            None => buffers.tight.clone(),
        };

        debug!(width, height, "Frame processed");
        Ok(output)
    }
}

/// Process a frame on the blocking thread pool
///
/// Builds a pipeline for the call; keep a [`BackgroundBlurPipeline`] around
/// instead when processing a stream.
pub async fn process_frame_async(
    config: PipelineConfig,
    frame: Arc<Nv12Frame>,
    mask: Arc<[u32]>,
) -> PreprocessResult<Nv12Frame> {
    info!(
        width = frame.width,
        height = frame.height,
        "Processing frame on blocking pool"
    );
    tokio::task::spawn_blocking(move || {
        let mut pipeline = BackgroundBlurPipeline::new(config)?;
        pipeline.process(&frame, &mask)
    })
    .await?
}
