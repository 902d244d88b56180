// SPDX-License-Identifier: GPL-3.0-only

//! Camera Preprocess - data-parallel video preprocessing kernels
//!
//! Per-pixel kernels for a camera background-blur pipeline, dispatched
//! over a grid on the rayon thread pool.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`kernels`]: transpose, recursive Gaussian blur, fusion, resize,
//!   NV12/I420 conversion and padding, plus the dispatch model
//! - [`media`]: owned frame buffers and planar/packed glue
//! - [`pipelines`]: the background blur pipeline
//! - [`config`]: pipeline configuration
//! - [`errors`]: error types for the validation boundary
//!
//! # Example
//!
//! ```no_run
//! use camera_preprocess::{BackgroundBlurPipeline, Nv12Frame, PipelineConfig};
//! use camera_preprocess::kernels::mask_from_probability;
//!
//! # fn main() -> camera_preprocess::PreprocessResult<()> {
//! let config = PipelineConfig::default();
//! let mut pipeline = BackgroundBlurPipeline::new(config)?;
//! let frame = Nv12Frame::padded(1280, 720, 1280, 736)?;
//! let mask = mask_from_probability(&vec![1.0; pipeline.mask_len()]);
//! let output = pipeline.process(&frame, &mask)?;
//! # let _ = output;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod kernels;
pub mod media;
pub mod pipelines;

// Re-export commonly used types
pub use config::{OutputPadding, PipelineConfig};
pub use errors::{BufferError, ConfigError, PreprocessError, PreprocessResult};
pub use media::{I420Frame, Nv12Frame, PackedImage};
pub use pipelines::{BackgroundBlurPipeline, process_frame_async};
