// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines composed from the kernels
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │ Background Blur    │ ──▶ │ Output Frame │
//! │ (NV12,       │     │  - unpad, convert  │     │ (NV12,       │
//! │  padded)     │     │  - resize, blur    │     │  padded)     │
//! │              │     │  - mask fusion     │     │              │
//! └──────────────┘     └────────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`background_blur`]: segmentation-driven background blur

pub mod background_blur;

pub use background_blur::{BackgroundBlurPipeline, process_frame_async};
