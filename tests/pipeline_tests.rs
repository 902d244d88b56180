// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the background blur pipeline

use camera_preprocess::kernels::mask_from_probability;
use camera_preprocess::{
    BackgroundBlurPipeline, Nv12Frame, OutputPadding, PipelineConfig, PreprocessError,
    process_frame_async,
};
use std::sync::{Arc, Once};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

fn config(width: u32, height: u32) -> PipelineConfig {
    PipelineConfig {
        processing_width: width,
        processing_height: height,
        blur_sigma: 3.0,
        ..Default::default()
    }
}

/// Frame whose luma is a horizontal ramp and chroma neutral
fn ramp_frame(width: u32, height: u32) -> Nv12Frame {
    let mut frame = Nv12Frame::new(width, height).unwrap();
    let luma = (width * height) as usize;
    for (i, byte) in frame.data.iter_mut().enumerate() {
        *byte = if i < luma {
            ((i % width as usize) * 255 / (width as usize - 1)) as u8
        } else {
            128
        };
    }
    frame
}

#[test]
fn test_uniform_frame_survives_blur() {
    init_tracing();
    let mut pipeline = BackgroundBlurPipeline::new(config(16, 16)).unwrap();
    let mut frame = Nv12Frame::new(32, 32).unwrap();
    frame.data.fill(90);
    let mask = mask_from_probability(&vec![0.0; pipeline.mask_len()]);

    let output = pipeline.process(&frame, &mask).unwrap();
    // Recursive filtering with truncation may lose a couple of levels
    for &byte in &output.data {
        assert!((88..=90).contains(&byte), "unexpected value {}", byte);
    }
}

#[test]
fn test_foreground_mask_is_lossless_at_processing_size() {
    init_tracing();
    let mut pipeline = BackgroundBlurPipeline::new(config(16, 8)).unwrap();
    let frame = ramp_frame(16, 8);
    let mask = mask_from_probability(&vec![1.0; pipeline.mask_len()]);
    assert_eq!(pipeline.process(&frame, &mask).unwrap(), frame);
}

#[test]
fn test_background_mask_smooths_edges() {
    init_tracing();
    let mut pipeline = BackgroundBlurPipeline::new(config(16, 8)).unwrap();
    // Hard vertical edge in luma
    let mut frame = Nv12Frame::new(16, 8).unwrap();
    for y in 0..8 {
        for x in 0..16 {
            frame.data[y * 16 + x] = if x < 8 { 0 } else { 200 };
        }
    }
    frame.data[128..].fill(128);
    let mask = mask_from_probability(&vec![0.0; pipeline.mask_len()]);
    let output = pipeline.process(&frame, &mask).unwrap();

    let row = &output.data[4 * 16..5 * 16];
    assert!(row[7] > 0, "edge should bleed right to left: {:?}", row);
    assert!(row[8] < 200, "edge should bleed left to right: {:?}", row);
}

#[test]
fn test_padded_input_and_output() {
    init_tracing();
    let mut cfg = config(16, 8);
    cfg.output_padding = Some(OutputPadding {
        stride: 24,
        luma_rows: 12,
    });
    let mut pipeline = BackgroundBlurPipeline::new(cfg).unwrap();

    // Pad a ramp frame the way a camera driver would
    let tight = ramp_frame(16, 8);
    let mut padded = Nv12Frame::padded(16, 8, 24, 12).unwrap();
    for row in 0..8 {
        padded.data[row * 24..row * 24 + 16].copy_from_slice(&tight.data[row * 16..(row + 1) * 16]);
    }
    for row in 0..4 {
        let dst = (12 + row) * 24;
        let src = (8 + row) * 16;
        padded.data[dst..dst + 16].copy_from_slice(&tight.data[src..src + 16]);
    }

    let mask = mask_from_probability(&vec![1.0; pipeline.mask_len()]);
    let output = pipeline.process(&padded, &mask).unwrap();
    assert_eq!(output, padded);
}

#[test]
fn test_mask_size_mismatch() {
    let mut pipeline = BackgroundBlurPipeline::new(config(16, 8)).unwrap();
    let frame = ramp_frame(16, 8);
    match pipeline.process(&frame, &[0u32; 10]) {
        Err(PreprocessError::Buffer(e)) => assert!(e.to_string().contains("mask")),
        other => panic!("expected buffer error, got {:?}", other.map(|f| f.width)),
    }
}

#[test]
fn test_unaligned_padded_width_rejected() {
    let mut pipeline = BackgroundBlurPipeline::new(config(6, 4)).unwrap();
    let frame = Nv12Frame::padded(6, 4, 8, 4).unwrap();
    let mask = vec![0u32; pipeline.mask_len()];
    assert!(matches!(
        pipeline.process(&frame, &mask),
        Err(PreprocessError::Config(_))
    ));
}

#[tokio::test]
async fn test_process_frame_async() {
    init_tracing();
    let cfg = config(16, 8);
    let frame = Arc::new(ramp_frame(16, 8));
    let mask: Arc<[u32]> = mask_from_probability(&[1.0; 16 * 8]).into();
    let output = process_frame_async(cfg, frame.clone(), mask).await.unwrap();
    assert_eq!(&output, frame.as_ref());
}
