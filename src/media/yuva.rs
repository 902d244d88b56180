// SPDX-License-Identifier: GPL-3.0-only

//! Planar I420 to packed YUVA and back
//!
//! The blur and fusion kernels work on packed 4-channel pixels. Packing
//! puts Y, U, V and an opaque alpha into the R, G, B, A lanes, with each
//! pixel taking the chroma sample of its 2x2 block. Unpacking takes luma
//! from every pixel and chroma from the top-left pixel of each block.

use super::frame::{I420Frame, PackedImage};
use crate::errors::BufferError;
use crate::kernels::dispatch::dispatch_rows;
use crate::kernels::pixel::{pack_bytes, unpack_bytes};
use rayon::prelude::*;

fn check_size(
    name: &'static str,
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), BufferError> {
    if expected != actual {
        return Err(BufferError::DimensionMismatch {
            name,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Pack an I420 frame into `(Y, U, V, 255)` pixels
pub fn interleave_yuva(src: &I420Frame, dst: &mut PackedImage) -> Result<(), BufferError> {
    check_size("packed image", (src.width, src.height), (dst.width, dst.height))?;
    let width = src.width as usize;
    let half_width = width / 2;

    dispatch_rows(&mut dst.pixels, width, src.height as usize, |y, row| {
        let luma = &src.y[y * width..(y + 1) * width];
        let chroma_row = (y / 2) * half_width;
        for (x, pixel) in row.iter_mut().enumerate() {
            let c = chroma_row + x / 2;
            *pixel = pack_bytes([luma[x], src.u[c], src.v[c], 255]);
        }
    });
    Ok(())
}

/// Unpack `(Y, U, V, _)` pixels into an I420 frame
pub fn deinterleave_yuva(src: &PackedImage, dst: &mut I420Frame) -> Result<(), BufferError> {
    check_size("i420 frame", (src.width, src.height), (dst.width, dst.height))?;
    let width = src.width as usize;
    let half_width = width / 2;

    dispatch_rows(&mut dst.y, width, src.height as usize, |y, row| {
        for (x, luma) in row.iter_mut().enumerate() {
            *luma = unpack_bytes(src.pixels[y * width + x])[0];
        }
    });

    dst.u
        .par_chunks_mut(half_width.max(1))
        .zip(dst.v.par_chunks_mut(half_width.max(1)))
        .enumerate()
        .for_each(|(cy, (u_row, v_row))| {
            let row = cy * 2 * width;
            for (cx, (u, v)) in u_row.iter_mut().zip(v_row.iter_mut()).enumerate() {
                let [_, pu, pv, _] = unpack_bytes(src.pixels[row + cx * 2]);
                *u = pu;
                *v = pv;
            }
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> I420Frame {
        let mut frame = I420Frame::new(4, 2).unwrap();
        frame.y = vec![1, 2, 3, 4, 5, 6, 7, 8];
        frame.u = vec![10, 20];
        frame.v = vec![30, 40];
        frame
    }

    #[test]
    fn test_interleave_shares_chroma_per_block() {
        let frame = sample_frame();
        let mut packed = PackedImage::new(4, 2);
        interleave_yuva(&frame, &mut packed).unwrap();
        assert_eq!(packed.pixels[0], pack_bytes([1, 10, 30, 255]));
        assert_eq!(packed.pixels[5], pack_bytes([6, 10, 30, 255]));
        assert_eq!(packed.pixels[7], pack_bytes([8, 20, 40, 255]));
    }

    #[test]
    fn test_round_trip() {
        let frame = sample_frame();
        let mut packed = PackedImage::new(4, 2);
        interleave_yuva(&frame, &mut packed).unwrap();
        let mut back = I420Frame::new(4, 2).unwrap();
        deinterleave_yuva(&packed, &mut back).unwrap();
        assert_eq!(back, frame);
    }

    #[test]
    fn test_deinterleave_uses_block_origin() {
        let mut packed = PackedImage::new(2, 2);
        packed.pixels = vec![
            pack_bytes([1, 50, 60, 0]),
            pack_bytes([2, 99, 99, 0]),
            pack_bytes([3, 99, 99, 0]),
            pack_bytes([4, 99, 99, 0]),
        ];
        let mut frame = I420Frame::new(2, 2).unwrap();
        deinterleave_yuva(&packed, &mut frame).unwrap();
        assert_eq!(frame.y, [1, 2, 3, 4]);
        assert_eq!((frame.u[0], frame.v[0]), (50, 60));
    }

    #[test]
    fn test_size_mismatch() {
        let frame = sample_frame();
        let mut packed = PackedImage::new(2, 2);
        assert!(interleave_yuva(&frame, &mut packed).is_err());
    }
}
