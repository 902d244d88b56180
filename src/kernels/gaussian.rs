// SPDX-License-Identifier: GPL-3.0-only

//! Recursive (IIR) Gaussian blur on packed pixels
//!
//! Deriche's recursive approximation: a causal 2-tap filter run top to
//! bottom and an anti-causal 2-tap filter run bottom to top, whose
//! responses are summed. Cost per pixel is constant whatever the sigma.
//!
//! One invocation owns one column. The forward pass writes its response,
//! the reverse pass adds its own response on top of what is already in the
//! output, so the output buffer is read and written by the same invocation.
//! All arithmetic is in float; every write goes through the truncating
//! [`pack`], including the intermediate forward response.
//!
//! A full 2D blur is column pass, transpose, column pass, transpose back
//! ([`blur_2d`]).

use super::dispatch::{ColumnMut, dispatch_columns};
use super::pixel::{Rgba, pack, unpack};
use super::transpose::transpose;
use crate::constants::MIN_GAUSSIAN_SIGMA;
use crate::errors::ConfigError;
use tracing::trace;

/// Columns handed to one worker at a time
const COLUMN_BAND: usize = 64;

/// Which Gaussian response the coefficients produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GaussianOrder {
    /// Smoothing
    #[default]
    Smooth,
    /// First derivative of Gaussian
    FirstDerivative,
    /// Second derivative of Gaussian
    SecondDerivative,
}

/// Recursive filter coefficients
///
/// `a0..a3` feed-forward, `b1, b2` feedback, `coefp`/`coefn` the steady
/// state gains used to seed the forward/reverse state from the edge pixel.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GaussianCoefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub a3: f32,
    pub b1: f32,
    pub b2: f32,
    pub coefp: f32,
    pub coefn: f32,
}

impl GaussianCoefficients {
    /// Deriche coefficients for `sigma` (pixels)
    ///
    /// Sigmas under 0.1 are raised to 0.1.
    pub fn from_sigma(sigma: f32, order: GaussianOrder) -> Result<Self, ConfigError> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ConfigError::InvalidSigma(sigma));
        }
        let nsigma = sigma.max(MIN_GAUSSIAN_SIGMA);
        let alpha = 1.695 / nsigma;
        let ema = (-alpha).exp();
        let ema2 = (-2.0 * alpha).exp();
        let b1 = -2.0 * ema;
        let b2 = ema2;

        let (a0, a1, a2, a3) = match order {
            GaussianOrder::Smooth => {
                let k = (1.0 - ema) * (1.0 - ema) / (1.0 + 2.0 * alpha * ema - ema2);
                (
                    k,
                    k * (alpha - 1.0) * ema,
                    k * (alpha + 1.0) * ema,
                    -k * ema2,
                )
            }
            GaussianOrder::FirstDerivative => {
                let a0 = (1.0 - ema) * (1.0 - ema);
                (a0, 0.0, -a0, 0.0)
            }
            GaussianOrder::SecondDerivative => {
                let ea = (-alpha).exp();
                let k = -(ema2 - 1.0) / (2.0 * alpha * ema);
                let kn = -2.0 * (-1.0 + 3.0 * ea - 3.0 * ea * ea + ea * ea * ea)
                    / (3.0 * ea + 1.0 + 3.0 * ea * ea + ea * ea * ea);
                (
                    kn,
                    -kn * (1.0 + k * alpha) * ema,
                    kn * (1.0 - k * alpha) * ema,
                    -kn * ema2,
                )
            }
        };

        let denom = 1.0 + b1 + b2;
        Ok(Self {
            a0,
            a1,
            a2,
            a3,
            b1,
            b2,
            coefp: (a0 + a1) / denom,
            coefn: (a2 + a3) / denom,
        })
    }

    /// Coefficients from a parameter block laid out `a0, a1, a2, a3, b1, b2, coefp, coefn`
    pub fn from_array(values: [f32; 8]) -> Self {
        bytemuck::cast(values)
    }

    /// Parameter block in field order
    pub fn to_array(&self) -> [f32; 8] {
        bytemuck::cast(*self)
    }

    /// Passthrough: forward response is the input, reverse response zero
    pub fn identity() -> Self {
        Self {
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
            a3: 0.0,
            b1: 0.0,
            b2: 0.0,
            coefp: 0.0,
            coefn: 0.0,
        }
    }
}

/// Blur every column of a `width x height` packed image
///
/// `input` and `output` are both row-major with `width` pixels per row.
/// With `clamp_to_edge` the filter state is seeded from the first/last
/// pixel of each column; otherwise it starts at zero.
pub fn recursive_gaussian_columns(
    input: &[u32],
    output: &mut [u32],
    width: usize,
    height: usize,
    coeffs: &GaussianCoefficients,
    clamp_to_edge: bool,
) {
    if width == 0 || height == 0 {
        return;
    }
    debug_assert!(input.len() >= width * height, "blur input too small");
    debug_assert!(output.len() >= width * height, "blur output too small");
    trace!(width, height, clamp_to_edge, "recursive gaussian columns");

    dispatch_columns(output, width, height, COLUMN_BAND, |x, column| {
        blur_column(input, width, x, column, coeffs, clamp_to_edge)
    });
}

/// One invocation: forward then reverse pass over column `x`
fn blur_column(
    input: &[u32],
    width: usize,
    x: usize,
    column: &mut ColumnMut<'_, '_, u32>,
    c: &GaussianCoefficients,
    clamp_to_edge: bool,
) {
    let height = column.len();
    if x >= width || height == 0 {
        return;
    }
    let pixel = |y: usize| unpack(input[y * width + x]);

    // Causal pass, top to bottom
    let mut xp = Rgba::ZERO; // previous input
    let mut yp = Rgba::ZERO; // previous output
    let mut yb = Rgba::ZERO; // output before that
    if clamp_to_edge {
        xp = pixel(0);
        yb = c.coefp * xp;
        yp = yb;
    }
    for y in 0..height {
        let xc = pixel(y);
        let yc = c.a0 * xc + c.a1 * xp - c.b1 * yp - c.b2 * yb;
        column.set(y, pack(yc));
        xp = xc;
        yb = yp;
        yp = yc;
    }

    // Anti-causal pass, bottom to top, accumulated onto the causal response
    let mut xn = Rgba::ZERO;
    let mut xa = Rgba::ZERO;
    let mut yn = Rgba::ZERO;
    let mut ya = Rgba::ZERO;
    if clamp_to_edge {
        xn = pixel(height - 1);
        xa = xn;
        yn = c.coefn * xn;
        ya = yn;
    }
    for y in (0..height).rev() {
        let xc = pixel(y);
        let yc = c.a2 * xn + c.a3 * xa - c.b1 * yn - c.b2 * ya;
        xa = xn;
        xn = xc;
        ya = yn;
        yn = yc;
        let accumulated = unpack(column.get(y)) + yc;
        column.set(y, pack(accumulated));
    }
}

/// Blur a packed image along both axes, in place
///
/// `scratch` must hold `width * height` pixels. The image is blurred down
/// its columns, transposed, blurred down the columns of the transpose (the
/// original rows) and transposed back.
pub fn blur_2d(
    image: &mut [u32],
    scratch: &mut [u32],
    width: usize,
    height: usize,
    coeffs: &GaussianCoefficients,
    clamp_to_edge: bool,
) {
    recursive_gaussian_columns(image, scratch, width, height, coeffs, clamp_to_edge);
    transpose(scratch, image, width, height);
    recursive_gaussian_columns(image, scratch, height, width, coeffs, clamp_to_edge);
    transpose(scratch, image, height, width);
}
