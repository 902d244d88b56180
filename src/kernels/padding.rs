// SPDX-License-Identifier: GPL-3.0-only

//! NV12 padding removal and insertion
//!
//! An NV12 buffer is treated as `rows` rows of bytes where the first two
//! thirds are luma and the last third chroma. A hardware-aligned buffer
//! can be wider (row stride) than the active image. It can also be taller
//! or shorter, with rows inserted or removed between the luma and chroma
//! regions; the chroma offset is `(padded rows - active rows) * 2 / 3`,
//! negative for a short buffer.
//!
//! Rows are copied in 4-byte steps, so active widths must be a multiple
//! of 4. Each invocation owns one destination row.

use super::dispatch::dispatch_rows;
use crate::constants::PADDING_COPY_BYTES;
use crate::errors::ConfigError;
use tracing::trace;

/// Row geometry of an NV12 buffer: bytes per row and total rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLayout {
    pub width: usize,
    pub rows: usize,
}

impl RowLayout {
    pub fn new(width: usize, rows: usize) -> Self {
        Self { width, rows }
    }

    /// Luma rows: the first two thirds
    #[inline]
    pub fn luma_rows(&self) -> usize {
        self.rows * 2 / 3
    }

    pub fn len(&self) -> usize {
        self.width * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Check that `padded` can hold `active`
///
/// The kernels accept short buffers, but a frame copied through one loses
/// rows, so whole-frame callers reject them here.
pub fn validate_padding(active: RowLayout, padded: RowLayout) -> Result<(), ConfigError> {
    if active.width % PADDING_COPY_BYTES != 0 {
        return Err(ConfigError::WidthNotMultipleOfFour(active.width as u32));
    }
    if padded.width < active.width {
        return Err(ConfigError::PaddingTooSmall {
            padded: padded.width as u32,
            active: active.width as u32,
        });
    }
    if padded.rows < active.rows {
        return Err(ConfigError::PaddingTooSmall {
            padded: padded.rows as u32,
            active: active.rows as u32,
        });
    }
    Ok(())
}

/// Copy the active image out of a padded buffer
///
/// Extra padded rows are assumed to sit just before the chroma region, so
/// chroma rows are read `(src.rows - dst.rows) * 2 / 3` rows further down
/// the source. Rows that map outside the source are left untouched.
pub fn remove_padding(src: &[u8], src_layout: RowLayout, dst: &mut [u8], dst_layout: RowLayout) {
    let luma_rows = dst_layout.luma_rows();
    let gap = row_gap(src_layout, dst_layout);
    trace!(?src_layout, ?dst_layout, gap, "remove padding");

    dispatch_rows(dst, dst_layout.width, dst_layout.rows, |id, row| {
        let src_row = if id < luma_rows { id as isize } else { id as isize + gap };
        let Some(src_row) = usize::try_from(src_row).ok().filter(|&r| r < src_layout.rows) else {
            return;
        };
        let start = src_row * src_layout.width;
        let copy = dst_layout.width.min(src_layout.width);
        copy_words(&mut row[..copy], &src[start..start + copy]);
    });
}

/// Copy a tight image into a padded buffer
///
/// The padding rows between luma and chroma, any rows past the chroma
/// region and the tail of each row past the active width are zeroed.
pub fn add_padding(src: &[u8], src_layout: RowLayout, dst: &mut [u8], dst_layout: RowLayout) {
    let luma_rows = src_layout.luma_rows() as isize;
    let gap = row_gap(dst_layout, src_layout);
    trace!(?src_layout, ?dst_layout, gap, "add padding");

    dispatch_rows(dst, dst_layout.width, dst_layout.rows, |id, row| {
        let id = id as isize;
        let src_row = if id < luma_rows {
            Some(id)
        } else if id < luma_rows + gap {
            None
        } else {
            Some(id - gap)
        };
        let Some(src_row) = src_row
            .and_then(|r| usize::try_from(r).ok())
            .filter(|&r| r < src_layout.rows)
        else {
            row.fill(0);
            return;
        };
        let start = src_row * src_layout.width;
        let copy = src_layout.width.min(row.len());
        copy_words(&mut row[..copy], &src[start..start + copy]);
        row[copy..].fill(0);
    });
}

/// Rows inserted before the chroma region of `padded`, negative when short
#[inline]
fn row_gap(padded: RowLayout, active: RowLayout) -> isize {
    (padded.rows as isize - active.rows as isize) * 2 / 3
}

/// One invocation's copy: whole 4-byte words only
#[inline]
fn copy_words(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst
        .chunks_exact_mut(PADDING_COPY_BYTES)
        .zip(src.chunks_exact(PADDING_COPY_BYTES))
    {
        d.copy_from_slice(s);
    }
}
