//! Rotation and color transform over [`PixelBuffer`]s.
//!
//! Export runs the full [`render`]: rotate, then apply the combined matrix,
//! then release the rotated intermediate. Preview only calls
//! [`apply_color_matrix`] on the buffer it is already showing.
//!
//! Rotation is clockwise, via `image::imageops`. A 2×1 row `[a, b]` turned
//! 90° becomes a 1×2 column with `a` on top.

use super::buffer::{BufferLedger, PixelBuffer};
use super::color_matrix::ColorMatrix;
use super::orientation::Rotation;
use image::{RgbaImage, imageops};
use tracing::debug;

/// Rotate `source` clockwise by `rotation`.
///
/// [`Rotation::None`] hands `source` back untouched. Otherwise the rotated
/// copy is tracked in `ledger` and `source` is released through it.
pub fn rotate(source: PixelBuffer, rotation: Rotation, ledger: &mut BufferLedger) -> PixelBuffer {
    let rotated = match rotation {
        Rotation::None => return source,
        Rotation::Clockwise90 => imageops::rotate90(source.image()),
        Rotation::Clockwise180 => imageops::rotate180(source.image()),
        Rotation::Clockwise270 => imageops::rotate270(source.image()),
    };
    debug_assert_eq!(
        rotated.dimensions(),
        rotation.rotated_dimensions(source.width(), source.height())
    );
    let rotated = PixelBuffer::from_image(rotated);
    ledger.track(&rotated);
    debug!(
        source = %source.id(),
        rotated = %rotated.id(),
        degrees = rotation.degrees(),
        width = rotated.width(),
        height = rotated.height(),
        "rotated buffer"
    );
    ledger.release(source);
    rotated
}

/// Apply `matrix` to every pixel of `source` into a new buffer of equal size.
///
/// The source is left untouched. An identity matrix still produces a copy so
/// ownership stays uniform for the caller.
pub fn apply_color_matrix(source: &PixelBuffer, matrix: &ColorMatrix) -> PixelBuffer {
    let input = source.image();
    let (width, height) = input.dimensions();
    let mut output = RgbaImage::new(width, height);
    for (dst, src) in output.pixels_mut().zip(input.pixels()) {
        dst.0 = matrix.apply(src.0);
    }
    PixelBuffer::from_image(output)
}

/// Full export render: rotate, color-transform, release the intermediate.
///
/// `source` must already be tracked by `ledger` if the caller wants the
/// counts to balance; the returned buffer is tracked here and stays live.
pub fn render(
    source: PixelBuffer,
    rotation: Rotation,
    matrix: &ColorMatrix,
    ledger: &mut BufferLedger,
) -> PixelBuffer {
    let rotated = rotate(source, rotation, ledger);
    let output = apply_color_matrix(&rotated, matrix);
    ledger.track(&output);
    debug!(
        input = %rotated.id(),
        output = %output.id(),
        identity = matrix.is_identity(),
        "color matrix applied"
    );
    ledger.release(rotated);
    output
}
