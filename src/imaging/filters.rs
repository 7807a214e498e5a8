//! Adjustment matrices and their composition.
//!
//! Every function here is pure: the same [`Amount`] always yields a
//! bit-identical [`ColorMatrix`]. Gating (which adjustments take part at all)
//! is decided by [`AdjustmentState::active_filters`]; the factories assume
//! their input already passed the gate.
//!
//! ## Composition order
//!
//! ```text
//! grayscale → brightness → contrast → sepia → negative
//! ```
//!
//! The order is part of the visible output. Brightness is a pure scale and
//! contrast a scale around 128, so swapping them changes every pixel that is
//! not mid-gray.

use super::color_matrix::ColorMatrix;
use super::params::{AdjustmentState, Amount, Filter};

/// Luma weights of the saturation matrix (R, G, B).
const LUMA: [f32; 3] = [0.213, 0.715, 0.072];

/// Fixed point of the contrast scale.
const CONTRAST_PIVOT: f32 = 128.0;

/// Saturation matrix with saturation `1 - amount/100`.
///
/// Identity at 0. At 100 every color row equals the luma weights, so the
/// three output channels are the same value.
pub fn grayscale(amount: Amount) -> ColorMatrix {
    let sat = 1.0 - amount.fraction();
    let inv = 1.0 - sat;
    let r = LUMA[0] * inv;
    let g = LUMA[1] * inv;
    let b = LUMA[2] * inv;
    ColorMatrix::from_rows([
        [r + sat, g, b, 0.0, 0.0],
        [r, g + sat, b, 0.0, 0.0],
        [r, g, b + sat, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// Scales R, G and B by `amount/100 × 2`; alpha untouched, no offset.
///
/// At 0 this is all-black, which is why brightness is only composed when its
/// amount is positive.
pub fn brightness(amount: Amount) -> ColorMatrix {
    let k = amount.fraction() * 2.0;
    ColorMatrix::from_rows([
        [k, 0.0, 0.0, 0.0, 0.0],
        [0.0, k, 0.0, 0.0, 0.0],
        [0.0, 0.0, k, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// Scales R, G and B by `c = amount/100 × 1.9 + 0.1` around 128.
pub fn contrast(amount: Amount) -> ColorMatrix {
    let c = amount.fraction() * 1.9 + 0.1;
    let t = CONTRAST_PIVOT * (1.0 - c);
    ColorMatrix::from_rows([
        [c, 0.0, 0.0, 0.0, t],
        [0.0, c, 0.0, 0.0, t],
        [0.0, 0.0, c, 0.0, t],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// Blend between identity (0) and the classic sepia tone matrix (100).
pub fn sepia(amount: Amount) -> ColorMatrix {
    let u = 1.0 - amount.fraction();
    ColorMatrix::from_rows([
        [
            0.393 + 0.607 * u,
            0.769 - 0.769 * u,
            0.189 - 0.189 * u,
            0.0,
            0.0,
        ],
        [
            0.349 - 0.349 * u,
            0.686 + 0.314 * u,
            0.168 - 0.168 * u,
            0.0,
            0.0,
        ],
        [
            0.272 - 0.272 * u,
            0.534 - 0.534 * u,
            0.131 + 0.869 * u,
            0.0,
            0.0,
        ],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// `255 - x` on R, G and B.
pub fn negative() -> ColorMatrix {
    ColorMatrix::from_rows([
        [-1.0, 0.0, 0.0, 0.0, 255.0],
        [0.0, -1.0, 0.0, 0.0, 255.0],
        [0.0, 0.0, -1.0, 0.0, 255.0],
        [0.0, 0.0, 0.0, 1.0, 0.0],
    ])
}

/// The matrix for one gated filter.
pub fn matrix_for(filter: Filter) -> ColorMatrix {
    match filter {
        Filter::Grayscale(amount) => grayscale(amount),
        Filter::Brightness(amount) => brightness(amount),
        Filter::Contrast(amount) => contrast(amount),
        Filter::Sepia(amount) => sepia(amount),
        Filter::Negative => negative(),
    }
}

/// Folds matrices from identity, each applied after everything before it.
pub fn compose<I>(matrices: I) -> ColorMatrix
where
    I: IntoIterator<Item = ColorMatrix>,
{
    matrices
        .into_iter()
        .fold(ColorMatrix::IDENTITY, |acc, next| acc.post_concat(&next))
}

/// The single combined matrix for a snapshot of adjustments.
///
/// Shared by preview and export so the two can never disagree.
pub fn build_combined_matrix(state: &AdjustmentState) -> ColorMatrix {
    compose(state.active_filters().into_iter().map(matrix_for))
}
