//! Affine color transforms over RGBA vectors.
//!
//! A [`ColorMatrix`] is 4 rows × 5 columns: a 4×4 linear part plus an offset
//! column, in 8-bit channel units (offsets like `255.0` or `128.0` are added
//! directly to channel values). Row order is R, G, B, A.
//!
//! ```text
//! R' = m[0][0]·R + m[0][1]·G + m[0][2]·B + m[0][3]·A + m[0][4]
//! G' = m[1][0]·R + ...
//! B' = m[2][0]·R + ...
//! A' = m[3][0]·R + ...
//! ```
//!
//! Composition treats each matrix as a 5×5 affine matrix with an implicit
//! `[0, 0, 0, 0, 1]` bottom row. Matrices do not commute.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row-major 4×5 affine color matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix {
    rows: [[f32; 5]; 4],
}

impl ColorMatrix {
    pub const IDENTITY: ColorMatrix = ColorMatrix {
        rows: [
            [1.0, 0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ],
    };

    pub const fn from_rows(rows: [[f32; 5]; 4]) -> Self {
        Self { rows }
    }

    pub fn row(&self, index: usize) -> [f32; 5] {
        self.rows[index]
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns the transform "apply `self`, then `next`".
    ///
    /// As a product this is `next × self`: the offset column of `self` passes
    /// through the linear part of `next` before `next`'s own offset is added.
    pub fn post_concat(&self, next: &ColorMatrix) -> ColorMatrix {
        let a = &self.rows;
        let b = &next.rows;
        let mut out = [[0.0f32; 5]; 4];
        for (i, out_row) in out.iter_mut().enumerate() {
            for (j, cell) in out_row.iter_mut().enumerate() {
                let mut sum = 0.0f32;
                for k in 0..4 {
                    sum += b[i][k] * a[k][j];
                }
                if j == 4 {
                    sum += b[i][4];
                }
                *cell = sum;
            }
        }
        ColorMatrix { rows: out }
    }

    /// Transforms one pixel, saturating every channel to `0..=255`.
    ///
    /// Arithmetic runs in `f32`; rounding is to nearest before the clamp so
    /// a channel that lands on `127.99998` after float error still reads 128.
    #[inline]
    pub fn apply(&self, pixel: [u8; 4]) -> [u8; 4] {
        let input = [
            pixel[0] as f32,
            pixel[1] as f32,
            pixel[2] as f32,
            pixel[3] as f32,
        ];
        let mut out = [0u8; 4];
        for (channel, row) in out.iter_mut().zip(self.rows.iter()) {
            let value = row[0] * input[0]
                + row[1] * input[1]
                + row[2] * input[2]
                + row[3] * input[3]
                + row[4];
            *channel = quantize(value);
        }
        out
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for ColorMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row.iter().map(|v| format!("{v:>9.4}")).collect();
            write!(f, "[{}]", cells.join(" "))?;
        }
        Ok(())
    }
}

/// Round to nearest and saturate into an 8-bit channel. NaN maps to 0.
#[inline]
fn quantize(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scale(k: f32) -> ColorMatrix {
        ColorMatrix::from_rows([
            [k, 0.0, 0.0, 0.0, 0.0],
            [0.0, k, 0.0, 0.0, 0.0],
            [0.0, 0.0, k, 0.0, 0.0],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    fn offset(t: f32) -> ColorMatrix {
        ColorMatrix::from_rows([
            [1.0, 0.0, 0.0, 0.0, t],
            [0.0, 1.0, 0.0, 0.0, t],
            [0.0, 0.0, 1.0, 0.0, t],
            [0.0, 0.0, 0.0, 1.0, 0.0],
        ])
    }

    #[test]
    fn identity_is_neutral_for_concat() {
        let m = scale(1.5).post_concat(&offset(10.0));
        assert_eq!(ColorMatrix::IDENTITY.post_concat(&m), m);
        assert_eq!(m.post_concat(&ColorMatrix::IDENTITY), m);
    }

    #[test]
    fn post_concat_applies_self_first() {
        // scale then offset: 2x + 10
        let m = scale(2.0).post_concat(&offset(10.0));
        assert_relative_eq!(m.row(0)[0], 2.0);
        assert_relative_eq!(m.row(0)[4], 10.0);

        // offset then scale: 2(x + 10) = 2x + 20
        let m = offset(10.0).post_concat(&scale(2.0));
        assert_relative_eq!(m.row(0)[0], 2.0);
        assert_relative_eq!(m.row(0)[4], 20.0);
    }

    #[test]
    fn apply_matches_sequential_application_without_clamping() {
        let first = scale(0.5).post_concat(&offset(3.0));
        let second = offset(-7.0).post_concat(&scale(1.25));
        let combined = first.post_concat(&second);
        let pixel = [100, 40, 220, 255];
        let stepwise = second.apply(first.apply(pixel));
        assert_eq!(combined.apply(pixel), stepwise);
    }

    #[test]
    fn apply_saturates_high() {
        assert_eq!(scale(2.0).apply([250, 128, 0, 255]), [255, 255, 0, 255]);
    }

    #[test]
    fn apply_saturates_low() {
        assert_eq!(offset(-50.0).apply([20, 60, 0, 77]), [0, 10, 0, 77]);
    }

    #[test]
    fn apply_rounds_to_nearest() {
        assert_eq!(scale(0.5).apply([3, 5, 1, 255]), [2, 3, 1, 255]);
    }

    #[test]
    fn quantize_handles_nan() {
        assert_eq!(quantize(f32::NAN), 0);
        assert_eq!(quantize(f32::INFINITY), 255);
        assert_eq!(quantize(f32::NEG_INFINITY), 0);
    }

    #[test]
    fn display_has_four_rows() {
        let text = ColorMatrix::IDENTITY.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("[   1.0000"));
    }
}
