//! # phototone
//!
//! Combinable color adjustments and orientation correction for photographs.
//! Five independent adjustments (gray, brightness, contrast, sepia,
//! negative) become one affine color transform, which is applied together
//! with an upright rotation to produce a new pixel buffer.
//!
//! # Pipeline
//!
//! ```text
//! AdjustmentState -> active filters -> matrices -> combined ColorMatrix
//!                                                        |
//! source bytes -> decode -> rotate (EXIF) -----------> apply -> encode -> persist
//! ```
//!
//! Preview and export share [`imaging::build_combined_matrix`], so what the
//! preview shows is what export writes. Preview never rotates; export always
//! corrects orientation.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Matrices, composition, orientation, rendering, buffer lifecycle, codecs |
//! | [`preview`] | Re-filter the displayed image on every adjustment change |
//! | [`export`] | Decode → rotate → filter → encode → persist, single and batch |
//! | [`storage`] | Persistence seam and the directory implementation |
//! | [`scan`] | Expand files and directories into export sources |
//! | [`naming`] | File names for exported images |
//! | [`config`] | `phototone.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Composition Order
//!
//! Affine color transforms don't commute, so the order
//! gray → brightness → contrast → sepia → negative is part of the output
//! contract. [`imaging::AdjustmentState::active_filters`] yields filters in
//! that order and composition is a plain fold over it.
//!
//! ## Clamp Once
//!
//! Matrices compose in `f32` without intermediate clamping. Each channel is
//! rounded and clamped to `0..=255` once, after the combined transform.
//!
//! ## Owned Buffers
//!
//! A [`imaging::PixelBuffer`] is either live or disposed. Every stage takes a
//! buffer and hands back a new one, and a [`imaging::BufferLedger`] checks
//! that each intermediate is released exactly once.

pub mod config;
pub mod export;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod preview;
pub mod scan;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
