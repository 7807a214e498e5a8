//! Color adjustment engine: pure Rust, on the `image` crate.
//!
//! | Operation | Where |
//! |---|---|
//! | **Adjustment matrices** | [`filters`]: grayscale, brightness, contrast, sepia, negative |
//! | **Composition** | [`filters::build_combined_matrix`], fixed order |
//! | **Orientation** | [`orientation::resolve_rotation`] |
//! | **Rotate + transform** | [`render`] |
//! | **Buffer lifecycle** | [`buffer::PixelBuffer`], [`buffer::BufferLedger`] |
//! | **Decode / encode** | [`ImageBackend`] + [`RustBackend`] |
//!
//! The module is split into:
//! - **Parameters**: the adjustment snapshot and its gating
//! - **Matrices**: the affine type and the per-adjustment factories
//! - **Render**: pixel work over owned buffers
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod buffer;
pub mod color_matrix;
pub mod filters;
pub mod orientation;
mod params;
pub mod render;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, OutputFormat};
pub use buffer::{BufferId, BufferLedger, LifecycleError, PixelBuffer};
pub use color_matrix::ColorMatrix;
pub use filters::build_combined_matrix;
pub use orientation::{OrientationCode, Rotation, resolve_rotation};
pub use params::{AdjustmentState, Amount, Filter, Quality};
pub use rust_backend::{RustBackend, supported_input_extensions};
