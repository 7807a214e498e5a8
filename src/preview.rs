//! Live preview: re-filter the displayed image on every adjustment change.
//!
//! The preview owns the buffer that is on screen, unrotated, exactly as it
//! was decoded. Each change recomputes the full combined matrix from the
//! current [`AdjustmentState`]; nothing is cached, and the displayed buffer
//! is never consumed, so rendering the same state twice gives the same
//! pixels.

use crate::imaging::filters::build_combined_matrix;
use crate::imaging::render::apply_color_matrix;
use crate::imaging::{AdjustmentState, BackendError, ColorMatrix, ImageBackend, PixelBuffer};
use tracing::trace;

pub struct Preview {
    displayed: PixelBuffer,
}

impl Preview {
    pub fn new(displayed: PixelBuffer) -> Self {
        Self { displayed }
    }

    /// Decode `bytes` for display. No orientation correction is applied.
    pub fn load(backend: &impl ImageBackend, bytes: &[u8]) -> Result<Self, BackendError> {
        backend.decode(bytes).map(Self::new)
    }

    pub fn displayed(&self) -> &PixelBuffer {
        &self.displayed
    }

    /// The color filter for the current state.
    pub fn filter(&self, state: &AdjustmentState) -> ColorMatrix {
        let matrix = build_combined_matrix(state);
        trace!(?state, identity = matrix.is_identity(), "preview filter");
        matrix
    }

    /// The displayed image as it looks under `state`.
    pub fn render(&self, state: &AdjustmentState) -> PixelBuffer {
        apply_color_matrix(&self.displayed, &self.filter(state))
    }

    pub fn into_displayed(self) -> PixelBuffer {
        self.displayed
    }
}
