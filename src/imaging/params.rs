//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the caller (CLI, preview, export) and the pixel work in
//! [`render`](super::render). Keeping them as plain `Copy` values lets export
//! capture an immutable snapshot of the adjustments while preview keeps
//! editing its own.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 100). Clamped on construction.
//! - [`Amount`]: Strength of one adjustment (0–100). Clamped on construction.
//! - [`AdjustmentState`]: The five independent adjustments as one snapshot.
//! - [`Filter`]: One gated adjustment, in composition order.

use serde::{Deserialize, Deserializer, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// Strength of a single adjustment, 0 (no effect) to 100 (full effect).
///
/// Out-of-range input is clamped rather than rejected, both on construction
/// and when deserialized from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(u8);

impl Amount {
    pub const NONE: Amount = Amount(0);
    pub const FULL: Amount = Amount(100);

    pub fn new(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// `value / 100` as the factor the matrix formulas are written in.
    pub fn fraction(self) -> f32 {
        self.0 as f32 / 100.0
    }

    pub fn is_active(self) -> bool {
        self.0 > 0
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(Amount::new)
    }
}

/// One adjustment that passed its gate, carrying what its matrix needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Grayscale(Amount),
    Brightness(Amount),
    Contrast(Amount),
    Sepia(Amount),
    Negative,
}

/// Snapshot of every adjustment the user can make.
///
/// `Copy` on purpose: export takes its own copy and never sees later edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjustmentState {
    pub gray: Amount,
    pub brightness: Amount,
    pub contrast: Amount,
    pub sepia: Amount,
    pub negative: bool,
}

impl AdjustmentState {
    /// The adjustments that take part in composition, in composition order.
    ///
    /// Amounts of zero are skipped. This matters for brightness, whose matrix
    /// at zero scales every color channel to black.
    pub fn active_filters(&self) -> Vec<Filter> {
        let mut filters = Vec::with_capacity(5);
        if self.gray.is_active() {
            filters.push(Filter::Grayscale(self.gray));
        }
        if self.brightness.is_active() {
            filters.push(Filter::Brightness(self.brightness));
        }
        if self.contrast.is_active() {
            filters.push(Filter::Contrast(self.contrast));
        }
        if self.sepia.is_active() {
            filters.push(Filter::Sepia(self.sepia));
        }
        if self.negative {
            filters.push(Filter::Negative);
        }
        filters
    }

    pub fn is_neutral(&self) -> bool {
        self.active_filters().is_empty()
    }
}
