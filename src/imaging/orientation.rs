//! Orientation tag → rotation.
//!
//! Only the pure rotations are corrected. Mirrored orientations (2, 4, 5, 7)
//! and anything unrecognised degrade to no rotation.

use std::fmt;

/// EXIF orientation tag value (TIFF tag 274) as read by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrientationCode(pub u16);

impl OrientationCode {
    pub const NORMAL: OrientationCode = OrientationCode(1);
    pub const ROTATE_180: OrientationCode = OrientationCode(3);
    pub const ROTATE_90: OrientationCode = OrientationCode(6);
    pub const ROTATE_270: OrientationCode = OrientationCode(8);
}

impl Default for OrientationCode {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Clockwise rotation needed to display the stored pixels upright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Clockwise90 => 90,
            Rotation::Clockwise180 => 180,
            Rotation::Clockwise270 => 270,
        }
    }

    /// True for 90° and 270°, which exchange width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Rotation::Clockwise90 | Rotation::Clockwise270)
    }

    pub fn rotated_dimensions(self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

pub fn resolve_rotation(code: OrientationCode) -> Rotation {
    match code {
        OrientationCode::ROTATE_90 => Rotation::Clockwise90,
        OrientationCode::ROTATE_180 => Rotation::Clockwise180,
        OrientationCode::ROTATE_270 => Rotation::Clockwise270,
        _ => Rotation::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_pure_rotations() {
        assert_eq!(
            resolve_rotation(OrientationCode::ROTATE_90),
            Rotation::Clockwise90
        );
        assert_eq!(
            resolve_rotation(OrientationCode::ROTATE_180),
            Rotation::Clockwise180
        );
        assert_eq!(
            resolve_rotation(OrientationCode::ROTATE_270),
            Rotation::Clockwise270
        );
    }

    #[test]
    fn normal_and_unknown_codes_do_not_rotate() {
        for raw in [0, 1, 2, 4, 5, 7, 9, 255, u16::MAX] {
            assert_eq!(resolve_rotation(OrientationCode(raw)), Rotation::None);
        }
    }

    #[test]
    fn default_code_is_normal() {
        assert_eq!(OrientationCode::default(), OrientationCode::NORMAL);
    }

    #[test]
    fn degrees() {
        assert_eq!(Rotation::None.degrees(), 0);
        assert_eq!(Rotation::Clockwise90.degrees(), 90);
        assert_eq!(Rotation::Clockwise180.degrees(), 180);
        assert_eq!(Rotation::Clockwise270.degrees(), 270);
        assert_eq!(Rotation::Clockwise270.to_string(), "270°");
    }

    #[test]
    fn rotated_dimensions() {
        assert_eq!(Rotation::None.rotated_dimensions(100, 200), (100, 200));
        assert_eq!(Rotation::Clockwise90.rotated_dimensions(100, 200), (200, 100));
        assert_eq!(Rotation::Clockwise180.rotated_dimensions(100, 200), (100, 200));
        assert_eq!(Rotation::Clockwise270.rotated_dimensions(100, 200), (200, 100));
    }
}
