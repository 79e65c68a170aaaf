//! Image orientation and the rotations between orientations

/// Orientation an image was captured or stored in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ImageOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Transformation applied to texture coordinates when sampling an input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    NoRotation,
    RotateCounterclockwise,
    RotateClockwise,
    Rotate180,
    FlipHorizontally,
    FlipVertically,
    RotateClockwiseAndFlipVertically,
    RotateClockwiseAndFlipHorizontally,
}

impl ImageOrientation {
    /// Returns the rotation that maps this orientation onto `target`
    pub fn rotation_needed(self, target: ImageOrientation) -> Rotation {
        use ImageOrientation::*;

        match (self, target) {
            (Portrait, Portrait) | (PortraitUpsideDown, PortraitUpsideDown) | (LandscapeLeft, LandscapeLeft) | (LandscapeRight, LandscapeRight) => Rotation::NoRotation,
            (Portrait, PortraitUpsideDown) | (PortraitUpsideDown, Portrait) => Rotation::Rotate180,
            (LandscapeLeft, LandscapeRight) | (LandscapeRight, LandscapeLeft) => Rotation::Rotate180,
            (Portrait, LandscapeLeft) => Rotation::RotateCounterclockwise,
            (LandscapeLeft, Portrait) => Rotation::RotateClockwise,
            (Portrait, LandscapeRight) => Rotation::RotateClockwise,
            (LandscapeRight, Portrait) => Rotation::RotateCounterclockwise,
            (PortraitUpsideDown, LandscapeLeft) => Rotation::RotateClockwise,
            (LandscapeLeft, PortraitUpsideDown) => Rotation::RotateCounterclockwise,
            (PortraitUpsideDown, LandscapeRight) => Rotation::RotateCounterclockwise,
            (LandscapeRight, PortraitUpsideDown) => Rotation::RotateClockwise,
        }
    }
}

impl Rotation {
    /// Whether the rotation swaps the width and height of the image
    pub fn flips_dimensions(self) -> bool {
        match self {
            Rotation::NoRotation | Rotation::Rotate180 | Rotation::FlipHorizontally | Rotation::FlipVertically => false,
            Rotation::RotateCounterclockwise | Rotation::RotateClockwise | Rotation::RotateClockwiseAndFlipVertically | Rotation::RotateClockwiseAndFlipHorizontally => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIENTATIONS: [ImageOrientation; 4] = [
        ImageOrientation::Portrait,
        ImageOrientation::PortraitUpsideDown,
        ImageOrientation::LandscapeLeft,
        ImageOrientation::LandscapeRight,
    ];

    #[test]
    fn test_same_orientation_needs_no_rotation() {
        for orientation in ORIENTATIONS {
            assert_eq!(orientation.rotation_needed(orientation), Rotation::NoRotation);
        }
    }

    #[test]
    fn test_rotations_invert() {
        let inverse = |rotation: Rotation| match rotation {
            Rotation::RotateClockwise => Rotation::RotateCounterclockwise,
            Rotation::RotateCounterclockwise => Rotation::RotateClockwise,
            other => other,
        };

        for from in ORIENTATIONS {
            for to in ORIENTATIONS {
                assert_eq!(from.rotation_needed(to), inverse(to.rotation_needed(from)), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn test_landscape_to_portrait_flips_dimensions() {
        assert!(ImageOrientation::LandscapeLeft.rotation_needed(ImageOrientation::Portrait).flips_dimensions());
        assert!(ImageOrientation::LandscapeRight.rotation_needed(ImageOrientation::Portrait).flips_dimensions());
        assert!(!ImageOrientation::PortraitUpsideDown.rotation_needed(ImageOrientation::Portrait).flips_dimensions());
        assert!(Rotation::RotateClockwiseAndFlipVertically.flips_dimensions());
        assert!(!Rotation::FlipHorizontally.flips_dimensions());
    }
}
