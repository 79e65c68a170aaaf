//! Luminance weighting shared by fragment stages

use half::f16;

/// Perceptual luminance coefficients for (R, G, B), in half precision
///
/// Values from "Graphics Shaders: Theory and Practice" by Bailey and Cunningham.
/// They sum to one, so weighting a grey sample returns the same grey.
pub const LUMINANCE_WEIGHTING: [f16; 3] = [f16::from_f32_const(0.2125), f16::from_f32_const(0.7154), f16::from_f32_const(0.0721)];

/// The coefficients as written in the WGSL header
pub const LUMINANCE_WEIGHTING_F32: [f32; 3] = [0.2125, 0.7154, 0.0721];

/// Computes the luminance of an RGB sample
///
/// Uses the half-precision weights, matching what a fragment stage computes
/// with a `half3` weighting.
pub fn luminance(rgb: [f32; 3]) -> f32 {
    rgb.iter().zip(LUMINANCE_WEIGHTING).map(|(channel, weight)| channel * weight.to_f32()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_are_unit_interval() {
        for weight in LUMINANCE_WEIGHTING {
            let weight = weight.to_f32();
            assert!((0.0..=1.0).contains(&weight), "weight {weight} out of range");
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let sum: f32 = LUMINANCE_WEIGHTING.iter().map(|weight| weight.to_f32()).sum();
        assert!((sum - 1.0).abs() < 1e-3, "sum was {sum}");

        let sum_f32: f32 = LUMINANCE_WEIGHTING_F32.iter().sum();
        assert!((sum_f32 - 1.0).abs() < 1e-6, "sum was {sum_f32}");
    }

    #[test]
    fn test_half_weights_match_header() {
        for (half, single) in LUMINANCE_WEIGHTING.iter().zip(LUMINANCE_WEIGHTING_F32) {
            assert!((half.to_f32() - single).abs() < 1e-3);
        }
    }

    #[test]
    fn test_luminance() {
        assert_eq!(luminance([0.0, 0.0, 0.0]), 0.0);
        assert!((luminance([1.0, 1.0, 1.0]) - 1.0).abs() < 1e-3);
        assert!((luminance([0.5, 0.5, 0.5]) - 0.5).abs() < 1e-3);

        // Green dominates perceived brightness
        assert!(luminance([0.0, 1.0, 0.0]) > luminance([1.0, 0.0, 0.0]));
        assert!(luminance([1.0, 0.0, 0.0]) > luminance([0.0, 0.0, 1.0]));
    }
}
