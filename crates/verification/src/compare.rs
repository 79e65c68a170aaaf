//! Image comparison utilities for verification
//!
//! GPU results are compared against host-computed expectations with a
//! tolerance, since sampling and interpolation are not bit-exact across
//! adapters.

/// Result of comparing two images
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompareResult {
    /// Every component is within tolerance
    Match,
    /// Images have different dimensions
    DimensionMismatch {
        /// Dimensions of the expected image
        expected_dimensions: (u32, u32),
        /// Dimensions of the rendered image
        actual_dimensions: (u32, u32),
    },
    /// Images have matching dimensions but different pixel values
    PixelMismatch {
        /// Whether red component values match
        r_matched: bool,
        /// Whether green component values match
        g_matched: bool,
        /// Whether blue component values match
        b_matched: bool,
        /// Whether alpha component values match
        a_matched: bool,
        /// Largest absolute difference seen in any component
        max_difference: f32,
    },
}

/// Compares two RGBA pixels component by component
pub fn compare_pixels(expected: [f32; 4], actual: [f32; 4], tolerance: f32) -> CompareResult {
    let mut matched = [true; 4];
    let mut max_difference: f32 = 0.0;

    for i in 0..4 {
        let difference = (expected[i] - actual[i]).abs();
        // NaN never compares within tolerance
        if !(difference <= tolerance) {
            matched[i] = false;
            max_difference = max_difference.max(if difference.is_nan() { f32::INFINITY } else { difference });
        }
    }

    if matched.iter().all(|&x| x) {
        CompareResult::Match
    } else {
        CompareResult::PixelMismatch {
            r_matched: matched[0],
            g_matched: matched[1],
            b_matched: matched[2],
            a_matched: matched[3],
            max_difference,
        }
    }
}

/// Compares two RGBA32F images pixel by pixel
///
/// # Arguments
/// * `expected` - Image computed on the host
/// * `actual` - Image read back from the GPU
/// * `tolerance` - Largest absolute difference accepted per component
pub fn compare_images(expected: &image::Rgba32FImage, actual: &image::Rgba32FImage, tolerance: f32) -> CompareResult {
    if expected.dimensions() != actual.dimensions() {
        return CompareResult::DimensionMismatch {
            expected_dimensions: expected.dimensions(),
            actual_dimensions: actual.dimensions(),
        };
    }

    let mut result = CompareResult::Match;

    for (expected_pixel, actual_pixel) in expected.pixels().zip(actual.pixels()) {
        let pixel_result = compare_pixels(expected_pixel.0, actual_pixel.0, tolerance);
        result = match (result, pixel_result) {
            (CompareResult::Match, other) | (other, CompareResult::Match) => other,
            (
                CompareResult::PixelMismatch {
                    r_matched,
                    g_matched,
                    b_matched,
                    a_matched,
                    max_difference,
                },
                CompareResult::PixelMismatch {
                    r_matched: r,
                    g_matched: g,
                    b_matched: b,
                    a_matched: a,
                    max_difference: difference,
                },
            ) => CompareResult::PixelMismatch {
                r_matched: r_matched && r,
                g_matched: g_matched && g,
                b_matched: b_matched && b,
                a_matched: a_matched && a,
                max_difference: max_difference.max(difference),
            },
            (other, _) => other,
        };
    }

    result
}
