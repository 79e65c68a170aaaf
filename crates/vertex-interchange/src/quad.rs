//! Quad geometry for full-frame operations
//!
//! Operations draw one triangle-strip quad covering the output. The vertex
//! stage combines these positions with per-input texture coordinates into the
//! interchange records; the helpers here compute the same records on the host.

use crate::orientation::{ImageOrientation, Rotation};
use crate::vertex_io::{SingleInputVertexIO, TwoInputVertexIO};

/// Clip-space corners of the output quad in triangle-strip order
///
/// Top-left, top-right, bottom-left, bottom-right. Texture coordinates use a
/// top-left origin, so the top-left corner samples (0, 0) when unrotated.
pub const STANDARD_IMAGE_VERTICES: [[f32; 2]; 4] = [[-1.0, 1.0], [1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];

/// Returns the texture coordinate for each quad corner under `rotation`
///
/// # Arguments
/// * `rotation` - Rotation from the input's orientation to the output's
/// * `x_limit` - Coordinate of the right edge (1.0 when normalized, else the width)
/// * `y_limit` - Coordinate of the bottom edge (1.0 when normalized, else the height)
pub fn texture_coordinates(rotation: Rotation, x_limit: f32, y_limit: f32) -> [[f32; 2]; 4] {
    let (x, y) = (x_limit, y_limit);
    match rotation {
        Rotation::NoRotation => [[0.0, 0.0], [x, 0.0], [0.0, y], [x, y]],
        Rotation::RotateCounterclockwise => [[0.0, y], [0.0, 0.0], [x, y], [x, 0.0]],
        Rotation::RotateClockwise => [[x, 0.0], [x, y], [0.0, 0.0], [0.0, y]],
        Rotation::Rotate180 => [[x, y], [0.0, y], [x, 0.0], [0.0, 0.0]],
        Rotation::FlipHorizontally => [[x, 0.0], [0.0, 0.0], [x, y], [0.0, y]],
        Rotation::FlipVertically => [[0.0, y], [x, y], [0.0, 0.0], [x, 0.0]],
        Rotation::RotateClockwiseAndFlipVertically => [[0.0, 0.0], [0.0, y], [x, 0.0], [x, y]],
        Rotation::RotateClockwiseAndFlipHorizontally => [[x, y], [x, 0.0], [0.0, y], [0.0, 0.0]],
    }
}

/// Right and bottom coordinate limits for a texture of the given size
///
/// Normalized coordinates span 0 to 1; otherwise they span texel units.
pub fn coordinate_limits(width: u32, height: u32, normalized: bool) -> (f32, f32) {
    if normalized { (1.0, 1.0) } else { (width as f32, height as f32) }
}

/// Height over width of a texture, as written to an `aspectRatio` uniform
///
/// Stored dimensions are used regardless of orientation.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    height as f32 / width as f32
}

/// Size of the portrait output produced from an input of the given size and orientation
pub fn output_size(width: u32, height: u32, orientation: ImageOrientation) -> (u32, u32) {
    if orientation.rotation_needed(ImageOrientation::Portrait).flips_dimensions() {
        (height, width)
    } else {
        (width, height)
    }
}

fn clip_position(corner: [f32; 2]) -> [f32; 4] {
    [corner[0], corner[1], 0.0, 1.0]
}

/// The four records `one_input_vertex` emits for a quad
pub fn single_input_quad(rotation: Rotation) -> [SingleInputVertexIO; 4] {
    let coordinates = texture_coordinates(rotation, 1.0, 1.0);
    std::array::from_fn(|corner| SingleInputVertexIO::new(clip_position(STANDARD_IMAGE_VERTICES[corner]), coordinates[corner]))
}

/// The four records `two_input_vertex` emits for a quad
pub fn two_input_quad(rotation: Rotation, rotation2: Rotation) -> [TwoInputVertexIO; 4] {
    let coordinates = texture_coordinates(rotation, 1.0, 1.0);
    let coordinates2 = texture_coordinates(rotation2, 1.0, 1.0);
    std::array::from_fn(|corner| TwoInputVertexIO::new(clip_position(STANDARD_IMAGE_VERTICES[corner]), coordinates[corner], coordinates2[corner]))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 8] = [
        Rotation::NoRotation,
        Rotation::RotateCounterclockwise,
        Rotation::RotateClockwise,
        Rotation::Rotate180,
        Rotation::FlipHorizontally,
        Rotation::FlipVertically,
        Rotation::RotateClockwiseAndFlipVertically,
        Rotation::RotateClockwiseAndFlipHorizontally,
    ];

    fn sorted(mut coordinates: [[f32; 2]; 4]) -> [[f32; 2]; 4] {
        coordinates.sort_by(|a, b| a.partial_cmp(b).unwrap());
        coordinates
    }

    #[test]
    fn test_every_rotation_maps_corners_to_corners() {
        let corners = sorted(texture_coordinates(Rotation::NoRotation, 1.0, 1.0));
        for rotation in ROTATIONS {
            assert_eq!(sorted(texture_coordinates(rotation, 1.0, 1.0)), corners, "{rotation:?}");
        }
    }

    #[test]
    fn test_unrotated_quad_uses_top_left_origin() {
        let coordinates = texture_coordinates(Rotation::NoRotation, 1.0, 1.0);
        for (vertex, coordinate) in STANDARD_IMAGE_VERTICES.iter().zip(coordinates) {
            // Clip-space x grows with u, clip-space y shrinks as v grows
            assert_eq!(coordinate[0], (vertex[0] + 1.0) / 2.0);
            assert_eq!(coordinate[1], (1.0 - vertex[1]) / 2.0);
        }
    }

    #[test]
    fn test_unnormalized_limits() {
        let coordinates = texture_coordinates(Rotation::Rotate180, 640.0, 480.0);
        assert_eq!(coordinates[0], [640.0, 480.0]);
        assert_eq!(coordinates[3], [0.0, 0.0]);
    }

    #[test]
    fn test_coordinate_limits() {
        assert_eq!(coordinate_limits(640, 480, true), (1.0, 1.0));
        assert_eq!(coordinate_limits(640, 480, false), (640.0, 480.0));

        let (x_limit, y_limit) = coordinate_limits(4, 2, false);
        assert_eq!(texture_coordinates(Rotation::RotateClockwise, x_limit, y_limit)[0], [4.0, 0.0]);
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(aspect_ratio(640, 480), 0.75);
        assert_eq!(aspect_ratio(2, 4), 2.0);
    }

    #[test]
    fn test_flips_mirror_one_axis() {
        let base = texture_coordinates(Rotation::NoRotation, 1.0, 1.0);
        let horizontal = texture_coordinates(Rotation::FlipHorizontally, 1.0, 1.0);
        let vertical = texture_coordinates(Rotation::FlipVertically, 1.0, 1.0);

        for corner in 0..4 {
            assert_eq!(horizontal[corner], [1.0 - base[corner][0], base[corner][1]]);
            assert_eq!(vertical[corner], [base[corner][0], 1.0 - base[corner][1]]);
        }
    }

    #[test]
    fn test_output_size() {
        assert_eq!(output_size(640, 480, ImageOrientation::Portrait), (640, 480));
        assert_eq!(output_size(640, 480, ImageOrientation::PortraitUpsideDown), (640, 480));
        assert_eq!(output_size(640, 480, ImageOrientation::LandscapeLeft), (480, 640));
        assert_eq!(output_size(640, 480, ImageOrientation::LandscapeRight), (480, 640));
    }

    #[test]
    fn test_single_input_quad() {
        let quad = single_input_quad(Rotation::NoRotation);
        assert_eq!(quad[0], SingleInputVertexIO::new([-1.0, 1.0, 0.0, 1.0], [0.0, 0.0]));
        assert_eq!(quad[3], SingleInputVertexIO::new([1.0, -1.0, 0.0, 1.0], [1.0, 1.0]));
    }

    #[test]
    fn test_two_input_quad_rotates_inputs_independently() {
        let quad = two_input_quad(Rotation::NoRotation, Rotation::Rotate180);
        let single = single_input_quad(Rotation::NoRotation);

        for corner in 0..4 {
            assert_eq!(quad[corner].position, single[corner].position);
            assert_eq!(quad[corner].texture_coordinate, single[corner].texture_coordinate);
        }
        assert_eq!(quad[0].texture_coordinate2, [1.0, 1.0]);
        assert_eq!(quad[3].texture_coordinate2, [0.0, 0.0]);
    }
}
