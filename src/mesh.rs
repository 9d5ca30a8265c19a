use std::ops::Range;

use bytemuck::{Pod, Zeroable};

/// Interleaved vertex uploaded to the GPU: position, color, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;
    pub const COLOR_OFFSET: u64 = 3 * std::mem::size_of::<f32>() as u64;
    pub const UV_OFFSET: u64 = 6 * std::mem::size_of::<f32>() as u64;

    const fn new(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            color,
            uv,
        }
    }
}

/// Faces of the unit cube in the order they appear in [`CUBE_VERTICES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    Left,
    Far,
    Bottom,
    Near,
    Right,
    Top,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::Left,
        CubeFace::Far,
        CubeFace::Bottom,
        CubeFace::Near,
        CubeFace::Right,
        CubeFace::Top,
    ];

    /// Vertex range covering the two triangles of this face.
    pub fn vertex_range(self) -> Range<u32> {
        let start = self as u32 * VERTICES_PER_FACE;
        start..start + VERTICES_PER_FACE
    }

    /// Outward axis and sign, e.g. `(0, -1.0)` for the -X face.
    pub fn axis(self) -> (usize, f32) {
        match self {
            CubeFace::Left => (0, -1.0),
            CubeFace::Right => (0, 1.0),
            CubeFace::Bottom => (1, -1.0),
            CubeFace::Top => (1, 1.0),
            CubeFace::Far => (2, -1.0),
            CubeFace::Near => (2, 1.0),
        }
    }
}

pub const VERTICES_PER_FACE: u32 = 6;
pub const CUBE_VERTEX_COUNT: u32 = 36;

const RED: [f32; 3] = [1.0, 0.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const TURQUOISE: [f32; 3] = [0.0, 1.0, 1.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const PURPLE: [f32; 3] = [1.0, 0.0, 1.0];
const YELLOW: [f32; 3] = [1.0, 1.0, 0.0];

/// Unit cube centred on the origin, two counter-clockwise triangles per face.
pub const CUBE_VERTICES: [Vertex; CUBE_VERTEX_COUNT as usize] = [
    // left
    Vertex::new([-0.5, -0.5, -0.5], RED, [0.0, 0.0]),
    Vertex::new([-0.5, -0.5, 0.5], RED, [0.0, 1.0]),
    Vertex::new([-0.5, 0.5, 0.5], RED, [1.0, 1.0]),
    Vertex::new([-0.5, -0.5, -0.5], RED, [0.0, 0.0]),
    Vertex::new([-0.5, 0.5, 0.5], RED, [1.0, 1.0]),
    Vertex::new([-0.5, 0.5, -0.5], RED, [1.0, 0.0]),
    // far
    Vertex::new([0.5, 0.5, -0.5], BLUE, [1.0, 1.0]),
    Vertex::new([-0.5, -0.5, -0.5], BLUE, [0.0, 0.0]),
    Vertex::new([-0.5, 0.5, -0.5], BLUE, [0.0, 1.0]),
    Vertex::new([0.5, 0.5, -0.5], BLUE, [1.0, 1.0]),
    Vertex::new([0.5, -0.5, -0.5], BLUE, [1.0, 0.0]),
    Vertex::new([-0.5, -0.5, -0.5], BLUE, [0.0, 0.0]),
    // bottom
    Vertex::new([0.5, -0.5, 0.5], TURQUOISE, [1.0, 1.0]),
    Vertex::new([-0.5, -0.5, -0.5], TURQUOISE, [0.0, 0.0]),
    Vertex::new([0.5, -0.5, -0.5], TURQUOISE, [1.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.5], TURQUOISE, [1.0, 1.0]),
    Vertex::new([-0.5, -0.5, 0.5], TURQUOISE, [0.0, 1.0]),
    Vertex::new([-0.5, -0.5, -0.5], TURQUOISE, [0.0, 0.0]),
    // near
    Vertex::new([-0.5, 0.5, 0.5], GREEN, [0.0, 1.0]),
    Vertex::new([-0.5, -0.5, 0.5], GREEN, [0.0, 0.0]),
    Vertex::new([0.5, -0.5, 0.5], GREEN, [1.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.5], GREEN, [1.0, 1.0]),
    Vertex::new([-0.5, 0.5, 0.5], GREEN, [0.0, 1.0]),
    Vertex::new([0.5, -0.5, 0.5], GREEN, [1.0, 0.0]),
    // right
    Vertex::new([0.5, 0.5, 0.5], PURPLE, [1.0, 1.0]),
    Vertex::new([0.5, -0.5, -0.5], PURPLE, [0.0, 0.0]),
    Vertex::new([0.5, 0.5, -0.5], PURPLE, [1.0, 0.0]),
    Vertex::new([0.5, -0.5, -0.5], PURPLE, [0.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.5], PURPLE, [1.0, 1.0]),
    Vertex::new([0.5, -0.5, 0.5], PURPLE, [0.0, 1.0]),
    // top
    Vertex::new([0.5, 0.5, 0.5], YELLOW, [1.0, 1.0]),
    Vertex::new([0.5, 0.5, -0.5], YELLOW, [1.0, 0.0]),
    Vertex::new([-0.5, 0.5, -0.5], YELLOW, [0.0, 0.0]),
    Vertex::new([0.5, 0.5, 0.5], YELLOW, [1.0, 1.0]),
    Vertex::new([-0.5, 0.5, -0.5], YELLOW, [0.0, 0.0]),
    Vertex::new([-0.5, 0.5, 0.5], YELLOW, [0.0, 1.0]),
];

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    #[test]
    fn vertex_layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);
        assert_eq!(Vertex::COLOR_OFFSET, 12);
        assert_eq!(Vertex::UV_OFFSET, 24);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&CUBE_VERTICES).len(), 36 * 32);
    }

    #[test]
    fn every_face_lies_on_its_axis() {
        for face in CubeFace::ALL {
            let (axis, sign) = face.axis();
            for index in face.vertex_range() {
                let vertex = CUBE_VERTICES[index as usize];
                assert_eq!(vertex.position[axis], 0.5 * sign, "{face:?} vertex {index}");
            }
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        for face in CubeFace::ALL {
            let (axis, sign) = face.axis();
            let mut outward = Vec3::ZERO;
            outward[axis] = sign;
            let range = face.vertex_range();
            for start in range.step_by(3) {
                let [a, b, c] = [start, start + 1, start + 2]
                    .map(|i| Vec3::from_array(CUBE_VERTICES[i as usize].position));
                let normal = (b - a).cross(c - a);
                assert!(normal.dot(outward) > 0.0, "{face:?} triangle at {start}");
            }
        }
    }

    #[test]
    fn faces_cover_the_whole_array() {
        let last = CubeFace::Top.vertex_range();
        assert_eq!(CubeFace::Left.vertex_range().start, 0);
        assert_eq!(last.end, CUBE_VERTEX_COUNT);
    }
}
