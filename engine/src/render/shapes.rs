//! Builders for immediate-mode geometry.

use glam::{Vec2, Vec3};

use super::frame::{Color, Vertex};

/// Segments used to approximate a circle.
pub const CIRCLE_SEGMENTS: usize = 36;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Triangles,
    Lines,
}

/// `(uv, corner)` per vertex of a quad, corner components are ±1.
type Face = [([f32; 2], [f32; 3]); 4];

const CUBE_FACES: [Face; 6] = [
    // front
    [
        ([0.0, 0.0], [-1.0, -1.0, 1.0]),
        ([1.0, 0.0], [1.0, -1.0, 1.0]),
        ([1.0, 1.0], [1.0, 1.0, 1.0]),
        ([0.0, 1.0], [-1.0, 1.0, 1.0]),
    ],
    // back
    [
        ([1.0, 0.0], [-1.0, -1.0, -1.0]),
        ([1.0, 1.0], [-1.0, 1.0, -1.0]),
        ([0.0, 1.0], [1.0, 1.0, -1.0]),
        ([0.0, 0.0], [1.0, -1.0, -1.0]),
    ],
    // top
    [
        ([0.0, 1.0], [-1.0, 1.0, -1.0]),
        ([0.0, 0.0], [-1.0, 1.0, 1.0]),
        ([1.0, 0.0], [1.0, 1.0, 1.0]),
        ([1.0, 1.0], [1.0, 1.0, -1.0]),
    ],
    // bottom
    [
        ([1.0, 1.0], [-1.0, -1.0, -1.0]),
        ([0.0, 1.0], [1.0, -1.0, -1.0]),
        ([0.0, 0.0], [1.0, -1.0, 1.0]),
        ([1.0, 0.0], [-1.0, -1.0, 1.0]),
    ],
    // right
    [
        ([1.0, 0.0], [1.0, -1.0, -1.0]),
        ([1.0, 1.0], [1.0, 1.0, -1.0]),
        ([0.0, 1.0], [1.0, 1.0, 1.0]),
        ([0.0, 0.0], [1.0, -1.0, 1.0]),
    ],
    // left
    [
        ([0.0, 0.0], [-1.0, -1.0, -1.0]),
        ([1.0, 0.0], [-1.0, -1.0, 1.0]),
        ([1.0, 1.0], [-1.0, 1.0, 1.0]),
        ([0.0, 1.0], [-1.0, 1.0, -1.0]),
    ],
];

/// Quad corners in triangle-list order.
const QUAD_TRIANGLES: [usize; 6] = [0, 1, 2, 0, 2, 3];

/// Box centred on `center`, one textured quad per face.
pub fn textured_cube(center: Vec3, size: Vec3, color: Color) -> Vec<Vertex> {
    let half = size * 0.5;
    CUBE_FACES
        .iter()
        .flat_map(|face| QUAD_TRIANGLES.iter().map(move |&corner| face[corner]))
        .map(|(uv, corner)| {
            let position = center + Vec3::from(corner) * half;
            Vertex::new(position.to_array(), uv, color)
        })
        .collect()
}

/// Reference grid on the XZ plane as a line list; the centre lines are
/// darker than the rest.
pub fn grid(slices: i32, spacing: f32) -> Vec<Vertex> {
    let half = slices / 2;
    let extent = half as f32 * spacing;
    let mut vertices = Vec::with_capacity((2 * half as usize + 1) * 4);
    for i in -half..=half {
        let color = if i == 0 {
            Color::GRID_AXIS
        } else {
            Color::GRID_LINE
        };
        let offset = i as f32 * spacing;
        for position in [
            [offset, 0.0, -extent],
            [offset, 0.0, extent],
            [-extent, 0.0, offset],
            [extent, 0.0, offset],
        ] {
            vertices.push(Vertex::new(position, [0.0, 0.0], color));
        }
    }
    vertices
}

fn quad_2d(origin: Vec2, size: Vec2, color: Color, uvs: [[f32; 2]; 4]) -> Vec<Vertex> {
    let corners = [
        origin,
        origin + Vec2::new(size.x, 0.0),
        origin + size,
        origin + Vec2::new(0.0, size.y),
    ];
    QUAD_TRIANGLES
        .iter()
        .map(|&index| Vertex::new(corners[index].extend(0.0).to_array(), uvs[index], color))
        .collect()
}

/// Filled axis-aligned rectangle, `origin` is the top-left corner.
pub fn rect(origin: Vec2, size: Vec2, color: Color) -> Vec<Vertex> {
    quad_2d(origin, size, color, [[0.0; 2]; 4])
}

/// Rectangle mapping the whole texture, tinted by `tint`.
pub fn sprite(origin: Vec2, size: Vec2, tint: Color) -> Vec<Vertex> {
    quad_2d(
        origin,
        size,
        tint,
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    )
}

/// Filled circle as a triangle fan unrolled into a triangle list.
pub fn circle(center: Vec2, radius: f32, color: Color) -> Vec<Vertex> {
    let point = |segment: usize| {
        let angle = segment as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
        center + Vec2::new(angle.cos(), angle.sin()) * radius
    };
    (0..CIRCLE_SEGMENTS)
        .flat_map(|segment| [center, point(segment), point(segment + 1)])
        .map(|position| Vertex::new(position.extend(0.0).to_array(), [0.0, 0.0], color))
        .collect()
}

pub fn line(from: Vec2, to: Vec2, color: Color) -> Vec<Vertex> {
    [from, to]
        .into_iter()
        .map(|position| Vertex::new(position.extend(0.0).to_array(), [0.0, 0.0], color))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_spans_its_size() {
        let vertices = textured_cube(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(5.0), Color::RAYWHITE);
        assert_eq!(vertices.len(), 36);
        let xs: Vec<f32> = vertices.iter().map(|v| v.position[0]).collect();
        let min = xs.iter().copied().fold(f32::MAX, f32::min);
        let max = xs.iter().copied().fold(f32::MIN, f32::max);
        assert_eq!((min, max), (-1.5, 3.5));
        assert!(vertices.iter().all(|v| v.color == Color::RAYWHITE.to_array()));
    }

    #[test]
    fn cube_front_face_uvs() {
        let vertices = textured_cube(Vec3::ZERO, Vec3::splat(2.0), Color::WHITE);
        assert_eq!(vertices[0].position, [-1.0, -1.0, 1.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.0]);
        assert_eq!(vertices[2].position, [1.0, 1.0, 1.0]);
        assert_eq!(vertices[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn grid_has_two_lines_per_slice() {
        let vertices = grid(20, 10.0);
        assert_eq!(vertices.len(), 21 * 4);
        assert_eq!(vertices[0].position, [-100.0, 0.0, -100.0]);
        let centre = &vertices[10 * 4..11 * 4];
        assert!(centre.iter().all(|v| v.color == Color::GRID_AXIS.to_array()));
    }

    #[test]
    fn circle_points_lie_on_radius() {
        let center = Vec2::new(100.0, 50.0);
        let vertices = circle(center, 10.0, Color::WHITE);
        assert_eq!(vertices.len(), CIRCLE_SEGMENTS * 3);
        for rim in vertices.chunks(3).flat_map(|tri| &tri[1..]) {
            let distance = Vec2::new(rim.position[0], rim.position[1]).distance(center);
            assert!((distance - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn sprite_maps_full_texture() {
        let vertices = sprite(Vec2::new(10.0, 20.0), Vec2::new(48.0, 48.0), Color::WHITE);
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[2].position, [58.0, 68.0, 0.0]);
        assert_eq!(vertices[2].uv, [1.0, 1.0]);
    }
}
