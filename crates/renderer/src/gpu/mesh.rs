use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Square plane in the XY plane centred on the origin, subdivided into a
/// `segments` x `segments` grid. Rows run top to bottom; `uv` has `v = 1` on
/// the top edge.
pub(crate) fn plane_geometry(size: f32, segments: u32) -> (Vec<PlaneVertex>, Vec<u32>) {
    let segments = segments.max(1);
    let columns = segments + 1;
    let half = size * 0.5;
    let step = size / segments as f32;

    let mut vertices = Vec::with_capacity((columns * columns) as usize);
    for row in 0..columns {
        let y = half - row as f32 * step;
        for column in 0..columns {
            let x = -half + column as f32 * step;
            vertices.push(PlaneVertex {
                position: [x, y, 0.0],
                uv: [
                    column as f32 / segments as f32,
                    1.0 - row as f32 / segments as f32,
                ],
            });
        }
    }

    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for row in 0..segments {
        for column in 0..segments {
            let a = row * columns + column;
            let b = (row + 1) * columns + column;
            let c = (row + 1) * columns + column + 1;
            let d = row * columns + column + 1;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_has_expected_counts() {
        let (vertices, indices) = plane_geometry(10.0, 64);
        assert_eq!(vertices.len(), 65 * 65);
        assert_eq!(indices.len(), 64 * 64 * 6);
        assert!(indices.iter().all(|&index| (index as usize) < vertices.len()));
    }

    #[test]
    fn corners_span_the_plane() {
        let (vertices, _) = plane_geometry(15.0, 48);
        let first = vertices.first().unwrap();
        let last = vertices.last().unwrap();
        assert_eq!(first.position, [-7.5, 7.5, 0.0]);
        assert_eq!(first.uv, [0.0, 1.0]);
        assert!((last.position[0] - 7.5).abs() < 1e-4);
        assert!((last.position[1] + 7.5).abs() < 1e-4);
        assert_eq!(last.uv, [1.0, 0.0]);
    }

    #[test]
    fn triangles_wind_counter_clockwise() {
        let (vertices, indices) = plane_geometry(2.0, 1);
        let [a, b, c] = [indices[0], indices[1], indices[2]].map(|i| vertices[i as usize].position);
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        assert!(cross > 0.0);
    }
}
