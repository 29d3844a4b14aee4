use bytemuck::{Pod, Zeroable};

/// Vertex of the plane grid: local position in `[-0.5, 0.5]²` at z = 0 and
/// texture coordinates with the origin at the image's top-left.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PlaneVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl PlaneVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x2  // uv
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PlaneVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit square subdivided into `segments × segments` cells.
///
/// The default shader keeps it flat; the subdivision exists so the vertex
/// stage can bend the plane from the offset uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneGeometry {
    segments: u32,
    vertices: Vec<PlaneVertex>,
    indices: Vec<u32>,
}

impl PlaneGeometry {
    /// Builds the grid. `segments` is clamped to at least 1.
    pub fn grid(segments: u32) -> Self {
        let segments = segments.max(1);
        let row = segments + 1;
        let step = 1.0 / segments as f32;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for iy in 0..row {
            let v = iy as f32 * step;
            for ix in 0..row {
                let u = ix as f32 * step;
                vertices.push(PlaneVertex {
                    position: [u - 0.5, 0.5 - v, 0.0],
                    uv: [u, v],
                });
            }
        }

        let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
        for iy in 0..segments {
            for ix in 0..segments {
                let a = ix + row * iy;
                let b = ix + row * (iy + 1);
                let c = (ix + 1) + row * (iy + 1);
                let d = (ix + 1) + row * iy;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        Self { segments, vertices, indices }
    }

    #[inline]
    pub fn segments(&self) -> u32 {
        self.segments
    }

    #[inline]
    pub fn vertices(&self) -> &[PlaneVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}
