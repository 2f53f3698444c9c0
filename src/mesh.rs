use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    /// Zero for unlit geometry (menu panels).
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// (normal, u, v) with u x v = normal, so quads wind CCW seen from outside.
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

/// Appends a box of `size` centred at `center` (local space), moved by `model`.
pub fn push_box(
    verts: &mut Vec<Vertex>,
    inds: &mut Vec<u32>,
    model: Mat4,
    center: Vec3,
    size: Vec3,
    color: [f32; 3],
) {
    let half = size * 0.5;
    let normal_matrix = Mat3::from_mat4(model).inverse().transpose();

    for (n, u, v) in FACES {
        let base = verts.len() as u32;
        let normal = (normal_matrix * n).normalize_or_zero();
        for (cu, cv) in CORNERS {
            let local = center + (n + u * cu + v * cv) * half;
            verts.push(Vertex {
                pos: model.transform_point3(local).to_array(),
                normal: normal.to_array(),
                color,
            });
        }
        inds.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}

/// Appends a flat rectangle already in clip space.
pub fn push_panel(verts: &mut Vec<Vertex>, inds: &mut Vec<u32>, center: Vec2, half: Vec2, color: [f32; 3]) {
    let base = verts.len() as u32;
    for (cx, cy) in CORNERS {
        verts.push(Vertex {
            pos: [center.x + cx * half.x, center.y + cy * half.y, 0.0],
            normal: [0.0; 3],
            color,
        });
    }
    inds.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}
