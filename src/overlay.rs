// overlay.rs — debug helpers drawn as line lists (ground grid, world axes)

use glam::Mat4;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl LineVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl LineUniform {
    pub fn new(view: Mat4, projection: Mat4) -> Self {
        Self {
            view_proj: (projection * view).to_cols_array_2d(),
        }
    }
}

pub const GRID_HALF_EXTENT: i32 = 50;
pub const AXIS_LENGTH: f32 = 1000.0;

const GRID_MINOR: [f32; 3] = [0.45, 0.45, 0.5];
const GRID_MAJOR: [f32; 3] = [0.7, 0.7, 0.75];

/// Unit grid on the XZ plane, every tenth line brighter.
pub fn grid_lines(half_extent: i32) -> Vec<LineVertex> {
    let n = half_extent.max(1);
    let edge = n as f32;
    let mut lines = Vec::with_capacity(((2 * n + 1) * 4) as usize);

    for i in -n..=n {
        let color = if i % 10 == 0 { GRID_MAJOR } else { GRID_MINOR };
        let t = i as f32;
        lines.push(LineVertex { position: [t, 0.0, -edge], color });
        lines.push(LineVertex { position: [t, 0.0, edge], color });
        lines.push(LineVertex { position: [-edge, 0.0, t], color });
        lines.push(LineVertex { position: [edge, 0.0, t], color });
    }

    lines
}

/// X (red), Y (green) and Z (blue) axes from the origin.
pub fn axis_lines(length: f32) -> Vec<LineVertex> {
    let axes = [
        ([length, 0.0, 0.0], [1.0, 0.0, 0.0]),
        ([0.0, length, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, length], [0.0, 0.0, 1.0]),
    ];

    axes.iter()
        .flat_map(|&(tip, color)| {
            [
                LineVertex { position: [0.0; 3], color },
                LineVertex { position: tip, color },
            ]
        })
        .collect()
}
