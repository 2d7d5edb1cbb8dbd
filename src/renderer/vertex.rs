//! Vertex types for 2D rendering
//!
//! Positions are in world pixels until `RenderState::render` maps them to NDC.

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for scene elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.35, 0.6, 0.9, 1.0];
    pub const SKY_HORIZON: [f32; 4] = [0.75, 0.88, 1.0, 1.0];
    pub const GROUND: [f32; 4] = [0.35, 0.65, 0.25, 1.0];
    pub const STAR: [f32; 4] = [1.0, 0.85, 0.2, 1.0];
    pub const BOMB: [f32; 4] = [0.12, 0.12, 0.14, 1.0];
    pub const PLAYER: [f32; 4] = [0.55, 0.3, 0.7, 1.0];
    pub const PLAYER_EYE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Physics debug outlines
    pub const DEBUG_DYNAMIC: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
    pub const DEBUG_STATIC: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const DEBUG_BLOCKED: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
}
