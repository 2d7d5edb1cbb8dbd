//! WebGPU rendering module
//!
//! Frames are built on the CPU as flat-colored triangles in world space
//! (y-down pixels) and mapped to NDC at upload time.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::build_frame;
pub use vertex::Vertex;
