//! WebGPU rendering module
//!
//! Scene geometry is rebuilt every frame as colored triangles in CSS pixel space.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{SceneLayout, build_scene};
pub use vertex::Vertex;
