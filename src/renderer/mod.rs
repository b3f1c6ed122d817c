//! Rendering module
//!
//! The session describes each frame as two views and hands them to a
//! `RenderSurface`. The GPU implementation raymarches both scenes in a
//! fragment shader; tests and the native demo use lightweight surfaces.

pub mod gpu;
pub mod view;

pub use gpu::GpuSurface;
pub use view::{CameraView, MarkerView, SceneKind, SceneView, SpikeView};

use crate::error::Result;

/// Destination for rendered views.
///
/// Called once per view per frame: the projection view first, then the
/// primary view that displays it.
pub trait RenderSurface {
    fn submit(&mut self, scene: &SceneView, camera: &CameraView) -> Result<()>;
}
