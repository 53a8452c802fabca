//! 2D rendering module
//!
//! Scene code draws through the [`DrawSurface`] capability; the browser build
//! backs it with a canvas 2D context.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod scene;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use scene::{FrameView, draw_frame};
pub use surface::{DrawCommand, DrawSurface, RecordingSurface, rgba};
