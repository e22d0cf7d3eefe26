//! Sketchboard Render Library
//!
//! Renderer abstraction for the canvas surface. The default implementation
//! uses Vello; panels and text notes are drawn by egui on top.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{GridStyle, RenderContext, Renderer, RendererError};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
