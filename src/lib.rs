//! An OpenGL / OpenGL ES / WebGL backend for a 2D textured-triangle renderer,
//! built on [glow].
//!
//! The engine above this crate batches everything it draws into indexed
//! triangles over a fixed [`Vertex`] layout. [`Graphics`] owns the GPU side:
//! images (power-of-two textures, or the screen), the built-in shader
//! programs, user shaders compiled from an [`ir::Program`], and one pair of
//! persistent vertex and index buffers. Each
//! [`draw_triangles`](Graphics::draw_triangles) call binds a destination,
//! selects a program, updates only the uniforms that changed and issues one
//! `glDrawElements`, or two stencil-masked ones for even-odd and non-zero
//! fills.
//!
//! # Features
//!
//! - **One command translator for every dialect**: all GL traffic goes
//!   through the [`Context`] trait. [`GlowContext`] implements it for desktop
//!   GL, GLES and WebGL, [`DebugContext`] decorates any implementation with
//!   `glGetError` checks.
//! - **Redundant state elimination**: framebuffer, texture, viewport, blend
//!   and program bindings are shadowed, and uniform values are compared
//!   bit-for-bit before upload.
//! - **Shader generation**: [`ir::Program`]s are translated to GLSL 1.50,
//!   GLSL ES 1.00 or GLSL ES 3.00 depending on [`Api`].
//! - **Presentation** through an optional [`Presenter`] that makes the
//!   context current and swaps buffers.
//! - **PNG dumps** of any image with the `png` feature (on by default).
//!
//! # Safety
//!
//! Creating a [`GlowContext`] is `unsafe`: the wrapped context must be valid
//! and current on the calling thread for as long as [`Graphics`] uses it.
//!
//! [glow]: https://docs.rs/glow

mod config;
mod context;
mod debug;
#[cfg(feature = "png")]
pub mod dump;
mod error;
mod glow_context;
mod glsl;
mod graphics;
mod image;
pub mod ir;
mod locations;
mod presenter;
mod program;
mod shaders;
mod state;
#[cfg(test)]
mod testing;
mod types;

pub use config::Config;
pub use context::{
    Api, Buffer, Context, Framebuffer, Program, Renderbuffer, Shader, ShaderKind, Texture,
    UniformLocation, VertexArray,
};
pub use debug::DebugContext;
pub use error::{Error, ResourceKind, Result};
pub use glow_context::GlowContext;
pub use glsl::GlslVersion;
pub use graphics::{DrawTriangles, Graphics};
pub use presenter::Presenter;
pub use program::VERTEX_SIZE_IN_BYTES;
pub use types::{
    Address, ColorMatrix, CompositeMode, FillRule, Filter, ImageId, PixelsArgs, Region, ShaderId,
    Vertex, YDirection,
};
