//! Error type for the backend.

use std::fmt;

use thiserror::Error;

use crate::context::ShaderKind;
use crate::types::{ImageId, ShaderId};

/// The kind of GL object whose creation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `glCreateTexture` / `glGenTextures`.
    Texture,
    /// `glCreateFramebuffer` / `glGenFramebuffers`.
    Framebuffer,
    /// `glCreateRenderbuffer` / `glGenRenderbuffers`.
    Renderbuffer,
    /// `glCreateBuffer` / `glGenBuffers`.
    Buffer,
    /// `glCreateShader`.
    Shader,
    /// `glCreateProgram`.
    Program,
    /// `glGenVertexArrays`.
    VertexArray,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Texture => "texture",
            Self::Framebuffer => "framebuffer",
            Self::Renderbuffer => "renderbuffer",
            Self::Buffer => "buffer",
            Self::Shader => "shader",
            Self::Program => "program",
            Self::VertexArray => "vertex array",
        };
        f.write_str(name)
    }
}

/// Errors reported by the backend.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend cannot run with the given context or configuration.
    #[error("context not supported: {0}")]
    ContextNotSupported(String),

    /// A required GL entry point could not be resolved by the loader.
    #[error("missing GL entry point: {0}")]
    LoaderMissingSymbol(String),

    /// A `glCreate*` / `glGen*` call returned no object.
    #[error("creating {0} failed")]
    AllocationFailed(ResourceKind),

    /// A shader stage failed to compile.
    #[error("{kind} shader compile error: {log}\nsource:\n{shader_source}")]
    ShaderCompile {
        /// The failing stage.
        kind: ShaderKind,
        /// The driver's info log.
        log: String,
        /// The source text handed to the driver.
        shader_source: String,
    },

    /// A program failed to link.
    #[error("program link error: {0}")]
    ShaderLink(String),

    /// `glCheckFramebufferStatus` returned something other than
    /// `FRAMEBUFFER_COMPLETE`.
    #[error("framebuffer incomplete: status 0x{0:04x}")]
    FramebufferIncomplete(u32),

    /// A built-in shader source contains an identifier reserved by some GLSL
    /// dialects.
    #[error("{0:?} is a reserved GLSL keyword")]
    ReservedKeywordUsed(String),

    /// The image id is not known to the backend.
    #[error("unknown image id {0}")]
    InvalidImage(ImageId),

    /// The shader id is not known to the backend.
    #[error("unknown shader id {0}")]
    InvalidShader(ShaderId),

    /// A GL call left an error flag set. Only reported through
    /// [`DebugContext`](crate::DebugContext).
    #[error("glGetError returned 0x{code:04x} after {call}")]
    Gl {
        /// Name of the GL call that raised the error.
        call: &'static str,
        /// The raw `glGetError` value.
        code: u32,
    },

    /// Image dimensions are zero or exceed `GL_MAX_TEXTURE_SIZE`.
    #[error("invalid image size {width}x{height} (max {max})")]
    InvalidImageSize {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// The context's maximum texture size.
        max: u32,
    },

    /// Pixels were written to the screen image.
    #[error("pixels cannot be replaced on the screen image")]
    ScreenPixelsWrite,

    /// A pixel buffer does not match its region.
    #[error("pixel buffer length mismatch: expected {expected} bytes, got {got}")]
    PixelsLength {
        /// `width * height * 4`.
        expected: usize,
        /// Actual buffer length.
        got: usize,
    },

    /// A uniform value does not match the declared uniform type.
    #[error("uniform {name} expects {expected} floats, got {got}")]
    UniformLength {
        /// Uniform name as seen by GL.
        name: String,
        /// Float count of the declared type.
        expected: usize,
        /// Supplied float count.
        got: usize,
    },

    /// Vertex or index data exceeds the persistent buffer capacity.
    #[error("batch too large: {vertices} vertices, {indices} indices")]
    BatchTooLarge {
        /// Number of vertices passed.
        vertices: usize,
        /// Number of indices passed.
        indices: usize,
    },

    /// Encoding a PNG dump failed.
    #[cfg(feature = "png")]
    #[error("png dump failed: {0}")]
    Dump(#[from] image::ImageError),
}

/// Shorthand for results returned by this crate.
pub type Result<T> = std::result::Result<T, Error>;
