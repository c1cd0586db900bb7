//! The capability interface over desktop GL, GLES and WebGL.
//!
//! [`Context`] is the only way the backend talks to the GPU. Every method maps
//! to one GL entry point and works on plain numeric handles, so the same
//! command translator drives any dialect: [`GlowContext`](crate::GlowContext)
//! binds it to a real context, [`DebugContext`](crate::DebugContext) decorates
//! any implementation with per-call error checks.
//!
//! Handle `0` is the null object everywhere. Passing it to a `bind_*` call
//! unbinds; `create_*` calls return it on allocation failure.

use std::fmt;

use crate::error::{Error, Result};
use crate::glsl::GlslVersion;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// The null object.
            pub const NONE: Self = Self(0);

            /// Returns `true` for the null object.
            #[must_use]
            pub const fn is_none(self) -> bool {
                self.0 == 0
            }
        }
    };
}

native_handle!(
    /// A texture object.
    Texture
);
native_handle!(
    /// A framebuffer object. The screen framebuffer is not necessarily `0`.
    Framebuffer
);
native_handle!(
    /// A renderbuffer object.
    Renderbuffer
);
native_handle!(
    /// A buffer object (array or element array).
    Buffer
);
native_handle!(
    /// A vertex array object.
    VertexArray
);
native_handle!(
    /// A shader object.
    Shader
);
native_handle!(
    /// A linked (or linking) program object.
    Program
);

/// A uniform location inside the currently used program.
///
/// `-1` means the name is not an active uniform; callers skip the upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// The "not present" sentinel.
    pub const INVALID: Self = Self(-1);

    /// Returns `false` for [`UniformLocation::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 0
    }
}

/// A shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// `GL_VERTEX_SHADER`.
    Vertex,
    /// `GL_FRAGMENT_SHADER`.
    Fragment,
}

impl ShaderKind {
    /// The GL enum passed to `glCreateShader`.
    #[must_use]
    pub const fn gl_enum(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        })
    }
}

/// The GL dialect behind a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Api {
    /// Desktop OpenGL 3.2 core profile or later.
    OpenGl,
    /// OpenGL ES 2.0.
    Gles2,
    /// OpenGL ES 3.0 or later.
    Gles3,
    /// WebGL 1.
    WebGl1,
    /// WebGL 2.
    WebGl2,
}

impl Api {
    /// Whether GLES semantics apply (stencil formats, precision qualifiers,
    /// context loss).
    #[must_use]
    pub const fn is_es(self) -> bool {
        !matches!(self, Self::OpenGl)
    }

    /// Whether the context runs inside a browser.
    #[must_use]
    pub const fn is_browser(self) -> bool {
        matches!(self, Self::WebGl1 | Self::WebGl2)
    }

    /// Whether vertex array objects exist in this dialect.
    #[must_use]
    pub const fn has_vertex_arrays(self) -> bool {
        matches!(self, Self::OpenGl | Self::Gles3 | Self::WebGl2)
    }

    /// The GLSL dialect shaders are generated in.
    #[must_use]
    pub const fn glsl_version(self) -> GlslVersion {
        match self {
            Self::OpenGl => GlslVersion::Default,
            Self::Gles2 | Self::WebGl1 => GlslVersion::Es100,
            Self::Gles3 | Self::WebGl2 => GlslVersion::Es300,
        }
    }
}

/// One GL / GLES / WebGL context.
///
/// Methods never fail on their own: GL reports errors through
/// [`get_error`](Self::get_error), and creation calls return the null handle
/// when allocation fails. All calls must happen on the thread that owns the
/// current context.
#[allow(missing_docs, clippy::too_many_arguments)]
pub trait Context {
    /// The dialect of this context.
    fn api(&self) -> Api;

    /// Whether GLES-dialect semantics apply.
    fn is_es(&self) -> bool {
        self.api().is_es()
    }

    /// Resolves the GL entry points. Called once, on the first reset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LoaderMissingSymbol`] when a required entry point is
    /// unavailable.
    fn load_functions(&mut self) -> Result<()> {
        Ok(())
    }

    /// Takes the first error observed since the last call. Only decorators
    /// such as [`DebugContext`](crate::DebugContext) ever report one.
    fn take_error(&mut self) -> Option<Error> {
        None
    }

    fn get_error(&mut self) -> u32;
    fn get_integer(&mut self, pname: u32) -> i32;

    // Resource creation and deletion.
    fn create_texture(&mut self) -> Texture;
    fn delete_texture(&mut self, texture: Texture);
    fn create_framebuffer(&mut self) -> Framebuffer;
    fn delete_framebuffer(&mut self, framebuffer: Framebuffer);
    fn create_renderbuffer(&mut self) -> Renderbuffer;
    fn delete_renderbuffer(&mut self, renderbuffer: Renderbuffer);
    fn create_buffer(&mut self) -> Buffer;
    fn delete_buffer(&mut self, buffer: Buffer);
    fn create_vertex_array(&mut self) -> VertexArray;
    fn delete_vertex_array(&mut self, array: VertexArray);
    fn create_shader(&mut self, kind: u32) -> Shader;
    fn delete_shader(&mut self, shader: Shader);
    fn create_program(&mut self) -> Program;
    fn delete_program(&mut self, program: Program);
    fn is_program(&mut self, program: Program) -> bool;

    // Binding and fixed-function state.
    fn bind_texture(&mut self, target: u32, texture: Texture);
    fn bind_framebuffer(&mut self, target: u32, framebuffer: Framebuffer);
    fn bind_renderbuffer(&mut self, target: u32, renderbuffer: Renderbuffer);
    fn bind_buffer(&mut self, target: u32, buffer: Buffer);
    fn bind_vertex_array(&mut self, array: VertexArray);
    fn active_texture(&mut self, unit: u32);
    fn use_program(&mut self, program: Program);
    fn enable(&mut self, cap: u32);
    fn disable(&mut self, cap: u32);
    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32);
    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool);
    fn stencil_func(&mut self, func: u32, reference: i32, mask: u32);
    fn stencil_op(&mut self, stencil_fail: u32, depth_fail: u32, pass: u32);
    fn stencil_op_separate(&mut self, face: u32, stencil_fail: u32, depth_fail: u32, pass: u32);
    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32);
    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32);
    fn pixel_storei(&mut self, pname: u32, param: i32);

    // Shaders and programs.
    fn shader_source(&mut self, shader: Shader, source: &str);
    fn compile_shader(&mut self, shader: Shader);
    fn get_shaderi(&mut self, shader: Shader, pname: u32) -> i32;
    fn get_shader_info_log(&mut self, shader: Shader) -> String;
    fn attach_shader(&mut self, program: Program, shader: Shader);
    fn detach_shader(&mut self, program: Program, shader: Shader);
    fn bind_attrib_location(&mut self, program: Program, index: u32, name: &str);
    fn link_program(&mut self, program: Program);
    fn get_programi(&mut self, program: Program, pname: u32) -> i32;
    fn get_program_info_log(&mut self, program: Program) -> String;
    fn get_uniform_location(&mut self, program: Program, name: &str) -> UniformLocation;

    // Uniform uploads for the current program.
    fn uniform_1i(&mut self, location: UniformLocation, value: i32);
    fn uniform_1f(&mut self, location: UniformLocation, value: f32);
    fn uniform_1fv(&mut self, location: UniformLocation, values: &[f32]);
    fn uniform_2fv(&mut self, location: UniformLocation, values: &[f32]);
    fn uniform_3fv(&mut self, location: UniformLocation, values: &[f32]);
    fn uniform_4fv(&mut self, location: UniformLocation, values: &[f32]);
    fn uniform_1iv(&mut self, location: UniformLocation, values: &[i32]);
    fn uniform_2iv(&mut self, location: UniformLocation, values: &[i32]);
    fn uniform_3iv(&mut self, location: UniformLocation, values: &[i32]);
    fn uniform_4iv(&mut self, location: UniformLocation, values: &[i32]);
    fn uniform_matrix_2fv(&mut self, location: UniformLocation, values: &[f32]);
    fn uniform_matrix_3fv(&mut self, location: UniformLocation, values: &[f32]);
    fn uniform_matrix_4fv(&mut self, location: UniformLocation, values: &[f32]);

    // Texture I/O.
    fn tex_image_2d(
        &mut self,
        target: u32,
        level: i32,
        internal_format: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: Option<&[u8]>,
    );
    fn tex_sub_image_2d(
        &mut self,
        target: u32,
        level: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
        pixels: &[u8],
    );
    fn tex_parameteri(&mut self, target: u32, pname: u32, param: i32);
    fn read_pixels(
        &mut self,
        dst: &mut [u8],
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    );

    // Buffer I/O.
    fn buffer_init(&mut self, target: u32, size: usize, usage: u32);
    fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]);

    // Vertex attributes.
    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        ty: u32,
        normalized: bool,
        stride: i32,
        offset: usize,
    );
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn disable_vertex_attrib_array(&mut self, index: u32);

    // Drawing.
    fn draw_elements(&mut self, mode: u32, count: i32, ty: u32, offset: usize);
    fn clear(&mut self, mask: u32);
    fn flush(&mut self);

    // Framebuffer assembly.
    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Texture,
        level: i32,
    );
    fn framebuffer_renderbuffer(
        &mut self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Renderbuffer,
    );
    fn renderbuffer_storage(&mut self, target: u32, internal_format: u32, width: i32, height: i32);
    fn check_framebuffer_status(&mut self, target: u32) -> u32;
}

/// Convert a `u32` dimension to the `i32` GL expects, saturating at
/// `i32::MAX`.
pub(crate) fn gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
