//! A [`Context`] decorator that checks `glGetError` after every call.

use log::{error, trace};

use crate::context::{
    Api, Buffer, Context, Framebuffer, Program, Renderbuffer, Shader, Texture, UniformLocation,
    VertexArray,
};
use crate::error::{Error, Result};

/// Wraps another context, tracing every call and querying `glGetError` after
/// each one.
///
/// The first error seen is kept until [`Context::take_error`] picks it up;
/// later ones are logged only. Enable it through
/// [`Config::debug`](crate::Config::debug).
#[derive(Debug)]
pub struct DebugContext<C> {
    inner: C,
    error: Option<Error>,
}

impl<C: Context> DebugContext<C> {
    /// Decorates `inner`.
    #[must_use]
    pub fn new(inner: C) -> Self {
        Self { inner, error: None }
    }

    /// The wrapped context.
    #[must_use]
    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    /// The wrapped context, mutably.
    pub fn get_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwraps the decorator, dropping any pending error.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.inner
    }

    fn check(&mut self, call: &'static str) {
        let code = self.inner.get_error();
        if code == glow::NO_ERROR {
            return;
        }
        error!("GL error 0x{code:04x} after {call}");
        if self.error.is_none() {
            self.error = Some(Error::Gl { call, code });
        }
    }
}

/// Forwards calls without a return value.
macro_rules! checked {
    ($(fn $name:ident(&mut self $(, $arg:ident: $ty:ty)*);)*) => {
        $(
            fn $name(&mut self $(, $arg: $ty)*) {
                trace!("gl {}", stringify!($name));
                self.inner.$name($($arg),*);
                self.check(stringify!($name));
            }
        )*
    };
}

/// Forwards calls that return a value.
macro_rules! checked_value {
    ($(fn $name:ident(&mut self $(, $arg:ident: $ty:ty)*) -> $ret:ty;)*) => {
        $(
            fn $name(&mut self $(, $arg: $ty)*) -> $ret {
                trace!("gl {}", stringify!($name));
                let value = self.inner.$name($($arg),*);
                self.check(stringify!($name));
                value
            }
        )*
    };
}

impl<C: Context> Context for DebugContext<C> {
    fn api(&self) -> Api {
        self.inner.api()
    }

    fn is_es(&self) -> bool {
        self.inner.is_es()
    }

    fn load_functions(&mut self) -> Result<()> {
        self.inner.load_functions()
    }

    fn take_error(&mut self) -> Option<Error> {
        self.error.take().or_else(|| self.inner.take_error())
    }

    fn get_error(&mut self) -> u32 {
        self.inner.get_error()
    }

    checked_value! {
        fn get_integer(&mut self, pname: u32) -> i32;
        fn create_texture(&mut self) -> Texture;
        fn create_framebuffer(&mut self) -> Framebuffer;
        fn create_renderbuffer(&mut self) -> Renderbuffer;
        fn create_buffer(&mut self) -> Buffer;
        fn create_vertex_array(&mut self) -> VertexArray;
        fn create_shader(&mut self, kind: u32) -> Shader;
        fn create_program(&mut self) -> Program;
        fn is_program(&mut self, program: Program) -> bool;
        fn get_shaderi(&mut self, shader: Shader, pname: u32) -> i32;
        fn get_shader_info_log(&mut self, shader: Shader) -> String;
        fn get_programi(&mut self, program: Program, pname: u32) -> i32;
        fn get_program_info_log(&mut self, program: Program) -> String;
        fn get_uniform_location(&mut self, program: Program, name: &str) -> UniformLocation;
        fn check_framebuffer_status(&mut self, target: u32) -> u32;
    }

    checked! {
        fn delete_texture(&mut self, texture: Texture);
        fn delete_framebuffer(&mut self, framebuffer: Framebuffer);
        fn delete_renderbuffer(&mut self, renderbuffer: Renderbuffer);
        fn delete_buffer(&mut self, buffer: Buffer);
        fn delete_vertex_array(&mut self, array: VertexArray);
        fn delete_shader(&mut self, shader: Shader);
        fn delete_program(&mut self, program: Program);

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

        fn shader_source(&mut self, shader: Shader, source: &str);
        fn compile_shader(&mut self, shader: Shader);
        fn attach_shader(&mut self, program: Program, shader: Shader);
        fn detach_shader(&mut self, program: Program, shader: Shader);
        fn bind_attrib_location(&mut self, program: Program, index: u32, name: &str);
        fn link_program(&mut self, program: Program);

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

        fn tex_image_2d(
            &mut self,
            target: u32,
            level: i32,
            internal_format: i32,
            width: i32,
            height: i32,
            format: u32,
            ty: u32,
            pixels: Option<&[u8]>
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
            pixels: &[u8]
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
            ty: u32
        );

        fn buffer_init(&mut self, target: u32, size: usize, usage: u32);
        fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]);
        fn vertex_attrib_pointer(
            &mut self,
            index: u32,
            size: i32,
            ty: u32,
            normalized: bool,
            stride: i32,
            offset: usize
        );
        fn enable_vertex_attrib_array(&mut self, index: u32);
        fn disable_vertex_attrib_array(&mut self, index: u32);

        fn draw_elements(&mut self, mode: u32, count: i32, ty: u32, offset: usize);
        fn clear(&mut self, mask: u32);
        fn flush(&mut self);

        fn framebuffer_texture_2d(
            &mut self,
            target: u32,
            attachment: u32,
            texture_target: u32,
            texture: Texture,
            level: i32
        );
        fn framebuffer_renderbuffer(
            &mut self,
            target: u32,
            attachment: u32,
            renderbuffer_target: u32,
            renderbuffer: Renderbuffer
        );
        fn renderbuffer_storage(&mut self, target: u32, internal_format: u32, width: i32, height: i32);
    }
}
