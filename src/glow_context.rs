//! [`Context`] over any [`glow::HasContext`].
//!
//! The same type serves desktop GL and GLES (a `glow::Context` built from the
//! platform loader) and WebGL (a `glow::Context` built from a
//! `WebGlRenderingContext` or `WebGl2RenderingContext`). glow's object types
//! are opaque, so every object is registered in a per-kind table and handed
//! out as a small integer.

use std::collections::HashMap;

use glow::{HasContext, PixelPackData, PixelUnpackData};
use log::{debug, warn};

use crate::context::{
    Api, Buffer, Context, Framebuffer, Program, Renderbuffer, Shader, Texture, UniformLocation,
    VertexArray,
};
use crate::error::{Error, Result};

/// Entry points every dialect needs. Probed by
/// [`GlowContext::from_loader_function`].
#[cfg(not(target_arch = "wasm32"))]
const REQUIRED_SYMBOLS: &[&str] = &[
    "glActiveTexture",
    "glAttachShader",
    "glBindAttribLocation",
    "glBindBuffer",
    "glBindFramebuffer",
    "glBindRenderbuffer",
    "glBindTexture",
    "glBlendEquationSeparate",
    "glBlendFuncSeparate",
    "glBufferData",
    "glBufferSubData",
    "glCheckFramebufferStatus",
    "glClear",
    "glColorMask",
    "glCompileShader",
    "glCreateProgram",
    "glCreateShader",
    "glDeleteBuffers",
    "glDeleteFramebuffers",
    "glDeleteProgram",
    "glDeleteRenderbuffers",
    "glDeleteShader",
    "glDeleteTextures",
    "glDetachShader",
    "glDisable",
    "glDrawElements",
    "glEnable",
    "glEnableVertexAttribArray",
    "glFlush",
    "glFramebufferRenderbuffer",
    "glFramebufferTexture2D",
    "glGenBuffers",
    "glGenFramebuffers",
    "glGenRenderbuffers",
    "glGenTextures",
    "glGetError",
    "glGetIntegerv",
    "glGetProgramInfoLog",
    "glGetProgramiv",
    "glGetShaderInfoLog",
    "glGetShaderiv",
    "glGetUniformLocation",
    "glLinkProgram",
    "glPixelStorei",
    "glReadPixels",
    "glRenderbufferStorage",
    "glScissor",
    "glShaderSource",
    "glStencilFunc",
    "glStencilOp",
    "glStencilOpSeparate",
    "glTexImage2D",
    "glTexParameteri",
    "glTexSubImage2D",
    "glUniform1f",
    "glUniform1i",
    "glUniform2fv",
    "glUniform4fv",
    "glUniformMatrix4fv",
    "glUseProgram",
    "glVertexAttribPointer",
    "glViewport",
];

/// Maps integer handles to glow objects. Handle `0` is never issued.
#[derive(Debug)]
struct HandleTable<T> {
    objects: HashMap<u32, T>,
    next: u32,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self {
            objects: HashMap::new(),
            next: 1,
        }
    }
}

impl<T: Copy + PartialEq> HandleTable<T> {
    fn insert(&mut self, object: T) -> u32 {
        let handle = self.next;
        self.next = self.next.checked_add(1).unwrap_or(1);
        self.objects.insert(handle, object);
        handle
    }

    fn get(&self, handle: u32) -> Option<T> {
        self.objects.get(&handle).copied()
    }

    fn remove(&mut self, handle: u32) -> Option<T> {
        self.objects.remove(&handle)
    }

    /// The handle already issued for `object`, or a new one.
    fn handle_of(&mut self, object: T) -> u32 {
        let existing = self
            .objects
            .iter()
            .find(|(_, o)| **o == object)
            .map(|(handle, _)| *handle);
        existing.unwrap_or_else(|| self.insert(object))
    }

    /// Registers the result of a `glCreate*` call; failures map to `0`.
    fn register(&mut self, created: std::result::Result<T, String>, what: &str) -> u32 {
        match created {
            Ok(object) => self.insert(object),
            Err(err) => {
                warn!("creating {what} failed: {err}");
                0
            }
        }
    }
}

/// Uniform locations of one program, one entry per name.
#[derive(Debug)]
struct LocationList<T> {
    entries: Vec<(String, T)>,
}

impl<T> Default for LocationList<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> LocationList<T> {
    fn index_of(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn push(&mut self, name: &str, location: T) -> usize {
        self.entries.push((name.to_owned(), location));
        self.entries.len() - 1
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, location)| location)
    }
}

fn gl_offset(offset: usize) -> i32 {
    i32::try_from(offset).unwrap_or(i32::MAX)
}

/// A [`Context`] backed by glow.
///
/// Every method issues GL calls on the wrapped context, which is why
/// construction is `unsafe`.
pub struct GlowContext<G: HasContext> {
    gl: G,
    api: Api,
    missing_symbol: Option<String>,

    textures: HandleTable<G::Texture>,
    framebuffers: HandleTable<G::Framebuffer>,
    renderbuffers: HandleTable<G::Renderbuffer>,
    buffers: HandleTable<G::Buffer>,
    vertex_arrays: HandleTable<G::VertexArray>,
    shaders: HandleTable<G::Shader>,
    programs: HandleTable<G::Program>,
    /// Locations handed out per program; a [`UniformLocation`] indexes the
    /// list of the program in use.
    uniform_locations: HashMap<u32, LocationList<G::UniformLocation>>,
    current_program: u32,
}

impl<G: HasContext> GlowContext<G> {
    /// Wraps `gl`, which speaks the `api` dialect.
    ///
    /// # Safety
    ///
    /// `gl` must stay a valid context, current on the calling thread, for as
    /// long as this value issues calls.
    pub unsafe fn new(gl: G, api: Api) -> Self {
        Self {
            gl,
            api,
            missing_symbol: None,
            textures: HandleTable::default(),
            framebuffers: HandleTable::default(),
            renderbuffers: HandleTable::default(),
            buffers: HandleTable::default(),
            vertex_arrays: HandleTable::default(),
            shaders: HandleTable::default(),
            programs: HandleTable::default(),
            uniform_locations: HashMap::new(),
            current_program: 0,
        }
    }

    /// The wrapped glow context.
    #[must_use]
    pub fn gl(&self) -> &G {
        &self.gl
    }

    fn uniform_location(&self, location: UniformLocation) -> Option<&G::UniformLocation> {
        let index = usize::try_from(location.0).ok()?;
        self.uniform_locations
            .get(&self.current_program)?
            .get(index)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl GlowContext<glow::Context> {
    /// Loads desktop GL or GLES entry points through `loader`.
    ///
    /// A required entry point the loader cannot resolve is reported by the
    /// first [`Graphics::reset`](crate::Graphics::reset) as
    /// [`Error::LoaderMissingSymbol`].
    ///
    /// # Safety
    ///
    /// Same as [`GlowContext::new`]; `loader` must return entry points of the
    /// current context.
    pub unsafe fn from_loader_function<F>(api: Api, mut loader: F) -> Self
    where
        F: FnMut(&str) -> *const std::ffi::c_void,
    {
        let missing = REQUIRED_SYMBOLS
            .iter()
            .find(|symbol| loader(symbol).is_null())
            .map(|symbol| (*symbol).to_owned());
        let gl = unsafe { glow::Context::from_loader_function(loader) };
        let mut ctx = unsafe { Self::new(gl, api) };
        ctx.missing_symbol = missing;
        ctx
    }
}

// SAFETY (all blocks below): `new` requires the context to be current on
// this thread, and every object passed to glow comes from our own tables.
impl<G: HasContext> Context for GlowContext<G> {
    fn api(&self) -> Api {
        self.api
    }

    fn load_functions(&mut self) -> Result<()> {
        if let Some(symbol) = self.missing_symbol.take() {
            return Err(Error::LoaderMissingSymbol(symbol));
        }
        let version = self.gl.version();
        debug!(
            "GL {}.{} ({}) for {:?}",
            version.major,
            version.minor,
            if version.is_embedded { "ES" } else { "desktop" },
            self.api
        );
        Ok(())
    }

    fn get_error(&mut self) -> u32 {
        unsafe { self.gl.get_error() }
    }

    fn get_integer(&mut self, pname: u32) -> i32 {
        if pname == glow::FRAMEBUFFER_BINDING {
            // The screen framebuffer is a real object on some platforms.
            return match unsafe { self.gl.get_parameter_framebuffer(pname) } {
                Some(framebuffer) => {
                    i32::try_from(self.framebuffers.handle_of(framebuffer)).unwrap_or(0)
                }
                None => 0,
            };
        }
        unsafe { self.gl.get_parameter_i32(pname) }
    }

    fn create_texture(&mut self) -> Texture {
        let created = unsafe { self.gl.create_texture() };
        Texture(self.textures.register(created, "texture"))
    }

    fn delete_texture(&mut self, texture: Texture) {
        if let Some(texture) = self.textures.remove(texture.0) {
            unsafe { self.gl.delete_texture(texture) };
        }
    }

    fn create_framebuffer(&mut self) -> Framebuffer {
        let created = unsafe { self.gl.create_framebuffer() };
        Framebuffer(self.framebuffers.register(created, "framebuffer"))
    }

    fn delete_framebuffer(&mut self, framebuffer: Framebuffer) {
        if let Some(framebuffer) = self.framebuffers.remove(framebuffer.0) {
            unsafe { self.gl.delete_framebuffer(framebuffer) };
        }
    }

    fn create_renderbuffer(&mut self) -> Renderbuffer {
        let created = unsafe { self.gl.create_renderbuffer() };
        Renderbuffer(self.renderbuffers.register(created, "renderbuffer"))
    }

    fn delete_renderbuffer(&mut self, renderbuffer: Renderbuffer) {
        if let Some(renderbuffer) = self.renderbuffers.remove(renderbuffer.0) {
            unsafe { self.gl.delete_renderbuffer(renderbuffer) };
        }
    }

    fn create_buffer(&mut self) -> Buffer {
        let created = unsafe { self.gl.create_buffer() };
        Buffer(self.buffers.register(created, "buffer"))
    }

    fn delete_buffer(&mut self, buffer: Buffer) {
        if let Some(buffer) = self.buffers.remove(buffer.0) {
            unsafe { self.gl.delete_buffer(buffer) };
        }
    }

    fn create_vertex_array(&mut self) -> VertexArray {
        let created = unsafe { self.gl.create_vertex_array() };
        VertexArray(self.vertex_arrays.register(created, "vertex array"))
    }

    fn delete_vertex_array(&mut self, array: VertexArray) {
        if let Some(array) = self.vertex_arrays.remove(array.0) {
            unsafe { self.gl.delete_vertex_array(array) };
        }
    }

    fn create_shader(&mut self, kind: u32) -> Shader {
        let created = unsafe { self.gl.create_shader(kind) };
        Shader(self.shaders.register(created, "shader"))
    }

    fn delete_shader(&mut self, shader: Shader) {
        if let Some(shader) = self.shaders.remove(shader.0) {
            unsafe { self.gl.delete_shader(shader) };
        }
    }

    fn create_program(&mut self) -> Program {
        let created = unsafe { self.gl.create_program() };
        Program(self.programs.register(created, "program"))
    }

    fn delete_program(&mut self, program: Program) {
        self.uniform_locations.remove(&program.0);
        if let Some(native) = self.programs.remove(program.0) {
            unsafe { self.gl.delete_program(native) };
        }
    }

    fn is_program(&mut self, program: Program) -> bool {
        self.programs
            .get(program.0)
            .is_some_and(|native| unsafe { self.gl.is_program(native) })
    }

    fn bind_texture(&mut self, target: u32, texture: Texture) {
        let texture = self.textures.get(texture.0);
        unsafe { self.gl.bind_texture(target, texture) };
    }

    fn bind_framebuffer(&mut self, target: u32, framebuffer: Framebuffer) {
        let framebuffer = self.framebuffers.get(framebuffer.0);
        unsafe { self.gl.bind_framebuffer(target, framebuffer) };
    }

    fn bind_renderbuffer(&mut self, target: u32, renderbuffer: Renderbuffer) {
        let renderbuffer = self.renderbuffers.get(renderbuffer.0);
        unsafe { self.gl.bind_renderbuffer(target, renderbuffer) };
    }

    fn bind_buffer(&mut self, target: u32, buffer: Buffer) {
        let buffer = self.buffers.get(buffer.0);
        unsafe { self.gl.bind_buffer(target, buffer) };
    }

    fn bind_vertex_array(&mut self, array: VertexArray) {
        let array = self.vertex_arrays.get(array.0);
        unsafe { self.gl.bind_vertex_array(array) };
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(unit) };
    }

    fn use_program(&mut self, program: Program) {
        self.current_program = program.0;
        let program = self.programs.get(program.0);
        unsafe { self.gl.use_program(program) };
    }

    fn enable(&mut self, cap: u32) {
        unsafe { self.gl.enable(cap) };
    }

    fn disable(&mut self, cap: u32) {
        unsafe { self.gl.disable(cap) };
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.scissor(x, y, width, height) };
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) };
    }

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        unsafe { self.gl.color_mask(red, green, blue, alpha) };
    }

    fn stencil_func(&mut self, func: u32, reference: i32, mask: u32) {
        unsafe { self.gl.stencil_func(func, reference, mask) };
    }

    fn stencil_op(&mut self, stencil_fail: u32, depth_fail: u32, pass: u32) {
        unsafe { self.gl.stencil_op(stencil_fail, depth_fail, pass) };
    }

    fn stencil_op_separate(&mut self, face: u32, stencil_fail: u32, depth_fail: u32, pass: u32) {
        unsafe {
            self.gl
                .stencil_op_separate(face, stencil_fail, depth_fail, pass);
        }
    }

    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32) {
        unsafe { self.gl.blend_equation_separate(mode_rgb, mode_alpha) };
    }

    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        unsafe {
            self.gl
                .blend_func_separate(src_rgb, dst_rgb, src_alpha, dst_alpha);
        }
    }

    fn pixel_storei(&mut self, pname: u32, param: i32) {
        unsafe { self.gl.pixel_store_i32(pname, param) };
    }

    fn shader_source(&mut self, shader: Shader, source: &str) {
        if let Some(shader) = self.shaders.get(shader.0) {
            unsafe { self.gl.shader_source(shader, source) };
        }
    }

    fn compile_shader(&mut self, shader: Shader) {
        if let Some(shader) = self.shaders.get(shader.0) {
            unsafe { self.gl.compile_shader(shader) };
        }
    }

    fn get_shaderi(&mut self, shader: Shader, pname: u32) -> i32 {
        match (self.shaders.get(shader.0), pname) {
            (Some(shader), glow::COMPILE_STATUS) => {
                i32::from(unsafe { self.gl.get_shader_compile_status(shader) })
            }
            _ => 0,
        }
    }

    fn get_shader_info_log(&mut self, shader: Shader) -> String {
        self.shaders
            .get(shader.0)
            .map_or_else(String::new, |shader| unsafe {
                self.gl.get_shader_info_log(shader)
            })
    }

    fn attach_shader(&mut self, program: Program, shader: Shader) {
        if let (Some(program), Some(shader)) = (self.programs.get(program.0), self.shaders.get(shader.0)) {
            unsafe { self.gl.attach_shader(program, shader) };
        }
    }

    fn detach_shader(&mut self, program: Program, shader: Shader) {
        if let (Some(program), Some(shader)) = (self.programs.get(program.0), self.shaders.get(shader.0)) {
            unsafe { self.gl.detach_shader(program, shader) };
        }
    }

    fn bind_attrib_location(&mut self, program: Program, index: u32, name: &str) {
        if let Some(program) = self.programs.get(program.0) {
            unsafe { self.gl.bind_attrib_location(program, index, name) };
        }
    }

    fn link_program(&mut self, program: Program) {
        if let Some(program) = self.programs.get(program.0) {
            unsafe { self.gl.link_program(program) };
        }
    }

    fn get_programi(&mut self, program: Program, pname: u32) -> i32 {
        match (self.programs.get(program.0), pname) {
            (Some(program), glow::LINK_STATUS) => {
                i32::from(unsafe { self.gl.get_program_link_status(program) })
            }
            _ => 0,
        }
    }

    fn get_program_info_log(&mut self, program: Program) -> String {
        self.programs
            .get(program.0)
            .map_or_else(String::new, |program| unsafe {
                self.gl.get_program_info_log(program)
            })
    }

    fn get_uniform_location(&mut self, program: Program, name: &str) -> UniformLocation {
        let Some(native) = self.programs.get(program.0) else {
            return UniformLocation::INVALID;
        };
        let locations = self.uniform_locations.entry(program.0).or_default();
        let index = match locations.index_of(name) {
            Some(index) => index,
            None => {
                let Some(location) = (unsafe { self.gl.get_uniform_location(native, name) })
                else {
                    return UniformLocation::INVALID;
                };
                locations.push(name, location)
            }
        };
        i32::try_from(index).map_or(UniformLocation::INVALID, UniformLocation)
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        unsafe { self.gl.uniform_1_i32(self.uniform_location(location), value) };
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(self.uniform_location(location), value) };
    }

    fn uniform_1fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_1_f32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_2fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_2_f32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_3fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_3_f32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_4fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_4_f32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_1iv(&mut self, location: UniformLocation, values: &[i32]) {
        unsafe {
            self.gl
                .uniform_1_i32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_2iv(&mut self, location: UniformLocation, values: &[i32]) {
        unsafe {
            self.gl
                .uniform_2_i32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_3iv(&mut self, location: UniformLocation, values: &[i32]) {
        unsafe {
            self.gl
                .uniform_3_i32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_4iv(&mut self, location: UniformLocation, values: &[i32]) {
        unsafe {
            self.gl
                .uniform_4_i32_slice(self.uniform_location(location), values);
        }
    }

    fn uniform_matrix_2fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_matrix_2_f32_slice(self.uniform_location(location), false, values);
        }
    }

    fn uniform_matrix_3fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_matrix_3_f32_slice(self.uniform_location(location), false, values);
        }
    }

    fn uniform_matrix_4fv(&mut self, location: UniformLocation, values: &[f32]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(self.uniform_location(location), false, values);
        }
    }

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
    ) {
        unsafe {
            self.gl.tex_image_2d(
                target,
                level,
                internal_format,
                width,
                height,
                0,
                format,
                ty,
                PixelUnpackData::Slice(pixels),
            );
        }
    }

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
    ) {
        unsafe {
            self.gl.tex_sub_image_2d(
                target,
                level,
                x,
                y,
                width,
                height,
                format,
                ty,
                PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn tex_parameteri(&mut self, target: u32, pname: u32, param: i32) {
        unsafe { self.gl.tex_parameter_i32(target, pname, param) };
    }

    fn read_pixels(
        &mut self,
        dst: &mut [u8],
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: u32,
        ty: u32,
    ) {
        unsafe {
            self.gl.read_pixels(
                x,
                y,
                width,
                height,
                format,
                ty,
                PixelPackData::Slice(Some(dst)),
            );
        }
    }

    fn buffer_init(&mut self, target: u32, size: usize, usage: u32) {
        unsafe { self.gl.buffer_data_size(target, gl_offset(size), usage) };
    }

    fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_sub_data_u8_slice(target, gl_offset(offset), data);
        }
    }

    fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        ty: u32,
        normalized: bool,
        stride: i32,
        offset: usize,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, ty, normalized, stride, gl_offset(offset));
        }
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.disable_vertex_attrib_array(index) };
    }

    fn draw_elements(&mut self, mode: u32, count: i32, ty: u32, offset: usize) {
        unsafe { self.gl.draw_elements(mode, count, ty, gl_offset(offset)) };
    }

    fn clear(&mut self, mask: u32) {
        unsafe { self.gl.clear(mask) };
    }

    fn flush(&mut self) {
        unsafe { self.gl.flush() };
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Texture,
        level: i32,
    ) {
        let texture = self.textures.get(texture.0);
        unsafe {
            self.gl
                .framebuffer_texture_2d(target, attachment, texture_target, texture, level);
        }
    }

    fn framebuffer_renderbuffer(
        &mut self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Renderbuffer,
    ) {
        let renderbuffer = self.renderbuffers.get(renderbuffer.0);
        unsafe {
            self.gl
                .framebuffer_renderbuffer(target, attachment, renderbuffer_target, renderbuffer);
        }
    }

    fn renderbuffer_storage(&mut self, target: u32, internal_format: u32, width: i32, height: i32) {
        unsafe {
            self.gl
                .renderbuffer_storage(target, internal_format, width, height);
        }
    }

    fn check_framebuffer_status(&mut self, target: u32) -> u32 {
        unsafe { self.gl.check_framebuffer_status(target) }
    }
}
