//! A software [`Context`] that records every call, for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::context::{
    Api, Buffer, Context, Framebuffer, Program, Renderbuffer, Shader, Texture, UniformLocation,
    VertexArray,
};

/// One recorded GL call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub name: &'static str,
    /// Numeric arguments in call order; handles by value, bools as 0/1.
    pub args: Vec<i64>,
    /// The string argument, if the call has one.
    pub text: Option<String>,
    /// Float arguments of `uniform*f*` calls.
    pub floats: Vec<f32>,
}

/// Shared view of the calls a [`RecordingContext`] has seen.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.borrow().iter().map(|c| c.name).collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.borrow().iter().filter(|c| c.name == name).count()
    }

    /// Number of `uniform*` calls of any shape.
    pub fn uniform_uploads(&self) -> usize {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.name.starts_with("uniform"))
            .count()
    }

    pub fn args_of(&self, name: &str) -> Vec<Vec<i64>> {
        self.0
            .borrow()
            .iter()
            .filter(|c| c.name == name)
            .map(|c| c.args.clone())
            .collect()
    }

    /// The floats last uploaded for the uniform `name`, resolved through the
    /// location its most recent lookup returned.
    pub fn uniform_value(&self, name: &str) -> Option<Vec<f32>> {
        let calls = self.0.borrow();
        let (lookup, location) = calls.iter().enumerate().rev().find_map(|(i, c)| {
            (c.name == "get_uniform_location" && c.text.as_deref() == Some(name))
                .then(|| (i, c.args[1]))
        })?;
        calls[lookup..]
            .iter()
            .rev()
            .find(|c| c.name.starts_with("uniform") && c.args.first() == Some(&location))
            .map(|c| c.floats.clone())
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn push(&self, name: &'static str, args: Vec<i64>, text: Option<String>) {
        self.push_floats(name, args, text, Vec::new());
    }

    fn push_floats(&self, name: &'static str, args: Vec<i64>, text: Option<String>, floats: Vec<f32>) {
        self.0.borrow_mut().push(Call {
            name,
            args,
            text,
            floats,
        });
    }
}

/// Knobs of a [`RecordingContext`] that stay reachable after the context
/// moved into a [`Graphics`](crate::Graphics).
#[derive(Debug, Clone, Default)]
pub(crate) struct Controls {
    pending_error: Rc<Cell<u32>>,
    fail_allocations: Rc<Cell<bool>>,
    fail_buffers: Rc<Cell<bool>>,
    lost: Rc<Cell<bool>>,
}

impl Controls {
    /// The next `get_error` returns `code`.
    pub fn inject_error(&self, code: u32) {
        self.pending_error.set(code);
    }

    /// Every `glGen*` / `glCreate*` returns 0.
    pub fn set_fail_allocations(&self, fail: bool) {
        self.fail_allocations.set(fail);
    }

    /// Only `glGenBuffers` returns 0.
    pub fn set_fail_buffers(&self, fail: bool) {
        self.fail_buffers.set(fail);
    }

    /// `is_program` reports every program as gone, like after a lost
    /// context.
    pub fn lose_context(&self) {
        self.lost.set(true);
    }
}

/// Records `make_current` and `swap_buffers` into a shared [`CallLog`].
#[derive(Debug)]
pub(crate) struct RecordingPresenter(pub CallLog);

impl crate::Presenter for RecordingPresenter {
    fn make_current(&mut self) -> crate::Result<()> {
        self.0.push("make_current", Vec::new(), None);
        Ok(())
    }

    fn swap_buffers(&mut self) -> crate::Result<()> {
        self.0.push("swap_buffers", Vec::new(), None);
        Ok(())
    }
}

#[derive(Debug)]
struct TextureStorage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

#[derive(Debug)]
struct ShaderObject {
    source: String,
    compiled: bool,
}

/// Records calls, allocates sequential handles and keeps texture storage so
/// that pixel uploads can be read back through framebuffers.
#[derive(Debug)]
pub(crate) struct RecordingContext {
    api: Api,
    log: CallLog,
    next_handle: u32,
    screen_framebuffer: u32,
    max_texture_size: i32,
    framebuffer_status: u32,
    controls: Controls,
    missing_uniforms: HashSet<String>,

    textures: HashMap<u32, TextureStorage>,
    bound_textures: HashMap<u32, u32>,
    active_unit: u32,
    bound_framebuffer: u32,
    attachments: HashMap<u32, u32>,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, Vec<u32>>,
    linked: HashMap<u32, bool>,
    locations: HashMap<u32, HashMap<String, i32>>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::with_api(Api::OpenGl)
    }

    pub fn with_api(api: Api) -> Self {
        Self {
            api,
            log: CallLog::default(),
            next_handle: 1,
            screen_framebuffer: 0,
            max_texture_size: 4096,
            framebuffer_status: glow::FRAMEBUFFER_COMPLETE,
            controls: Controls::default(),
            missing_uniforms: HashSet::new(),
            textures: HashMap::new(),
            bound_textures: HashMap::new(),
            active_unit: glow::TEXTURE0,
            bound_framebuffer: 0,
            attachments: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            linked: HashMap::new(),
            locations: HashMap::new(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// Makes `FRAMEBUFFER_BINDING` report `handle`, like iOS does.
    pub fn set_screen_framebuffer(&mut self, handle: u32) {
        self.screen_framebuffer = handle;
        self.bound_framebuffer = handle;
        if self.next_handle <= handle {
            self.next_handle = handle + 1;
        }
    }

    pub fn set_max_texture_size(&mut self, size: i32) {
        self.max_texture_size = size;
    }

    pub fn set_framebuffer_status(&mut self, status: u32) {
        self.framebuffer_status = status;
    }

    pub fn set_fail_allocations(&mut self, fail: bool) {
        self.controls.set_fail_allocations(fail);
    }

    /// The next `get_error` returns `code`.
    pub fn inject_error(&mut self, code: u32) {
        self.controls.inject_error(code);
    }

    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    /// `get_uniform_location` reports `name` as inactive.
    pub fn set_missing_uniform(&mut self, name: &str) {
        self.missing_uniforms.insert(name.to_owned());
    }

    fn record(&self, name: &'static str, args: &[i64]) {
        self.log.push(name, args.to_vec(), None);
    }

    fn record_text(&self, name: &'static str, args: &[i64], text: &str) {
        self.log.push(name, args.to_vec(), Some(text.to_owned()));
    }

    fn record_floats(&self, name: &'static str, location: UniformLocation, values: &[f32]) {
        self.log.push_floats(
            name,
            vec![location.0.into(), values.len() as i64],
            None,
            values.to_vec(),
        );
    }

    fn allocate(&mut self) -> u32 {
        if self.controls.fail_allocations.get() {
            return 0;
        }
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    fn bound_texture(&self) -> u32 {
        self.bound_textures
            .get(&self.active_unit)
            .copied()
            .unwrap_or(0)
    }
}

fn dim(value: i32) -> usize {
    usize::try_from(value).unwrap_or(0)
}

impl Context for RecordingContext {
    fn api(&self) -> Api {
        self.api
    }

    fn load_functions(&mut self) -> crate::Result<()> {
        self.record("load_functions", &[]);
        Ok(())
    }

    fn get_error(&mut self) -> u32 {
        self.controls.pending_error.replace(glow::NO_ERROR)
    }

    fn get_integer(&mut self, pname: u32) -> i32 {
        self.record("get_integer", &[pname.into()]);
        match pname {
            glow::FRAMEBUFFER_BINDING => i32::try_from(self.screen_framebuffer).unwrap_or(0),
            glow::MAX_TEXTURE_SIZE => self.max_texture_size,
            _ => 0,
        }
    }

    fn create_texture(&mut self) -> Texture {
        let handle = self.allocate();
        self.record("create_texture", &[handle.into()]);
        Texture(handle)
    }

    fn delete_texture(&mut self, texture: Texture) {
        self.record("delete_texture", &[texture.0.into()]);
        self.textures.remove(&texture.0);
    }

    fn create_framebuffer(&mut self) -> Framebuffer {
        let handle = self.allocate();
        self.record("create_framebuffer", &[handle.into()]);
        Framebuffer(handle)
    }

    fn delete_framebuffer(&mut self, framebuffer: Framebuffer) {
        self.record("delete_framebuffer", &[framebuffer.0.into()]);
        self.attachments.remove(&framebuffer.0);
    }

    fn create_renderbuffer(&mut self) -> Renderbuffer {
        let handle = self.allocate();
        self.record("create_renderbuffer", &[handle.into()]);
        Renderbuffer(handle)
    }

    fn delete_renderbuffer(&mut self, renderbuffer: Renderbuffer) {
        self.record("delete_renderbuffer", &[renderbuffer.0.into()]);
    }

    fn create_buffer(&mut self) -> Buffer {
        let handle = if self.controls.fail_buffers.get() {
            0
        } else {
            self.allocate()
        };
        self.record("create_buffer", &[handle.into()]);
        Buffer(handle)
    }

    fn delete_buffer(&mut self, buffer: Buffer) {
        self.record("delete_buffer", &[buffer.0.into()]);
    }

    fn create_vertex_array(&mut self) -> VertexArray {
        let handle = self.allocate();
        self.record("create_vertex_array", &[handle.into()]);
        VertexArray(handle)
    }

    fn delete_vertex_array(&mut self, array: VertexArray) {
        self.record("delete_vertex_array", &[array.0.into()]);
    }

    fn create_shader(&mut self, kind: u32) -> Shader {
        let handle = self.allocate();
        self.record("create_shader", &[kind.into(), handle.into()]);
        if handle != 0 {
            self.shaders.insert(
                handle,
                ShaderObject {
                    source: String::new(),
                    compiled: false,
                },
            );
        }
        Shader(handle)
    }

    fn delete_shader(&mut self, shader: Shader) {
        self.record("delete_shader", &[shader.0.into()]);
        self.shaders.remove(&shader.0);
    }

    fn create_program(&mut self) -> Program {
        let handle = self.allocate();
        self.record("create_program", &[handle.into()]);
        if handle != 0 {
            self.programs.insert(handle, Vec::new());
        }
        Program(handle)
    }

    fn delete_program(&mut self, program: Program) {
        self.record("delete_program", &[program.0.into()]);
        self.programs.remove(&program.0);
        self.linked.remove(&program.0);
        self.locations.remove(&program.0);
    }

    fn is_program(&mut self, program: Program) -> bool {
        self.record("is_program", &[program.0.into()]);
        !self.controls.lost.get() && self.programs.contains_key(&program.0)
    }

    fn bind_texture(&mut self, target: u32, texture: Texture) {
        self.record("bind_texture", &[target.into(), texture.0.into()]);
        self.bound_textures.insert(self.active_unit, texture.0);
    }

    fn bind_framebuffer(&mut self, target: u32, framebuffer: Framebuffer) {
        self.record("bind_framebuffer", &[target.into(), framebuffer.0.into()]);
        self.bound_framebuffer = framebuffer.0;
    }

    fn bind_renderbuffer(&mut self, target: u32, renderbuffer: Renderbuffer) {
        self.record("bind_renderbuffer", &[target.into(), renderbuffer.0.into()]);
    }

    fn bind_buffer(&mut self, target: u32, buffer: Buffer) {
        self.record("bind_buffer", &[target.into(), buffer.0.into()]);
    }

    fn bind_vertex_array(&mut self, array: VertexArray) {
        self.record("bind_vertex_array", &[array.0.into()]);
    }

    fn active_texture(&mut self, unit: u32) {
        self.record("active_texture", &[unit.into()]);
        self.active_unit = unit;
    }

    fn use_program(&mut self, program: Program) {
        self.record("use_program", &[program.0.into()]);
    }

    fn enable(&mut self, cap: u32) {
        self.record("enable", &[cap.into()]);
    }

    fn disable(&mut self, cap: u32) {
        self.record("disable", &[cap.into()]);
    }

    fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record("scissor", &[x.into(), y.into(), width.into(), height.into()]);
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.record("viewport", &[x.into(), y.into(), width.into(), height.into()]);
    }

    fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.record(
            "color_mask",
            &[red.into(), green.into(), blue.into(), alpha.into()],
        );
    }

    fn stencil_func(&mut self, func: u32, reference: i32, mask: u32) {
        self.record("stencil_func", &[func.into(), reference.into(), mask.into()]);
    }

    fn stencil_op(&mut self, stencil_fail: u32, depth_fail: u32, pass: u32) {
        self.record(
            "stencil_op",
            &[stencil_fail.into(), depth_fail.into(), pass.into()],
        );
    }

    fn stencil_op_separate(&mut self, face: u32, stencil_fail: u32, depth_fail: u32, pass: u32) {
        self.record(
            "stencil_op_separate",
            &[face.into(), stencil_fail.into(), depth_fail.into(), pass.into()],
        );
    }

    fn blend_equation_separate(&mut self, mode_rgb: u32, mode_alpha: u32) {
        self.record("blend_equation_separate", &[mode_rgb.into(), mode_alpha.into()]);
    }

    fn blend_func_separate(&mut self, src_rgb: u32, dst_rgb: u32, src_alpha: u32, dst_alpha: u32) {
        self.record(
            "blend_func_separate",
            &[src_rgb.into(), dst_rgb.into(), src_alpha.into(), dst_alpha.into()],
        );
    }

    fn pixel_storei(&mut self, pname: u32, param: i32) {
        self.record("pixel_storei", &[pname.into(), param.into()]);
    }

    fn shader_source(&mut self, shader: Shader, source: &str) {
        self.record_text("shader_source", &[shader.0.into()], source);
        if let Some(object) = self.shaders.get_mut(&shader.0) {
            object.source = source.to_owned();
        }
    }

    fn compile_shader(&mut self, shader: Shader) {
        self.record("compile_shader", &[shader.0.into()]);
        if let Some(object) = self.shaders.get_mut(&shader.0) {
            object.compiled = !object.source.contains("#error");
        }
    }

    fn get_shaderi(&mut self, shader: Shader, pname: u32) -> i32 {
        self.record("get_shaderi", &[shader.0.into(), pname.into()]);
        match pname {
            glow::COMPILE_STATUS => self
                .shaders
                .get(&shader.0)
                .map_or(0, |object| i32::from(object.compiled)),
            _ => 0,
        }
    }

    fn get_shader_info_log(&mut self, shader: Shader) -> String {
        self.record("get_shader_info_log", &[shader.0.into()]);
        match self.shaders.get(&shader.0) {
            Some(object) if !object.compiled => {
                "ERROR: 0:1: '#error' : user-defined error".to_owned()
            }
            _ => String::new(),
        }
    }

    fn attach_shader(&mut self, program: Program, shader: Shader) {
        self.record("attach_shader", &[program.0.into(), shader.0.into()]);
        if let Some(attached) = self.programs.get_mut(&program.0) {
            attached.push(shader.0);
        }
    }

    fn detach_shader(&mut self, program: Program, shader: Shader) {
        self.record("detach_shader", &[program.0.into(), shader.0.into()]);
        if let Some(attached) = self.programs.get_mut(&program.0) {
            attached.retain(|s| *s != shader.0);
        }
    }

    fn bind_attrib_location(&mut self, program: Program, index: u32, name: &str) {
        self.record_text("bind_attrib_location", &[program.0.into(), index.into()], name);
    }

    fn link_program(&mut self, program: Program) {
        self.record("link_program", &[program.0.into()]);
        let ok = self.programs.get(&program.0).is_some_and(|attached| {
            attached
                .iter()
                .all(|s| self.shaders.get(s).is_some_and(|object| object.compiled))
        });
        self.linked.insert(program.0, ok);
    }

    fn get_programi(&mut self, program: Program, pname: u32) -> i32 {
        self.record("get_programi", &[program.0.into(), pname.into()]);
        match pname {
            glow::LINK_STATUS => i32::from(self.linked.get(&program.0).copied().unwrap_or(false)),
            _ => 0,
        }
    }

    fn get_program_info_log(&mut self, program: Program) -> String {
        self.record("get_program_info_log", &[program.0.into()]);
        if self.linked.get(&program.0).copied().unwrap_or(false) {
            String::new()
        } else {
            "link failed".to_owned()
        }
    }

    fn get_uniform_location(&mut self, program: Program, name: &str) -> UniformLocation {
        let location = if self.missing_uniforms.contains(name) {
            UniformLocation::INVALID
        } else {
            let names = self.locations.entry(program.0).or_default();
            let next = i32::try_from(names.len()).unwrap_or(i32::MAX);
            UniformLocation(*names.entry(name.to_owned()).or_insert(next))
        };
        self.record_text(
            "get_uniform_location",
            &[program.0.into(), location.0.into()],
            name,
        );
        location
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) {
        self.record("uniform_1i", &[location.0.into(), value.into()]);
    }

    fn uniform_1f(&mut self, location: UniformLocation, value: f32) {
        self.log.push_floats("uniform_1f", vec![location.0.into()], None, vec![value]);
    }

    fn uniform_1fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_1fv", location, values);
    }

    fn uniform_2fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_2fv", location, values);
    }

    fn uniform_3fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_3fv", location, values);
    }

    fn uniform_4fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_4fv", location, values);
    }

    fn uniform_1iv(&mut self, location: UniformLocation, values: &[i32]) {
        self.record("uniform_1iv", &[location.0.into(), values.len() as i64]);
    }

    fn uniform_2iv(&mut self, location: UniformLocation, values: &[i32]) {
        self.record("uniform_2iv", &[location.0.into(), values.len() as i64]);
    }

    fn uniform_3iv(&mut self, location: UniformLocation, values: &[i32]) {
        self.record("uniform_3iv", &[location.0.into(), values.len() as i64]);
    }

    fn uniform_4iv(&mut self, location: UniformLocation, values: &[i32]) {
        self.record("uniform_4iv", &[location.0.into(), values.len() as i64]);
    }

    fn uniform_matrix_2fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_matrix_2fv", location, values);
    }

    fn uniform_matrix_3fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_matrix_3fv", location, values);
    }

    fn uniform_matrix_4fv(&mut self, location: UniformLocation, values: &[f32]) {
        self.record_floats("uniform_matrix_4fv", location, values);
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
        self.record(
            "tex_image_2d",
            &[
                target.into(),
                level.into(),
                internal_format.into(),
                width.into(),
                height.into(),
                format.into(),
                ty.into(),
            ],
        );
        let (w, h) = (dim(width), dim(height));
        let storage = TextureStorage {
            width: w,
            height: h,
            pixels: pixels.map_or_else(|| vec![0; w * h * 4], <[u8]>::to_vec),
        };
        let bound = self.bound_texture();
        self.textures.insert(bound, storage);
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
        self.record(
            "tex_sub_image_2d",
            &[
                target.into(),
                level.into(),
                x.into(),
                y.into(),
                width.into(),
                height.into(),
                format.into(),
                ty.into(),
            ],
        );
        let bound = self.bound_texture();
        let Some(storage) = self.textures.get_mut(&bound) else {
            return;
        };
        let (x, y, w, h) = (dim(x), dim(y), dim(width), dim(height));
        for row in 0..h {
            let src = row * w * 4;
            let dst = ((y + row) * storage.width + x) * 4;
            storage.pixels[dst..dst + w * 4].copy_from_slice(&pixels[src..src + w * 4]);
        }
    }

    fn tex_parameteri(&mut self, target: u32, pname: u32, param: i32) {
        self.record("tex_parameteri", &[target.into(), pname.into(), param.into()]);
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
        self.record(
            "read_pixels",
            &[
                x.into(),
                y.into(),
                width.into(),
                height.into(),
                format.into(),
                ty.into(),
            ],
        );
        let storage = self
            .attachments
            .get(&self.bound_framebuffer)
            .and_then(|texture| self.textures.get(texture));
        let Some(storage) = storage else {
            dst.fill(0);
            return;
        };
        let (x, y, w, h) = (dim(x), dim(y), dim(width), dim(height));
        for row in 0..h {
            let src = ((y + row) * storage.width + x) * 4;
            let out = row * w * 4;
            dst[out..out + w * 4].copy_from_slice(&storage.pixels[src..src + w * 4]);
        }
    }

    fn buffer_init(&mut self, target: u32, size: usize, usage: u32) {
        self.record("buffer_init", &[target.into(), size as i64, usage.into()]);
    }

    fn buffer_sub_data(&mut self, target: u32, offset: usize, data: &[u8]) {
        self.record(
            "buffer_sub_data",
            &[target.into(), offset as i64, data.len() as i64],
        );
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
        self.record(
            "vertex_attrib_pointer",
            &[
                index.into(),
                size.into(),
                ty.into(),
                normalized.into(),
                stride.into(),
                offset as i64,
            ],
        );
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.record("enable_vertex_attrib_array", &[index.into()]);
    }

    fn disable_vertex_attrib_array(&mut self, index: u32) {
        self.record("disable_vertex_attrib_array", &[index.into()]);
    }

    fn draw_elements(&mut self, mode: u32, count: i32, ty: u32, offset: usize) {
        self.record(
            "draw_elements",
            &[mode.into(), count.into(), ty.into(), offset as i64],
        );
    }

    fn clear(&mut self, mask: u32) {
        self.record("clear", &[mask.into()]);
    }

    fn flush(&mut self) {
        self.record("flush", &[]);
    }

    fn framebuffer_texture_2d(
        &mut self,
        target: u32,
        attachment: u32,
        texture_target: u32,
        texture: Texture,
        level: i32,
    ) {
        self.record(
            "framebuffer_texture_2d",
            &[
                target.into(),
                attachment.into(),
                texture_target.into(),
                texture.0.into(),
                level.into(),
            ],
        );
        self.attachments.insert(self.bound_framebuffer, texture.0);
    }

    fn framebuffer_renderbuffer(
        &mut self,
        target: u32,
        attachment: u32,
        renderbuffer_target: u32,
        renderbuffer: Renderbuffer,
    ) {
        self.record(
            "framebuffer_renderbuffer",
            &[
                target.into(),
                attachment.into(),
                renderbuffer_target.into(),
                renderbuffer.0.into(),
            ],
        );
    }

    fn renderbuffer_storage(&mut self, target: u32, internal_format: u32, width: i32, height: i32) {
        self.record(
            "renderbuffer_storage",
            &[
                target.into(),
                internal_format.into(),
                width.into(),
                height.into(),
            ],
        );
    }

    fn check_framebuffer_status(&mut self, target: u32) -> u32 {
        self.record("check_framebuffer_status", &[target.into()]);
        self.framebuffer_status
    }
}
