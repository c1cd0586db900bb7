//! The engine-facing façade.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::Config;
use crate::context::{Api, Context, Program, Texture};
use crate::debug::DebugContext;
use crate::error::{Error, Result};
use crate::glsl;
use crate::image::{next_pow2, Image};
use crate::ir::{self, Type, PRESERVED_UNIFORM_COUNT, SOURCE_IMAGE_COUNT};
use crate::presenter::Presenter;
use crate::program::{self, UniformVariable, VertexBuffers};
use crate::shaders::{self, ProgramKey};
use crate::state::StateTracker;
use crate::types::{
    Address, ColorMatrix, CompositeMode, Filter, FillRule, ImageId, PixelsArgs, Region, ShaderId,
    Vertex, YDirection,
};

/// One batch of indexed triangles, see [`Graphics::draw_triangles`].
#[derive(Debug, Clone)]
pub struct DrawTriangles<'a> {
    /// Destination image.
    pub dst: ImageId,
    /// Source images bound to samplers `T0..T3`.
    pub srcs: [Option<ImageId>; SOURCE_IMAGE_COUNT],
    /// Sampling offsets of sources `1..`, handed to user shaders.
    pub offsets: [[f32; 2]; SOURCE_IMAGE_COUNT - 1],
    /// User shader, or `None` for the built-in programs.
    pub shader: Option<ShaderId>,
    /// Number of indices to draw.
    pub index_len: usize,
    /// First index, in indices.
    pub index_offset: usize,
    /// Blend mode.
    pub mode: CompositeMode,
    /// Color transform; built-in programs only.
    pub color_matrix: ColorMatrix,
    /// Sampling kernel; built-in programs only.
    pub filter: Filter,
    /// Out-of-region policy; built-in programs only.
    pub address: Address,
    /// Pixel rectangle of the destination that may be written; `None` is
    /// the whole destination.
    pub dst_region: Option<Region>,
    /// Rectangle of source 0 that may be sampled, in the same space as
    /// vertex texture coordinates; `None` is the whole source.
    pub src_region: Option<Region>,
    /// Values of the user uniforms `U8..`, in declaration order.
    pub uniforms: &'a [Vec<f32>],
    /// How overlapping triangles combine.
    pub fill_rule: FillRule,
}

impl DrawTriangles<'_> {
    /// A source-over draw of `index_len` indices from the whole of `src`
    /// into the whole of `dst` with the built-in nearest-filter program.
    #[must_use]
    pub fn new(dst: ImageId, src: Option<ImageId>, index_len: usize) -> Self {
        Self {
            dst,
            srcs: [src, None, None, None],
            offsets: [[0.0; 2]; SOURCE_IMAGE_COUNT - 1],
            shader: None,
            index_len,
            index_offset: 0,
            mode: CompositeMode::SourceOver,
            color_matrix: ColorMatrix::IDENTITY,
            filter: Filter::Nearest,
            address: Address::ClampToZero,
            dst_region: None,
            src_region: None,
            uniforms: &[],
            fill_rule: FillRule::FillAll,
        }
    }
}

#[derive(Debug)]
struct UserShader {
    program: Program,
    uniforms: Vec<Type>,
}

/// Size and texture of one draw source.
#[derive(Debug, Clone, Copy, Default)]
struct Source {
    texture: Texture,
    width: u32,
    height: u32,
    texture_size: (u32, u32),
}

impl Source {
    /// The whole image in normalized texture coordinates.
    fn full_region(&self) -> Region {
        let (tw, th) = self.texture_size;
        if tw == 0 || th == 0 {
            return Region::default();
        }
        Region::new(
            0.0,
            0.0,
            to_f32(self.width) / to_f32(tw),
            to_f32(self.height) / to_f32(th),
        )
    }
}

/// Owns every GL resource of the backend and translates draw batches into
/// GL calls.
///
/// All methods must run on the thread that owns the current context. Call
/// [`initialize`](Self::initialize) before anything else, and again after
/// the context was lost.
pub struct Graphics {
    state: StateTracker,
    presenter: Option<Box<dyn Presenter>>,
    config: Config,
    api: Api,
    buffers: Option<VertexBuffers>,
    programs: HashMap<ProgramKey, Program>,
    images: HashMap<ImageId, Image>,
    shaders: HashMap<ShaderId, UserShader>,
    next_image_id: u32,
    next_shader_id: u32,
    /// A draw was issued since the last pixel upload.
    draw_called: bool,
}

impl Graphics {
    /// Wraps `ctx`, in a [`DebugContext`] when `config.debug` is set. The
    /// embedder makes the context current and swaps buffers itself.
    #[must_use]
    pub fn new<C: Context + 'static>(ctx: C, config: Config) -> Self {
        Self::build(ctx, config, None)
    }

    /// Like [`new`](Self::new), with `presenter` making the context current
    /// on [`initialize`](Self::initialize) and swapping on
    /// [`end(true)`](Self::end).
    #[must_use]
    pub fn with_presenter<C, P>(ctx: C, config: Config, presenter: P) -> Self
    where
        C: Context + 'static,
        P: Presenter + 'static,
    {
        Self::build(ctx, config, Some(Box::new(presenter)))
    }

    fn build<C: Context + 'static>(
        ctx: C,
        config: Config,
        presenter: Option<Box<dyn Presenter>>,
    ) -> Self {
        let api = ctx.api();
        let ctx: Box<dyn Context> = if config.debug {
            Box::new(DebugContext::new(ctx))
        } else {
            Box::new(ctx)
        };
        Self {
            state: StateTracker::new(ctx),
            presenter,
            config,
            api,
            buffers: None,
            programs: HashMap::new(),
            images: HashMap::new(),
            shaders: HashMap::new(),
            next_image_id: 1,
            next_shader_id: 1,
            draw_called: false,
        }
    }

    /// The dialect of the wrapped context.
    #[must_use]
    pub fn api(&self) -> Api {
        self.api
    }

    /// Makes the context current, then [`reset`](Self::reset)s.
    ///
    /// # Errors
    ///
    /// Presenter failures, and see [`reset`](Self::reset).
    pub fn initialize(&mut self) -> Result<()> {
        if let Some(presenter) = &mut self.presenter {
            presenter.make_current()?;
        }
        self.reset()
    }

    /// Re-establishes GL state, rebuilds the built-in programs and the
    /// vertex buffers.
    ///
    /// # Errors
    ///
    /// Loader failures, allocation failures and built-in shader compile or
    /// link errors.
    pub fn reset(&mut self) -> Result<()> {
        self.state.reset()?;

        for (_, program) in self.programs.drain() {
            self.state.delete_program(program);
        }
        let version = self.api.glsl_version();
        for key in ProgramKey::all() {
            let program = shaders::builtin_program(self.state.ctx.as_mut(), version, key)?;
            self.programs.insert(key, program);
        }

        if let Some(buffers) = self.buffers.take() {
            // Browsers keep buffers alive across context restoration.
            if !self.api.is_browser() {
                buffers.delete(self.state.ctx.as_mut());
            }
        }
        self.buffers = Some(VertexBuffers::new(self.state.ctx.as_mut(), &self.config)?);

        debug!(
            "graphics reset: {:?}, {} built-in programs",
            self.api,
            self.programs.len()
        );
        self.check_gl()
    }

    fn check_gl(&mut self) -> Result<()> {
        match self.state.ctx.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Starts a frame. Does nothing.
    pub fn begin(&mut self) {}

    /// Ends a frame by flushing. With `present`, also forgets the uniform
    /// shadow, which the swap may clobber, and swaps through the presenter.
    ///
    /// # Errors
    ///
    /// GL errors observed by the debug context, or a failed swap.
    pub fn end(&mut self, present: bool) -> Result<()> {
        self.state.ctx.flush();
        if present {
            self.state.last_uniforms.clear();
            if let Some(presenter) = &mut self.presenter {
                presenter.swap_buffers()?;
            }
        }
        self.check_gl()
    }

    /// Loads one batch into the persistent buffers.
    ///
    /// # Errors
    ///
    /// [`Error::BatchTooLarge`] when the batch exceeds the buffer capacity.
    pub fn set_vertices(&mut self, vertices: &[Vertex], indices: &[u16]) -> Result<()> {
        let buffers = self
            .buffers
            .as_ref()
            .ok_or_else(not_initialized)?;
        buffers.upload(self.state.ctx.as_mut(), vertices, indices)?;
        self.check_gl()
    }

    fn next_image_id(&mut self) -> ImageId {
        let id = ImageId(self.next_image_id);
        self.next_image_id += 1;
        id
    }

    /// Allocates an off-screen image backed by a power-of-two texture.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidImageSize`] for empty or oversized images, or an
    /// allocation failure.
    pub fn new_image(&mut self, width: u32, height: u32) -> Result<ImageId> {
        let max = self.state.max_texture_size();
        if width == 0 || height == 0 || width > max || height > max {
            return Err(Error::InvalidImageSize { width, height, max });
        }
        let texture = self
            .state
            .new_texture(next_pow2(width), next_pow2(height))?;
        if let Err(err) = self.check_gl() {
            self.state.delete_texture(texture);
            return Err(err);
        }
        let id = self.next_image_id();
        self.images.insert(id, Image::new(id, width, height, texture));
        Ok(id)
    }

    /// Registers the screen as an image of the given size.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidImageSize`] for an empty size.
    pub fn new_screen_framebuffer_image(&mut self, width: u32, height: u32) -> Result<ImageId> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize {
                width,
                height,
                max: self.state.max_texture_size(),
            });
        }
        let id = self.next_image_id();
        self.images.insert(id, Image::screen(id, width, height));
        Ok(id)
    }

    /// Generates GLSL for `shader`, then compiles and links it.
    ///
    /// # Errors
    ///
    /// [`Error::ShaderCompile`] or [`Error::ShaderLink`] with the driver's
    /// log; allocation failures.
    pub fn new_shader(&mut self, shader: &ir::Program) -> Result<ShaderId> {
        let (vertex, fragment) = glsl::compile(shader, self.api.glsl_version());
        let program = shaders::compile_program(self.state.ctx.as_mut(), &vertex, &fragment)?;
        if let Err(err) = self.check_gl() {
            self.state.delete_program(program);
            return Err(err);
        }

        let id = ShaderId(self.next_shader_id);
        self.next_shader_id += 1;
        self.shaders.insert(
            id,
            UserShader {
                program,
                uniforms: shader.uniforms.clone(),
            },
        );
        debug!("created shader {id} (program {})", program.0);
        Ok(id)
    }

    /// Releases the image and its GL objects.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidImage`] for unknown ids.
    pub fn dispose_image(&mut self, id: ImageId) -> Result<()> {
        let mut image = self.images.remove(&id).ok_or(Error::InvalidImage(id))?;
        image.dispose(&mut self.state);
        debug!("disposed image {}", image.id);
        self.check_gl()
    }

    /// Deletes the shader's program and its cached uniform locations.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidShader`] for unknown ids.
    pub fn dispose_shader(&mut self, id: ShaderId) -> Result<()> {
        let shader = self.shaders.remove(&id).ok_or(Error::InvalidShader(id))?;
        self.state.delete_program(shader.program);
        self.check_gl()
    }

    /// Reads back `width * height * 4` bytes of premultiplied RGBA8.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidImage`] or a framebuffer setup failure.
    pub fn pixels(&mut self, id: ImageId) -> Result<Vec<u8>> {
        let image = self.images.get_mut(&id).ok_or(Error::InvalidImage(id))?;
        let pixels = image.pixels(&mut self.state, self.config.check_framebuffer_status)?;
        self.check_gl()?;
        Ok(pixels)
    }

    /// Uploads sub-rectangles of an off-screen image.
    ///
    /// # Errors
    ///
    /// [`Error::ScreenPixelsWrite`] for the screen, [`Error::PixelsLength`]
    /// for mis-sized buffers.
    pub fn replace_pixels(&mut self, id: ImageId, args: &[PixelsArgs<'_>]) -> Result<()> {
        let image = self.images.get(&id).ok_or(Error::InvalidImage(id))?;
        if image.screen {
            return Err(Error::ScreenPixelsWrite);
        }
        // Some mobile drivers race TexSubImage2D against pending draws.
        if self.draw_called {
            self.state.ctx.flush();
            self.draw_called = false;
        }
        image.replace_pixels(&mut self.state, args)?;
        self.check_gl()
    }

    /// `GL_MAX_TEXTURE_SIZE`.
    pub fn max_image_size(&mut self) -> u32 {
        self.state.max_texture_size()
    }

    /// Whether the context can be lost and images must be restored by the
    /// engine.
    #[must_use]
    pub fn needs_restoring(&self) -> bool {
        self.state.ctx.is_es()
    }

    /// The backend never flips; the engine does.
    #[must_use]
    pub fn framebuffer_y_direction(&self) -> YDirection {
        YDirection::Upward
    }

    fn source(&self, id: Option<ImageId>) -> Result<Source> {
        let Some(id) = id else {
            return Ok(Source::default());
        };
        let image = self.images.get(&id).ok_or(Error::InvalidImage(id))?;
        Ok(Source {
            texture: image.texture,
            width: image.width,
            height: image.height,
            texture_size: image.viewport_size(),
        })
    }

    /// Draws `index_len` indices starting at `index_offset` from the last
    /// [`set_vertices`](Self::set_vertices) batch.
    ///
    /// # Errors
    ///
    /// Unknown ids, framebuffer or stencil setup failures, and uniform
    /// values not matching the shader's declarations.
    pub fn draw_triangles(&mut self, draw: &DrawTriangles<'_>) -> Result<()> {
        let mut sources = [Source::default(); SOURCE_IMAGE_COUNT];
        for (source, id) in sources.iter_mut().zip(draw.srcs) {
            *source = self.source(id)?;
        }

        let check = self.config.check_framebuffer_status;
        let dst = self
            .images
            .get_mut(&draw.dst)
            .ok_or(Error::InvalidImage(draw.dst))?;
        let framebuffer = dst.set_viewport(&mut self.state, check)?;
        let dst_width = dst.width;
        let dst_region = draw.dst_region.unwrap_or_else(|| {
            Region::new(0.0, 0.0, to_f32(dst.width), to_f32(dst.height))
        });
        let src_region = draw
            .src_region
            .unwrap_or_else(|| sources[0].full_region());

        let r = dst_region;
        self.state.ctx.scissor(
            to_gl_int(r.x),
            to_gl_int(r.y),
            to_gl_int(r.width),
            to_gl_int(r.height),
        );
        self.state.set_composite_mode(draw.mode);

        let viewport = (
            to_f32(framebuffer.viewport_width),
            to_f32(framebuffer.viewport_height),
        );
        let (program, uniforms, textures) = match draw.shader {
            None => {
                let key = ProgramKey {
                    use_color_matrix: !draw.color_matrix.is_identity(),
                    filter: draw.filter,
                    address: draw.address,
                };
                let program = *self.programs.get(&key).ok_or_else(not_initialized)?;
                let uniforms =
                    builtin_uniforms(draw, viewport, src_region, dst_width, &sources[0]);
                (program, uniforms, vec![sources[0].texture])
            }
            Some(id) => {
                let shader = self.shaders.get(&id).ok_or(Error::InvalidShader(id))?;
                let regions = (dst_region, src_region);
                let uniforms = user_uniforms(draw, viewport, regions, &sources, &shader.uniforms);
                let textures = sources.iter().map(|s| s.texture).collect();
                (shader.program, uniforms, textures)
            }
        };

        let buffers = self
            .buffers
            .as_ref()
            .ok_or_else(not_initialized)?;
        program::use_program(&mut self.state, buffers, program, &uniforms, &textures)?;

        let count = i32::try_from(draw.index_len).unwrap_or(i32::MAX);
        let offset = draw.index_offset * std::mem::size_of::<u16>();
        match draw.fill_rule {
            FillRule::FillAll => {
                self.state
                    .ctx
                    .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, offset);
            }
            rule @ (FillRule::EvenOdd | FillRule::NonZero) => {
                if let Some(dst) = self.images.get_mut(&draw.dst) {
                    dst.ensure_stencil_buffer(&mut self.state, check)?;
                }
                let ctx = self.state.ctx.as_mut();
                ctx.enable(glow::STENCIL_TEST);
                ctx.clear(glow::STENCIL_BUFFER_BIT);
                ctx.stencil_func(glow::ALWAYS, 0, 0xff);
                if rule == FillRule::EvenOdd {
                    ctx.stencil_op(glow::KEEP, glow::KEEP, glow::INVERT);
                } else {
                    ctx.stencil_op_separate(glow::FRONT, glow::KEEP, glow::KEEP, glow::INCR_WRAP);
                    ctx.stencil_op_separate(glow::BACK, glow::KEEP, glow::KEEP, glow::DECR_WRAP);
                }
                ctx.color_mask(false, false, false, false);
                ctx.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, offset);

                ctx.stencil_func(glow::NOTEQUAL, 0, 0xff);
                ctx.stencil_op(glow::KEEP, glow::KEEP, glow::KEEP);
                ctx.color_mask(true, true, true, true);
                ctx.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, offset);
                ctx.disable(glow::STENCIL_TEST);
            }
        }
        self.draw_called = true;
        self.check_gl()
    }

    /// Releases every image, shader, built-in program and buffer.
    pub fn destroy(&mut self) {
        for (_, mut image) in self.images.drain() {
            image.dispose(&mut self.state);
        }
        for (_, shader) in self.shaders.drain() {
            self.state.delete_program(shader.program);
        }
        for (_, program) in self.programs.drain() {
            self.state.delete_program(program);
        }
        if let Some(buffers) = self.buffers.take() {
            buffers.delete(self.state.ctx.as_mut());
        }
        if let Some(err) = self.state.ctx.take_error() {
            warn!("error while destroying graphics: {err}");
        }
    }

    #[cfg(feature = "png")]
    pub(crate) fn image_size(&self, id: ImageId) -> Result<(u32, u32)> {
        let image = self.images.get(&id).ok_or(Error::InvalidImage(id))?;
        Ok((image.width, image.height))
    }
}

fn not_initialized() -> Error {
    Error::ContextNotSupported("graphics used before initialize".into())
}

#[expect(clippy::cast_precision_loss)]
fn to_f32(value: u32) -> f32 {
    value as f32
}

#[expect(clippy::cast_possible_truncation)]
fn to_gl_int(value: f32) -> i32 {
    value as i32
}

fn builtin_uniforms(
    draw: &DrawTriangles<'_>,
    viewport: (f32, f32),
    src_region: Region,
    dst_width: u32,
    src: &Source,
) -> Vec<UniformVariable> {
    let r = src_region;
    let mut uniforms = vec![
        UniformVariable::new("viewport_size", vec![viewport.0, viewport.1], Type::Vec2),
        UniformVariable::new(
            "source_region",
            vec![r.x, r.y, r.x + r.width, r.y + r.height],
            Type::Vec4,
        ),
    ];
    if !draw.color_matrix.is_identity() {
        uniforms.push(UniformVariable::new(
            "color_matrix_body",
            draw.color_matrix.body.to_vec(),
            Type::Mat4,
        ));
        uniforms.push(UniformVariable::new(
            "color_matrix_translation",
            draw.color_matrix.translation.to_vec(),
            Type::Vec4,
        ));
    }
    if draw.filter != Filter::Nearest {
        let (w, h) = src.texture_size;
        uniforms.push(UniformVariable::new(
            "source_size",
            vec![to_f32(w), to_f32(h)],
            Type::Vec2,
        ));
    }
    if draw.filter == Filter::Screen && src.width > 0 {
        uniforms.push(UniformVariable::new(
            "scale",
            vec![to_f32(dst_width) / to_f32(src.width)],
            Type::Float,
        ));
    }
    uniforms
}

/// `regions` are the resolved destination and source regions.
fn user_uniforms(
    draw: &DrawTriangles<'_>,
    viewport: (f32, f32),
    regions: (Region, Region),
    sources: &[Source; SOURCE_IMAGE_COUNT],
    declared: &[Type],
) -> Vec<UniformVariable> {
    let (vw, vh) = viewport;
    let (dst, src) = regions;

    let source_sizes = sources
        .iter()
        .flat_map(|s| [to_f32(s.texture_size.0), to_f32(s.texture_size.1)])
        .collect();
    let offsets = draw.offsets.iter().flatten().copied().collect();
    let projection = vec![
        2.0 / vw, 0.0, 0.0, 0.0, //
        0.0, 2.0 / vh, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        -1.0, -1.0, 0.0, 1.0,
    ];
    let preserved = [
        vec![vw, vh],
        source_sizes,
        vec![dst.x / vw, dst.y / vh],
        vec![dst.width / vw, dst.height / vh],
        offsets,
        vec![src.x, src.y],
        vec![src.width, src.height],
        projection,
    ];

    let mut uniforms: Vec<UniformVariable> = preserved
        .into_iter()
        .zip(ir::preserved_uniform_types())
        .enumerate()
        .map(|(i, (value, ty))| UniformVariable::new(format!("U{i}"), value, ty))
        .collect();
    for (i, value) in draw.uniforms.iter().enumerate() {
        let index = PRESERVED_UNIFORM_COUNT + i;
        let ty = declared.get(index).cloned().unwrap_or(Type::None);
        uniforms.push(UniformVariable::new(format!("U{index}"), value.clone(), ty));
    }
    uniforms
}
