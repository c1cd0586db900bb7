//! Shadowed GL state and the resource helpers built on it.
//!
//! [`StateTracker`] owns the boxed [`Context`]. Every `bind_*` / `set_*`
//! routine compares against the last value it sent and skips the GL call
//! when nothing changed. External GL state changes invalidate the shadows;
//! [`StateTracker::reset`] brings them back in sync.

use std::collections::HashMap;

use log::debug;

use crate::context::{gl_size, Context, Framebuffer, Program, Renderbuffer, Texture};
use crate::error::{Error, ResourceKind, Result};
use crate::image;
use crate::locations::LocationCache;
use crate::types::CompositeMode;

#[expect(clippy::cast_possible_wrap)]
const RGBA_INTERNAL_FORMAT: i32 = glow::RGBA as i32;

#[expect(clippy::cast_possible_wrap)]
const NEAREST: i32 = glow::NEAREST as i32;

#[expect(clippy::cast_possible_wrap)]
const CLAMP_TO_EDGE: i32 = glow::CLAMP_TO_EDGE as i32;

pub(crate) struct StateTracker {
    pub(crate) ctx: Box<dyn Context>,
    pub(crate) locations: LocationCache,

    /// Discovered at reset; not necessarily `0` (iOS).
    screen_framebuffer: Framebuffer,
    last_texture: Texture,
    /// `None` until something is bound, so the first bind always reaches GL.
    last_framebuffer: Option<Framebuffer>,
    last_renderbuffer: Renderbuffer,
    last_viewport: (u32, u32),
    last_composite_mode: Option<CompositeMode>,
    max_texture_size: Option<u32>,
    functions_loaded: bool,

    /// Program activation shadows.
    pub(crate) last_program: Program,
    /// Raw `f32` bits per uniform name.
    pub(crate) last_uniforms: HashMap<String, Vec<u32>>,
    /// Index of the active texture unit (`TEXTURE0 + n`).
    pub(crate) last_active_texture: u32,
}

impl StateTracker {
    pub(crate) fn new(ctx: Box<dyn Context>) -> Self {
        Self {
            ctx,
            locations: LocationCache::default(),
            screen_framebuffer: Framebuffer::NONE,
            last_texture: Texture::NONE,
            last_framebuffer: None,
            last_renderbuffer: Renderbuffer::NONE,
            last_viewport: (0, 0),
            last_composite_mode: None,
            max_texture_size: None,
            functions_loaded: false,
            last_program: Program::NONE,
            last_uniforms: HashMap::new(),
            last_active_texture: 0,
        }
    }

    /// Loads entry points (once), forgets every shadow and re-establishes the
    /// fixed-function defaults.
    pub(crate) fn reset(&mut self) -> Result<()> {
        if !self.functions_loaded {
            self.ctx.load_functions()?;
            self.functions_loaded = true;
        }

        self.locations.clear();
        self.last_texture = Texture::NONE;
        self.last_framebuffer = None;
        self.last_renderbuffer = Renderbuffer::NONE;
        self.last_viewport = (0, 0);
        self.last_composite_mode = None;

        self.ctx.enable(glow::BLEND);
        self.ctx.enable(glow::SCISSOR_TEST);
        self.set_composite_mode(CompositeMode::SourceOver);

        let binding = self.ctx.get_integer(glow::FRAMEBUFFER_BINDING);
        self.screen_framebuffer = Framebuffer(u32::try_from(binding).unwrap_or(0));
        debug!("screen framebuffer is {}", self.screen_framebuffer.0);

        self.last_program = Program::NONE;
        self.ctx.use_program(Program::NONE);
        self.last_uniforms.clear();
        self.last_active_texture = 0;
        Ok(())
    }

    pub(crate) fn screen_framebuffer(&self) -> Framebuffer {
        self.screen_framebuffer
    }

    pub(crate) fn last_framebuffer(&self) -> Option<Framebuffer> {
        self.last_framebuffer
    }

    pub(crate) fn bind_texture(&mut self, texture: Texture) {
        if self.last_texture == texture {
            return;
        }
        self.ctx.bind_texture(glow::TEXTURE_2D, texture);
        self.last_texture = texture;
    }

    /// Forces the next [`bind_texture`](Self::bind_texture) to reach GL, for
    /// when the active unit changed underneath the shadow.
    pub(crate) fn forget_texture(&mut self) {
        self.last_texture = Texture::NONE;
    }

    pub(crate) fn bind_renderbuffer(&mut self, renderbuffer: Renderbuffer) {
        if self.last_renderbuffer == renderbuffer {
            return;
        }
        self.ctx.bind_renderbuffer(glow::RENDERBUFFER, renderbuffer);
        self.last_renderbuffer = renderbuffer;
    }

    pub(crate) fn bind_framebuffer(&mut self, framebuffer: Framebuffer) {
        if self.last_framebuffer == Some(framebuffer) {
            return;
        }
        self.ctx.bind_framebuffer(glow::FRAMEBUFFER, framebuffer);
        self.last_framebuffer = Some(framebuffer);
    }

    /// Binds `framebuffer` and sizes the viewport to it.
    ///
    /// The screen never records its viewport, so every draw to it reasserts
    /// `glViewport`.
    pub(crate) fn set_viewport(&mut self, framebuffer: &image::Framebuffer) {
        self.bind_framebuffer(framebuffer.native);
        let size = (framebuffer.viewport_width, framebuffer.viewport_height);
        if self.last_viewport == size {
            return;
        }
        self.ctx.viewport(0, 0, gl_size(size.0), gl_size(size.1));
        self.last_viewport = if framebuffer.native == self.screen_framebuffer {
            (0, 0)
        } else {
            size
        };
    }

    pub(crate) fn set_composite_mode(&mut self, mode: CompositeMode) {
        if self.last_composite_mode == Some(mode) {
            return;
        }
        let (src, dst) = mode.blend_factors();
        self.ctx.blend_func_separate(src, dst, src, dst);
        self.ctx.blend_equation_separate(glow::FUNC_ADD, glow::FUNC_ADD);
        self.last_composite_mode = Some(mode);
    }

    /// `GL_MAX_TEXTURE_SIZE`, queried once.
    pub(crate) fn max_texture_size(&mut self) -> u32 {
        if let Some(size) = self.max_texture_size {
            return size;
        }
        let size = u32::try_from(self.ctx.get_integer(glow::MAX_TEXTURE_SIZE)).unwrap_or(0);
        self.max_texture_size = Some(size);
        size
    }

    /// Allocates an RGBA8 texture without initial contents.
    pub(crate) fn new_texture(&mut self, width: u32, height: u32) -> Result<Texture> {
        let texture = self.ctx.create_texture();
        if texture.is_none() {
            return Err(Error::AllocationFailed(ResourceKind::Texture));
        }
        self.bind_texture(texture);

        self.ctx
            .tex_parameteri(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, NEAREST);
        self.ctx
            .tex_parameteri(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, NEAREST);
        self.ctx
            .tex_parameteri(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, CLAMP_TO_EDGE);
        self.ctx
            .tex_parameteri(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, CLAMP_TO_EDGE);
        self.ctx.pixel_storei(glow::UNPACK_ALIGNMENT, 4);
        self.ctx.tex_image_2d(
            glow::TEXTURE_2D,
            0,
            RGBA_INTERNAL_FORMAT,
            gl_size(width),
            gl_size(height),
            glow::RGBA,
            glow::UNSIGNED_BYTE,
            None,
        );
        debug!("created texture {} ({width}x{height})", texture.0);
        Ok(texture)
    }

    pub(crate) fn delete_texture(&mut self, texture: Texture) {
        if self.last_texture == texture {
            self.last_texture = Texture::NONE;
        }
        self.ctx.delete_texture(texture);
    }

    /// Allocates a stencil renderbuffer: `STENCIL_INDEX8` on GLES and WebGL,
    /// `DEPTH24_STENCIL8` on desktop.
    pub(crate) fn new_renderbuffer(&mut self, width: u32, height: u32) -> Result<Renderbuffer> {
        let renderbuffer = self.ctx.create_renderbuffer();
        if renderbuffer.is_none() {
            return Err(Error::AllocationFailed(ResourceKind::Renderbuffer));
        }
        self.bind_renderbuffer(renderbuffer);

        let format = if self.ctx.is_es() {
            glow::STENCIL_INDEX8
        } else {
            glow::DEPTH24_STENCIL8
        };
        self.ctx.renderbuffer_storage(
            glow::RENDERBUFFER,
            format,
            gl_size(width),
            gl_size(height),
        );
        Ok(renderbuffer)
    }

    pub(crate) fn delete_renderbuffer(&mut self, renderbuffer: Renderbuffer) {
        if self.last_renderbuffer == renderbuffer {
            self.last_renderbuffer = Renderbuffer::NONE;
        }
        self.ctx.delete_renderbuffer(renderbuffer);
    }

    /// Wraps `texture` in a framebuffer object at `COLOR_ATTACHMENT0`.
    pub(crate) fn new_framebuffer(
        &mut self,
        texture: Texture,
        width: u32,
        height: u32,
        check_status: bool,
    ) -> Result<image::Framebuffer> {
        let native = self.ctx.create_framebuffer();
        if native.is_none() {
            return Err(Error::AllocationFailed(ResourceKind::Framebuffer));
        }
        self.bind_framebuffer(native);

        self.ctx.framebuffer_texture_2d(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0,
            glow::TEXTURE_2D,
            texture,
            0,
        );
        if check_status {
            self.check_framebuffer_status()?;
        }

        Ok(image::Framebuffer {
            native,
            viewport_width: width,
            viewport_height: height,
        })
    }

    pub(crate) fn new_screen_framebuffer(&self, width: u32, height: u32) -> image::Framebuffer {
        image::Framebuffer {
            native: self.screen_framebuffer,
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Attaches `renderbuffer` as the stencil buffer of `framebuffer`.
    pub(crate) fn bind_stencil_buffer(
        &mut self,
        framebuffer: Framebuffer,
        renderbuffer: Renderbuffer,
        check_status: bool,
    ) -> Result<()> {
        self.bind_framebuffer(framebuffer);
        self.ctx.framebuffer_renderbuffer(
            glow::FRAMEBUFFER,
            glow::STENCIL_ATTACHMENT,
            glow::RENDERBUFFER,
            renderbuffer,
        );
        if check_status {
            self.check_framebuffer_status()?;
        }
        Ok(())
    }

    fn check_framebuffer_status(&mut self) -> Result<()> {
        let status = self.ctx.check_framebuffer_status(glow::FRAMEBUFFER);
        if status == glow::FRAMEBUFFER_COMPLETE {
            return Ok(());
        }
        // Some drivers report 0 and leave the reason in glGetError.
        let code = if status == 0 { self.ctx.get_error() } else { status };
        Err(Error::FramebufferIncomplete(code))
    }

    /// Deletes `framebuffer` unless it is the screen.
    pub(crate) fn delete_framebuffer(&mut self, framebuffer: Framebuffer) {
        if framebuffer == self.screen_framebuffer {
            return;
        }
        // Deleting the bound framebuffer silently rebinds the default one.
        if self.last_framebuffer == Some(framebuffer) {
            self.last_framebuffer = None;
            self.last_viewport = (0, 0);
        }
        self.ctx.delete_framebuffer(framebuffer);
    }

    /// Reads `width * height` RGBA8 pixels from the origin of `framebuffer`.
    pub(crate) fn framebuffer_pixels(
        &mut self,
        framebuffer: Framebuffer,
        width: u32,
        height: u32,
    ) -> Vec<u8> {
        let mut pixels = vec![0; 4 * width as usize * height as usize];
        self.ctx.flush();
        self.bind_framebuffer(framebuffer);
        self.ctx.read_pixels(
            &mut pixels,
            0,
            0,
            gl_size(width),
            gl_size(height),
            glow::RGBA,
            glow::UNSIGNED_BYTE,
        );
        pixels
    }

    /// Purges `program` from the location cache and deletes it if the
    /// context still knows it.
    pub(crate) fn delete_program(&mut self, program: Program) {
        self.locations.delete_program(program);
        if self.last_program == program {
            self.last_program = Program::NONE;
        }
        if !self.ctx.is_program(program) {
            return;
        }
        self.ctx.delete_program(program);
    }
}
