//! Images: power-of-two textures (or the screen) with a lazily created
//! framebuffer and stencil renderbuffer.

use crate::context::{self, gl_size, Renderbuffer, Texture};
use crate::error::{Error, Result};
use crate::state::StateTracker;
use crate::types::{ImageId, PixelsArgs};

/// A framebuffer object together with the viewport it is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Framebuffer {
    pub(crate) native: context::Framebuffer,
    pub(crate) viewport_width: u32,
    pub(crate) viewport_height: u32,
}

/// The smallest power of two `>= value`; `0` maps to `1`.
pub(crate) const fn next_pow2(value: u32) -> u32 {
    value.next_power_of_two()
}

#[derive(Debug)]
pub(crate) struct Image {
    pub(crate) id: ImageId,
    /// Logical size.
    pub(crate) width: u32,
    pub(crate) height: u32,
    /// [`Texture::NONE`] for the screen.
    pub(crate) texture: Texture,
    pub(crate) framebuffer: Option<Framebuffer>,
    pub(crate) stencil: Renderbuffer,
    pub(crate) screen: bool,
}

impl Image {
    pub(crate) fn new(id: ImageId, width: u32, height: u32, texture: Texture) -> Self {
        Self {
            id,
            width,
            height,
            texture,
            framebuffer: None,
            stencil: Renderbuffer::NONE,
            screen: false,
        }
    }

    pub(crate) fn screen(id: ImageId, width: u32, height: u32) -> Self {
        Self {
            screen: true,
            ..Self::new(id, width, height, Texture::NONE)
        }
    }

    /// Texel size of the backing surface: raw for the screen, padded to
    /// powers of two otherwise.
    pub(crate) fn viewport_size(&self) -> (u32, u32) {
        if self.screen {
            (self.width, self.height)
        } else {
            (next_pow2(self.width), next_pow2(self.height))
        }
    }

    pub(crate) fn ensure_framebuffer(
        &mut self,
        state: &mut StateTracker,
        check_status: bool,
    ) -> Result<Framebuffer> {
        if let Some(framebuffer) = self.framebuffer {
            return Ok(framebuffer);
        }
        let (width, height) = self.viewport_size();
        let framebuffer = if self.screen {
            state.new_screen_framebuffer(width, height)
        } else {
            state.new_framebuffer(self.texture, width, height, check_status)?
        };
        self.framebuffer = Some(framebuffer);
        Ok(framebuffer)
    }

    /// Attaches a stencil renderbuffer sized like the framebuffer. The
    /// screen uses whatever stencil the window system gave it.
    pub(crate) fn ensure_stencil_buffer(
        &mut self,
        state: &mut StateTracker,
        check_status: bool,
    ) -> Result<()> {
        if self.screen || !self.stencil.is_none() {
            return Ok(());
        }
        let framebuffer = self.ensure_framebuffer(state, check_status)?;
        let renderbuffer =
            state.new_renderbuffer(framebuffer.viewport_width, framebuffer.viewport_height)?;
        self.stencil = renderbuffer;
        state.bind_stencil_buffer(framebuffer.native, renderbuffer, check_status)
    }

    /// Binds the framebuffer and sizes the viewport to it.
    pub(crate) fn set_viewport(
        &mut self,
        state: &mut StateTracker,
        check_status: bool,
    ) -> Result<Framebuffer> {
        let framebuffer = self.ensure_framebuffer(state, check_status)?;
        state.set_viewport(&framebuffer);
        Ok(framebuffer)
    }

    /// `width * height * 4` bytes of RGBA8 read from the image origin.
    pub(crate) fn pixels(&mut self, state: &mut StateTracker, check_status: bool) -> Result<Vec<u8>> {
        let framebuffer = self.ensure_framebuffer(state, check_status)?;
        Ok(state.framebuffer_pixels(framebuffer.native, self.width, self.height))
    }

    /// Uploads each sub-rectangle with `glTexSubImage2D`. Every buffer is
    /// validated before the first upload.
    pub(crate) fn replace_pixels(
        &self,
        state: &mut StateTracker,
        args: &[PixelsArgs<'_>],
    ) -> Result<()> {
        if self.screen {
            return Err(Error::ScreenPixelsWrite);
        }
        for a in args {
            let expected = 4 * a.width as usize * a.height as usize;
            if a.pixels.len() != expected {
                return Err(Error::PixelsLength {
                    expected,
                    got: a.pixels.len(),
                });
            }
        }

        state.bind_texture(self.texture);
        for a in args {
            state.ctx.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                gl_size(a.x),
                gl_size(a.y),
                gl_size(a.width),
                gl_size(a.height),
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                a.pixels,
            );
        }
        Ok(())
    }

    /// Releases the framebuffer, the texture and the stencil buffer, in that
    /// order.
    pub(crate) fn dispose(&mut self, state: &mut StateTracker) {
        if let Some(framebuffer) = self.framebuffer.take() {
            state.delete_framebuffer(framebuffer.native);
        }
        if !self.texture.is_none() {
            state.delete_texture(self.texture);
            self.texture = Texture::NONE;
        }
        if !self.stencil.is_none() {
            state.delete_renderbuffer(self.stencil);
            self.stencil = Renderbuffer::NONE;
        }
    }
}
