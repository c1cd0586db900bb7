//! The window-system side of a frame.

use crate::error::Result;

/// Owns the surface the screen framebuffer belongs to.
///
/// [`Graphics`](crate::Graphics) makes the context current once in
/// [`initialize`](crate::Graphics::initialize) and swaps after every
/// presenting [`end`](crate::Graphics::end). Embedders that drive the window
/// themselves can leave it out and construct with
/// [`Graphics::new`](crate::Graphics::new).
pub trait Presenter {
    /// Makes the GL context current on the calling thread.
    ///
    /// # Errors
    ///
    /// Whatever the window system reports.
    fn make_current(&mut self) -> Result<()>;

    /// Presents the back buffer.
    ///
    /// # Errors
    ///
    /// Whatever the window system reports.
    fn swap_buffers(&mut self) -> Result<()>;
}

impl<F, G> Presenter for (F, G)
where
    F: FnMut() -> Result<()>,
    G: FnMut() -> Result<()>,
{
    fn make_current(&mut self) -> Result<()> {
        (self.0)()
    }

    fn swap_buffers(&mut self) -> Result<()> {
        (self.1)()
    }
}
