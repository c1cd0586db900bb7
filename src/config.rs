//! Construction-time options for [`Graphics`](crate::Graphics).

/// Backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Wrap the context in a [`DebugContext`](crate::DebugContext) that checks
    /// `glGetError` after every call.
    pub debug: bool,
    /// The engine's indices-per-batch limit. Sizes the persistent buffers:
    /// `indices_limit * 48` bytes of vertices and `indices_limit * 2` bytes of
    /// indices.
    pub indices_limit: usize,
    /// Call `glCheckFramebufferStatus` after assembling a framebuffer. The
    /// call blocks in browsers, so WebGL embedders usually turn it off.
    pub check_framebuffer_status: bool,
}

impl Config {
    /// Bytes reserved for the array buffer.
    #[must_use]
    pub const fn array_buffer_size(&self) -> usize {
        self.indices_limit * crate::program::VERTEX_SIZE_IN_BYTES
    }

    /// Bytes reserved for the element array buffer.
    #[must_use]
    pub const fn element_array_buffer_size(&self) -> usize {
        self.indices_limit * 2
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            indices_limit: (1 << 16) / 3 * 3,
            check_framebuffer_status: true,
        }
    }
}
