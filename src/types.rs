//! Plain value types shared by the façade and its callers.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// One vertex as laid out in the persistent array buffer.
///
/// Twelve `f32`s, 48 bytes, in attribute order `A0..A3`. Texture coordinates
/// and `tex_region` are in normalized texture space of source 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    /// `A0`: destination position in pixels.
    pub position: [f32; 2],
    /// `A1`: texture coordinate.
    pub tex: [f32; 2],
    /// `A2`: source region `(x0, y0, x1, y1)` for user shaders.
    pub tex_region: [f32; 4],
    /// `A3`: premultiplied color scale.
    pub color_scale: [f32; 4],
}

impl Vertex {
    /// Number of `f32` values per vertex.
    pub const FLOAT_COUNT: usize = 12;

    /// A vertex at `position` sampling `tex`, with `tex_region` covering the
    /// whole of source 0.
    #[must_use]
    pub const fn new(position: [f32; 2], tex: [f32; 2], color_scale: [f32; 4]) -> Self {
        Self {
            position,
            tex,
            tex_region: [0.0, 0.0, 1.0, 1.0],
            color_scale,
        }
    }
}

/// Identifies an image owned by [`Graphics`](crate::Graphics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub(crate) u32);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies a user shader owned by [`Graphics`](crate::Graphics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(pub(crate) u32);

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Region {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Region {
    /// Creates a region from its origin and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Sampling kernel of the built-in fragment shader.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Point sampling.
    #[default]
    Nearest,
    /// Bilinear sampling with a 1/512 texel bias.
    Linear,
    /// Integer up-scale with fractional edge blending.
    Screen,
}

impl Filter {
    /// Every filter, in key order.
    pub const ALL: [Self; 3] = [Self::Nearest, Self::Linear, Self::Screen];
}

/// Policy for texel coordinates outside the source region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Address {
    /// Outside texels are transparent black.
    #[default]
    ClampToZero,
    /// Coordinates wrap inside the source region.
    Repeat,
    /// No check; the caller keeps coordinates inside the texture.
    Unsafe,
}

impl Address {
    /// Every address mode, in key order.
    pub const ALL: [Self; 3] = [Self::ClampToZero, Self::Repeat, Self::Unsafe];
}

/// Porter-Duff style composite modes over premultiplied alpha.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CompositeMode {
    #[default]
    SourceOver,
    Clear,
    Copy,
    Destination,
    DestinationOver,
    SourceIn,
    DestinationIn,
    SourceOut,
    DestinationOut,
    SourceAtop,
    DestinationAtop,
    Xor,
    Lighter,
    Multiply,
}

impl CompositeMode {
    /// The `(source, destination)` GL blend factors for this mode, applied to
    /// color and alpha alike.
    #[must_use]
    pub const fn blend_factors(self) -> (u32, u32) {
        use glow::{DST_ALPHA, DST_COLOR, ONE, ONE_MINUS_DST_ALPHA, ONE_MINUS_SRC_ALPHA, SRC_ALPHA, ZERO};

        match self {
            Self::SourceOver => (ONE, ONE_MINUS_SRC_ALPHA),
            Self::Clear => (ZERO, ZERO),
            Self::Copy => (ONE, ZERO),
            Self::Destination => (ZERO, ONE),
            Self::DestinationOver => (ONE_MINUS_DST_ALPHA, ONE),
            Self::SourceIn => (DST_ALPHA, ZERO),
            Self::DestinationIn => (ZERO, SRC_ALPHA),
            Self::SourceOut => (ONE_MINUS_DST_ALPHA, ZERO),
            Self::DestinationOut => (ZERO, ONE_MINUS_SRC_ALPHA),
            Self::SourceAtop => (DST_ALPHA, ONE_MINUS_SRC_ALPHA),
            Self::DestinationAtop => (ONE_MINUS_DST_ALPHA, SRC_ALPHA),
            Self::Xor => (ONE_MINUS_DST_ALPHA, ONE_MINUS_SRC_ALPHA),
            Self::Lighter => (ONE, ONE),
            Self::Multiply => (DST_COLOR, ONE_MINUS_SRC_ALPHA),
        }
    }
}

/// An affine color transform over straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix {
    /// 4×4 matrix in column-major order, as uploaded to `mat4`.
    pub body: [f32; 16],
    /// Translation added after the multiply.
    pub translation: [f32; 4],
}

impl ColorMatrix {
    /// The identity transform. Draws with it use the cheaper program variant.
    pub const IDENTITY: Self = Self {
        body: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
        translation: [0.0; 4],
    };

    /// Whether this is exactly the identity transform.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// How overlapping triangles of one draw combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Every covered pixel is drawn.
    #[default]
    FillAll,
    /// A pixel is drawn iff an odd number of triangles cover it.
    EvenOdd,
    /// A pixel is drawn iff the signed winding count is non-zero.
    NonZero,
}

/// One sub-rectangle upload for [`Graphics::replace_pixels`](crate::Graphics::replace_pixels).
#[derive(Debug, Clone, Copy)]
pub struct PixelsArgs<'a> {
    /// Left edge in texels.
    pub x: u32,
    /// Top edge in texels.
    pub y: u32,
    /// Width in texels.
    pub width: u32,
    /// Height in texels.
    pub height: u32,
    /// `width * height * 4` bytes of premultiplied RGBA8.
    pub pixels: &'a [u8],
}

/// Direction of increasing Y in framebuffer space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum YDirection {
    /// Y grows upward; the engine flips before presenting.
    Upward,
}
